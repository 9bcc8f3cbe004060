use std::f64::consts::{PI, TAU};

use super::LonLat;

/// Spherical rotation given as three Euler angles in degrees.
///
/// `lambda` spins the sphere around its polar axis (added to longitude),
/// `phi` tilts it toward or away from the viewer, `gamma` rolls it around
/// the viewing axis. Applied in that order.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rotation {
    pub lambda_deg: f64,
    pub phi_deg: f64,
    pub gamma_deg: f64,
}

impl Rotation {
    pub fn new(lambda_deg: f64, phi_deg: f64, gamma_deg: f64) -> Self {
        Self {
            lambda_deg,
            phi_deg,
            gamma_deg,
        }
    }

    /// Accepts `[lambda, phi]` or `[lambda, phi, gamma]`; missing angles are zero.
    pub fn from_angles(angles: &[f64]) -> Self {
        let get = |i: usize| angles.get(i).copied().unwrap_or(0.0);
        Self::new(get(0), get(1), get(2))
    }

    pub fn apply(self, p: LonLat) -> LonLat {
        let (lon, lat) = self.apply_radians(p.lon_rad(), p.lat_rad());
        LonLat::from_radians(lon, lat)
    }

    pub fn invert(self, p: LonLat) -> LonLat {
        let (lon, lat) = self.invert_radians(p.lon_rad(), p.lat_rad());
        LonLat::from_radians(lon, lat)
    }

    pub fn apply_radians(self, lon: f64, lat: f64) -> (f64, f64) {
        let lon = wrap_pi(lon + self.lambda_deg.to_radians());
        if self.phi_deg == 0.0 && self.gamma_deg == 0.0 {
            return (lon, lat);
        }

        let (sin_dphi, cos_dphi) = self.phi_deg.to_radians().sin_cos();
        let (sin_dgamma, cos_dgamma) = self.gamma_deg.to_radians().sin_cos();

        let cos_lat = lat.cos();
        let x = lon.cos() * cos_lat;
        let y = lon.sin() * cos_lat;
        let z = lat.sin();
        let k = z * cos_dphi + x * sin_dphi;

        (
            (y * cos_dgamma - k * sin_dgamma).atan2(x * cos_dphi - z * sin_dphi),
            (k * cos_dgamma + y * sin_dgamma).clamp(-1.0, 1.0).asin(),
        )
    }

    pub fn invert_radians(self, lon: f64, lat: f64) -> (f64, f64) {
        let (lon, lat) = if self.phi_deg == 0.0 && self.gamma_deg == 0.0 {
            (lon, lat)
        } else {
            let (sin_dphi, cos_dphi) = self.phi_deg.to_radians().sin_cos();
            let (sin_dgamma, cos_dgamma) = self.gamma_deg.to_radians().sin_cos();

            let cos_lat = lat.cos();
            let x = lon.cos() * cos_lat;
            let y = lon.sin() * cos_lat;
            let z = lat.sin();
            let k = z * cos_dgamma - y * sin_dgamma;

            (
                (y * cos_dgamma + z * sin_dgamma).atan2(x * cos_dphi + k * sin_dphi),
                (k * cos_dphi - x * sin_dphi).clamp(-1.0, 1.0).asin(),
            )
        };
        (wrap_pi(lon - self.lambda_deg.to_radians()), lat)
    }
}

fn wrap_pi(lon: f64) -> f64 {
    if lon > PI {
        lon - TAU
    } else if lon < -PI {
        lon + TAU
    } else {
        lon
    }
}

#[cfg(test)]
mod tests {
    use super::{LonLat, Rotation};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn lambda_only_shifts_longitude() {
        let r = Rotation::new(30.0, 0.0, 0.0);
        let p = r.apply(LonLat::new(-10.0, 20.0));
        assert_close(p.lon_deg, 20.0, 1e-9);
        assert_close(p.lat_deg, 20.0, 1e-9);
    }

    #[test]
    fn longitude_wraps_into_range() {
        let r = Rotation::new(30.0, 0.0, 0.0);
        let p = r.apply(LonLat::new(170.0, 0.0));
        assert_close(p.lon_deg, -160.0, 1e-9);
    }

    #[test]
    fn phi_tilts_point_to_origin() {
        // Rotating by -phi brings a point at latitude phi to the origin.
        let r = Rotation::new(0.0, -40.0, 0.0);
        let p = r.apply(LonLat::new(0.0, 40.0));
        assert_close(p.lon_deg, 0.0, 1e-9);
        assert_close(p.lat_deg, 0.0, 1e-9);
    }

    #[test]
    fn invert_undoes_apply() {
        let r = Rotation::new(-96.0, 64.15, 12.0);
        let p = LonLat::new(-75.7, 45.4);
        let back = r.invert(r.apply(p));
        assert_close(back.lon_deg, p.lon_deg, 1e-9);
        assert_close(back.lat_deg, p.lat_deg, 1e-9);
    }

    #[test]
    fn from_angles_defaults_gamma() {
        assert_eq!(Rotation::from_angles(&[10.0, -5.0]), Rotation::new(10.0, -5.0, 0.0));
        assert_eq!(Rotation::from_angles(&[]), Rotation::default());
    }
}
