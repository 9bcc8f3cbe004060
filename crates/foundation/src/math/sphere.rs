use std::f64::consts::PI;

use super::Vec3;

/// Geographic position in degrees, longitude first (GeoJSON order).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn from_radians(lon_rad: f64, lat_rad: f64) -> Self {
        Self::new(lon_rad.to_degrees(), lat_rad.to_degrees())
    }

    pub fn lon_rad(self) -> f64 {
        self.lon_deg.to_radians()
    }

    pub fn lat_rad(self) -> f64 {
        self.lat_deg.to_radians()
    }

    pub fn is_finite(self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite()
    }

    /// Point on the unit sphere: +x at (0°, 0°), +y at (90°E, 0°), +z at the north pole.
    pub fn to_unit(self) -> Vec3 {
        let lon = self.lon_rad();
        let lat = self.lat_rad();
        let cos_lat = lat.cos();
        Vec3::new(cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin())
    }

    pub fn from_unit(u: Vec3) -> Self {
        let lon = u.y.atan2(u.x);
        let lat = u.z.atan2((u.x * u.x + u.y * u.y).sqrt());
        Self::from_radians(lon, lat)
    }
}

/// Great-circle distance between two positions, in radians.
pub fn angular_distance(a: LonLat, b: LonLat) -> f64 {
    let (lon0, lat0) = (a.lon_rad(), a.lat_rad());
    let (lon1, lat1) = (b.lon_rad(), b.lat_rad());
    let (sin_lat0, cos_lat0) = lat0.sin_cos();
    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_delta, cos_delta) = (lon1 - lon0).abs().sin_cos();

    let x = cos_lat1 * sin_delta;
    let y = cos_lat0 * sin_lat1 - sin_lat0 * cos_lat1 * cos_delta;
    let z = sin_lat0 * sin_lat1 + cos_lat0 * cos_lat1 * cos_delta;
    (x * x + y * y).sqrt().atan2(z)
}

/// Position at fraction `t` along the great circle from `a` to `b`.
///
/// Coincident endpoints yield `a`. Antipodal endpoints have no unique great
/// circle; one through an arbitrary perpendicular axis is used.
pub fn interpolate_great_circle(a: LonLat, b: LonLat, t: f64) -> LonLat {
    let d = angular_distance(a, b);
    if d < 1e-12 {
        return a;
    }

    let ua = a.to_unit();
    let ub = b.to_unit();
    let k = d.sin();
    if k.abs() < 1e-12 {
        let mut axis = ua.cross(Vec3::new(0.0, 0.0, 1.0));
        if axis.dot(axis) < 1e-12 {
            axis = ua.cross(Vec3::new(1.0, 0.0, 0.0));
        }
        let axis = axis.normalize();
        let theta = t * PI;
        return LonLat::from_unit(ua.scale(theta.cos()) + axis.scale(theta.sin()));
    }

    let wa = ((1.0 - t) * d).sin() / k;
    let wb = (t * d).sin() / k;
    LonLat::from_unit(ua.scale(wa) + ub.scale(wb))
}

/// Samples the great circle from `a` to `b` so that consecutive points are at
/// most `max_step_deg` apart. Both endpoints are included.
pub fn sample_great_circle(a: LonLat, b: LonLat, max_step_deg: f64) -> Vec<LonLat> {
    let d = angular_distance(a, b).to_degrees();
    let steps = (d / max_step_deg.max(1e-6)).ceil().max(1.0) as usize;
    let mut out = Vec::with_capacity(steps + 1);
    out.push(a);
    for i in 1..steps {
        out.push(interpolate_great_circle(a, b, i as f64 / steps as f64));
    }
    out.push(b);
    out
}

#[cfg(test)]
mod tests {
    use super::{LonLat, angular_distance, interpolate_great_circle, sample_great_circle};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn distance_quarter_turn() {
        let d = angular_distance(LonLat::new(0.0, 0.0), LonLat::new(90.0, 0.0));
        assert_close(d, FRAC_PI_2, 1e-12);
        let d = angular_distance(LonLat::new(10.0, 0.0), LonLat::new(10.0, 90.0));
        assert_close(d, FRAC_PI_2, 1e-12);
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = LonLat::new(2.35, 48.85);
        let b = LonLat::new(-73.57, 45.50);
        assert_close(angular_distance(a, b), angular_distance(b, a), 1e-12);
        assert_close(angular_distance(a, a), 0.0, 1e-12);
    }

    #[test]
    fn distance_antipodes() {
        let d = angular_distance(LonLat::new(0.0, 0.0), LonLat::new(180.0, 0.0));
        assert_close(d, PI, 1e-12);
    }

    #[test]
    fn interpolate_along_equator() {
        let p = interpolate_great_circle(LonLat::new(0.0, 0.0), LonLat::new(90.0, 0.0), 1.0 / 3.0);
        assert_close(p.lon_deg, 30.0, 1e-9);
        assert_close(p.lat_deg, 0.0, 1e-9);
    }

    #[test]
    fn interpolate_endpoints() {
        let a = LonLat::new(2.35, 48.85);
        let b = LonLat::new(-73.57, 45.50);
        let p0 = interpolate_great_circle(a, b, 0.0);
        let p1 = interpolate_great_circle(a, b, 1.0);
        assert_close(p0.lon_deg, a.lon_deg, 1e-9);
        assert_close(p0.lat_deg, a.lat_deg, 1e-9);
        assert_close(p1.lon_deg, b.lon_deg, 1e-9);
        assert_close(p1.lat_deg, b.lat_deg, 1e-9);
    }

    #[test]
    fn interpolate_splits_distance_proportionally() {
        let a = LonLat::new(2.35, 48.85);
        let b = LonLat::new(139.69, 35.68);
        let total = angular_distance(a, b);
        let mid = interpolate_great_circle(a, b, 0.25);
        assert_close(angular_distance(a, mid), total * 0.25, 1e-9);
        assert_close(angular_distance(mid, b), total * 0.75, 1e-9);
    }

    #[test]
    fn interpolate_coincident_and_antipodal() {
        let a = LonLat::new(12.0, -4.0);
        assert_eq!(interpolate_great_circle(a, a, 0.5), a);

        let p = interpolate_great_circle(LonLat::new(0.0, 0.0), LonLat::new(180.0, 0.0), 0.5);
        assert!(p.is_finite());
        assert_close(angular_distance(LonLat::new(0.0, 0.0), p), PI / 2.0, 1e-9);
    }

    #[test]
    fn sampling_respects_step() {
        let pts = sample_great_circle(LonLat::new(0.0, 0.0), LonLat::new(10.0, 0.0), 2.5);
        assert_eq!(pts.len(), 5);
        for w in pts.windows(2) {
            assert!(angular_distance(w[0], w[1]).to_degrees() <= 2.5 + 1e-9);
        }
    }
}
