//! Cartographic projections from the sphere to screen pixels.
//!
//! A [`Projection`] wraps a unitless raw projection with rotation, centering,
//! scale and translation. Screen y grows downward.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::{LonLat, Rotation, Vec2};

const EPSILON: f64 = 1e-6;

/// Screen-facing projection interface used by every renderer.
pub trait GeoProjection {
    /// Screen position of a geographic point. Points outside the clip
    /// region still project; clipping is the path generator's concern.
    fn project(&self, p: LonLat) -> Vec2;

    /// Geographic position under a screen point, if the point lies on the map.
    fn invert(&self, p: Vec2) -> Option<LonLat>;

    fn rotation(&self) -> Rotation;

    fn scale(&self) -> f64;

    fn translate(&self) -> Vec2;

    /// Small-circle clip radius in degrees around the view center, if any.
    fn clip_angle(&self) -> Option<f64> {
        None
    }

    /// Geographic point under the translate origin, i.e. the one facing the viewer.
    fn view_center(&self) -> LonLat {
        self.invert(self.translate())
            .unwrap_or_else(|| self.rotation().invert(LonLat::new(0.0, 0.0)))
    }
}

/// Unitless projection of rotated coordinates (radians).
pub trait RawProjection {
    fn forward(&self, lon: f64, lat: f64) -> [f64; 2];
    fn inverse(&self, x: f64, y: f64) -> Option<[f64; 2]>;
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Orthographic;

impl RawProjection for Orthographic {
    fn forward(&self, lon: f64, lat: f64) -> [f64; 2] {
        [lat.cos() * lon.sin(), lat.sin()]
    }

    fn inverse(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        let z = (x * x + y * y).sqrt();
        if z > 1.0 + EPSILON {
            return None;
        }
        let c = z.min(1.0).asin();
        let (sc, cc) = c.sin_cos();
        let lat = if z == 0.0 { 0.0 } else { (y * sc / z).clamp(-1.0, 1.0).asin() };
        Some([(x * sc).atan2(z * cc), lat])
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Mercator;

impl RawProjection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> [f64; 2] {
        let lat = lat.clamp(-FRAC_PI_2 + EPSILON, FRAC_PI_2 - EPSILON);
        [lon, (FRAC_PI_4 + lat / 2.0).tan().ln()]
    }

    fn inverse(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        Some([x, 2.0 * y.exp().atan() - FRAC_PI_2])
    }
}

/// Lambert conformal conic with two standard parallels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ConicConformal {
    n: f64,
    f: f64,
}

impl Default for ConicConformal {
    fn default() -> Self {
        Self::new(30.0, 30.0)
    }
}

impl ConicConformal {
    pub fn new(parallel0_deg: f64, parallel1_deg: f64) -> Self {
        let y0 = parallel0_deg.to_radians();
        let y1 = parallel1_deg.to_radians();
        let cy0 = y0.cos();
        let n = if y0 == y1 {
            y0.sin()
        } else {
            (cy0 / y1.cos()).ln() / (tany(y1) / tany(y0)).ln()
        };
        let f = if n == 0.0 { 0.0 } else { cy0 * tany(y0).powf(n) / n };
        Self { n, f }
    }
}

fn tany(y: f64) -> f64 {
    ((FRAC_PI_2 + y) / 2.0).tan()
}

impl RawProjection for ConicConformal {
    fn forward(&self, lon: f64, lat: f64) -> [f64; 2] {
        if self.n == 0.0 {
            return Mercator.forward(lon, lat);
        }
        let lat = if self.f > 0.0 {
            lat.max(-FRAC_PI_2 + EPSILON)
        } else {
            lat.min(FRAC_PI_2 - EPSILON)
        };
        let r = self.f / tany(lat).powf(self.n);
        [r * (self.n * lon).sin(), self.f - r * (self.n * lon).cos()]
    }

    fn inverse(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        if self.n == 0.0 {
            return Mercator.inverse(x, y);
        }
        let fy = self.f - y;
        let r = self.n.signum() * (x * x + fy * fy).sqrt();
        let mut l = x.atan2(fy.abs()) * fy.signum();
        if fy * self.n < 0.0 {
            l -= std::f64::consts::PI * x.signum() * fy.signum();
        }
        Some([
            l / self.n,
            2.0 * (self.f / r).powf(1.0 / self.n).atan() - FRAC_PI_2,
        ])
    }
}

/// A configured projection: rotate, project, then scale and translate.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<R> {
    raw: R,
    scale: f64,
    translate: Vec2,
    center: LonLat,
    rotation: Rotation,
    clip_angle: Option<f64>,
    // Offset applied after scaling so that `center` lands on `translate`.
    dx: f64,
    dy: f64,
}

impl<R: RawProjection> Projection<R> {
    pub fn new(raw: R) -> Self {
        let mut p = Self {
            raw,
            scale: 150.0,
            translate: Vec2::new(480.0, 250.0),
            center: LonLat::new(0.0, 0.0),
            rotation: Rotation::default(),
            clip_angle: None,
            dx: 0.0,
            dy: 0.0,
        };
        p.recenter();
        p
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self.recenter();
        self
    }

    pub fn with_translate(mut self, translate: Vec2) -> Self {
        self.translate = translate;
        self.recenter();
        self
    }

    pub fn with_center(mut self, center: LonLat) -> Self {
        self.center = center;
        self.recenter();
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_clip_angle(mut self, clip_angle_deg: f64) -> Self {
        self.clip_angle = Some(clip_angle_deg);
        self
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    fn recenter(&mut self) {
        let c = self
            .raw
            .forward(self.center.lon_rad(), self.center.lat_rad());
        self.dx = self.translate.x - self.scale * c[0];
        self.dy = self.translate.y + self.scale * c[1];
    }
}

impl Projection<Orthographic> {
    pub fn orthographic() -> Self {
        Self::new(Orthographic).with_scale(249.5)
    }
}

impl Projection<Mercator> {
    pub fn mercator() -> Self {
        Self::new(Mercator).with_scale(961.0 / std::f64::consts::TAU)
    }
}

impl Projection<ConicConformal> {
    pub fn conic_conformal() -> Self {
        Self::new(ConicConformal::default()).with_scale(109.5)
    }
}

impl<R: RawProjection> GeoProjection for Projection<R> {
    fn project(&self, p: LonLat) -> Vec2 {
        let (lon, lat) = self.rotation.apply_radians(p.lon_rad(), p.lat_rad());
        let xy = self.raw.forward(lon, lat);
        Vec2::new(self.dx + self.scale * xy[0], self.dy - self.scale * xy[1])
    }

    fn invert(&self, p: Vec2) -> Option<LonLat> {
        let x = (p.x - self.dx) / self.scale;
        let y = (self.dy - p.y) / self.scale;
        let [lon, lat] = self.raw.inverse(x, y)?;
        let (lon, lat) = self.rotation.invert_radians(lon, lat);
        let out = LonLat::from_radians(lon, lat);
        out.is_finite().then_some(out)
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn translate(&self) -> Vec2 {
        self.translate
    }

    fn clip_angle(&self) -> Option<f64> {
        self.clip_angle
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoProjection, LonLat, Projection, Rotation, Vec2};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn globe() -> Projection<super::Orthographic> {
        Projection::orthographic()
            .with_scale(248.0)
            .with_translate(Vec2::new(400.0, 300.0))
            .with_clip_angle(90.0)
    }

    #[test]
    fn orthographic_center_maps_to_translate() {
        let p = globe().project(LonLat::new(0.0, 0.0));
        assert_close(p.x, 400.0, 1e-9);
        assert_close(p.y, 300.0, 1e-9);
    }

    #[test]
    fn orthographic_limb_and_pole() {
        let proj = globe();
        let east = proj.project(LonLat::new(90.0, 0.0));
        assert_close(east.x, 648.0, 1e-9);
        assert_close(east.y, 300.0, 1e-9);
        let north = proj.project(LonLat::new(0.0, 90.0));
        assert_close(north.x, 400.0, 1e-9);
        assert_close(north.y, 52.0, 1e-9);
    }

    #[test]
    fn orthographic_invert_round_trip_with_rotation() {
        let proj = globe().with_rotation(Rotation::new(-20.0, -35.0, 0.0));
        let p = LonLat::new(15.0, 40.0);
        let back = proj.invert(proj.project(p)).expect("on the globe");
        assert_close(back.lon_deg, p.lon_deg, 1e-9);
        assert_close(back.lat_deg, p.lat_deg, 1e-9);
    }

    #[test]
    fn orthographic_invert_off_disc_is_none() {
        assert_eq!(globe().invert(Vec2::new(0.0, 0.0)), None);
    }

    #[test]
    fn orthographic_view_center_follows_rotation() {
        let proj = globe().with_rotation(Rotation::new(-30.0, -10.0, 0.0));
        let c = proj.invert(Vec2::new(400.0, 300.0)).expect("center");
        assert_close(c.lon_deg, 30.0, 1e-9);
        assert_close(c.lat_deg, 10.0, 1e-9);
    }

    #[test]
    fn centered_conic_puts_center_on_translate() {
        let proj = Projection::conic_conformal()
            .with_center(LonLat::new(2.454071, 46.279229))
            .with_scale(2800.0);
        let p = proj.project(LonLat::new(2.454071, 46.279229));
        assert_close(p.x, 480.0, 1e-6);
        assert_close(p.y, 250.0, 1e-6);
        let paris = proj.project(LonLat::new(2.35, 48.85));
        assert!(paris.y < 250.0, "north is up");
        let back = proj.invert(paris).expect("invertible");
        assert_close(back.lon_deg, 2.35, 1e-6);
        assert_close(back.lat_deg, 48.85, 1e-6);
    }

    #[test]
    fn mercator_round_trip_with_rotation() {
        let proj = Projection::mercator()
            .with_scale(450.0)
            .with_rotation(Rotation::new(96.0, -64.15, 0.0));
        let p = LonLat::new(-79.38, 43.65);
        let back = proj.invert(proj.project(p)).expect("invertible");
        assert_close(back.lon_deg, p.lon_deg, 1e-6);
        assert_close(back.lat_deg, p.lat_deg, 1e-6);
    }
}
