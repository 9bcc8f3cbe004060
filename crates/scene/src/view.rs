use foundation::math::{
    ConicConformal, GeoProjection, LonLat, Mercator, Orthographic, Projection, Rotation, Vec2,
};
use formats::{MapKind, Parameters};

/// Projection state of the globe.
///
/// The surface projection draws the land and markers; the sky projection is
/// the same view with the radius enlarged by the flyer altitude, so points
/// projected through it float above the surface. Both always share one
/// rotation, and the elevation angle never leaves `[-max_elevation, max_elevation]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeView {
    surface: Projection<Orthographic>,
    sky: Projection<Orthographic>,
    max_elevation: f64,
}

impl GlobeView {
    pub fn new(
        radius: f64,
        altitude: f64,
        offset: Vec2,
        rotation: Rotation,
        max_elevation: f64,
    ) -> Self {
        let base = |scale: f64| {
            Projection::orthographic()
                .with_scale(scale)
                .with_translate(offset)
                .with_clip_angle(90.0)
        };
        let mut view = Self {
            surface: base(radius),
            sky: base(radius + altitude),
            max_elevation,
        };
        view.set_rotation(rotation);
        view
    }

    pub fn from_params(params: &Parameters) -> Self {
        Self::new(
            params.earth.size.radius,
            params.flyer.altitude,
            params.offset.to_vec2(),
            params.init_rotation(),
            params.earth.max_elevation,
        )
    }

    pub fn surface(&self) -> &Projection<Orthographic> {
        &self.surface
    }

    pub fn sky(&self) -> &Projection<Orthographic> {
        &self.sky
    }

    pub fn rotation(&self) -> Rotation {
        self.surface.rotation()
    }

    pub fn max_elevation(&self) -> f64 {
        self.max_elevation
    }

    pub fn radius(&self) -> f64 {
        self.surface.scale()
    }

    pub fn offset(&self) -> Vec2 {
        self.surface.translate()
    }

    /// Applies `rotation` to both projections with φ clamped, returning what
    /// was applied.
    pub fn set_rotation(&mut self, rotation: Rotation) -> Rotation {
        let applied = Rotation {
            phi_deg: clamp_elevation(rotation.phi_deg, self.max_elevation),
            ..rotation
        };
        self.surface.set_rotation(applied);
        self.sky.set_rotation(applied);
        applied
    }

    pub fn view_center(&self) -> LonLat {
        self.surface.view_center()
    }
}

pub fn clamp_elevation(phi_deg: f64, max_elevation: f64) -> f64 {
    phi_deg.clamp(-max_elevation, max_elevation)
}

/// Projection and marker size of a flat inset map.
#[derive(Debug, Clone, PartialEq)]
pub enum InsetView {
    France(Projection<ConicConformal>),
    Canada(Projection<Mercator>),
}

impl InsetView {
    pub fn for_map(map: MapKind) -> Option<Self> {
        match map {
            MapKind::World => None,
            MapKind::France => Some(InsetView::France(
                Projection::conic_conformal()
                    .with_center(LonLat::new(2.454071, 46.279229))
                    .with_scale(2800.0),
            )),
            MapKind::Canada => Some(InsetView::Canada(
                Projection::mercator()
                    .with_scale(450.0)
                    .with_rotation(Rotation::new(96.0, -64.15, 0.0)),
            )),
        }
    }

    pub fn map(&self) -> MapKind {
        match self {
            InsetView::France(_) => MapKind::France,
            InsetView::Canada(_) => MapKind::Canada,
        }
    }

    pub fn projection(&self) -> &dyn GeoProjection {
        match self {
            InsetView::France(p) => p,
            InsetView::Canada(p) => p,
        }
    }

    pub fn marker_radius(&self) -> f64 {
        match self {
            InsetView::France(_) => 3.5,
            InsetView::Canada(_) => 2.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobeView, InsetView, clamp_elevation};
    use foundation::math::{GeoProjection, LonLat, Rotation, Vec2};
    use formats::MapKind;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn view() -> GlobeView {
        GlobeView::new(248.0, 60.0, Vec2::new(400.0, 300.0), Rotation::default(), 60.0)
    }

    #[test]
    fn surface_and_sky_share_rotation() {
        let mut v = view();
        let applied = v.set_rotation(Rotation::new(10.0, -5.0, 0.0));
        assert_eq!(applied, Rotation::new(10.0, -5.0, 0.0));
        assert_eq!(v.surface().rotation(), v.sky().rotation());
        assert_eq!(v.sky().scale(), 308.0);
        assert_eq!(v.radius(), 248.0);
    }

    #[test]
    fn elevation_is_clamped_to_exact_bound() {
        let mut v = view();
        let applied = v.set_rotation(Rotation::new(30.0, 75.0, 12.0));
        assert_eq!(applied, Rotation::new(30.0, 60.0, 12.0));
        assert_eq!(v.sky().rotation().phi_deg, 60.0);
        assert_eq!(clamp_elevation(-90.0, 60.0), -60.0);
        assert_eq!(clamp_elevation(-59.5, 60.0), -59.5);
    }

    #[test]
    fn construction_clamps_initial_rotation() {
        let v = GlobeView::new(
            100.0,
            10.0,
            Vec2::new(0.0, 0.0),
            Rotation::new(0.0, -80.0, 0.0),
            45.0,
        );
        assert_eq!(v.rotation().phi_deg, -45.0);
    }

    #[test]
    fn view_center_follows_rotation() {
        let mut v = view();
        v.set_rotation(Rotation::new(-20.0, -30.0, 0.0));
        let c = v.view_center();
        assert_close(c.lon_deg, 20.0, 1e-9);
        assert_close(c.lat_deg, 30.0, 1e-9);
    }

    #[test]
    fn inset_maps_center_their_regions() {
        let france = InsetView::for_map(MapKind::France).expect("france");
        let xy = france.projection().project(LonLat::new(2.454071, 46.279229));
        assert_close(xy.x, 480.0, 1e-6);
        assert_close(xy.y, 250.0, 1e-6);
        assert_eq!(france.marker_radius(), 3.5);

        let canada = InsetView::for_map(MapKind::Canada).expect("canada");
        let xy = canada.projection().project(LonLat::new(-96.0, 64.15));
        assert_close(xy.x, 480.0, 1e-6);
        assert_close(xy.y, 250.0, 1e-6);
        assert!(InsetView::for_map(MapKind::World).is_none());
    }
}
