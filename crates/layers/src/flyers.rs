//! Flight arcs between places.
//!
//! A flyer leaves the surface at its source, climbs through two control
//! points projected on the enlarged sky sphere and lands on its target. Under
//! it runs the ground track, the great circle drawn on the surface. Both fade
//! out as either endpoint approaches the horizon.

use std::f64::consts::FRAC_PI_2;

use foundation::math::{
    GeoProjection, LonLat, Vec2, angular_distance, interpolate_great_circle, sample_great_circle,
};
use formats::{FadeParams, ResolvedLink};
use scene::{Element, num};

use crate::curve::basis_path;
use crate::layer::{Frame, Layer};
use crate::path::PathGenerator;

const GROUND_STEP_DEG: f64 = 2.5;

/// Screen control points of a flyer: surface, sky at 1/3, sky at 2/3, surface.
pub fn flying_arc<S, K>(surface: &S, sky: &K, from: LonLat, to: LonLat) -> [Vec2; 4]
where
    S: GeoProjection + ?Sized,
    K: GeoProjection + ?Sized,
{
    let mid1 = interpolate_great_circle(from, to, 1.0 / 3.0);
    let mid2 = interpolate_great_circle(from, to, 2.0 / 3.0);
    [
        surface.project(from),
        sky.project(mid1),
        sky.project(mid2),
        surface.project(to),
    ]
}

/// Opacity of an arc given the point facing the viewer.
///
/// Each endpoint's margin is how far inside the horizon it sits
/// (`π/2 - distance`). The smaller margin maps linearly from `[0, width]`
/// onto `[0, max_opacity]`, clamped at both ends.
pub fn fade_at_edge(view_center: LonLat, from: LonLat, to: LonLat, fade: FadeParams) -> f64 {
    let margin = |p: LonLat| FRAC_PI_2 - angular_distance(p, view_center);
    let m = margin(from).min(margin(to));
    (m / fade.width).clamp(0.0, 1.0) * fade.max_opacity
}

pub fn ground_track<P: GeoProjection + ?Sized>(
    path: &PathGenerator<'_, P>,
    link: &ResolvedLink,
) -> String {
    path.line(&sample_great_circle(link.from, link.to, GROUND_STEP_DEG))
}

/// Great-circle tracks under the flyers.
#[derive(Debug, Default, Copy, Clone)]
pub struct ArcsLayer;

impl Layer for ArcsLayer {
    fn render(&self, frame: &Frame<'_>) -> Option<Element> {
        let path = PathGenerator::new(frame.projection);
        let center = frame.projection.view_center();
        let fade = frame.params.flyer.fade;
        let arcs = frame
            .travel
            .links
            .iter()
            .map(|link| {
                let opacity = fade_at_edge(center, link.from, link.to, fade);
                Element::path(ground_track(&path, link))
                    .with_class("arc")
                    .with_attr("opacity", num_opacity(opacity))
            })
            .collect();
        Some(Element::group("arcs").with_children(arcs))
    }
}

/// The lifted flight paths; the hover targets of the page.
#[derive(Debug, Default, Copy, Clone)]
pub struct FlyersLayer;

impl Layer for FlyersLayer {
    fn render(&self, frame: &Frame<'_>) -> Option<Element> {
        let sky = frame.sky?;
        let center = frame.projection.view_center();
        let fade = frame.params.flyer.fade;
        let styles = frame
            .highlight
            .resolve(&frame.travel.links, &frame.params.flyer);
        let flyers = frame
            .travel
            .links
            .iter()
            .enumerate()
            .map(|(index, link)| {
                let ctrl = flying_arc(frame.projection, sky, link.from, link.to);
                let opacity = fade_at_edge(center, link.from, link.to, fade);
                let mut e = Element::path(basis_path(&ctrl))
                    .with_class("flyer")
                    .with_id(link.key())
                    .with_attr("data-link", index.to_string())
                    .with_attr("opacity", num_opacity(opacity));
                styles.flyer(link).apply(&mut e);
                e
            })
            .collect();
        Some(Element::group("flyers").with_children(flyers))
    }
}

// Opacities are small; keep more precision than screen coordinates.
fn num_opacity(v: f64) -> String {
    if v == 0.0 {
        return num(0.0);
    }
    let s = format!("{v:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::{fade_at_edge, flying_arc, num_opacity};
    use foundation::math::{GeoProjection, LonLat, Projection, Vec2};
    use formats::FadeParams;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    const FADE: FadeParams = FadeParams {
        width: 0.1,
        max_opacity: 0.1,
    };

    #[test]
    fn endpoints_at_center_get_full_opacity() {
        let c = LonLat::new(0.0, 0.0);
        assert_close(fade_at_edge(c, c, c, FADE), 0.1, 1e-12);
    }

    #[test]
    fn endpoint_on_horizon_gets_zero() {
        let c = LonLat::new(0.0, 0.0);
        assert_close(fade_at_edge(c, c, LonLat::new(90.0, 0.0), FADE), 0.0, 1e-12);
        assert_eq!(fade_at_edge(c, LonLat::new(150.0, 10.0), c, FADE), 0.0);
    }

    #[test]
    fn opacity_never_decreases_toward_center() {
        let c = LonLat::new(0.0, 0.0);
        let mut last = 0.0;
        for step in 0..=90 {
            let lon = 90.0 - step as f64;
            let p = LonLat::new(lon, 0.0);
            let o = fade_at_edge(c, p, LonLat::new(-lon, 0.0), FADE);
            assert!(o >= last, "opacity dropped at lon {lon}: {o} < {last}");
            last = o;
        }
        assert_close(last, 0.1, 1e-12);
    }

    #[test]
    fn fade_ramp_is_linear_inside_width() {
        let c = LonLat::new(0.0, 0.0);
        // Margin of 0.05 rad is half of the ramp.
        let p = LonLat::from_radians(std::f64::consts::FRAC_PI_2 - 0.05, 0.0);
        assert_close(fade_at_edge(c, c, p, FADE), 0.05, 1e-9);
    }

    #[test]
    fn flyer_midpoints_ride_the_sky_sphere() {
        let surface = Projection::orthographic()
            .with_scale(100.0)
            .with_translate(Vec2::new(0.0, 0.0))
            .with_clip_angle(90.0);
        let sky = Projection::orthographic()
            .with_scale(150.0)
            .with_translate(Vec2::new(0.0, 0.0))
            .with_clip_angle(90.0);
        let from = LonLat::new(-30.0, 0.0);
        let to = LonLat::new(30.0, 0.0);
        let ctrl = flying_arc(&surface, &sky, from, to);
        assert_close(ctrl[0].x, -50.0, 1e-9);
        assert_close(ctrl[3].x, 50.0, 1e-9);
        // One third of the way from -30 to 30 is -10 degrees.
        assert_close(ctrl[1].x, 150.0 * (-10f64).to_radians().sin(), 1e-9);
        assert_close(ctrl[2].x, 150.0 * 10f64.to_radians().sin(), 1e-9);
        assert_close(ctrl[1].y, 0.0, 1e-9);
        assert_close(surface.project(from).y, 0.0, 1e-9);
    }

    #[test]
    fn opacity_keeps_four_decimals() {
        assert_eq!(num_opacity(0.0), "0");
        assert_eq!(num_opacity(0.1), "0.1");
        assert_eq!(num_opacity(0.012345), "0.0123");
    }
}
