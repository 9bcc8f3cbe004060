use foundation::math::LonLat;
use formats::Geometry;
use scene::Element;

use crate::layer::{Frame, Layer};
use crate::path::PathGenerator;

const STEP_DEG: i32 = 10;
const MAJOR_STEP_DEG: i32 = 90;
const MINOR_EXTENT_DEG: f64 = 80.0;
const PRECISION_DEG: f64 = 2.5;

/// Graticule lines: meridians and parallels every 10°. Minor meridians stop
/// at ±80°, the ones at multiples of 90° run pole to pole.
pub fn graticule_lines() -> Vec<Vec<LonLat>> {
    let mut lines = Vec::new();
    // -180 and 180 are the same meridian.
    for lon in (-180..180).step_by(STEP_DEG as usize) {
        let major = lon % MAJOR_STEP_DEG == 0;
        let extent = if major { 90.0 } else { MINOR_EXTENT_DEG };
        lines.push(meridian(lon as f64, extent));
    }
    for lat in (-80..=80).step_by(STEP_DEG as usize) {
        lines.push(parallel(lat as f64));
    }
    lines
}

pub fn graticule() -> Geometry {
    Geometry::MultiLineString(graticule_lines())
}

fn steps(from: f64, to: f64) -> impl Iterator<Item = f64> {
    let n = ((to - from) / PRECISION_DEG).ceil() as usize;
    (0..=n).map(move |i| (from + i as f64 * PRECISION_DEG).min(to))
}

fn meridian(lon: f64, extent: f64) -> Vec<LonLat> {
    steps(-extent, extent).map(|lat| LonLat::new(lon, lat)).collect()
}

fn parallel(lat: f64) -> Vec<LonLat> {
    steps(-180.0, 180.0).map(|lon| LonLat::new(lon, lat)).collect()
}

#[derive(Debug, Default, Copy, Clone)]
pub struct GraticuleLayer;

impl Layer for GraticuleLayer {
    fn render(&self, frame: &Frame<'_>) -> Option<Element> {
        let path = PathGenerator::new(frame.projection);
        Some(Element::path(path.geometry(&graticule())).with_class("graticule noclicks"))
    }
}
