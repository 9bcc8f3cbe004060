//! Globe body: drop shadow, gradient-filled discs and the land mass.

use scene::Element;

use crate::layer::{Frame, Layer};
use crate::path::PathGenerator;

/// Flattened shadow ellipse below and slightly left of the globe.
#[derive(Debug, Default, Copy, Clone)]
pub struct DropShadowLayer;

impl Layer for DropShadowLayer {
    fn render(&self, frame: &Frame<'_>) -> Option<Element> {
        let center = frame.projection.translate();
        let r = frame.projection.scale();
        Some(
            Element::ellipse(center.x - 40.0, center.y + r - 20.0, r * 0.9, r * 0.25)
                .with_class("noclicks")
                .with_style("fill", "url(#drop_shadow)"),
        )
    }
}

/// A disc covering the globe, filled with one of the page's gradients.
#[derive(Debug, Copy, Clone)]
pub struct DiscLayer {
    pub gradient: &'static str,
}

impl DiscLayer {
    pub const OCEAN: Self = Self {
        gradient: "ocean_fill",
    };
    pub const HIGHLIGHT: Self = Self {
        gradient: "globe_highlight",
    };
    pub const SHADING: Self = Self {
        gradient: "globe_shading",
    };
}

impl Layer for DiscLayer {
    fn render(&self, frame: &Frame<'_>) -> Option<Element> {
        let center = frame.projection.translate();
        Some(
            Element::circle(center.x, center.y, frame.projection.scale())
                .with_class("noclicks")
                .with_style("fill", format!("url(#{})", self.gradient)),
        )
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct LandLayer;

impl Layer for LandLayer {
    fn render(&self, frame: &Frame<'_>) -> Option<Element> {
        let land = frame.geography.land.as_ref()?;
        let path = PathGenerator::new(frame.projection);
        Some(Element::path(path.geometry(&land.geometry)).with_class("land"))
    }
}
