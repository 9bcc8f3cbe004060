use formats::Visitation;
use scene::Element;

pub const VISITED_FILL: &str = "var(--visited-color)";
pub const LIVED_FILL: &str = "var(--lived-color)";
pub const REST_FILL: &str = "var(--rest-color)";

pub fn region_fill(status: Visitation) -> &'static str {
    match status {
        Visitation::Visited => VISITED_FILL,
        Visitation::Lived => LIVED_FILL,
        Visitation::Unvisited => REST_FILL,
    }
}

fn visibility(visible: bool) -> &'static str {
    if visible { "visible" } else { "hidden" }
}

/// Inline style of a place marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub visible: bool,
    /// Overrides the stylesheet fill when set.
    pub fill: Option<String>,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            visible: true,
            fill: None,
        }
    }
}

impl MarkerStyle {
    pub fn apply(&self, e: &mut Element) {
        e.set_style("visibility", visibility(self.visible));
        if let Some(fill) = &self.fill {
            e.set_style("fill", fill.as_str());
        }
    }
}

/// Inline style of a flight arc.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyerStyle {
    pub stroke_width: f64,
    pub stroke: Option<String>,
}

impl Default for FlyerStyle {
    fn default() -> Self {
        Self {
            stroke_width: 2.0,
            stroke: None,
        }
    }
}

impl FlyerStyle {
    pub fn apply(&self, e: &mut Element) {
        e.set_style("stroke-width", scene::num(self.stroke_width));
        if let Some(stroke) = &self.stroke {
            e.set_style("stroke", stroke.as_str());
        }
    }
}

/// Inline style of a place label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub visible: bool,
    pub font_size_px: f64,
    pub font_weight: u16,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            visible: true,
            font_size_px: 6.0,
            font_weight: 300,
        }
    }
}

impl LabelStyle {
    pub fn apply(&self, e: &mut Element) {
        e.set_style("visibility", visibility(self.visible));
        e.set_style("font-size", format!("{}px", scene::num(self.font_size_px)));
        e.set_style("font-weight", self.font_weight.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::{FlyerStyle, LabelStyle, MarkerStyle, region_fill};
    use formats::Visitation;
    use scene::Element;

    #[test]
    fn fills_follow_visitation() {
        assert_eq!(region_fill(Visitation::Visited), "var(--visited-color)");
        assert_eq!(region_fill(Visitation::Lived), "var(--lived-color)");
        assert_eq!(region_fill(Visitation::Unvisited), "var(--rest-color)");
    }

    #[test]
    fn default_styles_write_no_overrides() {
        let mut flyer = Element::path("M0,0");
        FlyerStyle::default().apply(&mut flyer);
        assert_eq!(flyer.style("stroke-width"), Some("2"));
        assert_eq!(flyer.style("stroke"), None);

        let mut marker = Element::path("M0,0");
        MarkerStyle::default().apply(&mut marker);
        assert_eq!(marker.style("visibility"), Some("visible"));
        assert_eq!(marker.style("fill"), None);

        let mut label = Element::text("Rome");
        LabelStyle::default().apply(&mut label);
        assert_eq!(label.style("font-size"), Some("6px"));
        assert_eq!(label.style("font-weight"), Some("300"));
    }
}
