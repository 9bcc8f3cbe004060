use std::f64::consts::FRAC_PI_2;

use foundation::math::{GeoProjection, LonLat, Vec2, angular_distance};
use formats::Place;
use scene::{Element, num};

use crate::highlight::HighlightStyles;
use crate::layer::{Frame, Layer};

/// Horizontal distance from the view center within which labels are centered.
const CENTER_BAND_PX: f64 = 20.0;
const OFFSET_X_PX: f64 = 5.0;
const OFFSET_Y_PX: f64 = -2.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelPlacement {
    pub anchor: TextAnchor,
    /// Text origin after the side offset.
    pub position: Vec2,
    pub displayed: bool,
}

impl LabelPlacement {
    pub fn transform(&self) -> String {
        format!("translate({},{})", num(self.position.x), num(self.position.y))
    }
}

/// Places a label next to its point: labels left of the center hang to the
/// left, labels right of it to the right, and labels on the far hemisphere
/// are not displayed.
pub fn place_label<P: GeoProjection + ?Sized>(
    projection: &P,
    view_center: LonLat,
    at: LonLat,
) -> LabelPlacement {
    let cx = projection.translate().x;
    let xy = projection.project(at);
    let anchor = if xy.x < cx - CENTER_BAND_PX {
        TextAnchor::End
    } else if xy.x < cx + CENTER_BAND_PX {
        TextAnchor::Middle
    } else {
        TextAnchor::Start
    };
    let dx = if xy.x < cx { -OFFSET_X_PX } else { OFFSET_X_PX };
    LabelPlacement {
        anchor,
        position: Vec2::new(xy.x + dx, xy.y + OFFSET_Y_PX),
        displayed: angular_distance(at, view_center) <= FRAC_PI_2,
    }
}

/// Place names on the globe.
#[derive(Debug, Default, Copy, Clone)]
pub struct LabelsLayer;

impl LabelsLayer {
    fn label(
        &self,
        frame: &Frame<'_>,
        center: LonLat,
        styles: &HighlightStyles<'_>,
        place: &Place,
    ) -> Element {
        let placement = place_label(frame.projection, center, place.location);
        let mut e = Element::text(place.name.as_str())
            .with_class("label")
            .with_id(format!("l{}", place.name))
            .with_attr("text-anchor", placement.anchor.as_str())
            .with_attr("transform", placement.transform())
            .with_style("display", if placement.displayed { "inline" } else { "none" });
        styles.label(&place.name).apply(&mut e);
        e
    }
}

impl Layer for LabelsLayer {
    fn render(&self, frame: &Frame<'_>) -> Option<Element> {
        let center = frame.projection.view_center();
        let styles = frame
            .highlight
            .resolve(&frame.travel.links, &frame.params.flyer);
        let labels = frame
            .travel
            .places_on(frame.map)
            .map(|place| self.label(frame, center, &styles, place))
            .collect();
        Some(Element::group("labels").with_children(labels))
    }
}
