use formats::MapKind;
use scene::Element;

use crate::layer::{Frame, Layer};
use crate::path::PathGenerator;

pub fn marker_id(map: MapKind, place: &str) -> String {
    let prefix = match map {
        MapKind::World => "pw",
        MapKind::France => "pf",
        MapKind::Canada => "pc",
    };
    format!("{prefix}{place}")
}

/// Circle markers for the places tagged with the frame's map.
#[derive(Debug, Default, Copy, Clone)]
pub struct PointsLayer;

impl Layer for PointsLayer {
    fn render(&self, frame: &Frame<'_>) -> Option<Element> {
        let path = PathGenerator::new(frame.projection).with_point_radius(frame.point_radius);
        let styles = frame
            .highlight
            .resolve(&frame.travel.links, &frame.params.flyer);
        let markers = frame
            .travel
            .places_on(frame.map)
            .map(|place| {
                let mut e = Element::path(path.point(place.location))
                    .with_id(marker_id(frame.map, &place.name))
                    .with_class("point");
                // Hover emphasis only applies to the globe, where the flyers live.
                if frame.map == MapKind::World {
                    styles.marker(&place.name).apply(&mut e);
                }
                e
            })
            .collect();
        Some(Element::group("points").with_children(markers))
    }
}
