use formats::{MapKind, Visitation};
use scene::Element;

use crate::layer::{Frame, Layer};
use crate::path::PathGenerator;
use crate::symbology::region_fill;

/// Element id prefix of a region on each map. World countries keep the
/// numeric-id form `c<id>`.
pub fn region_id_prefix(map: MapKind) -> &'static str {
    match map {
        MapKind::World => "c",
        MapKind::France => "rf",
        MapKind::Canada => "rc",
    }
}

/// Countries, departments or provinces filled by visitation status.
#[derive(Debug, Default, Copy, Clone)]
pub struct RegionsLayer;

impl Layer for RegionsLayer {
    fn render(&self, frame: &Frame<'_>) -> Option<Element> {
        let path = PathGenerator::new(frame.projection);
        let history = frame.params.history(frame.map);
        let prefix = region_id_prefix(frame.map);
        let regions = frame
            .geography
            .regions
            .features
            .iter()
            .map(|feature| {
                let key = feature.region_key();
                let status = key
                    .as_deref()
                    .map_or(Visitation::Unvisited, |k| history.status(k));
                let mut e = Element::path(path.geometry(&feature.geometry))
                    .with_style("fill", region_fill(status));
                if let Some(k) = key {
                    e.set_attr("id", format!("{prefix}{k}"));
                }
                e
            })
            .collect();
        let class = match frame.map {
            MapKind::World => "countries",
            MapKind::France | MapKind::Canada => "regions",
        };
        Some(Element::group(class).with_children(regions))
    }
}
