use foundation::math::GeoProjection;
use formats::{Feature, FeatureCollection, MapKind, Parameters, TravelData};
use scene::Element;

use crate::highlight::Highlight;

/// Static geography of one map surface.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MapData {
    pub regions: FeatureCollection,
    /// Merged land mass drawn under the regions; globe only.
    pub land: Option<Feature>,
}

/// Everything a layer reads while drawing one frame.
pub struct Frame<'a> {
    pub map: MapKind,
    pub projection: &'a dyn GeoProjection,
    /// Enlarged projection for flyer control points; globe only.
    pub sky: Option<&'a dyn GeoProjection>,
    pub point_radius: f64,
    pub geography: &'a MapData,
    pub travel: &'a TravelData,
    pub params: &'a Parameters,
    pub highlight: Highlight,
}

pub trait Layer {
    /// The layer's element for this frame, or `None` when it has nothing to draw.
    fn render(&self, frame: &Frame<'_>) -> Option<Element>;
}
