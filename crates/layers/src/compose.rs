use formats::{MapKind, Parameters, TravelData};
use scene::{GlobeView, InsetView, Scene};

use crate::flyers::{ArcsLayer, FlyersLayer};
use crate::graticule::GraticuleLayer;
use crate::highlight::Highlight;
use crate::labels::LabelsLayer;
use crate::layer::{Frame, Layer, MapData};
use crate::points::PointsLayer;
use crate::regions::RegionsLayer;
use crate::sphere::{DiscLayer, DropShadowLayer, LandLayer};

pub const GLOBE_POINT_RADIUS: f64 = 1.5;

fn compose(frame: &Frame<'_>, layers: &[&dyn Layer]) -> Scene {
    Scene {
        elements: layers.iter().filter_map(|l| l.render(frame)).collect(),
    }
}

/// Full globe for the current projection state. Pure: the same inputs
/// always give the same scene.
pub fn render_globe(
    view: &GlobeView,
    geography: &MapData,
    travel: &TravelData,
    params: &Parameters,
    highlight: Highlight,
) -> Scene {
    let frame = Frame {
        map: MapKind::World,
        projection: view.surface(),
        sky: Some(view.sky()),
        point_radius: GLOBE_POINT_RADIUS,
        geography,
        travel,
        params,
        highlight,
    };
    let layers: [&dyn Layer; 11] = [
        &DropShadowLayer,
        &DiscLayer::OCEAN,
        &LandLayer,
        &GraticuleLayer,
        &DiscLayer::HIGHLIGHT,
        &DiscLayer::SHADING,
        &RegionsLayer,
        &PointsLayer,
        &LabelsLayer,
        &ArcsLayer,
        &FlyersLayer,
    ];
    compose(&frame, &layers)
}

/// Flat inset map: regions and place markers.
pub fn render_map(
    view: &InsetView,
    geography: &MapData,
    travel: &TravelData,
    params: &Parameters,
) -> Scene {
    let frame = Frame {
        map: view.map(),
        projection: view.projection(),
        sky: None,
        point_radius: view.marker_radius(),
        geography,
        travel,
        params,
        highlight: Highlight::None,
    };
    let layers: [&dyn Layer; 2] = [&RegionsLayer, &PointsLayer];
    compose(&frame, &layers)
}
