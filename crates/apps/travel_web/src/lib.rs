//! Browser entry points for the travel map.
//!
//! The host page owns three `<svg>` elements (`#world`, `#france`,
//! `#canada`), each with one `<g>` child that receives rendered markup, plus
//! the gradients and color variables the markup refers to. The page forwards
//! pointer, wheel and hover events to the exported `travel_*` handlers and
//! drives the zoom transition from `requestAnimationFrame`.

use console_error_panic_hook::set_once;
use futures_util::future::try_join5;
use gloo_net::http::Request;
use serde::Deserialize;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use foundation::Time;
use formats::{
    FeatureCollection, GeoJsonError, MapKind, Parameters, ParamsError, TopoJsonError, Topology,
    TravelData, TravelDataError, UnresolvedLink, links_from_geojson, places_from_geojson,
};
use layers::{Highlight, MapData, render_globe, render_map};
use scene::{Element, GlobeView, InsetView, Scene, num};

mod globe_controller;
pub use globe_controller::GlobeController;

// Guard to prevent double-initialization (relevant during hot reload).
static INITIALIZED: AtomicBool = AtomicBool::new(false);

pub const DEFAULT_PARAMS_URL: &str =
    "https://raw.githubusercontent.com/lecardot/earthTravel/main/docs/assets/parameters.json";

/// Where the five datasets are fetched from. Any field left out of the
/// JS object passed to `start_travel_map` keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataSources {
    pub departements: String,
    pub provinces: String,
    pub world: String,
    pub places: String,
    pub links: String,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            departements: "https://raw.githubusercontent.com/gregoiredavid/france-geojson/master/departements.geojson".to_string(),
            provinces: "https://raw.githubusercontent.com/wisdomtheif/Canadian_GeoJSON/master/canada_provinces.geojson".to_string(),
            world: "https://raw.githubusercontent.com/d3/d3.github.com/master/world-110m.v1.json".to_string(),
            places: "https://raw.githubusercontent.com/lecardot/earthTravel/main/docs/assets/data/places.json".to_string(),
            links: "https://raw.githubusercontent.com/lecardot/earthTravel/main/docs/assets/data/links.json".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    Fetch { url: String, message: String },
    Params(ParamsError),
    GeoJson { dataset: &'static str, error: GeoJsonError },
    TopoJson(TopoJsonError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fetch { url, message } => write!(f, "fetch {url} failed: {message}"),
            LoadError::Params(e) => write!(f, "{e}"),
            LoadError::GeoJson { dataset, error } => write!(f, "{dataset}: {error}"),
            LoadError::TopoJson(e) => write!(f, "world: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<ParamsError> for LoadError {
    fn from(e: ParamsError) -> Self {
        LoadError::Params(e)
    }
}

impl From<TopoJsonError> for LoadError {
    fn from(e: TopoJsonError) -> Self {
        LoadError::TopoJson(e)
    }
}

fn geojson(dataset: &'static str, payload: &str) -> Result<FeatureCollection, LoadError> {
    FeatureCollection::from_geojson_str(payload)
        .map_err(|error| LoadError::GeoJson { dataset, error })
}

/// A travel record left out of the map. Loading carries on without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skipped {
    Place(TravelDataError),
    Link(TravelDataError),
    Unresolved(UnresolvedLink),
}

impl std::fmt::Display for Skipped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Skipped::Place(e) => write!(f, "places: {e}; skipped"),
            Skipped::Link(e) => write!(f, "links: {e}; skipped"),
            Skipped::Unresolved(link) => write!(f, "links: {link}"),
        }
    }
}

/// Static geography and travel data for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    pub france: MapData,
    pub canada: MapData,
    pub world: MapData,
    pub travel: TravelData,
}

impl Datasets {
    /// Decodes the five payloads. Malformed travel records and links naming
    /// unknown places are dropped and returned alongside.
    pub fn decode(
        departements: &str,
        provinces: &str,
        world: &str,
        places: &str,
        links: &str,
    ) -> Result<(Self, Vec<Skipped>), LoadError> {
        let topology = Topology::from_json_str(world)?;
        let world = MapData {
            regions: topology.feature_collection("countries")?,
            land: Some(topology.merged_feature("land")?),
        };
        let (places, bad_places) = places_from_geojson(&geojson("places", places)?);
        let (links, bad_links) = links_from_geojson(&geojson("links", links)?);
        let (travel, unresolved) = TravelData::resolve(places, links);
        let skipped = bad_places
            .into_iter()
            .map(Skipped::Place)
            .chain(bad_links.into_iter().map(Skipped::Link))
            .chain(unresolved.into_iter().map(Skipped::Unresolved))
            .collect();
        let datasets = Self {
            france: MapData {
                regions: geojson("departements", departements)?,
                land: None,
            },
            canada: MapData {
                regions: geojson("provinces", provinces)?,
                land: None,
            },
            world,
            travel,
        };
        Ok((datasets, skipped))
    }

    fn inset(&self, map: MapKind) -> &MapData {
        match map {
            MapKind::France => &self.france,
            MapKind::Canada => &self.canada,
            MapKind::World => &self.world,
        }
    }
}

#[derive(Debug)]
pub struct TravelMap {
    params: Parameters,
    data: Datasets,
    view: GlobeView,
    controller: GlobeController,
    highlight: Highlight,
}

impl TravelMap {
    pub fn new(params: Parameters, data: Datasets) -> Self {
        Self {
            view: GlobeView::from_params(&params),
            controller: GlobeController::from_params(&params),
            highlight: Highlight::None,
            params,
            data,
        }
    }

    pub fn view(&self) -> &GlobeView {
        &self.view
    }

    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    pub fn globe_scene(&self) -> Scene {
        render_globe(
            &self.view,
            &self.data.world,
            &self.data.travel,
            &self.params,
            self.highlight,
        )
    }

    pub fn inset_scene(&self, view: &InsetView) -> Scene {
        render_map(
            view,
            self.data.inset(view.map()),
            &self.data.travel,
            &self.params,
        )
    }

    pub fn pointer_down(&mut self, pos_px: [f64; 2]) {
        self.controller.on_pointer_down(pos_px, self.view.rotation());
    }

    /// Rotates the globe for a drag move. Returns whether a redraw is needed.
    pub fn pointer_move(&mut self, pos_px: [f64; 2]) -> bool {
        match self.controller.on_pointer_move(pos_px) {
            Some(rotation) => {
                let before = self.view.rotation();
                self.view.set_rotation(rotation) != before
            }
            None => false,
        }
    }

    pub fn pointer_up(&mut self) {
        self.controller.on_pointer_up();
    }

    pub fn wheel(&mut self, delta_y: f64, delta_mode: u32, now: Time) {
        self.controller.on_wheel(delta_y, delta_mode, now);
    }

    pub fn zoom_scale(&self, now: Time) -> f64 {
        self.controller.scale_at(now)
    }

    pub fn is_zooming(&self, now: Time) -> bool {
        self.controller.is_zooming(now)
    }

    /// Hover over link `index`, or leave hover with `None`. Indices past the
    /// link list count as leaving. Returns whether the highlight changed.
    pub fn hover(&mut self, index: Option<usize>) -> bool {
        let next = match index {
            Some(i) if i < self.data.travel.links.len() => Highlight::Link(i),
            _ => Highlight::None,
        };
        if next == self.highlight {
            return false;
        }
        self.highlight = next;
        true
    }

    fn draw_globe(&self) -> Result<(), JsValue> {
        set_root_markup("world", &self.globe_scene().to_svg_markup())
    }

    fn draw_insets(&self) -> Result<(), JsValue> {
        for (map, svg_id) in [(MapKind::France, "france"), (MapKind::Canada, "canada")] {
            if let Some(view) = InsetView::for_map(map) {
                set_root_markup(svg_id, &self.inset_scene(&view).to_svg_markup())?;
            }
        }
        Ok(())
    }
}

thread_local! {
    static STATE: RefCell<Option<TravelMap>> = const { RefCell::new(None) };
}

/// Safe TLS access helper that returns a default on teardown or before the
/// map has loaded, instead of panicking.
fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&mut TravelMap) -> R,
    R: Default,
{
    STATE
        .try_with(|state| state.borrow_mut().as_mut().map(f).unwrap_or_default())
        .unwrap_or_default()
}

fn with_map<F>(f: F) -> Result<(), JsValue>
where
    F: FnOnce(&mut TravelMap) -> Result<(), JsValue>,
{
    with_state(|map| Some(f(map))).unwrap_or(Ok(()))
}

fn root_group(svg_id: &str) -> Result<web_sys::Element, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    document
        .query_selector(&format!("svg#{svg_id} > g"))?
        .ok_or_else(|| JsValue::from_str(&format!("svg#{svg_id} has no root group")))
}

fn set_root_markup(svg_id: &str, markup: &str) -> Result<(), JsValue> {
    root_group(svg_id)?.set_inner_html(markup);
    Ok(())
}

fn apply_zoom(k: f64) -> Result<(), JsValue> {
    root_group("world")?.set_attribute("transform", &format!("scale({})", num(k)))
}

/// Markup shown in place of the globe when loading fails.
pub fn fallback_markup(error: &LoadError) -> String {
    let mut scene = Scene::new();
    scene.push(
        Element::text(format!("The travel map could not be loaded ({error})."))
            .with_class("fallback")
            .with_attr("x", "20")
            .with_attr("y", "40"),
    );
    scene.to_svg_markup()
}

async fn fetch_text(url: &str) -> Result<String, LoadError> {
    let fetch_error = |message: String| LoadError::Fetch {
        url: url.to_string(),
        message,
    };
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;
    if !resp.ok() {
        return Err(fetch_error(format!("HTTP {}", resp.status())));
    }
    resp.text().await.map_err(|e| fetch_error(e.to_string()))
}

async fn load(params_url: &str, sources: &DataSources) -> Result<TravelMap, LoadError> {
    let params = Parameters::from_json_str(&fetch_text(params_url).await?)?;
    let (departements, provinces, world, places, links) = try_join5(
        fetch_text(&sources.departements),
        fetch_text(&sources.provinces),
        fetch_text(&sources.world),
        fetch_text(&sources.places),
        fetch_text(&sources.links),
    )
    .await?;
    let (data, skipped) = Datasets::decode(&departements, &provinces, &world, &places, &links)?;
    for record in &skipped {
        web_sys::console::warn_1(&JsValue::from_str(&record.to_string()));
    }
    Ok(TravelMap::new(params, data))
}

async fn load_and_draw(params_url: String, sources: DataSources) -> Result<(), JsValue> {
    let map = match load(&params_url, &sources).await {
        Ok(map) => map,
        Err(err) => {
            web_sys::console::error_1(&JsValue::from_str(&format!("travel map: {err}")));
            return set_root_markup("world", &fallback_markup(&err));
        }
    };
    map.draw_insets()?;
    map.draw_globe()?;
    web_sys::console::log_1(&JsValue::from_str(&format!(
        "travel map ready: {} places, {} links",
        map.data.travel.places.len(),
        map.data.travel.links.len()
    )));
    let _ = STATE.try_with(|state| *state.borrow_mut() = Some(map));
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    set_once();
    Ok(())
}

/// Fetches the parameters and datasets, then draws the three maps.
///
/// - `params_url`: parameter document; the published one when omitted.
/// - `sources`: optional `{ departements, provinces, world, places, links }`
///   URL overrides.
#[wasm_bindgen]
pub fn start_travel_map(params_url: Option<String>, sources: JsValue) -> Result<(), JsValue> {
    let sources: DataSources = if sources.is_undefined() || sources.is_null() {
        DataSources::default()
    } else {
        serde_wasm_bindgen::from_value(sources)?
    };
    let params_url = params_url.unwrap_or_else(|| DEFAULT_PARAMS_URL.to_string());
    spawn_local(async move {
        if let Err(err) = load_and_draw(params_url, sources).await {
            web_sys::console::error_1(&err);
        }
    });
    Ok(())
}

#[wasm_bindgen]
pub fn travel_pointer_down(x_px: f64, y_px: f64) {
    with_state(|map| map.pointer_down([x_px, y_px]));
}

#[wasm_bindgen]
pub fn travel_pointer_move(x_px: f64, y_px: f64) -> Result<(), JsValue> {
    with_map(|map| {
        if map.pointer_move([x_px, y_px]) {
            map.draw_globe()?;
        }
        Ok(())
    })
}

#[wasm_bindgen]
pub fn travel_pointer_up() {
    with_state(|map| map.pointer_up());
}

/// Starts or retargets the zoom transition. The page should then call
/// `travel_zoom_frame` on every animation frame until it returns false.
#[wasm_bindgen]
pub fn travel_wheel(delta_y: f64, delta_mode: u32, now_ms: f64) {
    with_state(|map| map.wheel(delta_y, delta_mode, Time::from_millis(now_ms)));
}

#[wasm_bindgen]
pub fn travel_zoom_frame(now_ms: f64) -> Result<bool, JsValue> {
    let now = Time::from_millis(now_ms);
    let Some((k, animating)) = with_state(|map| Some((map.zoom_scale(now), map.is_zooming(now))))
    else {
        return Ok(false);
    };
    apply_zoom(k)?;
    Ok(animating)
}

/// Pointer entered the flyer carrying `data-link="<index>"`.
#[wasm_bindgen]
pub fn travel_hover_link(index: u32) -> Result<(), JsValue> {
    with_map(|map| {
        if map.hover(Some(index as usize)) {
            map.draw_globe()?;
        }
        Ok(())
    })
}

#[wasm_bindgen]
pub fn travel_hover_end() -> Result<(), JsValue> {
    with_map(|map| {
        if map.hover(None) {
            map.draw_globe()?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::{DataSources, Datasets, LoadError, Skipped, TravelMap, fallback_markup};
    use formats::{Parameters, TravelDataError, UnresolvedLink};
    use layers::Highlight;
    use pretty_assertions::assert_eq;
    use scene::InsetView;

    const PARAMS: &str = include_str!("../assets/parameters.json");
    const PLACES: &str = include_str!("../assets/data/places.json");
    const LINKS: &str = include_str!("../assets/data/links.json");

    const WORLD: &str = r#"{
        "type": "Topology",
        "arcs": [[[-4, 43], [-4, 51], [8, 51], [8, 43], [-4, 43]],
                 [[130, 31], [130, 42], [142, 42], [142, 31], [130, 31]]],
        "objects": {
            "countries": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": 250, "arcs": [[0]]},
                {"type": "Polygon", "id": 392, "arcs": [[1]]}
            ]},
            "land": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "arcs": [[0]]},
                {"type": "Polygon", "arcs": [[1]]}
            ]}
        }
    }"#;

    const DEPARTEMENTS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"code":"75","nom":"Paris"},
         "geometry":{"type":"Polygon","coordinates":[[[2.2,48.8],[2.5,48.8],[2.5,48.9],[2.2,48.9],[2.2,48.8]]]}}
    ]}"#;

    const PROVINCES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"name":"Quebec"},
         "geometry":{"type":"Polygon","coordinates":[[[-79,45],[-57,45],[-57,62],[-79,62],[-79,45]]]}}
    ]}"#;

    fn travel_map() -> TravelMap {
        let params = Parameters::from_json_str(PARAMS).expect("parameters");
        let (data, _) =
            Datasets::decode(DEPARTEMENTS, PROVINCES, WORLD, PLACES, LINKS).expect("datasets");
        TravelMap::new(params, data)
    }

    #[test]
    fn sources_fill_missing_fields_with_defaults() {
        let sources: DataSources =
            serde_json::from_str(r#"{"places":"/data/places.json"}"#).expect("sources");
        assert_eq!(sources.places, "/data/places.json");
        assert_eq!(sources.world, DataSources::default().world);
        assert!(DataSources::default().departements.ends_with("departements.geojson"));
    }

    #[test]
    fn decode_splits_world_topology_and_reports_dangling_links() {
        let (data, skipped) =
            Datasets::decode(DEPARTEMENTS, PROVINCES, WORLD, PLACES, LINKS).expect("datasets");
        assert_eq!(data.world.regions.len(), 2);
        assert!(data.world.land.is_some());
        assert_eq!(data.france.regions.len(), 1);
        assert_eq!(data.canada.regions.len(), 1);
        assert_eq!(data.travel.links.len(), 3);
        assert_eq!(
            skipped,
            vec![Skipped::Unresolved(UnresolvedLink {
                index: 3,
                missing: "Atlantis".to_string(),
            })]
        );
    }

    #[test]
    fn decode_names_the_failing_dataset() {
        let err = Datasets::decode("{}", PROVINCES, WORLD, PLACES, LINKS).expect_err("bad geojson");
        assert!(matches!(err, LoadError::GeoJson { dataset: "departements", .. }));
        let err = Datasets::decode(DEPARTEMENTS, PROVINCES, "[", PLACES, LINKS)
            .expect_err("bad topology");
        assert!(err.to_string().starts_with("world:"));
    }

    #[test]
    fn malformed_place_is_reported_and_loading_continues() {
        let places = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"note":"world"},
             "geometry":{"type":"Point","coordinates":[0,0]}},
            {"type":"Feature","properties":{"name":"Paris","note":"world,france"},
             "geometry":{"type":"Point","coordinates":[2.35,48.85]}}
        ]}"#;
        let (data, skipped) =
            Datasets::decode(DEPARTEMENTS, PROVINCES, WORLD, places, LINKS).expect("datasets");
        assert_eq!(data.travel.places.len(), 1);
        assert_eq!(
            skipped[0],
            Skipped::Place(TravelDataError::MissingProperty { index: 0, key: "name" })
        );
        assert_eq!(
            skipped[0].to_string(),
            "places: feature 0 is missing property \"name\"; skipped"
        );
        // Every fixture link now names a missing place.
        assert!(data.travel.links.is_empty());
        assert!(skipped[1..].iter().all(|s| matches!(s, Skipped::Unresolved(_))));
    }

    #[test]
    fn fallback_message_is_escaped_text() {
        let err = LoadError::Fetch {
            url: "https://example.org/a?b=1&c=2".to_string(),
            message: "HTTP 404".to_string(),
        };
        let markup = fallback_markup(&err);
        assert!(markup.starts_with("<text"));
        assert!(markup.contains("b=1&amp;c=2"));
        assert!(markup.contains("HTTP 404"));
    }

    #[test]
    fn drag_redraws_only_when_rotation_changes() {
        let mut map = travel_map();
        assert!(!map.pointer_move([10.0, 10.0]));
        map.pointer_down([0.0, 0.0]);
        assert!(map.pointer_move([40.0, 20.0]));
        assert_eq!(map.view().rotation().lambda_deg, 10.0);
        assert_eq!(map.view().rotation().phi_deg, -5.0);
        map.pointer_up();
        assert!(!map.pointer_move([80.0, 80.0]));
    }

    #[test]
    fn hover_changes_are_detected_and_stale_indices_clear() {
        let mut map = travel_map();
        let before = map.globe_scene();
        assert!(map.hover(Some(1)));
        assert!(!map.hover(Some(1)));
        assert_eq!(map.highlight(), Highlight::Link(1));
        assert!(map.hover(Some(99)));
        assert_eq!(map.highlight(), Highlight::None);
        assert_eq!(map.globe_scene(), before);
    }

    #[test]
    fn insets_render_from_their_own_geography() {
        let map = travel_map();
        let france = InsetView::for_map(formats::MapKind::France).expect("france");
        let scene = map.inset_scene(&france);
        assert!(scene.find("rf75").is_some());
        assert!(scene.find("rcQuebec").is_none());
    }
}
