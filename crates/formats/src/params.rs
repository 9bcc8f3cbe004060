use foundation::math::{Rotation, Vec2};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::geojson::id_string;
use crate::travel::MapKind;

/// Region identifier (country, department or province code).
///
/// Identifiers arrive as JSON numbers or strings depending on the dataset;
/// both are kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Textual equality, or numeric equality when both sides are integers
    /// ("004" matches 4).
    pub fn matches(&self, key: &str) -> bool {
        if self.0 == key {
            return true;
        }
        match (self.0.parse::<i64>(), key.parse::<i64>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl<'de> Deserialize<'de> for RegionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        id_string(&value)
            .map(RegionId)
            .ok_or_else(|| serde::de::Error::custom("region id must be a string or a number"))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EarthSize {
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthParams {
    pub size: EarthSize,
    #[serde(default)]
    pub init_rotation: Vec<f64>,
    #[serde(default = "default_scale_extent")]
    pub scale_extent: [f64; 2],
    #[serde(default = "default_max_elevation")]
    pub max_elevation: f64,
}

fn default_scale_extent() -> [f64; 2] {
    [1.0, 8.0]
}

fn default_max_elevation() -> f64 {
    90.0
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FadeParams {
    /// Angular margin inside the horizon (radians) over which arcs fade in.
    #[serde(default = "default_fade_width")]
    pub width: f64,
    #[serde(default = "default_max_opacity")]
    pub max_opacity: f64,
}

fn default_fade_width() -> f64 {
    0.1
}

fn default_max_opacity() -> f64 {
    0.1
}

impl Default for FadeParams {
    fn default() -> Self {
        Self {
            width: default_fade_width(),
            max_opacity: default_max_opacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyerParams {
    /// Height of the arc control points above the surface, in pixels at scale 1.
    pub altitude: f64,
    #[serde(default)]
    pub fade: FadeParams,
    #[serde(default = "default_plane_color")]
    pub plane_color: String,
    #[serde(default = "default_other_color")]
    pub other_color: String,
    #[serde(default = "default_endpoint_color")]
    pub endpoint_color: String,
}

fn default_plane_color() -> String {
    "blue".to_string()
}

fn default_other_color() -> String {
    "green".to_string()
}

fn default_endpoint_color() -> String {
    "blue".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CanvasOffset {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
}

impl CanvasOffset {
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// The parameter document driving the whole page. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub earth: EarthParams,
    pub flyer: FlyerParams,
    pub sensitivity: f64,
    pub offset: CanvasOffset,
    #[serde(default)]
    pub visited_countries: Vec<RegionId>,
    #[serde(default)]
    pub lived_countries: Vec<RegionId>,
    #[serde(default)]
    pub visited_departements: Vec<RegionId>,
    #[serde(default)]
    pub lived_departements: Vec<RegionId>,
    #[serde(default)]
    pub visited_provs: Vec<RegionId>,
    #[serde(default)]
    pub lived_provs: Vec<RegionId>,
}

#[derive(Debug)]
pub enum ParamsError {
    Json(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for ParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamsError::Json(e) => write!(f, "parameters parse error: {e}"),
            ParamsError::Invalid(msg) => write!(f, "invalid parameters: {msg}"),
        }
    }
}

impl std::error::Error for ParamsError {}

impl Parameters {
    pub fn from_json_str(payload: &str) -> Result<Self, ParamsError> {
        let params: Parameters = serde_json::from_str(payload).map_err(ParamsError::Json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        let radius = self.earth.size.radius;
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ParamsError::Invalid(format!("earth radius must be > 0, got {radius}")));
        }
        if !(self.sensitivity.is_finite() && self.sensitivity > 0.0) {
            return Err(ParamsError::Invalid(format!(
                "sensitivity must be > 0, got {}",
                self.sensitivity
            )));
        }
        let [k0, k1] = self.earth.scale_extent;
        if !(k0 > 0.0 && k0 <= k1) {
            return Err(ParamsError::Invalid(format!(
                "scale extent must satisfy 0 < min <= max, got [{k0}, {k1}]"
            )));
        }
        let max_elevation = self.earth.max_elevation;
        if !(0.0..=90.0).contains(&max_elevation) {
            return Err(ParamsError::Invalid(format!(
                "max elevation must be within [0, 90], got {max_elevation}"
            )));
        }
        if self.earth.init_rotation.len() > 3 {
            return Err(ParamsError::Invalid(
                "initial rotation takes at most three angles".to_string(),
            ));
        }
        if !(self.flyer.fade.width > 0.0) {
            return Err(ParamsError::Invalid("fade width must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn init_rotation(&self) -> Rotation {
        Rotation::from_angles(&self.earth.init_rotation)
    }

    /// Visited and lived region lists for one map.
    pub fn history(&self, map: MapKind) -> RegionHistory<'_> {
        let (visited, lived) = match map {
            MapKind::World => (&self.visited_countries, &self.lived_countries),
            MapKind::France => (&self.visited_departements, &self.lived_departements),
            MapKind::Canada => (&self.visited_provs, &self.lived_provs),
        };
        RegionHistory { visited, lived }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visitation {
    Visited,
    Lived,
    Unvisited,
}

#[derive(Debug, Clone, Copy)]
pub struct RegionHistory<'a> {
    pub visited: &'a [RegionId],
    pub lived: &'a [RegionId],
}

impl RegionHistory<'_> {
    /// Visited takes precedence over lived.
    pub fn status(&self, key: &str) -> Visitation {
        if self.visited.iter().any(|id| id.matches(key)) {
            Visitation::Visited
        } else if self.lived.iter().any(|id| id.matches(key)) {
            Visitation::Lived
        } else {
            Visitation::Unvisited
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ParamsError, Parameters, RegionId, Visitation};
    use crate::travel::MapKind;
    use foundation::math::Rotation;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = include_str!("../../apps/travel_web/assets/parameters.json");

    #[test]
    fn parses_sample_parameters() {
        let params = Parameters::from_json_str(SAMPLE).expect("parse parameters");
        assert_eq!(params.earth.size.radius, 248.0);
        assert_eq!(params.sensitivity, 0.25);
        assert_eq!(params.init_rotation(), Rotation::new(0.0, 0.0, 0.0));
        assert_eq!(params.offset.x, 400.0);
        assert_eq!(params.flyer.fade.max_opacity, 0.1);
        assert_eq!(params.flyer.plane_color, "blue");
    }

    #[test]
    fn region_ids_accept_numbers_and_strings() {
        let ids: Vec<RegionId> = serde_json::from_str(r#"[250, "124", "2A"]"#).expect("ids");
        assert_eq!(ids, vec![RegionId::new("250"), RegionId::new("124"), RegionId::new("2A")]);
        assert!(RegionId::new("4").matches("004"));
        assert!(!RegionId::new("2A").matches("2B"));
    }

    #[test]
    fn visited_wins_over_lived() {
        let mut params = Parameters::from_json_str(SAMPLE).expect("parse parameters");
        params.visited_countries = vec![RegionId::new("250")];
        params.lived_countries = vec![RegionId::new("250"), RegionId::new("124")];
        let world = params.history(MapKind::World);
        assert_eq!(world.status("250"), Visitation::Visited);
        assert_eq!(world.status("124"), Visitation::Lived);
        assert_eq!(world.status("840"), Visitation::Unvisited);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut params = Parameters::from_json_str(SAMPLE).expect("parse parameters");
        params.earth.max_elevation = 120.0;
        assert!(matches!(params.validate(), Err(ParamsError::Invalid(_))));

        let mut params = Parameters::from_json_str(SAMPLE).expect("parse parameters");
        params.earth.scale_extent = [4.0, 2.0];
        assert!(matches!(params.validate(), Err(ParamsError::Invalid(_))));

        let mut params = Parameters::from_json_str(SAMPLE).expect("parse parameters");
        params.sensitivity = 0.0;
        assert!(matches!(params.validate(), Err(ParamsError::Invalid(_))));
    }

    #[test]
    fn malformed_document_is_a_json_error() {
        assert!(matches!(
            Parameters::from_json_str(r#"{"earth": {}}"#),
            Err(ParamsError::Json(_))
        ));
    }
}
