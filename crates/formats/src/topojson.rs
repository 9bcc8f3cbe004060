//! TopoJSON decoding into GeoJSON-style features.
//!
//! Arcs may be quantized (delta-encoded integers plus a `transform`). Geometry
//! objects reference arcs by index; a negative index `!i` walks arc `i`
//! backwards. Consecutive arcs share their junction point, which is emitted once.

use std::collections::BTreeMap;

use foundation::math::LonLat;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::geojson::{Feature, FeatureCollection, Geometry, id_string};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum TopoGeometry {
    GeometryCollection {
        geometries: Vec<TopoGeometry>,
    },
    Point {
        coordinates: Vec<f64>,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    MultiPoint {
        coordinates: Vec<Vec<f64>>,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    LineString {
        arcs: Vec<i64>,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    MultiLineString {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    /// Unknown geometry types decode to nothing.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub objects: BTreeMap<String, TopoGeometry>,
    pub arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug)]
pub enum TopoJsonError {
    Json(serde_json::Error),
    MissingObject(String),
    ArcOutOfRange { index: i64 },
    InvalidPosition,
}

impl std::fmt::Display for TopoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopoJsonError::Json(e) => write!(f, "TopoJSON parse error: {e}"),
            TopoJsonError::MissingObject(name) => write!(f, "topology has no object {name:?}"),
            TopoJsonError::ArcOutOfRange { index } => write!(f, "arc index {index} out of range"),
            TopoJsonError::InvalidPosition => write!(f, "position must have [x, y]"),
        }
    }
}

impl std::error::Error for TopoJsonError {}

impl Topology {
    pub fn from_json_str(payload: &str) -> Result<Self, TopoJsonError> {
        serde_json::from_str(payload).map_err(TopoJsonError::Json)
    }

    fn object(&self, name: &str) -> Result<&TopoGeometry, TopoJsonError> {
        self.objects
            .get(name)
            .ok_or_else(|| TopoJsonError::MissingObject(name.to_string()))
    }

    /// One feature per geometry of the named object (collections are flattened one level).
    pub fn feature_collection(&self, name: &str) -> Result<FeatureCollection, TopoJsonError> {
        let mut features = Vec::new();
        match self.object(name)? {
            TopoGeometry::GeometryCollection { geometries } => {
                for g in geometries {
                    if let Some(f) = self.decode_feature(g)? {
                        features.push(f);
                    }
                }
            }
            other => {
                if let Some(f) = self.decode_feature(other)? {
                    features.push(f);
                }
            }
        }
        Ok(FeatureCollection { features })
    }

    /// All polygons of the named object combined into a single MultiPolygon feature.
    pub fn merged_feature(&self, name: &str) -> Result<Feature, TopoJsonError> {
        let mut polygons = Vec::new();
        self.collect_polygons(self.object(name)?, &mut polygons)?;
        Ok(Feature::new(Geometry::MultiPolygon(polygons)))
    }

    fn collect_polygons(
        &self,
        geom: &TopoGeometry,
        out: &mut Vec<Vec<Vec<LonLat>>>,
    ) -> Result<(), TopoJsonError> {
        match geom {
            TopoGeometry::GeometryCollection { geometries } => {
                for g in geometries {
                    self.collect_polygons(g, out)?;
                }
            }
            TopoGeometry::Polygon { arcs, .. } => out.push(self.polygon(arcs)?),
            TopoGeometry::MultiPolygon { arcs, .. } => {
                for poly in arcs {
                    out.push(self.polygon(poly)?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn decode_feature(&self, geom: &TopoGeometry) -> Result<Option<Feature>, TopoJsonError> {
        let (geometry, id, properties) = match geom {
            TopoGeometry::GeometryCollection { .. } | TopoGeometry::Unsupported => return Ok(None),
            TopoGeometry::Point {
                coordinates,
                id,
                properties,
            } => (
                Geometry::Point(self.transform_position(coordinates)?),
                id,
                properties,
            ),
            TopoGeometry::MultiPoint {
                coordinates,
                id,
                properties,
            } => (
                Geometry::MultiPoint(
                    coordinates
                        .iter()
                        .map(|c| self.transform_position(c))
                        .collect::<Result<_, _>>()?,
                ),
                id,
                properties,
            ),
            TopoGeometry::LineString {
                arcs,
                id,
                properties,
            } => (Geometry::LineString(self.line(arcs)?), id, properties),
            TopoGeometry::MultiLineString {
                arcs,
                id,
                properties,
            } => (
                Geometry::MultiLineString(
                    arcs.iter().map(|a| self.line(a)).collect::<Result<_, _>>()?,
                ),
                id,
                properties,
            ),
            TopoGeometry::Polygon {
                arcs,
                id,
                properties,
            } => (Geometry::Polygon(self.polygon(arcs)?), id, properties),
            TopoGeometry::MultiPolygon {
                arcs,
                id,
                properties,
            } => (
                Geometry::MultiPolygon(
                    arcs.iter()
                        .map(|p| self.polygon(p))
                        .collect::<Result<_, _>>()?,
                ),
                id,
                properties,
            ),
        };

        Ok(Some(Feature {
            id: id.as_ref().and_then(id_string),
            properties: properties.clone().unwrap_or_default(),
            geometry,
        }))
    }

    fn transform_position(&self, p: &[f64]) -> Result<LonLat, TopoJsonError> {
        if p.len() < 2 {
            return Err(TopoJsonError::InvalidPosition);
        }
        Ok(match self.transform {
            Some(t) => LonLat::new(
                p[0] * t.scale[0] + t.translate[0],
                p[1] * t.scale[1] + t.translate[1],
            ),
            None => LonLat::new(p[0], p[1]),
        })
    }

    /// Absolute positions of one arc, in stored order.
    fn arc_positions(&self, index: usize) -> Result<Vec<LonLat>, TopoJsonError> {
        let arc = self.arcs.get(index).ok_or(TopoJsonError::ArcOutOfRange {
            index: index as i64,
        })?;
        let mut out = Vec::with_capacity(arc.len());
        let (mut x, mut y) = (0.0, 0.0);
        for p in arc {
            if p.len() < 2 {
                return Err(TopoJsonError::InvalidPosition);
            }
            match self.transform {
                // Quantized arcs are delta-encoded.
                Some(_) => {
                    x += p[0];
                    y += p[1];
                    out.push(self.transform_position(&[x, y])?);
                }
                None => out.push(LonLat::new(p[0], p[1])),
            }
        }
        Ok(out)
    }

    fn stitch_arcs(&self, arcs: &[i64]) -> Result<Vec<LonLat>, TopoJsonError> {
        let mut points: Vec<LonLat> = Vec::new();
        for &i in arcs {
            let (index, reversed) = if i < 0 { (!i, true) } else { (i, false) };
            let out_of_range = TopoJsonError::ArcOutOfRange { index: i };
            let index = usize::try_from(index).map_err(|_| out_of_range)?;
            let mut arc = self.arc_positions(index).map_err(|e| match e {
                TopoJsonError::ArcOutOfRange { .. } => TopoJsonError::ArcOutOfRange { index: i },
                other => other,
            })?;
            if reversed {
                arc.reverse();
            }
            points.pop();
            points.extend(arc);
        }
        Ok(points)
    }

    fn line(&self, arcs: &[i64]) -> Result<Vec<LonLat>, TopoJsonError> {
        let mut points = self.stitch_arcs(arcs)?;
        if points.len() == 1 {
            points.push(points[0]);
        }
        Ok(points)
    }

    fn ring(&self, arcs: &[i64]) -> Result<Vec<LonLat>, TopoJsonError> {
        let mut points = self.stitch_arcs(arcs)?;
        if let Some(&first) = points.first() {
            while points.len() < 4 {
                points.push(first);
            }
        }
        Ok(points)
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Vec<Vec<LonLat>>, TopoJsonError> {
        rings.iter().map(|r| self.ring(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{TopoJsonError, Topology};
    use crate::geojson::Geometry;
    use foundation::math::LonLat;
    use pretty_assertions::assert_eq;

    // Two unit squares sharing the edge x = 1.
    const TWO_SQUARES: &str = r#"{
        "type": "Topology",
        "objects": {
            "countries": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": 4, "arcs": [[0, 1]]},
                {"type": "Polygon", "id": "008", "properties": {"name": "B"}, "arcs": [[2, -1]]}
            ]},
            "land": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "arcs": [[0, 1]]},
                {"type": "Polygon", "arcs": [[2, -1]]}
            ]}
        },
        "arcs": [
            [[1, 0], [1, 1]],
            [[1, 1], [0, 1], [0, 0], [1, 0]],
            [[1, 0], [2, 0], [2, 1], [1, 1]]
        ]
    }"#;

    #[test]
    fn decodes_shared_arcs() {
        let topo = Topology::from_json_str(TWO_SQUARES).expect("parse topology");
        let fc = topo.feature_collection("countries").expect("countries");
        assert_eq!(fc.len(), 2);
        assert_eq!(fc.features[0].id.as_deref(), Some("4"));
        assert_eq!(fc.features[1].id.as_deref(), Some("008"));

        let Geometry::Polygon(rings) = &fc.features[0].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(
            rings[0],
            vec![
                LonLat::new(1.0, 0.0),
                LonLat::new(1.0, 1.0),
                LonLat::new(0.0, 1.0),
                LonLat::new(0.0, 0.0),
                LonLat::new(1.0, 0.0),
            ]
        );

        // Second square walks the shared arc backwards.
        let Geometry::Polygon(rings) = &fc.features[1].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].first(), rings[0].last());
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[0][3], LonLat::new(1.0, 1.0));
    }

    #[test]
    fn decodes_quantized_arcs() {
        let payload = r#"{
            "type": "Topology",
            "transform": {"scale": [0.5, 0.25], "translate": [-10, 20]},
            "objects": {"route": {"type": "LineString", "arcs": [0]}},
            "arcs": [[[0, 0], [2, 4], [2, -4]]]
        }"#;
        let topo = Topology::from_json_str(payload).expect("parse");
        let fc = topo.feature_collection("route").expect("route");
        assert_eq!(
            fc.features[0].geometry,
            Geometry::LineString(vec![
                LonLat::new(-10.0, 20.0),
                LonLat::new(-9.0, 21.0),
                LonLat::new(-8.0, 20.0),
            ])
        );
    }

    #[test]
    fn merged_feature_collects_all_polygons() {
        let topo = Topology::from_json_str(TWO_SQUARES).expect("parse topology");
        let land = topo.merged_feature("land").expect("land");
        let Geometry::MultiPolygon(polys) = land.geometry else {
            panic!("expected multipolygon");
        };
        assert_eq!(polys.len(), 2);
    }

    #[test]
    fn reports_missing_objects_and_bad_arcs() {
        let topo = Topology::from_json_str(TWO_SQUARES).expect("parse topology");
        assert!(matches!(
            topo.feature_collection("rivers"),
            Err(TopoJsonError::MissingObject(_))
        ));

        let payload = r#"{"type":"Topology","objects":{"x":{"type":"LineString","arcs":[3]}},"arcs":[]}"#;
        let topo = Topology::from_json_str(payload).expect("parse");
        assert!(matches!(
            topo.feature_collection("x"),
            Err(TopoJsonError::ArcOutOfRange { index: 3 })
        ));
    }
}
