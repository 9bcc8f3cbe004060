use std::collections::HashMap;

use foundation::math::LonLat;

use crate::geojson::{Feature, FeatureCollection, Geometry};

/// The three maps on the page. Places opt into a map through their note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    World,
    France,
    Canada,
}

impl MapKind {
    pub fn tag(self) -> &'static str {
        match self {
            MapKind::World => "world",
            MapKind::France => "france",
            MapKind::Canada => "canada",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub location: LonLat,
    pub note: String,
}

impl Place {
    pub fn belongs_to(&self, map: MapKind) -> bool {
        self.note.contains(map.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Plane,
    Other(String),
}

impl Transport {
    pub fn parse(s: &str) -> Self {
        if s == "plane" {
            Transport::Plane
        } else {
            Transport::Other(s.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub transport: Transport,
    /// Endpoint coordinates carried by the link geometry, if any.
    pub endpoints: Option<[LonLat; 2]>,
}

/// A link whose endpoints were both found among the places.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    pub source: String,
    pub target: String,
    pub transport: Transport,
    pub from: LonLat,
    pub to: LonLat,
}

impl ResolvedLink {
    /// Stable element id, `f<source><target>`.
    pub fn key(&self) -> String {
        format!("f{}{}", self.source, self.target)
    }

    pub fn touches(&self, place: &str) -> bool {
        self.source == place || self.target == place
    }
}

/// A link skipped because it names a place that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLink {
    pub index: usize,
    pub missing: String,
}

impl std::fmt::Display for UnresolvedLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "link {} references unknown place {:?}; skipped",
            self.index, self.missing
        )
    }
}

/// Why a place or link record was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TravelDataError {
    MissingProperty { index: usize, key: &'static str },
    UnexpectedGeometry { index: usize, expected: &'static str },
}

impl std::fmt::Display for TravelDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelDataError::MissingProperty { index, key } => {
                write!(f, "feature {index} is missing property {key:?}")
            }
            TravelDataError::UnexpectedGeometry { index, expected } => {
                write!(f, "feature {index} must be a {expected}")
            }
        }
    }
}

impl std::error::Error for TravelDataError {}

fn required(feature: &Feature, index: usize, key: &'static str) -> Result<String, TravelDataError> {
    feature
        .property_str(key)
        .ok_or(TravelDataError::MissingProperty { index, key })
}

fn decode_place(index: usize, feature: &Feature) -> Result<Place, TravelDataError> {
    let Geometry::Point(location) = &feature.geometry else {
        return Err(TravelDataError::UnexpectedGeometry {
            index,
            expected: "Point",
        });
    };
    Ok(Place {
        name: required(feature, index, "name")?,
        location: *location,
        note: feature.property_str("note").unwrap_or_default(),
    })
}

fn decode_link(index: usize, feature: &Feature) -> Result<Link, TravelDataError> {
    let endpoints = match &feature.geometry {
        Geometry::LineString(pts) if pts.len() >= 2 => Some([pts[0], pts[pts.len() - 1]]),
        Geometry::LineString(_) => None,
        _ => {
            return Err(TravelDataError::UnexpectedGeometry {
                index,
                expected: "LineString",
            });
        }
    };
    Ok(Link {
        source: required(feature, index, "sourcename")?,
        target: required(feature, index, "targetname")?,
        transport: Transport::parse(&feature.property_str("transport").unwrap_or_default()),
        endpoints,
    })
}

/// Decodes every feature with `decode`, keeping the good records and the
/// reasons the others were dropped.
fn decode_all<T>(
    fc: &FeatureCollection,
    decode: fn(usize, &Feature) -> Result<T, TravelDataError>,
) -> (Vec<T>, Vec<TravelDataError>) {
    let mut records = Vec::with_capacity(fc.len());
    let mut skipped = Vec::new();
    for (index, feature) in fc.features.iter().enumerate() {
        match decode(index, feature) {
            Ok(record) => records.push(record),
            Err(e) => skipped.push(e),
        }
    }
    (records, skipped)
}

/// Places of a point collection. Features without a name or a point
/// geometry are skipped and reported.
pub fn places_from_geojson(fc: &FeatureCollection) -> (Vec<Place>, Vec<TravelDataError>) {
    decode_all(fc, decode_place)
}

/// Links of a line collection. Features without both endpoint names or
/// with a non-line geometry are skipped and reported.
pub fn links_from_geojson(fc: &FeatureCollection) -> (Vec<Link>, Vec<TravelDataError>) {
    decode_all(fc, decode_link)
}

/// Static places and links for a session.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TravelData {
    pub places: Vec<Place>,
    pub links: Vec<ResolvedLink>,
}

impl TravelData {
    /// Resolves link endpoints against the places. Links naming an unknown
    /// place are dropped and reported; the rest keep their original order.
    pub fn resolve(places: Vec<Place>, links: Vec<Link>) -> (Self, Vec<UnresolvedLink>) {
        let by_name: HashMap<&str, LonLat> = places
            .iter()
            .map(|p| (p.name.as_str(), p.location))
            .collect();

        let mut resolved = Vec::with_capacity(links.len());
        let mut skipped = Vec::new();
        for (index, link) in links.into_iter().enumerate() {
            let from = by_name.get(link.source.as_str()).copied();
            let to = by_name.get(link.target.as_str()).copied();
            let (Some(from), Some(to)) = (from, to) else {
                let missing = if from.is_none() {
                    link.source
                } else {
                    link.target
                };
                skipped.push(UnresolvedLink { index, missing });
                continue;
            };
            let [from, to] = link.endpoints.unwrap_or([from, to]);
            resolved.push(ResolvedLink {
                source: link.source,
                target: link.target,
                transport: link.transport,
                from,
                to,
            });
        }

        (
            Self {
                places,
                links: resolved,
            },
            skipped,
        )
    }

    pub fn places_on(&self, map: MapKind) -> impl Iterator<Item = &Place> {
        self.places.iter().filter(move |p| p.belongs_to(map))
    }
}
