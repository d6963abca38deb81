//! GeoJSON input for vector surfaces
//!
//! Multi-geometries are split into one feature per part; polygon holes are
//! dropped since a [`Geometry::Polygon`] is a single ring.

use crate::core::{area::Area, geo::GeoPoint};
use crate::data::feature::{Feature, FeatureStyle, Geometry};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// GeoJSON geometry objects (`[lng, lat]` positions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: Vec<f64>,
    },
    LineString {
        coordinates: Vec<Vec<f64>>,
    },
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPoint {
        coordinates: Vec<Vec<f64>>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection(Vec<GeoJsonFeature>),
    Geometry(GeoJsonGeometry),
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<GeoJsonFeature>,
}

fn position(coords: &[f64]) -> Result<GeoPoint> {
    match coords {
        [lng, lat] => GeoPoint::try_new(*lat, *lng),
        [lng, lat, alt, ..] => GeoPoint::try_new(*lat, *lng)?.with_alt(*alt),
        _ => Err(MapError::InvalidCoordinates(format!(
            "GeoJSON position needs at least 2 numbers, got {:?}",
            coords
        ))),
    }
}

fn positions(coords: &[Vec<f64>]) -> Result<Vec<GeoPoint>> {
    coords.iter().map(|c| position(c)).collect()
}

/// First ring of a polygon, without the repeated closing position
fn exterior_ring(rings: &[Vec<Vec<f64>>]) -> Result<Vec<GeoPoint>> {
    let Some(ring) = rings.first() else {
        return Ok(Vec::new());
    };
    let mut points = positions(ring)?;
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Ok(points)
}

impl GeoJsonGeometry {
    /// Flattens into the simple geometries a vector surface can draw
    pub fn to_geometries(&self) -> Result<Vec<Geometry>> {
        let geometries = match self {
            GeoJsonGeometry::Point { coordinates } => vec![Geometry::Point(position(coordinates)?)],
            GeoJsonGeometry::LineString { coordinates } => {
                vec![Geometry::Polyline(positions(coordinates)?)]
            }
            GeoJsonGeometry::Polygon { coordinates } => {
                vec![Geometry::Polygon(exterior_ring(coordinates)?)]
            }
            GeoJsonGeometry::MultiPoint { coordinates } => coordinates
                .iter()
                .map(|c| position(c).map(Geometry::Point))
                .collect::<Result<_>>()?,
            GeoJsonGeometry::MultiLineString { coordinates } => coordinates
                .iter()
                .map(|line| positions(line).map(Geometry::Polyline))
                .collect::<Result<_>>()?,
            GeoJsonGeometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .map(|rings| exterior_ring(rings).map(Geometry::Polygon))
                .collect::<Result<_>>()?,
            GeoJsonGeometry::GeometryCollection { geometries } => {
                let mut flat = Vec::new();
                for geometry in geometries {
                    flat.extend(geometry.to_geometries()?);
                }
                flat
            }
        };
        Ok(geometries)
    }
}

impl GeoJson {
    pub fn from_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Dispatches on the `type` member; anything that is not a feature is read as a geometry
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        match value.get("type").and_then(|kind| kind.as_str()) {
            Some("Feature") => Ok(GeoJson::Feature(serde_json::from_value(value)?)),
            Some("FeatureCollection") => {
                let collection: FeatureCollection = serde_json::from_value(value)?;
                Ok(GeoJson::FeatureCollection(collection.features))
            }
            _ => Ok(GeoJson::Geometry(serde_json::from_value(value)?)),
        }
    }

    /// Converts every geometry into features numbered from `first_id`, all painted
    /// with `style`. GeoJSON properties are carried over.
    pub fn into_features(self, first_id: u64, style: &FeatureStyle) -> Result<Vec<Feature>> {
        let sources = match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection(features) => features,
            GeoJson::Geometry(geometry) => vec![GeoJsonFeature {
                id: None,
                geometry: Some(geometry),
                properties: None,
            }],
        };

        let mut next_id = first_id;
        let mut features = Vec::new();
        for source in sources {
            let Some(geometry) = &source.geometry else {
                continue;
            };
            for geometry in geometry.to_geometries()? {
                let mut feature = Feature::new(next_id, geometry).with_style(style.clone());
                if let Some(properties) = &source.properties {
                    feature.properties = properties.clone();
                }
                if let Some(id) = &source.id {
                    feature.properties.insert("id".to_string(), id.clone());
                }
                features.push(feature);
                next_id += 1;
            }
        }

        log::debug!("Loaded {} features from GeoJSON", features.len());
        Ok(features)
    }
}

/// Geographic extent of a set of features; invalid when there are none
pub fn features_area(features: &[Feature]) -> Area {
    let mut area = Area::empty();
    for feature in features {
        for point in feature.geometry.points() {
            area.extend(point);
        }
    }
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feature::FeatureId;

    #[test]
    fn test_feature_collection() {
        let json = r#"
        {
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": "nyc",
                    "properties": {"name": "New York"},
                    "geometry": {"type": "Point", "coordinates": [-74.0060, 40.7128]}
                },
                {
                    "type": "Feature",
                    "properties": null,
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 0]]]
                    }
                }
            ]
        }
        "#;

        let features = GeoJson::from_str(json)
            .unwrap()
            .into_features(100, &FeatureStyle::default())
            .unwrap();
        assert_eq!(features.len(), 2);

        assert_eq!(features[0].id, FeatureId(100));
        assert_eq!(features[0].geometry, Geometry::Point(GeoPoint::new(40.7128, -74.0060)));
        assert_eq!(features[0].property("name"), Some(&serde_json::json!("New York")));
        assert_eq!(features[0].property("id"), Some(&serde_json::json!("nyc")));

        match &features[1].geometry {
            Geometry::Polygon(ring) => assert_eq!(ring.len(), 3),
            other => panic!("expected polygon, got {:?}", other),
        }

        let area = features_area(&features);
        assert_eq!(area.west(), -74.0060);
        assert_eq!(area.north(), 40.7128);
    }

    #[test]
    fn test_multi_geometries_split() {
        let json = r#"{"type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]], [[2, 2], [3, 3]]]}"#;
        let features = GeoJson::from_str(json)
            .unwrap()
            .into_features(0, &FeatureStyle::default())
            .unwrap();

        assert_eq!(features.len(), 2);
        assert!(matches!(features[1].geometry, Geometry::Polyline(_)));
        assert_eq!(features[1].id, FeatureId(1));
    }

    #[test]
    fn test_bad_position_is_rejected() {
        let json = r#"{"type": "Point", "coordinates": [1]}"#;
        let result = GeoJson::from_str(json)
            .unwrap()
            .into_features(0, &FeatureStyle::default());
        assert!(matches!(result, Err(MapError::InvalidCoordinates(_))));

        assert!(matches!(
            GeoJson::from_str("{not json"),
            Err(MapError::Serialization(_))
        ));
    }
}
