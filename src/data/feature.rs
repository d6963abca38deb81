use crate::core::{area::Area, geo::GeoPoint};
use crate::geometry::center::{polygon_center, polyline_center};
use crate::projection::crs::Crs;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a feature, unique within the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(pub u64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape of a vector feature in geographic coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// Drawn as a circle of `FeatureStyle::radius` pixels
    Point(GeoPoint),
    Polyline(Vec<GeoPoint>),
    /// A single ring, implicitly closed
    Polygon(Vec<GeoPoint>),
}

impl Geometry {
    pub fn points(&self) -> &[GeoPoint] {
        match self {
            Geometry::Point(point) => std::slice::from_ref(point),
            Geometry::Polyline(points) | Geometry::Polygon(points) => points,
        }
    }

    /// Geographic extent; invalid for an empty line or ring
    pub fn area(&self) -> Area {
        Area::from_points(self.points())
    }

    pub fn is_empty(&self) -> bool {
        self.points().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Geometry::Polygon(_))
    }

    /// Anchor point for labels and popups
    pub fn center(&self, crs: &Crs) -> Result<GeoPoint> {
        match self {
            Geometry::Point(point) => Ok(*point),
            Geometry::Polyline(points) => polyline_center(points, crs),
            Geometry::Polygon(points) => polygon_center(points, crs),
        }
    }
}

impl From<GeoPoint> for Geometry {
    fn from(point: GeoPoint) -> Self {
        Geometry::Point(point)
    }
}

fn coords_to_points<'a, I>(coords: I) -> Result<Vec<GeoPoint>>
where
    I: IntoIterator<Item = &'a geo_types::Coord<f64>>,
{
    coords
        .into_iter()
        .map(|coord| GeoPoint::try_from(*coord))
        .collect()
}

impl TryFrom<&geo_types::Geometry<f64>> for Geometry {
    type Error = MapError;

    /// geo-types uses `x = lng`, `y = lat`. Polygons keep their exterior ring only.
    fn try_from(geometry: &geo_types::Geometry<f64>) -> Result<Self> {
        match geometry {
            geo_types::Geometry::Point(point) => Ok(Geometry::Point(GeoPoint::try_from(*point)?)),
            geo_types::Geometry::LineString(line) => Ok(Geometry::Polyline(coords_to_points(&line.0)?)),
            geo_types::Geometry::Polygon(polygon) => {
                let ring = &polygon.exterior().0;
                // geo-types rings repeat the first coordinate at the end
                let open = match ring.split_last() {
                    Some((last, rest)) if rest.first() == Some(last) => rest,
                    _ => ring.as_slice(),
                };
                Ok(Geometry::Polygon(coords_to_points(open)?))
            }
            other => Err(MapError::InvalidCoordinates(format!(
                "unsupported geometry type: {:?}",
                other
            ))),
        }
    }
}

impl From<&Geometry> for geo_types::Geometry<f64> {
    fn from(geometry: &Geometry) -> Self {
        let coords = |points: &[GeoPoint]| -> Vec<geo_types::Coord<f64>> {
            points.iter().map(|p| geo_types::Coord::from(*p)).collect()
        };
        match geometry {
            Geometry::Point(point) => geo_types::Point::from(geo_types::Coord::from(*point)).into(),
            Geometry::Polyline(points) => geo_types::LineString::new(coords(points)).into(),
            Geometry::Polygon(points) => {
                geo_types::Polygon::new(geo_types::LineString::new(coords(points)), Vec::new()).into()
            }
        }
    }
}

/// Paint of a vector feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureStyle {
    pub color: String,
    /// Stroke width in pixels
    pub weight: f64,
    pub opacity: f64,
    pub stroke: bool,
    /// `None` fills polygons and points but not polylines
    pub fill: Option<bool>,
    pub fill_color: String,
    pub fill_opacity: f64,
    /// Circle radius of point features, in pixels
    pub radius: f64,
}

impl Default for FeatureStyle {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
            weight: 3.0,
            opacity: 1.0,
            stroke: true,
            fill: None,
            fill_color: "blue".to_string(),
            fill_opacity: 0.2,
            radius: 10.0,
        }
    }
}

impl FeatureStyle {
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_fill(mut self, fill_color: impl Into<String>, fill_opacity: f64) -> Self {
        self.fill = Some(true);
        self.fill_color = fill_color.into();
        self.fill_opacity = fill_opacity;
        self
    }

    pub fn without_fill(mut self) -> Self {
        self.fill = Some(false);
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Whether `geometry` gets filled with this style
    pub fn fills(&self, geometry: &Geometry) -> bool {
        self.fill
            .unwrap_or(!matches!(geometry, Geometry::Polyline(_)))
    }
}

/// A vector feature: geometry, paint and free-form properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub style: FeatureStyle,
    /// Interactive features take part in hit testing
    #[serde(default = "default_interactive")]
    pub interactive: bool,
}

fn default_interactive() -> bool {
    true
}

impl Feature {
    pub fn new(id: u64, geometry: Geometry) -> Self {
        Self {
            id: FeatureId(id),
            geometry,
            properties: serde_json::Map::new(),
            style: FeatureStyle::default(),
            interactive: true,
        }
    }

    pub fn point(id: u64, point: GeoPoint) -> Self {
        Self::new(id, Geometry::Point(point))
    }

    pub fn polyline(id: u64, points: Vec<GeoPoint>) -> Self {
        Self::new(id, Geometry::Polyline(points))
    }

    pub fn polygon(id: u64, ring: Vec<GeoPoint>) -> Self {
        Self::new(id, Geometry::Polygon(ring))
    }

    pub fn with_style(mut self, style: FeatureStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::crs::EPSG3857;

    #[test]
    fn test_default_style() {
        let style = FeatureStyle::default();
        assert_eq!(style.color, "blue");
        assert_eq!(style.weight, 3.0);
        assert_eq!(style.fill_opacity, 0.2);
        assert_eq!(style.radius, 10.0);

        assert!(style.fills(&Geometry::Polygon(vec![])));
        assert!(!style.fills(&Geometry::Polyline(vec![])));
        assert!(style.clone().with_fill("red", 0.5).fills(&Geometry::Polyline(vec![])));
        assert!(!style.without_fill().fills(&Geometry::Polygon(vec![])));
    }

    #[test]
    fn test_geometry_area_and_center() {
        let line = Geometry::Polyline(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 20.0)]);
        let area = line.area();
        assert_eq!(area.west(), 0.0);
        assert_eq!(area.east(), 20.0);

        let center = line.center(&EPSG3857).unwrap();
        assert!(center.equals(&GeoPoint::new(0.0, 10.0), 1e-9));
        assert!(Geometry::Polygon(vec![]).center(&EPSG3857).is_err());
    }

    #[test]
    fn test_geo_types_round_trip() {
        let polygon = geo_types::Polygon::new(
            geo_types::LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (0.0, 0.0)]),
            vec![],
        );
        let geometry = Geometry::try_from(&geo_types::Geometry::Polygon(polygon)).unwrap();

        match &geometry {
            Geometry::Polygon(ring) => {
                assert_eq!(ring.len(), 3);
                assert_eq!(ring[1], GeoPoint::new(0.0, 10.0));
            }
            other => panic!("expected polygon, got {:?}", other),
        }

        let back: geo_types::Geometry<f64> = (&geometry).into();
        assert!(matches!(back, geo_types::Geometry::Polygon(_)));
    }

    #[test]
    fn test_feature_serde() {
        let feature = Feature::point(7, GeoPoint::new(1.0, 2.0)).with_property("name", "pin");
        let json = serde_json::to_string(&feature).unwrap();
        let parsed: Feature = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, feature);
        assert_eq!(parsed.property("name"), Some(&serde_json::json!("pin")));
        assert!(parsed.interactive);
    }
}
