//! GeoJSON feature collection model.
//!
//! Geometries are held as [`geo`] types and serialised with the RFC 7946
//! `{"type": ..., "coordinates": ...}` layout, positions ordered
//! `[longitude, latitude]`.

use geo::{LineString, MultiLineString, MultiPolygon, Point, Polygon};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::overpass::Tags;

/// A GeoJSON `FeatureCollection`.
///
/// # Examples
/// ```
/// use cevennes_core::FeatureCollection;
///
/// let empty = FeatureCollection::empty();
/// assert!(empty.is_empty());
/// assert_eq!(
///     String::from_utf8(empty.to_pretty_json()?).unwrap(),
///     "{\n  \"type\": \"FeatureCollection\",\n  \"features\": []\n}"
/// );
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename = "FeatureCollection"))]
pub struct FeatureCollection {
    /// Features in output order.
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// A collection without features.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(feature = "serde")]
impl FeatureCollection {
    /// Serialise as UTF-8 JSON indented by two spaces.
    ///
    /// Non-ASCII characters are written as-is rather than escaped, so place
    /// names such as `Saint-Jean-du-Gard` or `Mont Aigoual – observatoire`
    /// remain readable in the output file.
    ///
    /// # Errors
    ///
    /// Returns the serialiser error if a coordinate cannot be represented in
    /// JSON (for example a NaN produced by malformed input).
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

/// A GeoJSON `Feature`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename = "Feature"))]
pub struct Feature {
    /// Provenance of the feature.
    pub properties: FeatureProperties,
    /// Feature geometry.
    pub geometry: Geometry,
}

/// OSM element type recorded in feature properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ElementKind {
    /// Converted from a node.
    Node,
    /// Converted from a way.
    Way,
    /// Converted from a relation.
    Relation,
}

/// Feature properties: the source element and its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureProperties {
    /// Source element type.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ElementKind,
    /// Source element identifier.
    pub id: u64,
    /// Source element tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
}

/// Geometry of a feature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(into = "GeometryRepr", from = "GeometryRepr")
)]
pub enum Geometry {
    /// A single position.
    Point(Point<f64>),
    /// An open or closed line.
    LineString(LineString<f64>),
    /// An area with optional holes.
    Polygon(Polygon<f64>),
    /// Several lines, e.g. the ways of a hiking route.
    MultiLineString(MultiLineString<f64>),
    /// Several areas.
    MultiPolygon(MultiPolygon<f64>),
}

#[cfg(feature = "serde")]
type Position = [f64; 2];

/// Wire layout of [`Geometry`].
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum GeometryRepr {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

#[cfg(feature = "serde")]
fn position(coord: geo::Coord<f64>) -> Position {
    [coord.x, coord.y]
}

#[cfg(feature = "serde")]
fn line_positions(line: &LineString<f64>) -> Vec<Position> {
    line.coords().copied().map(position).collect()
}

#[cfg(feature = "serde")]
fn polygon_positions(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(line_positions)
        .collect()
}

#[cfg(feature = "serde")]
fn polygon_from_rings(rings: Vec<Vec<Position>>) -> Polygon<f64> {
    let mut lines = rings.into_iter().map(LineString::from);
    let exterior = lines.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Polygon::new(exterior, lines.collect())
}

#[cfg(feature = "serde")]
impl From<Geometry> for GeometryRepr {
    fn from(value: Geometry) -> Self {
        match value {
            Geometry::Point(point) => Self::Point(position(point.0)),
            Geometry::LineString(line) => Self::LineString(line_positions(&line)),
            Geometry::Polygon(polygon) => Self::Polygon(polygon_positions(&polygon)),
            Geometry::MultiLineString(lines) => {
                Self::MultiLineString(lines.iter().map(line_positions).collect())
            }
            Geometry::MultiPolygon(polygons) => {
                Self::MultiPolygon(polygons.iter().map(polygon_positions).collect())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl From<GeometryRepr> for Geometry {
    fn from(value: GeometryRepr) -> Self {
        match value {
            GeometryRepr::Point([x, y]) => Self::Point(Point::new(x, y)),
            GeometryRepr::LineString(line) => Self::LineString(LineString::from(line)),
            GeometryRepr::Polygon(rings) => Self::Polygon(polygon_from_rings(rings)),
            GeometryRepr::MultiLineString(lines) => Self::MultiLineString(MultiLineString::new(
                lines.into_iter().map(LineString::from).collect(),
            )),
            GeometryRepr::MultiPolygon(polygons) => Self::MultiPolygon(MultiPolygon::new(
                polygons.into_iter().map(polygon_from_rings).collect(),
            )),
        }
    }
}
