//! Overpass API response types.
//!
//! These mirror the JSON emitted by an Overpass interpreter for queries using
//! `[out:json]`. Only the fields needed to rebuild geometries are modelled;
//! unknown element types (`area`, `count`, ...) deserialise to
//! [`Element::Other`] and are ignored downstream.
//!
//! See: <https://wiki.openstreetmap.org/wiki/Overpass_API/Overpass_QL#JSON_(JavaScript_Object_Notation)>

use std::collections::BTreeMap;

use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Free-form OpenStreetMap tags.
pub type Tags = BTreeMap<String, String>;

/// Top-level Overpass JSON document.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverpassResponse {
    /// Elements in the order the interpreter emitted them.
    #[cfg_attr(feature = "serde", serde(default))]
    pub elements: Vec<Element>,

    /// Diagnostic set by the interpreter when a query ran out of time or
    /// memory. The response is still well formed but may be truncated.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub remark: Option<String>,
}

#[cfg(feature = "serde")]
impl OverpassResponse {
    /// Parse a response body.
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error when `body` is not an Overpass JSON
    /// document.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

/// One OSM element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Element {
    /// A point.
    Node(Node),
    /// An ordered list of nodes.
    Way(Way),
    /// A group of members.
    Relation(Relation),
    /// Any other element type the interpreter may return.
    #[cfg_attr(feature = "serde", serde(other))]
    Other,
}

/// Latitude/longitude pair as emitted by `out geom`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatLon {
    /// Latitude in WGS84 degrees.
    pub lat: f64,
    /// Longitude in WGS84 degrees.
    pub lon: f64,
}

impl From<LatLon> for Coord<f64> {
    fn from(value: LatLon) -> Self {
        Self {
            x: value.lon,
            y: value.lat,
        }
    }
}

/// An OSM node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    /// OSM identifier.
    pub id: u64,
    /// Latitude; absent for `out ids` output.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lat: Option<f64>,
    /// Longitude; absent for `out ids` output.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lon: Option<f64>,
    /// Node tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
}

impl Node {
    /// Position of the node, when the output mode included coordinates.
    #[must_use]
    pub fn coord(&self) -> Option<Coord<f64>> {
        match (self.lon, self.lat) {
            (Some(x), Some(y)) => Some(Coord { x, y }),
            _ => None,
        }
    }
}

/// An OSM way.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Way {
    /// OSM identifier.
    pub id: u64,
    /// Referenced node identifiers.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nodes: Vec<u64>,
    /// Inline geometry from `out geom`. Entries are `null` when the way was
    /// clipped by a bounding box.
    #[cfg_attr(feature = "serde", serde(default))]
    pub geometry: Vec<Option<LatLon>>,
    /// Way tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
}

/// An OSM relation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Relation {
    /// OSM identifier.
    pub id: u64,
    /// Relation members in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub members: Vec<Member>,
    /// Relation tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
}

/// Element type referenced by a relation member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MemberKind {
    /// Member is a node.
    Node,
    /// Member is a way.
    Way,
    /// Member is a nested relation.
    Relation,
}

/// A relation member.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Member {
    /// Type of the referenced element.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: MemberKind,
    /// Identifier of the referenced element.
    #[cfg_attr(feature = "serde", serde(rename = "ref"))]
    pub reference: u64,
    /// Member role, e.g. `outer` or `inner`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: String,
    /// Inline way geometry from `out geom`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub geometry: Vec<Option<LatLon>>,
}
