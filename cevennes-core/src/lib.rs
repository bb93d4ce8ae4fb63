//! Core domain types for the Cévennes map data pipeline.
//!
//! The crate models the two ends of the pipeline without performing any I/O:
//! the raw Overpass API result ([`OverpassResponse`]) and the GeoJSON
//! [`FeatureCollection`] persisted for the map. [`to_feature_collection`]
//! converts between them and [`QueryDocument`] normalises query text so the
//! bytes sent over the network do not depend on how a file was authored.

#![forbid(unsafe_code)]

mod convert;
pub mod geojson;
pub mod overpass;
mod query;

pub use convert::to_feature_collection;
pub use geojson::{ElementKind, Feature, FeatureCollection, FeatureProperties, Geometry};
pub use overpass::{Element, LatLon, Member, MemberKind, Node, OverpassResponse, Relation, Way};
pub use query::{QueryDocument, QueryDocumentError};
