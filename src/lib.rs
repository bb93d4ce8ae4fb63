//! Facade crate for the Cévennes map data pipeline.
//!
//! This crate re-exports the Overpass and GeoJSON domain types and, behind
//! the `fetch` feature, the resilient client and batch orchestrator.

#![forbid(unsafe_code)]

pub use cevennes_core::{
    Element, ElementKind, Feature, FeatureCollection, FeatureProperties, Geometry, OverpassResponse,
    QueryDocument, QueryDocumentError, to_feature_collection,
};

#[cfg(feature = "fetch")]
pub use cevennes_data::{
    BatchConfig, BatchReport, DatasetCatalogue, DatasetError, DatasetStatus, OverpassClient,
    OverpassConfig, OverpassUnavailable, read_query, run_batch,
};
