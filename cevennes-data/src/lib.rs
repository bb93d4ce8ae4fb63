//! Data acquisition for the Cévennes map.
//!
//! Responsibilities:
//! - Submit Overpass queries to public mirrors with retry and fallback.
//! - Load query documents from disk and write GeoJSON results.
//! - Orchestrate the fixed batch of trail and POI datasets.
//!
//! Boundaries:
//! - Do not encode conversion rules (live in `cevennes-core`).
//! - Logging goes through the `log` facade; installing a logger is the
//!   binary's job.
//!
//! Invariants:
//! - Every dataset whose query document exists yields exactly one output
//!   file, holding either fetched features or an empty collection.
//! - Nothing that happens to one dataset aborts the batch: remote
//!   unavailability degrades to an empty collection and local faults are
//!   reported per dataset.
#![forbid(unsafe_code)]

pub mod batch;
mod materialize;
pub mod overpass;
mod query;

pub use batch::{BatchConfig, BatchReport, DatasetCatalogue, DatasetError, run_batch};
pub use materialize::{DatasetStatus, MaterializeError, materialize};
pub use overpass::{OverpassClient, OverpassConfig, OverpassUnavailable};
pub use query::{QueryReadError, read_query};
