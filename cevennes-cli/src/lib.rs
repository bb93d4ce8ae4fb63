//! Command-line entry point for fetching the Cévennes map datasets.
//!
//! `cevennes-fetch` reads Overpass queries from `scripts/overpass`, fetches
//! each one from the public mirrors and writes GeoJSON into `data`, both
//! relative to the working directory.
#![forbid(unsafe_code)]

mod error;

use cevennes_data::batch::{BatchConfig, BatchReport, run_batch};
use cevennes_data::overpass::{OverpassClient, OverpassConfig, QueryTransport};
use clap::Parser;

pub use error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "cevennes-fetch",
    about = "Fetch trail and point-of-interest layers for the Cévennes map from Overpass",
    version
)]
struct Cli {}

/// Run `cevennes-fetch` with the current process arguments.
///
/// # Errors
/// Returns [`CliError`] for argument and configuration faults or when the
/// runtime cannot start.
pub fn run() -> Result<BatchReport, CliError> {
    Cli::try_parse()?;
    fetch(&BatchConfig::default(), &OverpassConfig::default())
}

/// Fetch every dataset in `batch` over HTTP.
///
/// # Errors
/// Returns [`CliError::Client`] if `overpass` is invalid.
pub fn fetch(batch: &BatchConfig, overpass: &OverpassConfig) -> Result<BatchReport, CliError> {
    let client = OverpassClient::new(overpass)?;
    fetch_with(batch, &client)
}

/// Fetch every dataset in `batch` through `client` on a current-thread runtime.
///
/// # Errors
/// Returns [`CliError::Runtime`] if the runtime cannot start.
pub fn fetch_with<T: QueryTransport>(
    batch: &BatchConfig,
    client: &OverpassClient<T>,
) -> Result<BatchReport, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    Ok(runtime.block_on(run_batch(batch, client)))
}

#[cfg(test)]
mod tests;
