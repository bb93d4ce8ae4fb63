//! Sequential processing of every dataset in a catalogue.
//!
//! Each dataset moves through `read → fetch → materialize`: a missing query
//! document is skipped, a fetched result is converted and written, and an
//! unavailable result is written as an empty feature collection. A local
//! fault is recorded against its dataset and the batch moves on.

mod catalogue;
mod config;
mod report;

use std::error::Error as StdError;

use log::{error, info};
use thiserror::Error;

use crate::materialize::{DatasetStatus, MaterializeError, materialize};
use crate::overpass::{OverpassClient, QueryTransport};
use crate::query::{QueryReadError, read_query};

pub use catalogue::{CatalogueError, Dataset, DatasetCatalogue, POI_KEYS};
pub use config::{BatchConfig, DEFAULT_OUTPUT_DIR, DEFAULT_PACING, DEFAULT_QUERIES_DIR};
pub use report::{BatchReport, DatasetReport};

/// A local fault that prevented one dataset from being processed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    /// A query document exists but could not be loaded.
    #[error("failed to load query for dataset {key}")]
    Read {
        /// Dataset key.
        key: String,
        /// Underlying failure.
        source: QueryReadError,
    },
    /// A result could not be written.
    #[error("failed to write output for dataset {key}")]
    Write {
        /// Dataset key.
        key: String,
        /// Underlying failure.
        source: MaterializeError,
    },
}

impl DatasetError {
    /// The message followed by every underlying cause, `: `-separated.
    #[must_use]
    pub fn describe(&self) -> String {
        std::iter::successors(Some(self as &(dyn StdError + 'static)), |&err| err.source())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ")
    }
}

/// Process every dataset in `config.catalogue`, trails first.
///
/// Datasets are handled one at a time with `config.pacing` between
/// successive items. Every dataset whose query document exists ends up with
/// exactly one output file unless a local fault prevents it; such faults are
/// logged, reported as [`DatasetStatus::Failed`] and never stop the batch.
///
/// # Examples
/// ```no_run
/// use cevennes_data::batch::{BatchConfig, run_batch};
/// use cevennes_data::overpass::{OverpassClient, OverpassConfig};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OverpassClient::new(&OverpassConfig::default())?;
/// let report = run_batch(&BatchConfig::default(), &client).await;
/// println!("{} datasets written", report.written());
/// # Ok(())
/// # }
/// ```
pub async fn run_batch<T: QueryTransport>(
    config: &BatchConfig,
    client: &OverpassClient<T>,
) -> BatchReport {
    let mut report = BatchReport::default();
    for (index, dataset) in config.catalogue.iter().enumerate() {
        if index > 0 && !config.pacing.is_zero() {
            tokio::time::sleep(config.pacing).await;
        }
        let status = match process(config, client, dataset).await {
            Ok(status) => status,
            Err(err) => {
                let reason = err.describe();
                error!("✗ {} ({reason})", dataset.output());
                DatasetStatus::Failed { reason }
            }
        };
        report.push(DatasetReport {
            key: dataset.key().to_owned(),
            output: dataset.output().to_owned(),
            status,
        });
    }
    info!(
        "Overpass batch finished: {} written, {} empty, {} skipped, {} failed (output in {})",
        report.written(),
        report.written_empty(),
        report.skipped(),
        report.failed(),
        config.output_dir
    );
    report
}

async fn process<T: QueryTransport>(
    config: &BatchConfig,
    client: &OverpassClient<T>,
    dataset: &Dataset,
) -> Result<DatasetStatus, DatasetError> {
    let query = read_query(&config.queries_dir, &dataset.query_file()).map_err(|source| {
        DatasetError::Read {
            key: dataset.key().to_owned(),
            source,
        }
    })?;
    let Some(query) = query else {
        return Ok(DatasetStatus::Skipped);
    };
    let outcome = client.run_query(&query).await;
    materialize(outcome, &config.output_dir, dataset.output()).map_err(|source| {
        DatasetError::Write {
            key: dataset.key().to_owned(),
            source,
        }
    })
}
