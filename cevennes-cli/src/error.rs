//! Error types emitted by the `cevennes-fetch` binary.

use cevennes_data::overpass::ClientBuildError;
use thiserror::Error;

/// Errors that stop `cevennes-fetch` with a non-zero exit status.
///
/// Per-dataset faults are not among them: unreachable mirrors degrade to
/// empty collections, local faults are reported per dataset, and the run
/// still succeeds.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// The Overpass client configuration is unusable.
    #[error("failed to build Overpass client")]
    Client(#[from] ClientBuildError),
    /// The async runtime could not start.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}
