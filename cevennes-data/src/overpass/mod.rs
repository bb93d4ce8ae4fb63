//! Resilient Overpass API client.
//!
//! [`OverpassClient`] submits a query to a list of interchangeable public
//! mirrors. Every endpoint gets a bounded number of attempts with linear
//! backoff, and a mirror that refuses the form-encoded POST with 400 or 403
//! is asked again with a GET. The caller receives either the decoded
//! [`cevennes_core::OverpassResponse`] or an explicit [`OverpassUnavailable`].
//!
//! Requests go through the [`QueryTransport`] trait so tests can script
//! replies without a network; [`HttpTransport`] is the `reqwest` backed
//! implementation.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use cevennes_core::QueryDocument;
//! use cevennes_data::overpass::{OverpassClient, OverpassConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OverpassConfig::new(["https://overpass-api.de/api/interpreter"])
//!     .with_tries_per_endpoint(3)
//!     .with_backoff(Duration::from_secs(1));
//! let client = OverpassClient::new(&config)?;
//!
//! match client.run_query(&QueryDocument::normalise("[out:json];node(1);out;")).await {
//!     Ok(response) => println!("{} elements", response.elements.len()),
//!     Err(unavailable) => eprintln!("{unavailable}"),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod transport;

#[doc(hidden)]
pub mod test_support;

pub use client::{FetchOutcome, OverpassClient};
pub use config::{
    DEFAULT_BACKOFF, DEFAULT_ENDPOINTS, DEFAULT_TRIES_PER_ENDPOINT, DEFAULT_USER_AGENT,
    OverpassConfig,
};
pub use error::{
    AttemptError, ClientBuildError, OverpassUnavailable, RequestMethod, TransportError,
};
pub use transport::{Endpoint, HttpTransport, QueryTransport, TransportResponse};
