//! Multi-endpoint Overpass client with retry, backoff and GET fallback.

use std::time::Duration;

use cevennes_core::{OverpassResponse, QueryDocument};
use log::debug;

use super::config::OverpassConfig;
use super::error::{AttemptError, ClientBuildError, OverpassUnavailable, RequestMethod};
use super::transport::{Endpoint, HttpTransport, QueryTransport, TransportResponse};

/// Result of submitting one query: a decoded response or an explicit
/// unavailability report.
pub type FetchOutcome = Result<OverpassResponse, OverpassUnavailable>;

/// Submits queries to a list of interchangeable Overpass mirrors.
///
/// Endpoints are tried in order. Each gets `tries_per_endpoint` attempts, and
/// attempt `n` is followed by a pause of `n * backoff` unless it was the last
/// attempt overall. A POST rejected with 400 or 403 is re-sent once as GET
/// within the same attempt. The first decodable 2xx response wins.
///
/// # Examples
/// ```no_run
/// use cevennes_core::QueryDocument;
/// use cevennes_data::overpass::{OverpassClient, OverpassConfig};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OverpassClient::new(&OverpassConfig::default())?;
/// let query = QueryDocument::normalise("[out:json];node(1);out;");
/// let response = client.run_query(&query).await?;
/// println!("{} elements", response.elements.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OverpassClient<T = HttpTransport> {
    transport: T,
    endpoints: Vec<Endpoint>,
    tries_per_endpoint: u32,
    backoff: Duration,
}

impl OverpassClient<HttpTransport> {
    /// Build a client that talks HTTP through `reqwest`.
    ///
    /// # Errors
    /// Returns [`ClientBuildError`] when the configuration is unusable.
    pub fn new(config: &OverpassConfig) -> Result<Self, ClientBuildError> {
        let transport = HttpTransport::new(config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: QueryTransport> OverpassClient<T> {
    /// Build a client over an arbitrary transport.
    ///
    /// # Errors
    /// Returns [`ClientBuildError::NoEndpoints`] for an empty endpoint list,
    /// [`ClientBuildError::NoAttempts`] when `tries_per_endpoint` is zero, and
    /// an endpoint error for any URL that fails to parse.
    pub fn with_transport(config: &OverpassConfig, transport: T) -> Result<Self, ClientBuildError> {
        if config.endpoints.is_empty() {
            return Err(ClientBuildError::NoEndpoints);
        }
        if config.tries_per_endpoint == 0 {
            return Err(ClientBuildError::NoAttempts);
        }
        let endpoints = config
            .endpoints
            .iter()
            .map(|raw| Endpoint::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            transport,
            endpoints,
            tries_per_endpoint: config.tries_per_endpoint,
            backoff: config.backoff,
        })
    }

    /// Borrow the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Endpoints in the order they are tried.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Submit `query`, falling through mirrors until one answers.
    ///
    /// # Errors
    /// Returns [`OverpassUnavailable`] once every attempt on every endpoint
    /// has failed. Individual failures are logged at debug level.
    pub async fn run_query(&self, query: &QueryDocument) -> FetchOutcome {
        let mut attempts: u32 = 0;
        let mut last_error = None;
        let endpoint_count = self.endpoints.len();

        for (position, endpoint) in self.endpoints.iter().enumerate() {
            for attempt in 1..=self.tries_per_endpoint {
                attempts = attempts.saturating_add(1);
                match self.attempt(endpoint, query.as_str()).await {
                    Ok(response) => return Ok(response),
                    Err(error) => {
                        debug!(
                            "Overpass attempt {attempt}/{} on {endpoint} failed: {error}",
                            self.tries_per_endpoint
                        );
                        last_error = Some(error);
                    }
                }

                let final_attempt =
                    position + 1 == endpoint_count && attempt == self.tries_per_endpoint;
                if !final_attempt {
                    tokio::time::sleep(self.backoff.saturating_mul(attempt)).await;
                }
            }
        }

        Err(OverpassUnavailable {
            attempts,
            last_error,
        })
    }

    async fn attempt(
        &self,
        endpoint: &Endpoint,
        query: &str,
    ) -> Result<OverpassResponse, AttemptError> {
        let response = self
            .transport
            .post_form(endpoint, query)
            .await
            .map_err(|source| AttemptError::Transport {
                method: RequestMethod::Post,
                source,
            })?;

        if response.is_form_rejection() {
            debug!(
                "{endpoint} rejected POST with HTTP {}; retrying as GET",
                response.status
            );
            let fallback = self
                .transport
                .get_query(endpoint, query)
                .await
                .map_err(|source| AttemptError::Transport {
                    method: RequestMethod::Get,
                    source,
                })?;
            return decode(endpoint, RequestMethod::Get, &fallback);
        }

        decode(endpoint, RequestMethod::Post, &response)
    }
}

fn decode(
    endpoint: &Endpoint,
    method: RequestMethod,
    response: &TransportResponse,
) -> Result<OverpassResponse, AttemptError> {
    if !response.is_success() {
        return Err(AttemptError::Status {
            endpoint: endpoint.to_string(),
            method,
            status: response.status,
        });
    }
    OverpassResponse::from_slice(&response.body).map_err(|source| AttemptError::Decode {
        endpoint: endpoint.to_string(),
        method,
        source,
    })
}
