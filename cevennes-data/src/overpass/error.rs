//! Error types produced by the Overpass client.

use std::fmt;

use thiserror::Error;

/// HTTP method used for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    /// Form-encoded POST, the primary method.
    Post,
    /// GET with the query in the URL, used when a mirror rejects the POST.
    Get,
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Post => "POST",
            Self::Get => "GET",
        })
    }
}

/// Configuration errors detected when building an [`super::OverpassClient`].
///
/// These indicate a programming or deployment mistake and are never turned
/// into an empty dataset.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientBuildError {
    /// The endpoint list was empty.
    #[error("at least one Overpass endpoint is required")]
    NoEndpoints,
    /// The per-endpoint attempt count was zero.
    #[error("tries per endpoint must be at least one")]
    NoAttempts,
    /// An endpoint could not be parsed as a URL.
    #[error("invalid Overpass endpoint {url:?}")]
    InvalidEndpoint {
        /// Offending endpoint string.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// An endpoint used a scheme other than `http` or `https`.
    #[error("unsupported scheme {scheme:?} for Overpass endpoint {url:?}")]
    UnsupportedScheme {
        /// Offending endpoint string.
        url: String,
        /// Scheme found in the endpoint.
        scheme: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// Transport-level failures: the request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// Connection, TLS or body read failure.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// Description from the HTTP client.
        message: String,
    },
}

/// Why a single attempt against one endpoint failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    /// The endpoint answered with a non-success status.
    #[error("{method} {endpoint} returned HTTP {status}")]
    Status {
        /// Endpoint URL.
        endpoint: String,
        /// Method of the failing request.
        method: RequestMethod,
        /// HTTP status code.
        status: u16,
    },
    /// The request did not complete.
    #[error("{method} {source}")]
    Transport {
        /// Method of the failing request.
        method: RequestMethod,
        /// Underlying transport failure.
        source: TransportError,
    },
    /// The endpoint answered 2xx with a body that is not Overpass JSON.
    #[error("{method} {endpoint} returned an undecodable body: {source}")]
    Decode {
        /// Endpoint URL.
        endpoint: String,
        /// Method of the failing request.
        method: RequestMethod,
        /// JSON error.
        source: serde_json::Error,
    },
}

/// Every attempt against every endpoint failed.
///
/// This is the only failure [`super::OverpassClient::run_query`] reports; the
/// batch recovers from it by writing an empty feature collection.
#[derive(Debug, Error)]
#[error("Overpass unavailable after {attempts} attempts: {}", describe(.last_error))]
pub struct OverpassUnavailable {
    /// Number of attempts made, counting a GET fallback as part of its attempt.
    pub attempts: u32,
    /// Failure of the final attempt.
    #[source]
    pub last_error: Option<AttemptError>,
}

fn describe(last_error: &Option<AttemptError>) -> String {
    last_error
        .as_ref()
        .map_or_else(|| "no attempt was made".to_owned(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unavailable_reports_last_error() {
        let error = OverpassUnavailable {
            attempts: 8,
            last_error: Some(AttemptError::Status {
                endpoint: "https://overpass.example/api/interpreter".to_owned(),
                method: RequestMethod::Post,
                status: 504,
            }),
        };

        assert_eq!(
            error.to_string(),
            "Overpass unavailable after 8 attempts: POST https://overpass.example/api/interpreter returned HTTP 504"
        );
    }

    #[rstest]
    fn transport_attempt_names_method() {
        let error = AttemptError::Transport {
            method: RequestMethod::Get,
            source: TransportError::Timeout {
                url: "https://overpass.example/api/interpreter".to_owned(),
                timeout_secs: 180,
            },
        };

        assert_eq!(
            error.to_string(),
            "GET request to https://overpass.example/api/interpreter timed out after 180s"
        );
    }
}
