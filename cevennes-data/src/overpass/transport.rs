//! HTTP transport seam used by [`super::OverpassClient`].

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::{Url, form_urlencoded};

use super::config::OverpassConfig;
use super::error::{ClientBuildError, TransportError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
const QUERY_PARAMETER: &str = "data";

/// A validated Overpass interpreter URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(Url);

impl Endpoint {
    /// Parse an endpoint, accepting only `http` and `https` URLs.
    ///
    /// # Errors
    /// Returns [`ClientBuildError::InvalidEndpoint`] when the string is not a
    /// URL and [`ClientBuildError::UnsupportedScheme`] for other schemes.
    pub fn parse(raw: &str) -> Result<Self, ClientBuildError> {
        let url = Url::parse(raw).map_err(|source| ClientBuildError::InvalidEndpoint {
            url: raw.to_owned(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(ClientBuildError::UnsupportedScheme {
                url: raw.to_owned(),
                scheme: other.to_owned(),
            }),
        }
    }

    /// Borrow the parsed URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.0
    }

    /// Borrow the URL as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// URL carrying `query` as the `data` parameter, used by the GET fallback.
    #[must_use]
    pub fn with_query(&self, query: &str) -> Url {
        let mut url = self.0.clone();
        url.query_pairs_mut().append_pair(QUERY_PARAMETER, query);
        url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Build a response from a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// Whether the mirror refused the request form itself (400 or 403).
    ///
    /// Such refusals are retried once as GET on the same endpoint.
    #[must_use]
    pub const fn is_form_rejection(&self) -> bool {
        matches!(self.status, 400 | 403)
    }
}

/// Sends Overpass queries over the wire.
///
/// Implementations report any HTTP status as `Ok`; only failures that
/// prevent a response are errors.
#[async_trait(?Send)]
pub trait QueryTransport {
    /// POST `query` as the form field `data`.
    async fn post_form(
        &self,
        endpoint: &Endpoint,
        query: &str,
    ) -> Result<TransportResponse, TransportError>;

    /// GET the endpoint with `query` as the `data` URL parameter.
    async fn get_query(
        &self,
        endpoint: &Endpoint,
        query: &str,
    ) -> Result<TransportResponse, TransportError>;
}

/// [`QueryTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout_secs: u64,
}

impl HttpTransport {
    /// Build a transport using the timeout and user agent from `config`.
    ///
    /// # Errors
    /// Returns [`ClientBuildError::HttpClient`] if the `reqwest` client cannot
    /// be built, for example because the user agent is not a valid header.
    pub fn new(config: &OverpassConfig) -> Result<Self, ClientBuildError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        Ok(Self {
            client,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<TransportResponse, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        Ok(TransportResponse::new(status, body.to_vec()))
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout_secs,
            };
        }
        TransportError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl QueryTransport for HttpTransport {
    async fn post_form(
        &self,
        endpoint: &Endpoint,
        query: &str,
    ) -> Result<TransportResponse, TransportError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair(QUERY_PARAMETER, query)
            .finish();
        let request = self
            .client
            .post(endpoint.url().clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        self.send(request, endpoint.as_str()).await
    }

    async fn get_query(
        &self,
        endpoint: &Endpoint,
        query: &str,
    ) -> Result<TransportResponse, TransportError> {
        let url = endpoint.with_query(query);
        let request = self.client.get(url.clone());
        self.send(request, url.as_str()).await
    }
}
