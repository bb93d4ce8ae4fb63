//! Configuration for [`super::OverpassClient`].

use std::time::Duration;

/// Default user agent for Overpass requests.
pub const DEFAULT_USER_AGENT: &str = "cevennes-map/1.0";

/// Public Overpass mirrors, in the order they are tried.
pub const DEFAULT_ENDPOINTS: [&str; 4] = [
    "https://overpass.kumi.systems/api/interpreter",
    "https://overpass-api.de/api/interpreter",
    "https://overpass.openstreetmap.fr/api/interpreter",
    "https://overpass.openstreetmap.ru/api/interpreter",
];

/// Default number of attempts made against each endpoint.
pub const DEFAULT_TRIES_PER_ENDPOINT: u32 = 2;

/// Default backoff unit; attempt `n` waits `n` times this long.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(2_500);

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Configuration for [`super::OverpassClient`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use cevennes_data::overpass::OverpassConfig;
///
/// let config = OverpassConfig::new(["http://localhost:12345/api/interpreter"])
///     .with_tries_per_endpoint(3)
///     .with_backoff(Duration::ZERO);
/// assert_eq!(config.endpoints.len(), 1);
/// assert_eq!(config.tries_per_endpoint, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassConfig {
    /// Interchangeable interpreter URLs in priority order.
    pub endpoints: Vec<String>,
    /// Attempts made against each endpoint before moving to the next.
    pub tries_per_endpoint: u32,
    /// Backoff unit between attempts on the same endpoint.
    pub backoff: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|&url| url.to_owned()).collect(),
            tries_per_endpoint: DEFAULT_TRIES_PER_ENDPOINT,
            backoff: DEFAULT_BACKOFF,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OverpassConfig {
    /// Create a configuration targeting the given endpoints.
    #[must_use]
    pub fn new<I, S>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoints: endpoints.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the number of attempts per endpoint.
    #[must_use]
    pub fn with_tries_per_endpoint(mut self, tries: u32) -> Self {
        self.tries_per_endpoint = tries;
        self
    }

    /// Set the backoff unit.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
