use std::time::Duration;

use http::Method;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for an [`HttpClient`](super::HttpClient) instance.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Base URL that relative request URLs join against.
    pub base_url: Option<String>,
    /// Transport timeout applied to every request. Defaults to
    /// [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
    /// Bearer token attached as `Authorization` unless a request opts out.
    pub token: Option<String>,
    /// Value for the `clientid` header, when set.
    pub client_id: Option<String>,
    /// Extra headers attached to every request.
    pub default_headers: Vec<(String, String)>,
    /// Upper bound on how long a request may sit parked in the serializer
    /// before failing with a queue-timeout error. `None` keeps the
    /// unbounded behavior.
    pub queue_timeout: Option<Duration>,
}

/// Description of a single outgoing request.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    /// Absolute URL, or a path resolved against the client's base URL.
    pub url: String,
    pub query: Vec<(String, String)>,
    /// JSON request body.
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    /// Attach the configured bearer token. Defaults to true; login-style
    /// endpoints turn this off.
    pub with_token: bool,
    /// Attach the configured `clientid` header. Defaults to true.
    pub with_client_id: bool,
    /// Set by the abort registry on dispatch; observed by the transport.
    pub(crate) cancel: Option<CancellationToken>,
}

impl RequestConfig {
    #[must_use]
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: url.to_owned(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            with_token: true,
            with_client_id: true,
            cancel: None,
        }
    }

    #[must_use]
    pub fn get(url: &str) -> Self {
        Self::new(Method::GET, url)
    }

    #[must_use]
    pub fn post(url: &str, body: serde_json::Value) -> Self {
        let mut config = Self::new(Method::POST, url);
        config.body = Some(body);
        config
    }

    /// Token attached by the abort registry, if the request was dispatched.
    #[must_use]
    pub fn cancel_token(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }
}
