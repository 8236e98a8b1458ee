//! HTTP client wrapper that routes every request through the control layer.
mod config;
mod status;


use http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::control::{AbortRegistry, RequestKey, RequestSerializer};
use crate::error::{ClientError, ConfigError, GateError, GateResult};

use status::status_message;

pub use config::{ClientConfig, DEFAULT_TIMEOUT, RequestConfig};

/// Header carrying the configured client id.
pub const CLIENT_ID_HEADER: &str = "clientid";

/// HTTP client with duplicate-request cancellation and per-URL
/// serialization.
///
/// Each instance owns its own [`AbortRegistry`] and [`RequestSerializer`];
/// nothing is shared between clients.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    config: ClientConfig,
    base_url: Option<Url>,
    aborts: AbortRegistry,
    queue: RequestSerializer,
}

impl HttpClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL does not parse or the underlying
    /// HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> GateResult<Self> {
        let base_url = match config.base_url.as_deref() {
            Some(raw) => Some(Url::parse(raw).map_err(|source| {
                GateError::config(ConfigError::InvalidBaseUrl {
                    url: raw.to_owned(),
                    source,
                })
            })?),
            None => None,
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|source| GateError::config(ConfigError::BuildClientFailed { source }))?;

        Ok(Self {
            client,
            config,
            base_url,
            aborts: AbortRegistry::new(),
            queue: RequestSerializer::new(),
        })
    }

    /// The registry holding cancellation tokens for in-flight requests.
    #[must_use]
    pub fn aborts(&self) -> &AbortRegistry {
        &self.aborts
    }

    /// The serializer gating same-URL requests.
    #[must_use]
    pub fn serializer(&self) -> &RequestSerializer {
        &self.queue
    }

    /// Opts `url` into serialized delivery: subsequent requests for it are
    /// routed through the queue.
    pub fn serialize_url(&self, url: &str) {
        self.queue.register(url);
    }

    /// Sends `config` and returns the raw response.
    ///
    /// Dispatch registers the request under its method+URL key, canceling a
    /// live duplicate, and routes it through the serializer when its URL is
    /// registered there. Completion, success or failure, unregisters the
    /// key and releases the next parked request for the URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is invalid, the request is superseded
    /// by an identical one, the serializer wait exceeds the configured
    /// queue timeout, the transport fails, or the server answers with a
    /// non-success status.
    pub async fn request(&self, config: RequestConfig) -> GateResult<reqwest::Response> {
        let mut config = config;
        let key = RequestKey::new(&config.method, &config.url);
        let url = config.url.clone();
        self.aborts.create(&key, &mut config);

        let config = if self.queue.is_registered(&url) {
            let parked = self.queue.add_request(&url, config);
            match self.config.queue_timeout {
                Some(limit) => match tokio::time::timeout(limit, parked).await {
                    Ok(released) => released,
                    Err(_) => {
                        self.aborts.remove(&key);
                        warn!(url = %url, ?limit, "parked request timed out");
                        return Err(GateError::client(ClientError::QueueTimeout {
                            url,
                            waited: limit,
                        }));
                    }
                },
                None => parked.await,
            }
        } else {
            config
        };

        let result = self.dispatch(&config, &key).await;

        // Completion bookkeeping runs for success and failure alike.
        self.aborts.remove(&key);
        self.queue.next(&url);

        result
    }

    /// Sends `config` and deserializes the JSON response body.
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request), plus a decode error when the
    /// body is not valid JSON for `T`.
    pub async fn request_json<T: DeserializeOwned>(&self, config: RequestConfig) -> GateResult<T> {
        let response = self.request(config).await?;
        response
            .json()
            .await
            .map_err(|source| GateError::client(ClientError::DecodeBody { source }))
    }

    /// GET `url` and deserialize the JSON response body.
    ///
    /// # Errors
    ///
    /// Same as [`request_json`](Self::request_json).
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> GateResult<T> {
        self.request_json(RequestConfig::get(url)).await
    }

    /// POST `body` to `url` and deserialize the JSON response body.
    ///
    /// # Errors
    ///
    /// Same as [`request_json`](Self::request_json).
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> GateResult<T> {
        self.request_json(RequestConfig::post(url, body)).await
    }

    async fn dispatch(
        &self,
        config: &RequestConfig,
        key: &RequestKey,
    ) -> GateResult<reqwest::Response> {
        let token = config.cancel.clone().unwrap_or_default();
        if token.is_cancelled() {
            // Superseded while parked in the serializer; skip the transport.
            return Err(superseded(key));
        }

        let request = self.build_request(config)?;
        let response = tokio::select! {
            () = token.cancelled() => {
                debug!(key = %key, "request canceled by a newer duplicate");
                return Err(superseded(key));
            }
            result = self.client.execute(request) => {
                result.map_err(|source| GateError::client(ClientError::Transport { source }))?
            }
        };

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            warn!(%status, url = %config.url, "request failed");
            Err(GateError::client(ClientError::Status {
                status,
                message: status_message(status),
            }))
        }
    }

    fn build_request(&self, config: &RequestConfig) -> GateResult<reqwest::Request> {
        let target = self.resolve_url(&config.url)?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.config.default_headers {
            insert_header(&mut headers, name, value)?;
        }
        if config.with_token {
            if let Some(token) = self.config.token.as_deref() {
                let bearer =
                    HeaderValue::from_str(&format!("Bearer {token}")).map_err(|source| {
                        GateError::config(ConfigError::InvalidHeaderValue {
                            name: AUTHORIZATION.as_str().to_owned(),
                            source,
                        })
                    })?;
                headers.insert(AUTHORIZATION, bearer);
            }
        }
        if config.with_client_id {
            if let Some(id) = self.config.client_id.as_deref() {
                insert_header(&mut headers, CLIENT_ID_HEADER, id)?;
            }
        }
        for (name, value) in &config.headers {
            insert_header(&mut headers, name, value)?;
        }

        let mut builder = self
            .client
            .request(config.method.clone(), target)
            .headers(headers);
        if !config.query.is_empty() {
            builder = builder.query(&config.query);
        }
        if let Some(body) = &config.body {
            builder = builder.json(body);
        }
        builder
            .build()
            .map_err(|source| GateError::client(ClientError::BuildRequestFailed { source }))
    }

    fn resolve_url(&self, raw: &str) -> GateResult<Url> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(raw).map_err(|source| {
                    GateError::client(ClientError::InvalidUrl {
                        url: raw.to_owned(),
                        source,
                    })
                }),
                None => Err(GateError::client(ClientError::InvalidUrl {
                    url: raw.to_owned(),
                    source: url::ParseError::RelativeUrlWithoutBase,
                })),
            },
            Err(source) => Err(GateError::client(ClientError::InvalidUrl {
                url: raw.to_owned(),
                source,
            })),
        }
    }
}

fn superseded(key: &RequestKey) -> GateError {
    GateError::client(ClientError::Superseded {
        key: key.to_string(),
    })
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> GateResult<()> {
    let parsed_name = HeaderName::from_bytes(name.as_bytes()).map_err(|source| {
        GateError::config(ConfigError::InvalidHeaderName {
            name: name.to_owned(),
            source,
        })
    })?;
    let parsed_value = HeaderValue::from_str(value).map_err(|source| {
        GateError::config(ConfigError::InvalidHeaderValue {
            name: name.to_owned(),
            source,
        })
    })?;
    headers.insert(parsed_name, parsed_value);
    Ok(())
}
