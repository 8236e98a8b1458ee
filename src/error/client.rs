use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request '{key}' was superseded by a newer identical request.")]
    Superseded { key: String },
    #[error("Request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("Server returned {status}: {message}")]
    Status {
        status: StatusCode,
        message: &'static str,
    },
    #[error("Request for '{url}' was not released within {waited:?}.")]
    QueueTimeout { url: String, waited: Duration },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to build request: {source}")]
    BuildRequestFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to decode response body: {source}")]
    DecodeBody {
        #[source]
        source: reqwest::Error,
    },
}
