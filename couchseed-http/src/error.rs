//! Error types for couchseed-http.

use serde::Deserialize;
use thiserror::Error;

/// A non-2xx response from the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} {url} returned {status}: {error} ({reason})")]
pub struct CouchError {
    pub method: String,
    pub url: String,
    pub status: u16,
    /// Server error tag, e.g. `not_found` or `conflict`.
    pub error: String,
    pub reason: String,
}

impl CouchError {
    /// Stale or missing revision on a write.
    pub fn is_conflict(&self) -> bool {
        self.status == 409
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub(crate) fn from_response(
        method: &str,
        url: &str,
        status: u16,
        response: ureq::Response,
    ) -> Self {
        let body: ErrorBody = response
            .into_string()
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self {
            method: method.to_string(),
            url: url.to_string(),
            status,
            error: body.error,
            reason: body.reason,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    reason: String,
}

/// All errors that can arise from talking to the server.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error(transparent)]
    Couch(#[from] CouchError),

    /// Connection, DNS, TLS or timeout failure; no response was received.
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    /// A 2xx response whose body was not the expected JSON.
    #[error("failed to decode response of {method} {url}: {source}")]
    Decode {
        method: String,
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid server URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("server URL '{url}' cannot hold a path")]
    NotABase { url: String },
}

impl HttpError {
    /// The server answered with a status code, as opposed to a transport
    /// or decode failure.
    pub fn as_couch(&self) -> Option<&CouchError> {
        match self {
            HttpError::Couch(err) => Some(err),
            _ => None,
        }
    }
}
