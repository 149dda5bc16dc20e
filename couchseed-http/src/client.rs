use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use ureq::{Agent, AgentBuilder, Response};
use url::Url;

use couchseed_core::{config::DEFAULT_TIMEOUT_SECS, DesignDocument, DESIGN_PREFIX};
use couchseed_sync::DesignStore;

use crate::error::{CouchError, HttpError};

// Key range covering every id in the `_design/` namespace.
const DESIGN_START_KEY: &str = "\"_design/\"";
const DESIGN_END_KEY: &str = "\"_design0\"";

/// Connection to one server. Cheap to clone; clones share the agent's
/// connection pool.
#[derive(Clone)]
pub struct Client {
    base: Url,
    agent: Agent,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base", &self.base.as_str())
            .finish()
    }
}

impl Client {
    pub fn new(server: &str) -> Result<Self, HttpError> {
        Self::with_timeout(server, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// `timeout` bounds each whole request, connect included.
    pub fn with_timeout(server: &str, timeout: Duration) -> Result<Self, HttpError> {
        let base = Url::parse(server).map_err(|source| HttpError::InvalidUrl {
            url: server.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(HttpError::NotABase {
                url: server.to_string(),
            });
        }
        let agent = AgentBuilder::new().timeout(timeout).build();
        Ok(Self { base, agent })
    }

    /// Handle on database `name`. No request is made.
    pub fn database(&self, name: &str) -> Database {
        Database {
            client: self.clone(),
            name: name.to_string(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, HttpError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| HttpError::NotABase {
                url: self.base.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(
        &self,
        method: &str,
        url: &Url,
        body: Option<&DesignDocument>,
    ) -> Result<Response, HttpError> {
        tracing::debug!("{method} {url}");
        let request = self.agent.request_url(method, url);
        let result = match body {
            Some(doc) => request.send_json(doc),
            None => request.call(),
        };
        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => Err(CouchError::from_response(
                method,
                url.as_str(),
                status,
                response,
            )
            .into()),
            Err(ureq::Error::Transport(transport)) => Err(HttpError::Transport {
                method: method.to_string(),
                url: url.to_string(),
                source: Box::new(transport),
            }),
        }
    }

    fn send_for<T>(
        &self,
        method: &str,
        url: &Url,
        body: Option<&DesignDocument>,
    ) -> Result<T, HttpError>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.send(method, url, body)?
            .into_json()
            .map_err(|source| HttpError::Decode {
                method: method.to_string(),
                url: url.to_string(),
                source,
            })
    }
}

/// One database on a [`Client`]'s server.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    name: String,
}

impl Database {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL of document `id`. Design document ids keep their `/` so the
    /// server routes them to the design namespace.
    fn doc_url(&self, id: &str) -> Result<Url, HttpError> {
        match id.strip_prefix(DESIGN_PREFIX) {
            Some(name) => self.client.url(&[&self.name, "_design", name]),
            None => self.client.url(&[&self.name, id]),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AllDocsResponse {
    #[serde(default)]
    rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
struct AllDocsRow {
    #[serde(default)]
    doc: Option<DesignDocument>,
}

#[derive(Debug, Deserialize)]
struct DocumentResponse {
    #[serde(default)]
    rev: String,
}

impl DesignStore for Database {
    type Error = HttpError;

    fn all_design_docs(&self) -> Result<Vec<DesignDocument>, Self::Error> {
        let mut url = self.client.url(&[&self.name, "_all_docs"])?;
        url.query_pairs_mut()
            .append_pair("startkey", DESIGN_START_KEY)
            .append_pair("endkey", DESIGN_END_KEY)
            .append_pair("include_docs", "true");
        let response: AllDocsResponse = self.client.send_for("GET", &url, None)?;
        Ok(response.rows.into_iter().filter_map(|row| row.doc).collect())
    }

    fn get_design_doc(&self, id: &str) -> Result<DesignDocument, Self::Error> {
        let url = self.doc_url(id)?;
        self.client.send_for("GET", &url, None)
    }

    fn delete_doc(&self, id: &str, rev: &str) -> Result<(), Self::Error> {
        let mut url = self.doc_url(id)?;
        url.query_pairs_mut().append_pair("rev", rev);
        self.client.send("DELETE", &url, None)?;
        Ok(())
    }

    fn put_design_doc(&self, doc: &DesignDocument) -> Result<String, Self::Error> {
        let url = self.doc_url(doc.id())?;
        let response: DocumentResponse = self.client.send_for("PUT", &url, Some(doc))?;
        Ok(response.rev)
    }
}
