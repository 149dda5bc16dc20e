//! # couchseed-http
//!
//! Blocking [`DesignStore`](couchseed_sync::DesignStore) over the server's
//! HTTP API, built on `ureq`.
//!
//! ```no_run
//! use couchseed_core::{DesignDocument, View};
//! use couchseed_http::Client;
//!
//! # fn main() -> Result<(), couchseed_http::HttpError> {
//! let db = Client::new("http://127.0.0.1:5984")?.database("game");
//! let desired = vec![DesignDocument::new("player").with_view("byName", View::map("function(doc){}"))];
//! couchseed_sync::seed(&db, &desired)?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod error;

pub use client::{Client, Database};
pub use error::{CouchError, HttpError};
