//! couchseed core library — design document model, desired-set loading,
//! configuration, errors.
//!
//! - [`types`] — [`DesignDocument`] and its parts
//! - [`desired`] — load and validate the application's desired set
//! - [`config`] — `~/.couchseed/config.yaml`
//! - [`error`] — [`ConfigError`], [`DesiredError`]

pub mod config;
pub mod desired;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, DesiredError};
pub use types::{DesignDocument, DocumentMeta, View, DESIGN_PREFIX};
