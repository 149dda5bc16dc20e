//! # couchseed-sync
//!
//! Design document reconciliation.
//!
//! [`diff`] computes additions, changes and deletions between a desired set
//! and the set a database currently holds. [`seed`] fetches the current set
//! through a [`DesignStore`] and applies the difference; [`plan`] stops after
//! the diff.

pub mod diff;
pub mod memory;
pub mod seed;
pub mod store;

pub use diff::{diff, render_change, Difference};
pub use memory::{MemoryStore, MemoryStoreError, StoreOp};
pub use seed::{plan, seed, SeedReport};
pub use store::DesignStore;
