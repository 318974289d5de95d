//! Local data store for the Questly quest tracker.
//!
//! Stands in for a remote backend: a single [`AppData`] document held in
//! memory behind a shared lock, optionally mirrored to a JSON file.
//!
//! # Modules
//!
//! - [`error`] -- [`StoreError`].
//! - [`seed`] -- Contents of a brand-new store.
//! - [`store`] -- [`MockStore`], the cloneable store handle.
//!
//! [`AppData`]: questly_types::AppData

pub mod error;
pub mod seed;
pub mod store;

pub use error::StoreError;
pub use store::MockStore;
