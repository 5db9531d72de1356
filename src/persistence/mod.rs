//! Persistence layer: JSON document stores for events and accounts.
//!
//! Each registry owns one [`json_store::JsonStore`] over its own file. The
//! two files are independent documents with no shared lock or transaction
//! boundary; cross-store consistency is the registration coordinator's
//! problem, not the storage layer's.

pub mod json_store;

pub use json_store::JsonStore;
