//! tabfold storage layer
//!
//! SQLite-backed key/value settings. The tab controller persists its
//! last-active tab here; anything else that must survive a reload can too.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
