//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] tabfold_storage::StorageError),

    #[error("Tab error: {0}")]
    Tab(#[from] tabfold_tabs::TabError),

    #[error("Document error: {0}")]
    Dom(#[from] tabfold_dom::DomError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chat source error: {0}")]
    ChatSource(String),
}
