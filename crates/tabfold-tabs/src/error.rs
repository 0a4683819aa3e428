//! Tab error types

use thiserror::Error;

/// Configuration problems. Runtime operations never fail; they degrade.
#[derive(Error, Debug)]
pub enum TabError {
    #[error("At least one tab must be declared")]
    NoTabs,

    #[error("Duplicate tab id: {0}")]
    DuplicateTab(String),

    #[error("Invalid tab id: {0:?}")]
    InvalidTabId(String),

    #[error("Invalid {field}: {value:?}")]
    InvalidName { field: &'static str, value: String },

    #[error("Default tab is not declared: {0}")]
    UnknownDefaultTab(String),

    #[error("Invalid selector in {context}: {source}")]
    Selector {
        context: String,
        #[source]
        source: tabfold_dom::DomError,
    },

    #[error("Invalid tab set declaration: {0}")]
    Declaration(#[from] serde_json::Error),
}
