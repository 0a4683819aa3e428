//! Document error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Invalid selector: {0:?}")]
    InvalidSelector(String),

    #[error("Node does not exist in this document")]
    UnknownNode,

    #[error("Node is not attached to a parent")]
    Detached,
}
