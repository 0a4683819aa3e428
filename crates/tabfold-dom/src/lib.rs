//! tabfold document model
//!
//! A live, mutable HTML tree. Nodes are addressed by stable [`NodeId`]s that
//! survive moves, so a node relocated somewhere else is still the same node.
//! Queries use CSS selectors and only ever see nodes attached to the tree.

mod document;
mod error;
mod markup;
mod query;

use std::cell::RefCell;
use std::rc::Rc;

pub use document::Document;
pub use ego_tree::NodeId;
pub use error::DomError;
pub use markup::escape_html;
pub use query::Query;

pub type Result<T> = std::result::Result<T, DomError>;

/// The document as shared by everything running on the UI thread.
pub type SharedDocument = Rc<RefCell<Document>>;
