//! Tab declarations

use serde::{Deserialize, Serialize};

use crate::error::TabError;
use crate::Result;

/// One declared tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDefinition {
    /// Unique key; also used in generated element ids
    pub id: String,
    /// Button text
    pub label: String,
    /// Glyph reference, rendered as the class list of an `<i>` element
    #[serde(default)]
    pub icon: String,
    /// Existing nodes to move into this tab. Empty means the owner fills the
    /// tab itself once it becomes active.
    #[serde(default)]
    pub content_selectors: Vec<String>,
}

impl TabDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: String::new(),
            content_selectors: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_content(mut self, selector: impl Into<String>) -> Self {
        self.content_selectors.push(selector.into());
        self
    }

    /// Ids are embedded in generated element ids: ASCII alphanumerics, `-`
    /// and `_` only.
    pub(crate) fn validate(&self) -> Result<()> {
        let valid = !self.id.is_empty()
            && self
                .id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(())
        } else {
            Err(TabError::InvalidTabId(self.id.clone()))
        }
    }
}
