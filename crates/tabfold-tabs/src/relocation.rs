//! Relocatable-unit policy
//!
//! A content selector usually hits a node deep inside a block the user sees
//! as one piece (an input inside its labelled settings block). Moving just
//! the input would tear the block apart, so each match is promoted to the
//! nearest ancestor-or-self matching the first applicable rule.

use serde::{Deserialize, Serialize};
use tabfold_dom::{Document, NodeId, Query};

use crate::error::TabError;
use crate::Result;

/// Grouped settings block, then any named ancestor.
const DEFAULT_UNIT_SELECTORS: &[&str] = &[".range-block", "[name]"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationPolicy {
    /// Tried in order; the first one with a match wins.
    pub unit_selectors: Vec<String>,
}

impl RelocationPolicy {
    /// Always move the matched node itself.
    pub fn node_only() -> Self {
        Self {
            unit_selectors: Vec::new(),
        }
    }

    pub(crate) fn compile(&self) -> Result<CompiledPolicy> {
        let rules = self
            .unit_selectors
            .iter()
            .map(|s| {
                Query::parse(s).map_err(|source| TabError::Selector {
                    context: "relocation policy".to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CompiledPolicy { rules })
    }
}

impl Default for RelocationPolicy {
    fn default() -> Self {
        Self {
            unit_selectors: DEFAULT_UNIT_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledPolicy {
    rules: Vec<Query>,
}

impl CompiledPolicy {
    /// The node actually moved when `matched` is selected.
    pub(crate) fn unit_for(&self, doc: &Document, matched: NodeId) -> NodeId {
        self.rules
            .iter()
            .find_map(|rule| doc.closest(matched, rule))
            .unwrap_or(matched)
    }
}
