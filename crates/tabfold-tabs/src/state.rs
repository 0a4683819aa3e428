//! Controller state machine
//!
//! ```text
//! Absent --(predicate true)--> Created
//! Created --(predicate false | disabled)--> Absent
//! ```
//!
//! While `Created`, exactly one tab is active; the active tab itself moves
//! freely between the configured ids.

use serde::{Deserialize, Serialize};

use crate::chrome::Chrome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// No tab chrome in the document
    Absent,
    /// Buttons and containers exist and content has been moved
    Created,
}

/// What a recheck decided to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Create,
    Remove,
    Keep,
}

impl Presence {
    /// Compare the wanted state against the current one.
    pub fn reconcile(&self, wanted: bool) -> Transition {
        match (self, wanted) {
            (Presence::Absent, true) => Transition::Create,
            (Presence::Created, false) => Transition::Remove,
            _ => Transition::Keep,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Presence::Created)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Absent => "absent",
            Presence::Created => "created",
        }
    }
}

impl std::fmt::Display for Presence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutable state owned by one controller.
pub(crate) struct ControllerState {
    /// Always one of the configured tab ids
    pub(crate) active_tab: String,
    pub(crate) presence: Presence,
    /// When false, rechecks do nothing
    pub(crate) enabled: bool,
    /// Nodes this controller generated and moved; `None` while absent
    pub(crate) chrome: Option<Chrome>,
}

impl ControllerState {
    pub(crate) fn new(default_tab: &str) -> Self {
        Self {
            active_tab: default_tab.to_string(),
            presence: Presence::Absent,
            enabled: true,
            chrome: None,
        }
    }
}
