//! tabfold tab controller
//!
//! Splits a region of an existing document into named tabs: injects tab
//! buttons after an anchor node, moves the declared content into one
//! container per tab, remembers the active tab, and puts everything back on
//! teardown. Whether the tabs exist at all is decided by polling a
//! caller-supplied predicate.

mod chrome;
mod config;
mod controller;
mod definition;
mod error;
mod lifecycle;
mod preferences;
mod relocation;
mod state;
mod switcher;

pub use config::{PollSchedule, TabConfig, TabConfigBuilder, TabSetSpec};
pub use controller::TabController;
pub use definition::TabDefinition;
pub use error::TabError;
pub use lifecycle::PollHandle;
pub use preferences::{MemorySettings, PreferenceStore, SettingsBackend};
pub use relocation::RelocationPolicy;
pub use state::{Presence, Transition};

pub type Result<T> = std::result::Result<T, TabError>;
