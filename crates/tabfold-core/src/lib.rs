//! tabfold Core
//!
//! Host-side wiring: owns the database and the live document, attaches tab
//! controllers to them and ships the character-profile tab set.

mod config;
mod error;
mod host;
mod profile;

pub use config::Config;
pub use error::CoreError;
pub use host::Host;
pub use profile::{character_profile_spec, CharacterContext, ChatSource, ChatSummary, ProfileTabs};

// Re-export the building blocks
pub use tabfold_dom::{escape_html, Document, DomError, NodeId, Query, SharedDocument};
pub use tabfold_storage::{Database, StorageError};
pub use tabfold_tabs::{
    MemorySettings, PollHandle, PollSchedule, PreferenceStore, Presence, RelocationPolicy,
    SettingsBackend, TabConfig, TabConfigBuilder, TabController, TabDefinition, TabError,
    TabSetSpec, Transition,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
