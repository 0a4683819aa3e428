//! Host state container
//!
//! Owns the preference database and the live document; every tab set is
//! attached through here so they all persist to the same place.

use std::sync::Arc;
use tabfold_dom::{Document, SharedDocument};
use tabfold_storage::Database;
use tabfold_tabs::{
    PollHandle, PreferenceStore, TabConfig, TabConfigBuilder, TabController, TabSetSpec,
};

use crate::config::Config;
use crate::Result;

pub struct Host {
    config: Config,
    db: Database,
    document: SharedDocument,
}

impl Host {
    /// Open the database from `config` and take over `document`.
    pub fn new(config: Config, document: Document) -> Result<Self> {
        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;

        tracing::info!(path = %config.database_path.display(), "Host initialized");

        Ok(Self {
            config,
            db,
            document: document.into_shared(),
        })
    }

    /// Host whose preferences last only as long as the process.
    pub fn open_in_memory(document: Document) -> Result<Self> {
        Ok(Self {
            config: Config::default(),
            db: Database::open_in_memory()?,
            document: document.into_shared(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// Build a controller for `spec` on the host document. `configure`
    /// attaches the predicate and switch hook.
    pub fn attach(
        &self,
        spec: TabSetSpec,
        configure: impl FnOnce(TabConfigBuilder) -> TabConfigBuilder,
    ) -> Result<TabController> {
        let config = configure(TabConfig::builder(spec)).build()?;
        let preferences = PreferenceStore::for_config(&config, Arc::new(self.db.clone()));

        tracing::debug!(
            tab_prefix = %config.tab_prefix(),
            tabs = config.tab_ids().count(),
            "Attached tab set"
        );

        Ok(TabController::new(
            config,
            self.document.clone(),
            preferences,
        ))
    }

    /// Attach every tab set declared in the host config, without hooks.
    pub fn attach_configured(&self) -> Result<Vec<TabController>> {
        self.config
            .tab_sets
            .iter()
            .map(|spec| self.attach(spec.clone(), |builder| builder))
            .collect()
    }

    /// Start rechecking `controller`. Must run inside a `LocalSet`.
    pub fn start(&self, controller: &TabController) -> PollHandle {
        controller.start_polling()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;
    use tabfold_dom::Query;
    use tabfold_tabs::TabDefinition;
    use tempfile::tempdir;

    const PAGE: &str = r#"<div id="mount"><div id="anchor"></div><p id="x">x</p></div>"#;

    fn spec() -> TabSetSpec {
        let mut spec = TabSetSpec::new(
            "#mount",
            "#anchor",
            vec![
                TabDefinition::new("a", "A").with_content("#x"),
                TabDefinition::new("b", "B"),
            ],
        );
        spec.active_tab_storage_key = Some("host-tab".to_string());
        spec
    }

    #[test]
    fn test_attach_persists_to_database() {
        let host = Host::open_in_memory(Document::parse(PAGE)).unwrap();
        let controller = host.attach(spec(), |b| b).unwrap();

        assert!(controller.create());
        controller.switch_tab("b");
        assert_eq!(
            host.database().get_setting("host-tab").unwrap().as_deref(),
            Some("b")
        );

        controller.remove();
        let again = host.attach(spec(), |b| b).unwrap();
        assert!(again.create());
        assert_eq!(again.active_tab(), "b");
    }

    #[test]
    fn test_attach_rejects_invalid_spec() {
        let host = Host::open_in_memory(Document::parse(PAGE)).unwrap();
        let mut bad = spec();
        bad.tabs.clear();

        assert!(matches!(host.attach(bad, |b| b), Err(CoreError::Tab(_))));
    }

    #[test]
    fn test_new_creates_database_file() {
        let dir = tempdir().unwrap();
        let mut config = Config::new(dir.path().join("nested"));
        config.tab_sets.push(spec());

        let host = Host::new(config, Document::parse(PAGE)).unwrap();
        assert!(host.config().database_path.exists());

        let controllers = host.attach_configured().unwrap();
        assert_eq!(controllers.len(), 1);
        assert!(controllers[0].create());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_polls_predicate() {
        let host = Host::open_in_memory(Document::parse(PAGE)).unwrap();
        let wanted = Rc::new(Cell::new(true));
        let flag = Rc::clone(&wanted);
        let controller = host
            .attach(spec(), move |b| b.check_condition(move || flag.get()))
            .unwrap();

        tokio::task::LocalSet::new()
            .run_until(async {
                let _handle = host.start(&controller);
                tokio::time::sleep(Duration::from_millis(400)).await;
                assert!(controller.is_created());

                wanted.set(false);
                tokio::time::sleep(Duration::from_millis(2000)).await;
                assert!(!controller.is_created());
            })
            .await;

        let buttons = Query::parse("#tab-buttons").unwrap();
        assert!(host.document().borrow().query(&buttons).is_none());
    }
}
