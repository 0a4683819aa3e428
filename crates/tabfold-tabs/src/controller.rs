//! Tab controller
//!
//! Owns the state machine and is the only writer of the chrome it creates.
//! Everything runs on the UI thread; the activation predicate and the
//! switch hook are always called with no internal borrow held, so both may
//! call back into the controller or edit the document.

use std::cell::RefCell;
use std::rc::Rc;
use tabfold_dom::{NodeId, SharedDocument};

use crate::chrome;
use crate::config::TabConfig;
use crate::preferences::PreferenceStore;
use crate::state::{ControllerState, Presence, Transition};
use crate::switcher;

pub(crate) struct Inner {
    config: TabConfig,
    document: SharedDocument,
    preferences: PreferenceStore,
    state: RefCell<ControllerState>,
}

/// Handle to one tab group. Clones share the same controller.
#[derive(Clone)]
pub struct TabController {
    pub(crate) inner: Rc<Inner>,
}

impl TabController {
    pub fn new(config: TabConfig, document: SharedDocument, preferences: PreferenceStore) -> Self {
        let state = ControllerState::new(config.default_tab());

        Self {
            inner: Rc::new(Inner {
                config,
                document,
                preferences,
                state: RefCell::new(state),
            }),
        }
    }

    pub fn config(&self) -> &TabConfig {
        &self.inner.config
    }

    pub fn document(&self) -> &SharedDocument {
        &self.inner.document
    }

    pub fn active_tab(&self) -> String {
        self.inner.state.borrow().active_tab.clone()
    }

    pub fn presence(&self) -> Presence {
        self.inner.state.borrow().presence
    }

    pub fn is_created(&self) -> bool {
        self.presence().is_created()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.state.borrow().enabled
    }

    /// Generated button of `tab_id`, while the tabs exist.
    pub fn button_node(&self, tab_id: &str) -> Option<NodeId> {
        self.inner.state.borrow().chrome.as_ref()?.button(tab_id)
    }

    /// Generated container of `tab_id`, while the tabs exist. Owners render
    /// dynamic tab content into it.
    pub fn container_node(&self, tab_id: &str) -> Option<NodeId> {
        self.inner.state.borrow().chrome.as_ref()?.container(tab_id)
    }

    // === Lifecycle ===

    /// Disabling removes the tabs right away and makes rechecks inert;
    /// enabling rechecks immediately.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.state.borrow_mut().enabled = enabled;
        tracing::debug!(enabled, "Tab controller toggled");

        if enabled {
            self.refresh();
        } else if self.is_created() {
            self.remove();
        }
    }

    /// Evaluate the activation predicate now and create or remove the tabs
    /// to match. Returns what actually happened.
    pub fn refresh(&self) -> Transition {
        if !self.is_enabled() {
            return Transition::Keep;
        }

        let wanted = self.inner.config.should_show();

        // The predicate may have disabled us.
        if !self.is_enabled() {
            return Transition::Keep;
        }

        match self.presence().reconcile(wanted) {
            Transition::Create if self.create() => Transition::Create,
            Transition::Remove => {
                self.remove();
                Transition::Remove
            }
            _ => Transition::Keep,
        }
    }

    // === Content reorganizer ===

    /// Build the chrome, move content in and select the initial tab.
    /// Returns false when nothing was done: the tabs already exist or the
    /// anchor is missing.
    pub fn create(&self) -> bool {
        let initial = {
            let mut state = self.inner.state.borrow_mut();
            if state.chrome.is_some() {
                return false;
            }

            let built = {
                let mut doc = self.inner.document.borrow_mut();
                chrome::build(&mut doc, &self.inner.config)
            };
            let Some(built) = built else {
                return false;
            };
            state.chrome = Some(built);

            let initial = self.initial_tab();
            self.apply_switch(&mut state, &initial);
            state.presence = Presence::Created;
            initial
        };

        self.notify(&initial);
        true
    }

    /// Delete the chrome and return every relocated node to the mount
    /// container. Safe to call in any state.
    pub fn remove(&self) {
        let mut state = self.inner.state.borrow_mut();
        let built = state.chrome.take();

        {
            let mut doc = self.inner.document.borrow_mut();
            chrome::teardown(&mut doc, &self.inner.config, built.as_ref());
        }

        state.presence = Presence::Absent;
    }

    // === Tab switcher ===

    /// Activate `tab_id`. Unknown ids are ignored; re-selecting the active
    /// tab is a full switch (markers, scroll, persistence and hook).
    pub fn switch_tab(&self, tab_id: &str) -> bool {
        if !self.inner.config.has_tab(tab_id) {
            tracing::debug!(tab_id = %tab_id, "Ignoring switch to unknown tab");
            return false;
        }

        {
            let mut state = self.inner.state.borrow_mut();
            self.apply_switch(&mut state, tab_id);
        }

        self.notify(tab_id);
        true
    }

    /// Click on `target`: switches when it is (inside) one of our buttons.
    pub fn click(&self, target: NodeId) -> bool {
        let tab_id = {
            let state = self.inner.state.borrow();
            let doc = self.inner.document.borrow();
            state
                .chrome
                .as_ref()
                .and_then(|c| c.tab_at(&doc, target))
                .map(str::to_string)
        };

        match tab_id {
            Some(tab_id) => self.switch_tab(&tab_id),
            None => false,
        }
    }

    /// Persisted tab when it is still declared, otherwise the default.
    fn initial_tab(&self) -> String {
        let config = &self.inner.config;
        match self.inner.preferences.load() {
            Some(saved) if config.has_tab(&saved) => saved,
            Some(saved) => {
                tracing::debug!(saved = %saved, "Saved tab no longer declared, using default");
                config.default_tab().to_string()
            }
            None => config.default_tab().to_string(),
        }
    }

    fn apply_switch(&self, state: &mut ControllerState, tab_id: &str) {
        {
            let mut doc = self.inner.document.borrow_mut();
            if let Some(built) = state.chrome.as_ref() {
                switcher::mark_active(&mut doc, built, tab_id);
            }
            switcher::reset_scroll(&mut doc, self.inner.config.scroll_containers());
        }

        state.active_tab = tab_id.to_string();
        self.inner.preferences.save(tab_id);

        tracing::debug!(tab_id = %tab_id, "Switched tab");
    }

    fn notify(&self, tab_id: &str) {
        if let Some(hook) = self.inner.config.switch_hook() {
            hook(tab_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TabSetSpec;
    use crate::definition::TabDefinition;
    use crate::preferences::tests::UnavailableSettings;
    use crate::preferences::MemorySettings;
    use crate::TabConfigBuilder;
    use std::cell::{Cell, RefCell};
    use std::sync::Arc;
    use tabfold_dom::{Document, Query};

    const PAGE: &str = r#"<html><body>
        <div id="left-nav-panel"><div class="scrollableInner">
            <div id="mount">
                <div id="anchor">anchor</div>
                <p id="x">x</p>
                <div class="range-block"><input id="size" name="size"></div>
            </div>
        </div></div>
    </body></html>"#;

    const KEY: &str = "active-tab";

    fn spec() -> TabSetSpec {
        let mut spec = TabSetSpec::new(
            "#mount",
            "#anchor",
            vec![
                TabDefinition::new("a", "A").with_content("#x"),
                TabDefinition::new("b", "B"),
            ],
        );
        spec.active_tab_storage_key = Some(KEY.to_string());
        spec.default_tab = Some("a".to_string());
        spec
    }

    struct Fixture {
        controller: TabController,
        settings: Arc<MemorySettings>,
        switches: Rc<RefCell<Vec<String>>>,
    }

    fn fixture_with(build: impl FnOnce(TabConfigBuilder) -> TabConfigBuilder) -> Fixture {
        let switches = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&switches);
        let builder = TabConfig::builder(spec())
            .on_tab_switch(move |id| seen.borrow_mut().push(id.to_string()));
        let config = build(builder).build().unwrap();

        let settings = Arc::new(MemorySettings::new());
        let preferences = PreferenceStore::for_config(&config, settings.clone());
        let document = Document::parse(PAGE).into_shared();

        Fixture {
            controller: TabController::new(config, document, preferences),
            settings,
            switches,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(|b| b)
    }

    fn node(controller: &TabController, id: &str) -> Option<NodeId> {
        controller.document().borrow().find_by_id(id)
    }

    fn count(controller: &TabController, selector: &str) -> usize {
        controller
            .document()
            .borrow()
            .query_all(&Query::parse(selector).unwrap())
            .len()
    }

    fn has_active(controller: &TabController, id: &str) -> bool {
        let doc = controller.document().borrow();
        doc.find_by_id(id)
            .map(|n| doc.has_class(n, "active"))
            .unwrap_or(false)
    }

    fn saved(f: &Fixture) -> Option<String> {
        crate::SettingsBackend::read(f.settings.as_ref(), KEY).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let f = fixture();
        assert_eq!(f.controller.active_tab(), "a");
        assert!(!f.controller.is_created());
        assert!(f.controller.is_enabled());
        assert!(f.controller.container_node("a").is_none());
    }

    #[test]
    fn test_example_scenario() {
        let f = fixture();
        let c = &f.controller;
        let x = node(c, "x").unwrap();

        assert!(c.create());
        assert!(c.is_created());
        assert_eq!(c.active_tab(), "a");
        assert_eq!(node(c, "x"), Some(x));
        assert_eq!(c.document().borrow().parent(x), c.container_node("a"));
        assert!(has_active(c, "tab-btn-a"));
        assert!(has_active(c, "tab-content-a"));
        let b = c.container_node("b").unwrap();
        assert!(c.document().borrow().children(b).is_empty());

        assert!(c.switch_tab("b"));
        assert_eq!(c.active_tab(), "b");
        assert!(has_active(c, "tab-btn-b"));
        assert!(has_active(c, "tab-content-b"));
        assert!(!has_active(c, "tab-content-a"));
        assert_eq!(c.document().borrow().parent(x), c.container_node("a"));
        assert!(c.document().borrow().is_attached(x));
        assert_eq!(saved(&f).as_deref(), Some("b"));

        c.remove();
        assert!(!c.is_created());
        assert_eq!(c.document().borrow().parent(x), node(c, "mount"));
        assert_eq!(count(c, ".generic-tab-buttons"), 0);
        assert_eq!(count(c, ".generic-tab-button"), 0);
        assert_eq!(count(c, ".generic-tab-content"), 0);
    }

    #[test]
    fn test_create_is_idempotent() {
        let f = fixture();
        let c = &f.controller;

        assert!(c.create());
        let markup = c.document().borrow().html();
        assert!(!c.create());

        assert_eq!(c.document().borrow().html(), markup);
        assert_eq!(count(c, ".generic-tab-buttons"), 1);
        assert_eq!(count(c, ".generic-tab-content"), 2);
        assert_eq!(f.switches.borrow().len(), 1);
    }

    #[test]
    fn test_round_trip_restores_every_node_once() {
        let f = fixture_with(|b| b);
        let c = &f.controller;
        let x = node(c, "x").unwrap();
        let size = node(c, "size").unwrap();

        for _ in 0..3 {
            assert!(c.create());
            c.remove();
        }

        let mount = node(c, "mount").unwrap();
        let doc = c.document().borrow();
        assert_eq!(doc.parent(x), Some(mount));
        assert!(doc.contains(mount, size));
        assert_eq!(doc.query_all(&Query::parse("#x").unwrap()), vec![x]);
        assert_eq!(doc.query_all(&Query::parse(".range-block").unwrap()).len(), 1);
    }

    #[test]
    fn test_switch_is_exclusive() {
        let f = fixture();
        let c = &f.controller;
        c.create();

        for tab in ["b", "a", "a", "b"] {
            assert!(c.switch_tab(tab));
            assert_eq!(count(c, ".generic-tab-button.active"), 1);
            assert_eq!(count(c, ".generic-tab-content.active"), 1);
            assert!(has_active(c, &format!("tab-btn-{}", tab)));
            assert!(has_active(c, &format!("tab-content-{}", tab)));
        }
    }

    #[test]
    fn test_invalid_switch_is_noop() {
        let f = fixture();
        let c = &f.controller;
        c.create();
        c.switch_tab("b");
        let calls = f.switches.borrow().len();

        assert!(!c.switch_tab("nope"));
        assert_eq!(c.active_tab(), "b");
        assert!(has_active(c, "tab-btn-b"));
        assert_eq!(saved(&f).as_deref(), Some("b"));
        assert_eq!(f.switches.borrow().len(), calls);
    }

    #[test]
    fn test_restores_saved_tab() {
        let f = fixture();
        crate::SettingsBackend::write(f.settings.as_ref(), KEY, "b").unwrap();

        f.controller.create();
        assert_eq!(f.controller.active_tab(), "b");
        assert!(has_active(&f.controller, "tab-content-b"));
        assert_eq!(*f.switches.borrow(), vec!["b".to_string()]);
    }

    #[test]
    fn test_stale_saved_tab_falls_back_to_default() {
        let f = fixture();
        crate::SettingsBackend::write(f.settings.as_ref(), KEY, "removed-tab").unwrap();

        f.controller.create();
        assert_eq!(f.controller.active_tab(), "a");
        assert_eq!(saved(&f).as_deref(), Some("a"));
    }

    #[test]
    fn test_unavailable_storage_still_switches() {
        let config = TabConfig::builder(spec()).build().unwrap();
        let preferences = PreferenceStore::for_config(&config, Arc::new(UnavailableSettings));
        let controller =
            TabController::new(config, Document::parse(PAGE).into_shared(), preferences);

        assert!(controller.create());
        assert!(controller.switch_tab("b"));
        assert_eq!(controller.active_tab(), "b");
        assert!(has_active(&controller, "tab-content-b"));
    }

    #[test]
    fn test_hook_sees_committed_state() {
        let observed = Rc::new(RefCell::new(Vec::new()));
        let slot: Rc<RefCell<Option<TabController>>> = Rc::new(RefCell::new(None));

        let log = Rc::clone(&observed);
        let handle = Rc::clone(&slot);
        let config = TabConfig::builder(spec())
            .on_tab_switch(move |id| {
                if let Some(c) = handle.borrow().as_ref() {
                    // Re-entering the controller from the hook must not panic.
                    log.borrow_mut()
                        .push((id.to_string(), c.active_tab(), c.is_created()));
                    if id == "b" {
                        let container = c.container_node("b").unwrap();
                        c.document()
                            .borrow_mut()
                            .set_inner_html(container, "<ul id=\"lazy\"></ul>")
                            .unwrap();
                    }
                }
            })
            .build()
            .unwrap();
        let controller = TabController::new(
            config,
            Document::parse(PAGE).into_shared(),
            PreferenceStore::disabled(),
        );
        *slot.borrow_mut() = Some(controller.clone());

        controller.create();
        controller.switch_tab("b");

        assert_eq!(
            *observed.borrow(),
            vec![
                ("a".to_string(), "a".to_string(), true),
                ("b".to_string(), "b".to_string(), true),
            ]
        );
        assert!(node(&controller, "lazy").is_some());

        controller.remove();
        let lazy = node(&controller, "lazy").unwrap();
        assert_eq!(
            controller.document().borrow().parent(lazy),
            node(&controller, "mount")
        );

        slot.borrow_mut().take();
    }

    #[test]
    fn test_click_switches() {
        let f = fixture();
        let c = &f.controller;
        c.create();

        let icon = c
            .document()
            .borrow()
            .query(&Query::parse("#tab-btn-b i").unwrap())
            .unwrap();
        assert!(c.click(icon));
        assert_eq!(c.active_tab(), "b");

        let x = node(c, "x").unwrap();
        assert!(!c.click(x));
        assert_eq!(c.active_tab(), "b");
    }

    #[test]
    fn test_click_after_remove_is_ignored() {
        let f = fixture();
        let c = &f.controller;
        c.create();
        let button = c.button_node("b").unwrap();
        c.remove();

        assert!(!c.click(button));
        assert_eq!(c.active_tab(), "a");
    }

    #[test]
    fn test_switch_resets_scroll() {
        let f = fixture();
        let c = &f.controller;
        c.create();

        let region = c
            .document()
            .borrow()
            .query(&Query::parse("#left-nav-panel .scrollableInner").unwrap())
            .unwrap();
        c.document().borrow_mut().set_scroll_top(region, 250);

        c.switch_tab("b");
        assert_eq!(c.document().borrow().scroll_top(region), 0);
    }

    #[test]
    fn test_refresh_follows_predicate() {
        let wanted = Rc::new(Cell::new(false));
        let flag = Rc::clone(&wanted);
        let f = fixture_with(move |b| b.check_condition(move || flag.get()));
        let c = &f.controller;

        assert_eq!(c.refresh(), Transition::Keep);
        assert!(!c.is_created());

        wanted.set(true);
        assert_eq!(c.refresh(), Transition::Create);
        assert_eq!(c.refresh(), Transition::Keep);
        assert!(c.is_created());

        wanted.set(false);
        assert_eq!(c.refresh(), Transition::Remove);
        assert!(!c.is_created());
        assert_eq!(count(c, ".generic-tab-buttons"), 0);
    }

    #[test]
    fn test_missing_anchor_keeps_absent() {
        let config = TabConfig::builder(spec()).build().unwrap();
        let document = Document::parse(r#"<div id="mount"><p id="x">x</p></div>"#).into_shared();
        let controller = TabController::new(config, document, PreferenceStore::disabled());

        assert_eq!(controller.refresh(), Transition::Keep);
        assert!(!controller.create());
        assert!(!controller.is_created());
        assert_eq!(count(&controller, ".generic-tab-buttons"), 0);
    }

    #[test]
    fn test_set_enabled() {
        let f = fixture();
        let c = &f.controller;
        assert_eq!(c.refresh(), Transition::Create);

        c.set_enabled(false);
        assert!(!c.is_enabled());
        assert!(!c.is_created());
        assert_eq!(node(c, "x").and_then(|x| c.document().borrow().parent(x)), node(c, "mount"));

        assert_eq!(c.refresh(), Transition::Keep);
        assert!(!c.is_created());

        c.set_enabled(true);
        assert!(c.is_created());
    }

    #[test]
    fn test_remove_then_create_back_to_back() {
        let f = fixture();
        let c = &f.controller;
        c.create();
        c.switch_tab("b");

        c.remove();
        assert!(c.create());
        assert_eq!(c.active_tab(), "b");
        assert_eq!(count(c, ".generic-tab-buttons"), 1);
        assert_eq!(count(c, ".generic-tab-content"), 2);
        let x = node(c, "x").unwrap();
        assert_eq!(c.document().borrow().parent(x), c.container_node("a"));
    }

    #[test]
    fn test_remove_when_absent_is_harmless() {
        let f = fixture();
        let before = f.controller.document().borrow().html();
        f.controller.remove();
        assert_eq!(f.controller.document().borrow().html(), before);
        assert!(!f.controller.is_created());
    }
}
