//! Tab set configuration
//!
//! [`TabSetSpec`] is the declarative half (what a JSON file can hold);
//! [`TabConfig`] is the validated, immutable result with every selector
//! compiled and the two behavioral hooks attached.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tabfold_dom::Query;

use crate::definition::TabDefinition;
use crate::error::TabError;
use crate::relocation::{CompiledPolicy, RelocationPolicy};
use crate::Result;

const DEFAULT_TAB_PREFIX: &str = "tab";
const DEFAULT_CLASS_NAME: &str = "generic-tab";

/// Structural scroll regions reset to the top on every switch.
const DEFAULT_SCROLL_CONTAINERS: &[&str] = &[
    "#left-nav-panel .scrollableInner",
    "#user-settings-block",
    "#user-settings-block-content",
    ".drawer-content",
];

pub(crate) const ACTIVE_CLASS: &str = "active";

/// Recheck timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSchedule {
    /// Delay before the first recheck, letting the host page settle
    pub initial_delay_ms: u64,
    /// Period of the recurring recheck
    pub interval_ms: u64,
}

impl PollSchedule {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Never zero: a zero period would spin.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial_delay_ms: 300,
            interval_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSetSpec {
    /// Where relocated content goes back to on teardown
    pub container_selector: String,
    /// Tab buttons are inserted right after this node
    pub insert_after_selector: String,
    /// Root of every generated element id
    #[serde(default = "default_tab_prefix")]
    pub tab_prefix: String,
    /// Settings key for the last-active tab; `None` disables persistence
    #[serde(default)]
    pub active_tab_storage_key: Option<String>,
    /// Falls back to the first declared tab
    #[serde(default)]
    pub default_tab: Option<String>,
    /// Root of every generated class name
    #[serde(default = "default_class_name")]
    pub class_name: String,
    /// Declaration order is button order
    pub tabs: Vec<TabDefinition>,
    #[serde(default)]
    pub relocation: RelocationPolicy,
    #[serde(default = "default_scroll_containers")]
    pub scroll_containers: Vec<String>,
    #[serde(default)]
    pub poll: PollSchedule,
}

fn default_tab_prefix() -> String {
    DEFAULT_TAB_PREFIX.to_string()
}

fn default_class_name() -> String {
    DEFAULT_CLASS_NAME.to_string()
}

fn default_scroll_containers() -> Vec<String> {
    DEFAULT_SCROLL_CONTAINERS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl TabSetSpec {
    pub fn new(
        container_selector: impl Into<String>,
        insert_after_selector: impl Into<String>,
        tabs: Vec<TabDefinition>,
    ) -> Self {
        Self {
            container_selector: container_selector.into(),
            insert_after_selector: insert_after_selector.into(),
            tab_prefix: default_tab_prefix(),
            active_tab_storage_key: None,
            default_tab: None,
            class_name: default_class_name(),
            tabs,
            relocation: RelocationPolicy::default(),
            scroll_containers: default_scroll_containers(),
            poll: PollSchedule::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

pub(crate) struct CompiledTab {
    pub(crate) definition: TabDefinition,
    pub(crate) selectors: Vec<Query>,
}

type Condition = Rc<dyn Fn() -> bool>;
type SwitchHook = Rc<dyn Fn(&str)>;

/// Validated configuration. Immutable once built.
#[derive(Clone)]
pub struct TabConfig {
    spec: Rc<TabSetSpec>,
    container: Query,
    anchor: Query,
    tabs: Rc<Vec<CompiledTab>>,
    default_tab: String,
    policy: CompiledPolicy,
    scroll_containers: Vec<Query>,
    check_condition: Condition,
    on_tab_switch: Option<SwitchHook>,
}

impl TabConfig {
    pub fn builder(spec: TabSetSpec) -> TabConfigBuilder {
        TabConfigBuilder {
            spec,
            check_condition: None,
            on_tab_switch: None,
        }
    }

    pub fn tab_ids(&self) -> impl Iterator<Item = &str> {
        self.tabs.iter().map(|t| t.definition.id.as_str())
    }

    pub fn has_tab(&self, tab_id: &str) -> bool {
        self.tab_ids().any(|id| id == tab_id)
    }

    pub fn tabs(&self) -> impl Iterator<Item = &TabDefinition> {
        self.tabs.iter().map(|t| &t.definition)
    }

    pub fn default_tab(&self) -> &str {
        &self.default_tab
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.spec.active_tab_storage_key.as_deref()
    }

    pub fn tab_prefix(&self) -> &str {
        &self.spec.tab_prefix
    }

    pub fn class_name(&self) -> &str {
        &self.spec.class_name
    }

    pub fn poll(&self) -> PollSchedule {
        self.spec.poll
    }

    // === Generated names ===

    pub fn button_group_id(&self) -> String {
        format!("{}-buttons", self.spec.tab_prefix)
    }

    pub fn button_id(&self, tab_id: &str) -> String {
        format!("{}-btn-{}", self.spec.tab_prefix, tab_id)
    }

    pub fn content_id(&self, tab_id: &str) -> String {
        format!("{}-content-{}", self.spec.tab_prefix, tab_id)
    }

    pub fn button_group_class(&self) -> String {
        format!("{}-buttons", self.spec.class_name)
    }

    pub fn button_class(&self) -> String {
        format!("{}-button", self.spec.class_name)
    }

    pub fn content_class(&self) -> String {
        format!("{}-content", self.spec.class_name)
    }

    // === Crate-internal access ===

    pub(crate) fn container(&self) -> &Query {
        &self.container
    }

    pub(crate) fn anchor(&self) -> &Query {
        &self.anchor
    }

    pub(crate) fn compiled_tabs(&self) -> &[CompiledTab] {
        &self.tabs
    }

    pub(crate) fn policy(&self) -> &CompiledPolicy {
        &self.policy
    }

    pub(crate) fn scroll_containers(&self) -> &[Query] {
        &self.scroll_containers
    }

    pub(crate) fn should_show(&self) -> bool {
        (self.check_condition)()
    }

    pub(crate) fn switch_hook(&self) -> Option<SwitchHook> {
        self.on_tab_switch.clone()
    }
}

impl fmt::Debug for TabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabConfig")
            .field("spec", &self.spec)
            .field("default_tab", &self.default_tab)
            .field("on_tab_switch", &self.on_tab_switch.is_some())
            .finish_non_exhaustive()
    }
}

pub struct TabConfigBuilder {
    spec: TabSetSpec,
    check_condition: Option<Condition>,
    on_tab_switch: Option<SwitchHook>,
}

impl TabConfigBuilder {
    /// Activation predicate. Without one the tabs are always wanted.
    pub fn check_condition(mut self, condition: impl Fn() -> bool + 'static) -> Self {
        self.check_condition = Some(Rc::new(condition));
        self
    }

    /// Called with the new tab id after every switch, including re-selecting
    /// the active tab.
    pub fn on_tab_switch(mut self, hook: impl Fn(&str) + 'static) -> Self {
        self.on_tab_switch = Some(Rc::new(hook));
        self
    }

    pub fn build(self) -> Result<TabConfig> {
        let spec = self.spec;

        validate_name("tab prefix", &spec.tab_prefix)?;
        validate_name("class name", &spec.class_name)?;

        if spec.tabs.is_empty() {
            return Err(TabError::NoTabs);
        }

        let mut tabs: Vec<CompiledTab> = Vec::with_capacity(spec.tabs.len());
        for definition in &spec.tabs {
            definition.validate()?;
            if tabs.iter().any(|t| t.definition.id == definition.id) {
                return Err(TabError::DuplicateTab(definition.id.clone()));
            }

            let context = format!("tab {}", definition.id);
            let selectors = definition
                .content_selectors
                .iter()
                .map(|s| compile(&context, s))
                .collect::<Result<Vec<_>>>()?;

            tabs.push(CompiledTab {
                definition: definition.clone(),
                selectors,
            });
        }

        let default_tab = match spec.default_tab.as_deref() {
            Some(id) if tabs.iter().any(|t| t.definition.id == id) => id.to_string(),
            Some(id) => return Err(TabError::UnknownDefaultTab(id.to_string())),
            None => tabs[0].definition.id.clone(),
        };

        let container = compile("container selector", &spec.container_selector)?;
        let anchor = compile("insert-after selector", &spec.insert_after_selector)?;
        let policy = spec.relocation.compile()?;
        let scroll_containers = spec
            .scroll_containers
            .iter()
            .map(|s| compile("scroll containers", s))
            .collect::<Result<Vec<_>>>()?;

        Ok(TabConfig {
            spec: Rc::new(spec),
            container,
            anchor,
            tabs: Rc::new(tabs),
            default_tab,
            policy,
            scroll_containers,
            check_condition: self.check_condition.unwrap_or_else(|| Rc::new(|| true)),
            on_tab_switch: self.on_tab_switch,
        })
    }
}

fn compile(context: &str, selector: &str) -> Result<Query> {
    Query::parse(selector).map_err(|source| TabError::Selector {
        context: context.to_string(),
        source,
    })
}

fn validate_name(field: &'static str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(TabError::InvalidName {
            field,
            value: value.to_string(),
        })
    }
}
