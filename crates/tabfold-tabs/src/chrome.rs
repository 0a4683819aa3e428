//! Content reorganizer
//!
//! Builds the tab chrome (button group + one container per tab) after the
//! anchor, moves declared content into the containers, and reverses both on
//! teardown. Nodes are moved, never copied: a relocated node keeps its
//! identity and lives in exactly one place at a time.

use tabfold_dom::{escape_html, Document, NodeId};

use crate::config::{TabConfig, ACTIVE_CLASS};

/// Nodes generated by one controller plus the content it borrowed.
#[derive(Debug, Clone)]
pub(crate) struct Chrome {
    pub(crate) button_group: NodeId,
    pub(crate) buttons: Vec<(String, NodeId)>,
    pub(crate) containers: Vec<(String, NodeId)>,
    /// Borrowed nodes moved in from elsewhere, in move order
    pub(crate) relocated: Vec<NodeId>,
}

impl Chrome {
    pub(crate) fn button(&self, tab_id: &str) -> Option<NodeId> {
        lookup(&self.buttons, tab_id)
    }

    pub(crate) fn container(&self, tab_id: &str) -> Option<NodeId> {
        lookup(&self.containers, tab_id)
    }

    /// Whether `node` is part of the generated chrome itself.
    pub(crate) fn owns(&self, doc: &Document, node: NodeId) -> bool {
        doc.contains(self.button_group, node) || self.containers.iter().any(|(_, c)| *c == node)
    }

    /// Tab whose button contains `target`.
    pub(crate) fn tab_at(&self, doc: &Document, target: NodeId) -> Option<&str> {
        self.buttons
            .iter()
            .find(|(_, button)| doc.contains(*button, target))
            .map(|(id, _)| id.as_str())
    }
}

fn lookup(nodes: &[(String, NodeId)], tab_id: &str) -> Option<NodeId> {
    nodes
        .iter()
        .find(|(id, _)| id == tab_id)
        .map(|(_, node)| *node)
}

/// Create the chrome and move content in. Returns `None`, leaving the
/// document untouched, when the anchor is missing.
pub(crate) fn build(doc: &mut Document, config: &TabConfig) -> Option<Chrome> {
    let Some(anchor) = doc.query(config.anchor()) else {
        tracing::debug!(selector = %config.anchor(), "Anchor not found, tabs not created");
        return None;
    };

    let button_group = match doc.insert_after(anchor, &buttons_markup(config)) {
        Ok(nodes) => nodes.into_iter().next()?,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot insert tab buttons");
            return None;
        }
    };

    let buttons: Vec<(String, NodeId)> = config
        .tab_ids()
        .map(str::to_string)
        .zip(doc.element_children(button_group))
        .collect();

    let containers: Vec<(String, NodeId)> =
        match doc.insert_after(button_group, &containers_markup(config)) {
            Ok(nodes) => config.tab_ids().map(str::to_string).zip(nodes).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot insert tab containers");
                doc.remove(button_group);
                return None;
            }
        };

    let mut chrome = Chrome {
        button_group,
        buttons,
        containers,
        relocated: Vec::new(),
    };

    relocate_content(doc, config, &mut chrome);

    tracing::info!(
        tabs = chrome.containers.len(),
        relocated = chrome.relocated.len(),
        "Created tabs"
    );

    Some(chrome)
}

/// Tabs in declaration order, selectors in declaration order, matches in
/// document order.
fn relocate_content(doc: &mut Document, config: &TabConfig, chrome: &mut Chrome) {
    for (tab, (tab_id, container)) in config.compiled_tabs().iter().zip(chrome.containers.clone()) {
        for selector in &tab.selectors {
            let matches = doc.query_all(selector);
            if matches.is_empty() {
                tracing::debug!(tab_id = %tab_id, selector = %selector, "Content selector matched nothing");
            }

            for matched in matches {
                let unit = config.policy().unit_for(doc, matched);

                if doc.contains(container, unit) {
                    continue;
                }

                if chrome.owns(doc, unit) || doc.contains(unit, container) {
                    tracing::debug!(
                        tab_id = %tab_id,
                        selector = %selector,
                        "Skipping content that encloses or belongs to the tabs"
                    );
                    continue;
                }

                if doc.append_child(container, unit) {
                    tracing::debug!(tab_id = %tab_id, selector = %selector, "Moved content into tab");
                    if !chrome.relocated.contains(&unit) {
                        chrome.relocated.push(unit);
                    }
                }
            }
        }
    }
}

/// Delete the chrome and put every container child back under the mount
/// container. Works from `chrome` when known, otherwise from the generated
/// ids, so a half-built or foreign-built chrome is cleaned up too.
///
/// Returns the relocated nodes that could not be put back into the
/// document. They stay inside their container, never orphaned.
pub(crate) fn teardown(
    doc: &mut Document,
    config: &TabConfig,
    chrome: Option<&Chrome>,
) -> Vec<NodeId> {
    let group = chrome
        .map(|c| c.button_group)
        .or_else(|| doc.find_by_id(&config.button_group_id()));
    if let Some(group) = group {
        doc.remove(group);
    }

    let mount = doc.query(config.container());
    if mount.is_none() {
        tracing::debug!(
            selector = %config.container(),
            "Mount container not found, restoring content next to the tabs"
        );
    }

    let mut restored = 0usize;
    for tab_id in config.tab_ids() {
        let container = chrome
            .and_then(|c| c.container(tab_id))
            .or_else(|| doc.find_by_id(&config.content_id(tab_id)));
        let Some(container) = container else {
            continue;
        };

        // The mount can't take content back if it sits inside the container.
        let target = mount
            .filter(|m| !doc.contains(container, *m))
            .or_else(|| doc.parent(container));
        let Some(target) = target else {
            tracing::warn!(tab_id = %tab_id, "No place to restore tab content, leaving it in place");
            continue;
        };

        for child in doc.children(container) {
            if doc.append_child(target, child) {
                restored += 1;
            }
        }

        if doc.children(container).is_empty() {
            doc.remove(container);
        }
    }

    let stranded: Vec<NodeId> = chrome
        .map(|c| {
            c.relocated
                .iter()
                .copied()
                .filter(|node| !doc.is_attached(*node))
                .collect()
        })
        .unwrap_or_default();
    if !stranded.is_empty() {
        tracing::warn!(
            stranded = stranded.len(),
            "Relocated content could not be returned to the document"
        );
    }

    tracing::info!(restored, "Removed tabs");
    stranded
}

fn buttons_markup(config: &TabConfig) -> String {
    let mut html = format!(
        r#"<div id="{}" class="{}">"#,
        escape_html(&config.button_group_id()),
        escape_html(&config.button_group_class())
    );

    let button_class = config.button_class();
    for (index, tab) in config.tabs().enumerate() {
        let class = marked(&button_class, index == 0);
        let label = escape_html(&tab.label);
        html.push_str(&format!(
            r#"<button id="{}" class="{}"><i class="{}"></i><span data-i18n="{}">{}</span></button>"#,
            escape_html(&config.button_id(&tab.id)),
            escape_html(&class),
            escape_html(&tab.icon),
            label,
            label
        ));
    }

    html.push_str("</div>");
    html
}

fn containers_markup(config: &TabConfig) -> String {
    let content_class = config.content_class();
    let mut html = String::new();
    for (index, tab_id) in config.tab_ids().enumerate() {
        html.push_str(&format!(
            r#"<div id="{}" class="{}"></div>"#,
            escape_html(&config.content_id(tab_id)),
            escape_html(&marked(&content_class, index == 0))
        ));
    }
    html
}

fn marked(class: &str, active: bool) -> String {
    if active {
        format!("{} {}", class, ACTIVE_CLASS)
    } else {
        class.to_string()
    }
}
