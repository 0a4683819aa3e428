//! Mutable HTML document

use ego_tree::{NodeId, NodeRef};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::DomError;
use crate::markup::element_node;
use crate::query::Query;
use crate::{Result, SharedDocument};

/// A live HTML tree.
///
/// Removing a node detaches it: it keeps its id and its subtree but is no
/// longer reachable from the root, so queries stop seeing it.
///
/// Detached nodes are never freed. The arena only grows, by the size of
/// whatever was removed or replaced, for the life of the document. Freeing
/// would mean reparsing into a new tree, which hands out new ids and breaks
/// every handle a caller holds.
pub struct Document {
    html: Html,
    /// Vertical scroll offset per scrollable node
    scroll: HashMap<NodeId, u32>,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self::from_html(Html::parse_document(markup))
    }

    pub fn parse_fragment(markup: &str) -> Self {
        Self::from_html(Html::parse_fragment(markup))
    }

    pub fn from_html(html: Html) -> Self {
        Self {
            html,
            scroll: HashMap::new(),
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    // === Queries ===

    /// First attached element matching `query`, in document order.
    pub fn query(&self, query: &Query) -> Option<NodeId> {
        let root = self.html.root_element();
        let found = root.select(query.selector()).next().map(node_id);
        found
    }

    /// Every attached element matching `query`, in document order.
    pub fn query_all(&self, query: &Query) -> Vec<NodeId> {
        let root = self.html.root_element();
        let found = root.select(query.selector()).map(node_id).collect();
        found
    }

    /// Every element below `root` (not `root` itself) matching `query`, in
    /// document order. Empty when `root` is unknown.
    pub fn query_all_within(&self, root: NodeId, query: &Query) -> Vec<NodeId> {
        let Some(root) = self.node(root).and_then(ElementRef::wrap) else {
            return Vec::new();
        };
        let found = root.select(query.selector()).map(node_id).collect();
        found
    }

    /// Attached element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let root = self.html.root_element();
        let found = root
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().id() == Some(id))
            .map(node_id);
        found
    }

    /// Nearest element, starting at `node` itself, that matches `query`.
    pub fn closest(&self, node: NodeId, query: &Query) -> Option<NodeId> {
        let start = self.node(node)?;
        std::iter::once(start)
            .chain(start.ancestors())
            .filter_map(ElementRef::wrap)
            .find(|el| query.selector().matches(el))
            .map(node_id)
    }

    /// Inclusive containment: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if ancestor == node {
            return self.node(node).is_some();
        }

        self.node(node)
            .map(|n| n.ancestors().any(|a| a.id() == ancestor))
            .unwrap_or(false)
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.html.tree.root().id(), node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent().map(|p| p.id())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| {
                n.children()
                    .filter(|c| c.value().is_element())
                    .map(|c| c.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    // === Element attributes ===

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.name())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }

    pub fn element_id(&self, node: NodeId) -> Option<&str> {
        self.element(node)?.id()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .map(|el| el.classes().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Add or remove `class` on an element. Returns whether the element
    /// changed.
    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };

        if element.classes().any(|c| c == class) == on {
            return false;
        }

        let mut classes: Vec<&str> = element.classes().filter(|c| *c != class).collect();
        if on {
            classes.push(class);
        }
        let class_value = classes.join(" ");

        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut had_class_attr = false;
        for (key, value) in element.attrs() {
            if key == "class" {
                had_class_attr = true;
                if !class_value.is_empty() {
                    attrs.push((key.to_string(), class_value.clone()));
                }
            } else {
                attrs.push((key.to_string(), value.to_string()));
            }
        }
        if !had_class_attr && !class_value.is_empty() {
            attrs.push(("class".to_string(), class_value));
        }

        let name = element.name().to_string();
        self.rebuild(node, &name, &attrs)
    }

    /// Set (`Some`) or drop (`None`) an attribute. Returns whether the
    /// element changed.
    pub fn set_attr(&mut self, node: NodeId, attr: &str, value: Option<&str>) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };

        if element.attr(attr) == value {
            return false;
        }

        let mut attrs: Vec<(String, String)> = element
            .attrs()
            .filter(|(key, _)| *key != attr)
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        if let Some(value) = value {
            attrs.push((attr.to_string(), value.to_string()));
        }

        let name = element.name().to_string();
        self.rebuild(node, &name, &attrs)
    }

    // === Mutation ===

    /// Parse `markup` and insert the resulting nodes, in order, right after
    /// `anchor`. Returns the ids of the inserted top-level nodes.
    pub fn insert_after(&mut self, anchor: NodeId, markup: &str) -> Result<Vec<NodeId>> {
        let anchor_ref = self.node(anchor).ok_or(DomError::UnknownNode)?;
        if anchor_ref.parent().is_none() {
            return Err(DomError::Detached);
        }

        let fragment = Html::parse_fragment(markup);
        let mut inserted = Vec::new();
        let mut previous = anchor;

        for child in fragment.root_element().children() {
            let id = self.graft(child);
            if let Some(mut prev) = self.html.tree.get_mut(previous) {
                prev.insert_id_after(id);
            }
            inserted.push(id);
            previous = id;
        }

        Ok(inserted)
    }

    /// Move `child` (with its subtree) to the end of `parent`'s children.
    ///
    /// Refuses moves that would put a node inside itself.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.node(child).is_none() || self.contains(child, parent) {
            return false;
        }

        match self.html.tree.get_mut(parent) {
            Some(mut target) => {
                target.append_id(child);
                true
            }
            None => false,
        }
    }

    /// Detach `node` from its parent. The id stays valid and the node can
    /// be attached again.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(mut target) = self.html.tree.get_mut(node) {
            target.detach();
        }
        self.scroll.remove(&node);
    }

    /// Replace the children of `node` with the parsed `markup`. The old
    /// children are detached, not freed.
    pub fn set_inner_html(&mut self, node: NodeId, markup: &str) -> Result<()> {
        if self.node(node).is_none() {
            return Err(DomError::UnknownNode);
        }

        for child in self.children(node) {
            if let Some(mut old) = self.html.tree.get_mut(child) {
                old.detach();
            }
        }

        let fragment = Html::parse_fragment(markup);
        for child in fragment.root_element().children() {
            let id = self.graft(child);
            if let Some(mut parent) = self.html.tree.get_mut(node) {
                parent.append_id(id);
            }
        }

        Ok(())
    }

    // === Scrolling ===

    pub fn scroll_top(&self, node: NodeId) -> u32 {
        self.scroll.get(&node).copied().unwrap_or(0)
    }

    pub fn set_scroll_top(&mut self, node: NodeId, offset: u32) {
        if offset == 0 {
            self.scroll.remove(&node);
        } else {
            self.scroll.insert(node, offset);
        }
    }

    // === Serialization ===

    pub fn outer_html(&self, node: NodeId) -> Option<String> {
        ElementRef::wrap(self.node(node)?).map(|el| el.html())
    }

    pub fn inner_html(&self, node: NodeId) -> Option<String> {
        ElementRef::wrap(self.node(node)?).map(|el| el.inner_html())
    }

    pub fn text(&self, node: NodeId) -> String {
        self.node(node)
            .and_then(ElementRef::wrap)
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
    }

    pub fn html(&self) -> String {
        self.html.root_element().html()
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        self.html.tree.get(id)?.value().as_element()
    }

    /// Swap the element value for a freshly parsed one so the cached id
    /// and class list stay in sync with the attributes. Children are kept.
    fn rebuild(&mut self, node: NodeId, name: &str, attrs: &[(String, String)]) -> bool {
        let Some(rebuilt) = element_node(name, attrs) else {
            tracing::debug!(tag = %name, "Cannot rebuild element");
            return false;
        };

        match self.html.tree.get_mut(node) {
            Some(mut target) => {
                *target.value() = rebuilt;
                true
            }
            None => false,
        }
    }

    /// Deep-copy a node from another tree into this one as an orphan.
    fn graft(&mut self, source: NodeRef<'_, Node>) -> NodeId {
        let id = self.html.tree.orphan(source.value().clone()).id();
        for child in source.children() {
            let child_id = self.graft(child);
            if let Some(mut parent) = self.html.tree.get_mut(id) {
                parent.append_id(child_id);
            }
        }
        id
    }
}

fn node_id(el: ElementRef<'_>) -> NodeId {
    let node: NodeRef<'_, Node> = *el;
    node.id()
}
