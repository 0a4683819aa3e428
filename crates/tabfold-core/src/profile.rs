//! Character profile tabs
//!
//! Splits the character profile panel into a `profile` tab holding the
//! existing avatar and info blocks and a `history` tab whose chat list is
//! rendered on demand.

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tabfold_dom::{escape_html, NodeId, Query, SharedDocument};
use tabfold_tabs::{TabController, TabDefinition, TabSetSpec, Transition};

use crate::host::Host;
use crate::Result;

const PROFILE_TAB: &str = "profile";
const HISTORY_TAB: &str = "history";
const HISTORY_MARKUP: &str = ".chat-history-controls, .chat-history-list";

/// Which character the host currently shows.
pub trait CharacterContext {
    fn character_id(&self) -> Option<String>;
}

/// The host's chat storage.
pub trait ChatSource {
    fn list_chats(&self, character_id: &str) -> Result<Vec<ChatSummary>>;
    fn delete_chats(&self, character_id: &str, chat_ids: &[String]) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: String,
    pub name: String,
    pub message_count: u32,
}

pub fn character_profile_spec() -> TabSetSpec {
    let mut spec = TabSetSpec::new(
        "#character-profile",
        "#char_info_block",
        vec![
            TabDefinition::new(PROFILE_TAB, "Profile")
                .with_icon("fa-solid fa-user")
                .with_content("#char_img_container")
                .with_content("#char_info_block"),
            TabDefinition::new(HISTORY_TAB, "Chat History").with_icon("fa-solid fa-comments"),
        ],
    );
    spec.tab_prefix = "char-profile-tab".to_string();
    spec.class_name = "char-profile-tab".to_string();
    spec.active_tab_storage_key = Some("char-profile-active-tab".to_string());
    spec.default_tab = Some(PROFILE_TAB.to_string());
    spec
}

/// Installed character profile tabs.
pub struct ProfileTabs {
    controller: TabController,
    history: HistoryView,
}

/// Everything needed to draw the chat list, shared with the switch hook.
#[derive(Clone)]
struct HistoryView {
    document: SharedDocument,
    content_id: String,
    context: Rc<dyn CharacterContext>,
    chats: Rc<dyn ChatSource>,
}

impl ProfileTabs {
    /// Attach the profile tab set to `host`. The tabs exist while a
    /// character is selected; the chat list is redrawn each time the
    /// history tab becomes active.
    pub fn install(
        host: &Host,
        context: Rc<dyn CharacterContext>,
        chats: Rc<dyn ChatSource>,
    ) -> Result<Self> {
        let spec = character_profile_spec();
        let content_id = format!("{}-content-{}", spec.tab_prefix, HISTORY_TAB);

        let history = HistoryView {
            document: host.document().clone(),
            content_id,
            context: Rc::clone(&context),
            chats,
        };

        let on_switch = history.clone();
        let controller = host.attach(spec, move |builder| {
            builder
                .check_condition(move || context.character_id().is_some())
                .on_tab_switch(move |tab_id| {
                    if tab_id == HISTORY_TAB {
                        on_switch.render();
                    }
                })
        })?;

        Ok(Self {
            controller,
            history,
        })
    }

    pub fn controller(&self) -> &TabController {
        &self.controller
    }

    /// Recheck after the selected character changed.
    pub fn update(&self) -> Transition {
        let transition = self.controller.refresh();
        if transition == Transition::Remove {
            self.history.clear_stale();
        }
        transition
    }

    pub fn render_history(&self) {
        self.history.render();
    }

    /// Chat ids checked in the live history tab, in list order. Lists
    /// outside the tab never count.
    pub fn selected_chats(&self) -> Vec<String> {
        match self.controller.container_node(HISTORY_TAB) {
            Some(container) => self.history.selected(container),
            None => Vec::new(),
        }
    }

    /// Delete the checked chats and redraw the list. Returns how many were
    /// deleted.
    pub fn delete_selected(&self) -> Result<usize> {
        let selected = self.selected_chats();
        if selected.is_empty() {
            return Ok(0);
        }

        let Some(character_id) = self.history.context.character_id() else {
            return Ok(0);
        };

        self.history.chats.delete_chats(&character_id, &selected)?;
        tracing::info!(
            character_id = %character_id,
            count = selected.len(),
            "Deleted chats"
        );

        self.history.render();
        Ok(selected.len())
    }
}

impl HistoryView {
    fn render(&self) {
        let Some(container) = self.document.borrow().find_by_id(&self.content_id) else {
            return;
        };
        self.clear_stale();

        let chats = match self.context.character_id() {
            Some(character_id) => match self.chats.list_chats(&character_id) {
                Ok(chats) => chats,
                Err(e) => {
                    tracing::warn!(character_id = %character_id, error = %e, "Cannot list chats");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let markup = history_markup(&chats);
        if let Err(e) = self.document.borrow_mut().set_inner_html(container, &markup) {
            tracing::warn!(error = %e, "Cannot render chat history");
            return;
        }

        tracing::debug!(chats = chats.len(), "Rendered chat history");
    }

    /// Drop chat lists left outside the history tab. Teardown hands the
    /// tab's rendered list back to the panel like any other content.
    fn clear_stale(&self) {
        let Ok(rendered) = Query::parse(HISTORY_MARKUP) else {
            return;
        };

        let mut doc = self.document.borrow_mut();
        let container = doc.find_by_id(&self.content_id);
        let stale: Vec<NodeId> = doc
            .query_all(&rendered)
            .into_iter()
            .filter(|node| container.map_or(true, |c| !doc.contains(c, *node)))
            .collect();

        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "Clearing stale chat history");
        }
        for node in stale {
            doc.remove(node);
        }
    }

    fn selected(&self, container: NodeId) -> Vec<String> {
        let (Ok(checked), Ok(item)) = (
            Query::parse(".chat-history-item .chat-select-checkbox[checked]"),
            Query::parse(".chat-history-item"),
        ) else {
            return Vec::new();
        };

        let doc = self.document.borrow();
        let ids = doc
            .query_all_within(container, &checked)
            .into_iter()
            .filter_map(|checkbox| doc.closest(checkbox, &item))
            .filter_map(|row| doc.attr(row, "data-chat-id"))
            .map(str::to_string)
            .collect();
        ids
    }
}

fn history_markup(chats: &[ChatSummary]) -> String {
    let mut html = String::from(
        r#"<div class="chat-history-controls"><button id="add-folder-btn"><i class="fa-solid fa-folder-plus"></i> Add Folder</button><button id="delete-selected-btn" class="danger-button"><i class="fa-solid fa-trash"></i> Delete Selected</button></div><ul class="chat-history-list">"#,
    );

    for chat in chats {
        html.push_str(&format!(
            r#"<li class="chat-history-item" data-chat-id="{}"><input type="checkbox" class="chat-select-checkbox"><i class="fa-solid fa-message-text"></i><span class="chat-name">{}</span><span class="chat-message-count">{} msgs</span></li>"#,
            escape_html(&chat.id),
            escape_html(&chat.name),
            chat.message_count
        ));
    }

    html.push_str("</ul>");
    html
}
