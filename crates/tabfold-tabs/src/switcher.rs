//! Tab switcher: active markers and scroll reset

use tabfold_dom::{Document, Query};

use crate::chrome::Chrome;
use crate::config::ACTIVE_CLASS;

/// Mark exactly the button and container of `tab_id` active. Inactive
/// containers stay in the document, only their marker goes.
pub(crate) fn mark_active(doc: &mut Document, chrome: &Chrome, tab_id: &str) {
    for (id, button) in &chrome.buttons {
        doc.toggle_class(*button, ACTIVE_CLASS, id == tab_id);
    }
    for (id, container) in &chrome.containers {
        doc.toggle_class(*container, ACTIVE_CLASS, id == tab_id);
    }
}

/// Scroll every present region back to the top. Missing regions are skipped.
pub(crate) fn reset_scroll(doc: &mut Document, regions: &[Query]) {
    for region in regions {
        if let Some(node) = doc.query(region) {
            doc.set_scroll_top(node, 0);
        }
    }
}
