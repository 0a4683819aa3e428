//! Markup helpers

use scraper::{Html, Node};

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Build a standalone element node with the given name and attributes.
///
/// Returns `None` for elements the HTML parser will not produce outside
/// their required parent (table rows and the like).
pub(crate) fn element_node(name: &str, attrs: &[(String, String)]) -> Option<Node> {
    let mut markup = String::new();
    markup.push('<');
    markup.push_str(name);
    for (key, value) in attrs {
        markup.push(' ');
        markup.push_str(key);
        markup.push_str("=\"");
        markup.push_str(&escape_html(value));
        markup.push('"');
    }
    markup.push_str("></");
    markup.push_str(name);
    markup.push('>');

    let fragment = Html::parse_fragment(&markup);
    let root = fragment.root_element();
    let node = root
        .children()
        .find(|child| {
            child
                .value()
                .as_element()
                .is_some_and(|element| element.name() == name)
        })
        .map(|child| child.value().clone());
    node
}
