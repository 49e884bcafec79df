//! Short-last-line prevention for block elements.

use kuchiki::NodeRef;
use serde::{Deserialize, Serialize};

use crate::dom::{self, Document, EXCLUDED};
use crate::entities;

pub const BLOCK_ELEMENTS: &[&str] = &[
    "body", "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "li", "main", "nav", "ol", "p", "section", "td", "th", "ul",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WidowOptions {
    /// Text with fewer words is left alone.
    pub min_words: usize,
    /// Longest "second-last last" pair, in characters, that gets joined.
    pub max_tail_length: usize,
}

impl Default for WidowOptions {
    fn default() -> Self {
        Self {
            min_words: 4,
            max_tail_length: 25,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WidowPreventer {
    options: WidowOptions,
}

impl WidowPreventer {
    pub fn new(options: WidowOptions) -> Self {
        Self { options }
    }

    pub fn run(&self, doc: &Document) {
        let root = doc.root();
        let blocks: Vec<NodeRef> = root
            .inclusive_descendants()
            .filter(|n| n == root || is_block(n))
            .filter(|n| !dom::is_excluded(n))
            .filter(|n| !n.descendants().any(|d| is_block(&d)))
            .collect();

        for block in blocks {
            let Some(node) = last_text_node(&block) else {
                continue;
            };
            let Some(value) = dom::text_of(&node) else {
                continue;
            };
            if let Some(joined) = join_last_words(&value, &self.options) {
                dom::set_text(&node, joined);
            }
        }
    }
}

fn is_block(node: &NodeRef) -> bool {
    dom::tag_name(node).is_some_and(|t| BLOCK_ELEMENTS.contains(&t))
}

/// Last non-blank text node under `node`, searching children last to first.
fn last_text_node(node: &NodeRef) -> Option<NodeRef> {
    for child in node.children().rev() {
        if let Some(text) = child.as_text() {
            if !entities::decode(&text.borrow()).trim().is_empty() {
                return Some(child);
            }
            continue;
        }
        if dom::tag_name(&child).is_some_and(|t| EXCLUDED.contains(&t)) {
            continue;
        }
        if let Some(found) = last_text_node(&child) {
            return Some(found);
        }
    }
    None
}

/// Whitespace that may end a line. No-break spaces never split words.
fn is_breaking_space(ch: char) -> bool {
    ch.is_whitespace() && !matches!(ch, '\u{00A0}' | '\u{2007}' | '\u{202F}')
}

/// Collapse whitespace runs to single spaces and join the last two words of
/// `value` (placeholder form) with a no-break space. `None` when the text is
/// left as it is.
fn join_last_words(value: &str, options: &WidowOptions) -> Option<String> {
    let words: Vec<&str> = value
        .split(is_breaking_space)
        .filter(|w| !w.is_empty())
        .collect();
    if words.len() < options.min_words.max(2) {
        return None;
    }

    let last = entities::decode(words[words.len() - 1]);
    if last.contains('\u{00A0}') {
        return None;
    }
    let second_last = entities::decode(words[words.len() - 2]);
    // code points, not bytes
    let tail = second_last.chars().count() + 1 + last.chars().count();
    if tail > options.max_tail_length {
        return None;
    }

    let mut out = String::with_capacity(value.len() + 8);
    if value.starts_with(is_breaking_space) {
        out.push(' ');
    }
    out.push_str(&words[..words.len() - 1].join(" "));
    out.push_str(&entities::placeholder("nbsp"));
    out.push_str(words[words.len() - 1]);
    if value.ends_with(is_breaking_space) {
        out.push(' ');
    }
    Some(out)
}
