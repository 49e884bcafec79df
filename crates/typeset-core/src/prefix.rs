//! Link prefixed handles such as `@name` or `#tag` to a URL.

use kuchiki::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dom::{self, Document, EXCLUDED};
use crate::entities;
use crate::error::{Error, Result};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("valid token pattern"));

const TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrefixEntry {
    pub prefix: String,
    pub url: String,
}

/// Accumulates `prefix -> url` entries; registering a prefix again replaces
/// its url.
#[derive(Debug, Clone, Default)]
pub struct PrefixLinker {
    entries: Vec<PrefixEntry>,
}

impl PrefixLinker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, prefix: &str, url: &str) -> Result<()> {
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return Err(Error::InvalidPrefix(prefix.to_string()));
        }
        let entry = PrefixEntry {
            prefix: prefix.to_string(),
            url: normalize_url(url),
        };
        match self.entries.iter_mut().find(|e| e.prefix == entry.prefix) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        // longest prefix wins
        self.entries
            .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(())
    }

    pub fn entries(&self) -> &[PrefixEntry] {
        &self.entries
    }

    pub fn run(&self, doc: &Document) {
        if self.entries.is_empty() {
            return;
        }
        for node in doc.text_nodes() {
            if dom::is_within(&node, EXCLUDED) || dom::is_within(&node, &["a"]) {
                continue;
            }
            let Some(value) = dom::text_of(&node) else {
                continue;
            };
            if let Some(parts) = self.link_text(&value) {
                dom::replace_with(&node, parts);
            }
        }
    }

    fn link_text(&self, value: &str) -> Option<Vec<NodeRef>> {
        let mut parts = Vec::new();
        let mut last = 0;
        for (start, word) in words(value) {
            let Some((entry, handle)) = self.match_token(word) else {
                continue;
            };
            if start > last {
                parts.push(NodeRef::new_text(&value[last..start]));
            }
            let href = format!("{}{handle}", entry.url);
            let label = format!("{}{handle}", entry.prefix);
            parts.push(dom::new_link(&href, &label));
            last = start + entry.prefix.len() + handle.len();
        }
        if parts.is_empty() {
            return None;
        }
        if last < value.len() {
            parts.push(NodeRef::new_text(&value[last..]));
        }
        Some(parts)
    }

    fn match_token<'t>(&self, token: &'t str) -> Option<(&PrefixEntry, &'t str)> {
        let entry = self.entries.iter().find(|e| token.starts_with(&e.prefix))?;
        let handle = token[entry.prefix.len()..].trim_end_matches(TRAILING);
        if handle.is_empty() {
            return None;
        }
        Some((entry, handle))
    }
}

/// Words of `value` (placeholder form) with their byte offsets. A no-break
/// space ends a word, plain or as a placeholder.
fn words(value: &str) -> Vec<(usize, &str)> {
    let nbsp = entities::placeholder("nbsp");
    let mut out = Vec::new();
    for token in TOKEN_RE.find_iter(value) {
        let mut offset = token.start();
        for piece in token.as_str().split(nbsp.as_str()) {
            if !piece.is_empty() {
                out.push((offset, piece));
            }
            offset += piece.len() + nbsp.len();
        }
    }
    out
}

/// Append `/` unless the url has a query or already ends in `/` or `@`.
fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.contains('?') || url.ends_with('/') || url.ends_with('@') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
