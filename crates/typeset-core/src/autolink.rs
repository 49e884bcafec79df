//! Turn URLs, `www.` hosts, bare domains and email addresses in text into
//! links.

use kuchiki::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dom::{self, Document, EXCLUDED};
use crate::entities::{self, PLACEHOLDER_END, PLACEHOLDER_START};
use crate::links::WEB_EXTENSIONS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AutolinkOptions {
    /// Show `example.com/x` as the text of a link to `https://example.com/x`.
    pub strip_scheme: bool,
    /// Link `www.example.com` and `example.com` (with `http://`).
    pub link_no_scheme: bool,
    pub emails: bool,
}

impl Default for AutolinkOptions {
    fn default() -> Self {
        Self {
            strip_scheme: true,
            link_no_scheme: true,
            emails: true,
        }
    }
}

static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        (?P<email>[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,})
        | (?P<url>\b(?:https?|ftp)://[^\s<>"]+)
        | (?P<www>\bwww\.[^\s<>"]+)
        | (?P<domain>\b(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,24}(?:/[^\s<>"]*)?)
        "#,
    )
    .expect("valid autolink pattern")
});

/// Top-level domains a scheme-less `name.tld` must end in to be linked, so
/// file names like `node.js` or `notes.txt` stay text.
const KNOWN_TLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "int", "mil", "info", "biz", "io", "co", "app", "dev",
    "ai", "me", "tv", "eu", "de", "at", "ch", "fr", "es", "it", "nl", "be", "uk", "us", "ca",
    "au", "nz", "jp", "cn", "in", "br", "ru", "pl", "se", "no", "dk", "fi", "pt", "cz", "ie",
    "social", "blog", "shop", "site", "online", "tech", "xyz",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    Email,
    Url,
    NoScheme,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Autolinker {
    options: AutolinkOptions,
}

impl Autolinker {
    pub fn new(options: AutolinkOptions) -> Self {
        Self { options }
    }

    pub fn run(&self, doc: &Document) {
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

    /// Split `value` (placeholder form) into text and link nodes. `None`
    /// when nothing in it is linkable.
    fn link_text(&self, value: &str) -> Option<Vec<NodeRef>> {
        let mut parts = Vec::new();
        let mut last = 0;
        for caps in LINK_RE.captures_iter(value) {
            let (found, kind) = if let Some(m) = caps.name("email") {
                (m, MatchKind::Email)
            } else if let Some(m) = caps.name("url") {
                (m, MatchKind::Url)
            } else if let Some(m) = caps.name("www").or_else(|| caps.name("domain")) {
                (m, MatchKind::NoScheme)
            } else {
                continue;
            };
            let matched = trim_trailing(cut_at_entity(found.as_str()));
            if !self.accepts(kind, matched) {
                continue;
            }
            if found.start() > last {
                parts.push(NodeRef::new_text(&value[last..found.start()]));
            }
            parts.push(self.link(kind, matched));
            last = found.start() + matched.len();
        }
        if parts.is_empty() {
            return None;
        }
        if last < value.len() {
            parts.push(NodeRef::new_text(&value[last..]));
        }
        Some(parts)
    }

    fn accepts(&self, kind: MatchKind, matched: &str) -> bool {
        match kind {
            MatchKind::Email => self.options.emails,
            MatchKind::Url => matched.contains("://") && !matched.ends_with("://"),
            MatchKind::NoScheme => {
                if !self.options.link_no_scheme {
                    return false;
                }
                let host = matched.split('/').next().unwrap_or(matched);
                let tld = host.rsplit('.').next().unwrap_or(host);
                if host.starts_with("www.") {
                    !tld.is_empty() && !WEB_EXTENSIONS.contains(&tld)
                } else {
                    KNOWN_TLDS.contains(&tld)
                }
            }
        }
    }

    fn link(&self, kind: MatchKind, matched: &str) -> NodeRef {
        match kind {
            MatchKind::Email => dom::new_link(&format!("mailto:{matched}"), matched),
            MatchKind::Url => {
                let label = if self.options.strip_scheme {
                    matched.split_once("://").map_or(matched, |(_, rest)| rest)
                } else {
                    matched
                };
                dom::new_link(matched, label)
            }
            MatchKind::NoScheme => dom::new_link(&format!("http://{matched}"), matched),
        }
    }
}

/// Stop a match at the first entity that stands for whitespace or markup.
fn cut_at_entity(found: &str) -> &str {
    let mut from = 0;
    while let Some(start) = found[from..].find(PLACEHOLDER_START).map(|i| from + i) {
        let Some(len) = found[start..].find(PLACEHOLDER_END) else {
            return &found[..start];
        };
        let end = start + len + PLACEHOLDER_END.len_utf8();
        let decoded = entities::decode(&found[start..end]);
        if decoded
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\''))
        {
            return &found[..start];
        }
        from = end;
    }
    found
}

/// Drop sentence punctuation after a link; a closing parenthesis stays when
/// the link opened one.
fn trim_trailing(found: &str) -> &str {
    let mut out = found;
    loop {
        let Some(last) = out.chars().last() else {
            return out;
        };
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' => true,
            ')' => out.matches('(').count() < out.matches(')').count(),
            _ => false,
        };
        if !strip {
            return out;
        }
        out = &out[..out.len() - last.len_utf8()];
    }
}
