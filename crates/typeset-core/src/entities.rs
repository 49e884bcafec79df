//! Entity handling across the parse/serialize cycle.
//!
//! Raw markup is `protect`ed before parsing: every entity reference becomes a
//! placeholder delimited by two private-use characters, so the tree builder
//! neither decodes it nor escapes it again on the way out. Text engines work on
//! `decode`d text and write back `encode`d text; `restore` turns placeholders
//! into entity references after serializing.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub(crate) const PLACEHOLDER_START: char = '\u{E000}';
pub(crate) const PLACEHOLDER_END: char = '\u{E001}';

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("valid entity pattern")
});

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("\u{E000}([^\u{E000}\u{E001}]{1,32})\u{E001}").expect("valid placeholder pattern")
});

/// Placeholder for the entity `&{name};`.
pub fn placeholder(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 6);
    out.push(PLACEHOLDER_START);
    out.push_str(name);
    out.push(PLACEHOLDER_END);
    out
}

/// Rewrite entity references in raw markup to placeholders.
pub fn protect(html: &str) -> String {
    if !html.contains('&') {
        return html.to_string();
    }
    ENTITY_RE
        .replace_all(html, |caps: &Captures| placeholder(&caps[1]))
        .into_owned()
}

/// Turn placeholders back into entity references.
pub fn restore(html: &str) -> String {
    if !html.contains(PLACEHOLDER_START) {
        return html.to_string();
    }
    PLACEHOLDER_RE.replace_all(html, "&${1};").into_owned()
}

/// Resolve known placeholders to the characters they stand for.
/// Unknown entity names stay as placeholders.
pub fn decode(text: &str) -> String {
    if !text.contains(PLACEHOLDER_START) {
        return text.to_string();
    }
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures| {
            decode_body(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Canonical placeholder form of `text`.
///
/// `&`, `<`, `>` and U+00A0 become placeholders, known placeholders are
/// re-derived from the character they decode to and unknown ones are kept.
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_canonical(&mut out, &text[last..whole.start()]);
        match decode_body(&caps[1]) {
            Some(decoded) => push_canonical(&mut out, &decoded),
            None => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    push_canonical(&mut out, &text[last..]);
    out
}

/// Decode entity references in serialized output, keeping the ones whose
/// character would change the markup (or is an invisible no-break space).
pub fn decode_markup(html: &str) -> String {
    if !html.contains('&') {
        return html.to_string();
    }
    ENTITY_RE
        .replace_all(html, |caps: &Captures| match decode_body(&caps[1]) {
            Some(decoded) if !decoded.chars().any(is_reserved) => decoded,
            _ => caps[0].to_string(),
        })
        .into_owned()
}

fn decode_body(body: &str) -> Option<String> {
    let entity = format!("&{body};");
    let decoded = html_escape::decode_html_entities(&entity);
    // legacy prefix matches (`&ampfoo;` -> `&foo;`) are not real decodes
    if decoded == entity || decoded.chars().count() > 2 {
        return None;
    }
    if decoded.contains([PLACEHOLDER_START, PLACEHOLDER_END]) {
        return None;
    }
    Some(decoded.into_owned())
}

fn push_canonical(out: &mut String, text: &str) {
    for ch in text.chars() {
        match canonical_name(ch) {
            Some(name) => {
                out.push(PLACEHOLDER_START);
                out.push_str(name);
                out.push(PLACEHOLDER_END);
            }
            None => out.push(ch),
        }
    }
}

fn canonical_name(ch: char) -> Option<&'static str> {
    match ch {
        '&' => Some("amp"),
        '<' => Some("lt"),
        '>' => Some("gt"),
        '\u{00A0}' => Some("nbsp"),
        _ => None,
    }
}

fn is_reserved(ch: char) -> bool {
    matches!(ch, '&' | '<' | '>' | '"' | '\'' | '\u{00A0}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<String> {
        vec![
            String::new(),
            "plain text".to_string(),
            "Fish & Chips < 3 > 2".to_string(),
            "a\u{00A0}b".to_string(),
            format!("{}copy{} 2024", PLACEHOLDER_START, PLACEHOLDER_END),
            placeholder("#109") + "ail",
            placeholder("amp") + "amp;",
            placeholder("bogus") + " stays",
            "„Hallo“ and «\u{202F}Bonjour\u{202F}»".to_string(),
            format!("{}nbsp{}{}quot{}x", '\u{E000}', '\u{E001}', '\u{E000}', '\u{E001}'),
            "stray \u{E000} delimiter".to_string(),
        ]
    }

    #[test]
    fn encode_after_decode_equals_encode() {
        for x in samples() {
            assert_eq!(encode(&decode(&x)), encode(&x), "input {x:?}");
        }
    }

    #[test]
    fn decode_after_encode_equals_decode() {
        for x in samples() {
            assert_eq!(decode(&encode(&x)), decode(&x), "input {x:?}");
        }
    }

    #[test]
    fn encode_is_idempotent() {
        for x in samples() {
            let once = encode(&x);
            assert_eq!(encode(&once), once);
        }
    }

    #[test]
    fn protect_and_restore_keep_entities_byte_exact() {
        let html = r#"<a href="?a=1&amp;b=2" title="&quot;x&quot;">&copy; &#109;&#x61;il &nbsp;</a>"#;
        let protected = protect(html);
        assert!(!protected.contains('&'));
        assert_eq!(restore(&protected), html);
    }

    #[test]
    fn protect_leaves_bare_ampersands() {
        assert_eq!(protect("Fish & Chips"), "Fish & Chips");
        assert_eq!(protect("&;"), "&;");
    }

    #[test]
    fn decode_resolves_known_and_keeps_unknown() {
        let text = format!("{} and {}", placeholder("uuml"), placeholder("nosuchthing"));
        assert_eq!(decode(&text), format!("ü and {}", placeholder("nosuchthing")));
    }

    #[test]
    fn encode_uses_canonical_names() {
        assert_eq!(
            encode("a & b\u{00A0}c"),
            format!("a {} b{}c", placeholder("amp"), placeholder("nbsp"))
        );
        assert_eq!(encode(&placeholder("#38")), placeholder("amp"));
        assert_eq!(encode(&placeholder("copy")), "©");
    }

    #[test]
    fn decode_markup_keeps_reserved_entities() {
        assert_eq!(
            decode_markup("&copy; &amp; &lt;b&gt; &nbsp; &#109; &quot;"),
            "© &amp; &lt;b&gt; &nbsp; m &quot;"
        );
        assert_eq!(decode_markup("&amp;copy;"), "&amp;copy;");
        assert_eq!(decode_markup("&#60;"), "&#60;");
    }
}
