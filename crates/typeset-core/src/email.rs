//! Email address obfuscation on raw markup.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// Address pattern after John Gruber's Markdown.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r##"(?xi)
        (?:mailto:)?
        (?:
            [-!\#$%&*+/=?^_`.{|}~\w]+
        |
            "[^"<>]*"
        )
        @
        (?:
            [-a-z0-9\x{80}-\x{10FFFF}]+(?:\.[-a-z0-9\x{80}-\x{10FFFF}]+)*\.[a-z]+
        |
            \[[\d.a-f:]+\]
        )
        "##,
    )
    .expect("valid email pattern")
});

/// Rewrite every email address in `html` as a mix of plain characters and
/// decimal or hexadecimal character references.
pub fn encode_emails(html: &str) -> String {
    if !html.contains('@') {
        return html.to_string();
    }
    EMAIL_RE
        .replace_all(html, |caps: &Captures| encode_address(&caps[0]))
        .into_owned()
}

/// The choice per character follows a sequence seeded from the address, so
/// the same address always encodes the same way. `@` and `.` are never left
/// plain.
fn encode_address(address: &str) -> String {
    let len = address.chars().count().max(1) as u64;
    let seed = u64::from(crc32fast::hash(address.as_bytes())) / len;
    let mut out = String::with_capacity(address.len() * 5);
    for (i, ch) in address.chars().enumerate() {
        if !ch.is_ascii() {
            out.push(ch);
            continue;
        }
        let r = seed.wrapping_mul(1 + i as u64) % 100;
        if r > 60 && ch != '@' && ch != '.' {
            out.push(ch);
        } else if r < 45 {
            out.push_str(&format!("&#x{:x};", ch as u32));
        } else {
            out.push_str(&format!("&#{};", ch as u32));
        }
    }
    out
}
