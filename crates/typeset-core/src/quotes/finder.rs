use crate::types::QuoteKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteCandidate {
    /// Byte offset into the scanned text.
    pub position: usize,
    /// Byte length of the quote glyph.
    pub len: usize,
    pub kind: QuoteKind,
    pub can_open: bool,
    pub can_close: bool,
}

pub fn quote_kind(ch: char) -> Option<QuoteKind> {
    match ch {
        '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2039}' | '\u{203A}' => {
            Some(QuoteKind::Single)
        }
        '"' | '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => {
            Some(QuoteKind::Double)
        }
        _ => None,
    }
}

/// Every quote-like character in `text` that could open or close a quotation.
///
/// Word-internal characters (letters on both sides, as in `don't`) are not
/// reported.
pub fn find_candidates(text: &str) -> Vec<QuoteCandidate> {
    let mut out = Vec::new();
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();
    while let Some((position, ch)) = chars.next() {
        if let Some(kind) = quote_kind(ch) {
            let next = chars.peek().map(|&(_, c)| c);
            let can_open = !prev.is_some_and(char::is_alphabetic);
            let can_close = !next.is_some_and(char::is_alphabetic);
            if can_open || can_close {
                out.push(QuoteCandidate {
                    position,
                    len: ch.len_utf8(),
                    kind,
                    can_open,
                    can_close,
                });
            }
        }
        prev = Some(ch);
    }
    out
}
