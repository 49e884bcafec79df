use crate::dom::{self, Document};
use crate::entities;
use crate::quotes::style::NARROW_NBSP;
use crate::quotes::{find_candidates, pair, quote_targets, LocaleHandle, QuoteStyle};
use crate::types::QuoteRole;

/// Replace paired quotes in `text` with the glyphs of `style`.
pub fn localize(text: &str, style: &QuoteStyle) -> String {
    let pairs = pair(&find_candidates(text));
    let mut ranges: Vec<(usize, usize)> = Vec::with_capacity(pairs.len());
    for quote in &pairs {
        let mut start = quote.position;
        let mut end = quote.position + quote.len;
        // a narrow no-break space inside an existing pair belongs to the glyph
        match quote.role {
            QuoteRole::Open if text[end..].starts_with(NARROW_NBSP) => {
                end += NARROW_NBSP.len_utf8();
            }
            QuoteRole::Close if text[..start].ends_with(NARROW_NBSP) => {
                start -= NARROW_NBSP.len_utf8();
            }
            _ => {}
        }
        // a space already taken by the previous glyph stays with it
        if let Some(&(_, prev_end)) = ranges.last() {
            start = start.max(prev_end);
        }
        ranges.push((start, end));
    }

    let mut out = text.to_string();
    for (quote, (start, end)) in pairs.iter().zip(ranges).rev() {
        out.replace_range(start..end, style.glyph(quote.kind, quote.role));
    }
    out
}

#[derive(Debug, Clone)]
pub struct QuoteLocalizer {
    locale: LocaleHandle,
}

impl QuoteLocalizer {
    pub fn new(locale: LocaleHandle) -> Self {
        Self { locale }
    }

    pub fn run(&self, doc: &Document) {
        let locale = self.locale.get();
        let Some(style) = locale.style() else {
            log::trace!("no quote style for locale {}", locale.as_str());
            return;
        };
        for (node, decoded) in quote_targets(doc) {
            let localized = localize(&decoded, style);
            if localized != decoded {
                dom::set_text(&node, entities::encode(&localized));
            }
        }
    }
}
