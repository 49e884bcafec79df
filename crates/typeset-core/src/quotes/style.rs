use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::types::{QuoteKind, QuoteRole};

pub(crate) const NARROW_NBSP: char = '\u{202F}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePair {
    pub opening: &'static str,
    pub closing: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteStyle {
    pub lang: &'static str,
    pub single: QuotePair,
    pub double: QuotePair,
}

impl QuoteStyle {
    pub fn glyph(&self, kind: QuoteKind, role: QuoteRole) -> &'static str {
        let pair = match kind {
            QuoteKind::Single => self.single,
            QuoteKind::Double => self.double,
        };
        match role {
            QuoteRole::Open => pair.opening,
            QuoteRole::Close => pair.closing,
        }
    }
}

const fn pair(opening: &'static str, closing: &'static str) -> QuotePair {
    QuotePair { opening, closing }
}

static STYLES: &[QuoteStyle] = &[
    QuoteStyle {
        lang: "en",
        single: pair("\u{2018}", "\u{2019}"),
        double: pair("\u{201C}", "\u{201D}"),
    },
    QuoteStyle {
        lang: "de",
        single: pair("\u{201A}", "\u{2018}"),
        double: pair("\u{201E}", "\u{201C}"),
    },
    QuoteStyle {
        lang: "fr",
        single: pair("\u{2039}\u{202F}", "\u{202F}\u{203A}"),
        double: pair("\u{00AB}\u{202F}", "\u{202F}\u{00BB}"),
    },
    QuoteStyle {
        lang: "es",
        single: pair("\u{201E}", "\u{201C}"),
        double: pair("\u{00AB}", "\u{00BB}"),
    },
];

pub fn style_for(lang: &str) -> Option<&'static QuoteStyle> {
    STYLES.iter().find(|s| s.lang == lang)
}

static LOCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2}([_-][A-Za-z0-9]+)*$").expect("valid locale pattern"));

/// A validated locale tag such as `de`, `de_DE` or `de-DE-formal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    tag: String,
}

impl Locale {
    pub fn parse(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        if !LOCALE_RE.is_match(tag) {
            return Err(Error::InvalidLocale(tag.to_string()));
        }
        Ok(Self {
            tag: tag.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.tag
    }

    /// Lowercased two-letter language code.
    pub fn language(&self) -> String {
        self.tag[..2].to_ascii_lowercase()
    }

    pub fn style(&self) -> Option<&'static QuoteStyle> {
        style_for(&self.language())
    }
}
