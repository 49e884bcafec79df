//! Quote pairing, localization and wrapping.

pub mod finder;
pub mod localizer;
pub mod pairer;
pub mod style;
pub mod wrapper;

use std::cell::RefCell;
use std::rc::Rc;

use kuchiki::NodeRef;

use crate::dom::{self, Document};
use crate::entities;

pub use finder::{find_candidates, QuoteCandidate};
pub use localizer::{localize, QuoteLocalizer};
pub use pairer::{pair, PairedQuote};
pub use style::{style_for, Locale, QuotePair, QuoteStyle};
pub use wrapper::{segments, unwrap, QuoteWrapper, Segment};

/// Locale shared between a processor and the services it registered.
///
/// Services read it when they run, so a locale set after registration
/// still applies.
#[derive(Debug, Clone)]
pub struct LocaleHandle(Rc<RefCell<Locale>>);

impl LocaleHandle {
    pub fn new(locale: Locale) -> Self {
        Self(Rc::new(RefCell::new(locale)))
    }

    pub fn get(&self) -> Locale {
        self.0.borrow().clone()
    }

    pub fn set(&self, locale: Locale) {
        *self.0.borrow_mut() = locale;
    }
}

/// Non-blank text nodes outside excluded containers, with their decoded text.
pub(crate) fn quote_targets(doc: &Document) -> Vec<(NodeRef, String)> {
    doc.text_nodes()
        .into_iter()
        .filter(|node| !dom::is_excluded(node))
        .filter_map(|node| {
            let value = dom::text_of(&node)?;
            if value.trim().is_empty() {
                return None;
            }
            let decoded = entities::decode(&value);
            Some((node, decoded))
        })
        .collect()
}
