use crate::dom::Document;
use crate::entities;
use crate::error::{Error, Result};

pub const DEFAULT_SELECTOR: &str = "p";

/// Removes matched elements that hold nothing but whitespace text.
#[derive(Debug, Clone)]
pub struct EmptyElements {
    selector: String,
}

impl EmptyElements {
    pub fn new(selector: Option<&str>) -> Result<Self> {
        let selector = selector.unwrap_or(DEFAULT_SELECTOR).trim();
        if kuchiki::Selectors::compile(selector).is_err() {
            return Err(Error::InvalidSelector(selector.to_string()));
        }
        Ok(Self {
            selector: selector.to_string(),
        })
    }

    pub fn run(&self, doc: &Document) {
        let Some(elements) = doc.select(&self.selector) else {
            return;
        };
        for element in elements {
            let blank = element.children().all(|child| {
                child
                    .as_text()
                    .is_some_and(|t| entities::decode(&t.borrow()).trim().is_empty())
            });
            if blank {
                element.detach();
            }
        }
    }
}
