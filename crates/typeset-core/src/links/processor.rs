use std::fmt;
use std::rc::Rc;

use kuchiki::NodeRef;
use serde::{Deserialize, Serialize};

use crate::dom::Document;
use crate::entities;
use crate::links::{classify, extension, is_file_extension};
use crate::types::LinkType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinkOptions {
    /// Host of the site the HTML is rendered on: `example.com`,
    /// `example.com:8080` or `https://example.com`.
    pub current_host: Option<String>,
    pub class_prefix: String,
    pub open_external_in_new_tab: bool,
    /// Add `rel="noopener noreferrer"` to links opened in a new tab.
    pub safe: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            current_host: None,
            class_prefix: "link".to_string(),
            open_external_in_new_tab: false,
            safe: true,
        }
    }
}

/// An `a[href]` element with its classification.
pub struct Link {
    element: NodeRef,
    pub href: String,
    pub kind: LinkType,
    pub extension: Option<String>,
}

impl Link {
    fn new(element: NodeRef, href: String, current_host: Option<&str>) -> Self {
        let kind = classify(&href, current_host);
        let extension = extension(&href);
        Self {
            element,
            href,
            kind,
            extension,
        }
    }

    pub fn element(&self) -> &NodeRef {
        &self.element
    }

    pub fn is_file(&self) -> bool {
        self.extension.as_deref().is_some_and(is_file_extension)
    }

    /// Add `{prefix}--{kind}`, `{prefix}--file` and `{prefix}--ext--{ext}`.
    /// The prefix defaults to `link`.
    pub fn add_classes(&self, prefix: Option<&str>) -> &Self {
        let prefix = prefix.unwrap_or("link");
        let mut classes = vec![format!("{prefix}--{}", self.kind.as_str())];
        if self.is_file() {
            classes.push(format!("{prefix}--file"));
        }
        if let Some(ext) = &self.extension {
            classes.push(format!("{prefix}--ext--{ext}"));
        }
        self.add_class_names(&classes);
        self
    }

    /// Give external links `target="_blank"`, plus
    /// `rel="noopener noreferrer"` when `safe`.
    pub fn open_external_in_new_tab(&self, safe: bool) -> &Self {
        if self.kind != LinkType::External {
            return self;
        }
        self.set_attribute("target", "_blank");
        if safe {
            self.set_attribute("rel", "noopener noreferrer");
        }
        self
    }

    pub fn set_attribute(&self, name: &str, value: &str) -> &Self {
        if let Some(el) = self.element.as_element() {
            el.attributes
                .borrow_mut()
                .insert(name, entities::encode(value));
        }
        self
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        let el = self.element.as_element()?;
        let attrs = el.attributes.borrow();
        attrs.get(name).map(entities::decode)
    }

    fn add_class_names(&self, names: &[String]) {
        let mut classes: Vec<String> = self
            .attribute("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        for name in names {
            if !classes.contains(name) {
                classes.push(name.clone());
            }
        }
        self.set_attribute("class", &classes.join(" "));
    }
}

pub type LinkCallback = Rc<dyn Fn(&Link)>;

/// Classifies every `a[href]` and tags it, either with the default classes or
/// through a caller-supplied callback.
#[derive(Clone, Default)]
pub struct LinkProcessor {
    options: LinkOptions,
    callback: Option<LinkCallback>,
}

impl fmt::Debug for LinkProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkProcessor")
            .field("options", &self.options)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl LinkProcessor {
    pub fn new(options: LinkOptions) -> Self {
        Self {
            options,
            callback: None,
        }
    }

    pub fn with_callback(options: LinkOptions, callback: LinkCallback) -> Self {
        Self {
            options,
            callback: Some(callback),
        }
    }

    pub fn run(&self, doc: &Document) {
        let Some(anchors) = doc.select("a[href]") else {
            return;
        };
        let current_host = self.options.current_host.as_deref();
        for element in anchors {
            let Some(href) = element
                .as_element()
                .and_then(|el| el.attributes.borrow().get("href").map(entities::decode))
            else {
                continue;
            };
            let href = href.trim().to_string();
            if href.is_empty() {
                continue;
            }
            let link = Link::new(element, href, current_host);
            match &self.callback {
                Some(callback) => callback(&link),
                None => self.apply_defaults(&link),
            }
        }
    }

    fn apply_defaults(&self, link: &Link) {
        link.add_classes(Some(&self.options.class_prefix));
        if self.options.open_external_in_new_tab {
            link.open_external_in_new_tab(self.options.safe);
        }
    }
}
