use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::autolink::AutolinkOptions;
use crate::error::Result;
use crate::links::LinkOptions;
use crate::prefix::PrefixEntry;
use crate::processor::Processor;
use crate::widows::WidowOptions;

pub const QUALIFIER: &str = "com";
pub const ORGANIZATION: &str = "typeset";
pub const APPLICATION: &str = "typeset";

pub const DEFAULT_LOCALE: &str = "en";

pub fn config_root() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).map(|p| p.config_dir().to_path_buf())
}

pub fn default_config_path() -> Option<PathBuf> {
    config_root().map(|root| root.join("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TypographyConfig {
    pub localize_quotes: bool,
    pub wrap_quotes: bool,
    pub prevent_widows: bool,
    pub widows: WidowOptions,
}

/// Pipeline configuration as read from a TOML or JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessorConfig {
    pub locale: Option<String>,
    pub typography: Option<TypographyConfig>,
    pub links: Option<LinkOptions>,
    pub autolink: Option<AutolinkOptions>,
    pub prefixes: Vec<PrefixEntry>,
    pub remove_empty: Option<String>,
    pub encode_emails: bool,
}

impl ProcessorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a `.json` file as JSON and anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }

    /// Built-in defaults: localized quotes and widow prevention in English.
    pub fn standard() -> Self {
        Self {
            locale: Some(DEFAULT_LOCALE.to_string()),
            typography: Some(TypographyConfig::default()),
            ..Self::default()
        }
    }

    /// Register the configured services on `processor`.
    pub fn apply_to(&self, mut processor: Processor) -> Result<Processor> {
        if let Some(options) = self.autolink {
            processor = processor.autolink(options);
        }
        if let Some(typo) = &self.typography {
            let locale = self.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
            processor = processor.typography(locale, |t| {
                if typo.localize_quotes {
                    t.localize_quotes();
                }
                if typo.wrap_quotes {
                    t.wrap_quotes();
                }
                if typo.prevent_widows {
                    t.prevent_widows_with(typo.widows);
                }
            })?;
        } else if let Some(locale) = &self.locale {
            processor = processor.set_locale(locale)?;
        }
        for entry in &self.prefixes {
            processor = processor.autolink_prefix(&entry.prefix, &entry.url)?;
        }
        if let Some(links) = &self.links {
            processor = processor.process_links(links.clone());
        }
        if let Some(selector) = &self.remove_empty {
            processor = processor.remove_empty_elements(Some(selector))?;
        }
        if self.encode_emails {
            processor = processor.encode_emails();
        }
        Ok(processor)
    }
}
