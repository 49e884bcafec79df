//! Fluent registration API over [`Pipeline`].

use std::rc::Rc;

use crate::autolink::{AutolinkOptions, Autolinker};
use crate::empty::EmptyElements;
use crate::error::{Error, Result};
use crate::links::{Link, LinkOptions, LinkProcessor};
use crate::pipeline::{DocumentService, Pipeline, RawTextService};
use crate::quotes::{Locale, LocaleHandle, QuoteLocalizer, QuoteWrapper};
use crate::types::PipelineStats;
use crate::widows::{WidowOptions, WidowPreventer};

/// Typography choices made inside [`Processor::typography`].
pub struct Typography {
    locale: LocaleHandle,
    localize_quotes: bool,
    wrap_quotes: bool,
    widows: Option<WidowOptions>,
    error: Option<Error>,
}

impl Typography {
    pub fn localize_quotes(&mut self) -> &mut Self {
        self.localize_quotes = true;
        self
    }

    /// Wrap paired quotations in `<q>` elements.
    pub fn wrap_quotes(&mut self) -> &mut Self {
        self.wrap_quotes = true;
        self
    }

    pub fn prevent_widows(&mut self) -> &mut Self {
        self.prevent_widows_with(WidowOptions::default())
    }

    pub fn prevent_widows_with(&mut self, options: WidowOptions) -> &mut Self {
        self.widows = Some(options);
        self
    }

    pub fn set_locale(&mut self, locale: &str) -> &mut Self {
        match Locale::parse(locale) {
            Ok(locale) => self.locale.set(locale),
            Err(e) => self.error = Some(e),
        }
        self
    }

    fn nothing_chosen(&self) -> bool {
        !self.localize_quotes && !self.wrap_quotes && self.widows.is_none()
    }
}

/// An HTML fragment plus the services to run over it.
#[derive(Debug, Clone)]
pub struct Processor {
    input: String,
    pipeline: Pipeline,
    locale: Option<LocaleHandle>,
}

impl Processor {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            input: html.into(),
            pipeline: Pipeline::new(),
            locale: None,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Current typography locale, if one was set.
    pub fn locale(&self) -> Option<Locale> {
        self.locale.as_ref().map(LocaleHandle::get)
    }

    fn locale_handle(&mut self, locale: Locale) -> LocaleHandle {
        match &self.locale {
            Some(handle) => {
                handle.set(locale);
                handle.clone()
            }
            None => {
                let handle = LocaleHandle::new(locale);
                self.locale = Some(handle.clone());
                handle
            }
        }
    }

    /// Register typography services for `locale`. Without any choice in
    /// `configure`, quotes are localized and widows prevented.
    pub fn typography<F>(mut self, locale: &str, configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Typography),
    {
        let locale = Locale::parse(locale)?;
        let handle = self.locale_handle(locale);
        let mut typo = Typography {
            locale: handle.clone(),
            localize_quotes: false,
            wrap_quotes: false,
            widows: None,
            error: None,
        };
        configure(&mut typo);
        if let Some(e) = typo.error {
            return Err(e);
        }
        if typo.nothing_chosen() {
            typo.localize_quotes().prevent_widows();
        }

        if typo.localize_quotes {
            self.pipeline
                .register(DocumentService::QuoteLocalizer(QuoteLocalizer::new(handle)));
        }
        if typo.wrap_quotes {
            self.pipeline
                .register(DocumentService::QuoteWrapper(QuoteWrapper));
        }
        if let Some(options) = typo.widows {
            self.pipeline
                .register(DocumentService::WidowPreventer(WidowPreventer::new(options)));
        }
        Ok(self)
    }

    /// Change the typography locale. Takes effect for services already
    /// registered.
    pub fn set_locale(mut self, locale: &str) -> Result<Self> {
        let locale = Locale::parse(locale)?;
        self.locale_handle(locale);
        Ok(self)
    }

    pub fn autolink(mut self, options: AutolinkOptions) -> Self {
        self.pipeline
            .register(DocumentService::Autolinker(Autolinker::new(options)));
        self
    }

    /// Link words starting with `prefix` to `url`. Repeated calls add to the
    /// same linker.
    pub fn autolink_prefix(mut self, prefix: &str, url: &str) -> Result<Self> {
        let mut linker = self.pipeline.prefix_linker().cloned().unwrap_or_default();
        linker.register(prefix, url)?;
        self.pipeline
            .register(DocumentService::PrefixLinker(linker));
        Ok(self)
    }

    /// Classify links and add the default classes.
    pub fn process_links(mut self, options: LinkOptions) -> Self {
        self.pipeline
            .register(DocumentService::LinkProcessor(LinkProcessor::new(options)));
        self
    }

    /// Classify links and hand each one to `callback` instead of adding the
    /// default classes.
    pub fn process_links_with<F>(mut self, options: LinkOptions, callback: F) -> Self
    where
        F: Fn(&Link) + 'static,
    {
        let processor = LinkProcessor::with_callback(options, Rc::new(callback));
        self.pipeline
            .register(DocumentService::LinkProcessor(processor));
        self
    }

    /// Remove elements matching `selector` (default `p`) that contain only
    /// whitespace.
    pub fn remove_empty_elements(mut self, selector: Option<&str>) -> Result<Self> {
        let service = EmptyElements::new(selector)?;
        self.pipeline
            .register(DocumentService::EmptyElements(service));
        Ok(self)
    }

    pub fn encode_emails(mut self) -> Self {
        self.pipeline.register(RawTextService::EmailEncoder);
        self
    }

    pub fn apply(&self) -> Result<String> {
        self.pipeline.apply(&self.input)
    }

    pub fn apply_with_stats(&self) -> Result<(String, PipelineStats)> {
        self.pipeline.apply_with_stats(&self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ServiceId;

    #[test]
    fn typography_defaults() {
        let p = Processor::new("x").typography("de", |_| {}).unwrap();
        assert_eq!(
            p.pipeline().ids(),
            vec![ServiceId::QuoteLocalizer, ServiceId::WidowPreventer]
        );
    }

    #[test]
    fn typography_choice() {
        let p = Processor::new("x")
            .typography("en", |t| {
                t.wrap_quotes();
            })
            .unwrap();
        assert_eq!(p.pipeline().ids(), vec![ServiceId::QuoteWrapper]);
    }

    #[test]
    fn invalid_locale_fails_at_registration() {
        assert!(matches!(
            Processor::new("x").typography("not a locale", |_| {}),
            Err(Error::InvalidLocale(_))
        ));
        assert!(matches!(
            Processor::new("x").typography("de", |t| {
                t.set_locale("d");
            }),
            Err(Error::InvalidLocale(_))
        ));
        assert!(Processor::new("x").set_locale("???").is_err());
    }

    #[test]
    fn prefix_entries_accumulate_in_one_service() {
        let p = Processor::new("x")
            .autolink_prefix("@", "https://a.social/@")
            .unwrap()
            .autolink_prefix("#", "https://a.social/tags")
            .unwrap();
        assert_eq!(p.pipeline().len(), 1);
        assert_eq!(p.pipeline().prefix_linker().map(|l| l.entries().len()), Some(2));
    }

    #[test]
    fn locale_can_be_set_late() {
        let p = Processor::new("<p>\"Hallo\"</p>")
            .typography("en", |t| {
                t.localize_quotes();
            })
            .unwrap()
            .set_locale("de_DE")
            .unwrap();
        assert_eq!(p.locale().map(|l| l.language()), Some("de".to_string()));
        assert_eq!(p.apply().unwrap(), "<p>\u{201E}Hallo\u{201C}</p>");
    }
}
