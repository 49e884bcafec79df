//! Ordered execution of raw-text and document services around a single
//! parse/serialize cycle.

use crate::autolink::Autolinker;
use crate::dom::{self, Document};
use crate::email;
use crate::empty::EmptyElements;
use crate::entities;
use crate::error::Result;
use crate::links::LinkProcessor;
use crate::prefix::PrefixLinker;
use crate::quotes::{QuoteLocalizer, QuoteWrapper};
use crate::types::PipelineStats;
use crate::widows::WidowPreventer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    Autolinker,
    LinkProcessor,
    PrefixLinker,
    EmptyElements,
    QuoteLocalizer,
    QuoteWrapper,
    WidowPreventer,
    EmailEncoder,
}

#[derive(Debug, Clone)]
pub enum DocumentService {
    Autolinker(Autolinker),
    LinkProcessor(LinkProcessor),
    PrefixLinker(PrefixLinker),
    EmptyElements(EmptyElements),
    QuoteLocalizer(QuoteLocalizer),
    QuoteWrapper(QuoteWrapper),
    WidowPreventer(WidowPreventer),
}

impl DocumentService {
    pub fn id(&self) -> ServiceId {
        match self {
            DocumentService::Autolinker(_) => ServiceId::Autolinker,
            DocumentService::LinkProcessor(_) => ServiceId::LinkProcessor,
            DocumentService::PrefixLinker(_) => ServiceId::PrefixLinker,
            DocumentService::EmptyElements(_) => ServiceId::EmptyElements,
            DocumentService::QuoteLocalizer(_) => ServiceId::QuoteLocalizer,
            DocumentService::QuoteWrapper(_) => ServiceId::QuoteWrapper,
            DocumentService::WidowPreventer(_) => ServiceId::WidowPreventer,
        }
    }

    /// Lower runs first. Autolinking has to create the `<a>` elements
    /// before links are classified.
    pub fn priority(&self) -> i32 {
        match self {
            DocumentService::Autolinker(_) => -10,
            DocumentService::LinkProcessor(_) => 10,
            _ => 0,
        }
    }

    pub fn preserves_entities(&self) -> bool {
        false
    }

    pub fn run(&self, doc: &Document) {
        match self {
            DocumentService::Autolinker(s) => s.run(doc),
            DocumentService::LinkProcessor(s) => s.run(doc),
            DocumentService::PrefixLinker(s) => s.run(doc),
            DocumentService::EmptyElements(s) => s.run(doc),
            DocumentService::QuoteLocalizer(s) => s.run(doc),
            DocumentService::QuoteWrapper(s) => s.run(doc),
            DocumentService::WidowPreventer(s) => s.run(doc),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTextService {
    EmailEncoder,
}

impl RawTextService {
    pub fn id(&self) -> ServiceId {
        match self {
            RawTextService::EmailEncoder => ServiceId::EmailEncoder,
        }
    }

    pub fn priority(&self) -> i32 {
        0
    }

    /// Character references written by this service must reach the output.
    pub fn preserves_entities(&self) -> bool {
        match self {
            RawTextService::EmailEncoder => true,
        }
    }

    pub fn run(&self, html: &str) -> String {
        match self {
            RawTextService::EmailEncoder => email::encode_emails(html),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Service {
    Document(DocumentService),
    RawText(RawTextService),
}

impl Service {
    pub fn id(&self) -> ServiceId {
        match self {
            Service::Document(s) => s.id(),
            Service::RawText(s) => s.id(),
        }
    }

    pub fn priority(&self) -> i32 {
        match self {
            Service::Document(s) => s.priority(),
            Service::RawText(s) => s.priority(),
        }
    }

    pub fn preserves_entities(&self) -> bool {
        match self {
            Service::Document(s) => s.preserves_entities(),
            Service::RawText(s) => s.preserves_entities(),
        }
    }
}

impl From<DocumentService> for Service {
    fn from(service: DocumentService) -> Self {
        Service::Document(service)
    }
}

impl From<RawTextService> for Service {
    fn from(service: RawTextService) -> Self {
        Service::RawText(service)
    }
}

trait Queued {
    fn queue_id(&self) -> ServiceId;
    fn queue_priority(&self) -> i32;
}

impl Queued for DocumentService {
    fn queue_id(&self) -> ServiceId {
        self.id()
    }
    fn queue_priority(&self) -> i32 {
        self.priority()
    }
}

impl Queued for RawTextService {
    fn queue_id(&self) -> ServiceId {
        self.id()
    }
    fn queue_priority(&self) -> i32 {
        self.priority()
    }
}

/// Replace the entry with the same id in its slot, or append; then keep the
/// queue ordered by priority (stable, so registration order breaks ties).
fn enqueue<S: Queued>(queue: &mut Vec<S>, service: S) {
    match queue.iter_mut().find(|s| s.queue_id() == service.queue_id()) {
        Some(slot) => *slot = service,
        None => queue.push(service),
    }
    queue.sort_by_key(|s| s.queue_priority());
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    raw_text: Vec<RawTextService>,
    document: Vec<DocumentService>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, service: impl Into<Service>) {
        match service.into() {
            Service::Document(s) => enqueue(&mut self.document, s),
            Service::RawText(s) => enqueue(&mut self.raw_text, s),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw_text.is_empty() && self.document.is_empty()
    }

    pub fn len(&self) -> usize {
        self.raw_text.len() + self.document.len()
    }

    /// Registered ids in execution order, raw-text services first.
    pub fn ids(&self) -> Vec<ServiceId> {
        self.raw_text
            .iter()
            .map(RawTextService::id)
            .chain(self.document.iter().map(DocumentService::id))
            .collect()
    }

    pub fn prefix_linker(&self) -> Option<&PrefixLinker> {
        self.document.iter().find_map(|s| match s {
            DocumentService::PrefixLinker(linker) => Some(linker),
            _ => None,
        })
    }

    fn preserves_entities(&self) -> bool {
        self.raw_text.iter().any(RawTextService::preserves_entities)
            || self.document.iter().any(DocumentService::preserves_entities)
    }

    pub fn apply(&self, input: &str) -> Result<String> {
        self.apply_with_stats(input).map(|(out, _)| out)
    }

    pub fn apply_with_stats(&self, input: &str) -> Result<(String, PipelineStats)> {
        let mut stats = PipelineStats::default();
        if self.is_empty() {
            return Ok((input.to_string(), stats));
        }
        log::debug!(
            "running {} raw-text and {} document services",
            self.raw_text.len(),
            self.document.len()
        );
        let (parses_before, serializations_before) = dom::counters();

        let mut html = input.to_string();
        for service in &self.raw_text {
            log::trace!("raw-text service {:?}", service.id());
            html = service.run(&html);
            stats.services_run += 1;
        }

        if !self.document.is_empty() {
            let doc = Document::parse(&html);
            for service in &self.document {
                log::trace!("document service {:?}", service.id());
                service.run(&doc);
                stats.services_run += 1;
            }
            html = doc.serialize()?;
        }

        let (parses_after, serializations_after) = dom::counters();
        stats.parses = parses_after - parses_before;
        stats.serializations = serializations_after - serializations_before;

        if !self.preserves_entities() {
            html = entities::decode_markup(&html);
        }
        Ok((html, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autolink::AutolinkOptions;
    use crate::links::LinkOptions;
    use crate::widows::WidowOptions;

    #[test]
    fn empty_pipeline_returns_input() {
        let (out, stats) = Pipeline::new().apply_with_stats("<p>&copy; x</p>").unwrap();
        assert_eq!(out, "<p>&copy; x</p>");
        assert_eq!(stats, PipelineStats::default());
    }

    #[test]
    fn services_are_ordered_by_priority() {
        let mut pipeline = Pipeline::new();
        pipeline.register(DocumentService::LinkProcessor(LinkProcessor::new(
            LinkOptions::default(),
        )));
        pipeline.register(DocumentService::WidowPreventer(WidowPreventer::default()));
        pipeline.register(DocumentService::Autolinker(Autolinker::default()));
        pipeline.register(RawTextService::EmailEncoder);
        assert_eq!(
            pipeline.ids(),
            vec![
                ServiceId::EmailEncoder,
                ServiceId::Autolinker,
                ServiceId::WidowPreventer,
                ServiceId::LinkProcessor
            ]
        );
    }

    #[test]
    fn registering_again_replaces_in_place() {
        let mut pipeline = Pipeline::new();
        pipeline.register(DocumentService::WidowPreventer(WidowPreventer::default()));
        pipeline.register(DocumentService::QuoteWrapper(QuoteWrapper));
        pipeline.register(DocumentService::WidowPreventer(WidowPreventer::new(WidowOptions {
            min_words: 2,
            max_tail_length: 10,
        })));
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.ids(), vec![ServiceId::WidowPreventer, ServiceId::QuoteWrapper]);
    }

    #[test]
    fn one_parse_and_one_serialize_for_many_services() {
        let mut pipeline = Pipeline::new();
        pipeline.register(DocumentService::Autolinker(Autolinker::new(AutolinkOptions::default())));
        pipeline.register(DocumentService::QuoteWrapper(QuoteWrapper));
        pipeline.register(DocumentService::WidowPreventer(WidowPreventer::default()));
        pipeline.register(DocumentService::LinkProcessor(LinkProcessor::default()));
        let (_, stats) = pipeline
            .apply_with_stats("<p>\"quoted\" text at example.com for everyone</p>")
            .unwrap();
        assert_eq!(stats.parses, 1);
        assert_eq!(stats.serializations, 1);
        assert_eq!(stats.services_run, 4);
    }

    #[test]
    fn raw_text_only_skips_the_tree() {
        let mut pipeline = Pipeline::new();
        pipeline.register(RawTextService::EmailEncoder);
        let (out, stats) = pipeline.apply_with_stats("write to a@b.de").unwrap();
        assert_eq!((stats.parses, stats.serializations), (0, 0));
        assert!(out.contains("&#"));
    }

    #[test]
    fn output_is_decoded_unless_preserved() {
        let mut pipeline = Pipeline::new();
        pipeline.register(DocumentService::WidowPreventer(WidowPreventer::default()));
        assert_eq!(
            pipeline.apply("<p>&copy; &amp; one two three four</p>").unwrap(),
            "<p>© &amp; one two three&nbsp;four</p>"
        );
    }
}
