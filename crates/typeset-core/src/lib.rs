pub mod autolink;
pub mod config;
pub mod dom;
pub mod email;
pub mod empty;
pub mod entities;
pub mod error;
pub mod links;
pub mod pipeline;
pub mod prefix;
pub mod processor;
pub mod quotes;
pub mod types;
pub mod widows;

pub use autolink::AutolinkOptions;
pub use config::ProcessorConfig;
pub use error::{Error, Result};
pub use links::{Link, LinkOptions};
pub use processor::{Processor, Typography};
pub use types::{LinkType, PipelineStats};
pub use widows::WidowOptions;

/// Start a processor for an HTML fragment.
pub fn process(html: impl Into<String>) -> Processor {
    Processor::new(html)
}
