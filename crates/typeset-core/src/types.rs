use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteKind {
    Single,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteRole {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    External,
    Mailto,
    Tel,
    Anchor,
    Invalid,
}

impl LinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Internal => "internal",
            LinkType::External => "external",
            LinkType::Mailto => "mailto",
            LinkType::Tel => "tel",
            LinkType::Anchor => "anchor",
            LinkType::Invalid => "invalid",
        }
    }
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub parses: usize,
    pub serializations: usize,
    pub services_run: usize,
}
