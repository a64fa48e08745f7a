//! Structured response blocks.
//!
//! Agents are asked to end their responses with a fenced `yaml` block. The
//! upstream text is unreliable, so parsing is tagged rather than implicit:
//! a response either carries a well-formed block ([`ParsedBlock::Structured`]),
//! carries no fence at all ([`ParsedBlock::Unstructured`]), or carries a fence
//! that does not parse ([`ParsedBlock::Malformed`]). Consumers match on the
//! tag; a malformed block is treated as absent, never as an error.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

fn yaml_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?si)```yaml(.*?)```").expect("yaml fence pattern is valid")
    })
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s)\]>"'`]+"#).expect("url pattern is valid"))
}

/// Confidence level carried by a structured block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    /// Parse leniently; anything unrecognized is the default.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            "medium" => Self::Medium,
            _ => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// One entry of a researcher `evidence` list. Upstream sometimes emits full
/// records, sometimes bare strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EvidenceItem {
    Detailed {
        #[serde(default)]
        claim: String,
        #[serde(default)]
        source: String,
        #[serde(default)]
        url: String,
        #[serde(default)]
        confidence: String,
    },
    Text(String),
}

/// The recognized keys of a structured block. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReviewBlock {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<EvidenceItem>,
    #[serde(default)]
    pub open_questions: Vec<String>,
    #[serde(default)]
    pub confidence: String,
}

impl ReviewBlock {
    pub fn confidence_level(&self) -> Confidence {
        Confidence::parse(&self.confidence)
    }

    pub fn has_evidence(&self) -> bool {
        !self.evidence.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBlock {
    Structured(ReviewBlock),
    Unstructured,
    Malformed,
}

impl ParsedBlock {
    pub fn structured(&self) -> Option<&ReviewBlock> {
        match self {
            Self::Structured(block) => Some(block),
            _ => None,
        }
    }
}

/// The inner text of the first fenced `yaml` block, if any.
pub fn extract_fenced_yaml(text: &str) -> Option<&str> {
    yaml_fence_re()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|inner| inner.as_str().trim())
}

/// Classify a response's trailing structured block.
pub fn parse_review_block(text: &str) -> ParsedBlock {
    let Some(inner) = extract_fenced_yaml(text) else {
        return ParsedBlock::Unstructured;
    };
    match serde_yaml::from_str::<ReviewBlock>(inner) {
        Ok(block) => ParsedBlock::Structured(block),
        Err(_) => ParsedBlock::Malformed,
    }
}

/// Source URLs for the Judge gate.
///
/// A structured block with a nonempty `sources` list wins outright; links
/// elsewhere in the text are ignored in that case. Otherwise every bare link
/// in the narrative counts, deduplicated in order of appearance.
pub fn collect_source_urls(text: &str) -> Vec<String> {
    if let ParsedBlock::Structured(block) = parse_review_block(text) {
        if !block.sources.is_empty() {
            return block.sources;
        }
    }

    let mut seen = std::collections::BTreeSet::new();
    let mut urls = Vec::new();
    for found in url_re().find_iter(text) {
        let url = found.as_str().trim_end_matches(['.', ',', ';']).to_string();
        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }
    urls
}
