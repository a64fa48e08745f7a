//! Mention lexing.
//!
//! A mention is `@` followed by alphanumerics, underscores, or hyphens.
//! Extraction deduplicates by name while preserving first-occurrence order;
//! the recorded span is the first occurrence. Neutralization rewrites every
//! occurrence to the `用户 <id>` form, which carries no `@` and therefore can
//! never be re-extracted.

use std::{collections::BTreeSet, sync::OnceLock};

use regex::Regex;

fn mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@([A-Za-z0-9_-]+)").expect("mention pattern is valid"))
}

/// An extracted identifier and the byte span of its first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Extract mentions in first-occurrence order, deduplicated by name.
pub fn extract_mentions(text: &str) -> Vec<Mention> {
    let mut seen = BTreeSet::new();
    let mut mentions = Vec::new();
    for captures in mention_re().captures_iter(text) {
        let full = captures.get(0).expect("capture 0 always present");
        let name = &captures[1];
        if seen.insert(name.to_string()) {
            mentions.push(Mention {
                name: name.to_string(),
                start: full.start(),
                end: full.end(),
            });
        }
    }
    mentions
}

/// Extracted mention names only, same order as [`extract_mentions`].
pub fn mention_names(text: &str) -> Vec<String> {
    extract_mentions(text)
        .into_iter()
        .map(|mention| mention.name)
        .collect()
}

pub fn has_mentions(text: &str) -> bool {
    mention_re().is_match(text)
}

/// Rewrite every `@id` to the neutral `用户 id` form.
pub fn neutralize_mentions(text: &str) -> String {
    mention_re().replace_all(text, "用户 $1").into_owned()
}
