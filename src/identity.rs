//! Canonical agent naming.
//!
//! The alias table is canonical-only: every key maps to itself. Historical
//! shorthand ("mod", "reva") was removed once the dispatch surface became the
//! single source of truth for names, so resolution is a case fold plus a
//! lookup. Unknown names pass through unchanged; callers decide whether an
//! unknown identity is valid for their operation.

use std::{collections::BTreeMap, sync::OnceLock};

fn canonical_names() -> &'static BTreeMap<&'static str, &'static str> {
    static NAMES: OnceLock<BTreeMap<&'static str, &'static str>> = OnceLock::new();
    NAMES.get_or_init(|| {
        BTreeMap::from([
            ("moderator", "moderator"),
            ("reviewer_a", "reviewer_a"),
            ("reviewer_b", "reviewer_b"),
            ("summarizer", "summarizer"),
            ("echo", "echo"),
            ("observer", "observer"),
            ("test", "test"),
            ("arxiv_observer", "arxiv_observer"),
            ("pubmed_observer", "pubmed_observer"),
            ("video_manim", "video_manim"),
        ])
    })
}

/// Resolve a raw agent name to its canonical form.
pub fn resolve_agent_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let lowered = name.to_ascii_lowercase();
    match canonical_names().get(lowered.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => name.to_string(),
    }
}

/// Whether a name has a canonical entry.
pub fn is_canonical_name(name: &str) -> bool {
    canonical_names().contains_key(name.to_ascii_lowercase().as_str())
}

/// Split a CLI `--agents` argument into resolved names, preserving order and
/// dropping duplicates.
pub fn parse_agents_arg(raw: &str) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut agents = Vec::new();
    for token in raw.split([' ', ',']) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let resolved = resolve_agent_name(token);
        if seen.insert(resolved.clone()) {
            agents.push(resolved);
        }
    }
    agents
}
