//! Mention policy.
//!
//! The filter partitions extracted mentions into allowed and filtered sets.
//! It never invents identifiers: every output mention came from the input,
//! and each input mention lands in exactly one side.

use serde::{Deserialize, Serialize};

use crate::mention::extract::Mention;

fn default_true() -> bool {
    true
}

fn default_max_per_response() -> usize {
    5
}

/// Deny rules consulted when deciding which mentions may trigger agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionPolicy {
    /// Master switch. Disabled means every mention is filtered.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Rate cap: mentions past this count in one response are filtered.
    #[serde(default = "default_max_per_response")]
    pub max_per_response: usize,
    /// Identifiers denied by name, case-insensitive.
    #[serde(default)]
    pub denied_names: Vec<String>,
    /// Threads on which mention dispatch is suspended entirely.
    #[serde(default)]
    pub denied_issues: Vec<u64>,
}

impl Default for MentionPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_per_response: default_max_per_response(),
            denied_names: Vec::new(),
            denied_issues: Vec::new(),
        }
    }
}

impl MentionPolicy {
    fn denies_name(&self, name: &str) -> bool {
        self.denied_names
            .iter()
            .any(|denied| denied.eq_ignore_ascii_case(name))
    }

    fn denies_issue(&self, issue: Option<u64>) -> bool {
        match issue {
            Some(number) => self.denied_issues.contains(&number),
            None => false,
        }
    }
}

/// The partition produced by [`filter_mentions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionDecision {
    pub allowed: Vec<Mention>,
    pub filtered: Vec<Mention>,
}

impl MentionDecision {
    pub fn allowed_names(&self) -> Vec<String> {
        self.allowed.iter().map(|m| m.name.clone()).collect()
    }

    pub fn filtered_names(&self) -> Vec<String> {
        self.filtered.iter().map(|m| m.name.clone()).collect()
    }
}

/// Partition `mentions` under `policy` for the given thread.
pub fn filter_mentions(
    mentions: Vec<Mention>,
    policy: &MentionPolicy,
    issue: Option<u64>,
) -> MentionDecision {
    let mut decision = MentionDecision::default();

    if !policy.enabled || policy.denies_issue(issue) {
        decision.filtered = mentions;
        return decision;
    }

    for mention in mentions {
        if policy.denies_name(&mention.name) {
            decision.filtered.push(mention);
        } else if decision.allowed.len() >= policy.max_per_response {
            decision.filtered.push(mention);
        } else {
            decision.allowed.push(mention);
        }
    }

    decision
}
