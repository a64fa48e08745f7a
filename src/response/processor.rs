//! Response post-processing.
//!
//! After an agent run finishes, its text is normalized against the section
//! contract, its mentions are extracted and policy-filtered, a neutralized
//! copy is prepared for posting, and every allowed mention is routed through
//! the dispatch router. Filtering and dispatch failures never propagate:
//! the processed response is always usable.

use tracing::{info, warn};

use crate::{
    dispatch::{ports::DispatchOutcome, router::DispatchRouter},
    mention::{
        extract::{extract_mentions, mention_names, neutralize_mentions},
        policy::{MentionPolicy, filter_mentions},
    },
    response::normalizer::normalize_agent_output,
};

/// Everything the caller may want to know about one processed response.
#[derive(Debug, Clone)]
pub struct ProcessedResponse {
    pub agent: String,
    /// Normalized text (identical to the raw text when normalization did not
    /// apply).
    pub response: String,
    pub raw_response: String,
    /// Normalized text with every mention rewritten to the neutral form.
    pub clean_response: String,
    pub mentions: Vec<String>,
    pub allowed_mentions: Vec<String>,
    pub filtered_mentions: Vec<String>,
    pub dispatch_outcomes: Vec<DispatchOutcome>,
    pub format_warnings: Vec<String>,
}

pub struct ResponseProcessor {
    policy: MentionPolicy,
    router: DispatchRouter,
}

impl ResponseProcessor {
    pub fn new(policy: MentionPolicy, router: DispatchRouter) -> Self {
        Self { policy, router }
    }

    /// Process one agent response against a thread. `auto_dispatch` gates the
    /// trigger step; extraction and cleaning always run.
    pub async fn process(
        &self,
        agent: &str,
        response: &str,
        issue: u64,
        title: &str,
        body: &str,
        auto_dispatch: bool,
    ) -> ProcessedResponse {
        let (normalized, format_warnings) = normalize_agent_output(response, agent);
        if !format_warnings.is_empty() {
            warn!(
                agent = %agent,
                warnings = %format_warnings.join("; "),
                "response format warnings"
            );
        }

        let mentions = mention_names(&normalized);
        let clean_response = neutralize_mentions(&normalized);

        let mut processed = ProcessedResponse {
            agent: agent.to_string(),
            response: normalized.clone(),
            raw_response: response.to_string(),
            clean_response,
            mentions: mentions.clone(),
            allowed_mentions: Vec::new(),
            filtered_mentions: Vec::new(),
            dispatch_outcomes: Vec::new(),
            format_warnings,
        };

        if !auto_dispatch || mentions.is_empty() {
            return processed;
        }

        let decision = filter_mentions(extract_mentions(&normalized), &self.policy, Some(issue));
        processed.allowed_mentions = decision.allowed_names();
        processed.filtered_mentions = decision.filtered_names();

        if !processed.filtered_mentions.is_empty() {
            info!(
                agent = %agent,
                filtered = %processed.filtered_mentions.join(", "),
                "mentions filtered by policy"
            );
        }

        for target in &processed.allowed_mentions {
            let outcome = self.router.dispatch(target, issue, title, body).await;
            processed.dispatch_outcomes.push(outcome);
        }

        processed
    }
}
