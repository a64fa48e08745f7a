//! Response normalization.
//!
//! Agents are asked to structure their replies as four markdown sections plus
//! a trailing YAML block. Normalization is opt-in: text that never opens the
//! contract (no `## Summary`) passes through untouched. Text that opens it
//! but leaves sections out is returned unrepaired with a warning; partial
//! structure is not worth guessing about. Fully markered text is re-emitted
//! in a deterministic shape: same logical content always produces the same
//! bytes, whatever the author's formatting habits were.

use std::sync::OnceLock;

use regex::Regex;

use crate::{
    mention::extract::neutralize_mentions,
    response::block::{Confidence, extract_fenced_yaml},
};

pub const SUMMARY_MARKER: &str = "## Summary";
pub const FINDINGS_MARKER: &str = "## Key Findings";
pub const ACTIONS_MARKER: &str = "## Recommended Actions";
pub const YAML_MARKER: &str = "## Structured (YAML)";

const SUMMARY_BUDGET: usize = 20;
const FINDING_BUDGET: usize = 25;
const ACTION_BUDGET: usize = 30;
const MAX_FINDINGS: usize = 3;
const MAX_ACTIONS: usize = 2;

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[-*]\s+(.*)").expect("bullet pattern is valid"))
}

/// Collapse runs of whitespace and cut to a character budget.
fn collapse_and_cut(text: &str, budget: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if budget == 0 {
        return String::new();
    }
    if collapsed.chars().count() <= budget {
        return collapsed;
    }
    collapsed.chars().take(budget).collect()
}

fn bullet_items(section: &str) -> Vec<String> {
    section
        .lines()
        .filter_map(|line| {
            bullet_re()
                .captures(line)
                .map(|captures| captures[1].trim().to_string())
        })
        .collect()
}

fn yaml_escape(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Confidence from the YAML section's embedded block, defaulting to medium
/// when absent, malformed, or out of range.
fn section_confidence(yaml_section: &str) -> Confidence {
    let Some(inner) = extract_fenced_yaml(yaml_section) else {
        return Confidence::Medium;
    };
    let Ok(value) = serde_yaml::from_str::<serde_yaml::Value>(inner) else {
        return Confidence::Medium;
    };
    let Some(raw) = value.get("confidence").and_then(|v| v.as_str()) else {
        return Confidence::Medium;
    };
    match raw.to_ascii_lowercase().as_str() {
        "high" => Confidence::High,
        "medium" => Confidence::Medium,
        "low" => Confidence::Low,
        _ => Confidence::Medium,
    }
}

/// Normalize one agent response against the section contract.
///
/// Returns the (possibly rewritten) text and the format warnings gathered
/// along the way. Warnings never block: the text half of the pair is always
/// usable as-is.
pub fn normalize_agent_output(response: &str, agent: &str) -> (String, Vec<String>) {
    let mut warnings = Vec::new();

    if !response.contains(SUMMARY_MARKER) {
        return (response.to_string(), warnings);
    }

    let markers = [SUMMARY_MARKER, FINDINGS_MARKER, ACTIONS_MARKER, YAML_MARKER];
    let positions: Vec<Option<usize>> = markers.iter().map(|m| response.find(m)).collect();

    let missing: Vec<&str> = markers
        .iter()
        .zip(&positions)
        .filter(|(_, pos)| pos.is_none())
        .map(|(marker, _)| *marker)
        .collect();
    if !missing.is_empty() {
        warnings.push(format!("Missing sections: {}", missing.join(", ")));
        return (response.to_string(), warnings);
    }

    let at: Vec<usize> = positions.into_iter().map(|p| p.expect("checked")).collect();
    if !(at[0] < at[1] && at[1] < at[2] && at[2] < at[3]) {
        warnings.push("Sections out of order".to_string());
        return (response.to_string(), warnings);
    }

    let summary_block = response[at[0] + SUMMARY_MARKER.len()..at[1]].trim();
    let findings_block = response[at[1] + FINDINGS_MARKER.len()..at[2]].trim();
    let actions_block = response[at[2] + ACTIONS_MARKER.len()..at[3]].trim();
    let yaml_section = response[at[3] + YAML_MARKER.len()..].trim();

    let mut summary_line = summary_block
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .to_string();
    if summary_line.is_empty() {
        warnings.push("Summary is empty".to_string());
    }
    summary_line = collapse_and_cut(&neutralize_mentions(&summary_line), SUMMARY_BUDGET);

    let raw_findings = bullet_items(findings_block);
    if raw_findings.is_empty() {
        warnings.push("Key Findings missing bullets".to_string());
    }
    let findings: Vec<String> = raw_findings
        .iter()
        .take(MAX_FINDINGS)
        .map(|item| collapse_and_cut(&neutralize_mentions(item), FINDING_BUDGET))
        .collect();
    if findings.len() < MAX_FINDINGS {
        warnings.push("Key Findings fewer than 3 bullets".to_string());
    }

    let raw_actions = bullet_items(actions_block);
    if raw_actions.is_empty() {
        warnings.push("Recommended Actions missing bullets".to_string());
    }
    if raw_actions.len() > MAX_ACTIONS {
        warnings.push("Recommended Actions truncated to 2 bullets".to_string());
    }
    let actions: Vec<String> = raw_actions
        .iter()
        .take(MAX_ACTIONS)
        .map(|item| collapse_and_cut(item, ACTION_BUDGET))
        .collect();

    let confidence = section_confidence(yaml_section);

    let mut yaml_lines = vec![
        "```yaml".to_string(),
        format!("summary: \"{}\"", yaml_escape(&summary_line)),
        "findings:".to_string(),
    ];
    for item in &findings {
        yaml_lines.push(format!("  - \"{}\"", yaml_escape(item)));
    }
    yaml_lines.push("recommendations:".to_string());
    for item in &actions {
        yaml_lines.push(format!("  - \"{}\"", yaml_escape(item)));
    }
    yaml_lines.push(format!("confidence: \"{}\"", confidence.as_str()));
    yaml_lines.push("```".to_string());

    let mut lines = vec![
        format!("[Agent: {agent}]"),
        String::new(),
        SUMMARY_MARKER.to_string(),
        if summary_line.is_empty() {
            "(missing)".to_string()
        } else {
            summary_line.clone()
        },
        String::new(),
        FINDINGS_MARKER.to_string(),
    ];
    lines.extend(findings.iter().map(|item| format!("- {item}")));
    lines.push(String::new());
    lines.push(ACTIONS_MARKER.to_string());
    lines.extend(actions.iter().map(|item| format!("- [ ] {item}")));
    lines.push(String::new());
    lines.push(YAML_MARKER.to_string());
    lines.extend(yaml_lines);

    let normalized = format!("{}\n", lines.join("\n").trim_end());
    (normalized, warnings)
}
