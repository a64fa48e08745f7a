//! Observer decision parsing.
//!
//! The observer replies in YAML, more or less. Three shapes are accepted, in
//! order: a fenced code block, a bare `---` document, and plain `key: value`
//! lines. Anything else parses to the default no-trigger decision; upstream
//! text is never trusted to conform.

use serde_yaml::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObserverDecision {
    pub should_trigger: bool,
    pub agent: String,
    pub comment: String,
    pub reason: String,
    pub analysis: String,
}

/// Parse an observer reply into a decision. Unparsable input yields the
/// default (no trigger).
pub fn parse_observer_decision(response: &str) -> ObserverDecision {
    let mut decision = ObserverDecision::default();

    let Some(data) = try_parse_yaml(response) else {
        return decision;
    };

    decision.should_trigger = get_bool(&data, "should_trigger");
    decision.agent = get_str(&data, "agent")
        .or_else(|| get_str(&data, "trigger_agent"))
        .unwrap_or_default();
    decision.comment = get_str(&data, "comment")
        .or_else(|| get_str(&data, "trigger_comment"))
        .unwrap_or_default();
    decision.reason = get_str(&data, "reason")
        .or_else(|| get_str(&data, "skip_reason"))
        .unwrap_or_default();
    decision.analysis = get_str(&data, "analysis").unwrap_or_default();

    if decision.should_trigger && !decision.agent.is_empty() && decision.comment.is_empty() {
        decision.comment = default_trigger_comment(&decision.agent);
    }

    decision
}

fn get_str(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn get_bool(data: &Value, key: &str) -> bool {
    data.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn try_parse_yaml(response: &str) -> Option<Value> {
    let text = response.trim();

    if text.contains("```yaml") {
        let start = text.find("```yaml").or_else(|| text.find("```"))?;
        let end = text.rfind("```")?;
        if end > start {
            let block = &text[start..end];
            let content: Vec<&str> = block.lines().skip(1).collect();
            if !content.is_empty() {
                if let Some(mapping) = parse_mapping(&content.join("\n")) {
                    return Some(mapping);
                }
            }
        }
    } else if text.starts_with("---") {
        if let Some(mapping) = parse_mapping(text) {
            return Some(mapping);
        }
    }

    // Plain key-value lines, one per line.
    let yaml_like = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .all(|line| line.contains(':'));
    if yaml_like {
        return parse_mapping(text);
    }

    None
}

fn parse_mapping(text: &str) -> Option<Value> {
    match serde_yaml::from_str::<Value>(text) {
        Ok(value @ Value::Mapping(_)) => Some(value),
        _ => None,
    }
}

/// Canned trigger comment used when the observer names an agent but writes
/// no comment of its own.
pub fn default_trigger_comment(agent: &str) -> String {
    match agent {
        "moderator" => "@moderator 请审核".to_string(),
        "reviewer_a" => "@reviewer_a 评审".to_string(),
        "reviewer_b" => "@reviewer_b 找问题".to_string(),
        "summarizer" => "@summarizer 汇总".to_string(),
        "observer" => "@observer".to_string(),
        other => format!("@{other}"),
    }
}
