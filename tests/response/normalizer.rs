use moot::response::normalize_agent_output;

const FULLY_MARKERED: &str = "[Agent: reviewer_a]

## Summary
The proposal from @alice is workable overall.

## Key Findings
- Benchmarks from @bob look solid
- Missing error handling in the retry path
- Docs lag behind the implementation
- This fourth bullet is over the budget

## Recommended Actions
- Add retry-path tests
- Update the docs
- Split the oversized module

## Structured (YAML)
```yaml
summary: \"original\"
confidence: \"high\"
```
";

#[test]
fn text_without_markers_passes_through_untouched() {
    let raw = "Just a plain reply with no structure at all.";
    let (text, warnings) = normalize_agent_output(raw, "reviewer_a");
    assert_eq!(text, raw);
    assert!(warnings.is_empty());
}

#[test]
fn partial_structure_is_not_repaired() {
    let raw = "## Summary\nOnly a summary here.\n\n## Key Findings\n- one";
    let (text, warnings) = normalize_agent_output(raw, "reviewer_a");
    assert_eq!(text, raw);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Missing sections:"));
    assert!(warnings[0].contains("## Recommended Actions"));
    assert!(warnings[0].contains("## Structured (YAML)"));
}

#[test]
fn fully_markered_text_is_rebuilt_deterministically() {
    let (first, warnings) = normalize_agent_output(FULLY_MARKERED, "reviewer_a");
    let (second, _) = normalize_agent_output(FULLY_MARKERED, "reviewer_a");
    assert_eq!(first, second);

    // Three actions were present: extras are dropped with a warning.
    assert!(
        warnings
            .iter()
            .any(|w| w == "Recommended Actions truncated to 2 bullets")
    );
    // Four findings shrink to three silently.
    assert!(!warnings.iter().any(|w| w.contains("fewer than 3")));
    assert!(!first.contains("fourth bullet"));
    assert!(!first.contains("Split the oversized"));

    // Confidence came from the embedded block.
    assert!(first.contains("confidence: \"high\""));
    assert!(first.starts_with("[Agent: reviewer_a]\n"));
}

#[test]
fn mentions_in_summary_and_findings_are_neutralized() {
    let (text, _) = normalize_agent_output(FULLY_MARKERED, "reviewer_a");
    assert!(!text.contains("@alice"));
    assert!(!text.contains("@bob"));
    assert!(text.contains("用户 bob"));
}

#[test]
fn formatting_noise_does_not_change_the_output() {
    let messy = FULLY_MARKERED
        .replace("- Benchmarks", "-   Benchmarks")
        .replace("The proposal", "  The   proposal");
    let (from_clean, _) = normalize_agent_output(FULLY_MARKERED, "reviewer_a");
    let (from_messy, _) = normalize_agent_output(&messy, "reviewer_a");
    assert_eq!(from_clean, from_messy);
}

#[test]
fn empty_summary_is_flagged_and_placeholdered() {
    let raw = "## Summary\n\n## Key Findings\n- a\n- b\n- c\n\n## Recommended Actions\n- x\n\n## Structured (YAML)\n";
    let (text, warnings) = normalize_agent_output(raw, "echo");
    assert!(warnings.iter().any(|w| w == "Summary is empty"));
    assert!(text.contains("(missing)"));
}

#[test]
fn missing_bullets_warn_but_do_not_block() {
    let raw = "## Summary\nFine.\n\n## Key Findings\nno bullets here\n\n## Recommended Actions\nnone\n\n## Structured (YAML)\n";
    let (text, warnings) = normalize_agent_output(raw, "echo");
    assert!(warnings.iter().any(|w| w == "Key Findings missing bullets"));
    assert!(
        warnings
            .iter()
            .any(|w| w == "Recommended Actions missing bullets")
    );
    assert!(warnings.iter().any(|w| w.contains("fewer than 3")));
    assert!(text.contains("## Structured (YAML)"));
}

#[test]
fn garbage_confidence_defaults_to_medium() {
    let raw = "## Summary\nFine.\n\n## Key Findings\n- a\n\n## Recommended Actions\n- x\n\n## Structured (YAML)\n```yaml\nconfidence: \"certain\"\n```";
    let (text, _) = normalize_agent_output(raw, "echo");
    assert!(text.contains("confidence: \"medium\""));
}

#[test]
fn out_of_order_sections_are_left_alone() {
    let raw = "## Key Findings\n- a\n\n## Summary\nBackwards.\n\n## Recommended Actions\n- x\n\n## Structured (YAML)\n";
    let (text, warnings) = normalize_agent_output(raw, "echo");
    assert_eq!(text, raw);
    assert!(warnings.iter().any(|w| w == "Sections out of order"));
}
