use moot::response::{
    Confidence, ParsedBlock, collect_source_urls, parse_review_block,
};

#[test]
fn text_without_a_fence_is_unstructured() {
    assert_eq!(
        parse_review_block("no block here, just prose"),
        ParsedBlock::Unstructured
    );
}

#[test]
fn an_unparsable_fence_is_malformed_not_an_error() {
    let text = "```yaml\nsummary: [unclosed\n```";
    assert_eq!(parse_review_block(text), ParsedBlock::Malformed);
}

#[test]
fn a_well_formed_block_parses_into_typed_fields() {
    let text = "```yaml
summary: \"s\"
findings:
  - \"f1\"
recommendations:
  - \"r1\"
sources:
  - \"https://example.com/1\"
evidence:
  - claim: \"c\"
    source: \"src\"
    url: \"https://example.com/e\"
    confidence: \"high\"
  - \"a bare evidence string\"
confidence: \"high\"
```";
    let block = match parse_review_block(text) {
        ParsedBlock::Structured(block) => block,
        other => panic!("expected structured block, got {other:?}"),
    };
    assert_eq!(block.summary, "s");
    assert_eq!(block.findings, vec!["f1"]);
    assert_eq!(block.sources, vec!["https://example.com/1"]);
    assert_eq!(block.evidence.len(), 2);
    assert!(block.has_evidence());
    assert_eq!(block.confidence_level(), Confidence::High);
}

#[test]
fn unknown_keys_are_ignored() {
    let text = "```yaml\nsummary: \"s\"\nextra_key: whatever\n```";
    assert!(matches!(
        parse_review_block(text),
        ParsedBlock::Structured(_)
    ));
}

#[test]
fn source_urls_prefer_the_structured_list() {
    let text = "```yaml
summary: \"s\"
findings: []
recommendations: []
sources:
  - \"https://example.com/1\"
  - \"https://example.com/2\"
confidence: \"high\"
```
Other link: https://ignored.example.com/x
";
    assert_eq!(
        collect_source_urls(text),
        vec!["https://example.com/1", "https://example.com/2"]
    );
}

#[test]
fn source_urls_fall_back_to_links_in_the_narrative() {
    let text = "## Summary\nok\n\n## Sources\n- https://example.com/final\n- https://example.com/final\n";
    assert_eq!(collect_source_urls(text), vec!["https://example.com/final"]);
}

#[test]
fn empty_structured_sources_do_not_mask_narrative_links() {
    let text = "```yaml\nsummary: \"s\"\nsources: []\n```\nSee https://example.com/only\n";
    assert_eq!(collect_source_urls(text), vec!["https://example.com/only"]);
}

#[test]
fn lenient_confidence_parsing_defaults_to_medium() {
    assert_eq!(Confidence::parse("HIGH"), Confidence::High);
    assert_eq!(Confidence::parse(" low "), Confidence::Low);
    assert_eq!(Confidence::parse("certain"), Confidence::Medium);
    assert_eq!(Confidence::parse(""), Confidence::Medium);
}
