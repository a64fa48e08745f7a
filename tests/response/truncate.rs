use moot::response::{MAX_COMMENT_LENGTH, truncate_text};

#[test]
fn short_text_is_returned_unchanged() {
    let text = "Short text";
    let result = truncate_text(text, MAX_COMMENT_LENGTH);
    assert_eq!(result, text);
    assert!(!result.contains("内容已截断"));
}

#[test]
fn text_exactly_at_the_budget_is_identity() {
    let text = "a".repeat(MAX_COMMENT_LENGTH);
    let result = truncate_text(&text, MAX_COMMENT_LENGTH);
    assert_eq!(result.chars().count(), MAX_COMMENT_LENGTH);
    assert!(!result.contains("内容已截断"));
}

#[test]
fn long_text_is_cut_under_budget_with_marker() {
    let text = "a".repeat(MAX_COMMENT_LENGTH + 1000);
    let result = truncate_text(&text, MAX_COMMENT_LENGTH);
    assert!(result.chars().count() <= MAX_COMMENT_LENGTH);
    assert!(result.contains("内容已截断"));
}

#[test]
fn cut_prefers_a_paragraph_boundary_past_the_halfway_mark() {
    let mut text = String::new();
    for i in 0..200 {
        text.push_str(&format!("paragraph {i}\n\n"));
    }
    let result = truncate_text(&text, 1000);
    assert!(result.chars().count() <= 1000);
    assert!(result.contains("内容已截断"));
    // The kept content ends on a full paragraph, not mid-line.
    let content = result.replace("\n\n_(内容已截断)_", "");
    assert!(content.ends_with(|c: char| c.is_ascii_digit()));
}

#[test]
fn custom_budget_is_honored() {
    let text = "a".repeat(1000);
    let result = truncate_text(&text, 100);
    assert!(result.chars().count() <= 100);
    assert!(result.contains("内容已截断"));
}

#[test]
fn multibyte_text_is_never_split_mid_scalar() {
    let text = "中文测试".repeat(5000);
    let result = truncate_text(&text, 1000);
    assert!(result.chars().count() <= 1000);
    assert!(result.contains("内容已截断"));
}
