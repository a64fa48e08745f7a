use moot::mention::{extract_mentions, has_mentions, neutralize_mentions};

fn names(text: &str) -> Vec<String> {
    extract_mentions(text)
        .into_iter()
        .map(|m| m.name)
        .collect()
}

#[test]
fn extracts_a_single_mention() {
    assert_eq!(names("@moderator 请审核"), vec!["moderator"]);
}

#[test]
fn preserves_first_occurrence_order() {
    assert_eq!(
        names("@moderator 请审核，@reviewer_a 评审"),
        vec!["moderator", "reviewer_a"]
    );
}

#[test]
fn deduplicates_repeated_mentions() {
    assert_eq!(
        names("@alice then @bob then @alice again"),
        vec!["alice", "bob"]
    );
}

#[test]
fn accepts_digits_underscores_and_hyphens() {
    assert_eq!(names("cc @agent42 and @ci-bot_2"), vec!["agent42", "ci-bot_2"]);
}

#[test]
fn records_the_span_of_the_first_occurrence() {
    let mentions = extract_mentions("hi @alice, again @alice");
    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].start, 3);
    assert_eq!(mentions[0].end, 9);
}

#[test]
fn neutralized_text_yields_no_mentions() {
    let text = "@moderator 请审核，@reviewer_a 评审";
    let neutral = neutralize_mentions(text);
    assert!(neutral.contains("用户 moderator"));
    assert!(neutral.contains("用户 reviewer_a"));
    assert!(extract_mentions(&neutral).is_empty());
    // A second pass changes nothing.
    assert_eq!(neutralize_mentions(&neutral), neutral);
}

#[test]
fn has_mentions_detects_presence() {
    assert!(has_mentions("please @moderator handle this"));
    assert!(!has_mentions("an ordinary comment"));
}
