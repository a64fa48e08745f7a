//! Comment-length budgeting.
//!
//! The hosting tracker caps comments at 65536 characters; we stay well under
//! it. When a cut is needed it prefers the last full paragraph boundary, as
//! long as that keeps at least half of the available budget, and always
//! appends a visible truncation marker. Budgets count characters, not bytes,
//! so CJK text is never split mid-scalar.

/// Comment budget relayed to the issue surface.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

pub const TRUNCATION_MARKER: &str = "\n\n_(内容已截断)_";

/// Truncate `text` to at most `max_chars` characters.
///
/// Identity for text within budget. Over budget, the result is at most
/// `max_chars` characters and ends with [`TRUNCATION_MARKER`].
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let marker_chars = TRUNCATION_MARKER.chars().count();
    let available = max_chars.saturating_sub(marker_chars);
    let cut_at = text
        .char_indices()
        .nth(available)
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    let head = &text[..cut_at];

    // Prefer ending on a paragraph boundary when one falls past the halfway
    // mark of the available budget.
    if let Some(boundary) = head.rfind("\n\n") {
        let kept = head[..boundary].chars().count();
        if kept * 2 > available {
            return format!("{}{}", head[..boundary].trim(), TRUNCATION_MARKER);
        }
    }

    format!("{}{}", head.trim(), TRUNCATION_MARKER)
}
