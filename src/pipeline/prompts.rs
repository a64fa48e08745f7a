//! Prompt assembly for staged and single-shot runs.

use crate::pipeline::types::{STAGE_JUDGE, STAGE_RESEARCHER};

/// A carried-forward digest of one completed stage.
#[derive(Debug, Clone)]
pub struct StageNote {
    pub stage: String,
    pub summary: String,
}

/// The shared base prompt for one execution request.
pub fn build_base_prompt(issue: u64, agent: &str, context: &str, comment_count: u32) -> String {
    let mut prompt = format!("Review task for issue #{issue}:\n\n{context}\n");
    if comment_count > 0 {
        prompt.push_str(&format!(
            "\nNote: this issue already has {comment_count} historical comments. \
             Read and weigh them before replying.\n"
        ));
    }
    prompt.push_str(&format!("\nPrefix your reply with [Agent: {agent}]."));
    prompt
}

pub fn researcher_prompt(base: &str) -> String {
    format!(
        "Current stage: {STAGE_RESEARCHER}\n\n{base}\n\n\
         Gather primary evidence for the discussion above. End your reply with a \
         fenced yaml block containing `summary`, a nonempty `evidence` list \
         (each entry: claim, source, url, confidence), `open_questions`, and \
         `confidence`."
    )
}

pub fn intermediate_prompt(base: &str, stage: &str, notes: &[StageNote]) -> String {
    format!(
        "Current stage: {stage}\n\n{base}\n\n{}\n\
         End your reply with a fenced yaml block containing `summary`, \
         `findings`, `recommendations`, and `confidence`.",
        carried_notes(notes)
    )
}

pub fn judge_prompt(base: &str, notes: &[StageNote]) -> String {
    format!(
        "Current stage: {STAGE_JUDGE}\n\n{base}\n\n{}\n\
         Weigh the staged work above and deliver the final verdict. The final \
         output must be Markdown, readable on its own, and must cite its \
         sources: either a fenced yaml block with a `sources` list, or a \
         `## Sources` section listing the links you relied on.",
        carried_notes(notes)
    )
}

pub fn judge_retry_prompt(base: &str, notes: &[StageNote]) -> String {
    format!(
        "{}\n\nYour previous verdict listed no sources. That is not acceptable: \
         every claim needs at least one citation. Reissue the verdict with a \
         populated `sources` list or `## Sources` section.",
        judge_prompt(base, notes)
    )
}

fn carried_notes(notes: &[StageNote]) -> String {
    if notes.is_empty() {
        return String::new();
    }
    let mut text = String::from("Findings from earlier stages:\n");
    for note in notes {
        text.push_str(&format!("- [{}] {}\n", note.stage, note.summary));
    }
    text
}
