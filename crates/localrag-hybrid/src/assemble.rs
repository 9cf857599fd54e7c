//! Turns selected fragments into citation-ready [`ResultRecord`]s.

use localrag_core::types::{Corpus, Fragment, ResultRecord};

use crate::selection::Selected;

/// Maximum preview length, in characters.
pub const PREVIEW_CHARS: usize = 300;

/// Returned by [`format_citations`] when nothing was retrieved.
pub const NO_SOURCES: &str = "(no sources retrieved)";

/// First [`PREVIEW_CHARS`] characters of `text` with line breaks turned into spaces.
pub fn preview_text(text: &str) -> String {
    let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
    truncated.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

pub fn record_for(fragment: &Fragment, score: f32) -> ResultRecord {
    ResultRecord {
        fragment_id: fragment.id,
        source_path: fragment.source_path.clone(),
        preview_text: preview_text(&fragment.text),
        locator: fragment.locator(),
        score,
    }
}

/// One record per selection, in selection order. Selections that point
/// outside the corpus are skipped.
pub fn assemble(corpus: &Corpus, selected: &[Selected]) -> Vec<ResultRecord> {
    selected
        .iter()
        .filter_map(|s| corpus.get(s.id).map(|f| record_for(f, s.score)))
        .collect()
}

/// `[i] source_path — location` per record, 1-based, newline separated.
pub fn format_citations(records: &[ResultRecord]) -> String {
    if records.is_empty() {
        return NO_SOURCES.to_string();
    }
    records
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[{}] {} — {}", i + 1, r.source_path, r.locator.describe()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// [`format_citations`] under a `Sources:` heading, as appended to answers.
pub fn format_sources_section(records: &[ResultRecord]) -> String {
    format!("Sources:\n{}", format_citations(records))
}
