//! Top-k selection over combined scores.
//!
//! 1. Admit fragments scoring at least `min_score_ratio * max_score`. When the
//!    best score is not positive the threshold is the best score itself, so
//!    the top fragments are always admitted.
//! 2. Rank by score descending, ties by ascending fragment id.
//! 3. Diversity pass: take the best fragment of each distinct source.
//! 4. Fill pass: walk the ranking again and add fragments whose
//!    `(source_path, preview_text)` is not selected yet.
//!
//! Returning fewer than `k` fragments is not an error.

use std::cmp::Ordering;
use std::collections::HashSet;

use localrag_core::error::ensure_unit_interval;
use localrag_core::types::{Corpus, FragmentId};
use localrag_core::{Error, Result};

use crate::assemble::preview_text;

/// A fragment picked by [`select`] together with its combined score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selected {
    pub id: FragmentId,
    pub score: f32,
}

/// Admission threshold for a given best score.
pub fn threshold(max_score: f32, min_score_ratio: f32) -> f32 {
    if max_score > 0.0 {
        min_score_ratio * max_score
    } else {
        max_score
    }
}

/// Admitted fragments ranked by score, ties broken by corpus order. NaN scores never qualify.
/// Positions past `u32::MAX` cannot belong to a corpus and are not considered.
pub fn ranked_candidates(combined: &[f32], min_score_ratio: f32) -> Vec<Selected> {
    let Some(max_score) = combined.iter().copied().filter(|s| !s.is_nan()).reduce(f32::max) else {
        return Vec::new();
    };
    let cutoff = threshold(max_score, min_score_ratio);
    let mut candidates: Vec<Selected> = combined
        .iter()
        .enumerate()
        .filter(|(_, &s)| s >= cutoff)
        .map_while(|(i, &score)| FragmentId::try_from(i).ok().map(|id| Selected { id, score }))
        .collect();
    candidates.sort_by(|a, b| {
        b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then(a.id.cmp(&b.id))
    });
    candidates
}

/// Pick up to `k` fragments, preferring one per source before repeating a source.
pub fn select(corpus: &Corpus, combined: &[f32], k: usize, min_score_ratio: f32) -> Result<Vec<Selected>> {
    ensure_unit_interval("min_score_ratio", min_score_ratio)?;
    if combined.len() != corpus.len() {
        return Err(Error::IndexMisalignment { expected: corpus.len(), actual: combined.len() });
    }
    if k == 0 || corpus.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = ranked_candidates(combined, min_score_ratio);
    let mut selected: Vec<Selected> = Vec::with_capacity(k.min(candidates.len()));
    let mut taken: HashSet<(&str, String)> = HashSet::new();
    let mut sources: HashSet<&str> = HashSet::new();

    for cand in &candidates {
        if selected.len() >= k {
            break;
        }
        let fragment = &corpus[cand.id];
        if sources.insert(fragment.source_path.as_str()) {
            taken.insert((fragment.source_path.as_str(), preview_text(&fragment.text)));
            selected.push(*cand);
        }
    }

    if selected.len() < k {
        for cand in &candidates {
            if selected.len() >= k {
                break;
            }
            let fragment = &corpus[cand.id];
            if taken.insert((fragment.source_path.as_str(), preview_text(&fragment.text))) {
                selected.push(*cand);
            }
        }
    }

    tracing::debug!(
        candidates = candidates.len(),
        sources = sources.len(),
        selected = selected.len(),
        k,
        "selection complete"
    );
    Ok(selected)
}
