//! Weighted merge of vector and keyword scores.

use localrag_core::error::ensure_unit_interval;
use localrag_core::types::{CombinedScore, ScoreVector};
use localrag_core::{Error, Result};

/// Merge per-fragment scores as `alpha * vector + (1 - alpha) * keyword`.
///
/// `keyword` is `None` when hybrid scoring is off; the vector scores then pass
/// through unchanged. `alpha == 1.0` and `alpha == 0.0` reproduce the vector
/// and keyword scores bit for bit.
pub fn combine(vector: &[f32], keyword: Option<&[f32]>, alpha: f32) -> Result<Vec<CombinedScore>> {
    ensure_unit_interval("alpha", alpha)?;
    let Some(keyword) = keyword else {
        return Ok(vector
            .iter()
            .map(|&v| CombinedScore { vector_score: v, keyword_score: None, combined: v })
            .collect());
    };
    if vector.len() != keyword.len() {
        return Err(Error::IndexMisalignment { expected: vector.len(), actual: keyword.len() });
    }
    Ok(vector
        .iter()
        .zip(keyword)
        .map(|(&v, &k)| CombinedScore { vector_score: v, keyword_score: Some(k), combined: weigh(v, k, alpha) })
        .collect())
}

/// Same as [`combine`] but keeps only the combined value.
pub fn combine_scores(vector: &[f32], keyword: Option<&[f32]>, alpha: f32) -> Result<ScoreVector> {
    Ok(combine(vector, keyword, alpha)?.into_iter().map(|c| c.combined).collect())
}

#[inline]
fn weigh(v: f32, k: f32, alpha: f32) -> f32 {
    if alpha == 1.0 {
        v
    } else if alpha == 0.0 {
        k
    } else {
        alpha * v + (1.0 - alpha) * k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_sum() {
        let out = combine_scores(&[1.0, 0.0], Some(&[0.0, 2.0]), 0.25).unwrap();
        assert_eq!(out, vec![0.25, 1.5]);
    }

    #[test]
    fn breakdown_keeps_both_inputs() {
        let out = combine(&[0.4], Some(&[3.0]), 0.5).unwrap();
        assert_eq!(out[0].vector_score, 0.4);
        assert_eq!(out[0].keyword_score, Some(3.0));
        assert!((out[0].combined - 1.7).abs() < 1e-6);
    }
}
