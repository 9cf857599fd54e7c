//! In-memory BM25 (Okapi) ranking over whitespace tokens.
//!
//! Scores follow the classic Okapi formulation:
//!
//! ```text
//! score(D, Q) = Σ_q idf(q) · tf(q, D)·(k1 + 1) / (tf(q, D) + k1·(1 − b + b·|D|/avgdl))
//! idf(q)      = ln((N − df(q) + 0.5) / (df(q) + 0.5))
//! ```
//!
//! Terms that occur in more than half of the fragments have a negative raw idf;
//! those are floored to `epsilon · mean(idf)` so that common words still count
//! a little instead of penalising a match.

use rayon::prelude::*;
use std::collections::HashMap;
use tracing::instrument;

use localrag_core::traits::FragmentScorer;
use localrag_core::types::{Corpus, ScoreVector};
use localrag_core::{Error, Result};

/// Corpora at least this large are tokenized and scored with rayon.
const PARALLEL_THRESHOLD: usize = 10_000;

/// Tuning knobs, fixed for the lifetime of an index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term frequency saturation.
    pub k1: f64,
    /// Length normalisation.
    pub b: f64,
    /// Floor for negative idf, as a fraction of the mean idf.
    pub epsilon: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75, epsilon: 0.25 }
    }
}

/// Whitespace tokenizer shared by build and query. Case is preserved.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// A built BM25 index. Immutable; rebuild by constructing a new one.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    params: Bm25Params,
    idf: HashMap<String, f64>,
    /// Saturated, length-normalised term frequency per fragment, in corpus order.
    tf_norm: Vec<HashMap<String, f64>>,
}

impl Bm25Index {
    pub fn build(corpus: &Corpus) -> Result<Self> {
        Self::build_with(corpus, Bm25Params::default())
    }

    #[instrument(skip_all, fields(fragments = corpus.len()))]
    pub fn build_with(corpus: &Corpus, params: Bm25Params) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let texts: Vec<&str> = corpus.iter().map(|f| f.text.as_str()).collect();
        let term_counts: Vec<(usize, HashMap<&str, usize>)> = if texts.len() >= PARALLEL_THRESHOLD {
            texts.par_iter().map(|&t| count_terms(t)).collect()
        } else {
            texts.iter().map(|&t| count_terms(t)).collect()
        };

        let n = term_counts.len() as f64;
        let total_tokens: usize = term_counts.iter().map(|(len, _)| len).sum();
        let avgdl = total_tokens as f64 / n;

        let mut df: HashMap<&str, usize> = HashMap::new();
        for (_, counts) in &term_counts {
            for term in counts.keys() {
                *df.entry(*term).or_insert(0) += 1;
            }
        }

        let mut idf: HashMap<String, f64> = HashMap::with_capacity(df.len());
        let mut idf_sum = 0.0;
        let mut negative = Vec::new();
        for (term, &freq) in &df {
            let freq = freq as f64;
            let value = ((n - freq + 0.5) / (freq + 0.5)).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push((*term).to_string());
            }
            idf.insert((*term).to_string(), value);
        }
        let floor = params.epsilon * idf_sum / idf.len().max(1) as f64;
        for term in negative {
            idf.insert(term, floor);
        }

        let tf_norm = term_counts
            .into_iter()
            .map(|(len, counts)| {
                let dl = len as f64;
                let norm = params.k1 * (1.0 - params.b + params.b * dl / avgdl.max(f64::EPSILON));
                counts
                    .into_iter()
                    .map(|(term, tf)| {
                        let tf = tf as f64;
                        (term.to_string(), tf * (params.k1 + 1.0) / (tf + norm))
                    })
                    .collect()
            })
            .collect();

        tracing::info!(fragments = corpus.len(), terms = idf.len(), avgdl, "BM25 index built");
        Ok(Self { params, idf, tf_norm })
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Idf of a term, if it occurs in the corpus.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// BM25 score of every fragment for `query`, in corpus order.
    /// Repeated query tokens count once per occurrence.
    pub fn scores(&self, query: &str) -> ScoreVector {
        let weighted: Vec<(&str, f64)> = tokenize(query)
            .into_iter()
            .filter_map(|t| self.idf.get(t).map(|&idf| (t, idf)))
            .collect();
        let score_doc = |doc: &HashMap<String, f64>| -> f32 {
            weighted
                .iter()
                .map(|(term, idf)| idf * doc.get(*term).copied().unwrap_or(0.0))
                .sum::<f64>() as f32
        };
        if self.tf_norm.len() >= PARALLEL_THRESHOLD {
            self.tf_norm.par_iter().map(score_doc).collect()
        } else {
            self.tf_norm.iter().map(score_doc).collect()
        }
    }
}

impl FragmentScorer for Bm25Index {
    fn fragment_count(&self) -> usize {
        self.tf_norm.len()
    }

    fn score(&self, query: &str) -> Result<ScoreVector> {
        Ok(self.scores(query))
    }
}

fn count_terms(text: &str) -> (usize, HashMap<&str, usize>) {
    let tokens = tokenize(text);
    let mut counts = HashMap::new();
    for token in &tokens {
        *counts.entry(*token).or_insert(0) += 1;
    }
    (tokens.len(), counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_any_whitespace() {
        assert_eq!(tokenize(" Fire\tstarter\nkit  "), vec!["Fire", "starter", "kit"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn count_terms_tracks_length() {
        let (len, counts) = count_terms("a b a");
        assert_eq!(len, 3);
        assert_eq!(counts["a"], 2);
        assert_eq!(counts["b"], 1);
    }
}
