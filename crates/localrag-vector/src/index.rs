//! TF-IDF vector index with cosine scoring.
//!
//! The vocabulary is fitted once over the whole corpus. Each fragment becomes an
//! L2-normalised sparse vector of `tf · idf` with the smoothed idf
//! `ln((1 + n) / (1 + df)) + 1`. Queries are projected into the same space;
//! terms the corpus never saw carry no weight.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

use localrag_core::traits::FragmentScorer;
use localrag_core::types::{Corpus, ScoreVector};
use localrag_core::{Error, Result};

use crate::analyzer::analyze;
use crate::sparse::SparseVector;

/// Corpora at least this large are vectorized and scored with rayon.
const PARALLEL_THRESHOLD: usize = 10_000;

/// Term → column mapping plus per-column idf.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    columns: HashMap<String, u32>,
    idf: Vec<f32>,
}

impl Vocabulary {
    fn fit(documents: &[Vec<String>]) -> Self {
        let mut columns: HashMap<String, u32> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        for terms in documents {
            let mut seen: HashSet<u32> = HashSet::new();
            for term in terms {
                let next = u32::try_from(columns.len()).unwrap_or(u32::MAX);
                let col = *columns.entry(term.clone()).or_insert(next);
                if col as usize == df.len() {
                    df.push(0);
                }
                if seen.insert(col) {
                    df[col as usize] += 1;
                }
            }
        }
        let n = documents.len() as f32;
        let idf = df.iter().map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0).collect();
        Self { columns, idf }
    }

    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }

    pub fn column(&self, term: &str) -> Option<u32> {
        self.columns.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.column(term).map(|c| self.idf[c as usize])
    }

    /// Unit-length TF-IDF vector of `text`; unknown terms are skipped.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.transform_terms(&analyze(text))
    }

    fn transform_terms(&self, terms: &[String]) -> SparseVector {
        let pairs = terms
            .iter()
            .filter_map(|t| self.column(t))
            .map(|c| (c, self.idf[c as usize]))
            .collect();
        SparseVector::from_pairs(pairs).l2_normalized()
    }
}

/// Sparse vector index over a fixed corpus. Immutable after [`VectorIndex::build`].
#[derive(Debug, Clone)]
pub struct VectorIndex {
    vocabulary: Vocabulary,
    vectors: Vec<SparseVector>,
}

impl VectorIndex {
    #[instrument(skip_all, fields(fragments = corpus.len()))]
    pub fn build(corpus: &Corpus) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let parallel = corpus.len() >= PARALLEL_THRESHOLD;
        let documents: Vec<Vec<String>> = if parallel {
            corpus.fragments().par_iter().map(|f| analyze(&f.text)).collect()
        } else {
            corpus.iter().map(|f| analyze(&f.text)).collect()
        };
        let vocabulary = Vocabulary::fit(&documents);
        let vectors: Vec<SparseVector> = if parallel {
            documents.par_iter().map(|d| vocabulary.transform_terms(d)).collect()
        } else {
            documents.iter().map(|d| vocabulary.transform_terms(d)).collect()
        };
        if vocabulary.is_empty() {
            tracing::warn!("vector index vocabulary is empty; every query will score zero");
        }
        tracing::info!(fragments = vectors.len(), terms = vocabulary.len(), "TF-IDF index built");
        Ok(Self { vocabulary, vectors })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Fragment vector by corpus position.
    pub fn vector(&self, position: usize) -> Option<&SparseVector> {
        self.vectors.get(position)
    }

    /// Cosine similarity of `query` against every fragment, in corpus order.
    pub fn scores(&self, query: &str) -> ScoreVector {
        let q = self.vocabulary.transform(query);
        if q.is_zero() {
            return vec![0.0; self.vectors.len()];
        }
        if self.vectors.len() >= PARALLEL_THRESHOLD {
            self.vectors.par_iter().map(|v| q.cosine(v)).collect()
        } else {
            self.vectors.iter().map(|v| q.cosine(v)).collect()
        }
    }
}

impl FragmentScorer for VectorIndex {
    fn fragment_count(&self) -> usize {
        self.vectors.len()
    }

    fn score(&self, query: &str) -> Result<ScoreVector> {
        Ok(self.scores(query))
    }
}
