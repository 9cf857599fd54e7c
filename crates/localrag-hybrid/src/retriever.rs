//! Index generations and the `retrieve` entry point.
//!
//! An [`IndexGeneration`] owns a corpus and both indices built from it, so the
//! fragment ordering they share is fixed at construction. [`SharedRetriever`]
//! publishes one generation at a time and swaps in a fully built replacement;
//! queries already running keep the generation they started on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use localrag_core::config::RetrieveOptions;
use localrag_core::traits::{FragmentScorer, Retrieve};
use localrag_core::types::{CombinedScore, Corpus, ResultRecord};
use localrag_core::{Error, Result};
use localrag_keyword::KeywordIndex;
use localrag_vector::VectorIndex;

use crate::assemble::assemble;
use crate::scorer::combine;
use crate::selection::select;

#[derive(Debug)]
pub struct IndexGeneration {
    corpus: Arc<Corpus>,
    vector: VectorIndex,
    keyword: KeywordIndex,
}

impl IndexGeneration {
    /// Build both indices from `corpus`, concurrently.
    pub fn build(corpus: impl Into<Arc<Corpus>>) -> Result<Self> {
        let corpus = corpus.into();
        let (vector, keyword) = rayon::join(|| VectorIndex::build(&corpus), || KeywordIndex::build(&corpus));
        Ok(Self { vector: vector?, keyword: keyword?, corpus })
    }

    /// Vector-only generation; hybrid queries against it fail with `IndexNotBuilt`.
    pub fn vector_only(corpus: impl Into<Arc<Corpus>>) -> Result<Self> {
        let corpus = corpus.into();
        let vector = VectorIndex::build(&corpus)?;
        Ok(Self { corpus, vector, keyword: KeywordIndex::Unbuilt })
    }

    /// Assemble a generation from separately built parts, checking they agree on size.
    pub fn from_parts(corpus: Arc<Corpus>, vector: VectorIndex, keyword: KeywordIndex) -> Result<Self> {
        check_aligned(&corpus, &vector)?;
        if keyword.is_built() {
            check_aligned(&corpus, &keyword)?;
        }
        Ok(Self { corpus, vector, keyword })
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn vector_index(&self) -> &VectorIndex {
        &self.vector
    }

    pub fn keyword_index(&self) -> &KeywordIndex {
        &self.keyword
    }

    /// Per-fragment score breakdown for `query`, in corpus order.
    pub fn score(&self, query: &str, opts: &RetrieveOptions) -> Result<Vec<CombinedScore>> {
        opts.validate()?;
        let vector_scores = self.vector.score(query)?;
        let keyword_scores = if opts.hybrid { Some(self.keyword.score(query)?) } else { None };
        let combined = combine(&vector_scores, keyword_scores.as_deref(), opts.alpha)?;
        if combined.len() != self.corpus.len() {
            return Err(Error::IndexMisalignment { expected: self.corpus.len(), actual: combined.len() });
        }
        Ok(combined)
    }
}

impl Retrieve for IndexGeneration {
    fn retrieve(&self, query: &str, opts: &RetrieveOptions) -> Result<Vec<ResultRecord>> {
        let scores: Vec<f32> = self.score(query, opts)?.into_iter().map(|c| c.combined).collect();
        let selected = select(&self.corpus, &scores, opts.k, opts.min_score_ratio)?;
        let records = assemble(&self.corpus, &selected);
        tracing::debug!(query, results = records.len(), hybrid = opts.hybrid, "retrieve");
        Ok(records)
    }
}

fn check_aligned(corpus: &Corpus, index: &dyn FragmentScorer) -> Result<()> {
    if index.fragment_count() == corpus.len() {
        Ok(())
    } else {
        Err(Error::IndexMisalignment { expected: corpus.len(), actual: index.fragment_count() })
    }
}

/// Thread-safe handle that serves queries from the current generation.
pub struct SharedRetriever {
    current: RwLock<Arc<IndexGeneration>>,
    generation: AtomicU64,
}

impl SharedRetriever {
    pub fn new(initial: IndexGeneration) -> Self {
        Self { current: RwLock::new(Arc::new(initial)), generation: AtomicU64::new(1) }
    }

    pub fn build(corpus: impl Into<Arc<Corpus>>) -> Result<Self> {
        IndexGeneration::build(corpus).map(Self::new)
    }

    /// The generation new queries will use.
    pub fn snapshot(&self) -> Arc<IndexGeneration> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of generations published so far, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Build a new generation off-lock, then publish it. On failure the current
    /// generation stays in place.
    pub fn rebuild(&self, corpus: impl Into<Arc<Corpus>>) -> Result<()> {
        let next = IndexGeneration::build(corpus)?;
        self.replace(next);
        Ok(())
    }

    pub fn replace(&self, next: IndexGeneration) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        drop(guard);
        tracing::info!(generation, "index generation published");
    }
}

impl Retrieve for SharedRetriever {
    fn retrieve(&self, query: &str, opts: &RetrieveOptions) -> Result<Vec<ResultRecord>> {
        self.snapshot().retrieve(query, opts)
    }
}
