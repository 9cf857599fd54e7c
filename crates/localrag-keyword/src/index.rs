use localrag_core::traits::FragmentScorer;
use localrag_core::types::{Corpus, ScoreVector};
use localrag_core::{Error, Result};

use crate::bm25::{Bm25Index, Bm25Params};

/// Keyword index lifecycle: `Unbuilt` until a corpus is supplied, then `Built`.
///
/// Scoring an unbuilt index fails with [`Error::IndexNotBuilt`]; it never
/// degrades to all-zero scores.
#[derive(Debug, Clone, Default)]
pub enum KeywordIndex {
    #[default]
    Unbuilt,
    Built(Bm25Index),
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self::Unbuilt
    }

    pub fn build(corpus: &Corpus) -> Result<Self> {
        Bm25Index::build(corpus).map(Self::Built)
    }

    pub fn build_with(corpus: &Corpus, params: Bm25Params) -> Result<Self> {
        Bm25Index::build_with(corpus, params).map(Self::Built)
    }

    pub fn is_built(&self) -> bool {
        matches!(self, Self::Built(_))
    }

    pub fn as_built(&self) -> Result<&Bm25Index> {
        match self {
            Self::Built(index) => Ok(index),
            Self::Unbuilt => Err(Error::IndexNotBuilt),
        }
    }
}

impl From<Bm25Index> for KeywordIndex {
    fn from(index: Bm25Index) -> Self {
        Self::Built(index)
    }
}

impl FragmentScorer for KeywordIndex {
    fn fragment_count(&self) -> usize {
        match self {
            Self::Built(index) => index.fragment_count(),
            Self::Unbuilt => 0,
        }
    }

    fn score(&self, query: &str) -> Result<ScoreVector> {
        Ok(self.as_built()?.scores(query))
    }
}
