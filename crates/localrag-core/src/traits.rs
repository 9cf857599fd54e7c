use crate::config::RetrieveOptions;
use crate::types::{ResultRecord, ScoreVector};

/// An index that scores every fragment of the corpus it was built from.
///
/// Implementations are immutable once built, so `score` may be called from
/// any number of threads at once.
pub trait FragmentScorer: Send + Sync {
    /// Number of fragments the index was built over.
    fn fragment_count(&self) -> usize;

    /// One score per fragment, in corpus order.
    fn score(&self, query: &str) -> crate::Result<ScoreVector>;
}

/// Query entry point consumed by presentation and tooling layers.
pub trait Retrieve: Send + Sync {
    fn retrieve(&self, query: &str, opts: &RetrieveOptions) -> crate::Result<Vec<ResultRecord>>;
}
