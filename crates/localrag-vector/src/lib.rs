//! localrag-vector
//!
//! Sparse TF-IDF vectors with cosine similarity, built in memory from a
//! fixed corpus.

pub mod analyzer;
pub mod index;
pub mod sparse;

pub use analyzer::analyze;
pub use index::{VectorIndex, Vocabulary};
pub use sparse::SparseVector;
