//! localrag-keyword
//!
//! BM25 keyword ranking over an in-memory corpus. See `bm25` for the scoring
//! function and `index` for the built/unbuilt lifecycle.

pub mod bm25;
pub mod index;

pub use bm25::{tokenize, Bm25Index, Bm25Params};
pub use index::KeywordIndex;
