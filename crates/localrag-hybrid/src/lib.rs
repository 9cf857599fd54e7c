//! localrag-hybrid
//!
//! Merges TF-IDF and BM25 scores, selects a source-diverse top-k and turns the
//! picks into citation-ready records.

pub mod assemble;
pub mod retriever;
pub mod scorer;
pub mod selection;

pub use assemble::{assemble, format_citations, format_sources_section, preview_text, NO_SOURCES, PREVIEW_CHARS};
pub use retriever::{IndexGeneration, SharedRetriever};
pub use scorer::{combine, combine_scores};
pub use selection::{select, Selected};

pub use localrag_core::config::RetrieveOptions;
pub use localrag_core::traits::Retrieve;
