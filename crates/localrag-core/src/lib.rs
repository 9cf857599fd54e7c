#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    CombinedScore, Corpus, CorpusBuilder, Fragment, FragmentId, Locator, ResultRecord,
    ScoreVector, SourceLocation, SourceType,
};
