use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build an index over an empty corpus")]
    EmptyCorpus,

    #[error("corpus is full: fragment ids are limited to u32")]
    CorpusFull,

    #[error("keyword index has not been built")]
    IndexNotBuilt,

    /// Two score sources disagree on the number of fragments.
    #[error("index misalignment: expected {expected} scores, got {actual}")]
    IndexMisalignment { expected: usize, actual: usize },

    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter { name, value: value.to_string() }
    }
}

/// Check that `value` lies in `[0, 1]`. NaN is rejected.
pub fn ensure_unit_interval(name: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid(name, value))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
