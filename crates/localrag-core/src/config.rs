//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `localrag.toml`,
//! `localrag.<env>.toml` and `APP_*` env vars (nested keys split on `__`,
//! e.g. `APP_RETRIEVAL__ALPHA=0.3`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ensure_unit_interval, Error};

pub const DEFAULT_K: usize = 3;
pub const DEFAULT_ALPHA: f32 = 0.5;
pub const DEFAULT_MIN_SCORE_RATIO: f32 = 0.5;
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Per-query retrieval knobs (`[retrieval]` table).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieveOptions {
    /// Result count ceiling.
    pub k: usize,
    /// Enable keyword (BM25) scoring next to the vector score.
    pub hybrid: bool,
    /// Vector weight; keyword weight is `1 - alpha`.
    pub alpha: f32,
    /// Fraction of the best combined score a fragment needs to be admitted.
    pub min_score_ratio: f32,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            hybrid: true,
            alpha: DEFAULT_ALPHA,
            min_score_ratio: DEFAULT_MIN_SCORE_RATIO,
        }
    }
}

impl RetrieveOptions {
    /// Reject out-of-range values instead of clamping them.
    pub fn validate(&self) -> crate::Result<()> {
        ensure_unit_interval("alpha", self.alpha)?;
        ensure_unit_interval("min_score_ratio", self.min_score_ratio)
    }

    pub fn with_k(self, k: usize) -> Self {
        Self { k, ..self }
    }

    pub fn with_hybrid(self, hybrid: bool) -> Self {
        Self { hybrid, ..self }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    pub fn with_min_score_ratio(self, min_score_ratio: f32) -> Self {
        Self { min_score_ratio, ..self }
    }
}

/// Ingestion settings (`[ingest]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub data_dir: String,
    pub chunk_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { data_dir: "data".to_string(), chunk_size: DEFAULT_CHUNK_SIZE }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Defaults {
    retrieval: RetrieveOptions,
    ingest: IngestConfig,
}

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    /// Load `localrag.toml` + `localrag.<env>.toml` + `APP_*` env vars from the
    /// current directory. `RUST_ENV` selects the environment (default `dev`).
    pub fn load() -> crate::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    pub fn load_from(base: &Path, env_name: &str) -> crate::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Defaults::default()))
            .merge(Toml::file(base.join("localrag.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("localrag.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("localrag.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("localrag.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: base.to_path_buf() };
        config.retrieval()?;
        Ok(config)
    }

    /// Validated retrieval defaults. A negative `k` is an invalid parameter,
    /// not a type error.
    pub fn retrieval(&self) -> crate::Result<RetrieveOptions> {
        if let Ok(k) = self.figment.extract_inner::<i64>("retrieval.k") {
            if k < 0 {
                return Err(Error::invalid("k", k));
            }
        }
        let opts: RetrieveOptions = self
            .figment
            .extract_inner("retrieval")
            .map_err(|e| Error::Config(format!("retrieval: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn ingest(&self) -> crate::Result<IngestConfig> {
        let ingest: IngestConfig = self
            .figment
            .extract_inner("ingest")
            .map_err(|e| Error::Config(format!("ingest: {e}")))?;
        if ingest.chunk_size == 0 {
            return Err(Error::Config("ingest.chunk_size must be positive".to_string()));
        }
        Ok(ingest)
    }

    /// `ingest.data_dir` expanded and resolved against the config directory.
    pub fn data_dir(&self) -> crate::Result<PathBuf> {
        Ok(resolve_with_base(&self.base_dir, self.ingest()?.data_dir))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
