//! Domain types shared by the keyword, vector and hybrid crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

use crate::error::{Error, Result};

/// Position of a fragment inside its [`Corpus`]. Both indices are aligned on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FragmentId(pub u32);

impl FragmentId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for FragmentId {
    type Error = Error;

    /// Fails with [`Error::CorpusFull`] past `u32::MAX`.
    fn try_from(position: usize) -> Result<Self> {
        u32::try_from(position).map(Self).map_err(|_| Error::CorpusFull)
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of document a fragment was cut from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    PlainText,
    Markup,
    Tabular,
    PageBased,
    #[default]
    Unknown,
}

impl SourceType {
    /// Guess the source type from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Self::PlainText,
            "md" | "markdown" | "html" | "htm" => Self::Markup,
            "csv" | "tsv" => Self::Tabular,
            "pdf" => Self::PageBased,
            _ => Self::Unknown,
        }
    }
}

/// Raw location metadata attached by the ingestion step. Every field is optional;
/// [`Fragment::locator`] picks the one that applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub page: Option<u32>,
    pub row: Option<u32>,
    pub chunk: Option<u32>,
}

/// Resolved position of a fragment within its source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Locator {
    Page(u32),
    Row(u32),
    Chunk(u32),
    Unknown,
}

impl Locator {
    /// Human readable description used in citations.
    pub fn describe(&self) -> String {
        match self {
            Self::Page(n) => format!("page {n}"),
            Self::Row(n) => format!("row {n}"),
            Self::Chunk(n) => format!("chunk {n}"),
            Self::Unknown => "unknown location".to_string(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// An immutable unit of indexed text.
///
/// - `id`: position in the owning corpus, assigned by [`CorpusBuilder`]
/// - `source_path`: originating document identifier
/// - `source_type`/`location`: metadata used to build citations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: FragmentId,
    pub text: String,
    pub source_path: String,
    pub source_type: SourceType,
    #[serde(default)]
    pub location: SourceLocation,
}

impl Fragment {
    /// Resolve the locator: page (page-based sources) > row (tabular) > chunk > unknown.
    pub fn locator(&self) -> Locator {
        let loc = &self.location;
        match (self.source_type, loc.page, loc.row, loc.chunk) {
            (SourceType::PageBased, Some(page), _, _) => Locator::Page(page),
            (SourceType::Tabular, _, Some(row), _) => Locator::Row(row),
            (_, _, _, Some(chunk)) => Locator::Chunk(chunk),
            _ => Locator::Unknown,
        }
    }
}

/// Ordered, immutable fragment sequence. `fragments[i].id == FragmentId(i)` always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Corpus {
    fragments: Vec<Fragment>,
}

impl Corpus {
    /// Build a corpus, renumbering ids so they match positions.
    pub fn from_fragments(fragments: impl IntoIterator<Item = Fragment>) -> Result<Self> {
        let mut builder = CorpusBuilder::new();
        for f in fragments {
            builder.push_fragment(f)?;
        }
        Ok(builder.build())
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn get(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(id.as_usize())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.fragments.iter()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Number of distinct `source_path` values.
    pub fn source_count(&self) -> usize {
        let mut paths: Vec<&str> = self.fragments.iter().map(|f| f.source_path.as_str()).collect();
        paths.sort_unstable();
        paths.dedup();
        paths.len()
    }
}

impl Index<FragmentId> for Corpus {
    type Output = Fragment;

    fn index(&self, id: FragmentId) -> &Fragment {
        &self.fragments[id.as_usize()]
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}

/// Append-only builder; the only way ids get assigned.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    fragments: Vec<Fragment>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Append a fragment and return the id it was given. Fails once ids run past `u32::MAX`.
    pub fn push(
        &mut self,
        text: impl Into<String>,
        source_path: impl Into<String>,
        source_type: SourceType,
        location: SourceLocation,
    ) -> Result<FragmentId> {
        let id = self.next_id()?;
        self.fragments.push(Fragment {
            id,
            text: text.into(),
            source_path: source_path.into(),
            source_type,
            location,
        });
        Ok(id)
    }

    /// Append an existing fragment, overwriting its id.
    pub fn push_fragment(&mut self, mut fragment: Fragment) -> Result<FragmentId> {
        let id = self.next_id()?;
        fragment.id = id;
        self.fragments.push(fragment);
        Ok(id)
    }

    pub fn build(self) -> Corpus {
        Corpus { fragments: self.fragments }
    }

    fn next_id(&self) -> Result<FragmentId> {
        FragmentId::try_from(self.fragments.len())
    }
}

/// One score per fragment, in corpus order, produced by a single index for a single query.
pub type ScoreVector = Vec<f32>;

/// Per-fragment breakdown of a hybrid score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedScore {
    pub vector_score: f32,
    /// `None` when keyword scoring is disabled.
    pub keyword_score: Option<f32>,
    pub combined: f32,
}

/// Citation-ready view of a selected fragment. Created per query, owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub fragment_id: FragmentId,
    pub source_path: String,
    pub preview_text: String,
    pub locator: Locator,
    pub score: f32,
}
