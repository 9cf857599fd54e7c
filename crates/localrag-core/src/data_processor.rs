//! Minimal ingestion collaborator: turns a directory of text files into a [`Corpus`].
//!
//! Only plain text, markup (kept raw) and CSV files are read. Text is cut into
//! fixed-size character windows; CSV files yield one fragment per row.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::types::{Corpus, CorpusBuilder, SourceLocation, SourceType};

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Window size in characters.
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE }
    }
}

#[derive(Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    /// A zero chunk size is rejected rather than rounded up.
    pub fn with_chunk_size(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::invalid("chunk_size", chunk_size));
        }
        Ok(Self { chunking_config: ChunkingConfig { chunk_size } })
    }

    /// Ingest every supported file under `data_dir`. A missing directory is an
    /// [`Error::Io`]; a directory without supported files yields an empty corpus.
    pub fn process_directory(&self, data_dir: &Path) -> Result<Corpus> {
        fs::metadata(data_dir)?;
        let files = self.list_supported_files(data_dir);
        if files.is_empty() {
            tracing::warn!(dir = %data_dir.display(), "no supported files found");
            return Ok(Corpus::default());
        }
        let mut builder = CorpusBuilder::new();
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!("processing file {}/{}: {}", file_index + 1, files.len(), file_path.display());
            let content = self.read_file_content(file_path)?;
            let source = file_path.to_string_lossy().to_string();
            let source_type = Self::source_type_of(file_path);
            let before = builder.len();
            match source_type {
                SourceType::Tabular => Self::push_rows(&mut builder, &content, &source)?,
                _ => self.push_chunks(&mut builder, &content, &source, source_type)?,
            }
            tracing::debug!(fragments = builder.len() - before, source = %source, "file ingested");
        }
        tracing::info!(files = files.len(), fragments = builder.len(), "ingestion complete");
        Ok(builder.build())
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }

    fn source_type_of(file_path: &Path) -> SourceType {
        file_path
            .extension()
            .and_then(|s| s.to_str())
            .map_or(SourceType::Unknown, SourceType::from_extension)
    }

    /// Fixed-size windows; the chunk number counts every window, kept or not.
    fn push_chunks(&self, builder: &mut CorpusBuilder, content: &str, source: &str, source_type: SourceType) -> Result<()> {
        for (n, window) in split_chars(content, self.chunking_config.chunk_size).into_iter().enumerate() {
            let text = window.trim();
            if text.is_empty() { continue; }
            let location = SourceLocation { chunk: u32::try_from(n + 1).ok(), ..SourceLocation::default() };
            builder.push(text, source, source_type, location)?;
        }
        Ok(())
    }

    fn push_rows(builder: &mut CorpusBuilder, content: &str, source: &str) -> Result<()> {
        for (n, line) in content.lines().enumerate() {
            let row = line.trim();
            if row.is_empty() { continue; }
            let location = SourceLocation { row: u32::try_from(n + 1).ok(), ..SourceLocation::default() };
            builder.push(row, source, SourceType::Tabular, location)?;
        }
        Ok(())
    }

    fn list_supported_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            if entry.file_name().to_string_lossy().starts_with('.') { continue; }
            let path = entry.path();
            let supported = matches!(
                Self::source_type_of(path),
                SourceType::PlainText | SourceType::Markup | SourceType::Tabular
            );
            if supported { files.push(path.to_path_buf()); }
        }
        files.sort(); files
    }
}

/// Split into windows of at most `size` characters without breaking UTF-8.
fn split_chars(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == size {
            windows.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() { windows.push(&text[start..]); }
    windows
}
