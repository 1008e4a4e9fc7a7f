//! Traits for source indexes.

use crate::cursor::Cursor;
use std::path::{Path, PathBuf};

/// Error that can occur when indexing a source file.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported input: {0}")]
    Unsupported(String),
}

/// A source index parses input files into cursor trees.
pub trait SourceIndex: Send + Sync {
    /// Cursor type of the trees this index produces.
    type Cursor: Cursor;

    /// Language identifier (e.g., "cpp").
    fn language(&self) -> &'static str;

    /// File extensions this index handles (e.g., &["h", "hpp"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Parse one file into the cursor of its translation unit.
    fn parse(&self, path: &Path) -> Result<Self::Cursor, IndexError>;

    /// True if `path` has one of [`SourceIndex::extensions`].
    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}
