//! Output workspace: where generated files are persisted.
//!
//! A run owns its output directory. Before writing, the sink is validated
//! and cleared of everything except build manifests, so each run starts from
//! a clean slate.

use portgen_codegen::GeneratedFile;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Error that can occur while materializing output.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("output directory {} is not writable: {source}", path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to clear {}: {source}", path.display())]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Destination for generated files.
pub trait OutputSink {
    /// Check that the destination can take output. Runs before anything is
    /// cleared or written.
    fn prepare(&mut self) -> Result<(), WorkspaceError> {
        Ok(())
    }

    /// Remove prior output, keeping build manifests. Returns how many
    /// entries were removed.
    fn clear(&mut self) -> Result<usize, WorkspaceError>;

    /// Write one generated file.
    fn write(&mut self, file: &GeneratedFile) -> Result<(), WorkspaceError>;
}

/// True for files that survive a clear (`*.csproj`).
pub fn is_build_manifest(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csproj"))
}

/// Sink writing into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn unwritable(&self, source: io::Error) -> WorkspaceError {
        WorkspaceError::Unwritable {
            path: self.root.clone(),
            source,
        }
    }
}

impl OutputSink for DirectorySink {
    fn prepare(&mut self) -> Result<(), WorkspaceError> {
        std::fs::create_dir_all(&self.root).map_err(|e| self.unwritable(e))?;
        // Probe file is removed on drop.
        tempfile::Builder::new()
            .prefix(".portgen-probe")
            .tempfile_in(&self.root)
            .map_err(|e| self.unwritable(e))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<usize, WorkspaceError> {
        let clear_error = |path: &Path, source| WorkspaceError::Clear {
            path: path.to_path_buf(),
            source,
        };
        let entries = std::fs::read_dir(&self.root).map_err(|e| clear_error(&self.root, e))?;

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| clear_error(&self.root, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| clear_error(&path, e))?;
            if file_type.is_dir() {
                std::fs::remove_dir_all(&path).map_err(|e| clear_error(&path, e))?;
            } else if is_build_manifest(&path) {
                tracing::debug!(path = %path.display(), "keeping build manifest");
                continue;
            } else {
                std::fs::remove_file(&path).map_err(|e| clear_error(&path, e))?;
            }
            removed += 1;
        }
        Ok(removed)
    }

    fn write(&mut self, file: &GeneratedFile) -> Result<(), WorkspaceError> {
        let path = self.root.join(&file.path);
        let write_error = |source| WorkspaceError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(&path, &file.contents).map_err(write_error)
    }
}

/// Sink keeping files in memory, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl OutputSink for MemorySink {
    fn clear(&mut self) -> Result<usize, WorkspaceError> {
        let before = self.files.len();
        self.files.retain(|path, _| is_build_manifest(Path::new(path)));
        Ok(before - self.files.len())
    }

    fn write(&mut self, file: &GeneratedFile) -> Result<(), WorkspaceError> {
        self.files.insert(file.path.clone(), file.contents.clone());
        Ok(())
    }
}
