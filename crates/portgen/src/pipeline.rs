//! Pipeline driver: enumerate, collect, emit, persist.
//!
//! Collection of every input completes before any emitter runs; emitters see
//! the finished entity graph only.

use crate::config::PortgenConfig;
use crate::workspace::{OutputSink, WorkspaceError};
use portgen_codegen::ir::Severity;
use portgen_codegen::{EmitOptions, collect_all, emit_all};
use portgen_index::{CPP_INDEX, SourceIndex};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Fatal pipeline errors. Per-file and per-entity problems are not errors;
/// they end up in the [`Report`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input directory {} does not exist", .0.display())]
    MissingInput(PathBuf),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// A file that could not be indexed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Input files collected successfully.
    pub files: usize,
    /// Input files skipped.
    pub failures: Vec<FailedFile>,
    pub types: usize,
    pub functions: usize,
    pub warnings: usize,
    pub notes: usize,
    /// Paths written, relative to the sink.
    pub written: Vec<String>,
    /// Stale entries removed from the sink before writing.
    pub removed: usize,
}

impl Report {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ported {} file(s): {} type(s), {} function(s), {} file(s) written",
            self.files,
            self.types,
            self.functions,
            self.written.len()
        )?;
        if self.has_failures() {
            write!(f, "; {} file(s) failed", self.failures.len())?;
        }
        if self.warnings > 0 {
            write!(f, "; {} warning(s)", self.warnings)?;
        }
        for failure in &self.failures {
            write!(f, "\n  failed: {}: {}", failure.path.display(), failure.error)?;
        }
        Ok(())
    }
}

/// Every file under `dir` that `index` handles, in sorted order.
pub fn discover_inputs<I: SourceIndex>(
    index: &I,
    dir: &Path,
) -> Result<Vec<PathBuf>, PipelineError> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingInput(dir.to_path_buf()));
    }

    let mut inputs: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::warn!(%error, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && index.handles(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();
    inputs.sort();
    Ok(inputs)
}

/// Run the pipeline with the C++ index over the configured directories.
pub fn run<S: OutputSink + ?Sized>(
    config: &PortgenConfig,
    sink: &mut S,
) -> Result<Report, PipelineError> {
    let input_dir = config.input_dir();
    tracing::info!(input = %input_dir.display(), "scanning inputs");
    let inputs = discover_inputs(&CPP_INDEX, &input_dir)?;
    run_with(&CPP_INDEX, &inputs, &EmitOptions::default(), sink)
}

/// Run the pipeline over explicit inputs with any index.
///
/// The sink is validated first, so an unusable destination aborts the run
/// before anything is parsed or cleared.
pub fn run_with<I, S>(
    index: &I,
    inputs: &[PathBuf],
    options: &EmitOptions,
    sink: &mut S,
) -> Result<Report, PipelineError>
where
    I: SourceIndex,
    S: OutputSink + ?Sized,
{
    sink.prepare()?;

    let collection = collect_all(index, inputs);
    let graph = &collection.graph;
    let generated = emit_all(graph, options);

    let removed = sink.clear()?;
    for file in &generated {
        sink.write(file)?;
    }

    let report = Report {
        files: collection.files,
        failures: collection
            .failures
            .iter()
            .map(|failure| FailedFile {
                path: failure.path.clone(),
                error: failure.error.to_string(),
            })
            .collect(),
        types: graph.types.len(),
        functions: graph.functions.len(),
        warnings: graph.warning_count(),
        notes: graph
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Note)
            .count(),
        written: generated.into_iter().map(|file| file.path).collect(),
        removed,
    };
    tracing::info!(
        files = report.files,
        failed = report.failures.len(),
        types = report.types,
        functions = report.functions,
        written = report.written.len(),
        "run complete"
    );
    Ok(report)
}
