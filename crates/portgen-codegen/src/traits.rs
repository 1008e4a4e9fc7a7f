//! Traits for emitters.

use crate::ir::EntityGraph;
use serde::Serialize;

/// Options shared by every emitter in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// C# namespace of every generated file.
    pub namespace: String,
    /// Emit one file per collected type.
    pub emit_types: bool,
    /// Emit the `IVector` capability interface and conformances to it.
    pub emit_interfaces: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            namespace: "Portgen.Numerics".to_string(),
            emit_types: true,
            emit_interfaces: true,
        }
    }
}

/// One output file, named relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// A code emitter.
///
/// Emitters read the completed entity graph and produce C# source files. They
/// run only after collection has finished.
///
/// # Implementing Custom Emitters
///
/// ```ignore
/// use portgen_codegen::{EmitOptions, Emitter, GeneratedFile, ir::EntityGraph};
///
/// struct ManifestEmitter;
///
/// impl Emitter for ManifestEmitter {
///     fn name(&self) -> &'static str { "manifest" }
///     fn generate(&self, graph: &EntityGraph, _: &EmitOptions) -> Vec<GeneratedFile> {
///         let names: Vec<&str> = graph.types.iter().map(|t| t.name.as_str()).collect();
///         vec![GeneratedFile::new("types.txt", names.join("\n"))]
///     }
/// }
/// ```
pub trait Emitter: Send + Sync {
    /// Unique emitter identifier (e.g., "structs", "interfaces").
    fn name(&self) -> &'static str;

    /// Generate files from the entity graph.
    fn generate(&self, graph: &EntityGraph, options: &EmitOptions) -> Vec<GeneratedFile>;
}
