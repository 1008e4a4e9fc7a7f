//! Entity extraction and C# synthesis for ported numerics libraries.
//!
//! `portgen-codegen` walks [`portgen_index`] cursor trees into an entity graph
//! of types and free functions, translates their bodies through a token rule
//! table, and emits explicit-layout C# structs, a shared capability interface
//! and a static function class.
//!
//! # Architecture
//!
//! ```text
//! Cursor trees        Entity graph            Emitters
//! ────────────    ─────────────────────    ──────────────────
//! unit a.h ──┐    TypeInfo (size,        ┌─> IVector.cs
//! unit b.h ──┼──>  fields + offsets,  ───┼─> Functions.cs
//! unit c.h ──┘     methods)              └─> <Type>.cs (layout,
//!  (collect)      FunctionInfo                methods, swizzles)
//!                 Diagnostic
//! ```
//!
//! # Example
//!
//! ```ignore
//! use portgen_codegen::{EmitOptions, collect_unit, emit_all};
//! use portgen_index::parse_cpp;
//!
//! let unit = parse_cpp("typedef union hmm_vec2 { struct { float X, Y; }; float Elements[2]; } hmm_vec2;")?;
//! let graph = collect_unit(&unit);
//! let files = emit_all(&graph, &EmitOptions::default());
//! assert!(files.iter().any(|f| f.path == "Vector2.cs"));
//! ```

pub mod collect;
pub mod ir;
pub mod output;
pub mod swizzle;
pub mod traits;
pub mod translate;
pub mod types;

// Re-exports: collection
pub use collect::{Collection, FileFailure, collect_all, collect_unit};

// Re-exports: emission
pub use output::{emit_all, emitters, find_emitter};
pub use traits::{EmitOptions, Emitter, GeneratedFile};

// Re-exports: mapping and translation
pub use translate::{Translator, UNTRANSLATED_TAG};
pub use types::{MappedType, TypeMapper, map_type};
