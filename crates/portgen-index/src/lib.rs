//! Source index boundary for the port generator.
//!
//! `portgen-index` defines the narrow query surface the entity collector is
//! written against: a tree of [`Cursor`]s that can be asked for their kind,
//! spelling, type, byte layout and token stream. Any parser that can answer
//! those questions is substitutable through [`SourceIndex`].
//!
//! # Architecture
//!
//! ```text
//! Input files          Index                 Consumers
//! ───────────    ──────────────────    ─────────────────────
//! *.h / *.hpp ──> SourceIndex::parse ──> Cursor tree ──> entity collector
//!                 (cpp: tree-sitter)     (kind, spelling, size,
//!                 (memory: prebuilt)      offsets, tokens)
//! ```
//!
//! The tree-sitter implementation computes record layouts itself (x86-64
//! LP64 rules), including overlapping union members, so the collector can ask
//! for per-field offsets the same way it would ask libclang.
//!
//! # Example
//!
//! ```ignore
//! use portgen_index::{Cursor, CursorKind, cpp::parse_cpp};
//!
//! let unit = parse_cpp("union hmm_vec2 { struct { float X, Y; }; float Elements[2]; };")?;
//! let record = &unit.children()[0];
//! assert_eq!(record.kind(), CursorKind::Union);
//! assert_eq!(record.type_size(), Some(8));
//! assert_eq!(record.field_offset("Y"), Some(4));
//! ```

pub mod cursor;
pub mod memory;
pub mod token;
pub mod traits;

#[cfg(feature = "cpp")]
pub mod cpp;

// Re-exports: cursor model
pub use cursor::{Cursor, CursorKind, Visibility};
pub use token::{Token, TokenKind, tokenize};

// Re-exports: traits
pub use traits::{IndexError, SourceIndex};

// Re-exports: built-in indexes
pub use memory::{MemoryCursor, MemoryIndex};

#[cfg(feature = "cpp")]
pub use cpp::{CPP_INDEX, CppCursor, CppIndex, parse_cpp};
