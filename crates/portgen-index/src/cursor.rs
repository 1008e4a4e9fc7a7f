//! The cursor query interface.

use crate::token::Token;
use serde::Serialize;

/// Kind of declaration or construct a cursor denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorKind {
    TranslationUnit,
    Namespace,
    Struct,
    Class,
    Union,
    Field,
    Method,
    Constructor,
    Destructor,
    Function,
    Parameter,
    Template,
    Typedef,
    /// Transparent grouping (preprocessor blocks, linkage specifications).
    Unexposed,
}

impl CursorKind {
    /// Struct, class or union.
    pub fn is_record(self) -> bool {
        matches!(self, CursorKind::Struct | CursorKind::Class | CursorKind::Union)
    }

    /// Anything with a parameter list and (possibly) a body.
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            CursorKind::Method
                | CursorKind::Constructor
                | CursorKind::Destructor
                | CursorKind::Function
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CursorKind::TranslationUnit => "translation unit",
            CursorKind::Namespace => "namespace",
            CursorKind::Struct => "struct",
            CursorKind::Class => "class",
            CursorKind::Union => "union",
            CursorKind::Field => "field",
            CursorKind::Method => "method",
            CursorKind::Constructor => "constructor",
            CursorKind::Destructor => "destructor",
            CursorKind::Function => "function",
            CursorKind::Parameter => "parameter",
            CursorKind::Template => "template",
            CursorKind::Typedef => "typedef",
            CursorKind::Unexposed => "unexposed",
        }
    }
}

impl std::fmt::Display for CursorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Linkage-level visibility of a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// External linkage; callable from other translation units.
    #[default]
    Public,
    /// `static` or anonymous-namespace linkage.
    Internal,
}

/// A node of a parsed translation unit.
///
/// Cursors are cheap handles: `children` returns owned cursors, and cloning
/// one never copies the subtree.
pub trait Cursor: Clone + Send + Sync {
    /// What this cursor denotes.
    fn kind(&self) -> CursorKind;

    /// Declared name; empty for anonymous records and unnamed parameters.
    /// Out-of-line member definitions keep their owner (`Vec2::Length`).
    fn spelling(&self) -> String;

    /// Declared type of a field or parameter, or the result type of a
    /// callable, spelled as in the source (e.g. `const hmm_vec3 &`).
    fn type_spelling(&self) -> String;

    /// True if this cursor carries a definition (a record body, a function body).
    fn is_definition(&self) -> bool;

    /// True for `static` members and `static` free functions.
    fn is_static(&self) -> bool;

    fn visibility(&self) -> Visibility;

    /// Direct children in declaration order.
    fn children(&self) -> Vec<Self>;

    /// Size in bytes of the record this cursor defines, if computable.
    fn type_size(&self) -> Option<u64>;

    /// Byte offset of `field` from the start of the record this cursor
    /// defines. Members of anonymous nested records are addressable by name.
    /// `None` for bit-fields and fields whose layout is unknown.
    fn field_offset(&self, field: &str) -> Option<u64>;

    /// Tokens spanning the cursor's full extent.
    fn tokens(&self) -> Vec<Token>;

    /// True if the cursor has no name (anonymous record, unnamed parameter).
    fn is_anonymous(&self) -> bool {
        self.spelling().is_empty()
    }
}
