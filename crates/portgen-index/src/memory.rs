//! In-memory source index.
//!
//! Cursor trees assembled by hand, for embedding callers that already have a
//! layout description and for exercising the collector without a parser.

use crate::cursor::{Cursor, CursorKind, Visibility};
use crate::token::{Token, tokenize};
use crate::traits::{IndexError, SourceIndex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct MemoryNode {
    kind: CursorKind,
    spelling: String,
    type_spelling: String,
    definition: bool,
    is_static: bool,
    visibility: Visibility,
    size: Option<u64>,
    offsets: Vec<(String, Option<u64>)>,
    tokens: Vec<Token>,
    children: Vec<MemoryCursor>,
}

/// A hand-built cursor.
#[derive(Debug, Clone)]
pub struct MemoryCursor(Arc<MemoryNode>);

impl MemoryCursor {
    fn new(kind: CursorKind, spelling: &str) -> Self {
        Self(Arc::new(MemoryNode {
            kind,
            spelling: spelling.to_string(),
            type_spelling: String::new(),
            definition: true,
            is_static: false,
            visibility: Visibility::Public,
            size: None,
            offsets: Vec::new(),
            tokens: Vec::new(),
            children: Vec::new(),
        }))
    }

    fn node(&mut self) -> &mut MemoryNode {
        Arc::make_mut(&mut self.0)
    }

    /// A translation unit holding `children`.
    pub fn unit(children: Vec<MemoryCursor>) -> Self {
        let mut unit = Self::new(CursorKind::TranslationUnit, "");
        unit.node().children = children;
        unit
    }

    /// A record definition of `size` bytes.
    pub fn record(kind: CursorKind, name: &str, size: u64) -> Self {
        let mut record = Self::new(kind, name);
        record.node().size = Some(size);
        record
    }

    /// A record whose layout could not be computed.
    pub fn opaque_record(kind: CursorKind, name: &str) -> Self {
        Self::new(kind, name)
    }

    /// Append a field child. `offset` is what `field_offset` will answer.
    pub fn field(mut self, name: &str, ty: &str, offset: Option<u64>) -> Self {
        let mut field = Self::new(CursorKind::Field, name);
        field.node().type_spelling = ty.to_string();
        let node = self.node();
        node.offsets.push((name.to_string(), offset));
        node.children.push(field);
        self
    }

    /// Append an anonymous nested record whose members live at the given
    /// offsets of this record.
    pub fn anonymous(mut self, kind: CursorKind, fields: &[(&str, &str, Option<u64>)]) -> Self {
        let mut inner = Self::new(kind, "");
        for (name, ty, offset) in fields {
            inner = inner.field(name, ty, *offset);
            self.node().offsets.push((name.to_string(), *offset));
        }
        self.node().children.push(inner);
        self
    }

    /// `typedef <target> <name>;`
    pub fn typedef(name: &str, target: &str) -> Self {
        let mut alias = Self::new(CursorKind::Typedef, name);
        alias.node().type_spelling = target.to_string();
        alias
    }

    /// Append any child cursor.
    pub fn child(mut self, child: MemoryCursor) -> Self {
        self.node().children.push(child);
        self
    }

    /// A callable of `kind` with the given result type, parameters and body
    /// source (including braces). Tokens cover the whole declaration.
    pub fn callable(
        kind: CursorKind,
        name: &str,
        result: &str,
        params: &[(&str, &str)],
        body: &str,
    ) -> Self {
        let mut callable = Self::new(kind, name);
        let signature = params
            .iter()
            .map(|(ty, name)| format!("{ty} {name}"))
            .collect::<Vec<_>>()
            .join(", ");
        let source = format!("{result} {name}({signature}) {body}");
        let node = callable.node();
        node.type_spelling = result.to_string();
        node.tokens = tokenize(&source);
        node.definition = body.contains('{');
        for (ty, pname) in params {
            let mut param = Self::new(CursorKind::Parameter, pname);
            param.node().type_spelling = ty.to_string();
            node.children.push(param);
        }
        callable
    }

    pub fn function(name: &str, result: &str, params: &[(&str, &str)], body: &str) -> Self {
        Self::callable(CursorKind::Function, name, result, params, body)
    }

    pub fn method(name: &str, result: &str, params: &[(&str, &str)], body: &str) -> Self {
        Self::callable(CursorKind::Method, name, result, params, body)
    }

    /// Mark as `static`.
    pub fn with_static(mut self) -> Self {
        self.node().is_static = true;
        self
    }

    /// Mark as internal linkage.
    pub fn with_internal(mut self) -> Self {
        self.node().visibility = Visibility::Internal;
        self
    }

    /// Mark as a declaration without definition.
    pub fn declaration_only(mut self) -> Self {
        self.node().definition = false;
        self
    }
}

impl Cursor for MemoryCursor {
    fn kind(&self) -> CursorKind {
        self.0.kind
    }

    fn spelling(&self) -> String {
        self.0.spelling.clone()
    }

    fn type_spelling(&self) -> String {
        self.0.type_spelling.clone()
    }

    fn is_definition(&self) -> bool {
        self.0.definition
    }

    fn is_static(&self) -> bool {
        self.0.is_static
    }

    fn visibility(&self) -> Visibility {
        self.0.visibility
    }

    fn children(&self) -> Vec<Self> {
        self.0.children.clone()
    }

    fn type_size(&self) -> Option<u64> {
        self.0.size
    }

    fn field_offset(&self, field: &str) -> Option<u64> {
        self.0
            .offsets
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, offset)| *offset)
    }

    fn tokens(&self) -> Vec<Token> {
        self.0.tokens.clone()
    }
}

/// A source index over prebuilt cursor trees, keyed by path.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    units: HashMap<PathBuf, Result<MemoryCursor, String>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the translation unit returned for `path`.
    pub fn with_unit(mut self, path: impl Into<PathBuf>, unit: MemoryCursor) -> Self {
        self.units.insert(path.into(), Ok(unit));
        self
    }

    /// Make parsing `path` fail with `message`.
    pub fn with_failure(mut self, path: impl Into<PathBuf>, message: &str) -> Self {
        self.units.insert(path.into(), Err(message.to_string()));
        self
    }

    /// Registered paths in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.units.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl SourceIndex for MemoryIndex {
    type Cursor = MemoryCursor;

    fn language(&self) -> &'static str {
        "memory"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["h", "hh", "hpp", "hxx"]
    }

    fn parse(&self, path: &Path) -> Result<MemoryCursor, IndexError> {
        match self.units.get(path) {
            Some(Ok(unit)) => Ok(unit.clone()),
            Some(Err(message)) => Err(IndexError::Parse(message.clone())),
            None => Err(IndexError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}
