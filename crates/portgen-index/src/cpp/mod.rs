//! Tree-sitter based C++ source index.
//!
//! Builds an owned cursor tree from a tree-sitter-cpp syntax tree. Records get
//! their layout computed while their members are walked, so nested records
//! and typedefs declared earlier in the unit are known when later members use
//! them.
//!
//! Preprocessor blocks and `extern "C"` blocks are transparent: both branches
//! of an `#if` are visited. Templates are reported as opaque cursors.

mod layout;
mod tokens;

pub use layout::{RecordLayout, TypeLayout};

use crate::cursor::{Cursor, CursorKind, Visibility};
use crate::token::{Token, tokenize};
use crate::traits::{IndexError, SourceIndex};
use layout::{LayoutBuilder, LayoutTable, declared};
use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use tree_sitter::{Node, Parser};

/// Static instance of the C++ index for callers that want a `&'static dyn`.
pub static CPP_INDEX: CppIndex = CppIndex;

/// C++ source index using tree-sitter.
pub struct CppIndex;

impl SourceIndex for CppIndex {
    type Cursor = CppCursor;

    fn language(&self) -> &'static str {
        "cpp"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["h", "hh", "hpp", "hxx", "cpp", "cc", "cxx"]
    }

    fn parse(&self, path: &Path) -> Result<CppCursor, IndexError> {
        let source = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_cpp(&source)
    }
}

/// Parse C++ source into a translation-unit cursor.
pub fn parse_cpp(source: &str) -> Result<CppCursor, IndexError> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_cpp::language().into())
        .map_err(|err| IndexError::Parse(err.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| IndexError::Parse("failed to parse".into()))?;

    let root = tree.root_node();
    if root.has_error() {
        let location = first_error(root)
            .map(|node| {
                let pos = node.start_position();
                format!(" at line {}, column {}", pos.row + 1, pos.column + 1)
            })
            .unwrap_or_default();
        return Err(IndexError::Parse(format!("syntax error in source{location}")));
    }

    let mut ctx = BuildContext::new(source);
    let children = ctx.build_items(root, &Scope::default());
    let mut unit = ctx.data(CursorKind::TranslationUnit, String::new(), root.byte_range());
    unit.children = children;
    Ok(CppCursor(Arc::new(unit)))
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

#[derive(Debug)]
struct CursorData {
    kind: CursorKind,
    spelling: String,
    type_spelling: String,
    definition: bool,
    is_static: bool,
    visibility: Visibility,
    layout: Option<RecordLayout>,
    /// Leaf tokens, captured eagerly for callables.
    tokens: Option<Vec<Token>>,
    source: Arc<str>,
    range: Range<usize>,
    children: Vec<CppCursor>,
}

/// A cursor into a parsed C++ translation unit.
///
/// Callables carry the tree-sitter leaf tokens of their extent; other cursors
/// re-lex their source range on demand.
#[derive(Debug, Clone)]
pub struct CppCursor(Arc<CursorData>);

impl CppCursor {
    /// Computed layout, for record cursors.
    pub fn layout(&self) -> Option<&RecordLayout> {
        self.0.layout.as_ref()
    }
}

impl Cursor for CppCursor {
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
        self.0.layout.as_ref().and_then(|layout| layout.size)
    }

    fn field_offset(&self, field: &str) -> Option<u64> {
        self.0
            .layout
            .as_ref()
            .and_then(|layout| layout.offset_of(field))
    }

    fn tokens(&self) -> Vec<Token> {
        match &self.0.tokens {
            Some(tokens) => tokens.clone(),
            None => tokenize(&self.0.source[self.0.range.clone()]),
        }
    }
}

/// Lexical context a declaration appears in.
#[derive(Debug, Clone, Default)]
struct Scope {
    /// Name of the enclosing record, for member declarations.
    record: Option<String>,
    /// Inside an anonymous namespace.
    internal: bool,
}

/// What a declarator chain says about the declared entity.
#[derive(Debug, Default)]
struct DeclInfo<'t> {
    name: String,
    name_kind: &'t str,
    /// Pointer/reference decorations as spelled, e.g. `" *"`, `" &"`.
    indirection: String,
    indirect: bool,
    dims: Vec<Option<u64>>,
    function: Option<Node<'t>>,
}

impl DeclInfo<'_> {
    fn spell_type(&self, qualifiers: &str, base: &str) -> String {
        let mut spelling = format!("{qualifiers}{base}{}", self.indirection);
        if !self.dims.is_empty() {
            spelling.push(' ');
            for dim in &self.dims {
                match dim {
                    Some(n) => spelling.push_str(&format!("[{n}]")),
                    None => spelling.push_str("[]"),
                }
            }
        }
        spelling
    }
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn all_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn declarators(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.children_by_field_name("declarator", &mut cursor)
        .collect()
}

fn is_record_specifier(node: Node) -> bool {
    matches!(
        node.kind(),
        "struct_specifier" | "class_specifier" | "union_specifier"
    )
}

fn is_preproc_block(kind: &str) -> bool {
    matches!(
        kind,
        "preproc_if" | "preproc_ifdef" | "preproc_else" | "preproc_elif" | "preproc_elifdef"
    )
}

fn parse_int(text: &str) -> Option<u64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => digits.parse().ok(),
    }
}

struct BuildContext<'a> {
    source: &'a str,
    shared: Arc<str>,
    layouts: LayoutTable,
    empty_records: HashSet<String>,
}

impl<'a> BuildContext<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            shared: Arc::from(source),
            layouts: LayoutTable::new(),
            empty_records: HashSet::new(),
        }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Node text with whitespace runs collapsed to one space.
    fn spelled(&self, node: Node) -> String {
        self.node_text(node)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn data(&self, kind: CursorKind, spelling: String, range: Range<usize>) -> CursorData {
        CursorData {
            kind,
            spelling,
            type_spelling: String::new(),
            definition: false,
            is_static: false,
            visibility: Visibility::Public,
            layout: None,
            tokens: None,
            source: Arc::clone(&self.shared),
            range,
            children: Vec::new(),
        }
    }

    fn has_keyword(&self, node: Node, keyword: &str) -> bool {
        all_children(node)
            .into_iter()
            .any(|child| child.kind() == keyword || self.node_text(child) == keyword)
    }

    fn is_static(&self, node: Node) -> bool {
        all_children(node).into_iter().any(|child| {
            child.kind() == "storage_class_specifier" && self.node_text(child) == "static"
        })
    }

    /// `const `/`volatile ` qualifiers attached to a declaration's type.
    fn qualifiers(&self, node: Node) -> String {
        all_children(node)
            .into_iter()
            .filter(|child| child.kind() == "type_qualifier")
            .map(|child| format!("{} ", self.node_text(child)))
            .collect()
    }

    fn read_declarator<'t>(&self, mut node: Node<'t>) -> DeclInfo<'t> {
        let mut info = DeclInfo::default();
        loop {
            let next = match node.kind() {
                "pointer_declarator" => {
                    if info.function.is_some() {
                        // pointer to function: a data member, not a prototype
                        info.function = None;
                        info.indirection.push_str(" (*)()");
                    } else {
                        info.indirection.push_str(" *");
                    }
                    info.indirect = true;
                    node.child_by_field_name("declarator")
                }
                "reference_declarator" => {
                    let sigil = all_children(node)
                        .into_iter()
                        .find(|child| !child.is_named())
                        .map(|child| self.node_text(child))
                        .unwrap_or("&");
                    info.indirection.push(' ');
                    info.indirection.push_str(sigil);
                    info.indirect = true;
                    named_children(node).into_iter().last()
                }
                "array_declarator" => {
                    let size = node
                        .child_by_field_name("size")
                        .and_then(|size| parse_int(self.node_text(size)));
                    info.dims.insert(0, size);
                    node.child_by_field_name("declarator")
                }
                "function_declarator" => {
                    if info.function.is_none() {
                        info.function = Some(node);
                    }
                    node.child_by_field_name("declarator")
                }
                "init_declarator" | "attributed_declarator" => {
                    node.child_by_field_name("declarator")
                }
                "parenthesized_declarator" => named_children(node).into_iter().next(),
                _ => {
                    info.name_kind = node.kind();
                    info.name = self.spelled(node);
                    None
                }
            };
            match next {
                Some(inner) => node = inner,
                None => break,
            }
        }
        info
    }

    fn build_items(&mut self, container: Node, scope: &Scope) -> Vec<CppCursor> {
        let mut items = Vec::new();
        for child in named_children(container) {
            self.build_item(child, scope, &mut items);
        }
        items
    }

    fn build_item(&mut self, node: Node, scope: &Scope, out: &mut Vec<CppCursor>) {
        match node.kind() {
            "function_definition" => {
                if let Some(declarator) = node.child_by_field_name("declarator") {
                    out.extend(self.build_callable(node, declarator, scope));
                }
            }
            "declaration" => self.build_declaration(node, scope, out),
            "struct_specifier" | "class_specifier" | "union_specifier" => {
                out.extend(self.build_record(node, None, scope));
            }
            "enum_specifier" => self.register_enum(node, None),
            "type_definition" => self.build_type_definition(node, scope, out),
            "alias_declaration" => out.push(self.build_alias(node)),
            "namespace_definition" => out.push(self.build_namespace(node, scope)),
            "linkage_specification" => {
                let mut children = Vec::new();
                if let Some(body) = node.child_by_field_name("body") {
                    if body.kind() == "declaration_list" {
                        children = self.build_items(body, scope);
                    } else {
                        self.build_item(body, scope, &mut children);
                    }
                }
                let mut data = self.data(CursorKind::Unexposed, String::new(), node.byte_range());
                data.children = children;
                out.push(CppCursor(Arc::new(data)));
            }
            "template_declaration" => out.push(self.build_template(node)),
            kind if is_preproc_block(kind) => {
                let mut data = self.data(CursorKind::Unexposed, String::new(), node.byte_range());
                data.children = self.build_items(node, scope);
                out.push(CppCursor(Arc::new(data)));
            }
            _ => {}
        }
    }

    /// A nested type definition used as a declaration's type.
    fn build_type_of(&mut self, ty: Node, scope: &Scope, out: &mut Vec<CppCursor>) {
        if is_record_specifier(ty) {
            out.extend(self.build_record(ty, None, scope));
        } else if ty.kind() == "enum_specifier" {
            self.register_enum(ty, None);
        }
    }

    fn build_declaration(&mut self, node: Node, scope: &Scope, out: &mut Vec<CppCursor>) {
        if let Some(ty) = node.child_by_field_name("type") {
            self.build_type_of(ty, scope, out);
        }
        for declarator in declarators(node) {
            if self.read_declarator(declarator).function.is_some() {
                out.extend(self.build_callable(node, declarator, scope));
            }
        }
    }

    fn build_namespace(&mut self, node: Node, scope: &Scope) -> CppCursor {
        let name = node
            .child_by_field_name("name")
            .map(|name| self.spelled(name))
            .unwrap_or_default();
        let inner = Scope {
            record: None,
            internal: scope.internal || name.is_empty(),
        };
        let children = node
            .child_by_field_name("body")
            .map(|body| self.build_items(body, &inner))
            .unwrap_or_default();
        let mut data = self.data(CursorKind::Namespace, name, node.byte_range());
        data.definition = true;
        data.children = children;
        CppCursor(Arc::new(data))
    }

    fn build_template(&self, node: Node) -> CppCursor {
        let name = named_children(node)
            .into_iter()
            .filter_map(|child| match child.kind() {
                "function_definition" | "declaration" => child
                    .child_by_field_name("declarator")
                    .map(|d| self.read_declarator(d).name),
                kind if kind.ends_with("_specifier") => {
                    child.child_by_field_name("name").map(|n| self.spelled(n))
                }
                _ => None,
            })
            .next()
            .unwrap_or_default();
        self.data(CursorKind::Template, name, node.byte_range())
            .into_cursor()
    }

    fn register_enum(&mut self, spec: Node, name_override: Option<&str>) {
        let name = spec
            .child_by_field_name("name")
            .map(|name| self.spelled(name))
            .or_else(|| name_override.map(str::to_string))
            .unwrap_or_default();
        let layout = spec
            .child_by_field_name("base")
            .and_then(|base| self.layouts.resolve(self.node_text(base)))
            .unwrap_or(TypeLayout::new(4, 4));
        self.layouts.register(&name, layout);
    }

    fn build_type_definition(&mut self, node: Node, scope: &Scope, out: &mut Vec<CppCursor>) {
        let Some(ty) = node.child_by_field_name("type") else {
            return;
        };
        let declarators = declarators(node);
        let first_name = declarators
            .first()
            .map(|declarator| self.read_declarator(*declarator).name);
        let qualifiers = self.qualifiers(node);

        let mut element = None;
        let mut base = self.spelled(ty);
        if is_record_specifier(ty) && ty.child_by_field_name("body").is_some() {
            if let Some(record) = self.build_record(ty, first_name.as_deref(), scope) {
                element = record.layout().and_then(RecordLayout::type_layout);
                base = record.spelling();
                out.push(record);
            }
        } else if ty.kind() == "enum_specifier" {
            self.register_enum(ty, first_name.as_deref());
            element = Some(TypeLayout::new(4, 4));
            base = first_name.clone().unwrap_or(base);
        } else {
            element = self.layouts.resolve(&base);
        }

        for declarator in declarators {
            let info = self.read_declarator(declarator);
            if let Some(layout) = declared(element, info.indirect, &info.dims) {
                self.layouts.register(&info.name, layout);
            }
            let mut data = self.data(CursorKind::Typedef, info.name.clone(), node.byte_range());
            data.type_spelling = info.spell_type(&qualifiers, &base);
            data.definition = true;
            out.push(data.into_cursor());
        }
    }

    fn build_alias(&mut self, node: Node) -> CppCursor {
        let name = node
            .child_by_field_name("name")
            .map(|name| self.spelled(name))
            .unwrap_or_default();
        let target = node
            .child_by_field_name("type")
            .map(|ty| self.spelled(ty))
            .unwrap_or_default();
        let indirect = target.ends_with('*') || target.ends_with('&');
        if let Some(layout) = declared(self.layouts.resolve(&target), indirect, &[]) {
            self.layouts.register(&name, layout);
        }
        let mut data = self.data(CursorKind::Typedef, name, node.byte_range());
        data.type_spelling = target;
        data.definition = true;
        data.into_cursor()
    }

    fn build_record(
        &mut self,
        spec: Node,
        name_override: Option<&str>,
        scope: &Scope,
    ) -> Option<CppCursor> {
        let body = spec.child_by_field_name("body")?;
        let kind = match spec.kind() {
            "class_specifier" => CursorKind::Class,
            "union_specifier" => CursorKind::Union,
            _ => CursorKind::Struct,
        };
        let name = spec
            .child_by_field_name("name")
            .map(|name| self.spelled(name))
            .or_else(|| name_override.map(str::to_string))
            .unwrap_or_default();

        let mut builder = LayoutBuilder::new(kind == CursorKind::Union);
        if let Some(bases) = all_children(spec)
            .into_iter()
            .find(|child| child.kind() == "base_class_clause")
        {
            let base_names: Vec<String> = named_children(bases)
                .into_iter()
                .filter(|child| {
                    matches!(
                        child.kind(),
                        "type_identifier" | "qualified_identifier" | "template_type"
                    )
                })
                .map(|child| self.spelled(child))
                .collect();
            match base_names.as_slice() {
                [base] => builder.place_base(
                    self.layouts.resolve(base),
                    self.empty_records.contains(base),
                ),
                [] => {}
                _ => builder.poison(),
            }
        }

        let member_scope = Scope {
            record: Some(name.clone()),
            internal: scope.internal,
        };
        let mut children = Vec::new();
        self.build_members(body, &member_scope, &mut builder, &mut children);
        let layout = builder.finish();

        if let Some(type_layout) = layout.type_layout() {
            self.layouts.register(&name, type_layout);
            if layout.fields.is_empty() && !name.is_empty() {
                self.empty_records.insert(name.clone());
            }
        }
        if layout.size.is_none() {
            tracing::debug!(record = %name, "record layout could not be computed");
        }

        let mut data = self.data(kind, name, spec.byte_range());
        data.definition = true;
        data.layout = Some(layout);
        data.children = children;
        Some(data.into_cursor())
    }

    fn build_members(
        &mut self,
        body: Node,
        scope: &Scope,
        builder: &mut LayoutBuilder,
        children: &mut Vec<CppCursor>,
    ) {
        for member in named_children(body) {
            match member.kind() {
                "field_declaration" => {
                    self.build_field_declaration(member, scope, builder, children)
                }
                "function_definition" | "declaration" => {
                    if self.has_keyword(member, "virtual") {
                        builder.poison();
                    }
                    if member.kind() == "declaration" {
                        self.build_declaration(member, scope, children);
                    } else if let Some(declarator) = member.child_by_field_name("declarator") {
                        children.extend(self.build_callable(member, declarator, scope));
                    }
                }
                "template_declaration" => children.push(self.build_template(member)),
                "type_definition" => self.build_type_definition(member, scope, children),
                "alias_declaration" => children.push(self.build_alias(member)),
                kind if is_preproc_block(kind) => {
                    self.build_members(member, scope, builder, children)
                }
                _ => {}
            }
        }
    }

    fn build_field_declaration(
        &mut self,
        member: Node,
        scope: &Scope,
        builder: &mut LayoutBuilder,
        children: &mut Vec<CppCursor>,
    ) {
        let declarators = declarators(member);
        let is_prototype = declarators
            .iter()
            .any(|declarator| self.read_declarator(*declarator).function.is_some());
        if is_prototype {
            if self.has_keyword(member, "virtual") {
                builder.poison();
            }
            for declarator in declarators {
                children.extend(self.build_callable(member, declarator, scope));
            }
            return;
        }
        // static data members take no storage in the record
        if self.is_static(member) {
            return;
        }
        let Some(ty) = member.child_by_field_name("type") else {
            return;
        };

        let qualifiers = self.qualifiers(member);
        let mut base = self.spelled(ty);
        let mut nested_layout = None;
        if is_record_specifier(ty) && ty.child_by_field_name("body").is_some() {
            let nested_scope = Scope {
                record: None,
                internal: scope.internal,
            };
            if let Some(nested) = self.build_record(ty, None, &nested_scope) {
                let layout = nested.layout().cloned().unwrap_or_default();
                nested_layout = layout.type_layout();
                if !nested.is_anonymous() {
                    base = nested.spelling();
                    children.push(nested);
                } else if declarators.is_empty() {
                    builder.place_anonymous(&layout);
                    children.push(nested);
                } else {
                    // an unnamed type of a named member: its fields belong to
                    // the member, not to the enclosing record
                    base = format!("(anonymous {})", nested.kind());
                }
            }
        } else if ty.kind() == "enum_specifier" {
            self.register_enum(ty, None);
            if let Some(name) = ty.child_by_field_name("name") {
                base = self.spelled(name);
            }
        }

        let bit_width = all_children(member)
            .into_iter()
            .find(|child| child.kind() == "bitfield_clause")
            .map(|clause| {
                named_children(clause)
                    .into_iter()
                    .next()
                    .and_then(|width| parse_int(self.node_text(width)))
            });

        for declarator in declarators {
            let info = self.read_declarator(declarator);
            let element = nested_layout.or_else(|| self.layouts.resolve(&base));
            let offset = match bit_width {
                Some(width) => {
                    match width {
                        Some(width) => builder.place_bitfield(element, width),
                        None => builder.poison(),
                    }
                    None
                }
                None => match declared(element, info.indirect, &info.dims) {
                    Some(layout) => builder.place(layout),
                    None => {
                        builder.poison();
                        None
                    }
                },
            };
            builder.record_field(&info.name, offset);

            let mut data = self.data(CursorKind::Field, info.name.clone(), member.byte_range());
            data.type_spelling = info.spell_type(&qualifiers, &base);
            data.definition = true;
            children.push(data.into_cursor());
        }
    }

    fn build_callable(
        &mut self,
        node: Node,
        declarator: Node,
        scope: &Scope,
    ) -> Option<CppCursor> {
        let info = self.read_declarator(declarator);
        let function = info.function?;
        if info.name_kind == "operator_cast" {
            tracing::debug!(name = %info.name, "skipping conversion operator");
            return None;
        }

        let mut spelling = info.name.clone();
        let kind = match info.name_kind {
            "destructor_name" => CursorKind::Destructor,
            "qualified_identifier" => {
                let segments: Vec<&str> = info.name.split("::").map(str::trim).collect();
                let last = segments.last().copied().unwrap_or_default();
                let owner = segments
                    .len()
                    .checked_sub(2)
                    .and_then(|i| segments.get(i))
                    .copied();
                // out-of-line members keep their owner: `Vec2::Length`
                spelling = segments.join("::");
                if last.starts_with('~') {
                    CursorKind::Destructor
                } else if owner == Some(last) {
                    CursorKind::Constructor
                } else {
                    CursorKind::Method
                }
            }
            _ if scope.record.as_deref() == Some(spelling.as_str()) => CursorKind::Constructor,
            _ if scope.record.is_some() => CursorKind::Method,
            _ => CursorKind::Function,
        };
        if spelling.contains("operator") {
            spelling.retain(|c| !c.is_whitespace());
        }

        let is_static = self.is_static(node);
        let visibility = if scope.internal || (kind == CursorKind::Function && is_static) {
            Visibility::Internal
        } else {
            Visibility::Public
        };
        let result = match kind {
            CursorKind::Constructor | CursorKind::Destructor => String::new(),
            _ => {
                let base = node
                    .child_by_field_name("type")
                    .map(|ty| self.spelled(ty))
                    .unwrap_or_default();
                format!("{}{base}{}", self.qualifiers(node), info.indirection)
            }
        };
        let params = function
            .child_by_field_name("parameters")
            .map(|list| self.build_parameters(list))
            .unwrap_or_default();

        let mut data = self.data(kind, spelling, node.byte_range());
        data.type_spelling = result;
        data.definition =
            node.kind() == "function_definition" && node.child_by_field_name("body").is_some();
        data.is_static = is_static;
        data.visibility = visibility;
        data.tokens = Some(tokens::collect_tokens(node, self.source));
        data.children = params;
        Some(data.into_cursor())
    }

    fn build_parameters(&self, list: Node) -> Vec<CppCursor> {
        let mut params = Vec::new();
        for param in named_children(list) {
            if !matches!(
                param.kind(),
                "parameter_declaration" | "optional_parameter_declaration"
            ) {
                continue;
            }
            let base = param
                .child_by_field_name("type")
                .map(|ty| self.spelled(ty))
                .unwrap_or_default();
            let info = param
                .child_by_field_name("declarator")
                .map(|declarator| self.read_declarator(declarator))
                .unwrap_or_default();
            if base == "void" && info.name.is_empty() && !info.indirect {
                continue;
            }
            let mut data = self.data(CursorKind::Parameter, info.name.clone(), param.byte_range());
            data.type_spelling = info.spell_type(&self.qualifiers(param), &base);
            data.definition = true;
            params.push(data.into_cursor());
        }
        params
    }
}

impl CursorData {
    fn into_cursor(self) -> CppCursor {
        CppCursor(Arc::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(source: &str) -> CppCursor {
        parse_cpp(source).expect("parse failed")
    }

    fn find(cursor: &CppCursor, name: &str) -> Option<CppCursor> {
        if cursor.spelling() == name {
            return Some(cursor.clone());
        }
        cursor.children().iter().find_map(|child| find(child, name))
    }

    #[test]
    fn test_struct_layout() {
        let tu = unit("struct Pair { char tag; double value; float weight; };");
        let pair = find(&tu, "Pair").unwrap();
        assert_eq!(pair.kind(), CursorKind::Struct);
        assert_eq!(pair.type_size(), Some(24));
        assert_eq!(pair.field_offset("tag"), Some(0));
        assert_eq!(pair.field_offset("value"), Some(8));
        assert_eq!(pair.field_offset("weight"), Some(16));
    }

    #[test]
    fn test_union_with_anonymous_struct() {
        let tu = unit(
            "typedef union hmm_vec3 {\n\
             struct { float X, Y, Z; };\n\
             float Elements[3];\n\
             } hmm_vec3;",
        );
        let vec3 = find(&tu, "hmm_vec3").unwrap();
        assert_eq!(vec3.kind(), CursorKind::Union);
        assert_eq!(vec3.type_size(), Some(12));
        assert_eq!(vec3.field_offset("X"), Some(0));
        assert_eq!(vec3.field_offset("Y"), Some(4));
        assert_eq!(vec3.field_offset("Z"), Some(8));
        assert_eq!(vec3.field_offset("Elements"), Some(0));

        let elements = find(&vec3, "Elements").unwrap();
        assert_eq!(elements.type_spelling(), "float [3]");
    }

    #[test]
    fn test_typedef_names_anonymous_record() {
        let tu = unit("typedef struct { float X; float Y; } Point;");
        let point = find(&tu, "Point").unwrap();
        assert!(point.kind().is_record());
        assert_eq!(point.type_size(), Some(8));
    }

    #[test]
    fn test_nested_record_types_resolve() {
        let tu = unit(
            "typedef union hmm_vec4 { struct { float X, Y, Z, W; }; float Elements[4]; } hmm_vec4;\n\
             typedef union hmm_mat4 { float Elements[4][4]; hmm_vec4 Columns[4]; } hmm_mat4;",
        );
        let mat4 = find(&tu, "hmm_mat4").unwrap();
        assert_eq!(mat4.type_size(), Some(64));
        assert_eq!(mat4.field_offset("Columns"), Some(0));
    }

    #[test]
    fn test_bitfields_have_no_offset() {
        let tu = unit("struct Flags { unsigned a : 3; unsigned b : 5; float f; };");
        let flags = find(&tu, "Flags").unwrap();
        assert_eq!(flags.field_offset("a"), None);
        assert_eq!(flags.field_offset("f"), Some(4));
        assert_eq!(flags.type_size(), Some(8));
    }

    #[test]
    fn test_bitfield_then_char_packs_into_next_byte() {
        let tu = unit("struct Flags { unsigned a : 3; char c; };");
        let flags = find(&tu, "Flags").unwrap();
        assert_eq!(flags.type_size(), Some(4));
        assert_eq!(flags.field_offset("a"), None);
        assert_eq!(flags.field_offset("c"), Some(1));
    }

    #[test]
    fn test_named_member_of_anonymous_type() {
        let tu = unit("struct Outer { struct { float a, b, c; } inner; float tail; };");
        let outer = find(&tu, "Outer").unwrap();
        assert_eq!(outer.type_size(), Some(16));
        assert_eq!(outer.field_offset("inner"), Some(0));
        assert_eq!(outer.field_offset("tail"), Some(12));
        // the unnamed type's members are not members of Outer
        assert_eq!(outer.field_offset("a"), None);
        assert!(outer.children().iter().all(|child| !child.kind().is_record()));

        let inner = find(&outer, "inner").unwrap();
        assert_eq!(inner.type_spelling(), "(anonymous struct)");
    }

    #[test]
    fn test_methods_and_constructors() {
        let tu = unit(
            "struct Vec2 {\n\
               float X, Y;\n\
               Vec2(float x, float y) : X(x), Y(y) {}\n\
               float Dot(const Vec2 &o) const { return X * o.X + Y * o.Y; }\n\
               static Vec2 Zero() { return Vec2(0.0f, 0.0f); }\n\
               Vec2 operator+(const Vec2 &o) const { return Vec2(X + o.X, Y + o.Y); }\n\
               float Length() const;\n\
             };",
        );
        let vec2 = find(&tu, "Vec2").unwrap();
        let children = vec2.children();
        let kinds: Vec<(CursorKind, String)> = children
            .iter()
            .map(|child| (child.kind(), child.spelling()))
            .collect();
        assert!(kinds.contains(&(CursorKind::Constructor, "Vec2".to_string())));
        assert!(kinds.contains(&(CursorKind::Method, "Dot".to_string())));
        assert!(kinds.contains(&(CursorKind::Method, "operator+".to_string())));

        let dot = children.iter().find(|c| c.spelling() == "Dot").unwrap();
        assert_eq!(dot.type_spelling(), "float");
        assert!(dot.is_definition());
        let param = &dot.children()[0];
        assert_eq!(param.spelling(), "o");
        assert_eq!(param.type_spelling(), "const Vec2 &");

        let zero = children.iter().find(|c| c.spelling() == "Zero").unwrap();
        assert!(zero.is_static());

        let length = children.iter().find(|c| c.spelling() == "Length").unwrap();
        assert!(!length.is_definition());

        assert_eq!(vec2.type_size(), Some(8));
    }

    #[test]
    fn test_free_function_visibility_and_tokens() {
        let tu = unit(
            "float Dot(float a, float b) { return a * b; }\n\
             static float Helper(void) { return 1.0f; }\n\
             namespace { float Hidden() { return 0.0f; } }",
        );
        let dot = find(&tu, "Dot").unwrap();
        assert_eq!(dot.kind(), CursorKind::Function);
        assert_eq!(dot.visibility(), Visibility::Public);
        let texts: Vec<String> = dot.tokens().into_iter().map(|t| t.text).collect();
        assert_eq!(
            texts,
            vec![
                "float", "Dot", "(", "float", "a", ",", "float", "b", ")", "{", "return", "a",
                "*", "b", ";", "}"
            ]
        );

        let helper = find(&tu, "Helper").unwrap();
        assert_eq!(helper.visibility(), Visibility::Internal);
        assert!(helper.children().is_empty());

        let hidden = find(&tu, "Hidden").unwrap();
        assert_eq!(hidden.visibility(), Visibility::Internal);
    }

    #[test]
    fn test_out_of_line_members_keep_owner() {
        let tu = unit(
            "struct Vec2 { float X, Y; float Length() const; };\n\
             float Vec2::Length() const { return X + Y; }\n\
             Vec2 Vec2::operator - () const { return *this; }",
        );
        let children = tu.children();
        let length = children
            .iter()
            .find(|c| c.spelling() == "Vec2::Length")
            .unwrap();
        assert_eq!(length.kind(), CursorKind::Method);
        assert!(length.is_definition());
        assert!(children.iter().any(|c| c.spelling() == "Vec2::operator-"));
    }

    #[test]
    fn test_virtual_records_have_unknown_layout() {
        let tu = unit("class Shape { public: virtual float Area() const { return 0.0f; } float w; };");
        let shape = find(&tu, "Shape").unwrap();
        assert_eq!(shape.kind(), CursorKind::Class);
        assert_eq!(shape.type_size(), None);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let result = parse_cpp("struct Broken { float X; ");
        assert!(matches!(result, Err(IndexError::Parse(_))));
    }

    #[test]
    fn test_templates_are_opaque() {
        let tu = unit("template <typename T> T Max(T a, T b) { return a > b ? a : b; }");
        let children = tu.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind(), CursorKind::Template);
        assert!(children[0].children().is_empty());
    }
}
