//! Entity collection: cursor trees to the entity graph.
//!
//! The collector is written purely against [`Cursor`], so any index that
//! answers kind/spelling/type/offset/token queries can feed it.

use crate::ir::{
    Diagnostic, EntityGraph, FieldInfo, FunctionInfo, MethodIdentity, MethodInfo, MethodKind,
    ParamInfo, TranslatedBody, TypeInfo,
};
use crate::swizzle::{ComponentFamily, axis_field_count};
use crate::translate::Translator;
use crate::types::{TypeMapper, array_len, escape_identifier, normalize_type_name};
use portgen_index::{Cursor, CursorKind, IndexError, SourceIndex, Visibility};
use rayon::prelude::*;
use std::path::PathBuf;

/// CLR special name of a C++ operator token, by arity (operands including
/// the implicit `this`).
fn operator_name(op: &str, arity: usize) -> Option<&'static str> {
    let name = match (op, arity) {
        ("-", 1) => "op_UnaryNegation",
        ("+", 1) => "op_UnaryPlus",
        ("!", 1) => "op_LogicalNot",
        ("~", 1) => "op_OnesComplement",
        ("++", _) => "op_Increment",
        ("--", _) => "op_Decrement",
        ("+", 2) => "op_Addition",
        ("-", 2) => "op_Subtraction",
        ("*", 2) => "op_Multiply",
        ("/", 2) => "op_Division",
        ("%", 2) => "op_Modulus",
        ("==", 2) => "op_Equality",
        ("!=", 2) => "op_Inequality",
        ("<", 2) => "op_LessThan",
        (">", 2) => "op_GreaterThan",
        ("<=", 2) => "op_LessThanOrEqual",
        (">=", 2) => "op_GreaterThanOrEqual",
        ("&", 2) => "op_BitwiseAnd",
        ("|", 2) => "op_BitwiseOr",
        ("^", 2) => "op_ExclusiveOr",
        ("<<", 2) => "op_LeftShift",
        (">>", 2) => "op_RightShift",
        ("+=", 2) => "op_AdditionAssignment",
        ("-=", 2) => "op_SubtractionAssignment",
        ("*=", 2) => "op_MultiplyAssignment",
        ("/=", 2) => "op_DivisionAssignment",
        ("[]", 2) => "Index",
        ("()", _) => "Invoke",
        _ => return None,
    };
    Some(name)
}

/// Last `::` segment of a possibly qualified spelling.
fn unqualified(spelling: &str) -> &str {
    spelling.rsplit("::").next().unwrap_or(spelling).trim()
}

/// Owner type of an out-of-line definition (`Vec2::Length` → `Vec2`).
fn qualifier(spelling: &str) -> Option<&str> {
    let mut segments = spelling.rsplit("::");
    segments.next();
    segments.next().map(str::trim)
}

/// A callable's signature and body, before it becomes a method or function.
struct Callable {
    name: String,
    source_return_type: String,
    target_return_type: String,
    params: Vec<ParamInfo>,
    body: TranslatedBody,
}

/// Collects one translation unit.
struct Collector {
    mapper: TypeMapper,
    graph: EntityGraph,
    /// Out-of-line member definitions, attached once every type is known.
    out_of_line: Vec<(String, MethodInfo)>,
}

impl Collector {
    fn new<C: Cursor>(unit: &C) -> Self {
        let mut mapper = TypeMapper::new();
        register_names(unit, &mut mapper);
        Self {
            mapper,
            graph: EntityGraph::new(),
            out_of_line: Vec::new(),
        }
    }

    fn note(&mut self, entity: impl Into<String>, message: impl Into<String>) {
        let diagnostic = Diagnostic::note(entity, message);
        tracing::debug!(entity = %diagnostic.entity, "{}", diagnostic.message);
        self.graph.diagnostics.push(diagnostic);
    }

    fn warn(&mut self, entity: impl Into<String>, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(entity, message);
        tracing::warn!(entity = %diagnostic.entity, "{}", diagnostic.message);
        self.graph.diagnostics.push(diagnostic);
    }

    fn visit<C: Cursor>(&mut self, cursor: &C) {
        match cursor.kind() {
            kind if kind.is_record() => {
                if cursor.is_definition() && !cursor.is_anonymous() {
                    self.collect_type(cursor);
                }
            }
            CursorKind::Function => self.collect_function(cursor),
            CursorKind::Method | CursorKind::Constructor if cursor.spelling().contains("::") => {
                self.collect_out_of_line(cursor);
            }
            CursorKind::Template => {
                tracing::debug!(name = %cursor.spelling(), "skipping template");
                return;
            }
            _ => {}
        }
        for child in cursor.children() {
            self.visit(&child);
        }
    }

    fn collect_type<C: Cursor>(&mut self, record: &C) {
        let source_name = record.spelling();
        let name = normalize_type_name(&source_name);
        let Some(size) = record.type_size() else {
            self.warn(&name, format!("layout of {source_name} is unknown, type skipped"));
            return;
        };
        let mut info = TypeInfo {
            name,
            source_name,
            size,
            fields: Vec::new(),
            methods: Vec::new(),
        };
        self.collect_fields(record, record, &mut info);

        for child in record.children() {
            match child.kind() {
                CursorKind::Method | CursorKind::Constructor => {
                    if let Some(method) = self.method(&child, &info.name) {
                        self.push_method(&mut info, method);
                    }
                }
                CursorKind::Destructor => {
                    tracing::debug!(owner = %info.name, "skipping destructor");
                }
                _ => {}
            }
        }
        let axes = axis_field_count(&info);
        if axes >= 2 && ComponentFamily::of(&info).is_none() {
            let reason = if info.name.contains(|c: char| c.is_ascii_digit()) {
                "they do not match the dimension in its name"
            } else {
                "its name carries no dimension digit"
            };
            self.note(
                &info.name,
                format!("has {axes} axis fields but {reason}, no swizzles generated"),
            );
        }
        tracing::debug!(
            name = %info.name,
            size = info.size,
            fields = info.fields.len(),
            methods = info.methods.len(),
            "collected type"
        );
        self.graph.push_type(info);
    }

    /// Fields of `container` in declaration order, flattening anonymous
    /// records. Offsets are always asked of the outermost record.
    fn collect_fields<C: Cursor>(&mut self, outer: &C, container: &C, info: &mut TypeInfo) {
        for child in container.children() {
            match child.kind() {
                CursorKind::Field => self.collect_field(outer, &child, info),
                kind if kind.is_record() && child.is_anonymous() => {
                    self.collect_fields(outer, &child, info);
                }
                _ => {}
            }
        }
    }

    fn collect_field<C: Cursor>(&mut self, outer: &C, field: &C, info: &mut TypeInfo) {
        let name = field.spelling();
        let entity = format!("{}.{name}", info.name);
        let Some(offset) = outer.field_offset(&name) else {
            self.note(entity, "no byte offset (bit-field or unknown layout), field skipped");
            return;
        };
        if offset >= info.size {
            self.warn(
                entity,
                format!("offset {offset} outside a {}-byte type, field dropped", info.size),
            );
            return;
        }

        let source_type = field.type_spelling();
        let mapped = self.mapper.map(&source_type);
        let count = if mapped.array {
            match array_len(&source_type) {
                Some(count) => Some(count),
                None => {
                    self.note(entity, format!("unsized array `{source_type}`, field skipped"));
                    return;
                }
            }
        } else {
            None
        };
        if mapped.placeholder {
            self.note(
                &entity,
                format!("unrecognised type `{source_type}` mapped to placeholder"),
            );
        }
        info.fields.push(FieldInfo {
            name: escape_identifier(&name).into_owned(),
            target_type: mapped.field_type(),
            source_type,
            offset,
            array_len: count,
            // pointers keep their layout as `nint`
            placeholder: mapped.placeholder && !mapped.indirect,
        });
    }

    fn push_method(&mut self, info: &mut TypeInfo, method: MethodInfo) {
        let identity = method.identity();
        if !info.push_method(method) {
            self.duplicate(&info.name, &identity);
        }
    }

    fn duplicate(&mut self, owner: &str, identity: &MethodIdentity) {
        self.note(
            format!("{owner}.{}", identity.name),
            format!("duplicate declaration {identity} ignored, first definition kept"),
        );
    }

    /// A member callable of `owner`, or `None` if it has no C# counterpart.
    fn method<C: Cursor>(&mut self, cursor: &C, owner: &str) -> Option<MethodInfo> {
        let spelling = cursor.spelling();
        if !cursor.is_definition() {
            tracing::debug!(owner, name = %spelling, "skipping member declaration without body");
            return None;
        }
        let kind = match cursor.kind() {
            CursorKind::Constructor => MethodKind::Constructor,
            _ => MethodKind::Method,
        };
        let name = match kind {
            MethodKind::Constructor => owner.to_string(),
            MethodKind::Method => self.callable_name(cursor, owner, true)?,
        };
        let callable = self.callable(cursor, name, owner);
        Some(MethodInfo {
            name: callable.name,
            kind,
            source_return_type: callable.source_return_type,
            target_return_type: callable.target_return_type,
            params: callable.params,
            is_static: cursor.is_static(),
            translated_body: callable.body,
        })
    }

    fn collect_function<C: Cursor>(&mut self, cursor: &C) {
        let spelling = cursor.spelling();
        if cursor.visibility() == Visibility::Internal {
            tracing::debug!(name = %spelling, "skipping internal function");
            return;
        }
        if !cursor.is_definition() {
            tracing::debug!(name = %spelling, "skipping prototype");
            return;
        }
        let Some(name) = self.callable_name(cursor, "Functions", false) else {
            return;
        };
        let callable = self.callable(cursor, name, "Functions");
        self.graph.push_function(FunctionInfo {
            name: callable.name,
            source_return_type: callable.source_return_type,
            target_return_type: callable.target_return_type,
            params: callable.params,
            translated_body: callable.body,
        });
    }

    fn collect_out_of_line<C: Cursor>(&mut self, cursor: &C) {
        let spelling = cursor.spelling();
        let Some(owner) = qualifier(&spelling).map(normalize_type_name) else {
            return;
        };
        if let Some(method) = self.method(cursor, &owner) {
            self.out_of_line.push((owner, method));
        }
    }

    fn attach_out_of_line(&mut self) {
        for (owner, method) in std::mem::take(&mut self.out_of_line) {
            let Some(index) = self.graph.types.iter().position(|t| t.name == owner) else {
                self.warn(
                    format!("{owner}.{}", method.name),
                    format!("out-of-line definition has no collected owner type {owner}"),
                );
                continue;
            };
            let identity = method.identity();
            if !self.graph.types[index].push_method(method) {
                self.duplicate(&owner, &identity);
            }
        }
    }

    /// Target name of a method or function; operators get CLR special names.
    fn callable_name<C: Cursor>(&mut self, cursor: &C, owner: &str, member: bool) -> Option<String> {
        let spelling = cursor.spelling();
        let name = unqualified(&spelling);
        let Some(op) = name.strip_prefix("operator") else {
            return Some(escape_identifier(name).into_owned());
        };
        let arity = cursor
            .children()
            .iter()
            .filter(|c| c.kind() == CursorKind::Parameter)
            .count()
            + usize::from(member);
        match operator_name(op.trim(), arity) {
            Some(special) => Some(special.to_string()),
            None => {
                self.note(
                    format!("{owner}.{name}"),
                    format!("operator{op} has no C# counterpart, skipped"),
                );
                None
            }
        }
    }

    fn callable<C: Cursor>(&mut self, cursor: &C, name: String, owner: &str) -> Callable {
        let entity = format!("{owner}.{name}");
        let source_return_type = cursor.type_spelling();
        let target_return_type = if source_return_type.is_empty() {
            String::new()
        } else {
            let mapped = self.mapper.map(&source_return_type);
            if mapped.placeholder {
                self.note(
                    &entity,
                    format!("unrecognised return type `{source_return_type}` mapped to placeholder"),
                );
            }
            mapped.target()
        };

        let mut params = Vec::new();
        let mut pointers = Vec::new();
        let parameters = cursor
            .children()
            .into_iter()
            .filter(|c| c.kind() == CursorKind::Parameter);
        for (i, param) in parameters.enumerate() {
            let spelling = param.spelling();
            let name = if spelling.is_empty() {
                format!("arg{i}")
            } else {
                escape_identifier(&spelling).into_owned()
            };
            let source_type = param.type_spelling();
            if source_type.contains('*') && !spelling.is_empty() {
                pointers.push(spelling);
            }
            let mapped = self.mapper.map(&source_type);
            if mapped.placeholder {
                self.note(
                    &entity,
                    format!("parameter {name}: unrecognised type `{source_type}` mapped to placeholder"),
                );
            }
            params.push(ParamInfo {
                name,
                source_type,
                target_type: mapped.target(),
            });
        }

        let body = Translator::new(&self.mapper)
            .with_pointer_params(pointers)
            .translate_callable(&cursor.tokens());
        if let Some(reason) = &body.untranslated {
            self.note(&entity, format!("body left untranslated: {reason}"));
        }
        Callable {
            name,
            source_return_type,
            target_return_type,
            params,
            body,
        }
    }
}

/// Register every typedef and named record of the unit with the mapper.
fn register_names<C: Cursor>(cursor: &C, mapper: &mut TypeMapper) {
    match cursor.kind() {
        CursorKind::Typedef => mapper.add_alias(&cursor.spelling(), &cursor.type_spelling()),
        kind if kind.is_record() && !cursor.is_anonymous() => mapper.add_known(&cursor.spelling()),
        CursorKind::Template => return,
        _ => {}
    }
    for child in cursor.children() {
        register_names(&child, mapper);
    }
}

/// Collect every type and public free function of one translation unit.
pub fn collect_unit<C: Cursor>(unit: &C) -> EntityGraph {
    let mut collector = Collector::new(unit);
    collector.visit(unit);
    collector.attach_out_of_line();
    collector.graph
}

/// A file the index could not parse.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: IndexError,
}

/// Result of collecting a batch of files.
#[derive(Debug, Default)]
pub struct Collection {
    pub graph: EntityGraph,
    pub failures: Vec<FileFailure>,
    /// Files collected successfully.
    pub files: usize,
}

/// Parse and collect `paths` in parallel, merging per-file graphs in sorted
/// path order. Unparsable files are skipped and reported.
pub fn collect_all<I: SourceIndex>(index: &I, paths: &[PathBuf]) -> Collection {
    let mut paths = paths.to_vec();
    paths.sort();
    paths.dedup();

    let outcomes: Vec<(PathBuf, Result<EntityGraph, IndexError>)> = paths
        .into_par_iter()
        .map(|path| {
            let outcome = index.parse(&path).map(|unit| collect_unit(&unit));
            (path, outcome)
        })
        .collect();

    let mut collection = Collection::default();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(graph) => {
                tracing::debug!(
                    path = %path.display(),
                    types = graph.types.len(),
                    functions = graph.functions.len(),
                    "collected file"
                );
                collection.graph.merge(graph);
                collection.files += 1;
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping file");
                collection.graph.diagnostics.push(Diagnostic::warning(
                    path.display().to_string(),
                    format!("file skipped: {error}"),
                ));
                collection.failures.push(FileFailure { path, error });
            }
        }
    }
    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Severity;
    use portgen_index::{MemoryCursor, MemoryIndex};

    fn vec2() -> MemoryCursor {
        MemoryCursor::record(CursorKind::Union, "hmm_vec2", 8)
            .anonymous(
                CursorKind::Struct,
                &[("X", "float", Some(0)), ("Y", "float", Some(4))],
            )
            .field("Elements", "float [2]", Some(0))
    }

    #[test]
    fn test_union_fields_flattened_with_overlapping_offsets() {
        let graph = collect_unit(&MemoryCursor::unit(vec![vec2()]));
        let ty = graph.type_named("Vector2").unwrap();
        assert_eq!(ty.source_name, "hmm_vec2");
        assert_eq!(ty.size, 8);
        let fields: Vec<(&str, u64)> = ty.fields.iter().map(|f| (f.name.as_str(), f.offset)).collect();
        assert_eq!(fields, vec![("X", 0), ("Y", 4), ("Elements", 0)]);
        let elements = ty.field("Elements").unwrap();
        assert_eq!(elements.target_type, "float");
        assert_eq!(elements.array_len, Some(2));
        assert!(graph.diagnostics.is_empty());
    }

    #[test]
    fn test_unplaceable_fields_are_skipped_not_the_type() {
        let record = MemoryCursor::record(CursorKind::Struct, "hmm_flags", 8)
            .field("Mode", "int", Some(0))
            .field("Bits", "unsigned int", None)
            .field("Stray", "int", Some(8))
            .field("Handle", "Opaque *", Some(4))
            .field("Blob", "Opaque", Some(4));
        let graph = collect_unit(&MemoryCursor::unit(vec![record]));
        let ty = graph.type_named("flags").unwrap();
        let names: Vec<&str> = ty.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Mode", "Handle", "Blob"]);
        assert_eq!(ty.field("Handle").unwrap().target_type, "nint");
        assert!(!ty.field("Handle").unwrap().placeholder);
        assert!(ty.field("Blob").unwrap().placeholder);
        assert_eq!(graph.warning_count(), 1);
        assert!(graph.diagnostics.iter().any(|d| d.entity == "flags.Bits"));
    }

    #[test]
    fn test_same_signature_methods_collapse_to_first() {
        let record = MemoryCursor::record(CursorKind::Struct, "hmm_vec3", 12)
            .field("X", "float", Some(0))
            .child(MemoryCursor::method("Dot", "float", &[("hmm_vec3", "a")], "{ return X * a.X; }"))
            .child(MemoryCursor::method("Dot", "float", &[("const hmm_vec3 &", "b")], "{ return 0; }"))
            .child(MemoryCursor::method("Dot", "float", &[("float", "s")], "{ return X * s; }"));
        let graph = collect_unit(&MemoryCursor::unit(vec![record]));
        let ty = graph.type_named("Vector3").unwrap();
        assert_eq!(ty.methods.len(), 2);
        assert_eq!(ty.methods[0].translated_body.text, "return X * a.X;");
        assert_eq!(ty.methods[1].params[0].target_type, "float");
        assert!(
            graph
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Note && d.message.contains("Dot(Vector3)"))
        );
    }

    #[test]
    fn test_only_public_function_definitions_are_collected() {
        let unit = MemoryCursor::unit(vec![
            MemoryCursor::function(
                "HMM_Dot",
                "float",
                &[("hmm_vec2", "a"), ("hmm_vec2", "b")],
                "{ return a.X * b.X + a.Y * b.Y; }",
            ),
            MemoryCursor::function("Helper", "float", &[], "{ return 1.0f; }").with_internal(),
            MemoryCursor::function("HMM_Len", "float", &[("hmm_vec2", "a")], ";"),
        ]);
        let graph = collect_unit(&unit);
        assert_eq!(graph.functions.len(), 1);
        let dot = &graph.functions[0];
        assert_eq!(dot.name, "HMM_Dot");
        assert_eq!(dot.target_return_type, "float");
        assert_eq!(dot.params[1].target_type, "Vector2");
        assert_eq!(dot.translated_body.text, "return a.X * b.X + a.Y * b.Y;");
    }

    #[test]
    fn test_operators_get_clr_names() {
        let record = vec2()
            .child(MemoryCursor::method(
                "operator+",
                "hmm_vec2",
                &[("const hmm_vec2 &", "o")],
                "{ return hmm_vec2(X + o.X, Y + o.Y); }",
            ))
            .child(MemoryCursor::method("operator-", "hmm_vec2", &[], "{ return hmm_vec2(-X, -Y); }"))
            .child(MemoryCursor::method("operator=", "hmm_vec2 &", &[("const hmm_vec2 &", "o")], "{ X = o.X; }"));
        let unit = MemoryCursor::unit(vec![
            record,
            MemoryCursor::function(
                "operator*",
                "hmm_vec2",
                &[("hmm_vec2", "a"), ("float", "s")],
                "{ return hmm_vec2(a.X * s, a.Y * s); }",
            ),
        ]);
        let graph = collect_unit(&unit);
        let names: Vec<&str> = graph.types[0].methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["op_Addition", "op_UnaryNegation"]);
        assert_eq!(
            graph.types[0].methods[0].translated_body.text,
            "return new Vector2(X + o.X, Y + o.Y);"
        );
        assert_eq!(graph.functions[0].name, "op_Multiply");
    }

    #[test]
    fn test_constructors_and_destructors() {
        let record = vec2()
            .child(MemoryCursor::callable(
                CursorKind::Constructor,
                "hmm_vec2",
                "",
                &[("float", "x"), ("float", "y")],
                ": X(x), Y(y) {}",
            ))
            .child(MemoryCursor::callable(CursorKind::Destructor, "~hmm_vec2", "", &[], "{}"));
        let graph = collect_unit(&MemoryCursor::unit(vec![record]));
        let ty = &graph.types[0];
        assert_eq!(ty.methods.len(), 1);
        let ctor = &ty.methods[0];
        assert_eq!(ctor.kind, MethodKind::Constructor);
        assert_eq!(ctor.name, "Vector2");
        assert_eq!(ctor.target_return_type, "");
        assert_eq!(ctor.translated_body.text, "X = x;\nY = y;");
    }

    #[test]
    fn test_out_of_line_members_attach_to_owner() {
        let unit = MemoryCursor::unit(vec![
            vec2().child(MemoryCursor::method("Length", "float", &[], ";").declaration_only()),
            MemoryCursor::method(
                "hmm_vec2::Length",
                "float",
                &[],
                "{ return sqrtf(X * X + Y * Y); }",
            ),
            MemoryCursor::method("hmm_mat4::Det", "float", &[], "{ return 0; }"),
        ]);
        let graph = collect_unit(&unit);
        let ty = graph.type_named("Vector2").unwrap();
        assert_eq!(ty.methods.len(), 1);
        assert_eq!(ty.methods[0].name, "Length");
        assert_eq!(ty.methods[0].translated_body.text, "return MathF.Sqrt(X * X + Y * Y);");
        assert_eq!(graph.warning_count(), 1);
        assert_eq!(graph.diagnostics[0].entity, "Matrix4.Det");
    }

    #[test]
    fn test_typedefs_unknown_layouts_and_templates() {
        let unit = MemoryCursor::unit(vec![
            MemoryCursor::typedef("Real", "float"),
            MemoryCursor::record(CursorKind::Struct, "Sample", 8)
                .field("Weight", "Real", Some(0))
                .field("Next", "Real *", Some(4)),
            MemoryCursor::opaque_record(CursorKind::Class, "Polymorphic"),
            MemoryCursor::callable(CursorKind::Template, "Generic", "", &[], ";")
                .child(MemoryCursor::record(CursorKind::Struct, "Inner", 4)),
        ]);
        let graph = collect_unit(&unit);
        assert_eq!(graph.types.len(), 1);
        let sample = graph.type_named("Sample").unwrap();
        assert_eq!(sample.field("Weight").unwrap().target_type, "float");
        assert_eq!(sample.field("Next").unwrap().target_type, "nint");
        assert_eq!(graph.warning_count(), 1);
    }

    #[test]
    fn test_untranslatable_bodies_are_noted() {
        let record = vec2().child(MemoryCursor::method("Self", "hmm_vec2", &[], "{ return *this; }"));
        let graph = collect_unit(&MemoryCursor::unit(vec![record]));
        let method = &graph.types[0].methods[0];
        assert!(method.translated_body.is_placeholder());
        assert!(graph.diagnostics.iter().any(|d| d.entity == "Vector2.Self"));
    }

    #[test]
    fn test_axis_fields_without_family_are_noted() {
        let point = MemoryCursor::record(CursorKind::Struct, "hmm_Point", 8)
            .field("X", "float", Some(0))
            .field("Y", "float", Some(4));
        let mixed = MemoryCursor::record(CursorKind::Struct, "hmm_Mixed2", 8)
            .field("X", "float", Some(0))
            .field("Y", "int", Some(4));
        let graph = collect_unit(&MemoryCursor::unit(vec![point, mixed, vec2()]));

        let notes: Vec<(&str, &str)> = graph
            .diagnostics
            .iter()
            .filter(|d| d.message.contains("no swizzles"))
            .map(|d| (d.entity.as_str(), d.message.as_str()))
            .collect();
        assert_eq!(
            notes,
            vec![
                (
                    "Point",
                    "has 2 axis fields but its name carries no dimension digit, no swizzles generated"
                ),
                (
                    "Mixed2",
                    "has 2 axis fields but they do not match the dimension in its name, no swizzles generated"
                ),
            ]
        );
        assert!(graph.diagnostics.iter().all(|d| d.severity == Severity::Note));
    }

    #[test]
    fn test_rebinding_a_pointer_parameter_is_noted() {
        let unit = MemoryCursor::unit(vec![
            MemoryCursor::function(
                "HMM_Pick",
                "void",
                &[("float *", "Out"), ("float *", "Other")],
                "{ Out = Other; }",
            ),
            MemoryCursor::function(
                "HMM_Store",
                "void",
                &[("hmm_vec2 *", "Out"), ("float", "Other")],
                "{ Out->X = Other; }",
            ),
        ]);
        let graph = collect_unit(&unit);
        let pick = graph.functions.iter().find(|f| f.name == "HMM_Pick").unwrap();
        assert!(pick.translated_body.is_placeholder());
        assert!(graph.diagnostics.iter().any(|d| {
            d.entity == "Functions.HMM_Pick" && d.message.contains("pointer parameter used as a value")
        }));
        let store = graph.functions.iter().find(|f| f.name == "HMM_Store").unwrap();
        assert_eq!(store.translated_body.text, "Out.X = Other;");
    }

    #[test]
    fn test_batch_with_malformed_file_completes() {
        let index = MemoryIndex::new()
            .with_unit("a.h", MemoryCursor::unit(vec![vec2()]))
            .with_failure("b.h", "syntax error in source at line 3, column 1")
            .with_unit(
                "c.h",
                MemoryCursor::unit(vec![MemoryCursor::function("HMM_One", "float", &[], "{ return 1.0f; }")]),
            );
        let collection = collect_all(&index, &index.paths());

        assert_eq!(collection.files, 2);
        assert_eq!(collection.graph.types.len(), 1);
        assert_eq!(collection.graph.functions.len(), 1);
        assert_eq!(collection.failures.len(), 1);
        assert_eq!(collection.failures[0].path, PathBuf::from("b.h"));
        assert_eq!(collection.graph.warning_count(), 1);
    }
}
