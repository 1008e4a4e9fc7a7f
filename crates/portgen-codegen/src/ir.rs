//! Entity graph: the intermediate representation between collection and
//! emission.
//!
//! Every entity is built once by the collector and read by the emitters.

use serde::Serialize;
use std::fmt;

/// A translated (or deliberately untranslated) callable body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedBody {
    /// C# statement text, one statement per line, without outer braces.
    pub text: String,
    /// Why the body could not be translated. `text` is then a throwing
    /// placeholder.
    pub untranslated: Option<String>,
}

impl TranslatedBody {
    pub fn is_placeholder(&self) -> bool {
        self.untranslated.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    /// Source spelling, kept for diagnostics.
    pub source_type: String,
    /// Storage type: the element type for arrays, `nint` for pointers.
    pub target_type: String,
    /// Bytes from the start of the enclosing type.
    pub offset: u64,
    /// Flattened element count for array fields.
    pub array_len: Option<u64>,
    /// The mapper did not recognise the source type.
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamInfo {
    pub name: String,
    pub source_type: String,
    pub target_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Method,
    Constructor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub kind: MethodKind,
    pub source_return_type: String,
    pub target_return_type: String,
    pub params: Vec<ParamInfo>,
    pub is_static: bool,
    pub translated_body: TranslatedBody,
}

impl MethodInfo {
    pub fn identity(&self) -> MethodIdentity {
        MethodIdentity::new(&self.name, &self.params)
    }
}

/// A module-level function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionInfo {
    pub name: String,
    pub source_return_type: String,
    pub target_return_type: String,
    pub params: Vec<ParamInfo>,
    pub translated_body: TranslatedBody,
}

impl FunctionInfo {
    pub fn identity(&self) -> MethodIdentity {
        MethodIdentity::new(&self.name, &self.params)
    }
}

/// Structural identity of a callable: its name and the target types of its
/// parameters, in order. Two declarations with the same identity collapse to
/// the first one seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodIdentity {
    pub name: String,
    pub param_types: Vec<String>,
}

impl MethodIdentity {
    pub fn new(name: &str, params: &[ParamInfo]) -> Self {
        Self {
            name: name.to_string(),
            param_types: params.iter().map(|p| p.target_type.clone()).collect(),
        }
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.param_types.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    /// Target-facing name.
    pub name: String,
    /// Name as declared in the source.
    pub source_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Fields in declaration order; every offset lies in `[0, size)`.
    pub fields: Vec<FieldInfo>,
    /// At most one method per identity.
    pub methods: Vec<MethodInfo>,
}

impl TypeInfo {
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Add a method unless one with the same identity exists. Returns false
    /// when the method was discarded.
    pub fn push_method(&mut self, method: MethodInfo) -> bool {
        let identity = method.identity();
        if self.methods.iter().any(|m| m.identity() == identity) {
            return false;
        }
        self.methods.push(method);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A non-fatal degradation recorded during collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Entity the diagnostic is about (`Vector3`, `Vector3.Length`, a path).
    pub entity: String,
    pub message: String,
}

impl Diagnostic {
    pub fn note(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            entity: entity.into(),
            message: message.into(),
        }
    }

    pub fn warning(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            entity: entity.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.entity, self.message)
    }
}

/// All types and functions collected in one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityGraph {
    pub types: Vec<TypeInfo>,
    pub functions: Vec<FunctionInfo>,
    pub diagnostics: Vec<Diagnostic>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_named(&self, name: &str) -> Option<&TypeInfo> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn type_named_mut(&mut self, name: &str) -> Option<&mut TypeInfo> {
        self.types.iter_mut().find(|t| t.name == name)
    }

    /// Add a type unless one with the same name exists (first wins).
    pub fn push_type(&mut self, info: TypeInfo) -> bool {
        if self.type_named(&info.name).is_some() {
            self.diagnostics.push(Diagnostic::note(
                &info.name,
                format!(
                    "duplicate definition of {} ignored, first definition kept",
                    info.source_name
                ),
            ));
            return false;
        }
        self.types.push(info);
        true
    }

    /// Add a function unless one with the same identity exists (first wins).
    pub fn push_function(&mut self, info: FunctionInfo) -> bool {
        let identity = info.identity();
        if self.functions.iter().any(|f| f.identity() == identity) {
            self.diagnostics.push(Diagnostic::note(
                &info.name,
                format!("duplicate function {identity} ignored, first definition kept"),
            ));
            return false;
        }
        self.functions.push(info);
        true
    }

    /// Append another graph's entities, applying the same first-wins rules.
    pub fn merge(&mut self, other: EntityGraph) {
        self.diagnostics.extend(other.diagnostics);
        for info in other.types {
            self.push_type(info);
        }
        for info in other.functions {
            self.push_function(info);
        }
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}
