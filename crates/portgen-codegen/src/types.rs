//! Type mapping from C++ spellings to C# type names.
//!
//! Mapping is total: every spelling produces a non-empty target name. Types
//! the mapper does not understand degrade to the `object` placeholder and are
//! flagged so the collector can report them.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Naming prefix of the source library's types, matched case-insensitively.
pub const LIBRARY_PREFIX: &str = "hmm_";

/// Target name used for types the mapper cannot translate.
pub const PLACEHOLDER_TYPE: &str = "object";

/// Family name rewrites, longest source prefix first.
const FAMILIES: &[(&str, &str)] = &[
    ("quaternion", "Quaternion"),
    ("matrix", "Matrix"),
    ("vector", "Vector"),
    ("quat", "Quaternion"),
    ("mat", "Matrix"),
    ("vec", "Vector"),
];

/// C# spelling of a builtin C++ type, whitespace-normalized.
pub fn primitive(spelling: &str) -> Option<&'static str> {
    let target = match spelling {
        "float" => "float",
        "double" => "double",
        "bool" | "_Bool" => "bool",
        "void" => "void",
        "char" | "signed char" | "int8_t" => "sbyte",
        "unsigned char" | "uint8_t" => "byte",
        "short" | "short int" | "signed short" | "signed short int" | "int16_t" => "short",
        "unsigned short" | "unsigned short int" | "uint16_t" => "ushort",
        "char16_t" => "char",
        "int" | "signed" | "signed int" | "int32_t" => "int",
        "unsigned" | "unsigned int" | "uint32_t" | "char32_t" => "uint",
        "long" | "long int" | "signed long" | "signed long int" | "long long"
        | "long long int" | "signed long long" | "int64_t" => "long",
        "unsigned long" | "unsigned long int" | "unsigned long long"
        | "unsigned long long int" | "uint64_t" => "ulong",
        "size_t" | "uintptr_t" => "nuint",
        "ptrdiff_t" | "intptr_t" => "nint",
        _ => return None,
    };
    Some(target)
}

/// Size in bytes of a C# primitive, for element strides.
pub fn primitive_size(target: &str) -> Option<u64> {
    let size = match target {
        "bool" | "sbyte" | "byte" => 1,
        "short" | "ushort" | "char" => 2,
        "int" | "uint" | "float" => 4,
        "long" | "ulong" | "double" | "nint" | "nuint" => 8,
        _ => return None,
    };
    Some(size)
}

/// True if `target` may be the element type of a C# `fixed` buffer.
pub fn is_fixed_buffer_element(target: &str) -> bool {
    matches!(
        target,
        "bool"
            | "sbyte"
            | "byte"
            | "short"
            | "ushort"
            | "char"
            | "int"
            | "uint"
            | "long"
            | "ulong"
            | "float"
            | "double"
    )
}

/// Remove the library prefix from a type name, ignoring case.
pub fn strip_library_prefix(name: &str) -> &str {
    match name.get(..LIBRARY_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(LIBRARY_PREFIX) && name.len() > head.len() => {
            &name[LIBRARY_PREFIX.len()..]
        }
        _ => name,
    }
}

/// Rewrite a vector/matrix/quaternion family name, keeping its suffix.
///
/// `vec3` becomes `Vector3`, `Vector2D` stays `Vector2D`, `material` is not a
/// family name.
pub fn family_name(name: &str) -> Option<String> {
    let lower = name.to_ascii_lowercase();
    FAMILIES.iter().find_map(|(prefix, target)| {
        if !lower.starts_with(prefix) {
            return None;
        }
        let rest = &name[prefix.len()..];
        let is_suffix = rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_digit());
        is_suffix.then(|| format!("{target}{rest}"))
    })
}

/// Target-facing name of a source type name.
pub fn normalize_type_name(name: &str) -> String {
    let stripped = strip_library_prefix(name);
    family_name(stripped).unwrap_or_else(|| stripped.to_string())
}

/// Element count of an array spelling like `float [4][4]`. `None` when the
/// spelling is not an array or has an unsized dimension.
pub fn array_len(spelling: &str) -> Option<u64> {
    let start = spelling.find('[')?;
    let mut count = 1u64;
    for dim in spelling[start..].split('[').skip(1) {
        let size: u64 = dim.trim_end().strip_suffix(']')?.trim().parse().ok()?;
        count = count.checked_mul(size)?;
    }
    Some(count)
}

const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// True if `word` is reserved in C#.
pub fn is_csharp_keyword(word: &str) -> bool {
    CSHARP_KEYWORDS.contains(&word)
}

/// Prefix `@` to identifiers that are C# keywords.
pub fn escape_identifier(name: &str) -> Cow<'_, str> {
    if is_csharp_keyword(name) {
        Cow::Owned(format!("@{name}"))
    } else {
        Cow::Borrowed(name)
    }
}

/// How a mapped type is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passing {
    Value,
    /// `ref T`: mutable reference or pointer.
    Ref,
    /// `in T`: pointer to const.
    In,
}

/// Result of mapping one source type spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    /// Target element type name, never empty.
    pub name: String,
    pub passing: Passing,
    /// Source spelled a pointer or reference (storage is an address).
    pub indirect: bool,
    pub array: bool,
    /// The mapper did not recognise the type.
    pub placeholder: bool,
}

impl MappedType {
    fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passing: Passing::Value,
            indirect: false,
            array: false,
            placeholder: false,
        }
    }

    fn placeholder() -> Self {
        Self {
            placeholder: true,
            ..Self::value(PLACEHOLDER_TYPE)
        }
    }

    /// Parameter/return spelling: `ref T`, `in T`, `T[]` or `T`.
    pub fn target(&self) -> String {
        let base = if self.array {
            format!("{}[]", self.name)
        } else {
            self.name.clone()
        };
        match self.passing {
            Passing::Value => base,
            Passing::Ref => format!("ref {base}"),
            Passing::In => format!("in {base}"),
        }
    }

    /// Spelling of the storage a field of this type occupies. Pointers and
    /// references are stored as native-sized integers.
    pub fn field_type(&self) -> String {
        if self.indirect {
            "nint".to_string()
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for MappedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target())
    }
}

/// Map a spelling with no knowledge of the surrounding translation unit.
pub fn map_type(spelling: &str) -> MappedType {
    TypeMapper::new().map(spelling)
}

/// Pointer/reference decorations of a spelling, innermost first.
#[derive(Debug, Default)]
struct Decorations {
    pointee_const: bool,
    pointers: usize,
    lvalue_ref: bool,
    rvalue_ref: bool,
    array: bool,
}

/// Split a spelling into its base type words and decorations.
fn decompose(spelling: &str) -> (String, Decorations) {
    let mut decorations = Decorations::default();
    let mut spelling = spelling.trim();
    if let Some(start) = spelling.find('[') {
        decorations.array = true;
        spelling = spelling[..start].trim_end();
    }

    let spaced = spelling
        .replace("&&", " && ")
        .replace('&', " & ")
        .replace("&  &", "&&")
        .replace('*', " * ");
    let mut words = Vec::new();
    for word in spaced.split_whitespace() {
        match word {
            "*" => decorations.pointers += 1,
            "&" => decorations.lvalue_ref = true,
            "&&" => decorations.rvalue_ref = true,
            "const" if decorations.pointers == 0 => decorations.pointee_const = true,
            "const" | "volatile" | "struct" | "union" | "class" | "enum" | "typename" => {}
            word => words.push(word.strip_prefix("std::").unwrap_or(word)),
        }
    }
    (words.join(" "), decorations)
}

/// Parenthesised declarators: `void (*)(int)`, `int (&)[4]`, `float (Vec2::*)`.
/// Other parentheses, as in `(anonymous struct)`, are part of a name.
fn is_function_pointer(spelling: &str) -> bool {
    let compact: String = spelling.split_whitespace().collect();
    compact.contains("(*") || compact.contains("(&") || compact.contains("::*)")
}

/// Maps type spellings using the typedefs and records of one translation unit.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    aliases: HashMap<String, String>,
    known: HashSet<String>,
}

impl TypeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `typedef <target> <name>;`.
    pub fn add_alias(&mut self, name: &str, target: &str) {
        let (base, _) = decompose(target);
        if !name.is_empty() && base != name {
            self.aliases.insert(name.to_string(), target.to_string());
        }
    }

    /// Register a record defined in the unit.
    pub fn add_known(&mut self, name: &str) {
        if !name.is_empty() {
            self.known.insert(name.to_string());
        }
    }

    /// Target name of a bare type name (no decorations), if recognised.
    pub fn resolve_name(&self, name: &str) -> Option<String> {
        self.resolve_base(name, 0).filter(|mapped| !mapped.placeholder).map(|mapped| {
            if mapped.indirect || mapped.array {
                mapped.field_type()
            } else {
                mapped.name
            }
        })
    }

    /// True if the identifier `name` certainly names a type: a record or
    /// typedef of the unit, or a prefixed library family name. Bare family
    /// names like `vec` are not enough, they are common variable names.
    pub fn names_type(&self, name: &str) -> bool {
        if self.known.contains(name) || self.aliases.contains_key(name) {
            return true;
        }
        let stripped = strip_library_prefix(name);
        stripped.len() != name.len() && family_name(stripped).is_some()
    }

    pub fn map(&self, spelling: &str) -> MappedType {
        self.map_depth(spelling, 0)
    }

    fn map_depth(&self, spelling: &str, depth: usize) -> MappedType {
        if is_function_pointer(spelling) {
            return MappedType {
                indirect: true,
                ..MappedType::placeholder()
            };
        }
        let (base, decorations) = decompose(spelling);
        let Some(inner) = self.resolve_base(&base, depth) else {
            return MappedType {
                indirect: decorations.pointers > 0 || decorations.lvalue_ref,
                ..MappedType::placeholder()
            };
        };
        let plain = !decorations.array
            && decorations.pointers == 0
            && !decorations.lvalue_ref
            && !decorations.rvalue_ref;
        if plain {
            return inner;
        }
        // decorations on an alias that is itself decorated
        if inner.indirect || inner.array || inner.passing != Passing::Value {
            return MappedType {
                indirect: true,
                ..MappedType::value("nint")
            };
        }

        let mut mapped = inner;
        mapped.array = decorations.array;
        match (decorations.pointers, decorations.lvalue_ref) {
            (0, false) => {}
            (0, true) if decorations.pointee_const => mapped.indirect = true,
            (0, true) => {
                mapped.indirect = true;
                mapped.passing = Passing::Ref;
            }
            (1, false) if mapped.name != "void" => {
                mapped.indirect = true;
                mapped.passing = if decorations.pointee_const {
                    Passing::In
                } else {
                    Passing::Ref
                };
            }
            _ => {
                mapped.name = "nint".to_string();
                mapped.indirect = true;
            }
        }
        mapped
    }

    fn resolve_base(&self, base: &str, depth: usize) -> Option<MappedType> {
        if base.is_empty() {
            return None;
        }
        if let Some(target) = primitive(base) {
            return Some(MappedType::value(target));
        }
        if let Some(target) = self.aliases.get(base) {
            if depth < 8 {
                let mapped = self.map_depth(target, depth + 1);
                return (!mapped.placeholder || mapped.indirect).then_some(mapped);
            }
            return None;
        }
        let stripped = strip_library_prefix(base);
        let is_type_name = stripped
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !is_type_name {
            return None;
        }
        if self.known.contains(base) || stripped.len() != base.len() {
            return Some(MappedType::value(normalize_type_name(base)));
        }
        family_name(stripped).map(MappedType::value)
    }
}
