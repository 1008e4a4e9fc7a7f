//! Struct emitter: one explicit-layout C# struct per collected type.

use super::{INDENT, header, params, write_body};
use crate::ir::{EntityGraph, FieldInfo, MethodInfo, MethodKind, TypeInfo};
use crate::swizzle::{COMPONENTS, ComponentFamily, family_member, swizzles};
use crate::traits::{EmitOptions, Emitter, GeneratedFile};
use crate::types::{is_fixed_buffer_element, primitive_size};
use std::collections::HashSet;

/// Scalars whose `IVector` arithmetic needs no widening casts.
const VECTOR_SCALARS: &[&str] = &["float", "double", "int", "uint", "long", "ulong"];

/// Struct emitter instance.
pub static STRUCT_EMITTER: StructEmitter = StructEmitter;

/// Emits `<Type>.cs` for every collected type.
pub struct StructEmitter;

impl Emitter for StructEmitter {
    fn name(&self) -> &'static str {
        "structs"
    }

    fn generate(&self, graph: &EntityGraph, options: &EmitOptions) -> Vec<GeneratedFile> {
        if !options.emit_types {
            return Vec::new();
        }
        graph
            .types
            .iter()
            .map(|ty| GeneratedFile::new(format!("{}.cs", ty.name), generate_struct(ty, graph, options)))
            .collect()
    }
}

/// C# source of one type.
pub fn generate_struct(ty: &TypeInfo, graph: &EntityGraph, options: &EmitOptions) -> String {
    let family = ComponentFamily::of(ty);
    let conformance = family
        .as_ref()
        .filter(|f| options.emit_interfaces && VECTOR_SCALARS.contains(&f.scalar.as_str()));

    let mut members = String::new();
    let mut names: HashSet<String> = HashSet::from([ty.name.clone()]);
    let mut needs_unsafe = false;
    for field in &ty.fields {
        needs_unsafe |= write_field(&mut members, field, graph, &mut names);
    }
    for method in &ty.methods {
        members.push('\n');
        write_method(&mut members, method);
        names.insert(method.name.clone());
    }
    if let Some(family) = conformance {
        write_conformance(&mut members, &ty.name, family);
    }
    if let Some(family) = &family {
        write_swizzles(&mut members, ty, family, graph, &names);
    }

    let mut out = header(Some(&ty.source_name));
    out.push_str("using System;\n");
    out.push_str("using System.Runtime.InteropServices;\n");
    out.push_str(&format!("using static {}.Functions;\n\n", options.namespace));
    out.push_str(&format!("namespace {};\n\n", options.namespace));
    out.push_str(&format!("[StructLayout(LayoutKind.Explicit, Size = {})]\n", ty.size));
    let modifiers = if needs_unsafe {
        "public unsafe partial struct"
    } else {
        "public partial struct"
    };
    out.push_str(&format!("{modifiers} {}", ty.name));
    if let Some(family) = conformance {
        out.push_str(&format!(" : IVector<{}, {}>", ty.name, family.scalar));
    }
    out.push_str("\n{\n");
    out.push_str(&members);
    out.push_str("}\n");
    out
}

/// Write one field (or its expansion). Returns true if it is a fixed buffer.
fn write_field(
    out: &mut String,
    field: &FieldInfo,
    graph: &EntityGraph,
    names: &mut HashSet<String>,
) -> bool {
    let offset = field.offset;
    if field.placeholder {
        out.push_str(&format!(
            "{INDENT}// [FieldOffset({offset})] {}: unrecognised type `{}`, not emitted\n",
            field.name, field.source_type
        ));
        return false;
    }
    let ty = &field.target_type;
    let Some(count) = field.array_len else {
        out.push_str(&format!("{INDENT}[FieldOffset({offset})] public {ty} {};\n", field.name));
        names.insert(field.name.clone());
        return false;
    };
    if is_fixed_buffer_element(ty) {
        out.push_str(&format!(
            "{INDENT}[FieldOffset({offset})] public fixed {ty} {}[{count}];\n",
            field.name
        ));
        names.insert(field.name.clone());
        return true;
    }

    // arrays of structs: one field per element
    let stride = graph
        .type_named(ty)
        .map(|t| t.size)
        .or_else(|| primitive_size(ty));
    let Some(stride) = stride else {
        out.push_str(&format!(
            "{INDENT}// [FieldOffset({offset})] {}: element size of `{ty}` unknown, not emitted\n",
            field.name
        ));
        return false;
    };
    for i in 0..count {
        let name = format!("{}{i}", field.name);
        out.push_str(&format!(
            "{INDENT}[FieldOffset({})] public {ty} {name};\n",
            offset + i * stride
        ));
        names.insert(name);
    }
    false
}

fn write_method(out: &mut String, method: &MethodInfo) {
    let params = params(&method.params);
    match method.kind {
        MethodKind::Constructor => {
            out.push_str(&format!("{INDENT}public {}({params})\n", method.name));
        }
        MethodKind::Method => {
            let modifiers = if method.is_static { "public static" } else { "public" };
            out.push_str(&format!(
                "{INDENT}{modifiers} {} {}({params})\n",
                method.target_return_type, method.name
            ));
        }
    }
    write_body(out, &method.translated_body.text, 1);
}

/// Explicit `IVector<TSelf, TScalar>` members, so collected methods named
/// `Add` or `Dot` never clash with them.
fn write_conformance(out: &mut String, name: &str, family: &ComponentFamily) {
    let interface = format!("IVector<{name}, {}>", family.scalar);
    let scalar = &family.scalar;

    out.push('\n');
    out.push_str(&format!("{INDENT}static {name} {interface}.Zero => default;\n"));
    out.push_str(&format!(
        "{INDENT}static {name} {interface}.Add({name} left, {name} right) => new {name} {{ {} }};\n",
        join_components(family, ", ", |c| format!("{c} = left.{c} + right.{c}"))
    ));
    out.push_str(&format!(
        "{INDENT}static {name} {interface}.Subtract({name} left, {name} right) => new {name} {{ {} }};\n",
        join_components(family, ", ", |c| format!("{c} = left.{c} - right.{c}"))
    ));
    out.push_str(&format!(
        "{INDENT}static {name} {interface}.Multiply({name} value, {scalar} scalar) => new {name} {{ {} }};\n",
        join_components(family, ", ", |c| format!("{c} = value.{c} * scalar"))
    ));
    out.push_str(&format!(
        "{INDENT}static {scalar} {interface}.Dot({name} left, {name} right) => {};\n",
        join_components(family, " + ", |c| format!("left.{c} * right.{c}"))
    ));
}

fn join_components(
    family: &ComponentFamily,
    separator: &str,
    template: impl Fn(&str) -> String,
) -> String {
    family
        .fields
        .iter()
        .map(|c| template(c))
        .collect::<Vec<_>>()
        .join(separator)
}

fn write_swizzles(
    out: &mut String,
    ty: &TypeInfo,
    family: &ComponentFamily,
    graph: &EntityGraph,
    taken: &HashSet<String>,
) {
    let mut first = true;
    for swizzle in swizzles(family.dimension, family.dimension) {
        // union members like `XY` already provide the accessor
        if taken.contains(&swizzle.name) {
            continue;
        }
        let Some(result) = family_member(&ty.name, swizzle.len()) else {
            continue;
        };
        let targets = graph
            .type_named(&result)
            .and_then(ComponentFamily::of)
            .map(|f| f.fields)
            .unwrap_or_default();
        let inits = swizzle
            .components
            .iter()
            .enumerate()
            .map(|(slot, &component)| {
                let target = targets
                    .get(slot)
                    .cloned()
                    .unwrap_or_else(|| COMPONENTS[slot].to_string());
                format!("{target} = {}", family.fields[component])
            })
            .collect::<Vec<_>>()
            .join(", ");
        if first {
            out.push('\n');
            first = false;
        }
        out.push_str(&format!(
            "{INDENT}public {result} {} => new {result} {{ {inits} }};\n",
            swizzle.name
        ));
    }
}
