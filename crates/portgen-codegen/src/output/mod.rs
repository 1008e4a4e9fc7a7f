//! Output emitters for C#.
//!
//! Each emitter reads the completed [`EntityGraph`](crate::ir::EntityGraph)
//! and produces files. All emitters implement the
//! [`Emitter`](crate::traits::Emitter) trait for uniform access.

pub mod functions;
pub mod interfaces;
pub mod structs;

pub use functions::{FUNCTION_EMITTER, FunctionEmitter, generate_functions};
pub use interfaces::{INTERFACE_EMITTER, InterfaceEmitter, generate_interface};
pub use structs::{STRUCT_EMITTER, StructEmitter, generate_struct};

use crate::ir::{EntityGraph, ParamInfo};
use crate::traits::{EmitOptions, Emitter, GeneratedFile};

const INDENT: &str = "    ";

/// Built-in emitters, in output order.
pub fn emitters() -> Vec<&'static dyn Emitter> {
    vec![&INTERFACE_EMITTER, &FUNCTION_EMITTER, &STRUCT_EMITTER]
}

/// Find a built-in emitter by name.
pub fn find_emitter(name: &str) -> Option<&'static dyn Emitter> {
    emitters().into_iter().find(|e| e.name() == name)
}

/// Run every built-in emitter over the graph.
pub fn emit_all(graph: &EntityGraph, options: &EmitOptions) -> Vec<GeneratedFile> {
    emitters()
        .into_iter()
        .flat_map(|emitter| {
            let files = emitter.generate(graph, options);
            tracing::debug!(emitter = emitter.name(), files = files.len(), "emitted");
            files
        })
        .collect()
}

/// `<auto-generated>` banner opening every file.
pub(crate) fn header(source: Option<&str>) -> String {
    let origin = match source {
        Some(source) => format!("Generated by portgen from {source}."),
        None => "Generated by portgen.".to_string(),
    };
    format!(
        "// <auto-generated>\n\
         //     {origin} Changes will be lost on regeneration.\n\
         // </auto-generated>\n\n"
    )
}

/// Parameter list text: `float x, ref Vector3 v`.
pub(crate) fn params(params: &[ParamInfo]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.target_type, p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A braced block at `depth`, holding the statement lines of `text`.
pub(crate) fn write_body(out: &mut String, text: &str, depth: usize) {
    let outer = INDENT.repeat(depth);
    let inner = INDENT.repeat(depth + 1);
    out.push_str(&format!("{outer}{{\n"));
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        out.push_str(&format!("{inner}{line}\n"));
    }
    out.push_str(&format!("{outer}}}\n"));
}
