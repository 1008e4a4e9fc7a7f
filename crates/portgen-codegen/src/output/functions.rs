//! Function emitter: every free function in one static class.

use super::{INDENT, header, params, write_body};
use crate::ir::EntityGraph;
use crate::traits::{EmitOptions, Emitter, GeneratedFile};

/// Function emitter instance.
pub static FUNCTION_EMITTER: FunctionEmitter = FunctionEmitter;

/// Emits `Functions.cs`. The class is always written, even when empty, since
/// struct files import it with `using static`.
pub struct FunctionEmitter;

impl Emitter for FunctionEmitter {
    fn name(&self) -> &'static str {
        "functions"
    }

    fn generate(&self, graph: &EntityGraph, options: &EmitOptions) -> Vec<GeneratedFile> {
        vec![GeneratedFile::new(
            "Functions.cs",
            generate_functions(graph, &options.namespace),
        )]
    }
}

pub fn generate_functions(graph: &EntityGraph, namespace: &str) -> String {
    let mut out = header(None);
    out.push_str("using System;\n\n");
    out.push_str(&format!("namespace {namespace};\n\n"));
    out.push_str("public static partial class Functions\n{\n");
    for (i, function) in graph.functions.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "{INDENT}public static {} {}({})\n",
            function.target_return_type,
            function.name,
            params(&function.params)
        ));
        write_body(&mut out, &function.translated_body.text, 1);
    }
    out.push_str("}\n");
    out
}
