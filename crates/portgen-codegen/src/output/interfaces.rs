//! Interface emitter: the shared `IVector` capability interface.

use super::header;
use crate::ir::EntityGraph;
use crate::traits::{EmitOptions, Emitter, GeneratedFile};

/// Interface emitter instance.
pub static INTERFACE_EMITTER: InterfaceEmitter = InterfaceEmitter;

/// Emits `IVector.cs` once per run, whatever the graph holds.
pub struct InterfaceEmitter;

impl Emitter for InterfaceEmitter {
    fn name(&self) -> &'static str {
        "interfaces"
    }

    fn generate(&self, _graph: &EntityGraph, options: &EmitOptions) -> Vec<GeneratedFile> {
        if !options.emit_interfaces {
            return Vec::new();
        }
        vec![GeneratedFile::new(
            "IVector.cs",
            generate_interface(&options.namespace),
        )]
    }
}

/// C# source of the capability interface.
pub fn generate_interface(namespace: &str) -> String {
    let mut out = header(None);
    out.push_str(&format!("namespace {namespace};\n\n"));
    out.push_str("/// <summary>\n");
    out.push_str("/// Arithmetic shared by every named-component vector family.\n");
    out.push_str("/// </summary>\n");
    out.push_str("public interface IVector<TSelf, TScalar>\n");
    out.push_str("    where TSelf : struct, IVector<TSelf, TScalar>\n");
    out.push_str("{\n");
    out.push_str("    static abstract TSelf Zero { get; }\n");
    out.push_str("    static abstract TSelf Add(TSelf left, TSelf right);\n");
    out.push_str("    static abstract TSelf Subtract(TSelf left, TSelf right);\n");
    out.push_str("    static abstract TSelf Multiply(TSelf value, TScalar scalar);\n");
    out.push_str("    static abstract TScalar Dot(TSelf left, TSelf right);\n");
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_emitted_once_regardless_of_graph() {
        let files = INTERFACE_EMITTER.generate(&EntityGraph::new(), &EmitOptions::default());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "IVector.cs");
        let text = &files[0].contents;
        assert!(text.contains("namespace Portgen.Numerics;"));
        assert!(text.contains("static abstract TScalar Dot(TSelf left, TSelf right);"));
    }

    #[test]
    fn test_disabled_interface_emits_nothing() {
        let options = EmitOptions {
            emit_interfaces: false,
            ..EmitOptions::default()
        };
        assert!(INTERFACE_EMITTER.generate(&EntityGraph::new(), &options).is_empty());
    }
}
