//! Token streams from tree-sitter leaves.

use crate::token::{Token, TokenKind};
use tree_sitter::Node;

/// Nodes reported as one token even though the grammar gives them children.
const ATOMIC_KINDS: &[&str] = &[
    "string_literal",
    "raw_string_literal",
    "char_literal",
    "concatenated_string",
    "user_defined_literal",
    "system_lib_string",
];

/// Tokens of `node`'s extent, comments excluded.
pub fn collect_tokens(node: Node, source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_tokens(node, source, &mut tokens);
    tokens
}

fn push_tokens(node: Node, source: &str, out: &mut Vec<Token>) {
    if node.kind() == "comment" {
        return;
    }
    if node.child_count() == 0 || ATOMIC_KINDS.contains(&node.kind()) {
        let text = node.utf8_text(source.as_bytes()).unwrap_or("");
        // MISSING nodes have zero width
        if !text.is_empty() {
            out.push(Token::new(classify(node, text), text));
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        push_tokens(child, source, out);
    }
}

fn classify(node: Node, text: &str) -> TokenKind {
    match node.kind() {
        "number_literal" | "string_literal" | "raw_string_literal" | "char_literal"
        | "concatenated_string" | "user_defined_literal" | "system_lib_string" => {
            TokenKind::Literal
        }
        "identifier" | "field_identifier" | "type_identifier" | "namespace_identifier"
        | "statement_identifier" => TokenKind::Identifier,
        "primitive_type" | "true" | "false" | "null" | "nullptr" | "this" => TokenKind::Keyword,
        _ if text.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') => {
            if node.is_named() {
                TokenKind::Identifier
            } else {
                TokenKind::Keyword
            }
        }
        _ => TokenKind::Punctuation,
    }
}
