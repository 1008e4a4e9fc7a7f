//! Layout of translated tokens as C# statement text.

use portgen_index::{Token, TokenKind};

const INDENT: &str = "    ";

/// Keywords followed by a space before `(`.
const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "return", "catch", "foreach"];

/// Render statement tokens (outer braces already removed) one statement per
/// line, with braces on their own lines and nested blocks indented.
pub fn format_statements(tokens: &[Token]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut depth = 0usize;
    let mut parens = 0usize;
    let mut prev: Option<&Token> = None;
    let mut prev_unary = false;

    let flush = |line: &mut String, lines: &mut Vec<String>, depth: usize| {
        let text = line.trim_end();
        if !text.is_empty() {
            lines.push(format!("{}{text}", INDENT.repeat(depth)));
        }
        line.clear();
    };

    for token in tokens {
        let text = token.text.as_str();
        match text {
            "{" if parens == 0 => {
                flush(&mut line, &mut lines, depth);
                lines.push(format!("{}{{", INDENT.repeat(depth)));
                depth += 1;
                prev = Some(token);
                prev_unary = false;
                continue;
            }
            "}" if parens == 0 => {
                flush(&mut line, &mut lines, depth);
                depth = depth.saturating_sub(1);
                lines.push(format!("{}}}", INDENT.repeat(depth)));
                prev = Some(token);
                prev_unary = false;
                continue;
            }
            // empty statements left behind by `};` and the like
            ";" if parens == 0 && line.trim().is_empty() => {
                prev = Some(token);
                continue;
            }
            _ => {}
        }

        let closes_label = text == ":" && parens == 0 && is_label(&format!("{line}:"));
        if !line.is_empty() && !closes_label && needs_space(prev, token, prev_unary) {
            line.push(' ');
        }
        line.push_str(text);

        prev_unary = is_unary(prev, token);
        match text {
            "(" | "[" => parens += 1,
            ")" | "]" => parens = parens.saturating_sub(1),
            ";" if parens == 0 => flush(&mut line, &mut lines, depth),
            ":" if closes_label => flush(&mut line, &mut lines, depth),
            _ => {}
        }
        prev = Some(token);
    }
    flush(&mut line, &mut lines, depth);
    lines.join("\n")
}

/// True if `line` is a complete `case ...:` or `default:` label.
fn is_label(line: &str) -> bool {
    let line = line.trim_start();
    (line.starts_with("case ") && !line.contains('?')) || line == "default:"
}

/// True if `prev` ends an operand (so a following `-` is binary).
fn ends_operand(prev: Option<&Token>) -> bool {
    match prev {
        None => false,
        Some(token) => match token.kind {
            TokenKind::Identifier | TokenKind::Literal => true,
            TokenKind::Keyword => matches!(
                token.text.as_str(),
                "this" | "true" | "false" | "null" | "default"
            ),
            TokenKind::Punctuation => matches!(token.text.as_str(), ")" | "]" | "++" | "--"),
            TokenKind::Comment => false,
        },
    }
}

fn is_unary(prev: Option<&Token>, token: &Token) -> bool {
    match token.text.as_str() {
        "!" | "~" => true,
        "-" | "+" | "++" | "--" => !ends_operand(prev),
        _ => false,
    }
}

fn needs_space(prev: Option<&Token>, next: &Token, prev_unary: bool) -> bool {
    let Some(prev) = prev else {
        return false;
    };
    if prev_unary {
        return false;
    }
    let p = prev.text.as_str();
    let n = next.text.as_str();
    if matches!(p, "(" | "[" | ".") {
        return false;
    }
    match n {
        ")" | "]" | "," | ";" | "." => false,
        "++" | "--" if ends_operand(Some(prev)) => false,
        "(" | "[" => {
            CONTROL_KEYWORDS.contains(&p) || (!ends_operand(Some(prev)) && !is_type_keyword(p))
        }
        _ => true,
    }
}

fn is_type_keyword(word: &str) -> bool {
    matches!(
        word,
        "bool"
            | "byte"
            | "sbyte"
            | "char"
            | "short"
            | "ushort"
            | "int"
            | "uint"
            | "long"
            | "ulong"
            | "float"
            | "double"
            | "nint"
            | "nuint"
            | "void"
            | "var"
    )
}
