//! Lexical tokens as reported by a source index.

use serde::Serialize;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Punctuation,
    Keyword,
    Identifier,
    Literal,
    Comment,
}

/// A single token of a cursor's extent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn punct(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Punctuation, text)
    }

    pub fn keyword(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Keyword, text)
    }

    pub fn ident(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Identifier, text)
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Literal, text)
    }

    /// True if this token is the punctuation `text`.
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }

    /// True if this token spells `text`, regardless of kind.
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

/// Split C-like source text into tokens.
///
/// This is a small lexer for tests and in-memory cursors; the tree-sitter
/// index takes its tokens from the syntax tree instead.
pub fn tokenize(source: &str) -> Vec<Token> {
    const KEYWORDS: &[&str] = &[
        "auto", "bool", "break", "case", "catch", "char", "class", "const", "continue",
        "default", "delete", "do", "double", "else", "enum", "extern", "false", "float", "for",
        "goto", "if", "inline", "int", "long", "new", "nullptr", "operator", "return", "short",
        "signed", "sizeof", "static", "struct", "switch", "template", "this", "throw", "true",
        "try", "typename", "union", "unsigned", "void", "volatile", "while",
    ];
    const PUNCTS: &[&str] = &[
        "->*", "<<=", ">>=", "...", "->", "::", "++", "--", "<<", ">>", "<=", ">=", "==", "!=",
        "&&", "||", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", ".*",
    ];

    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if source[i..].starts_with("//") {
            let end = source[i..].find('\n').map_or(bytes.len(), |n| i + n);
            i = end;
            continue;
        }
        if source[i..].starts_with("/*") {
            let end = source[i + 2..].find("*/").map_or(bytes.len(), |n| i + 2 + n + 2);
            i = end;
            continue;
        }
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let word = &source[start..i];
            let kind = if KEYWORDS.contains(&word) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            tokens.push(Token::new(kind, word));
            continue;
        }
        let next_is_digit = bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit());
        if c.is_ascii_digit() || (c == '.' && next_is_digit) {
            let start = i;
            while i < bytes.len() {
                let b = bytes[i];
                let exponent_sign = (b == b'+' || b == b'-')
                    && matches!(bytes[i - 1], b'e' | b'E')
                    && !source[start..i].starts_with("0x");
                // digit separator: `1'000'000`
                let separator =
                    b == b'\'' && bytes.get(i + 1).is_some_and(|n| n.is_ascii_alphanumeric());
                if b.is_ascii_alphanumeric() || b == b'.' || exponent_sign || separator {
                    i += 1;
                } else {
                    break;
                }
            }
            tokens.push(Token::literal(&source[start..i]));
            continue;
        }
        if c == '"' || c == '\'' {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i] as char != c {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            tokens.push(Token::literal(&source[start..i]));
            continue;
        }
        if let Some(p) = PUNCTS.iter().find(|p| source[i..].starts_with(**p)) {
            tokens.push(Token::punct(*p));
            i += p.len();
            continue;
        }
        let len = c.len_utf8();
        tokens.push(Token::punct(&source[i..i + len]));
        i += len;
    }
    tokens
}
