//! The translation rule table.
//!
//! Rules are tried in table order at every token position and the first one
//! that matches decides. Reject rules come first: a construct with no faithful
//! C# counterpart must never reach a rewrite rule that would turn it into
//! something that compiles with different meaning.

use crate::types::{TypeMapper, is_csharp_keyword, primitive};
use portgen_index::{Token, TokenKind};
use std::collections::HashSet;

/// Read-only view of the token stream at one position.
pub(crate) struct Scan<'a> {
    pub tokens: &'a [Token],
    pub pos: usize,
    pub mapper: &'a TypeMapper,
    /// Parameters declared as `T *`, which become `ref T` / `in T`.
    pub pointers: &'a HashSet<String>,
}

impl<'a> Scan<'a> {
    fn at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn text_at(&self, offset: usize) -> Option<&'a str> {
        self.at(offset).map(|t| t.text.as_str())
    }

    fn current(&self) -> Option<&'a Token> {
        self.at(0)
    }

    fn prev(&self) -> Option<&'a Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// The previous token ends an operand, so `*`/`&` here are binary.
    fn prev_is_operand(&self) -> bool {
        let Some(prev) = self.prev() else {
            return false;
        };
        match prev.kind {
            TokenKind::Identifier | TokenKind::Literal => true,
            TokenKind::Keyword => matches!(
                prev.text.as_str(),
                "this" | "true" | "false" | "nullptr" | "NULL"
            ),
            TokenKind::Punctuation => matches!(prev.text.as_str(), ")" | "]" | "++" | "--"),
            TokenKind::Comment => false,
        }
    }

    /// The previous token is part of a type (`float x(`, `unsigned int(`).
    fn prev_is_type_word(&self) -> bool {
        self.prev().is_some_and(|prev| {
            (prev.kind == TokenKind::Keyword && primitive(&prev.text).is_some())
                || matches!(prev.text.as_str(), "signed" | "unsigned" | "const")
        })
    }

    /// At the start of a statement or for-init clause, ignoring cv-qualifiers.
    fn at_declaration_start(&self) -> bool {
        let mut i = self.pos;
        while i > 0 && matches!(self.tokens[i - 1].text.as_str(), "const" | "volatile") {
            i -= 1;
        }
        i == 0 || matches!(self.tokens[i - 1].text.as_str(), "{" | ";" | "}" | "(")
    }

    /// Builtin type spelled by the next one to four words, longest first.
    fn primitive_here(&self) -> Option<(usize, &'static str)> {
        (1..=4).rev().find_map(|len| {
            let words: Option<Vec<&str>> = (0..len)
                .map(|i| {
                    self.at(i)
                        .filter(|t| matches!(t.kind, TokenKind::Keyword | TokenKind::Identifier))
                        .map(|t| t.text.as_str())
                })
                .collect();
            primitive(&words?.join(" ")).map(|target| (len, target))
        })
    }

    /// Library type named by the current identifier.
    fn library_type_here(&self) -> Option<String> {
        let token = self.current()?;
        if token.kind != TokenKind::Identifier || !self.mapper.names_type(&token.text) {
            return None;
        }
        self.mapper.resolve_name(&token.text)
    }

    /// Any type starting here, with the number of tokens it spans.
    fn type_here(&self) -> Option<(usize, String)> {
        if let Some((len, target)) = self.primitive_here() {
            return Some((len, target.to_string()));
        }
        self.library_type_here().map(|name| (1, name))
    }
}

pub(crate) enum Action {
    /// The body cannot be translated faithfully.
    Reject(&'static str),
    /// Replace `consumed` input tokens with `tokens`.
    Emit { consumed: usize, tokens: Vec<Token> },
}

impl Action {
    fn replace(consumed: usize, tokens: Vec<Token>) -> Option<Action> {
        Some(Action::Emit { consumed, tokens })
    }

    fn one(token: Token) -> Option<Action> {
        Self::replace(1, vec![token])
    }
}

pub(crate) struct Rule {
    pub name: &'static str,
    pub apply: fn(&Scan<'_>) -> Option<Action>,
}

pub(crate) const RULES: &[Rule] = &[
    // reject
    Rule { name: "preprocessor", apply: reject_preprocessor },
    Rule { name: "unsupported-keyword", apply: reject_keyword },
    Rule { name: "pointer-to-member", apply: reject_member_pointer },
    Rule { name: "local-declarator", apply: reject_local_declarator },
    Rule { name: "brace-initialization", apply: reject_brace_init },
    Rule { name: "unary-indirection", apply: reject_unary_indirection },
    Rule { name: "pointer-parameter", apply: reject_pointer_parameter_use },
    Rule { name: "long-double-literal", apply: reject_long_double },
    Rule { name: "numeric-literal", apply: reject_unsupported_number },
    Rule { name: "lambda", apply: reject_lambda },
    // rewrite
    Rule { name: "arrow", apply: rewrite_arrow },
    Rule { name: "null", apply: rewrite_null },
    Rule { name: "bool", apply: rewrite_bool },
    Rule { name: "functional-cast", apply: rewrite_functional_cast },
    Rule { name: "constructor-call", apply: rewrite_constructor_call },
    Rule { name: "default-local", apply: rewrite_default_local },
    Rule { name: "primitive", apply: rewrite_primitive },
    Rule { name: "type-name", apply: rewrite_type_name },
    Rule { name: "auto", apply: rewrite_auto },
    Rule { name: "qualifier", apply: rewrite_drop_qualifier },
    Rule { name: "math", apply: rewrite_math },
    Rule { name: "scope", apply: rewrite_scope },
    Rule { name: "literal", apply: rewrite_literal },
    Rule { name: "keyword-identifier", apply: rewrite_keyword_identifier },
];

fn reject_preprocessor(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    (token.kind != TokenKind::Literal && token.text.starts_with('#'))
        .then_some(Action::Reject("preprocessor directive"))
}

fn reject_keyword(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    if !matches!(token.kind, TokenKind::Keyword | TokenKind::Identifier) {
        return None;
    }
    let reason = match token.text.as_str() {
        "new" | "delete" => "dynamic allocation",
        "sizeof" | "alignof" | "_Alignof" | "decltype" | "offsetof" => "compile-time type query",
        "goto" => "goto",
        "throw" | "try" | "catch" => "exception handling",
        "static_cast" | "dynamic_cast" | "const_cast" | "reinterpret_cast" => "named cast",
        "template" | "typename" => "template",
        "operator" => "operator expression",
        "static" | "thread_local" => "static local",
        "struct" | "union" | "class" | "enum" => "local type",
        "asm" | "__asm__" => "inline assembly",
        "va_start" | "va_arg" | "va_end" => "variadic arguments",
        _ => return None,
    };
    Some(Action::Reject(reason))
}

fn reject_member_pointer(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    (token.is_punct("->*") || token.is_punct(".*")).then_some(Action::Reject("pointer to member"))
}

fn reject_local_declarator(scan: &Scan<'_>) -> Option<Action> {
    if !scan.at_declaration_start() {
        return None;
    }
    let (len, _) = scan.type_here()?;
    match scan.text_at(len)? {
        "*" | "&" | "&&" => return Some(Action::Reject("pointer or reference local")),
        _ => {}
    }
    if scan.at(len)?.kind != TokenKind::Identifier {
        return None;
    }
    match scan.text_at(len + 1) {
        Some("(") => Some(Action::Reject("direct initialization")),
        Some("{") => Some(Action::Reject("brace initialization")),
        Some("[") => Some(Action::Reject("local array")),
        _ => None,
    }
}

fn reject_brace_init(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    let next_is_brace = scan.text_at(1) == Some("{");
    if (token.is_punct("=") || token.is("return")) && next_is_brace {
        return Some(Action::Reject("aggregate initializer"));
    }
    let (len, _) = scan.type_here()?;
    (scan.text_at(len) == Some("{")).then_some(Action::Reject("brace initialization"))
}

fn reject_unary_indirection(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    let is_indirection = token.is_punct("*") || token.is_punct("&");
    (is_indirection && !scan.prev_is_operand())
        .then_some(Action::Reject("address-of or dereference"))
}

/// Operators that treat a pointer as a value: rebinding, arithmetic,
/// comparison and truth tests.
const POINTER_VALUE_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", "++", "--", "+", "-", "*",
    "/", "%", "==", "!=", "<", ">", "<=", ">=", "!", "&&", "||", "?", "[",
];

/// A pointer parameter becomes a C# reference, so any use of the pointer
/// itself (rather than its pointee through `->`) would change meaning.
fn reject_pointer_parameter_use(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    if token.kind != TokenKind::Identifier || !scan.pointers.contains(&token.text) {
        return None;
    }
    let prev = scan.prev().map(|t| t.text.as_str());
    if matches!(prev, Some("." | "->" | "::")) || matches!(scan.text_at(1), Some("->" | ".")) {
        return None;
    }
    let is_value_operator = |text: Option<&str>| {
        text.is_some_and(|text| POINTER_VALUE_OPERATORS.contains(&text))
    };
    (is_value_operator(prev) || is_value_operator(scan.text_at(1)))
        .then_some(Action::Reject("pointer parameter used as a value"))
}

fn reject_long_double(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    if token.kind != TokenKind::Literal || !token.text.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let lower = token.text.to_ascii_lowercase();
    let is_float = !lower.starts_with("0x") && (lower.contains('.') || lower.contains('e'));
    (is_float && lower.ends_with('l')).then_some(Action::Reject("long double literal"))
}

/// Numbers `normalize_number` cannot spell faithfully (unknown suffixes,
/// hex floats, user-defined literals).
fn reject_unsupported_number(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    let numeric = token.kind == TokenKind::Literal
        && token.text.starts_with(|c: char| c.is_ascii_digit() || c == '.');
    (numeric && normalize_number(&token.text).is_none())
        .then_some(Action::Reject("unsupported numeric literal"))
}

fn reject_lambda(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    (token.is_punct("[") && !scan.prev_is_operand())
        .then_some(Action::Reject("lambda or initializer list"))
}

fn rewrite_arrow(scan: &Scan<'_>) -> Option<Action> {
    scan.current()?.is_punct("->").then(|| Action::one(Token::punct(".")))?
}

fn rewrite_null(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    matches!(token.text.as_str(), "nullptr" | "NULL")
        .then(|| Action::one(Token::keyword("null")))?
}

fn rewrite_bool(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    let value = match token.text.as_str() {
        "true" | "TRUE" => "true",
        "false" | "FALSE" => "false",
        _ => return None,
    };
    Action::one(Token::keyword(value))
}

/// `float(x)` becomes `(float)(x)`.
fn rewrite_functional_cast(scan: &Scan<'_>) -> Option<Action> {
    if scan.prev_is_operand() || scan.prev_is_type_word() {
        return None;
    }
    let (len, target) = scan.primitive_here()?;
    if scan.text_at(len) != Some("(") {
        return None;
    }
    Action::replace(
        len + 1,
        vec![
            Token::punct("("),
            Token::keyword(target),
            Token::punct(")"),
            Token::punct("("),
        ],
    )
}

/// `hmm_vec3(a, b, c)` becomes `new Vector3(a, b, c)`.
fn rewrite_constructor_call(scan: &Scan<'_>) -> Option<Action> {
    if scan.prev_is_operand() || scan.prev_is_type_word() || scan.text_at(1) != Some("(") {
        return None;
    }
    let target = scan.library_type_here()?;
    Action::replace(
        2,
        vec![Token::keyword("new"), Token::ident(target), Token::punct("(")],
    )
}

/// `hmm_vec3 Result;` becomes `Vector3 Result = default;` so the local is
/// definitely assigned before its fields are written.
fn rewrite_default_local(scan: &Scan<'_>) -> Option<Action> {
    if !scan.at_declaration_start() {
        return None;
    }
    let target = scan.library_type_here()?;
    let name = scan.at(1).filter(|t| t.kind == TokenKind::Identifier)?;
    if scan.text_at(2) != Some(";") {
        return None;
    }
    Action::replace(
        2,
        vec![
            Token::ident(target),
            Token::ident(name.text.clone()),
            Token::punct("="),
            Token::keyword("default"),
        ],
    )
}

fn rewrite_primitive(scan: &Scan<'_>) -> Option<Action> {
    let (len, target) = scan.primitive_here()?;
    Action::replace(len, vec![Token::keyword(target)])
}

fn rewrite_type_name(scan: &Scan<'_>) -> Option<Action> {
    scan.library_type_here()
        .and_then(|target| Action::one(Token::ident(target)))
}

fn rewrite_auto(scan: &Scan<'_>) -> Option<Action> {
    scan.current()?.is("auto").then(|| Action::one(Token::keyword("var")))?
}

fn rewrite_drop_qualifier(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    matches!(
        token.text.as_str(),
        "const" | "constexpr" | "volatile" | "inline" | "register"
    )
    .then(|| Action::replace(1, Vec::new()))?
}

/// C math functions with a `MathF`/`Math` counterpart of the same semantics.
const MATH_FUNCTIONS: &[(&str, &str, &str)] = &[
    ("sqrtf", "MathF", "Sqrt"),
    ("sinf", "MathF", "Sin"),
    ("cosf", "MathF", "Cos"),
    ("tanf", "MathF", "Tan"),
    ("asinf", "MathF", "Asin"),
    ("acosf", "MathF", "Acos"),
    ("atanf", "MathF", "Atan"),
    ("atan2f", "MathF", "Atan2"),
    ("powf", "MathF", "Pow"),
    ("expf", "MathF", "Exp"),
    ("logf", "MathF", "Log"),
    ("log10f", "MathF", "Log10"),
    ("floorf", "MathF", "Floor"),
    ("ceilf", "MathF", "Ceiling"),
    ("truncf", "MathF", "Truncate"),
    ("fabsf", "MathF", "Abs"),
    ("fminf", "MathF", "Min"),
    ("fmaxf", "MathF", "Max"),
    ("sqrt", "Math", "Sqrt"),
    ("sin", "Math", "Sin"),
    ("cos", "Math", "Cos"),
    ("tan", "Math", "Tan"),
    ("asin", "Math", "Asin"),
    ("acos", "Math", "Acos"),
    ("atan", "Math", "Atan"),
    ("atan2", "Math", "Atan2"),
    ("pow", "Math", "Pow"),
    ("exp", "Math", "Exp"),
    ("log", "Math", "Log"),
    ("log10", "Math", "Log10"),
    ("floor", "Math", "Floor"),
    ("ceil", "Math", "Ceiling"),
    ("trunc", "Math", "Truncate"),
    ("fabs", "Math", "Abs"),
    ("fmin", "Math", "Min"),
    ("fmax", "Math", "Max"),
];

/// Additional `std::` names; the float-suffixed C names above apply too.
const STD_MATH_FUNCTIONS: &[(&str, &str, &str)] = &[
    ("abs", "Math", "Abs"),
    ("min", "Math", "Min"),
    ("max", "Math", "Max"),
];

fn rewrite_math(scan: &Scan<'_>) -> Option<Action> {
    let (consumed, name) = if scan.text_at(0) == Some("std") && scan.text_at(1) == Some("::") {
        (3, scan.text_at(2)?)
    } else {
        (1, scan.text_at(0)?)
    };
    if scan.text_at(consumed) != Some("(") {
        return None;
    }
    let table = MATH_FUNCTIONS.iter();
    let (_, class, method) = if consumed == 3 {
        table.chain(STD_MATH_FUNCTIONS).find(|(c, _, _)| *c == name)?
    } else {
        MATH_FUNCTIONS.iter().find(|(c, _, _)| *c == name)?
    };
    Action::replace(
        consumed,
        vec![Token::ident(*class), Token::punct("."), Token::ident(*method)],
    )
}

/// `A::B` becomes `A.B`; a leading global `::` is dropped.
fn rewrite_scope(scan: &Scan<'_>) -> Option<Action> {
    if !scan.current()?.is_punct("::") {
        return None;
    }
    let qualified = scan
        .prev()
        .is_some_and(|prev| prev.kind == TokenKind::Identifier);
    if qualified {
        Action::one(Token::punct("."))
    } else {
        Action::replace(1, Vec::new())
    }
}

fn rewrite_literal(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    if token.kind != TokenKind::Literal {
        return None;
    }
    let normalized = normalize_number(&token.text)?;
    Action::one(Token::literal(normalized))
}

fn rewrite_keyword_identifier(scan: &Scan<'_>) -> Option<Action> {
    let token = scan.current()?;
    (token.kind == TokenKind::Identifier && is_csharp_keyword(&token.text))
        .then(|| Action::one(Token::ident(format!("@{}", token.text))))?
}

/// C# spelling of a numeric literal. `None` for non-numeric literals and for
/// numbers with no exact C# spelling.
pub(crate) fn normalize_number(text: &str) -> Option<String> {
    if !text.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    // digit separators carry no value
    let text = text.replace('\'', "");
    let lower = text.to_ascii_lowercase();

    let radix_prefix = ["0x", "0b"].into_iter().find(|p| lower.starts_with(p));
    if let Some(prefix) = radix_prefix {
        let body = &text[2..];
        let split = body
            .find(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L'))
            .unwrap_or(body.len());
        let (digits, suffix) = body.split_at(split);
        let valid_digit = |c: char| match prefix {
            "0x" => c.is_ascii_hexdigit(),
            _ => matches!(c, '0' | '1'),
        };
        if digits.is_empty() || !digits.chars().all(valid_digit) {
            return None;
        }
        return Some(format!("{}{digits}{}", &text[..2], integer_suffix(suffix)?));
    }

    if lower.contains('.') || lower.contains('e') {
        let (digits, suffix) = match text.char_indices().last() {
            Some((i, 'f' | 'F')) => (&text[..i], "f"),
            _ => (text.as_str(), ""),
        };
        let well_formed = digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
        if !well_formed {
            return None;
        }
        let mut digits = digits.to_string();
        if digits.starts_with('.') {
            digits.insert(0, '0');
        }
        if let Some(dot) = digits.find('.') {
            let fraction_missing = digits[dot + 1..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_ascii_digit());
            if fraction_missing {
                digits.insert(dot + 1, '0');
            }
        }
        return Some(format!("{digits}{suffix}"));
    }

    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, suffix) = text.split_at(split);
    let suffix = integer_suffix(suffix)?;
    let digits = if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(digits, 8).ok()?.to_string()
    } else {
        digits.to_string()
    };
    Some(format!("{digits}{suffix}"))
}

/// C# suffix for a C++ integer suffix; `None` for anything but `u`/`l`/`ll`
/// combinations.
fn integer_suffix(suffix: &str) -> Option<&'static str> {
    let lower = suffix.to_ascii_lowercase();
    let target = match lower.as_str() {
        "" => "",
        "u" => "U",
        "l" | "ll" => "L",
        "ul" | "lu" | "ull" | "llu" => "UL",
        _ => return None,
    };
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_number() {
        assert_eq!(normalize_number("1.f").as_deref(), Some("1.0f"));
        assert_eq!(normalize_number(".5f").as_deref(), Some("0.5f"));
        assert_eq!(normalize_number("2.0").as_deref(), Some("2.0"));
        assert_eq!(normalize_number("1e-3f").as_deref(), Some("1e-3f"));
        assert_eq!(normalize_number("1.e5").as_deref(), Some("1.0e5"));
        assert_eq!(normalize_number("017").as_deref(), Some("15"));
        assert_eq!(normalize_number("0").as_deref(), Some("0"));
        assert_eq!(normalize_number("10ull").as_deref(), Some("10UL"));
        assert_eq!(normalize_number("0xFFu").as_deref(), Some("0xFFU"));
        assert_eq!(normalize_number("'a'"), None);
    }

    #[test]
    fn test_digit_separators_keep_their_value() {
        assert_eq!(normalize_number("1'000'000").as_deref(), Some("1000000"));
        assert_eq!(normalize_number("0xFF'FF").as_deref(), Some("0xFFFF"));
        assert_eq!(normalize_number("0b1010'0101u").as_deref(), Some("0b10100101U"));
        assert_eq!(normalize_number("1'0.5f").as_deref(), Some("10.5f"));
    }

    #[test]
    fn test_unknown_suffixes_are_not_dropped() {
        assert_eq!(normalize_number("10_km"), None);
        assert_eq!(normalize_number("12z"), None);
        assert_eq!(normalize_number("0x1p3"), None);
        assert_eq!(normalize_number("09"), None);
        assert_eq!(normalize_number("1.5q"), None);
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }
}
