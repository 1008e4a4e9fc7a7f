//! Body translation from C++ token streams to C# statement text.
//!
//! A callable's tokens are split into its member initializer list and its
//! braced body, then run through an ordered rule table (see [`rules`]).
//! Anything the table rejects produces a throwing placeholder body tagged with
//! [`UNTRANSLATED_TAG`]; nothing is ever guessed.

mod format;
mod rules;

pub use format::format_statements;

use crate::ir::TranslatedBody;
use crate::types::TypeMapper;
use portgen_index::Token;
use rules::{Action, RULES, Scan};
use std::collections::HashSet;

/// Comment prefix marking a body that was not translated.
pub const UNTRANSLATED_TAG: &str = "// portgen:untranslated";

/// A deliberately failing body for a construct the rule table rejects.
pub fn placeholder(reason: &str) -> TranslatedBody {
    TranslatedBody {
        text: format!(
            "{UNTRANSLATED_TAG} {reason}\n\
             throw new System.NotImplementedException(\"portgen: untranslated body ({reason})\");"
        ),
        untranslated: Some(reason.to_string()),
    }
}

/// One `member(args)` entry of a constructor's initializer list.
#[derive(Debug, Clone, Copy)]
pub struct Initializer<'t> {
    pub member: &'t str,
    pub args: &'t [Token],
}

/// A callable definition split at its body.
#[derive(Debug, Clone)]
pub struct CallableParts<'t> {
    pub initializers: Vec<Initializer<'t>>,
    /// Body tokens, braces included.
    pub body: &'t [Token],
}

/// Index of the bracket closing the one at `open`.
fn matching(tokens: &[Token], open: usize) -> Option<usize> {
    let (open_text, close_text) = match tokens.get(open)?.text.as_str() {
        "(" => ("(", ")"),
        "[" => ("[", "]"),
        "{" => ("{", "}"),
        _ => return None,
    };
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.is_punct(open_text) {
            depth += 1;
        } else if token.is_punct(close_text) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split the full token extent of a callable definition into its initializer
/// list and body.
pub fn split_callable(tokens: &[Token]) -> Result<CallableParts<'_>, &'static str> {
    let mut open = tokens
        .iter()
        .position(|t| t.is_punct("("))
        .ok_or("missing parameter list")?;
    // `operator()` names itself with a pair of parentheses
    let call_operator = open > 0
        && tokens[open - 1].is("operator")
        && tokens.get(open + 1).is_some_and(|t| t.is_punct(")"));
    if call_operator {
        open = tokens[open + 2..]
            .iter()
            .position(|t| t.is_punct("("))
            .map(|i| i + open + 2)
            .ok_or("missing parameter list")?;
    }
    let close = matching(tokens, open).ok_or("unbalanced parameter list")?;

    let mut pos = close + 1;
    while let Some(token) = tokens.get(pos) {
        if token.is_punct(":") || token.is_punct("{") {
            break;
        }
        if token.is_punct("=") || token.is_punct(";") {
            return Err("declaration without body");
        }
        pos += 1;
    }

    let mut initializers = Vec::new();
    if tokens.get(pos).is_some_and(|t| t.is_punct(":")) {
        pos += 1;
        loop {
            let member_start = pos;
            while tokens
                .get(pos)
                .is_some_and(|t| !t.is_punct("(") && !t.is_punct("{"))
            {
                pos += 1;
            }
            let args_close = matching(tokens, pos).ok_or("malformed initializer list")?;
            let [member] = &tokens[member_start..pos] else {
                return Err("qualified member initializer");
            };
            initializers.push(Initializer {
                member: &member.text,
                args: &tokens[pos + 1..args_close],
            });
            pos = args_close + 1;
            match tokens.get(pos) {
                Some(t) if t.is_punct(",") => pos += 1,
                Some(t) if t.is_punct("{") => break,
                _ => return Err("malformed initializer list"),
            }
        }
    }

    let body_end = matching(tokens, pos).ok_or("unbalanced body")?;
    Ok(CallableParts {
        initializers,
        body: &tokens[pos..=body_end],
    })
}

fn has_top_level_comma(tokens: &[Token]) -> bool {
    let mut depth = 0i32;
    tokens.iter().any(|t| {
        match t.text.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth -= 1,
            "," => return depth == 0,
            _ => {}
        }
        false
    })
}

/// Translates bodies using the types known to one translation unit.
pub struct Translator<'m> {
    mapper: &'m TypeMapper,
    pointers: HashSet<String>,
}

impl<'m> Translator<'m> {
    pub fn new(mapper: &'m TypeMapper) -> Self {
        Self {
            mapper,
            pointers: HashSet::new(),
        }
    }

    /// Names of the callable's pointer parameters. Bodies that rebind or
    /// compute with them are rejected, since they are passed by reference.
    pub fn with_pointer_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pointers.extend(names.into_iter().map(Into::into));
        self
    }

    /// Translate the full token extent of a callable definition.
    pub fn translate_callable(&self, tokens: &[Token]) -> TranslatedBody {
        match split_callable(tokens) {
            Ok(parts) => self.translate_parts(&parts),
            Err(reason) => placeholder(reason),
        }
    }

    /// Translate a braced body.
    pub fn translate_body(&self, body: &[Token]) -> TranslatedBody {
        self.translate_parts(&CallableParts {
            initializers: Vec::new(),
            body,
        })
    }

    fn translate_parts(&self, parts: &CallableParts<'_>) -> TranslatedBody {
        let mut statements = Vec::new();
        for init in &parts.initializers {
            if self.mapper.names_type(init.member) {
                return placeholder("base class initializer");
            }
            if has_top_level_comma(init.args) {
                return placeholder("multi-argument member initializer");
            }
            statements.push(Token::ident(init.member));
            statements.push(Token::punct("="));
            if init.args.is_empty() {
                statements.push(Token::keyword("default"));
            } else {
                statements.extend(init.args.iter().cloned());
            }
            statements.push(Token::punct(";"));
        }

        let inner = match parts.body {
            [open, inner @ .., close] if open.is_punct("{") && close.is_punct("}") => inner,
            body => body,
        };
        statements.extend(inner.iter().cloned());

        match self.rewrite(&statements) {
            Ok(tokens) => TranslatedBody {
                text: format_statements(&tokens),
                untranslated: None,
            },
            Err(reason) => placeholder(reason),
        }
    }

    /// Apply the rule table to a token stream.
    pub fn rewrite(&self, tokens: &[Token]) -> Result<Vec<Token>, &'static str> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut pos = 0;
        while pos < tokens.len() {
            let scan = Scan {
                tokens,
                pos,
                mapper: self.mapper,
                pointers: &self.pointers,
            };
            let matched = RULES
                .iter()
                .find_map(|rule| (rule.apply)(&scan).map(|action| (rule.name, action)));
            match matched {
                Some((rule, Action::Reject(reason))) => {
                    tracing::debug!(rule, reason, token = %tokens[pos].text, "body rejected");
                    return Err(reason);
                }
                Some((_, Action::Emit { consumed, tokens: emitted })) => {
                    out.extend(emitted);
                    pos += consumed.max(1);
                }
                None => {
                    out.push(tokens[pos].clone());
                    pos += 1;
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portgen_index::tokenize;

    fn translate(source: &str) -> TranslatedBody {
        let mapper = TypeMapper::new();
        Translator::new(&mapper).translate_callable(&tokenize(source))
    }

    fn text(source: &str) -> String {
        let body = translate(source);
        assert!(body.untranslated.is_none(), "rejected: {:?}", body.untranslated);
        body.text
    }

    fn rejected(source: &str) -> String {
        translate(source).untranslated.expect("body was translated")
    }

    #[test]
    fn test_member_access_null_and_bool() {
        assert_eq!(text("float F(hmm_vec2 *V) { return V->X; }"), "return V.X;");
        assert_eq!(
            text("void F() { p = nullptr; q = NULL; b = TRUE; c = false; }"),
            "p = null;\nq = null;\nb = true;\nc = false;"
        );
    }

    #[test]
    fn test_functional_cast_and_literals() {
        assert_eq!(
            text("float F(int i) { return float(i) * 2.f; }"),
            "return (float)(i) * 2.0f;"
        );
        assert_eq!(
            text("unsigned F() { return (unsigned int)(010); }"),
            "return (uint)(8);"
        );
    }

    #[test]
    fn test_library_types_and_default_locals() {
        assert_eq!(
            text(
                "hmm_vec3 HMM_AddVec3(hmm_vec3 A, hmm_vec3 B) \
                 { hmm_vec3 Result; Result.X = A.X + B.X; return Result; }"
            ),
            "Vector3 Result = default;\nResult.X = A.X + B.X;\nreturn Result;"
        );
    }

    #[test]
    fn test_constructor_calls_and_math() {
        assert_eq!(
            text("hmm_vec2 F(float x, float y) { return hmm_vec2(sqrtf(x), std::sqrt(y)); }"),
            "return new Vector2(MathF.Sqrt(x), Math.Sqrt(y));"
        );
    }

    #[test]
    fn test_keywords_used_as_identifiers_are_escaped() {
        assert_eq!(
            text("float F() { auto base = 1.0f; return base; }"),
            "var @base = 1.0f;\nreturn @base;"
        );
    }

    #[test]
    fn test_nested_blocks() {
        assert_eq!(
            text("float F(float x) { if (x < 0.f) { return -x; } else { return x; } }"),
            "if (x < 0.0f)\n{\n    return -x;\n}\nelse\n{\n    return x;\n}"
        );
    }

    #[test]
    fn test_unsupported_constructs_are_rejected() {
        assert_eq!(
            rejected("void F(hmm_vec3 v) { hmm_vec3 *p = &v; }"),
            "pointer or reference local"
        );
        assert_eq!(
            rejected("hmm_vec3 F() { return *this; }"),
            "address-of or dereference"
        );
        assert_eq!(
            rejected("int F() { return sizeof(float); }"),
            "compile-time type query"
        );
        assert_eq!(
            rejected("int F() { #ifdef X\n return 1;\n#endif\n return 0; }"),
            "preprocessor directive"
        );
        assert_eq!(rejected("void F() { delete p; }"), "dynamic allocation");
        assert_eq!(
            rejected("float F() { return static_cast<float>(1); }"),
            "named cast"
        );
        assert_eq!(rejected("double F() { return 1.0L; }"), "long double literal");
        assert_eq!(
            rejected("hmm_vec2 F() { hmm_vec2 r = { 1, 2 }; return r; }"),
            "aggregate initializer"
        );
        assert_eq!(rejected("float F();"), "declaration without body");
    }

    #[test]
    fn test_placeholder_is_tagged_and_throws() {
        let body = translate("void F() { goto done; done: return; }");
        assert!(body.is_placeholder());
        assert!(body.text.starts_with(UNTRANSLATED_TAG));
        assert!(body.text.contains("throw new System.NotImplementedException"));
    }

    #[test]
    fn test_initializer_list_becomes_assignments() {
        assert_eq!(
            text("Vec2(float x, float y) : X(x), Y{y} { Normalize(); }"),
            "X = x;\nY = y;\nNormalize();"
        );
        assert_eq!(text("Vec2() : X(), Y() {}"), "X = default;\nY = default;");
        assert_eq!(
            rejected("Vec3(float x) : hmm_vec2(x, x), Z(0) {}"),
            "base class initializer"
        );
    }

    #[test]
    fn test_call_operator_signature() {
        assert_eq!(
            text("float operator()(int i) const { return E[i]; }"),
            "return E[i];"
        );
    }

    fn translate_with_pointers(source: &str, pointers: &[&str]) -> TranslatedBody {
        let mapper = TypeMapper::new();
        Translator::new(&mapper)
            .with_pointer_params(pointers.iter().copied())
            .translate_callable(&tokenize(source))
    }

    #[test]
    fn test_pointer_parameters_are_only_dereferenced() {
        let allowed = translate_with_pointers(
            "void Scale(hmm_vec2 *V, float s) { V->X = V->X * s; V->Y *= s; }",
            &["V"],
        );
        assert_eq!(allowed.text, "V.X = V.X * s;\nV.Y *= s;");

        for source in [
            "void Pick(float *Out, float *Other) { Out = Other; }",
            "void Step(float *Out, float *Other) { Out++; }",
            "void Step(float *Out, float *Other) { --Other; }",
            "float Next(float *Out, float *Other) { return *(Out + 1); }",
            "int Same(float *Out, float *Other) { return Out == Other; }",
            "int Set(float *Out, float *Other) { return !Out; }",
            "float At(float *Out, float *Other) { return Out[2]; }",
        ] {
            let body = translate_with_pointers(source, &["Out", "Other"]);
            assert!(body.untranslated.is_some(), "translated: {source}");
        }
    }

    #[test]
    fn test_pointer_name_as_member_is_not_a_pointer() {
        let body = translate_with_pointers("void F(hmm_vec2 *p, hmm_vec2 q) { q.p = 1; }", &["p"]);
        assert_eq!(body.text, "q.p = 1;");
    }

    #[test]
    fn test_tricky_constructs_translate_exactly_or_not_at_all() {
        assert_eq!(
            text("int Big() { return 1'000'000 + 0xFF'FF; }"),
            "return 1000000 + 0xFFFF;"
        );
        assert_eq!(rejected("int F() { return 12z; }"), "unsupported numeric literal");
        assert_eq!(rejected("float F() { return 0x1p3; }"), "unsupported numeric literal");
        assert_eq!(
            translate_with_pointers("void F(float *a, float *b) { a = b; }", &["a", "b"])
                .untranslated
                .as_deref(),
            Some("pointer parameter used as a value")
        );
    }

    #[test]
    fn test_split_callable() {
        let tokens = tokenize("Vec2(float x) : X(x) { }");
        let parts = split_callable(&tokens).unwrap();
        assert_eq!(parts.initializers.len(), 1);
        assert_eq!(parts.initializers[0].member, "X");
        assert_eq!(parts.body.len(), 2);
    }
}
