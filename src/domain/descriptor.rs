/// Descriptor Parser
///
/// Turns one grammar row such as
///
/// ```text
/// Binary : Expr left, Token op, Expr right
/// ```
///
/// into a [`NodeSpec`]. The row must have exactly one `:` and a non-empty,
/// comma separated list of `<type> <name>` pairs. Types may be generic
/// (`List<Expr>`); commas and spaces inside angle brackets belong to the type.

use super::error::{GrammarError, Result};
use super::grammar::{FieldSpec, NodeSpec, TypeRef};
use super::naming::is_identifier;

pub fn parse(line: &str) -> Result<NodeSpec> {
    let (class, fields) = match line.split_once(':') {
        Some((class, fields)) if !fields.contains(':') => (class.trim(), fields.trim()),
        _ => {
            return Err(GrammarError::MissingSeparator {
                line: line.to_string(),
            })
        }
    };

    if !is_identifier(class) {
        return Err(GrammarError::InvalidClassName {
            line: line.to_string(),
            name: class.to_string(),
        });
    }

    let fields = split_top_level(fields, |c| c == ',')
        .into_iter()
        .map(|field| parse_field(line, field.trim()))
        .collect::<Result<Vec<_>>>()?;

    Ok(NodeSpec {
        class_name: class.to_string(),
        fields,
    })
}

fn parse_field(line: &str, field: &str) -> Result<FieldSpec> {
    let malformed = || GrammarError::MalformedField {
        line: line.to_string(),
        field: field.to_string(),
    };

    let tokens: Vec<&str> = split_top_level(field, char::is_whitespace)
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect();
    let [ty, name] = tokens.as_slice() else {
        return Err(malformed());
    };
    if !is_identifier(name) {
        return Err(malformed());
    }

    let ty = parse_type(ty).ok_or_else(|| GrammarError::MalformedType {
        line: line.to_string(),
        ty: ty.to_string(),
    })?;

    Ok(FieldSpec {
        ty,
        name: name.to_string(),
    })
}

/// Parse `Name` or `Name<Arg, ...>`. `None` if anything is left over.
pub fn parse_type(input: &str) -> Option<TypeRef> {
    let mut cursor = TypeCursor { rest: input };
    let ty = cursor.type_ref()?;
    cursor.skip_ws();
    cursor.rest.is_empty().then_some(ty)
}

struct TypeCursor<'a> {
    rest: &'a str,
}

impl<'a> TypeCursor<'a> {
    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let end = self
            .rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(self.rest.len());
        let (ident, rest) = self.rest.split_at(end);
        if !is_identifier(ident) {
            return None;
        }
        self.rest = rest;
        Some(ident)
    }

    fn type_ref(&mut self) -> Option<TypeRef> {
        let name = self.ident()?;
        if !self.eat('<') {
            return Some(TypeRef::named(name));
        }
        let mut args = vec![self.type_ref()?];
        while self.eat(',') {
            args.push(self.type_ref()?);
        }
        self.eat('>').then(|| TypeRef::generic(name, args))
    }
}

/// Split on `sep` wherever we are not inside `<...>`.
fn split_top_level(s: &str, sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && sep(c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_binary_row() {
        let node = parse("Binary		: Expr left, Token op, Expr right").unwrap();
        assert_eq!(node.class_name, "Binary");
        let fields: Vec<(String, &str)> = node
            .fields
            .iter()
            .map(|f| (f.ty.to_string(), f.name.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("Expr".to_string(), "left"),
                ("Token".to_string(), "op"),
                ("Expr".to_string(), "right"),
            ]
        );
    }

    #[test]
    fn test_parse_generic_field() {
        let node = parse("Call : Expr callee, Token paren, List<Expr> arguments").unwrap();
        assert_eq!(
            node.fields[2].ty,
            TypeRef::generic("List", vec![TypeRef::named("Expr")])
        );
        assert_eq!(node.fields[2].name, "arguments");
    }

    #[test]
    fn test_comma_inside_generic_stays_in_type() {
        let node = parse("Table : Map<Token, Expr> entries").unwrap();
        assert_eq!(node.fields.len(), 1);
        assert_eq!(node.fields[0].ty.to_string(), "Map<Token, Expr>");
    }

    #[test]
    fn test_display_round_trips_row_shape() {
        let node = parse("Var   : Token mutability, Token name, Option<Expr> initializer").unwrap();
        assert_eq!(
            node.to_string(),
            "Var : Token mutability, Token name, Option<Expr> initializer"
        );
    }

    #[rstest]
    #[case("Binary Expr left")]
    #[case("Binary : Expr left : Token op")]
    fn test_separator_count_enforced(#[case] line: &str) {
        assert!(matches!(parse(line), Err(GrammarError::MissingSeparator { .. })));
    }

    #[rstest]
    #[case("Binary : Expr")]
    #[case("Binary : Expr left right")]
    #[case("Binary : Expr left,")]
    #[case("Binary : ")]
    #[case("Binary : Expr 1left")]
    fn test_field_shape_enforced(#[case] line: &str) {
        assert!(matches!(parse(line), Err(GrammarError::MalformedField { .. })));
    }

    #[rstest]
    #[case("Binary : List<Expr left")]
    #[case("Binary : List<> items")]
    #[case("Binary : List<Expr>> items")]
    fn test_malformed_type_rejected(#[case] line: &str) {
        assert!(parse(line).is_err());
    }

    #[test]
    fn test_invalid_class_name_rejected() {
        assert!(matches!(
            parse("Bin ary : Expr left"),
            Err(GrammarError::InvalidClassName { .. })
        ));
        assert!(matches!(parse(" : Expr left"), Err(GrammarError::InvalidClassName { .. })));
    }
}
