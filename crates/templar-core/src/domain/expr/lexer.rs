//! Tokenizer for computed-tag expressions.

use super::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    True,
    False,
    LParen,
    RParen,
    Comma,
    Not,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Split an expression into tokens.
///
/// Identifiers are `[A-Za-z_][A-Za-z0-9_]*`; `true`/`false` are keywords.
/// String literals accept single or double quotes with no escape sequences —
/// tag values never need them.
pub(crate) fn tokenize(expression: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '!' => {
                chars.next();
                if chars.peek().is_some_and(|&(_, n)| n == '=') {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    tokens.push(Token::Not);
                }
            }
            '=' => {
                chars.next();
                if chars.peek().is_some_and(|&(_, n)| n == '=') {
                    chars.next();
                    tokens.push(Token::Eq);
                } else {
                    return Err(ExprError::UnexpectedChar { ch: '=', pos });
                }
            }
            '<' => {
                chars.next();
                if chars.peek().is_some_and(|&(_, n)| n == '=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek().is_some_and(|&(_, n)| n == '=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '&' => {
                chars.next();
                if chars.peek().is_some_and(|&(_, n)| n == '&') {
                    chars.next();
                    tokens.push(Token::And);
                } else {
                    return Err(ExprError::UnexpectedChar { ch: '&', pos });
                }
            }
            '|' => {
                chars.next();
                if chars.peek().is_some_and(|&(_, n)| n == '|') {
                    chars.next();
                    tokens.push(Token::Or);
                } else {
                    return Err(ExprError::UnexpectedChar { ch: '|', pos });
                }
            }
            '"' | '\'' => {
                let quote = c;
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some((_, ch)) if ch == quote => break,
                        Some((_, ch)) => literal.push(ch),
                        None => return Err(ExprError::UnterminatedString),
                    }
                }
                tokens.push(Token::Str(literal));
            }
            c if c.is_ascii_digit() => {
                let mut literal = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' {
                        literal.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber { literal: literal.clone() })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match ident.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(ident),
                });
            }
            other => return Err(ExprError::UnexpectedChar { ch: other, pos }),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_operators_and_idents() {
        let tokens = tokenize("!auth && Count(a, b) >= 2").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Not,
                Token::Ident("auth".into()),
                Token::And,
                Token::Ident("Count".into()),
                Token::LParen,
                Token::Ident("a".into()),
                Token::Comma,
                Token::Ident("b".into()),
                Token::RParen,
                Token::Ge,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn tokenizes_string_literals_with_either_quote() {
        assert_eq!(
            tokenize("framework == \"mvc\"").unwrap().last(),
            Some(&Token::Str("mvc".into()))
        );
        assert_eq!(
            tokenize("framework == 'mvc'").unwrap().last(),
            Some(&Token::Str("mvc".into()))
        );
    }

    #[test]
    fn rejects_single_ampersand() {
        assert!(matches!(
            tokenize("a & b"),
            Err(ExprError::UnexpectedChar { ch: '&', .. })
        ));
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(matches!(
            tokenize("name == \"oops"),
            Err(ExprError::UnterminatedString)
        ));
    }
}
