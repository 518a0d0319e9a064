//! Recursive-descent parser for computed-tag expressions.
//!
//! Grammar (standard precedence, loosest first):
//!
//! ```text
//! expression := or
//! or         := and ( "||" and )*
//! and        := equality ( "&&" equality )*
//! equality   := relational ( ("==" | "!=") relational )*
//! relational := unary ( ("<" | "<=" | ">" | ">=") unary )*
//! unary      := "!" unary | primary
//! primary    := literal | ident | ident "(" args ")" | "(" expression ")"
//! args       := expression ( "," expression )*
//! ```

use super::ExprError;
use super::lexer::Token;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Bool(bool),
    Num(f64),
    Str(String),
    Var(String),
    Not(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

pub(crate) fn parse(tokens: &[Token]) -> Result<Expr, ExprError> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or()?;
    if let Some(token) = parser.peek() {
        return Err(ExprError::TrailingInput {
            token: format!("{token:?}"),
        });
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            let rhs = self.and()?;
            lhs = binary(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.equality()?;
        while self.eat(&Token::And) {
            let rhs = self.equality()?;
            lhs = binary(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn equality(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinOp::Eq,
                Some(Token::Ne) => BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.relational()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn relational(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Ge) => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.advance().cloned() {
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Number(n)) => Ok(Expr::Num(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let args = self.arguments()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.or()?;
                if !self.eat(&Token::RParen) {
                    return Err(ExprError::Expected {
                        what: "closing `)`",
                    });
                }
                Ok(inner)
            }
            Some(other) => Err(ExprError::TrailingInput {
                token: format!("{other:?}"),
            }),
            None => Err(ExprError::Expected {
                what: "an operand",
            }),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, ExprError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.or()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            return Err(ExprError::Expected {
                what: "`,` or `)` in argument list",
            });
        }
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse_str(s: &str) -> Result<Expr, ExprError> {
        parse(&tokenize(s).unwrap())
    }

    #[test]
    fn precedence_binds_and_tighter_than_or() {
        let expr = parse_str("a || b && c").unwrap();
        match expr {
            Expr::Binary { op: BinOp::Or, rhs, .. } => {
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::And, .. }));
            }
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn parses_variadic_call_in_comparison() {
        let expr = parse_str("Count(a, b, c) > 1").unwrap();
        match expr {
            Expr::Binary { op: BinOp::Gt, lhs, .. } => match *lhs {
                Expr::Call { ref name, ref args } => {
                    assert_eq!(name, "Count");
                    assert_eq!(args.len(), 3);
                }
                other => panic!("unexpected lhs: {other:?}"),
            },
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn rejects_trailing_tokens() {
        assert!(matches!(parse_str("a b"), Err(ExprError::TrailingInput { .. })));
    }

    #[test]
    fn rejects_unclosed_parenthesis() {
        assert!(matches!(parse_str("(a || b"), Err(ExprError::Expected { .. })));
    }

    #[test]
    fn parses_nested_negation() {
        let expr = parse_str("!!a").unwrap();
        assert!(matches!(expr, Expr::Not(inner) if matches!(*inner, Expr::Not(_))));
    }
}
