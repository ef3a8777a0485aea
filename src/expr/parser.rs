//! Recursive-descent parser producing the expression AST.
//!
//! Precedence, lowest to highest: `or`, `and`, `not`, comparison
//! (non-chaining), `+`/`-`, `*`/`/`/`%`, unary `-`, postfix
//! (indexing, field access, method call). Nesting depth is capped so a
//! hostile expression cannot blow the stack.

use crate::expr::error::{ExprError, ExprResult};
use crate::expr::lexer::{tokenize, SpannedToken, Token};
use serde_json::Value;

/// Maximum nesting depth accepted by the parser.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// A literal JSON value (number, string, bool or null).
    Literal(Value),
    /// The bound name `x`.
    Var,
    Unary(UnaryOp, Box<Ast>),
    Binary(BinaryOp, Box<Ast>, Box<Ast>),
    /// Short-circuiting boolean and.
    And(Box<Ast>, Box<Ast>),
    /// Short-circuiting boolean or.
    Or(Box<Ast>, Box<Ast>),
    Index(Box<Ast>, Box<Ast>),
    Field(Box<Ast>, String),
    Method {
        target: Box<Ast>,
        name: String,
        args: Vec<Ast>,
    },
}

struct Parser {
    tokens: Vec<SpannedToken>,
    cursor: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|s| &s.token)
    }

    fn pos(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .map(|s| s.pos)
            .unwrap_or(self.end)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.cursor).map(|s| s.token.clone());
        if t.is_some() {
            self.cursor += 1;
        }
        t
    }

    fn eat(&mut self, expected: &Token) -> ExprResult<()> {
        if self.peek() == Some(expected) {
            self.cursor += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {expected:?}")))
        }
    }

    fn error(&self, message: impl Into<String>) -> ExprError {
        ExprError::Parse {
            position: self.pos(),
            message: message.into(),
        }
    }

    fn guard_depth(&self, depth: usize) -> ExprResult<()> {
        if depth > MAX_DEPTH {
            Err(ExprError::TooDeep(MAX_DEPTH))
        } else {
            Ok(())
        }
    }

    fn or_expr(&mut self, depth: usize) -> ExprResult<Ast> {
        self.guard_depth(depth)?;
        let mut lhs = self.and_expr(depth + 1)?;
        while self.peek() == Some(&Token::Or) {
            self.bump();
            let rhs = self.and_expr(depth + 1)?;
            lhs = Ast::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self, depth: usize) -> ExprResult<Ast> {
        self.guard_depth(depth)?;
        let mut lhs = self.not_expr(depth + 1)?;
        while self.peek() == Some(&Token::And) {
            self.bump();
            let rhs = self.not_expr(depth + 1)?;
            lhs = Ast::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn not_expr(&mut self, depth: usize) -> ExprResult<Ast> {
        self.guard_depth(depth)?;
        if self.peek() == Some(&Token::Not) {
            self.bump();
            let inner = self.not_expr(depth + 1)?;
            return Ok(Ast::Unary(UnaryOp::Not, Box::new(inner)));
        }
        self.comparison(depth + 1)
    }

    fn comparison(&mut self, depth: usize) -> ExprResult<Ast> {
        self.guard_depth(depth)?;
        let lhs = self.additive(depth + 1)?;
        let op = match self.peek() {
            Some(Token::EqEq) => BinaryOp::Eq,
            Some(Token::NotEq) => BinaryOp::Ne,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Ge) => BinaryOp::Ge,
            _ => return Ok(lhs),
        };
        self.bump();
        let rhs = self.additive(depth + 1)?;
        Ok(Ast::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    fn additive(&mut self, depth: usize) -> ExprResult<Ast> {
        self.guard_depth(depth)?;
        let mut lhs = self.term(depth + 1)?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.term(depth + 1)?;
            lhs = Ast::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self, depth: usize) -> ExprResult<Ast> {
        self.guard_depth(depth)?;
        let mut lhs = self.unary(depth + 1)?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.bump();
            let rhs = self.unary(depth + 1)?;
            lhs = Ast::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self, depth: usize) -> ExprResult<Ast> {
        self.guard_depth(depth)?;
        if self.peek() == Some(&Token::Minus) {
            self.bump();
            let inner = self.unary(depth + 1)?;
            return Ok(Ast::Unary(UnaryOp::Neg, Box::new(inner)));
        }
        self.postfix(depth + 1)
    }

    fn postfix(&mut self, depth: usize) -> ExprResult<Ast> {
        self.guard_depth(depth)?;
        let mut expr = self.primary(depth + 1)?;
        loop {
            match self.peek() {
                Some(Token::LBracket) => {
                    self.bump();
                    let index = self.or_expr(depth + 1)?;
                    self.eat(&Token::RBracket)?;
                    expr = Ast::Index(Box::new(expr), Box::new(index));
                }
                Some(Token::Dot) => {
                    self.bump();
                    let name = match self.bump() {
                        Some(Token::Ident(name)) => name,
                        _ => return Err(self.error("expected name after '.'")),
                    };
                    if self.peek() == Some(&Token::LParen) {
                        self.bump();
                        let mut args = Vec::new();
                        if self.peek() != Some(&Token::RParen) {
                            loop {
                                args.push(self.or_expr(depth + 1)?);
                                if self.peek() == Some(&Token::Comma) {
                                    self.bump();
                                } else {
                                    break;
                                }
                            }
                        }
                        self.eat(&Token::RParen)?;
                        expr = Ast::Method {
                            target: Box::new(expr),
                            name,
                            args,
                        };
                    } else {
                        expr = Ast::Field(Box::new(expr), name);
                    }
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn primary(&mut self, depth: usize) -> ExprResult<Ast> {
        self.guard_depth(depth)?;
        match self.bump() {
            Some(Token::Int(n)) => Ok(Ast::Literal(Value::from(n))),
            Some(Token::Float(f)) => Ok(Ast::Literal(Value::from(f))),
            Some(Token::Str(s)) => Ok(Ast::Literal(Value::from(s))),
            Some(Token::True) => Ok(Ast::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Ast::Literal(Value::Bool(false))),
            Some(Token::Null) => Ok(Ast::Literal(Value::Null)),
            Some(Token::Ident(name)) => {
                if name == "x" {
                    Ok(Ast::Var)
                } else {
                    // No ambient names: identifiers other than the bound
                    // name never resolve, which is what keeps the language
                    // free of imports and side-effecting calls.
                    Err(ExprError::UnknownName(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.or_expr(depth + 1)?;
                self.eat(&Token::RParen)?;
                Ok(inner)
            }
            Some(other) => Err(self.error(format!("unexpected token {other:?}"))),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

/// Parse an expression source string into an AST.
pub fn parse(src: &str) -> ExprResult<Ast> {
    let end = src.len();
    let mut parser = Parser {
        tokens: tokenize(src)?,
        cursor: 0,
        end,
    };
    let ast = parser.or_expr(0)?;
    if parser.peek().is_some() {
        return Err(parser.error("trailing input after expression"));
    }
    Ok(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_precedence_mul_over_add() {
        let ast = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            ast,
            Ast::Binary(
                BinaryOp::Add,
                Box::new(Ast::Literal(json!(1))),
                Box::new(Ast::Binary(
                    BinaryOp::Mul,
                    Box::new(Ast::Literal(json!(2))),
                    Box::new(Ast::Literal(json!(3))),
                )),
            )
        );
    }

    #[test]
    fn test_comparison_binds_looser_than_arithmetic() {
        let ast = parse("x % 2 == 0").unwrap();
        match ast {
            Ast::Binary(BinaryOp::Eq, lhs, _) => {
                assert!(matches!(*lhs, Ast::Binary(BinaryOp::Rem, _, _)));
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn test_method_call_with_args() {
        let ast = parse("x.contains('a')").unwrap();
        match ast {
            Ast::Method { name, args, .. } => {
                assert_eq!(name, "contains");
                assert_eq!(args, vec![Ast::Literal(json!("a"))]);
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn test_field_vs_method() {
        assert!(matches!(parse("x.name").unwrap(), Ast::Field(_, _)));
        assert!(matches!(parse("x.upper()").unwrap(), Ast::Method { .. }));
    }

    #[test]
    fn test_unknown_identifier_rejected() {
        assert_eq!(
            parse("__import__('os')"),
            Err(ExprError::UnknownName("__import__".into()))
        );
    }

    #[test]
    fn test_trailing_input_rejected() {
        assert!(parse("x + 1 x").is_err());
        assert!(parse("x *").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let mut src = String::new();
        for _ in 0..100 {
            src.push('(');
        }
        src.push('x');
        for _ in 0..100 {
            src.push(')');
        }
        assert_eq!(parse(&src), Err(ExprError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_boolean_word_and_symbol_forms() {
        assert_eq!(parse("x > 1 and x < 5").unwrap(), parse("x > 1 && x < 5").unwrap());
        assert_eq!(parse("not x").unwrap(), parse("!x").unwrap());
    }
}
