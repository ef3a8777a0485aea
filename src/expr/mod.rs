//! Sandboxed expression language for Filter and Transform stages.
//!
//! Expressions are evaluated against exactly one bound name, `x` — the
//! current item. There are no ambient names, no imports and no
//! side-effecting calls: the operator and method surface below is the
//! entire language.
//!
//! ## Grammar
//!
//! Precedence, lowest to highest:
//!
//! - boolean: `a or b`, `a and b`, `not a` (symbol spellings `&&`,
//!   `||` and `!` lex to the same tokens)
//! - comparison: `== != < <= > >=` (non-chaining)
//! - additive: `a + b`, `a - b` (`+` also concatenates strings)
//! - multiplicative: `a * b`, `a / b`, `a % b`
//! - unary: `-a`
//! - postfix: `a[i]`, `a.field`, `a.method(args)`
//! - primary: int, float, `'str'`/`"str"`, `true`/`false`/`null`
//!   (Python-style `True`/`False`/`None` accepted), `x`, `( … )`
//!
//! Integer arithmetic stays integer (checked; overflow is an error)
//! except `/`, which always yields a float. Division or remainder by
//! zero is an error. Evaluation errors are always recoverable
//! [`ExprError`]s — the calling stage decides the fallback.
//!
//! ## Methods
//!
//! - strings: `upper()`, `lower()`, `trim()`, `len()`, `contains(s)`,
//!   `starts_with(s)`, `ends_with(s)`, `replace(from, to)`
//! - arrays: `len()`, `contains(v)`
//! - objects: `len()`, `has(key)`
//! - numbers: `abs()`, `floor()`, `ceil()`, `round()`
//!
//! ## Example
//!
//! ```
//! use listflow::expr::Expr;
//! use serde_json::json;
//!
//! let expr = Expr::parse("x % 2 == 0").unwrap();
//! assert!(expr.eval_bool(&json!(4)).unwrap());
//! assert!(!expr.eval_bool(&json!(5)).unwrap());
//! ```

pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use error::{ExprError, ExprResult};
pub use eval::truthy;

use parser::Ast;
use serde_json::Value;

/// A compiled expression: parse once, evaluate per item.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    source: String,
    ast: Ast,
}

impl Expr {
    /// Compile an expression source string.
    pub fn parse(source: &str) -> ExprResult<Self> {
        Ok(Self {
            source: source.to_string(),
            ast: parser::parse(source)?,
        })
    }

    /// The source text this expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against the bound value `x`.
    pub fn eval(&self, x: &Value) -> ExprResult<Value> {
        eval::eval(&self.ast, x)
    }

    /// Evaluate and reduce to truthiness (the Filter predicate form).
    pub fn eval_bool(&self, x: &Value) -> ExprResult<bool> {
        Ok(truthy(&self.eval(x)?))
    }
}

/// One-entry compile memo. Filter and Transform read their expression
/// from config on every `process` call (config is editable between
/// runs); the slot recompiles only when the source text actually
/// changed, and remembers a failed parse so it is not retried per call.
#[derive(Debug, Clone, Default)]
pub struct ExprSlot {
    entry: Option<(String, ExprResult<Expr>)>,
}

impl ExprSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the compiled expression for `source`, recompiling on change.
    pub fn get_or_compile(&mut self, source: &str) -> ExprResult<&Expr> {
        let stale = !matches!(&self.entry, Some((cached, _)) if cached == source);
        if stale {
            self.entry = Some((source.to_string(), Expr::parse(source)));
        }
        match &self.entry {
            Some((_, Ok(expr))) => Ok(expr),
            Some((_, Err(err))) => Err(err.clone()),
            None => unreachable!("slot filled above"),
        }
    }
}
