//! Expression-evaluator error types.
//!
//! Every failure in the expression language — lexing, parsing or
//! evaluation — is an [`ExprError`]. Callers (Filter, Transform) recover
//! from these with their documented fallbacks; nothing here ever panics.

use thiserror::Error;

/// Errors produced while compiling or evaluating an expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("parse error at offset {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("unknown name '{0}' (only 'x' is bound)")]
    UnknownName(String),

    #[error("unknown method '{method}' on {target}")]
    UnknownMethod { method: String, target: &'static str },

    #[error("type error: {0}")]
    Type(String),

    #[error("index {0} out of range")]
    IndexOutOfRange(i64),

    #[error("missing key '{0}'")]
    MissingKey(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,
}

pub type ExprResult<T> = std::result::Result<T, ExprError>;
