//! Tree-walking evaluator over `serde_json::Value`.
//!
//! Number semantics: integer∘integer stays integer (checked, overflow is
//! an error) except `/`, which always yields a float; mixed arithmetic
//! promotes to float. A non-finite float result is an error because it
//! cannot be represented as a JSON number.

use crate::expr::error::{ExprError, ExprResult};
use crate::expr::parser::{Ast, BinaryOp, UnaryOp};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Truthiness used by `not`, `and`, `or` and the Filter predicate:
/// null is false, booleans are themselves, numbers are true when nonzero,
/// strings/arrays/objects are true when non-empty.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

fn as_num(value: &Value) -> Option<Num> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Num::Int(i))
            } else {
                n.as_f64().map(Num::Float)
            }
        }
        _ => None,
    }
}

fn float_value(f: f64) -> ExprResult<Value> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| ExprError::Type("result is not a finite number".into()))
}

fn arith(op: BinaryOp, lhs: &Value, rhs: &Value) -> ExprResult<Value> {
    // String concatenation rides on `+`.
    if op == BinaryOp::Add {
        if let (Value::String(a), Value::String(b)) = (lhs, rhs) {
            return Ok(Value::String(format!("{a}{b}")));
        }
    }
    let (a, b) = match (as_num(lhs), as_num(rhs)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(ExprError::Type(format!(
                "cannot apply arithmetic to {} and {}",
                type_name(lhs),
                type_name(rhs)
            )))
        }
    };
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => match op {
            BinaryOp::Add => a.checked_add(b).map(Value::from).ok_or(ExprError::Overflow),
            BinaryOp::Sub => a.checked_sub(b).map(Value::from).ok_or(ExprError::Overflow),
            BinaryOp::Mul => a.checked_mul(b).map(Value::from).ok_or(ExprError::Overflow),
            // Division always yields a float, matching the original engine.
            BinaryOp::Div => {
                if b == 0 {
                    Err(ExprError::DivisionByZero)
                } else {
                    float_value(a as f64 / b as f64)
                }
            }
            BinaryOp::Rem => {
                if b == 0 {
                    Err(ExprError::DivisionByZero)
                } else {
                    a.checked_rem(b).map(Value::from).ok_or(ExprError::Overflow)
                }
            }
            _ => unreachable!("comparison handled before arith"),
        },
        (a, b) => {
            let (a, b) = (num_as_f64(a), num_as_f64(b));
            match op {
                BinaryOp::Add => float_value(a + b),
                BinaryOp::Sub => float_value(a - b),
                BinaryOp::Mul => float_value(a * b),
                BinaryOp::Div => {
                    if b == 0.0 {
                        Err(ExprError::DivisionByZero)
                    } else {
                        float_value(a / b)
                    }
                }
                BinaryOp::Rem => {
                    if b == 0.0 {
                        Err(ExprError::DivisionByZero)
                    } else {
                        float_value(a % b)
                    }
                }
                _ => unreachable!("comparison handled before arith"),
            }
        }
    }
}

fn num_as_f64(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    }
}

/// Equality with numeric int/float unification. Mismatched types are
/// unequal rather than an error.
pub fn value_eq(lhs: &Value, rhs: &Value) -> bool {
    match (as_num(lhs), as_num(rhs)) {
        (Some(a), Some(b)) => num_as_f64(a) == num_as_f64(b),
        _ => lhs == rhs,
    }
}

fn value_cmp(lhs: &Value, rhs: &Value) -> ExprResult<Ordering> {
    if let (Some(a), Some(b)) = (as_num(lhs), as_num(rhs)) {
        return num_as_f64(a)
            .partial_cmp(&num_as_f64(b))
            .ok_or_else(|| ExprError::Type("numbers are not comparable".into()));
    }
    if let (Value::String(a), Value::String(b)) = (lhs, rhs) {
        return Ok(a.cmp(b));
    }
    Err(ExprError::Type(format!(
        "cannot order {} and {}",
        type_name(lhs),
        type_name(rhs)
    )))
}

fn index(target: &Value, key: &Value) -> ExprResult<Value> {
    match (target, key) {
        (Value::Array(items), Value::Number(_)) => {
            let raw = key
                .as_i64()
                .ok_or_else(|| ExprError::Type("array index must be an integer".into()))?;
            // Negative indices count from the end.
            let idx = if raw < 0 { raw + items.len() as i64 } else { raw };
            if idx < 0 || idx as usize >= items.len() {
                return Err(ExprError::IndexOutOfRange(raw));
            }
            Ok(items[idx as usize].clone())
        }
        (Value::Object(map), Value::String(key)) => map
            .get(key)
            .cloned()
            .ok_or_else(|| ExprError::MissingKey(key.clone())),
        _ => Err(ExprError::Type(format!(
            "cannot index {} with {}",
            type_name(target),
            type_name(key)
        ))),
    }
}

fn field(target: &Value, name: &str) -> ExprResult<Value> {
    match target {
        Value::Object(map) => map
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::MissingKey(name.to_string())),
        _ => Err(ExprError::Type(format!(
            "cannot access field '{}' on {}",
            name,
            type_name(target)
        ))),
    }
}

fn str_arg<'a>(args: &'a [Value], method: &str) -> ExprResult<&'a str> {
    match args {
        [Value::String(s)] => Ok(s),
        _ => Err(ExprError::Type(format!(
            "{method}() takes exactly one string argument"
        ))),
    }
}

/// The enumerated method table. Anything not listed here is an
/// evaluation error, which is what keeps the surface a fixed contract.
fn call_method(target: &Value, name: &str, args: &[Value]) -> ExprResult<Value> {
    let no_args = || -> ExprResult<()> {
        if args.is_empty() {
            Ok(())
        } else {
            Err(ExprError::Type(format!("{name}() takes no arguments")))
        }
    };
    match target {
        Value::String(s) => match name {
            "upper" => {
                no_args()?;
                Ok(Value::String(s.to_uppercase()))
            }
            "lower" => {
                no_args()?;
                Ok(Value::String(s.to_lowercase()))
            }
            "trim" => {
                no_args()?;
                Ok(Value::String(s.trim().to_string()))
            }
            "len" => {
                no_args()?;
                Ok(Value::from(s.chars().count() as i64))
            }
            "contains" => Ok(Value::Bool(s.contains(str_arg(args, name)?))),
            "starts_with" => Ok(Value::Bool(s.starts_with(str_arg(args, name)?))),
            "ends_with" => Ok(Value::Bool(s.ends_with(str_arg(args, name)?))),
            "replace" => match args {
                [Value::String(from), Value::String(to)] => {
                    Ok(Value::String(s.replace(from.as_str(), to)))
                }
                _ => Err(ExprError::Type(
                    "replace() takes two string arguments".into(),
                )),
            },
            _ => Err(ExprError::UnknownMethod {
                method: name.to_string(),
                target: "string",
            }),
        },
        Value::Array(items) => match name {
            "len" => {
                no_args()?;
                Ok(Value::from(items.len() as i64))
            }
            "contains" => match args {
                [needle] => Ok(Value::Bool(items.iter().any(|v| value_eq(v, needle)))),
                _ => Err(ExprError::Type("contains() takes one argument".into())),
            },
            _ => Err(ExprError::UnknownMethod {
                method: name.to_string(),
                target: "array",
            }),
        },
        Value::Object(map) => match name {
            "len" => {
                no_args()?;
                Ok(Value::from(map.len() as i64))
            }
            "has" => match args {
                [Value::String(key)] => Ok(Value::Bool(map.contains_key(key))),
                _ => Err(ExprError::Type("has() takes one string argument".into())),
            },
            _ => Err(ExprError::UnknownMethod {
                method: name.to_string(),
                target: "object",
            }),
        },
        Value::Number(_) => {
            no_args()?;
            let Some(n) = as_num(target) else {
                return Err(ExprError::Type("unsupported number representation".into()));
            };
            match (name, n) {
                ("abs", Num::Int(i)) => i.checked_abs().map(Value::from).ok_or(ExprError::Overflow),
                ("abs", Num::Float(f)) => float_value(f.abs()),
                ("floor", Num::Int(i)) => Ok(Value::from(i)),
                ("floor", Num::Float(f)) => float_value(f.floor()),
                ("ceil", Num::Int(i)) => Ok(Value::from(i)),
                ("ceil", Num::Float(f)) => float_value(f.ceil()),
                ("round", Num::Int(i)) => Ok(Value::from(i)),
                ("round", Num::Float(f)) => float_value(f.round()),
                _ => Err(ExprError::UnknownMethod {
                    method: name.to_string(),
                    target: "number",
                }),
            }
        }
        other => Err(ExprError::UnknownMethod {
            method: name.to_string(),
            target: type_name(other),
        }),
    }
}

/// Evaluate an AST against the bound value `x`.
pub fn eval(ast: &Ast, x: &Value) -> ExprResult<Value> {
    match ast {
        Ast::Literal(v) => Ok(v.clone()),
        Ast::Var => Ok(x.clone()),
        Ast::Unary(UnaryOp::Not, inner) => Ok(Value::Bool(!truthy(&eval(inner, x)?))),
        Ast::Unary(UnaryOp::Neg, inner) => {
            let v = eval(inner, x)?;
            match as_num(&v) {
                Some(Num::Int(i)) => i.checked_neg().map(Value::from).ok_or(ExprError::Overflow),
                Some(Num::Float(f)) => float_value(-f),
                None => Err(ExprError::Type(format!(
                    "cannot negate {}",
                    type_name(&v)
                ))),
            }
        }
        Ast::And(lhs, rhs) => {
            if !truthy(&eval(lhs, x)?) {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(truthy(&eval(rhs, x)?)))
        }
        Ast::Or(lhs, rhs) => {
            if truthy(&eval(lhs, x)?) {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(truthy(&eval(rhs, x)?)))
        }
        Ast::Binary(op, lhs, rhs) => {
            let (a, b) = (eval(lhs, x)?, eval(rhs, x)?);
            match op {
                BinaryOp::Eq => Ok(Value::Bool(value_eq(&a, &b))),
                BinaryOp::Ne => Ok(Value::Bool(!value_eq(&a, &b))),
                BinaryOp::Lt => Ok(Value::Bool(value_cmp(&a, &b)? == Ordering::Less)),
                BinaryOp::Le => Ok(Value::Bool(value_cmp(&a, &b)? != Ordering::Greater)),
                BinaryOp::Gt => Ok(Value::Bool(value_cmp(&a, &b)? == Ordering::Greater)),
                BinaryOp::Ge => Ok(Value::Bool(value_cmp(&a, &b)? != Ordering::Less)),
                _ => arith(*op, &a, &b),
            }
        }
        Ast::Index(target, key) => {
            let (target, key) = (eval(target, x)?, eval(key, x)?);
            index(&target, &key)
        }
        Ast::Field(target, name) => field(&eval(target, x)?, name),
        Ast::Method { target, name, args } => {
            let target = eval(target, x)?;
            let args = args
                .iter()
                .map(|a| eval(a, x))
                .collect::<ExprResult<Vec<_>>>()?;
            call_method(&target, name, &args)
        }
    }
}
