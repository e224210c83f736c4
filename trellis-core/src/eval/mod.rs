//! Expression Evaluator
//!
//! The textual micro-language of attribute values, implemented as a small,
//! explicitly scoped interpreter (tokenize → parse → evaluate against a
//! provided scope) rather than any host-language dynamic evaluation.
//!
//! Directives, not the walker, invoke this module. Its surface is the
//! collaborator contract: `{identifier.path}` interpolation, binary
//! boolean/comparison conditions, `name(arg, ...)` call statements, and
//! JSON5-flavored literals for `@data` objects and call arguments.
//!
//! Reads performed here go through the scope chain, so they are tracked
//! like any other observed-cell read: an interpolation inside a `watch`
//! subscribes the computation to every path it resolves.

mod lexer;
mod literal;

pub use literal::{parse_call, parse_literal};

use crate::error::{EngineError, Result};
use crate::scope::ScopedView;
use crate::value::Value;

/// Replace every `{path.to.key}` placeholder with the resolved value's
/// rendering. Paths that resolve nowhere render as the empty string;
/// brace runs that are not plain dotted paths are left untouched.
pub fn interpolate(text: &str, scope: &ScopedView) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_path(&after[..close]) => {
                let path = &after[..close];
                if let Some(value) = scope.get_path(path) {
                    out.push_str(&value.to_string());
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Whether `s` is a bare dotted path: `ident(.segment)*`.
pub fn is_path(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut first_of_segment = true;
    for c in s.chars() {
        if first_of_segment {
            if !(c.is_ascii_alphanumeric() || c == '_' || c == '$') {
                return false;
            }
            first_of_segment = false;
        } else if c == '.' {
            first_of_segment = true;
        } else if !(c.is_ascii_alphanumeric() || c == '_' || c == '$') {
            return false;
        }
    }
    // A trailing dot leaves a segment open.
    !first_of_segment
}

/// Evaluate one condition operand: interpolate against the scope, then
/// parse as a literal; a bare dotted path falls back to scope resolution,
/// where an unresolved path is `null` (optional bindings are expected).
fn operand(src: &str, scope: &ScopedView) -> Result<Value> {
    let rendered = interpolate(src, scope);
    match parse_literal(&rendered) {
        Ok(value) => Ok(value),
        Err(parse_err) => {
            if is_path(src) {
                Ok(scope.get_path(src).unwrap_or(Value::Null))
            } else {
                Err(parse_err)
            }
        }
    }
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Num(x), Value::Num(y)) => x.partial_cmp(y),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Evaluate a condition: either a single truthiness operand or a binary
/// `a op b` with `op` in `> < = == >= <= != && ||`.
pub fn eval_condition(src: &str, scope: &ScopedView) -> Result<bool> {
    let parts: Vec<&str> = src.split_whitespace().collect();
    match parts.as_slice() {
        [] => Ok(false),
        [single] => Ok(operand(single, scope)?.truthy()),
        [lhs, op, rhs] => {
            let a = operand(lhs, scope)?;
            let b = operand(rhs, scope)?;
            let result = match *op {
                ">" => compare(&a, &b) == Some(std::cmp::Ordering::Greater),
                "<" => compare(&a, &b) == Some(std::cmp::Ordering::Less),
                ">=" => matches!(
                    compare(&a, &b),
                    Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
                ),
                "<=" => matches!(
                    compare(&a, &b),
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                ),
                "=" | "==" => a == b,
                "!=" => a != b,
                "&&" => a.truthy() && b.truthy(),
                "||" => a.truthy() || b.truthy(),
                other => return Err(EngineError::UnknownOperator(other.to_string())),
            };
            Ok(result)
        }
        _ => Err(EngineError::Parse {
            at: 0,
            message: format!("malformed condition '{src}'"),
        }),
    }
}

/// Evaluate a collection expression for iteration: a bare dotted path
/// resolves through the scope (tracked), anything else is interpolated
/// and parsed as a literal.
pub fn eval_collection(src: &str, scope: &ScopedView) -> Result<Value> {
    let trimmed = src.trim();
    if is_path(trimmed) {
        return Ok(scope.get_path(trimmed).unwrap_or(Value::Null));
    }
    let rendered = interpolate(trimmed, scope);
    parse_literal(&rendered)
}

/// Evaluate a repetition count. Anything that does not come out numeric is
/// an error carrying the original source text.
pub fn eval_count(src: &str, scope: &ScopedView) -> Result<f64> {
    let rendered = interpolate(src.trim(), scope);
    match parse_literal(&rendered) {
        Ok(Value::Num(n)) if !n.is_nan() => Ok(n),
        _ => Err(EngineError::NotANumber(src.trim().to_string())),
    }
}
