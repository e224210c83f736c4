//! `@if` conditional statement runner.
//!
//! Value shape is `"condition; call()"`. The condition re-evaluates
//! reactively; whenever it holds, the call statement runs against the
//! scope. The statement part is optional, in which case a truthy condition
//! is a no-op (useful purely for its tracked reads).

use super::DirectiveContext;
use crate::error::Result;
use crate::eval::{eval_condition, parse_call};

pub(super) fn apply(ctx: &DirectiveContext) -> Result<()> {
    let (condition, statement) = match ctx.value.split_once(';') {
        Some((cond, stmt)) => (cond.trim().to_string(), Some(stmt.trim().to_string())),
        None => (ctx.value.trim().to_string(), None),
    };
    let scope = ctx.scope.clone();
    ctx.watch(move || {
        if !eval_condition(&condition, &scope)? {
            return Ok(());
        }
        if let Some(statement) = &statement {
            let (name, args) = parse_call(statement)?;
            scope.call(&name, &args)?;
        }
        Ok(())
    })?;
    Ok(())
}
