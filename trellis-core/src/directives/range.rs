//! `@range` finite repetition over a template.
//!
//! Value shape is `"N as x"`; `N` interpolates against the scope and must
//! come out numeric, `x` (optional) names a loop variable bound to the
//! iteration index. Each clone also sees `$index` (flattened across nested
//! ranges) and `$range` as `[i, limit]`.
//!
//! Applied to a non-template element this is a silent no-op.

use super::{split_infix, swap_in, DirectiveContext};
use crate::error::Result;
use crate::eval::eval_count;
use crate::scope::Frames;
use crate::value::Value;

pub(super) fn apply(ctx: &DirectiveContext) -> Result<()> {
    if !ctx.element.is_template() {
        return Ok(());
    }
    let (count_src, variable) = split_infix(&ctx.value, "as");
    let template = ctx.element.clone();
    let ctx = ctx.clone();

    ctx.clone().watch(move || {
        let limit_f = eval_count(&count_src, &ctx.scope)?;
        let limit = if limit_f.is_sign_negative() {
            0
        } else {
            limit_f as usize
        };

        // Nested ranges flatten their index through the outer `$range`.
        let outer_start = ctx
            .scope
            .get("$range")
            .and_then(|range| range.get_key("0"))
            .and_then(|start| start.as_num())
            .unwrap_or(0.0);

        let mut produced = Vec::with_capacity(limit);
        for i in 0..limit {
            let Some(clone) = template
                .first_content_element()
                .map(|content| content.clone_subtree())
            else {
                break;
            };

            let mut pairs = vec![
                ("$index".to_string(), Value::from(outer_start * limit_f + i as f64)),
                (
                    "$range".to_string(),
                    Value::list([Value::from(i), Value::from(limit)]),
                ),
            ];
            if let Some(variable) = &variable {
                pairs.push((variable.clone(), Value::from(i)));
            }

            let mut frames: Frames = ctx.scopes.clone();
            frames.push(Value::object(pairs));
            clone.set_scopes(frames);
            clone.set_produced_by(&template);
            produced.push(clone);
        }

        swap_in(&template, produced, &ctx)
    })?;
    Ok(())
}
