//! `@for` collection iteration over a template.
//!
//! Value shape is `"item in collection"`, where the collection is either a
//! scope path (tracked, so mutations re-run the loop) or an inline object or
//! list literal. Each clone sees `$key` (object key or list index) and the
//! named loop variable bound to the entry's value.
//!
//! Applied to a non-template element this is a silent no-op.

use super::{split_infix, swap_in, DirectiveContext};
use crate::error::{EngineError, Result};
use crate::eval::eval_collection;
use crate::scope::Frames;
use crate::value::Value;

pub(super) fn apply(ctx: &DirectiveContext) -> Result<()> {
    if !ctx.element.is_template() {
        return Ok(());
    }
    let (variable, collection_src) = split_infix(&ctx.value, "in");
    let Some(collection_src) = collection_src else {
        return Err(EngineError::Parse {
            at: 0,
            message: format!("'for' expects 'item in collection', got '{}'", ctx.value),
        });
    };
    let template = ctx.element.clone();
    let ctx = ctx.clone();

    ctx.clone().watch(move || {
        let collection = eval_collection(&collection_src, &ctx.scope)?;
        let entries: Vec<(Value, Value)> = match &collection {
            Value::Object(cell) => cell
                .keys()
                .into_iter()
                .filter_map(|key| {
                    cell.get(&key)
                        .map(|value| (Value::Str(key.clone()), value))
                })
                .collect(),
            Value::List(cell) => cell
                .items()
                .into_iter()
                .enumerate()
                .map(|(index, item)| (Value::from(index), item))
                .collect(),
            _ => Vec::new(),
        };

        let mut produced = Vec::with_capacity(entries.len());
        for (key, item) in entries {
            let Some(clone) = template
                .first_content_element()
                .map(|content| content.clone_subtree())
            else {
                break;
            };

            let data = Value::object([
                ("$key".to_string(), key),
                (variable.clone(), item),
            ]);
            let mut frames: Frames = ctx.scopes.clone();
            frames.push(data);
            clone.set_scopes(frames);
            clone.set_produced_by(&template);
            produced.push(clone);
        }

        swap_in(&template, produced, &ctx)
    })?;
    Ok(())
}
