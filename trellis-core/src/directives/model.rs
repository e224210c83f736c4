//! `@model` two-way form-field binding.
//!
//! The attribute value interpolates to the scope key being bound, a flat
//! key in both directions. On install the field's `value` property is
//! seeded from the scope; on every `input` event the field's current value
//! is written back through the composed scope, landing in the innermost
//! frame that declares the key. A key declared nowhere drops the write
//! silently.

use super::DirectiveContext;
use crate::error::Result;
use crate::eval::interpolate;
use crate::value::Value;

pub(super) fn apply(ctx: &DirectiveContext) -> Result<()> {
    let key = interpolate(&ctx.value, &ctx.scope);

    if let Some(current) = ctx.scope.get(&key) {
        ctx.element.set_prop("value", current)?;
    }

    let element = ctx.element.clone();
    let scope = ctx.scope.clone();
    ctx.element.add_listener("input", move |_event| {
        let typed = element.prop("value").unwrap_or(Value::Null);
        scope.set(&key, typed)?;
        Ok(())
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::dom::NodeRef;
    use crate::reactive::observe;
    use crate::value::Value;
    use crate::walker::Walker;

    #[test]
    fn seeds_then_writes_back_on_input() {
        let state = observe(Value::object([("name", Value::from("Ada"))]));
        let input = NodeRef::element("input").with_attr("@model", "name");
        let root = NodeRef::element("form").with_child(input.clone());
        Walker::new(root).data([state.clone()]).walk().unwrap();

        assert_eq!(input.prop("value"), Some(Value::from("Ada")));

        input.set_prop("value", Value::from("Grace")).unwrap();
        input.dispatch("input", Value::Null).unwrap();

        let Value::Object(cell) = state else { unreachable!() };
        assert_eq!(cell.get("name"), Some(Value::from("Grace")));
    }

    #[test]
    fn dotted_binding_is_a_flat_key_both_ways() {
        let state = observe(Value::object([(
            "user",
            Value::object([("name", Value::from("Ada"))]),
        )]));
        let input = NodeRef::element("input").with_attr("@model", "user.name");
        let root = NodeRef::element("form").with_child(input.clone());
        Walker::new(root).data([state.clone()]).walk().unwrap();

        // "user.name" is not a declared key, so neither direction touches
        // the nested field.
        assert_eq!(input.prop("value"), None);

        input.set_prop("value", Value::from("Grace")).unwrap();
        input.dispatch("input", Value::Null).unwrap();

        let Value::Object(cell) = state else { unreachable!() };
        let Some(Value::Object(user)) = cell.get("user") else { unreachable!() };
        assert_eq!(user.get("name"), Some(Value::from("Ada")));
        assert!(!cell.contains("user.name"));
    }

    #[test]
    fn undeclared_key_drops_the_write() {
        let state = observe(Value::object([("other", Value::from(1.0))]));
        let input = NodeRef::element("input").with_attr("@model", "name");
        let root = NodeRef::element("form").with_child(input.clone());
        Walker::new(root).data([state.clone()]).walk().unwrap();

        input.set_prop("value", Value::from("typed")).unwrap();
        input.dispatch("input", Value::Null).unwrap();

        let Value::Object(cell) = state else { unreachable!() };
        assert!(!cell.contains("name"));
    }
}
