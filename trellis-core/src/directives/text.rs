//! `@text` reactive text-content binding.

use super::DirectiveContext;
use crate::error::Result;
use crate::eval::interpolate;

pub(super) fn apply(ctx: &DirectiveContext) -> Result<()> {
    let element = ctx.element.clone();
    let value = ctx.value.clone();
    let scope = ctx.scope.clone();
    ctx.watch(move || {
        element.set_text_content(&interpolate(&value, &scope));
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::component::ComponentRegistry;
    use crate::directives::DirectiveRegistry;
    use crate::dom::NodeRef;
    use crate::reactive::observe;
    use crate::scope::Frames;
    use crate::value::Value;
    use crate::walker::Walker;

    #[test]
    fn rerenders_on_state_change() {
        let state = observe(Value::object([("name", Value::from("Ada"))]));
        let root = NodeRef::element("div")
            .with_child(NodeRef::element("h1").with_attr("@text", "Hello {name}"));

        Walker::new(root.clone())
            .data([state.clone()])
            .directives(DirectiveRegistry::new())
            .components(ComponentRegistry::new())
            .walk()
            .unwrap();
        assert_eq!(root.text_content(), "Hello Ada");

        let Value::Object(cell) = state else { unreachable!() };
        cell.set("name", Value::from("Grace")).unwrap();
        assert_eq!(root.text_content(), "Hello Grace");
    }

    #[test]
    fn missing_binding_renders_empty() {
        let root =
            NodeRef::element("div").with_child(NodeRef::element("p").with_attr("@text", "{gone}"));
        Walker::new(root.clone())
            .data(Frames::new())
            .walk()
            .unwrap();
        assert_eq!(root.text_content(), "");
    }
}
