//! `@component` sub-component mount point.
//!
//! The attribute value interpolates to a component name, resolved through
//! the merged component registry. Interpolation happens inside the watch,
//! so a name bound to state swaps the mounted component when it changes.
//!
//! Mount protocol: instantiate, walk the component's root with the caller's
//! chain plus the component's private state as the innermost frame, graft
//! the host element's pre-existing children into the component's `<slot>`,
//! then replace the host's children with the component root. The grafted
//! children are remembered, so a swap carries them out of the old component
//! and into the replacement's slot.

use super::DirectiveContext;
use crate::dom::NodeRef;
use crate::error::{EngineError, Result};
use crate::eval::interpolate;
use crate::reactive::observe;
use crate::walker::Walker;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub(super) fn apply(ctx: &DirectiveContext) -> Result<()> {
    let ctx = ctx.clone();
    let mounted = Rc::new(Cell::new(false));
    // The host's original children, grafted into whichever component is
    // currently mounted and carried along on swaps.
    let slotted: Rc<RefCell<Vec<NodeRef>>> = Rc::new(RefCell::new(Vec::new()));

    ctx.clone().watch(move || {
        let name = interpolate(&ctx.value, &ctx.scope);
        let factory = ctx
            .components
            .get(&name)
            .ok_or_else(|| EngineError::UnknownComponent(ctx.value.clone()))?;
        let component = factory()?;
        let root = component
            .root()
            .ok_or_else(|| EngineError::ComponentRoot(ctx.value.clone()))?;

        let mut data = ctx.root.clone();
        data.extend(ctx.scopes.iter().cloned());
        data.push(observe(component.state()));

        Walker::new(root.clone())
            .data(data)
            .directives(ctx.directives.merged(&component.directives()))
            .components(ctx.components.merged(&component.components()))
            .walk()?;

        if !mounted.get() {
            *slotted.borrow_mut() = ctx.element.take_children();
        }
        if let Some(slot) = root.query("slot") {
            let grafted: Vec<NodeRef> = slotted.borrow().clone();
            slot.replace_with(grafted);
        }
        ctx.element.replace_children([root]);
        mounted.set(true);
        Ok(())
    })?;
    Ok(())
}
