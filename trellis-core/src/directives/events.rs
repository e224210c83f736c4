//! `on<event>` native event wiring.
//!
//! One directive per name in the platform's global event map, resolved
//! lazily from the `on` prefix. The attribute value is a call statement;
//! when the event fires, the handler composes a fresh scope of root state,
//! the node's frames and an event frame (`$event` / `$e` bound to the
//! dispatch payload), then calls the named function if the scope defines
//! one. A missing handler name is skipped silently.

use std::rc::Rc;

use super::{DirectiveContext, DirectiveHandler};
use crate::eval::parse_call;
use crate::scope::compose_scopes;
use crate::value::Value;

/// Every event name in the platform's global event map.
static GLOBAL_EVENTS: &[&str] = &[
    "abort",
    "animationcancel",
    "animationend",
    "animationiteration",
    "animationstart",
    "auxclick",
    "beforeinput",
    "beforetoggle",
    "blur",
    "cancel",
    "canplay",
    "canplaythrough",
    "change",
    "click",
    "close",
    "compositionend",
    "compositionstart",
    "compositionupdate",
    "contextlost",
    "contextmenu",
    "contextrestored",
    "copy",
    "cuechange",
    "cut",
    "dblclick",
    "drag",
    "dragend",
    "dragenter",
    "dragleave",
    "dragover",
    "dragstart",
    "drop",
    "durationchange",
    "emptied",
    "ended",
    "error",
    "focus",
    "focusin",
    "focusout",
    "formdata",
    "gotpointercapture",
    "input",
    "invalid",
    "keydown",
    "keypress",
    "keyup",
    "load",
    "loadeddata",
    "loadedmetadata",
    "loadstart",
    "lostpointercapture",
    "mousedown",
    "mouseenter",
    "mouseleave",
    "mousemove",
    "mouseout",
    "mouseover",
    "mouseup",
    "paste",
    "pause",
    "play",
    "playing",
    "pointercancel",
    "pointerdown",
    "pointerenter",
    "pointerleave",
    "pointermove",
    "pointerout",
    "pointerover",
    "pointerup",
    "progress",
    "ratechange",
    "reset",
    "resize",
    "scroll",
    "scrollend",
    "securitypolicyviolation",
    "seeked",
    "seeking",
    "select",
    "selectionchange",
    "selectstart",
    "slotchange",
    "stalled",
    "submit",
    "suspend",
    "timeupdate",
    "toggle",
    "touchcancel",
    "touchend",
    "touchmove",
    "touchstart",
    "transitioncancel",
    "transitionend",
    "transitionrun",
    "transitionstart",
    "volumechange",
    "waiting",
    "webkitanimationend",
    "webkitanimationiteration",
    "webkitanimationstart",
    "webkittransitionend",
    "wheel",
];

/// Resolve `on<event>` names to a wiring handler; `None` for anything
/// outside the global event map.
pub(super) fn resolve(name: &str) -> Option<DirectiveHandler> {
    let event = name.strip_prefix("on")?;
    if !GLOBAL_EVENTS.contains(&event) {
        return None;
    }
    let event = event.to_string();
    Some(Rc::new(move |ctx: &DirectiveContext| {
        let value = ctx.value.clone();
        let root = ctx.root.clone();
        let scopes = ctx.scopes.clone();
        ctx.element.add_listener(&event, move |payload| {
            let mut frames = root.clone();
            frames.extend(scopes.iter().cloned());
            frames.push(Value::object([
                ("$event", payload.clone()),
                ("$e", payload),
            ]));
            let scope = compose_scopes(frames);
            let (name, args) = parse_call(&value)?;
            scope.call_if_defined(&name, &args)?;
            Ok(())
        });
        Ok(())
    }))
}

#[cfg(test)]
mod tests {
    use crate::dom::NodeRef;
    use crate::reactive::observe;
    use crate::value::Value;
    use crate::walker::Walker;

    fn counter_state() -> Value {
        observe(Value::object([
            ("count", Value::from(0.0)),
            (
                "increment",
                Value::func(|scope, _args| {
                    let current = scope.get("count").and_then(|v| v.as_num()).unwrap_or(0.0);
                    scope.set("count", Value::from(current + 1.0))?;
                    Ok(Value::Null)
                }),
            ),
        ]))
    }

    #[test]
    fn click_runs_the_named_handler_against_the_scope() {
        let state = counter_state();
        let button = NodeRef::element("button").with_attr("@onclick", "increment()");
        let label = NodeRef::element("span").with_attr("@text", "{count}");
        let root = NodeRef::element("div")
            .with_child(button.clone())
            .with_child(label.clone());
        Walker::new(root).data([state]).walk().unwrap();
        assert_eq!(label.text_content(), "0");

        button.dispatch("click", Value::Null).unwrap();
        button.dispatch("click", Value::Null).unwrap();
        assert_eq!(label.text_content(), "2");
    }

    #[test]
    fn event_payload_is_visible_as_event_frame() {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Value::Null));
        let seen_inner = seen.clone();
        let state = observe(Value::object([(
            "grab",
            Value::func(move |scope, _args| {
                *seen_inner.borrow_mut() = scope.get("$event").unwrap_or(Value::Null);
                Ok(Value::Null)
            }),
        )]));

        let field = NodeRef::element("input").with_attr("@onkeydown", "grab()");
        let root = NodeRef::element("div").with_child(field.clone());
        Walker::new(root).data([state]).walk().unwrap();

        field.dispatch("keydown", Value::from("Enter")).unwrap();
        assert_eq!(*seen.borrow(), Value::from("Enter"));
    }

    #[test]
    fn missing_handler_name_is_skipped() {
        let button = NodeRef::element("button").with_attr("@onclick", "ghost()");
        let root = NodeRef::element("div").with_child(button.clone());
        Walker::new(root).walk().unwrap();
        assert!(button.dispatch("click", Value::Null).is_ok());
    }
}
