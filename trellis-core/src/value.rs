//! Dynamic Values
//!
//! Template state is heterogeneous: numbers next to strings next to nested
//! objects next to element handles next to callable helpers. `Value` is the
//! single dynamic type that flows through root state, scope frames,
//! expression evaluation and directive arguments.
//!
//! # Equality
//!
//! Equality is what gates change notification: primitives compare by value,
//! containers, nodes and functions compare by identity. Writing "the same"
//! object back into a key therefore does not re-run dependents, while
//! writing a structurally equal but distinct object does.
//!
//! # Interop
//!
//! `Value` converts from `serde_json::Value` so callers can assemble root
//! state with `serde_json::json!`. Functions and nodes have no JSON
//! counterpart and convert back as `null`.

use std::fmt;
use std::rc::Rc;

use crate::dom::NodeRef;
use crate::error::Result;
use crate::reactive::{ListCell, ListRef, ObjCell, ObjRef};
use crate::scope::ScopedView;

/// A native function callable from templates.
///
/// Receives the resolved scope as its receiver (the scope plays the role
/// the host object plays in a method call) plus positional arguments.
pub type NativeFn = dyn Fn(&ScopedView, &[Value]) -> Result<Value>;

/// Shared handle to a native function.
pub type FuncRef = Rc<NativeFn>;

/// A dynamically typed value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Object(ObjRef),
    List(ListRef),
    Node(NodeRef),
    Func(FuncRef),
}

impl Value {
    /// Build an object value from key/value pairs.
    pub fn object<K, I>(pairs: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(ObjCell::from_pairs(pairs))
    }

    /// Build a list value from items.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Value {
        Value::List(ListCell::from_items(items))
    }

    /// Wrap a native function.
    pub fn func<F>(f: F) -> Value
    where
        F: Fn(&ScopedView, &[Value]) -> Result<Value> + 'static,
    {
        Value::Func(Rc::new(f))
    }

    /// JavaScript-style truthiness: `null`, `false`, `0`, `NaN` and the
    /// empty string are falsy, everything else is truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Object(_) | Value::List(_) | Value::Node(_) | Value::Func(_) => true,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// String view of the value, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read one property off this value.
    ///
    /// Objects read by key, lists by decimal index (plus `length`), DOM
    /// nodes read their live properties directly, so a node reached through
    /// observed state stays attached to the document while still tracking.
    pub fn get_key(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(cell) => cell.get(key),
            Value::List(cell) => {
                if key == "length" {
                    Some(Value::Num(cell.len() as f64))
                } else {
                    key.parse::<usize>().ok().and_then(|index| cell.get(index))
                }
            }
            Value::Node(node) => node.get_key(key),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Node(a), Value::Node(b)) => a.ptr_eq(b),
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Rendering used by text interpolation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Str(s) => write!(f, "{s}"),
            Value::Object(_) => write!(f, "[object]"),
            Value::List(cell) => {
                let items = cell.items();
                let mut first = true;
                for item in items {
                    if !first {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                    first = false;
                }
                Ok(())
            }
            Value::Node(node) => write!(f, "[node {}]", node.tag()),
            Value::Func(_) => write!(f, "[function]"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Num(n) => write!(f, "Num({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Object(cell) => write!(f, "Object({cell:?})"),
            Value::List(cell) => write!(f, "List({cell:?})"),
            Value::Node(node) => write!(f, "Node(<{}>)", node.tag()),
            Value::Func(_) => write!(f, "Func"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Num(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Num(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NodeRef> for Value {
    fn from(node: NodeRef) -> Self {
        Value::Node(node)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Num(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::list(items.into_iter().map(Value::from))
            }
            serde_json::Value::Object(entries) => {
                Value::object(entries.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

impl Value {
    /// Convert back to JSON. Functions and nodes become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Func(_) | Value::Node(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Num(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(cell) => {
                serde_json::Value::Array(cell.items().iter().map(Value::to_json).collect())
            }
            Value::Object(cell) => {
                let mut map = serde_json::Map::new();
                for key in cell.keys() {
                    if let Some(value) = cell.get(&key) {
                        map.insert(key, value.to_json());
                    }
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primitives_compare_by_value() {
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_eq!(Value::from(2.0), Value::from(2.0));
        assert_ne!(Value::from(2.0), Value::from(3.0));
        assert_ne!(Value::from("a"), Value::Null);
    }

    #[test]
    fn containers_compare_by_identity() {
        let a = Value::object([("x", Value::from(1.0))]);
        let b = Value::object([("x", Value::from(1.0))]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn display_renders_whole_numbers_without_fraction() {
        assert_eq!(Value::from(3.0).to_string(), "3");
        assert_eq!(Value::from(3.5).to_string(), "3.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn display_joins_list_items() {
        let list = Value::list([Value::from("a"), Value::from("b")]);
        assert_eq!(list.to_string(), "a,b");
    }

    #[test]
    fn truthiness_follows_host_conventions() {
        assert!(!Value::Null.truthy());
        assert!(!Value::from(0.0).truthy());
        assert!(!Value::from("").truthy());
        assert!(Value::from("x").truthy());
        assert!(Value::object::<&str, _>([]).truthy());
    }

    #[test]
    fn json_round_trip_preserves_shape_and_order() {
        let value = Value::from(json!({"b": 1, "a": [true, "x", null]}));
        let Value::Object(cell) = &value else {
            panic!("expected object")
        };
        assert_eq!(cell.keys(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(value.to_json(), json!({"b": 1.0, "a": [true, "x", null]}));
    }

    #[test]
    fn get_key_reads_lists_by_index_and_length() {
        let list = Value::list([Value::from("a"), Value::from("b")]);
        assert_eq!(list.get_key("1"), Some(Value::from("b")));
        assert_eq!(list.get_key("length"), Some(Value::from(2.0)));
        assert_eq!(list.get_key("junk"), None);
    }
}
