//! Value transforms applied inside a watched transaction
//!
//! A transform maps the current value (`None` when the key is absent) to the
//! value to write. It runs once per attempt that reaches the read step and
//! must not touch the store itself.

use watchtx_core::Value;

/// Pure function from the current value to the replacement
pub trait Transform {
    /// Compute the value to write
    fn apply(&self, current: Option<&Value>) -> Value;
}

impl<F> Transform for F
where
    F: Fn(Option<&Value>) -> Value,
{
    fn apply(&self, current: Option<&Value>) -> Value {
        self(current)
    }
}

/// Replace the current value with a constant
#[derive(Debug, Clone, PartialEq)]
pub struct Replace(pub Value);

impl Transform for Replace {
    fn apply(&self, _current: Option<&Value>) -> Value {
        self.0.clone()
    }
}

/// Transform that writes `value` regardless of the current value
pub fn replace_with(value: impl Into<Value>) -> Replace {
    Replace(value.into())
}

/// Wrap a closure as a [`Transform`]
///
/// Pins the closure signature so parameter types need no annotation:
///
/// ```
/// use watchtx_concurrency::transform::{from_fn, Transform};
/// use watchtx_core::Value;
///
/// let incr = from_fn(|v| Value::Int(v.and_then(Value::as_int).unwrap_or(0) + 1));
/// assert_eq!(incr.apply(Some(&Value::Int(41))), Value::Int(42));
/// ```
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(Option<&Value>) -> Value,
{
    f
}
