//! The payload universe carried between machines.

use core::fmt;
use derive_more::From;
use smol_str::SmolStr;

/// A value on the wire: what machines receive as messages and emit as
/// action payloads.
///
/// Values are immutable. Combinators never mutate a value in place; they
/// build new ones.
#[derive(Debug, Clone, PartialEq, Eq, Default, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// The unit value.
    #[default]
    Unit,
    #[from]
    Bool(bool),
    #[from]
    Int(i64),
    #[from]
    Str(SmolStr),
    #[from]
    Tuple(Vec<Value>),
}

impl Value {
    /// A two-element tuple.
    pub fn pair(first: impl Into<Value>, second: impl Into<Value>) -> Value {
        Value::Tuple(vec![first.into(), second.into()])
    }

    /// A tuple of arbitrary width.
    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Tuple(items.into_iter().collect())
    }

    /// Decode this value as a condition.
    ///
    /// Booleans stand for themselves and integers are true when non-zero.
    /// Anything else has no truth value and the caller should report a bad
    /// message.
    pub fn truthy(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(n) => Some(*n != 0),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Consume a tuple value, yielding its elements.
    pub fn into_tuple(self) -> Option<Vec<Value>> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Consume a two-element tuple, yielding both halves.
    pub fn into_pair(self) -> Option<(Value, Value)> {
        match self {
            Value::Tuple(items) if items.len() == 2 => {
                let mut items = items.into_iter();
                match (items.next(), items.next()) {
                    (Some(first), Some(second)) => Some((first, second)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(SmolStr::new(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(SmolStr::new(s))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{:?}", s.as_str()),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert_eq!(Value::Bool(true).truthy(), Some(true));
        assert_eq!(Value::Int(0).truthy(), Some(false));
        assert_eq!(Value::Int(-3).truthy(), Some(true));
        assert_eq!(Value::from("yes").truthy(), None);
        assert_eq!(Value::Unit.truthy(), None);
    }

    #[test]
    fn pair_round_trip() {
        let v = Value::pair(1i64, "x");
        assert_eq!(
            v.clone().into_pair(),
            Some((Value::Int(1), Value::from("x")))
        );
        assert_eq!(Value::tuple([Value::Int(1)]).into_pair(), None);
        assert_eq!(v.to_string(), "(1, \"x\")");
    }
}
