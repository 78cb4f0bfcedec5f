//! The static model of the operand stack.
//!
//! `Locals` mirrors the runtime stack slot for slot: an ordered sequence
//! of optionally named slots, bottom to top, each carrying what is
//! statically known about the value's shape. `Env` adds the
//! `Unreachable` mark used after `Break`, `Loop` and `Return`, which is
//! compatible with anything and absorbed at joins.

use crate::error::BuildError;
use smol_str::SmolStr;
use stepfx::Value;

/// A destructuring pattern for `Bind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Bind the value under a name.
    Name(SmolStr),
    /// Consume the value, requiring it to equal the literal.
    Literal(Value),
    /// Destructure a tuple, binding each element by its sub-pattern.
    Tuple(Vec<Pattern>),
}

impl Pattern {
    pub fn name(name: impl Into<SmolStr>) -> Pattern {
        Pattern::Name(name.into())
    }

    pub fn literal(value: impl Into<Value>) -> Pattern {
        Pattern::Literal(value.into())
    }

    pub fn tuple(patterns: impl IntoIterator<Item = Pattern>) -> Pattern {
        Pattern::Tuple(patterns.into_iter().collect())
    }
}

/// What is statically known about a slot's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Unknown,
    Scalar,
    Tuple(usize),
}

impl Shape {
    /// The shape of a literal value.
    pub fn of(value: &Value) -> Shape {
        match value {
            Value::Tuple(items) => Shape::Tuple(items.len()),
            _ => Shape::Scalar,
        }
    }

    fn merge(self, other: Shape) -> Shape {
        if self == other {
            self
        } else {
            Shape::Unknown
        }
    }
}

/// One stack slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: Option<SmolStr>,
    pub shape: Shape,
}

impl Slot {
    pub fn unnamed(shape: Shape) -> Slot {
        Slot { name: None, shape }
    }

    pub fn named(name: impl Into<SmolStr>, shape: Shape) -> Slot {
        Slot {
            name: Some(name.into()),
            shape,
        }
    }
}

/// The ordered slots of the operand stack, bottom to top.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Locals {
    slots: Vec<Slot>,
}

impl Locals {
    pub fn new() -> Locals {
        Locals::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn push(&mut self, slot: Slot) {
        self.slots.push(slot);
    }

    pub fn pop(&mut self) -> Option<Slot> {
        self.slots.pop()
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Slot {
        self.slots.remove(index)
    }

    /// Bottom-based index of the innermost binding of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .rposition(|slot| slot.name.as_deref() == Some(name))
    }

    /// The environment two joining paths agree on.
    ///
    /// Slot count and names must match exactly; shapes that disagree
    /// merge to `Unknown`.
    pub fn merge(&self, other: &Locals) -> Result<Locals, BuildError> {
        if self.len() != other.len() {
            return Err(self.disagreement(other));
        }
        let slots = self
            .slots
            .iter()
            .zip(&other.slots)
            .map(|(a, b)| {
                if a.name != b.name {
                    Err(self.disagreement(other))
                } else {
                    Ok(Slot {
                        name: a.name.clone(),
                        shape: a.shape.merge(b.shape),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Locals { slots })
    }

    fn disagreement(&self, other: &Locals) -> BuildError {
        BuildError::IncompatibleLocals(format!("{:?} vs {:?}", self.slots, other.slots))
    }
}

/// A locals environment that may be unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Env {
    Reachable(Locals),
    Unreachable,
}

impl Env {
    /// Join two control-flow paths. `Unreachable` is absorbed; two
    /// reachable environments must agree.
    pub fn join(self, other: Env) -> Result<Env, BuildError> {
        match (self, other) {
            (Env::Unreachable, env) | (env, Env::Unreachable) => Ok(env),
            (Env::Reachable(a), Env::Reachable(b)) => Ok(Env::Reachable(a.merge(&b)?)),
        }
    }
}

/// The locals environments a compiled instruction reaches under each of
/// its exit labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exits {
    /// Normal completion.
    pub result: Env,
    /// An early `return` escaping the enclosing sequence.
    pub ret: Env,
    /// A `break` consumed by the nearest enclosing loop.
    pub brk: Env,
    /// A `loop` restart consumed by the nearest enclosing loop.
    pub lop: Env,
}

impl Exits {
    /// Normal completion only.
    pub fn result(locals: Locals) -> Exits {
        Exits {
            result: Env::Reachable(locals),
            ret: Env::Unreachable,
            brk: Env::Unreachable,
            lop: Env::Unreachable,
        }
    }

    /// No exit reachable at all.
    pub fn none() -> Exits {
        Exits {
            result: Env::Unreachable,
            ret: Env::Unreachable,
            brk: Env::Unreachable,
            lop: Env::Unreachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_binding_wins() {
        let mut locals = Locals::new();
        locals.push(Slot::named("x", Shape::Scalar));
        locals.push(Slot::named("y", Shape::Scalar));
        locals.push(Slot::named("x", Shape::Tuple(2)));
        assert_eq!(locals.position("x"), Some(2));
        assert_eq!(locals.position("y"), Some(1));
        assert_eq!(locals.position("z"), None);
    }

    #[test]
    fn join_absorbs_unreachable() {
        let mut locals = Locals::new();
        locals.push(Slot::named("x", Shape::Scalar));
        let env = Env::Reachable(locals.clone());
        assert_eq!(env.clone().join(Env::Unreachable).unwrap(), env);

        let mut other = Locals::new();
        other.push(Slot::named("x", Shape::Tuple(3)));
        let joined = env.join(Env::Reachable(other)).unwrap();
        match joined {
            Env::Reachable(merged) => assert_eq!(merged.get(0).unwrap().shape, Shape::Unknown),
            Env::Unreachable => panic!("join lost reachability"),
        }
    }

    #[test]
    fn join_rejects_disagreeing_names() {
        let mut a = Locals::new();
        a.push(Slot::named("x", Shape::Scalar));
        let mut b = Locals::new();
        b.push(Slot::named("y", Shape::Scalar));
        assert!(matches!(
            Env::Reachable(a).join(Env::Reachable(b)),
            Err(BuildError::IncompatibleLocals(_))
        ));
    }
}
