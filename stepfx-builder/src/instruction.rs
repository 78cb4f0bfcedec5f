//! The instruction set and its compilation.
//!
//! Compilation threads the [`Locals`] environment through the program,
//! rejecting scope and shape violations, and emits ordinary `stepfx`
//! machines: the operand stack rides the message as a tuple, slots
//! bottom to top, and control flow reuses the core combinators. A `Call`
//! splits the stack and smuggles the caller's slots through the callee's
//! suspensions, restoring them when the call resolves.

use crate::error::BuildError;
use crate::locals::{Env, Exits, Locals, Pattern, Shape, Slot};
use smol_str::SmolStr;
use stepfx::{
    boxed, Action, BoxMachine, ForLoop, IfThenElse, Sequence, SingleState, Smuggle, StepError,
    Transformer, Value,
};

/// One instruction over the operand stack.
pub enum Instruction {
    /// Push a literal value.
    Push(Value),
    /// Destructure the top of the stack with a pattern.
    Bind(Pattern),
    /// Push a copy of the named local.
    Copy(SmolStr),
    /// Relocate the named local to the top of the stack, removing the
    /// binding.
    Move(SmolStr),
    /// Remove the named local and its value.
    Drop(SmolStr),
    /// Collapse the top `n` slots into one tuple.
    MakeTuple(usize),
    /// Hand the top of the stack to an external machine; the remaining
    /// locals are preserved across its suspensions and its result is
    /// pushed in their place.
    Call(BoxMachine),
    /// Pop a condition and run one of two branches on the rest.
    IfThenElse(Box<Instruction>, Box<Instruction>),
    /// Run the body until it breaks; the stack is the loop seed.
    ForLoop(Box<Instruction>),
    /// Break out of the nearest enclosing loop with the stack.
    Break,
    /// Restart the nearest enclosing loop with the stack as the new seed.
    Loop,
    /// Run instructions in order, threading the stack through.
    Sequence(Vec<Instruction>),
}

impl Instruction {
    pub fn push(value: impl Into<Value>) -> Instruction {
        Instruction::Push(value.into())
    }

    pub fn bind(pattern: Pattern) -> Instruction {
        Instruction::Bind(pattern)
    }

    pub fn copy(name: impl Into<SmolStr>) -> Instruction {
        Instruction::Copy(name.into())
    }

    pub fn call(machine: impl stepfx::StepMachine + 'static) -> Instruction {
        Instruction::Call(boxed(machine))
    }

    pub fn if_then_else(then: Instruction, els: Instruction) -> Instruction {
        Instruction::IfThenElse(Box::new(then), Box::new(els))
    }

    pub fn for_loop(body: Instruction) -> Instruction {
        Instruction::ForLoop(Box::new(body))
    }

    pub fn sequence(items: impl IntoIterator<Item = Instruction>) -> Instruction {
        Instruction::Sequence(items.into_iter().collect())
    }

    /// Type-check this instruction against the given entry environment
    /// and compile it.
    ///
    /// Returns the environments reached under each exit label and the
    /// compiled machine, whose messages are the operand stack as a
    /// tuple.
    pub fn build(self, locals: Locals) -> Result<(Exits, BoxMachine), BuildError> {
        match self {
            Instruction::Push(value) => {
                let mut locals = locals;
                locals.push(Slot::unnamed(Shape::of(&value)));
                let machine = Transformer::new(move |msg| {
                    let mut stack = stack_values(msg, "push")?;
                    stack.push(value.clone());
                    Ok(Value::Tuple(stack))
                });
                Ok((Exits::result(locals), boxed(machine)))
            }
            Instruction::Bind(pattern) => {
                let mut locals = locals;
                let top = locals.pop().ok_or(BuildError::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;
                bind_slots(&mut locals, top.shape, &pattern)?;
                let machine = Transformer::new(move |msg| {
                    let mut stack = stack_values(msg, "bind")?;
                    let top = stack
                        .pop()
                        .ok_or_else(|| StepError::bad_message("bind", "operand stack is empty"))?;
                    bind_value(&mut stack, top, &pattern)?;
                    Ok(Value::Tuple(stack))
                });
                Ok((Exits::result(locals), boxed(machine)))
            }
            Instruction::Copy(name) => {
                let mut locals = locals;
                let index = locals
                    .position(&name)
                    .ok_or(BuildError::NotInScope(name))?;
                let shape = locals.get(index).map(|slot| slot.shape).unwrap_or(Shape::Unknown);
                locals.push(Slot::unnamed(shape));
                let machine = Transformer::new(move |msg| {
                    let mut stack = stack_values(msg, "copy")?;
                    let value = stack.get(index).cloned().ok_or_else(|| {
                        StepError::bad_message("copy", "stack is shorter than its locals")
                    })?;
                    stack.push(value);
                    Ok(Value::Tuple(stack))
                });
                Ok((Exits::result(locals), boxed(machine)))
            }
            Instruction::Move(name) => {
                let mut locals = locals;
                let index = locals
                    .position(&name)
                    .ok_or(BuildError::NotInScope(name))?;
                let slot = locals.remove(index);
                locals.push(Slot::unnamed(slot.shape));
                let machine = Transformer::new(move |msg| {
                    let mut stack = stack_values(msg, "move")?;
                    if index >= stack.len() {
                        return Err(StepError::bad_message(
                            "move",
                            "stack is shorter than its locals",
                        ));
                    }
                    let value = stack.remove(index);
                    stack.push(value);
                    Ok(Value::Tuple(stack))
                });
                Ok((Exits::result(locals), boxed(machine)))
            }
            Instruction::Drop(name) => {
                let mut locals = locals;
                let index = locals
                    .position(&name)
                    .ok_or(BuildError::NotInScope(name))?;
                locals.remove(index);
                let machine = Transformer::new(move |msg| {
                    let mut stack = stack_values(msg, "drop")?;
                    if index >= stack.len() {
                        return Err(StepError::bad_message(
                            "drop",
                            "stack is shorter than its locals",
                        ));
                    }
                    stack.remove(index);
                    Ok(Value::Tuple(stack))
                });
                Ok((Exits::result(locals), boxed(machine)))
            }
            Instruction::MakeTuple(n) => {
                let mut locals = locals;
                if locals.len() < n {
                    return Err(BuildError::StackUnderflow {
                        needed: n,
                        available: locals.len(),
                    });
                }
                for _ in 0..n {
                    locals.pop();
                }
                locals.push(Slot::unnamed(Shape::Tuple(n)));
                let machine = Transformer::new(move |msg| {
                    let mut stack = stack_values(msg, "make_tuple")?;
                    let at = stack.len().checked_sub(n).ok_or_else(|| {
                        StepError::bad_message("make_tuple", "stack is shorter than its locals")
                    })?;
                    let items = stack.split_off(at);
                    stack.push(Value::Tuple(items));
                    Ok(Value::Tuple(stack))
                });
                Ok((Exits::result(locals), boxed(machine)))
            }
            Instruction::Call(callee) => {
                let mut locals = locals;
                locals.pop().ok_or(BuildError::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;
                locals.push(Slot::unnamed(Shape::Unknown));
                let split = Transformer::new(|msg| {
                    let mut stack = stack_values(msg, "call")?;
                    let argument = stack
                        .pop()
                        .ok_or_else(|| StepError::bad_message("call", "operand stack is empty"))?;
                    Ok(Value::pair(Value::Tuple(stack), argument))
                });
                let rejoin = Transformer::new(|msg| {
                    let (saved, result) = msg.into_pair().ok_or_else(|| {
                        StepError::bad_message("call", "suspension frame went missing")
                    })?;
                    let mut stack = saved.into_tuple().ok_or_else(|| {
                        StepError::bad_message("call", "suspension frame is not a tuple")
                    })?;
                    stack.push(result);
                    Ok(Value::Tuple(stack))
                });
                let machine = Sequence::new(split, Sequence::new(Smuggle::new(callee), rejoin));
                Ok((Exits::result(locals), boxed(machine)))
            }
            Instruction::IfThenElse(then, els) => {
                let mut entry = locals;
                entry.pop().ok_or(BuildError::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;
                let (then_exits, then_machine) = then.build(entry.clone())?;
                let (else_exits, else_machine) = els.build(entry)?;
                let exits = Exits {
                    result: then_exits.result.join(else_exits.result)?,
                    ret: then_exits.ret.join(else_exits.ret)?,
                    brk: then_exits.brk.join(else_exits.brk)?,
                    lop: then_exits.lop.join(else_exits.lop)?,
                };
                let split = Transformer::new(|msg| {
                    let mut stack = stack_values(msg, "if_then_else")?;
                    let cond = stack.pop().ok_or_else(|| {
                        StepError::bad_message("if_then_else", "operand stack is empty")
                    })?;
                    Ok(Value::pair(Value::Tuple(stack), cond))
                });
                let machine = Sequence::new(split, IfThenElse::new(then_machine, else_machine));
                Ok((exits, boxed(machine)))
            }
            Instruction::ForLoop(body) => {
                let entry = locals.clone();
                let (body_exits, body_machine) = body.build(locals)?;
                // Every restart re-enters the body with the stack the
                // `loop` left behind; it must look like the entry stack.
                body_exits.lop.join(Env::Reachable(entry))?;
                let result = body_exits.brk.join(body_exits.result)?;
                let exits = Exits {
                    result,
                    ret: body_exits.ret,
                    brk: Env::Unreachable,
                    lop: Env::Unreachable,
                };
                Ok((exits, boxed(ForLoop::new(body_machine))))
            }
            Instruction::Break => {
                let machine = SingleState::new(|msg| Ok((Action::Break, msg)));
                let exits = Exits {
                    brk: Env::Reachable(locals),
                    ..Exits::none()
                };
                Ok((exits, boxed(machine)))
            }
            Instruction::Loop => {
                let machine = SingleState::new(|msg| Ok((Action::NextLoop, msg)));
                let exits = Exits {
                    lop: Env::Reachable(locals),
                    ..Exits::none()
                };
                Ok((exits, boxed(machine)))
            }
            Instruction::Sequence(items) => {
                if items.is_empty() {
                    return Err(BuildError::EmptySequence);
                }
                let mut env = Env::Reachable(locals);
                let mut ret = Env::Unreachable;
                let mut brk = Env::Unreachable;
                let mut lop = Env::Unreachable;
                let mut machines = Vec::new();
                for item in items {
                    // Instructions after a `break`, `loop` or `return`
                    // are dead: nothing to check them against, nothing to
                    // compile.
                    let current = match core::mem::replace(&mut env, Env::Unreachable) {
                        Env::Reachable(current) => current,
                        Env::Unreachable => break,
                    };
                    let (exits, machine) = item.build(current)?;
                    machines.push(machine);
                    ret = ret.join(exits.ret)?;
                    brk = brk.join(exits.brk)?;
                    lop = lop.join(exits.lop)?;
                    env = exits.result;
                }
                let machine = Sequence::chain(machines).ok_or(BuildError::EmptySequence)?;
                let exits = Exits {
                    result: env,
                    ret,
                    brk,
                    lop,
                };
                Ok((exits, machine))
            }
        }
    }
}

fn stack_values(msg: Value, op: &'static str) -> Result<Vec<Value>, StepError> {
    msg.into_tuple()
        .ok_or_else(|| StepError::bad_message(op, "operand stack is not a tuple"))
}

/// Static half of `Bind`: thread the pattern through the locals.
fn bind_slots(locals: &mut Locals, shape: Shape, pattern: &Pattern) -> Result<(), BuildError> {
    match pattern {
        Pattern::Name(name) => {
            locals.push(Slot::named(name.clone(), shape));
            Ok(())
        }
        Pattern::Literal(_) => Ok(()),
        Pattern::Tuple(patterns) => match shape {
            Shape::Tuple(n) if n != patterns.len() => Err(BuildError::ArityMismatch {
                expected: patterns.len(),
                found: format!("a tuple of {n} elements"),
            }),
            Shape::Scalar => Err(BuildError::ArityMismatch {
                expected: patterns.len(),
                found: "a scalar".into(),
            }),
            _ => {
                for pattern in patterns {
                    bind_slots(locals, Shape::Unknown, pattern)?;
                }
                Ok(())
            }
        },
    }
}

/// Runtime half of `Bind`: destructure a value onto the stack.
fn bind_value(stack: &mut Vec<Value>, value: Value, pattern: &Pattern) -> Result<(), StepError> {
    match pattern {
        Pattern::Name(_) => {
            stack.push(value);
            Ok(())
        }
        Pattern::Literal(expected) => {
            if &value == expected {
                Ok(())
            } else {
                Err(StepError::bad_message(
                    "bind",
                    format!("literal pattern expected {expected}, got {value}"),
                ))
            }
        }
        Pattern::Tuple(patterns) => {
            let items = value.into_tuple().ok_or_else(|| {
                StepError::bad_message("bind", "tuple pattern over a non-tuple value")
            })?;
            if items.len() != patterns.len() {
                return Err(StepError::bad_message(
                    "bind",
                    format!(
                        "tuple pattern of {} elements over a tuple of {}",
                        patterns.len(),
                        items.len()
                    ),
                ));
            }
            for (item, pattern) in items.into_iter().zip(patterns) {
                bind_value(stack, item, pattern)?;
            }
            Ok(())
        }
    }
}
