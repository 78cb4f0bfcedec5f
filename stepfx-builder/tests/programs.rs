//! Compiled programs, end to end.

use stepfx::{Action, Relay, StepError, Transformer, Value};
use stepfx_builder::{compile, Instruction, Pattern};
use stepfx_machine::{drive, Unattended};

fn empty_stack() -> Value {
    Value::Tuple(Vec::new())
}

fn int_arg(machine: &'static str, msg: Value) -> Result<i64, StepError> {
    msg.as_int()
        .ok_or_else(|| StepError::bad_message(machine, "expected an integer"))
}

#[test]
fn push_bind_copy_make_tuple() {
    let program = Instruction::sequence([
        Instruction::push(1i64),
        Instruction::bind(Pattern::name("x")),
        Instruction::push(2i64),
        Instruction::copy("x"),
        Instruction::MakeTuple(2),
    ]);
    let (_, machine) = compile(program).unwrap();
    let value = drive(machine, empty_stack(), &mut Unattended).unwrap();
    assert_eq!(
        value,
        Value::tuple([
            Value::Int(1),
            Value::tuple([Value::Int(2), Value::Int(1)])
        ])
    );
}

#[test]
fn tuple_patterns_destructure_onto_the_stack() {
    let program = Instruction::sequence([
        Instruction::push(Value::tuple([Value::Int(7), Value::from("seven")])),
        Instruction::bind(Pattern::tuple([Pattern::name("n"), Pattern::name("s")])),
        Instruction::copy("n"),
        Instruction::MakeTuple(3),
    ]);
    let (_, machine) = compile(program).unwrap();
    let value = drive(machine, empty_stack(), &mut Unattended).unwrap();
    assert_eq!(
        value,
        Value::tuple([Value::tuple([
            Value::Int(7),
            Value::from("seven"),
            Value::Int(7)
        ])])
    );
}

#[test]
fn literal_patterns_check_and_consume() {
    let program = Instruction::sequence([
        Instruction::push(Value::pair("tag", 9i64)),
        Instruction::bind(Pattern::tuple([
            Pattern::literal("tag"),
            Pattern::name("payload"),
        ])),
    ]);
    let (_, machine) = compile(program).unwrap();
    let value = drive(machine, empty_stack(), &mut Unattended).unwrap();
    assert_eq!(value, Value::tuple([Value::Int(9)]));

    // The same program over the wrong tag fails at the bind, not before.
    let program = Instruction::sequence([
        Instruction::push(Value::pair("other", 9i64)),
        Instruction::bind(Pattern::tuple([
            Pattern::literal("tag"),
            Pattern::name("payload"),
        ])),
    ]);
    let (_, machine) = compile(program).unwrap();
    let err = drive(machine, empty_stack(), &mut Unattended).unwrap_err();
    assert!(matches!(err, StepError::BadMessage { .. }));
}

#[test]
fn branches_run_on_the_remaining_stack() {
    let branchy = |cond: bool| {
        Instruction::sequence([
            Instruction::push(1i64),
            Instruction::push(cond),
            Instruction::if_then_else(Instruction::push(10i64), Instruction::push(20i64)),
            Instruction::MakeTuple(2),
        ])
    };
    let (_, machine) = compile(branchy(true)).unwrap();
    let value = drive(machine, empty_stack(), &mut Unattended).unwrap();
    assert_eq!(
        value,
        Value::tuple([Value::tuple([Value::Int(1), Value::Int(10)])])
    );

    let (_, machine) = compile(branchy(false)).unwrap();
    let value = drive(machine, empty_stack(), &mut Unattended).unwrap();
    assert_eq!(
        value,
        Value::tuple([Value::tuple([Value::Int(1), Value::Int(20)])])
    );
}

#[test]
fn a_counting_loop_in_builder_form() {
    let is_below_three = || Transformer::new(|msg| Ok(Value::Bool(int_arg("is_below", msg)? < 3)));
    let increment = || Transformer::new(|msg| Ok(Value::Int(int_arg("increment", msg)? + 1)));

    let body = Instruction::sequence([
        Instruction::bind(Pattern::name("n")),
        Instruction::copy("n"),
        Instruction::call(is_below_three()),
        Instruction::if_then_else(
            Instruction::sequence([Instruction::call(increment()), Instruction::Loop]),
            Instruction::Break,
        ),
    ]);
    let program = Instruction::sequence([Instruction::push(0i64), Instruction::for_loop(body)]);
    let (_, machine) = compile(program).unwrap();
    let value = drive(machine, empty_stack(), &mut Unattended).unwrap();
    assert_eq!(value, Value::tuple([Value::Int(3)]));
}

#[test]
fn call_preserves_locals_across_the_suspension() {
    let program = Instruction::sequence([
        Instruction::push("keep"),
        Instruction::bind(Pattern::name("k")),
        Instruction::push(5i64),
        Instruction::call(Relay::new("ask")),
        Instruction::bind(Pattern::name("reply")),
        Instruction::copy("k"),
        Instruction::MakeTuple(2),
    ]);
    let (_, machine) = compile(program).unwrap();

    let mut seen = Vec::new();
    let mut observer = |action: &Action, args: &Value| -> Result<Value, StepError> {
        seen.push((action.clone(), args.clone()));
        Ok(Value::Int(100))
    };
    let value = drive(machine, empty_stack(), &mut observer).unwrap();
    // The effect carried exactly the popped argument...
    assert_eq!(seen, vec![(Action::effect("ask"), Value::Int(5))]);
    // ...and the binding made before the call survived the suspension.
    assert_eq!(
        value,
        Value::tuple([
            Value::from("keep"),
            Value::tuple([Value::Int(100), Value::from("keep")])
        ])
    );
}

#[test]
fn drop_removes_the_slot_and_its_value() {
    let program = Instruction::sequence([
        Instruction::push(1i64),
        Instruction::bind(Pattern::name("x")),
        Instruction::push(2i64),
        Instruction::Drop("x".into()),
    ]);
    let (_, machine) = compile(program).unwrap();
    let value = drive(machine, empty_stack(), &mut Unattended).unwrap();
    assert_eq!(value, Value::tuple([Value::Int(2)]));
}

#[test]
fn move_relocates_to_the_top() {
    let program = Instruction::sequence([
        Instruction::push(1i64),
        Instruction::bind(Pattern::name("x")),
        Instruction::push(2i64),
        Instruction::Move("x".into()),
        Instruction::MakeTuple(2),
    ]);
    let (_, machine) = compile(program).unwrap();
    let value = drive(machine, empty_stack(), &mut Unattended).unwrap();
    assert_eq!(
        value,
        Value::tuple([Value::tuple([Value::Int(2), Value::Int(1)])])
    );
}

#[test]
fn accepted_programs_never_fault_in_the_machines_they_compiled() {
    // Loop + branch + call + destructuring in one program: every state
    // the compiled machines reach was anticipated at composition.
    let pack = || {
        Transformer::new(|msg| {
            let n = int_arg("pack", msg)?;
            Ok(Value::pair(n, n < 2))
        })
    };
    let body = Instruction::sequence([
        Instruction::call(pack()),
        Instruction::bind(Pattern::tuple([Pattern::name("n"), Pattern::name("go")])),
        Instruction::Move("go".into()),
        Instruction::if_then_else(
            Instruction::sequence([
                Instruction::call(Transformer::new(|msg| {
                    Ok(Value::Int(int_arg("bump", msg)? + 1))
                })),
                Instruction::Loop,
            ]),
            Instruction::Break,
        ),
    ]);
    let program = Instruction::sequence([Instruction::push(0i64), Instruction::for_loop(body)]);
    let (_, machine) = compile(program).unwrap();
    let value = drive(machine, empty_stack(), &mut Unattended).unwrap();
    assert_eq!(value, Value::tuple([Value::Int(2)]));
}
