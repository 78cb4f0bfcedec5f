//! Universal invariants of the combinator algebra.

use stepfx::{
    Action, Bound, ForLoop, Handler, Relay, Sequence, State, StepError, StepMachine, Value,
};
use stepfx_fixtures::{assert_transcript, exchange, str_iter_equals, CountUp};
use stepfx_machine::{drive, run_to_action, Driver};

/// Feed `inputs` one by one and collect every observable action.
fn observed(machine: &dyn StepMachine, inputs: &[Value]) -> Vec<(Action, Value)> {
    let mut state = State::Start;
    let mut out = Vec::new();
    for input in inputs {
        let step = run_to_action(machine, state, input.clone()).expect("machine step failed");
        out.push((step.action, step.args));
        state = step.resume;
    }
    out
}

fn equality_inputs() -> Vec<Value> {
    vec![
        Value::pair("foo", "iter"),
        Value::pair("iter", true),
        Value::pair("iter", "f"),
        Value::pair("iter", true),
        Value::pair("iter", "o"),
        Value::pair("iter", true),
        Value::pair("iter", "o"),
        Value::pair("iter", false),
    ]
}

#[test]
fn pass_through_identity() {
    let bare = str_iter_equals("iter_next", "iter_clone");
    let wrapped = Bound::new(str_iter_equals("iter_next", "iter_clone"))
        .handle("iter_next", Handler::pass_through())
        .handle("iter_clone", Handler::pass_through());
    let inputs = equality_inputs();
    assert_eq!(observed(&bare, &inputs), observed(&wrapped, &inputs));

    // The empty scope is the degenerate case of the same property.
    let empty = Bound::new(str_iter_equals("iter_next", "iter_clone"));
    assert_eq!(observed(&bare, &inputs), observed(&empty, &inputs));
}

#[test]
fn handler_locality() {
    // A handler for a name the machine never raises changes nothing.
    let wrapped = Bound::new(str_iter_equals("iter_next", "iter_clone"))
        .handle("never_raised", Handler::impl_by(Relay::new("elsewhere")));
    let bare = str_iter_equals("iter_next", "iter_clone");
    let inputs = equality_inputs();
    assert_eq!(observed(&bare, &inputs), observed(&wrapped, &inputs));
}

#[test]
fn continue_never_surfaces() {
    let machine = str_iter_equals("iter_next", "iter_clone");
    for (action, _) in observed(&machine, &equality_inputs()) {
        assert_ne!(action, Action::Continue);
    }
}

#[test]
fn identical_runs_are_identical() {
    let inputs = equality_inputs();
    let machine = str_iter_equals("iter_next", "iter_clone");
    let first = observed(&machine, &inputs);
    let second = observed(&machine, &inputs);
    assert_eq!(first, second);
}

#[test]
fn loop_emits_only_its_body_effects() {
    // A body with no effects of its own: the driver must see none at all,
    // across every iteration and the final break.
    let mut surfaced = 0usize;
    let mut observer = |action: &Action, _args: &Value| -> Result<Value, StepError> {
        surfaced += 1;
        Err(StepError::Unhandled(action.name().into()))
    };
    let value = drive(ForLoop::new(CountUp::new(3)), Value::Int(0), &mut observer).unwrap();
    assert_eq!(value, Value::Int(3));
    assert_eq!(surfaced, 0);
}

#[test]
fn sequence_is_associative() {
    let left = Sequence::new(
        Sequence::new(Relay::new("a"), Relay::new("b")),
        Relay::new("c"),
    );
    let right = Sequence::new(
        Relay::new("a"),
        Sequence::new(Relay::new("b"), Relay::new("c")),
    );
    let inputs = vec![
        Value::Int(0),
        Value::Int(1),
        Value::Int(2),
        Value::Int(3),
    ];
    let expected = vec![
        (Action::effect("a"), Value::Int(0)),
        (Action::effect("b"), Value::Int(1)),
        (Action::effect("c"), Value::Int(2)),
        (Action::Result, Value::Int(3)),
    ];
    assert_eq!(observed(&left, &inputs), expected);
    assert_eq!(observed(&right, &inputs), expected);
}

#[test]
fn finished_machines_reject_re_entry() {
    let machine = ForLoop::new(CountUp::new(1));
    let step = run_to_action(&machine, State::Start, Value::Int(1)).unwrap();
    assert_eq!(step.action, Action::Result);
    assert_eq!(
        machine.step(step.resume, Value::Unit),
        Err(StepError::Finished)
    );
}

#[test]
fn step_budget_is_enforced_across_hidden_transitions() {
    // Counting to 3 takes a handful of steps; a budget of two cannot
    // reach the break even though nothing ever surfaces.
    let driver = Driver::new(ForLoop::new(CountUp::new(3))).with_step_limit(2);
    let err = driver
        .drive(Value::Int(0), &mut stepfx_machine::Unattended)
        .unwrap_err();
    assert_eq!(err, StepError::StepLimit(2));
}

#[test]
fn transcripts_and_observers_agree() {
    // The transcript harness and the driver expose the same behaviour:
    // replay the driver's answers as a transcript.
    let machine = Relay::new("ask");
    assert_transcript(
        &machine,
        &[
            exchange(Value::Int(7), Action::effect("ask"), Value::Int(7)),
            exchange(Value::Int(8), Action::Result, Value::Int(8)),
        ],
    );
    let mut echo = |_: &Action, args: &Value| -> Result<Value, StepError> { Ok(args.clone()) };
    let value = drive(Relay::new("ask"), Value::Int(7), &mut echo).unwrap();
    assert_eq!(value, Value::Int(7));
}
