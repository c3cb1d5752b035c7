//! Shared helpers for the runtime integration tests.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use finch_runtime::{
    Dispatch, FiberState, ObjFn, ObjectId, Text, Value, Vm, VmConfig,
};

pub fn new_vm() -> Vm {
    Vm::new(VmConfig::default()).expect("core bootstrap must succeed")
}

/// A closure over an empty function body, enough for the fiber and Fn
/// primitives, which never execute the body themselves.
pub fn test_closure(vm: &mut Vm, arity: usize) -> ObjectId {
    let module = vm.core_module().expect("core module exists");
    let func = vm.new_function(ObjFn {
        code: Vec::new(),
        constants: Vec::new(),
        module,
        max_slots: 8,
        num_upvalues: 0,
        arity,
        name: Text::from_str("test body"),
    });
    vm.new_closure(func)
}

/// Install a current fiber so primitives have somewhere to record errors
/// and stack effects. Returns its id.
pub fn install_fiber(vm: &mut Vm) -> ObjectId {
    let closure = test_closure(vm, 0);
    let fiber = vm.new_fiber(closure);
    vm.fiber = Some(fiber);
    fiber
}

/// Install a current fiber marked as the root fiber.
pub fn install_root_fiber(vm: &mut Vm) -> ObjectId {
    let fiber = install_fiber(vm);
    vm.heap.get_mut(fiber).as_fiber_mut().state = FiberState::Root;
    fiber
}

pub fn string_text(vm: &Vm, value: Value) -> String {
    assert!(value.is_obj(), "expected a string value, got {value:?}");
    vm.heap
        .get(value.as_obj_id())
        .as_string()
        .to_display_string()
}

pub fn error_text(vm: &Vm) -> String {
    let error = vm.error_value();
    if error.is_null() {
        return String::new();
    }
    string_text(vm, error)
}

pub fn clear_error(vm: &mut Vm) {
    if let Some(fiber) = vm.fiber {
        vm.heap.get_mut(fiber).as_fiber_mut().error = Value::NULL;
    }
}

/// Invoke a method and expect it to complete with a result.
pub fn call(vm: &mut Vm, signature: &str, args: &[Value]) -> Value {
    let mut argv: Vec<Value> = args.to_vec();
    let outcome = vm.invoke(signature, &mut argv);
    assert_eq!(
        outcome,
        Dispatch::Complete,
        "'{signature}' did not complete: {}",
        error_text(vm)
    );
    argv[0]
}

/// Invoke a method and expect it to record an error; returns the message.
pub fn call_error(vm: &mut Vm, signature: &str, args: &[Value]) -> String {
    let mut argv: Vec<Value> = args.to_vec();
    let outcome = vm.invoke(signature, &mut argv);
    assert_ne!(
        outcome,
        Dispatch::Complete,
        "'{signature}' completed but an error was expected"
    );
    let message = error_text(vm);
    clear_error(vm);
    message
}

pub fn num(value: f64) -> Value {
    Value::from_num(value)
}

pub fn assert_num(value: Value, expected: f64) {
    assert!(value.is_num(), "expected a number, got {value:?}");
    let actual = value.as_num();
    assert!(
        actual == expected || (actual.is_nan() && expected.is_nan()),
        "expected {expected}, got {actual}"
    );
}
