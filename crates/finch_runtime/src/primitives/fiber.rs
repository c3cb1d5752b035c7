//! Primitives on Fiber and its metaclass: the call/transfer/try/yield
//! control operations.
//!
//! These never execute fiber bodies themselves. They rearrange the current
//! fiber, caller links, and stack tops, then return false so the
//! interpreter continues on whichever fiber is now current.

use crate::errors::messages;
use crate::objects::FiberState;
use crate::primitives::common::{prim_error, validate_fn};
use crate::vm::Vm;
use finch_core::{ObjectId, Value};

/// Shared entry path for `call`, `transfer`, and `try`. Validates that the
/// target can be entered, moves the resume value into place, and makes the
/// target current. Returns false in every case: on success because a
/// switch is pending, on failure because an error was recorded.
fn run_fiber(
    vm: &mut Vm,
    fiber: ObjectId,
    args: &mut [Value],
    is_call: bool,
    has_value: bool,
    verb: &str,
) -> bool {
    if vm.heap.get(fiber).as_fiber().has_error() {
        return prim_error(vm, format!("Cannot {verb} an aborted fiber."));
    }

    if is_call {
        let (has_caller, state) = {
            let f = vm.heap.get(fiber).as_fiber();
            (f.caller.is_some(), f.state)
        };
        if has_caller {
            return prim_error(vm, messages::FIBER_ALREADY_CALLED);
        }
        if state == FiberState::Root {
            return prim_error(vm, messages::FIBER_ROOT_CALL);
        }
        // Remember who ran us.
        let caller = vm.fiber;
        vm.heap.get_mut(fiber).as_fiber_mut().caller = caller;
    }

    if vm.heap.get(fiber).as_fiber().frames.is_empty() {
        return prim_error(vm, format!("Cannot {verb} a finished fiber."));
    }

    // When the calling fiber resumes, the result of the call lands in its
    // stack. A one-argument call used two slots; drop the extra one now.
    if has_value {
        if let Some(current) = vm.fiber {
            vm.heap.get_mut(current).as_fiber_mut().stack.pop();
        }
    }

    let value = if has_value { args[1] } else { Value::NULL };
    let starting = {
        let f = vm.heap.get(fiber).as_fiber();
        f.frames.len() == 1 && f.frames[0].ip == 0 && f.stack.len() == 1
    };
    if starting {
        // First entry: bind the parameter if the fiber's function takes one.
        let arity = {
            let closure = vm.heap.get(fiber).as_fiber().frames[0].closure;
            let func = vm.heap.get(closure).as_closure().func;
            vm.heap.get(func).as_fn().arity
        };
        if arity == 1 {
            vm.heap.get_mut(fiber).as_fiber_mut().stack.push(value);
        }
    } else {
        // Resume: the value becomes the result of the yield or transfer
        // that suspended this fiber.
        let f = vm.heap.get_mut(fiber).as_fiber_mut();
        if let Some(top) = f.stack.last_mut() {
            *top = value;
        }
    }

    vm.fiber = Some(fiber);
    false
}

// ---- metaclass ----

pub(crate) fn fiber_new(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(closure) = validate_fn(vm, args[1], "Argument") else {
        return false;
    };
    let arity = {
        let func = vm.heap.get(closure).as_closure().func;
        vm.heap.get(func).as_fn().arity
    };
    if arity > 1 {
        return prim_error(vm, messages::FIBER_ONE_PARAM);
    }
    args[0] = Value::obj(vm.new_fiber(closure));
    true
}

/// Store the error on the current fiber. An explicitly null argument is
/// not an abort, so only then does the primitive complete normally.
pub(crate) fn fiber_abort(vm: &mut Vm, args: &mut [Value]) -> bool {
    if let Some(current) = vm.fiber {
        vm.heap.get_mut(current).as_fiber_mut().error = args[1];
    }
    args[1].is_null()
}

pub(crate) fn fiber_current(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = match vm.fiber {
        Some(fiber) => Value::obj(fiber),
        None => Value::NULL,
    };
    true
}

/// Relinquish control entirely: the VM has no runnable fiber until the
/// host resumes one.
pub(crate) fn fiber_suspend(vm: &mut Vm, _args: &mut [Value]) -> bool {
    vm.fiber = None;
    false
}

pub(crate) fn fiber_yield(vm: &mut Vm, _args: &mut [Value]) -> bool {
    yield_value(vm, Value::NULL, false);
    false
}

pub(crate) fn fiber_yield1(vm: &mut Vm, args: &mut [Value]) -> bool {
    yield_value(vm, args[1], true);
    false
}

fn yield_value(vm: &mut Vm, value: Value, has_value: bool) {
    let Some(current) = vm.fiber else {
        return;
    };
    let caller = {
        let f = vm.heap.get_mut(current).as_fiber_mut();
        let caller = f.caller.take();
        f.state = FiberState::Other;
        caller
    };
    vm.fiber = caller;

    if let Some(caller) = caller {
        // Make the yielded value the result of the caller's call.
        let f = vm.heap.get_mut(caller).as_fiber_mut();
        f.state = FiberState::Other;
        if let Some(top) = f.stack.last_mut() {
            *top = value;
        }
        if has_value {
            // Fiber.yield(value) used two slots on the yielding fiber; only
            // one is needed for the result it sees when resumed.
            vm.heap.get_mut(current).as_fiber_mut().stack.pop();
        }
    }
}

// ---- instance ----

pub(crate) fn fiber_call(vm: &mut Vm, args: &mut [Value]) -> bool {
    let fiber = args[0].as_obj_id();
    run_fiber(vm, fiber, args, true, false, "call")
}

pub(crate) fn fiber_call1(vm: &mut Vm, args: &mut [Value]) -> bool {
    let fiber = args[0].as_obj_id();
    run_fiber(vm, fiber, args, true, true, "call")
}

pub(crate) fn fiber_transfer(vm: &mut Vm, args: &mut [Value]) -> bool {
    let fiber = args[0].as_obj_id();
    run_fiber(vm, fiber, args, false, false, "transfer to")
}

pub(crate) fn fiber_transfer1(vm: &mut Vm, args: &mut [Value]) -> bool {
    let fiber = args[0].as_obj_id();
    run_fiber(vm, fiber, args, false, true, "transfer to")
}

/// Transfer, then poison the target so it unwinds when it resumes.
pub(crate) fn fiber_transfer_error(vm: &mut Vm, args: &mut [Value]) -> bool {
    let fiber = args[0].as_obj_id();
    run_fiber(vm, fiber, args, false, true, "transfer to");
    if let Some(current) = vm.fiber {
        vm.heap.get_mut(current).as_fiber_mut().error = args[1];
    }
    false
}

pub(crate) fn fiber_try(vm: &mut Vm, args: &mut [Value]) -> bool {
    let fiber = args[0].as_obj_id();
    let result = run_fiber(vm, fiber, args, true, false, "try");
    finish_try(vm, result)
}

pub(crate) fn fiber_try1(vm: &mut Vm, args: &mut [Value]) -> bool {
    let fiber = args[0].as_obj_id();
    let result = run_fiber(vm, fiber, args, true, true, "try");
    finish_try(vm, result)
}

fn finish_try(vm: &mut Vm, result: bool) -> bool {
    // If the entry succeeded, the target is now current; mark it so a
    // runtime error is caught and returned to the caller.
    if !result && !vm.has_error() {
        if let Some(current) = vm.fiber {
            vm.heap.get_mut(current).as_fiber_mut().state = FiberState::Try;
        }
    }
    result
}

pub(crate) fn fiber_error(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = vm.heap.get(args[0].as_obj_id()).as_fiber().error;
    true
}

pub(crate) fn fiber_is_done(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_bool(vm.heap.get(args[0].as_obj_id()).as_fiber().is_done());
    true
}
