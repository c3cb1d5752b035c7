//! Primitives on Fn and its metaclass.
//!
//! The `call` family is not here: those signatures are bound with the
//! function-call method kind, and the dispatcher transfers control into
//! the receiver closure by pushing a call frame.

use crate::primitives::common::validate_fn;
use crate::vm::Vm;
use finch_core::Value;

/// `Fn.new(fn)` validates and returns the block unchanged.
pub(crate) fn fn_new(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(_closure) = validate_fn(vm, args[1], "Argument") else {
        return false;
    };
    args[0] = args[1];
    true
}

pub(crate) fn fn_arity(vm: &mut Vm, args: &mut [Value]) -> bool {
    let arity = {
        let closure = vm.heap.get(args[0].as_obj_id()).as_closure();
        vm.heap.get(closure.func).as_fn().arity
    };
    args[0] = Value::from_num(arity as f64);
    true
}

pub(crate) fn fn_to_string(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = vm.new_string("<fn>");
    true
}
