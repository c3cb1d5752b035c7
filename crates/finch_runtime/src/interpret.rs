//! The interpreter contract consumed by the core, and the minimal
//! declaration interpreter that runs the embedded bootstrap source.
//!
//! The full compiler and bytecode loop are external collaborators. What
//! lives here is the subset the core itself needs: `interpret` over the
//! line-oriented class-declaration grammar the bootstrap source uses, the
//! frame-push half of function calls, and fiber stack maintenance.

use crate::classes;
use crate::config::ErrorKind;
use crate::errors::messages;
use crate::objects::{CallFrame, ObjUpvalue};
use crate::vm::Vm;
use finch_core::{ObjectId, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpretResult {
    Success,
    CompileError,
    RuntimeError,
}

pub(crate) fn report_error(
    vm: &mut Vm,
    kind: ErrorKind,
    module: Option<&str>,
    line: i32,
    message: &str,
) {
    if let Some(error_fn) = vm.config.error.as_mut() {
        error_fn(kind, module, line, message);
    }
}

/// Compile and run `source` in the named module. Supported grammar:
/// `class Name {}`, `class Name is Super {}`, `//` comments, blank lines.
/// Anything else is a compile error.
pub fn interpret(vm: &mut Vm, module_name: Option<&str>, source: &str) -> InterpretResult {
    let module = vm.ensure_module(module_name);

    for (index, raw_line) in source.lines().enumerate() {
        let line = (index + 1) as i32;
        let text = raw_line.trim();
        if text.is_empty() || text.starts_with("//") {
            continue;
        }

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let (name, super_name) = match tokens.as_slice() {
            ["class", name, "{}"] => (*name, "Object"),
            ["class", name, "is", super_name, "{}"] => (*name, *super_name),
            _ => {
                report_error(
                    vm,
                    ErrorKind::Compile,
                    module_name,
                    line,
                    "Expected a class declaration.",
                );
                return InterpretResult::CompileError;
            }
        };

        let superclass = lookup_variable(vm, module, super_name);
        let Some(superclass) = superclass else {
            let message = format!("Variable '{super_name}' is not defined.");
            report_error(vm, ErrorKind::Runtime, module_name, line, &message);
            return InterpretResult::RuntimeError;
        };

        if let Err(message) = classes::define_class(vm, module, name, superclass) {
            report_error(vm, ErrorKind::Runtime, module_name, line, &message);
            return InterpretResult::RuntimeError;
        }
    }

    InterpretResult::Success
}

/// Resolve a name in `module`, falling back to the core module the way
/// compiled code resolves implicit core references.
fn lookup_variable(vm: &Vm, module: ObjectId, name: &str) -> Option<Value> {
    if let Some(value) = vm.module_variable(module, name) {
        return Some(value);
    }
    let core = vm.core_module()?;
    if core != module {
        return vm.module_variable(core, name);
    }
    None
}

/// Push a call frame for `closure` onto `fiber`. The arguments (including
/// the receiver slot) must already sit on top of the fiber's stack;
/// executing the frame is the interpreter loop's job.
pub fn call_function(vm: &mut Vm, fiber: ObjectId, closure: ObjectId, num_args: usize) {
    let max_slots = {
        let c = vm.heap.get(closure).as_closure();
        vm.heap.get(c.func).as_fn().max_slots
    };
    let f = vm.heap.get_mut(fiber).as_fiber_mut();
    f.stack.reserve(max_slots);
    let stack_start = f.stack.len().saturating_sub(num_args);
    f.frames.push(CallFrame {
        closure,
        ip: 0,
        stack_start,
    });
}

/// Verify a closure receiver can accept `num_args - 1` call arguments,
/// recording an error on the current fiber if not.
pub fn check_arity(vm: &mut Vm, value: Value, num_args: usize) -> bool {
    let arity = {
        let c = vm.heap.get(value.as_obj_id()).as_closure();
        vm.heap.get(c.func).as_fn().arity
    };
    if num_args - 1 >= arity {
        return true;
    }
    vm.fiber_error(messages::FN_ARITY);
    false
}

pub fn has_error(vm: &Vm, fiber: ObjectId) -> bool {
    vm.heap.get(fiber).as_fiber().has_error()
}

/// Close every open upvalue pointing at `fiber` stack slots at or above
/// `above_slot`, moving the captured values into the upvalues themselves.
pub fn close_upvalues(vm: &mut Vm, fiber: ObjectId, above_slot: usize) {
    let upvalue_ids: Vec<ObjectId> = vm.heap.get(fiber).as_fiber().open_upvalues.clone();
    let mut still_open = Vec::with_capacity(upvalue_ids.len());
    for id in upvalue_ids {
        let open_slot = match vm.heap.get(id).as_upvalue() {
            ObjUpvalue::Open { slot, .. } => Some(*slot),
            ObjUpvalue::Closed(_) => None,
        };
        match open_slot {
            Some(slot) if slot >= above_slot => {
                let value = vm.heap.get(fiber).as_fiber().stack[slot];
                *vm.heap.get_mut(id).as_upvalue_mut() = ObjUpvalue::Closed(value);
            }
            _ => still_open.push(id),
        }
    }
    vm.heap.get_mut(fiber).as_fiber_mut().open_upvalues = still_open;
}
