//! Validators and conversions shared by the primitives.
//!
//! The validators record an error on the current fiber and return `None`
//! when the argument is unacceptable, so primitive bodies read as a chain
//! of `let Some(x) = ... else { return false }` steps.

use crate::errors::messages;
use crate::objects::MapKey;
use crate::vm::Vm;
use finch_core::Value;
use std::rc::Rc;

/// Record `message` on the current fiber and signal failure.
pub(crate) fn prim_error(vm: &mut Vm, message: impl Into<String>) -> bool {
    vm.fiber_error(message);
    false
}

pub(crate) fn validate_num(vm: &mut Vm, arg: Value, arg_name: &str) -> Option<f64> {
    if arg.is_num() {
        return Some(arg.as_num());
    }
    vm.fiber_error(format!("{arg_name} must be a number."));
    None
}

pub(crate) fn validate_int_value(vm: &mut Vm, value: f64, arg_name: &str) -> Option<f64> {
    if value.trunc() == value {
        return Some(value);
    }
    vm.fiber_error(format!("{arg_name} must be an integer."));
    None
}

pub(crate) fn validate_int(vm: &mut Vm, arg: Value, arg_name: &str) -> Option<f64> {
    let value = validate_num(vm, arg, arg_name)?;
    validate_int_value(vm, value, arg_name)
}

/// Validate an index into a sequence of `count` elements. Negative indices
/// count back from the end.
pub(crate) fn validate_index_value(
    vm: &mut Vm,
    count: usize,
    value: f64,
    arg_name: &str,
) -> Option<usize> {
    let mut value = validate_int_value(vm, value, arg_name)?;
    if value < 0.0 {
        value += count as f64;
    }
    if value >= 0.0 && value < count as f64 {
        return Some(value as usize);
    }
    vm.fiber_error(format!("{arg_name} out of bounds."));
    None
}

pub(crate) fn validate_index(
    vm: &mut Vm,
    arg: Value,
    count: usize,
    arg_name: &str,
) -> Option<usize> {
    let value = validate_num(vm, arg, arg_name)?;
    validate_index_value(vm, count, value, arg_name)
}

pub(crate) fn validate_string(
    vm: &mut Vm,
    arg: Value,
    arg_name: &str,
) -> Option<finch_core::ObjectId> {
    if arg.is_obj() {
        let id = arg.as_obj_id();
        if vm.heap.get(id).is_string() {
            return Some(id);
        }
    }
    vm.fiber_error(format!("{arg_name} must be a string."));
    None
}

pub(crate) fn validate_fn(
    vm: &mut Vm,
    arg: Value,
    arg_name: &str,
) -> Option<finch_core::ObjectId> {
    if arg.is_obj() {
        let id = arg.as_obj_id();
        if vm.heap.get(id).is_closure() {
            return Some(id);
        }
    }
    vm.fiber_error(format!("{arg_name} must be a function."));
    None
}

/// Map keys are restricted to value types: null, booleans, numbers,
/// strings, ranges, and classes.
pub(crate) fn validate_key(vm: &mut Vm, arg: Value) -> Option<MapKey> {
    if arg.is_null() {
        return Some(MapKey::Null);
    }
    if arg.is_bool() {
        return Some(MapKey::Bool(arg.as_bool()));
    }
    if arg.is_num() {
        return Some(MapKey::Num(arg.to_bits()));
    }
    if arg.is_obj() {
        let id = arg.as_obj_id();
        let slot = vm.heap.get(id);
        if slot.is_string() {
            let s = slot.as_string();
            return Some(MapKey::Str {
                hash: s.hash(),
                bytes: Rc::from(s.as_bytes()),
            });
        }
        if slot.is_range() {
            let r = slot.as_range();
            return Some(MapKey::Range {
                from: Value::from_num(r.from).to_bits(),
                to: Value::from_num(r.to).to_bits(),
                is_inclusive: r.is_inclusive,
            });
        }
        if slot.is_class() {
            return Some(MapKey::Class(id));
        }
    }
    vm.fiber_error(messages::KEY_NOT_VALUE_TYPE);
    None
}

/// Resolve a range subscript over a sequence of `length` elements into a
/// (start, count, step) triple, converting exclusive ranges to inclusive
/// ones and handling negative endpoints.
pub(crate) fn calculate_range(
    vm: &mut Vm,
    from: f64,
    to: f64,
    is_inclusive: bool,
    length: usize,
) -> Option<(usize, usize, isize)> {
    // An empty range anchored at the end of the sequence.
    let end_marker = if is_inclusive { -1.0 } else { length as f64 };
    if from == length as f64 && to == end_marker {
        return Some((0, 0, 0));
    }

    let start = validate_index_value(vm, length, from, "Range start")?;

    let mut value = validate_int_value(vm, to, "Range end")?;
    if value < 0.0 {
        value += length as f64;
    }

    if !is_inclusive {
        // An exclusive range with equal endpoints is empty.
        if value == start as f64 {
            return Some((start, 0, 0));
        }
        value += if value >= start as f64 { -1.0 } else { 1.0 };
    }

    if value < 0.0 || value >= length as f64 {
        vm.fiber_error(messages::RANGE_END_BOUNDS);
        return None;
    }

    let end = value as usize;
    let count = start.abs_diff(end) + 1;
    let step = if start <= end { 1 } else { -1 };
    Some((start, count, step))
}

/// Render a number the way `Num.toString` does: `nan`, signed `infinity`,
/// integers without a fractional part, and shortest round-trip formatting
/// otherwise.
pub(crate) fn num_to_string(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 {
            "infinity".to_string()
        } else {
            "-infinity".to_string()
        };
    }
    if value == 0.0 {
        return if value.is_sign_negative() {
            "-0".to_string()
        } else {
            "0".to_string()
        };
    }
    if value.trunc() == value && value.abs() < 9.007199254740992e15 {
        return format!("{}", value as i64);
    }
    format!("{value}")
}
