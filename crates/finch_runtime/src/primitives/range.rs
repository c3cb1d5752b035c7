//! Primitives on Range.

use crate::primitives::common::{num_to_string, validate_num};
use crate::vm::Vm;
use finch_core::Value;

pub(crate) fn range_from(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_num(vm.heap.get(args[0].as_obj_id()).as_range().from);
    true
}

pub(crate) fn range_to(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_num(vm.heap.get(args[0].as_obj_id()).as_range().to);
    true
}

pub(crate) fn range_min(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_num(vm.heap.get(args[0].as_obj_id()).as_range().min());
    true
}

pub(crate) fn range_max(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_num(vm.heap.get(args[0].as_obj_id()).as_range().max());
    true
}

pub(crate) fn range_is_inclusive(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_bool(vm.heap.get(args[0].as_obj_id()).as_range().is_inclusive);
    true
}

/// Walk in unit steps from `from` toward `to`, direction chosen by their
/// order; an exclusive range stops one short.
pub(crate) fn range_iterate(vm: &mut Vm, args: &mut [Value]) -> bool {
    let (from, to, is_inclusive) = {
        let r = vm.heap.get(args[0].as_obj_id()).as_range();
        (r.from, r.to, r.is_inclusive)
    };

    // An empty exclusive range terminates immediately.
    if from == to && !is_inclusive {
        args[0] = Value::FALSE;
        return true;
    }

    if args[1].is_null() {
        args[0] = Value::from_num(from);
        return true;
    }
    let Some(mut iterator) = validate_num(vm, args[1], "Iterator") else {
        return false;
    };

    if from < to {
        iterator += 1.0;
        if iterator > to {
            args[0] = Value::FALSE;
            return true;
        }
    } else {
        iterator -= 1.0;
        if iterator < to {
            args[0] = Value::FALSE;
            return true;
        }
    }
    if !is_inclusive && iterator == to {
        args[0] = Value::FALSE;
        return true;
    }
    args[0] = Value::from_num(iterator);
    true
}

pub(crate) fn range_iterator_value(_vm: &mut Vm, args: &mut [Value]) -> bool {
    // The iterator is the value.
    args[0] = args[1];
    true
}

pub(crate) fn range_to_string(vm: &mut Vm, args: &mut [Value]) -> bool {
    let (from, to, is_inclusive) = {
        let r = vm.heap.get(args[0].as_obj_id()).as_range();
        (r.from, r.to, r.is_inclusive)
    };
    let op = if is_inclusive { ".." } else { "..." };
    let rendered = format!("{}{}{}", num_to_string(from), op, num_to_string(to));
    args[0] = vm.new_string(&rendered);
    true
}
