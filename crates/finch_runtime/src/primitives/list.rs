//! Primitives on List and its metaclass.

use crate::errors::messages;
use crate::primitives::common::{
    calculate_range, prim_error, validate_index, validate_int,
};
use crate::vm::Vm;
use finch_core::Value;

// ---- metaclass ----

pub(crate) fn list_new(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = vm.new_list(Vec::new());
    true
}

pub(crate) fn list_filled(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(size) = validate_int(vm, args[1], "Size") else {
        return false;
    };
    if size < 0.0 {
        return prim_error(vm, messages::SIZE_NEGATIVE);
    }
    args[0] = vm.new_list(vec![args[2]; size as usize]);
    true
}

// ---- instance ----

pub(crate) fn list_subscript(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let count = vm.heap.get(receiver).as_list().len();

    if args[1].is_num() {
        let Some(index) = validate_index(vm, args[1], count, "Subscript") else {
            return false;
        };
        args[0] = vm.heap.get(receiver).as_list()[index];
        return true;
    }

    if !(args[1].is_obj() && vm.heap.get(args[1].as_obj_id()).is_range()) {
        return prim_error(vm, messages::SUBSCRIPT_KIND);
    }
    let (from, to, is_inclusive) = {
        let r = vm.heap.get(args[1].as_obj_id()).as_range();
        (r.from, r.to, r.is_inclusive)
    };
    let Some((start, element_count, step)) = calculate_range(vm, from, to, is_inclusive, count)
    else {
        return false;
    };

    let items: Vec<Value> = {
        let elements = vm.heap.get(receiver).as_list();
        (0..element_count)
            .map(|i| elements[(start as isize + i as isize * step) as usize])
            .collect()
    };
    args[0] = vm.new_list(items);
    true
}

/// Subscript assignment evaluates to the assigned value.
pub(crate) fn list_subscript_setter(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let count = vm.heap.get(receiver).as_list().len();
    let Some(index) = validate_index(vm, args[1], count, "Subscript") else {
        return false;
    };
    vm.heap.get_mut(receiver).as_list_mut()[index] = args[2];
    args[0] = args[2];
    true
}

pub(crate) fn list_add(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    vm.heap.get_mut(receiver).as_list_mut().push(args[1]);
    args[0] = args[1];
    true
}

/// Compiler support for list literals: append and leave the list itself on
/// the stack.
pub(crate) fn list_add_core(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    vm.heap.get_mut(receiver).as_list_mut().push(args[1]);
    true
}

pub(crate) fn list_clear(vm: &mut Vm, args: &mut [Value]) -> bool {
    vm.heap.get_mut(args[0].as_obj_id()).as_list_mut().clear();
    args[0] = Value::NULL;
    true
}

pub(crate) fn list_count(vm: &mut Vm, args: &mut [Value]) -> bool {
    let count = vm.heap.get(args[0].as_obj_id()).as_list().len();
    args[0] = Value::from_num(count as f64);
    true
}

pub(crate) fn list_insert(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let count = vm.heap.get(receiver).as_list().len();
    // count + 1 because the element can be inserted one past the end.
    let Some(index) = validate_index(vm, args[1], count + 1, "Index") else {
        return false;
    };
    vm.heap.get_mut(receiver).as_list_mut().insert(index, args[2]);
    args[0] = args[2];
    true
}

/// `iterate(null)` starts iteration; otherwise the next index is returned
/// until it would run off the end. Every element is visited.
pub(crate) fn list_iterate(vm: &mut Vm, args: &mut [Value]) -> bool {
    let count = vm.heap.get(args[0].as_obj_id()).as_list().len();

    if args[1].is_null() {
        args[0] = if count == 0 {
            Value::FALSE
        } else {
            Value::from_num(0.0)
        };
        return true;
    }
    let Some(index) = validate_int(vm, args[1], "Iterator") else {
        return false;
    };
    let next = index + 1.0;
    args[0] = if index < 0.0 || next >= count as f64 {
        Value::FALSE
    } else {
        Value::from_num(next)
    };
    true
}

pub(crate) fn list_iterator_value(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let count = vm.heap.get(receiver).as_list().len();
    let Some(index) = validate_index(vm, args[1], count, "Iterator") else {
        return false;
    };
    args[0] = vm.heap.get(receiver).as_list()[index];
    true
}

pub(crate) fn list_remove_at(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let count = vm.heap.get(receiver).as_list().len();
    let Some(index) = validate_index(vm, args[1], count, "Index") else {
        return false;
    };
    args[0] = vm.heap.get_mut(receiver).as_list_mut().remove(index);
    true
}

/// Remove the first element equal to the argument, yielding it, or null if
/// the list does not contain it.
pub(crate) fn list_remove_value(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let found = {
        let elements = vm.heap.get(receiver).as_list();
        elements
            .iter()
            .position(|&element| vm.value_eq(element, args[1]))
    };
    args[0] = match found {
        Some(index) => vm.heap.get_mut(receiver).as_list_mut().remove(index),
        None => Value::NULL,
    };
    true
}

pub(crate) fn list_index_of(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let found = {
        let elements = vm.heap.get(receiver).as_list();
        elements
            .iter()
            .position(|&element| vm.value_eq(element, args[1]))
    };
    args[0] = Value::from_num(found.map(|i| i as f64).unwrap_or(-1.0));
    true
}

pub(crate) fn list_swap(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let count = vm.heap.get(receiver).as_list().len();
    let Some(a) = validate_index(vm, args[1], count, "Index 0") else {
        return false;
    };
    let Some(b) = validate_index(vm, args[2], count, "Index 1") else {
        return false;
    };
    vm.heap.get_mut(receiver).as_list_mut().swap(a, b);
    args[0] = Value::NULL;
    true
}
