//! Primitives on Map and its metaclass.
//!
//! Iteration hands out opaque iterator positions over the map's current
//! entry order; `keyIteratorValue_` and `valueIteratorValue_` project an
//! entry out of a position.

use crate::objects::MapKey;
use crate::primitives::common::{validate_int, validate_key};
use crate::vm::Vm;
use finch_core::Value;

fn key_to_value(vm: &mut Vm, key: &MapKey) -> Value {
    match key {
        MapKey::Null => Value::NULL,
        MapKey::Bool(b) => Value::from_bool(*b),
        MapKey::Num(bits) => Value::from_num(f64::from_bits(*bits)),
        MapKey::Range {
            from,
            to,
            is_inclusive,
        } => vm.new_range(f64::from_bits(*from), f64::from_bits(*to), *is_inclusive),
        MapKey::Class(id) => Value::obj(*id),
        MapKey::Str { bytes, .. } => vm.new_string_from_bytes(bytes.to_vec()),
    }
}

// ---- metaclass ----

pub(crate) fn map_new(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = vm.new_map();
    true
}

// ---- instance ----

/// Subscript of an absent key yields null.
pub(crate) fn map_subscript(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(key) = validate_key(vm, args[1]) else {
        return false;
    };
    let receiver = args[0].as_obj_id();
    args[0] = vm
        .heap
        .get(receiver)
        .as_map()
        .entries
        .get(&key)
        .copied()
        .unwrap_or(Value::NULL);
    true
}

pub(crate) fn map_subscript_setter(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(key) = validate_key(vm, args[1]) else {
        return false;
    };
    let receiver = args[0].as_obj_id();
    vm.heap
        .get_mut(receiver)
        .as_map_mut()
        .entries
        .insert(key, args[2]);
    args[0] = args[2];
    true
}

/// Compiler support for map literals: insert and leave the map itself on
/// the stack.
pub(crate) fn map_add_core(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(key) = validate_key(vm, args[1]) else {
        return false;
    };
    let receiver = args[0].as_obj_id();
    vm.heap
        .get_mut(receiver)
        .as_map_mut()
        .entries
        .insert(key, args[2]);
    true
}

pub(crate) fn map_clear(vm: &mut Vm, args: &mut [Value]) -> bool {
    vm.heap
        .get_mut(args[0].as_obj_id())
        .as_map_mut()
        .entries
        .clear();
    args[0] = Value::NULL;
    true
}

pub(crate) fn map_contains_key(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(key) = validate_key(vm, args[1]) else {
        return false;
    };
    let receiver = args[0].as_obj_id();
    args[0] = Value::from_bool(vm.heap.get(receiver).as_map().entries.contains_key(&key));
    true
}

pub(crate) fn map_count(vm: &mut Vm, args: &mut [Value]) -> bool {
    let count = vm.heap.get(args[0].as_obj_id()).as_map().entries.len();
    args[0] = Value::from_num(count as f64);
    true
}

/// Remove yields the removed value, or null when the key was absent.
pub(crate) fn map_remove(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(key) = validate_key(vm, args[1]) else {
        return false;
    };
    let receiver = args[0].as_obj_id();
    args[0] = vm
        .heap
        .get_mut(receiver)
        .as_map_mut()
        .entries
        .remove(&key)
        .unwrap_or(Value::NULL);
    true
}

pub(crate) fn map_iterate(vm: &mut Vm, args: &mut [Value]) -> bool {
    let count = vm.heap.get(args[0].as_obj_id()).as_map().entries.len();

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

pub(crate) fn map_key_iterator_value(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let count = vm.heap.get(receiver).as_map().entries.len();
    let Some(index) = crate::primitives::common::validate_index(vm, args[1], count, "Iterator")
    else {
        return false;
    };
    let key = {
        let map = vm.heap.get(receiver).as_map();
        map.entries.keys().nth(index).cloned()
    };
    args[0] = match key {
        Some(key) => key_to_value(vm, &key),
        None => Value::NULL,
    };
    true
}

pub(crate) fn map_value_iterator_value(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let count = vm.heap.get(receiver).as_map().entries.len();
    let Some(index) = crate::primitives::common::validate_index(vm, args[1], count, "Iterator")
    else {
        return false;
    };
    let value = {
        let map = vm.heap.get(receiver).as_map();
        map.entries.values().nth(index).copied()
    };
    args[0] = value.unwrap_or(Value::NULL);
    true
}
