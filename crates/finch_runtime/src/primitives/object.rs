//! Primitives on the root Object class, on Class, and on Null.

use crate::classes;
use crate::errors::messages;
use crate::primitives::common::prim_error;
use crate::vm::Vm;
use finch_core::Value;

pub(crate) fn object_not(_vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::FALSE;
    true
}

pub(crate) fn object_eqeq(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_bool(vm.value_eq(args[0], args[1]));
    true
}

pub(crate) fn object_bangeq(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_bool(!vm.value_eq(args[0], args[1]));
    true
}

/// Walk the receiver's superclass chain looking for the argument class.
pub(crate) fn object_is(vm: &mut Vm, args: &mut [Value]) -> bool {
    if !(args[1].is_obj() && vm.heap.get(args[1].as_obj_id()).is_class()) {
        return prim_error(vm, messages::RIGHT_OPERAND_CLASS);
    }
    let result = match vm.class_of(args[0]) {
        Some(class) => classes::is_subclass_of(vm, class, args[1].as_obj_id()),
        None => false,
    };
    args[0] = Value::from_bool(result);
    true
}

pub(crate) fn object_to_string(vm: &mut Vm, args: &mut [Value]) -> bool {
    let class_name = match vm.class_of(args[0]) {
        Some(class) => vm.heap.get(class).as_class().name.as_str().to_string(),
        None => "?".to_string(),
    };
    args[0] = vm.new_string(&format!("instance of {class_name}"));
    true
}

pub(crate) fn object_type(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = match vm.class_of(args[0]) {
        Some(class) => Value::obj(class),
        None => Value::NULL,
    };
    true
}

/// `Object.same(a, b)`: value identity, unaffected by `==` overrides.
pub(crate) fn object_same(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_bool(vm.value_eq(args[1], args[2]));
    true
}

// ---- Class ----

pub(crate) fn class_name(vm: &mut Vm, args: &mut [Value]) -> bool {
    let name = vm
        .heap
        .get(args[0].as_obj_id())
        .as_class()
        .name
        .as_str()
        .to_string();
    args[0] = vm.new_string(&name);
    true
}

pub(crate) fn class_supertype(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = match vm.heap.get(args[0].as_obj_id()).as_class().superclass {
        Some(superclass) => Value::obj(superclass),
        None => Value::NULL,
    };
    true
}

pub(crate) fn class_to_string(vm: &mut Vm, args: &mut [Value]) -> bool {
    class_name(vm, args)
}

pub(crate) fn class_attributes(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = vm.heap.get(args[0].as_obj_id()).as_class().attributes;
    true
}

// ---- Null ----

pub(crate) fn null_not(_vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::TRUE;
    true
}

pub(crate) fn null_to_string(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = vm.new_string("null");
    true
}
