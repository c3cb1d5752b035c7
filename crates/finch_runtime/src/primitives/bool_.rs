//! Primitives on Bool.

use crate::vm::Vm;
use finch_core::Value;

pub(crate) fn bool_not(_vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_bool(!args[0].as_bool());
    true
}

pub(crate) fn bool_to_string(vm: &mut Vm, args: &mut [Value]) -> bool {
    let rendered = if args[0].as_bool() { "true" } else { "false" };
    args[0] = vm.new_string(rendered);
    true
}
