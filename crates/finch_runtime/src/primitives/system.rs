//! Primitives on the System metaclass. System has no instances; all of its
//! methods are class methods.

use crate::primitives::common::validate_string;
use crate::vm::Vm;
use finch_core::Value;

/// Elapsed seconds on the host's monotonic clock.
pub(crate) fn system_clock(vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_num(vm.config.clock.elapsed_secs());
    true
}

pub(crate) fn system_gc(vm: &mut Vm, args: &mut [Value]) -> bool {
    vm.collect_garbage();
    args[0] = Value::NULL;
    true
}

/// Hand a string to the host's write sink; evaluates to the argument.
pub(crate) fn system_write_string(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(string) = validate_string(vm, args[1], "Argument") else {
        return false;
    };
    let text = vm.heap.get(string).as_string().to_display_string();
    if let Some(write) = vm.config.write.as_mut() {
        write(&text);
    }
    args[0] = args[1];
    true
}
