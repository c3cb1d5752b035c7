//! Object, Class, Null, Map, and System primitive behavior, plus
//! collector safety for objects reachable only through runtime structures.

mod common;

use common::{assert_num, call, call_error, install_fiber, new_vm, num, string_text};
use finch_core::Value;
use finch_runtime::{Dispatch, VmConfig};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn object_identity_and_is() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let list_a = vm.new_list(Vec::new());
    let list_b = vm.new_list(Vec::new());

    // Non-string heap objects compare by identity.
    assert_eq!(call(&mut vm, "==(_)", &[list_a, list_b]), Value::FALSE);
    assert_eq!(call(&mut vm, "==(_)", &[list_a, list_a]), Value::TRUE);

    let list_class = Value::obj(vm.core.list.unwrap());
    let object_class = Value::obj(vm.core.object.unwrap());
    let num_class = Value::obj(vm.core.num.unwrap());
    assert_eq!(call(&mut vm, "is(_)", &[list_a, list_class]), Value::TRUE);
    assert_eq!(call(&mut vm, "is(_)", &[list_a, object_class]), Value::TRUE);
    assert_eq!(call(&mut vm, "is(_)", &[list_a, num_class]), Value::FALSE);

    assert_eq!(
        call_error(&mut vm, "is(_)", &[list_a, num(1.0)]),
        "Right operand must be a class."
    );
}

#[test]
fn type_and_to_string() {
    let mut vm = new_vm();
    install_fiber(&mut vm);

    let range = vm.new_range(0.0, 1.0, true);
    assert_eq!(
        call(&mut vm, "type", &[range]),
        Value::obj(vm.core.range.unwrap())
    );

    // Instances format as "instance of <className>".
    let source = "class Pelican {}\n";
    assert_eq!(
        finch_runtime::interpret(&mut vm, Some("zoo"), source),
        finch_runtime::InterpretResult::Success
    );
    let module = vm.ensure_module(Some("zoo"));
    let pelican = vm.module_variable(module, "Pelican").unwrap();
    let instance = Value::obj(vm.new_instance(pelican.as_obj_id()));
    let rendered = call(&mut vm, "toString", &[instance]);
    assert_eq!(string_text(&vm, rendered), "instance of Pelican");
}

#[test]
fn null_primitives() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    assert_eq!(call(&mut vm, "!", &[Value::NULL]), Value::TRUE);
    let null_to_string = call(&mut vm, "toString", &[Value::NULL]);
    assert_eq!(string_text(&vm, null_to_string), "null");
    assert_eq!(call(&mut vm, "!", &[Value::TRUE]), Value::FALSE);
    assert_eq!(call(&mut vm, "!", &[Value::FALSE]), Value::TRUE);
}

#[test]
fn class_reflection() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let num_class = Value::obj(vm.core.num.unwrap());
    let num_class_name = call(&mut vm, "name", &[num_class]);
    assert_eq!(string_text(&vm, num_class_name), "Num");
    assert_eq!(
        call(&mut vm, "supertype", &[num_class]),
        Value::obj(vm.core.object.unwrap())
    );
    let object_class = Value::obj(vm.core.object.unwrap());
    assert_eq!(call(&mut vm, "supertype", &[object_class]), Value::NULL);
    assert_eq!(call(&mut vm, "attributes", &[num_class]), Value::NULL);
}

#[test]
fn object_same_ignores_overrides() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let object_class = Value::obj(vm.core.object.unwrap());
    let a = vm.new_string("x");
    let b = vm.new_string("x");
    let mut args = [object_class, a, b];
    assert_eq!(vm.invoke("same(_,_)", &mut args), Dispatch::Complete);
    assert_eq!(args[0], Value::TRUE);

    let list = vm.new_list(Vec::new());
    let mut args = [object_class, list, a];
    assert_eq!(vm.invoke("same(_,_)", &mut args), Dispatch::Complete);
    assert_eq!(args[0], Value::FALSE);
}

#[test]
fn map_basics() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let map_class = Value::obj(vm.core.map.unwrap());
    let map = call(&mut vm, "new()", &[map_class]);

    let key = vm.new_string("name");
    let value = vm.new_string("finch");
    call(&mut vm, "[_]=(_)", &[map, key, value]);
    assert_num(call(&mut vm, "count", &[map]), 1.0);

    // A distinct but equal string key finds the entry.
    let same_key = vm.new_string("name");
    let fetched = call(&mut vm, "[_]", &[map, same_key]);
    assert_eq!(string_text(&vm, fetched), "finch");
    assert_eq!(call(&mut vm, "containsKey(_)", &[map, same_key]), Value::TRUE);

    // Absent keys yield null.
    let missing = vm.new_string("wingspan");
    assert_eq!(call(&mut vm, "[_]", &[map, missing]), Value::NULL);

    call(&mut vm, "[_]=(_)", &[map, num(3.0), Value::TRUE]);
    assert_num(call(&mut vm, "count", &[map]), 2.0);

    let removed = call(&mut vm, "remove(_)", &[map, same_key]);
    assert_eq!(string_text(&vm, removed), "finch");
    assert_eq!(call(&mut vm, "remove(_)", &[map, missing]), Value::NULL);
    assert_num(call(&mut vm, "count", &[map]), 1.0);

    call(&mut vm, "clear()", &[map]);
    assert_num(call(&mut vm, "count", &[map]), 0.0);

    // Only value types can be keys.
    let list = vm.new_list(Vec::new());
    assert_eq!(
        call_error(&mut vm, "[_]=(_)", &[map, list, Value::TRUE]),
        "Key must be a value type."
    );
}

#[test]
fn map_iteration_covers_all_entries() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let map = vm.new_map();
    for i in 0..3 {
        call(&mut vm, "[_]=(_)", &[map, num(i as f64), num(i as f64 * 10.0)]);
    }

    let mut seen = Vec::new();
    let mut iterator = Value::NULL;
    loop {
        let next = call(&mut vm, "iterate(_)", &[map, iterator]);
        if next == Value::FALSE {
            break;
        }
        let key = call(&mut vm, "keyIteratorValue_(_)", &[map, next]);
        let value = call(&mut vm, "valueIteratorValue_(_)", &[map, next]);
        assert_eq!(key.as_num() * 10.0, value.as_num());
        seen.push(key.as_num());
        iterator = next;
    }
    seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(seen, vec![0.0, 1.0, 2.0]);
}

#[test]
fn system_write_goes_to_the_host_sink() {
    let captured = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&captured);
    let config = VmConfig {
        write: Some(Box::new(move |text| sink.borrow_mut().push_str(text))),
        ..VmConfig::default()
    };
    let mut vm = finch_runtime::Vm::new(config).unwrap();
    install_fiber(&mut vm);

    let system_class = Value::obj(vm.core.system.unwrap());
    let text = vm.new_string("hello host\n");
    let result = call(&mut vm, "writeString_(_)", &[system_class, text]);
    assert_eq!(result, text);
    assert_eq!(*captured.borrow(), "hello host\n");
}

#[test]
fn system_clock_is_monotonic() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let system_class = Value::obj(vm.core.system.unwrap());
    let first = call(&mut vm, "clock", &[system_class]).as_num();
    let second = call(&mut vm, "clock", &[system_class]).as_num();
    assert!(second >= first);
    assert!(first >= 0.0);
}

#[test]
fn gc_keeps_reachable_objects_and_frees_garbage() {
    let mut vm = new_vm();
    let fiber = install_fiber(&mut vm);

    // Reachable: on the fiber stack and in a module variable.
    let kept = vm.new_string("kept");
    vm.heap.get_mut(fiber).as_fiber_mut().stack.push(kept);
    let module = vm.core_module().unwrap();
    let also_kept = vm.new_list(vec![num(1.0)]);
    vm.define_variable(module, "scratch", also_kept).unwrap();

    // Unreachable after this binding goes out of scope of any root.
    let garbage = vm.new_string("garbage");
    let garbage_id = garbage.as_obj_id();

    let before = vm.heap.live_count();
    vm.collect_garbage();
    let after = vm.heap.live_count();

    assert!(vm.heap.contains(kept.as_obj_id()));
    assert!(vm.heap.contains(also_kept.as_obj_id()));
    assert!(!vm.heap.contains(garbage_id));
    assert!(after < before);
}

#[test]
fn system_gc_primitive_collects() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let garbage = vm.new_string("doomed");
    let garbage_id = garbage.as_obj_id();

    let system_class = Value::obj(vm.core.system.unwrap());
    let result = call(&mut vm, "gc()", &[system_class]);
    assert_eq!(result, Value::NULL);
    assert!(!vm.heap.contains(garbage_id));
}

#[test]
fn temp_roots_protect_values_during_allocation() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let precious = vm.new_string("precious");
    vm.push_root(precious);
    vm.collect_garbage();
    assert!(vm.heap.contains(precious.as_obj_id()));
    vm.pop_root();
    vm.collect_garbage();
    assert!(!vm.heap.contains(precious.as_obj_id()));
}
