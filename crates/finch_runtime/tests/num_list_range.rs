//! Num, List, and Range primitive behavior.

mod common;

use common::{assert_num, call, call_error, install_fiber, new_vm, num, string_text};
use finch_core::Value;

// ---- Num ----

#[test]
fn arithmetic_validates_right_operand() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    assert_num(call(&mut vm, "+(_)", &[num(1.0), num(2.0)]), 3.0);
    assert_num(call(&mut vm, "-(_)", &[num(1.0), num(2.0)]), -1.0);
    assert_num(call(&mut vm, "*(_)", &[num(6.0), num(7.0)]), 42.0);
    assert_num(call(&mut vm, "/(_)", &[num(1.0), num(2.0)]), 0.5);
    assert_num(call(&mut vm, "%(_)", &[num(7.5), num(2.0)]), 1.5);

    let s = vm.new_string("2");
    assert_eq!(
        call_error(&mut vm, "+(_)", &[num(1.0), s]),
        "Right operand must be a number."
    );
}

#[test]
fn equality_with_non_number_is_false_not_an_error() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    assert_eq!(call(&mut vm, "==(_)", &[num(1.0), Value::TRUE]), Value::FALSE);
    assert_eq!(call(&mut vm, "!=(_)", &[num(1.0), Value::TRUE]), Value::TRUE);
    assert_eq!(call(&mut vm, "==(_)", &[num(1.0), num(1.0)]), Value::TRUE);
    // NaN is not equal to itself.
    assert_eq!(call(&mut vm, "==(_)", &[num(f64::NAN), num(f64::NAN)]), Value::FALSE);
}

#[test]
fn bitwise_reinterprets_as_u32() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    assert_num(call(&mut vm, "&(_)", &[num(0xff as f64), num(0x0f as f64)]), 0x0f as f64);
    assert_num(call(&mut vm, "|(_)", &[num(0xf0 as f64), num(0x0f as f64)]), 0xff as f64);
    assert_num(call(&mut vm, "^(_)", &[num(0xff as f64), num(0x0f as f64)]), 0xf0 as f64);
    assert_num(call(&mut vm, "<<(_)", &[num(1.0), num(4.0)]), 16.0);
    assert_num(call(&mut vm, ">>(_)", &[num(16.0), num(4.0)]), 1.0);
    // ~0 over unsigned 32 bits.
    assert_num(call(&mut vm, "~", &[num(0.0)]), u32::MAX as f64);
    // -1 wraps to all ones before complementing.
    assert_num(call(&mut vm, "~", &[num(-1.0)]), 0.0);
}

#[test]
fn fraction_truncate_and_sign() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    assert_num(call(&mut vm, "fraction", &[num(3.75)]), 0.75);
    assert_num(call(&mut vm, "fraction", &[num(-3.75)]), -0.75);
    assert_num(call(&mut vm, "truncate", &[num(-3.75)]), -3.0);
    assert_num(call(&mut vm, "sign", &[num(-3.75)]), -1.0);
    assert_num(call(&mut vm, "sign", &[num(12.0)]), 1.0);
    assert_num(call(&mut vm, "sign", &[num(0.0)]), 0.0);
    assert_num(call(&mut vm, "clamp(_,_)", &[num(10.0), num(0.0), num(5.0)]), 5.0);
    assert_num(call(&mut vm, "clamp(_,_)", &[num(-3.0), num(0.0), num(5.0)]), 0.0);
    assert_num(call(&mut vm, "clamp(_,_)", &[num(3.0), num(0.0), num(5.0)]), 3.0);
}

#[test]
fn ieee_predicates() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    assert_eq!(call(&mut vm, "isNan", &[num(f64::NAN)]), Value::TRUE);
    assert_eq!(call(&mut vm, "isNan", &[num(1.0)]), Value::FALSE);
    assert_eq!(call(&mut vm, "isInfinity", &[num(f64::INFINITY)]), Value::TRUE);
    assert_eq!(call(&mut vm, "isInteger", &[num(3.0)]), Value::TRUE);
    assert_eq!(call(&mut vm, "isInteger", &[num(3.5)]), Value::FALSE);
    assert_eq!(call(&mut vm, "isInteger", &[num(f64::INFINITY)]), Value::FALSE);
}

#[test]
fn class_side_constants() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let num_class = Value::obj(vm.core.num.unwrap());
    assert_num(call(&mut vm, "largest", &[num_class]), f64::MAX);
    assert_num(call(&mut vm, "smallest", &[num_class]), f64::MIN_POSITIVE);
    assert_num(call(&mut vm, "maxSafeInteger", &[num_class]), 9007199254740991.0);
    assert_num(call(&mut vm, "minSafeInteger", &[num_class]), -9007199254740991.0);
    assert_num(call(&mut vm, "pi", &[num_class]), std::f64::consts::PI);
    assert_num(call(&mut vm, "tau", &[num_class]), std::f64::consts::TAU);
    assert_num(call(&mut vm, "nan", &[num_class]), f64::NAN);
    assert_num(call(&mut vm, "infinity", &[num_class]), f64::INFINITY);
}

#[test]
fn to_string_and_from_string() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let num_class = Value::obj(vm.core.num.unwrap());

    let rendered = call(&mut vm, "toString", &[num(42.0)]);
    assert_eq!(string_text(&vm, rendered), "42");
    let rendered = call(&mut vm, "toString", &[num(1.5)]);
    assert_eq!(string_text(&vm, rendered), "1.5");
    let rendered = call(&mut vm, "toString", &[num(f64::NAN)]);
    assert_eq!(string_text(&vm, rendered), "nan");
    let rendered = call(&mut vm, "toString", &[num(f64::NEG_INFINITY)]);
    assert_eq!(string_text(&vm, rendered), "-infinity");

    let s = vm.new_string("  -17.25 ");
    assert_num(call(&mut vm, "fromString(_)", &[num_class, s]), -17.25);
    let s = vm.new_string("0x2a");
    assert_num(call(&mut vm, "fromString(_)", &[num_class, s]), 42.0);
    let s = vm.new_string("pelican");
    assert_eq!(call(&mut vm, "fromString(_)", &[num_class, s]), Value::NULL);
    let s = vm.new_string("");
    assert_eq!(call(&mut vm, "fromString(_)", &[num_class, s]), Value::NULL);
}

#[test]
fn range_constructors_from_num() {
    let mut vm = new_vm();
    install_fiber(&mut vm);

    let inclusive = call(&mut vm, "..(_)", &[num(1.0), num(5.0)]);
    assert!(inclusive.is_obj());
    assert_eq!(call(&mut vm, "isInclusive", &[inclusive]), Value::TRUE);
    assert_num(call(&mut vm, "from", &[inclusive]), 1.0);
    assert_num(call(&mut vm, "to", &[inclusive]), 5.0);

    let exclusive = call(&mut vm, "...(_)", &[num(1.0), num(5.0)]);
    assert_eq!(call(&mut vm, "isInclusive", &[exclusive]), Value::FALSE);

    assert_eq!(
        call_error(&mut vm, "..(_)", &[num(1.0), Value::NULL]),
        "Right hand side of range must be a number."
    );
}

// ---- List ----

#[test]
fn filled_and_bounds() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let list_class = Value::obj(vm.core.list.unwrap());

    let list = call(&mut vm, "filled(_,_)", &[list_class, num(3.0), Value::TRUE]);
    assert_num(call(&mut vm, "count", &[list]), 3.0);
    assert_eq!(call(&mut vm, "[_]", &[list, num(2.0)]), Value::TRUE);

    let empty = call(&mut vm, "filled(_,_)", &[list_class, num(0.0), Value::TRUE]);
    assert_num(call(&mut vm, "count", &[empty]), 0.0);

    assert_eq!(
        call_error(&mut vm, "filled(_,_)", &[list_class, num(-1.0), Value::TRUE]),
        "Size cannot be negative."
    );
}

#[test]
fn insert_remove_round_trip() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let list = vm.new_list(vec![num(1.0), num(2.0), num(3.0)]);

    call(&mut vm, "insert(_,_)", &[list, num(1.0), num(99.0)]);
    assert_num(call(&mut vm, "count", &[list]), 4.0);
    assert_num(call(&mut vm, "[_]", &[list, num(1.0)]), 99.0);

    let removed = call(&mut vm, "removeAt(_)", &[list, num(1.0)]);
    assert_num(removed, 99.0);

    // Back to the original contents.
    for (i, expected) in [1.0, 2.0, 3.0].into_iter().enumerate() {
        assert_num(call(&mut vm, "[_]", &[list, num(i as f64)]), expected);
    }
}

#[test]
fn subscript_setter_returns_assigned_value() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let list = vm.new_list(vec![num(1.0)]);
    let result = call(&mut vm, "[_]=(_)", &[list, num(0.0), num(7.0)]);
    assert_num(result, 7.0);
    assert_num(call(&mut vm, "[_]", &[list, num(0.0)]), 7.0);
    // Insertion is allowed one past the end; subscript is not.
    assert_eq!(
        call_error(&mut vm, "[_]", &[list, num(1.0)]),
        "Subscript out of bounds."
    );
    call(&mut vm, "insert(_,_)", &[list, num(1.0), num(8.0)]);
    assert_num(call(&mut vm, "[_]", &[list, num(1.0)]), 8.0);
}

#[test]
fn iterate_visits_every_element() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let list = vm.new_list(vec![num(10.0), num(20.0), num(30.0)]);

    let mut visited = Vec::new();
    let mut iterator = Value::NULL;
    loop {
        let next = call(&mut vm, "iterate(_)", &[list, iterator]);
        if next == Value::FALSE {
            break;
        }
        let element = call(&mut vm, "iteratorValue(_)", &[list, next]);
        visited.push(element.as_num());
        iterator = next;
    }
    assert_eq!(visited, vec![10.0, 20.0, 30.0]);

    let empty = vm.new_list(Vec::new());
    assert_eq!(call(&mut vm, "iterate(_)", &[empty, Value::NULL]), Value::FALSE);

    let single = vm.new_list(vec![num(5.0)]);
    assert_num(call(&mut vm, "iterate(_)", &[single, Value::NULL]), 0.0);
    assert_eq!(call(&mut vm, "iterate(_)", &[single, num(0.0)]), Value::FALSE);
}

#[test]
fn index_of_remove_and_swap() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let needle = vm.new_string("b");
    let other = vm.new_string("b");
    let a = vm.new_string("a");
    let list = vm.new_list(vec![a, needle]);

    // Equality is by content, so a distinct-but-equal string is found.
    assert_num(call(&mut vm, "indexOf(_)", &[list, other]), 1.0);
    let missing = vm.new_string("z");
    assert_num(call(&mut vm, "indexOf(_)", &[list, missing]), -1.0);

    let removed = call(&mut vm, "remove(_)", &[list, other]);
    assert_eq!(string_text(&vm, removed), "b");
    assert_num(call(&mut vm, "count", &[list]), 1.0);
    assert_eq!(call(&mut vm, "remove(_)", &[list, missing]), Value::NULL);

    let list = vm.new_list(vec![num(1.0), num(2.0)]);
    call(&mut vm, "swap(_,_)", &[list, num(0.0), num(1.0)]);
    assert_num(call(&mut vm, "[_]", &[list, num(0.0)]), 2.0);
    assert_num(call(&mut vm, "[_]", &[list, num(1.0)]), 1.0);
}

#[test]
fn range_subscript_slices_lists() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let list = vm.new_list(vec![num(1.0), num(2.0), num(3.0), num(4.0)]);

    let range = vm.new_range(1.0, 3.0, false);
    let slice = call(&mut vm, "[_]", &[list, range]);
    assert_num(call(&mut vm, "count", &[slice]), 2.0);
    assert_num(call(&mut vm, "[_]", &[slice, num(0.0)]), 2.0);
    assert_num(call(&mut vm, "[_]", &[slice, num(1.0)]), 3.0);

    // A negative step walks backward.
    let range = vm.new_range(3.0, 0.0, true);
    let slice = call(&mut vm, "[_]", &[list, range]);
    assert_num(call(&mut vm, "[_]", &[slice, num(0.0)]), 4.0);
    assert_num(call(&mut vm, "[_]", &[slice, num(3.0)]), 1.0);

    let range = vm.new_range(0.0, 9.0, true);
    let err = {
        let mut argv = [list, range];
        let outcome = vm.invoke("[_]", &mut argv);
        assert_ne!(outcome, finch_runtime::Dispatch::Complete);
        common::error_text(&vm)
    };
    assert_eq!(err, "Range end out of bounds.");
}

// ---- Range ----

#[test]
fn range_iteration_boundaries() {
    let mut vm = new_vm();
    install_fiber(&mut vm);

    // (1..1) yields 1 exactly once.
    let r = vm.new_range(1.0, 1.0, true);
    assert_num(call(&mut vm, "iterate(_)", &[r, Value::NULL]), 1.0);
    assert_eq!(call(&mut vm, "iterate(_)", &[r, num(1.0)]), Value::FALSE);

    // (1...1) yields nothing.
    let r = vm.new_range(1.0, 1.0, false);
    assert_eq!(call(&mut vm, "iterate(_)", &[r, Value::NULL]), Value::FALSE);

    // (3..1) descends.
    let r = vm.new_range(3.0, 1.0, true);
    let mut visited = Vec::new();
    let mut iterator = Value::NULL;
    loop {
        let next = call(&mut vm, "iterate(_)", &[r, iterator]);
        if next == Value::FALSE {
            break;
        }
        visited.push(call(&mut vm, "iteratorValue(_)", &[r, next]).as_num());
        iterator = next;
    }
    assert_eq!(visited, vec![3.0, 2.0, 1.0]);

    // (1...3) stops before the end.
    let r = vm.new_range(1.0, 3.0, false);
    assert_num(call(&mut vm, "iterate(_)", &[r, num(1.0)]), 2.0);
    assert_eq!(call(&mut vm, "iterate(_)", &[r, num(2.0)]), Value::FALSE);
}

#[test]
fn range_accessors_and_to_string() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let r = vm.new_range(3.0, 1.0, true);
    assert_num(call(&mut vm, "min", &[r]), 1.0);
    assert_num(call(&mut vm, "max", &[r]), 3.0);
    let r_to_string = call(&mut vm, "toString", &[r]);
    assert_eq!(string_text(&vm, r_to_string), "3..1");

    let r = vm.new_range(1.5, 4.0, false);
    let r_to_string = call(&mut vm, "toString", &[r]);
    assert_eq!(string_text(&vm, r_to_string), "1.5...4");
}
