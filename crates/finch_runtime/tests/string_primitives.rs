//! String primitive behavior: byte vs code point indexing, searching,
//! iteration, and the metaclass constructors.

mod common;

use common::{assert_num, call, call_error, install_fiber, new_vm, string_text};
use finch_core::Value;

#[test]
fn count_is_code_points_and_byte_count_is_bytes() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let s = vm.new_string("héllo");
    assert_num(call(&mut vm, "count", &[s]), 5.0);
    assert_num(call(&mut vm, "byteCount_", &[s]), 6.0);

    let plain = vm.new_string("hello");
    assert_num(call(&mut vm, "count", &[plain]), 5.0);
    assert_num(call(&mut vm, "byteCount_", &[plain]), 5.0);
}

#[test]
fn code_point_at_continuation_byte_is_minus_one() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let s = vm.new_string("héllo");
    assert_num(call(&mut vm, "codePointAt_(_)", &[s, Value::from_num(1.0)]), 0xe9 as f64);
    // Byte 2 is the second byte of "é".
    assert_num(call(&mut vm, "codePointAt_(_)", &[s, Value::from_num(2.0)]), -1.0);
    assert_num(call(&mut vm, "byteAt_(_)", &[s, Value::from_num(0.0)]), b'h' as f64);
}

#[test]
fn subscript_by_code_point_and_range() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let s = vm.new_string("héllo");

    let ch = call(&mut vm, "[_]", &[s, Value::from_num(1.0)]);
    assert_eq!(string_text(&vm, ch), "é");

    // Negative index counts from the end of the bytes.
    let last = call(&mut vm, "[_]", &[s, Value::from_num(-1.0)]);
    assert_eq!(string_text(&vm, last), "o");

    // Byte range 0..=2 covers "h", "é", and é's continuation byte; only
    // the code point starts contribute.
    let range = vm.new_range(0.0, 2.0, true);
    let slice = call(&mut vm, "[_]", &[s, range]);
    assert_eq!(string_text(&vm, slice), "hé");

    let rev = vm.new_range(3.0, 0.0, true);
    let slice = call(&mut vm, "[_]", &[s, rev]);
    assert_eq!(string_text(&vm, slice), "léh");
}

#[test]
fn subscript_rejects_other_kinds() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let s = vm.new_string("abc");
    assert_eq!(
        call_error(&mut vm, "[_]", &[s, Value::TRUE]),
        "Subscript must be a number or a range."
    );
    assert_eq!(
        call_error(&mut vm, "[_]", &[s, Value::from_num(9.0)]),
        "Subscript out of bounds."
    );
}

#[test]
fn concatenation_and_search() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let hello = vm.new_string("hello ");
    let world = vm.new_string("world");
    let joined = call(&mut vm, "+(_)", &[hello, world]);
    assert_eq!(string_text(&vm, joined), "hello world");

    let lo = vm.new_string("lo");
    assert_eq!(call(&mut vm, "contains(_)", &[joined, lo]), Value::TRUE);
    assert_num(call(&mut vm, "indexOf(_)", &[joined, lo]), 3.0);

    let o = vm.new_string("o");
    assert_num(call(&mut vm, "indexOf(_,_)", &[joined, o, Value::from_num(5.0)]), 7.0);

    let he = vm.new_string("he");
    let rld = vm.new_string("rld");
    assert_eq!(call(&mut vm, "startsWith(_)", &[joined, he]), Value::TRUE);
    assert_eq!(call(&mut vm, "endsWith(_)", &[joined, rld]), Value::TRUE);
    assert_eq!(call(&mut vm, "startsWith(_)", &[joined, rld]), Value::FALSE);

    let absent = vm.new_string("xyz");
    assert_num(call(&mut vm, "indexOf(_)", &[joined, absent]), -1.0);
}

#[test]
fn search_argument_must_be_a_string() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let s = vm.new_string("abc");
    assert_eq!(
        call_error(&mut vm, "contains(_)", &[s, Value::from_num(1.0)]),
        "Argument must be a string."
    );
}

#[test]
fn iteration_yields_code_point_starts() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let s = vm.new_string("héo");

    // Byte layout: h=0, é=1..3, o=3.
    assert_num(call(&mut vm, "iterate(_)", &[s, Value::NULL]), 0.0);
    assert_num(call(&mut vm, "iterate(_)", &[s, Value::from_num(0.0)]), 1.0);
    assert_num(call(&mut vm, "iterate(_)", &[s, Value::from_num(1.0)]), 3.0);
    assert_eq!(call(&mut vm, "iterate(_)", &[s, Value::from_num(3.0)]), Value::FALSE);

    let ch = call(&mut vm, "iteratorValue(_)", &[s, Value::from_num(1.0)]);
    assert_eq!(string_text(&vm, ch), "é");

    let empty = vm.new_string("");
    assert_eq!(call(&mut vm, "iterate(_)", &[empty, Value::NULL]), Value::FALSE);
}

#[test]
fn byte_iteration_visits_every_byte() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let s = vm.new_string("hé");
    assert_num(call(&mut vm, "iterateByte_(_)", &[s, Value::NULL]), 0.0);
    assert_num(call(&mut vm, "iterateByte_(_)", &[s, Value::from_num(0.0)]), 1.0);
    assert_num(call(&mut vm, "iterateByte_(_)", &[s, Value::from_num(1.0)]), 2.0);
    assert_eq!(
        call(&mut vm, "iterateByte_(_)", &[s, Value::from_num(2.0)]),
        Value::FALSE
    );
}

#[test]
fn from_code_point_round_trips() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let string_class = Value::obj(vm.core.string.unwrap());

    let s = call(
        &mut vm,
        "fromCodePoint(_)",
        &[string_class, Value::from_num(0xe9 as f64)],
    );
    assert_eq!(string_text(&vm, s), "é");

    let cp = call(&mut vm, "codePointAt_(_)", &[s, Value::from_num(0.0)]);
    assert_num(cp, 0xe9 as f64);
}

#[test]
fn from_code_point_bounds() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let string_class = Value::obj(vm.core.string.unwrap());
    assert_eq!(
        call_error(&mut vm, "fromCodePoint(_)", &[string_class, Value::from_num(-1.0)]),
        "Code point cannot be negative."
    );
    assert_eq!(
        call_error(
            &mut vm,
            "fromCodePoint(_)",
            &[string_class, Value::from_num(0x110000 as f64)]
        ),
        "Code point cannot be greater than 0x10ffff."
    );
}

#[test]
fn from_byte_builds_raw_byte_strings() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let string_class = Value::obj(vm.core.string.unwrap());

    let s = call(&mut vm, "fromByte(_)", &[string_class, Value::from_num(200.0)]);
    assert_num(call(&mut vm, "byteCount_", &[s]), 1.0);
    assert_num(call(&mut vm, "byteAt_(_)", &[s, Value::from_num(0.0)]), 200.0);
    // A lone continuation byte is not a decodable code point.
    assert_num(call(&mut vm, "codePointAt_(_)", &[s, Value::from_num(0.0)]), -1.0);

    assert_eq!(
        call_error(&mut vm, "fromByte(_)", &[string_class, Value::from_num(256.0)]),
        "Byte cannot be greater than 0xff."
    );
    assert_eq!(
        call_error(&mut vm, "fromByte(_)", &[string_class, Value::from_num(-1.0)]),
        "Byte cannot be negative."
    );
}

#[test]
fn string_equality_is_by_content() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let a = vm.new_string("finch");
    let b = vm.new_string("finch");
    let c = vm.new_string("lark");
    assert_ne!(a, b, "distinct heap objects");
    assert_eq!(call(&mut vm, "==(_)", &[a, b]), Value::TRUE);
    assert_eq!(call(&mut vm, "==(_)", &[a, c]), Value::FALSE);
    assert_eq!(call(&mut vm, "!=(_)", &[a, c]), Value::TRUE);
}

#[test]
fn dollar_without_host_handler_is_null() {
    let mut vm = new_vm();
    install_fiber(&mut vm);
    let s = vm.new_string("payload");
    let arg = vm.new_string("x");
    assert_eq!(call(&mut vm, "$(_)", &[s, arg]), Value::NULL);
}
