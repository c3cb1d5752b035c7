//! Primitives on String and its metaclass.
//!
//! Strings are indexed by byte for the byte operations and by code point
//! for subscripting and iteration; `iterate` walks byte indices but skips
//! UTF-8 continuation bytes so it lands on code point starts.

use crate::errors::messages;
use crate::primitives::common::{
    calculate_range, prim_error, validate_index, validate_int, validate_string,
};
use crate::utf8;
use crate::vm::Vm;
use finch_core::Value;

/// Byte-wise substring search. An empty needle matches at `start`.
fn find_sub(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    if needle.is_empty() {
        return (start <= haystack.len()).then_some(start);
    }
    if start + needle.len() > haystack.len() {
        return None;
    }
    haystack[start..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + start)
}

/// The bytes of the code point starting at `index`, or the single raw byte
/// when the sequence there is not valid UTF-8.
fn code_point_slice(bytes: &[u8], index: usize) -> &[u8] {
    match utf8::decode(bytes, index) {
        Some((_, width)) => &bytes[index..index + width],
        None => &bytes[index..index + 1],
    }
}

pub(crate) fn string_plus(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(other) = validate_string(vm, args[1], "Right operand") else {
        return false;
    };
    let mut bytes = vm.heap.get(args[0].as_obj_id()).as_string().as_bytes().to_vec();
    bytes.extend_from_slice(vm.heap.get(other).as_string().as_bytes());
    args[0] = vm.new_string_from_bytes(bytes);
    true
}

pub(crate) fn string_subscript(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let length = vm.heap.get(receiver).as_string().len();

    if args[1].is_num() {
        let Some(index) = validate_index(vm, args[1], length, "Subscript") else {
            return false;
        };
        let piece = {
            let bytes = vm.heap.get(receiver).as_string().as_bytes();
            code_point_slice(bytes, index).to_vec()
        };
        args[0] = vm.new_string_from_bytes(piece);
        return true;
    }

    if !(args[1].is_obj() && vm.heap.get(args[1].as_obj_id()).is_range()) {
        return prim_error(vm, messages::SUBSCRIPT_KIND);
    }
    let (from, to, is_inclusive) = {
        let r = vm.heap.get(args[1].as_obj_id()).as_range();
        (r.from, r.to, r.is_inclusive)
    };
    let Some((start, count, step)) = calculate_range(vm, from, to, is_inclusive, length) else {
        return false;
    };

    let result = {
        let bytes = vm.heap.get(receiver).as_string().as_bytes();
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let index = (start as isize + i as isize * step) as usize;
            // Positions inside a multi-byte sequence carry no code point
            // of their own and are skipped.
            if let Some((_, width)) = utf8::decode(bytes, index) {
                out.extend_from_slice(&bytes[index..index + width]);
            }
        }
        out
    };
    args[0] = vm.new_string_from_bytes(result);
    true
}

pub(crate) fn string_byte_at(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let length = vm.heap.get(receiver).as_string().len();
    let Some(index) = validate_index(vm, args[1], length, "Index") else {
        return false;
    };
    let byte = vm.heap.get(receiver).as_string().as_bytes()[index];
    args[0] = Value::from_num(byte as f64);
    true
}

pub(crate) fn string_byte_count(vm: &mut Vm, args: &mut [Value]) -> bool {
    let length = vm.heap.get(args[0].as_obj_id()).as_string().len();
    args[0] = Value::from_num(length as f64);
    true
}

/// The code point starting at a byte index, or -1 when the index lands in
/// a continuation byte or an invalid sequence.
pub(crate) fn string_code_point_at(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let length = vm.heap.get(receiver).as_string().len();
    let Some(index) = validate_index(vm, args[1], length, "Index") else {
        return false;
    };
    let code_point = {
        let bytes = vm.heap.get(receiver).as_string().as_bytes();
        match utf8::decode(bytes, index) {
            Some((cp, _)) => cp as f64,
            None => -1.0,
        }
    };
    args[0] = Value::from_num(code_point);
    true
}

pub(crate) fn string_count(vm: &mut Vm, args: &mut [Value]) -> bool {
    let count = vm.heap.get(args[0].as_obj_id()).as_string().code_point_count();
    args[0] = Value::from_num(count as f64);
    true
}

pub(crate) fn string_contains(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(other) = validate_string(vm, args[1], "Argument") else {
        return false;
    };
    let haystack = vm.heap.get(args[0].as_obj_id()).as_string();
    let needle = vm.heap.get(other).as_string();
    args[0] = Value::from_bool(find_sub(haystack.as_bytes(), needle.as_bytes(), 0).is_some());
    true
}

pub(crate) fn string_starts_with(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(other) = validate_string(vm, args[1], "Argument") else {
        return false;
    };
    let haystack = vm.heap.get(args[0].as_obj_id()).as_string();
    let needle = vm.heap.get(other).as_string();
    args[0] = Value::from_bool(haystack.as_bytes().starts_with(needle.as_bytes()));
    true
}

pub(crate) fn string_ends_with(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(other) = validate_string(vm, args[1], "Argument") else {
        return false;
    };
    let haystack = vm.heap.get(args[0].as_obj_id()).as_string();
    let needle = vm.heap.get(other).as_string();
    args[0] = Value::from_bool(haystack.as_bytes().ends_with(needle.as_bytes()));
    true
}

pub(crate) fn string_index_of1(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(other) = validate_string(vm, args[1], "Argument") else {
        return false;
    };
    let haystack = vm.heap.get(args[0].as_obj_id()).as_string();
    let needle = vm.heap.get(other).as_string();
    let index = find_sub(haystack.as_bytes(), needle.as_bytes(), 0);
    args[0] = Value::from_num(index.map(|i| i as f64).unwrap_or(-1.0));
    true
}

pub(crate) fn string_index_of2(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(other) = validate_string(vm, args[1], "Argument") else {
        return false;
    };
    let length = vm.heap.get(args[0].as_obj_id()).as_string().len();
    let Some(start) = validate_index(vm, args[2], length, "Start") else {
        return false;
    };
    let haystack = vm.heap.get(args[0].as_obj_id()).as_string();
    let needle = vm.heap.get(other).as_string();
    let index = find_sub(haystack.as_bytes(), needle.as_bytes(), start);
    args[0] = Value::from_num(index.map(|i| i as f64).unwrap_or(-1.0));
    true
}

/// Advance to the next code point start after the iterator, so iteration
/// yields byte indices of code point boundaries.
pub(crate) fn string_iterate(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let length = vm.heap.get(receiver).as_string().len();

    if args[1].is_null() {
        args[0] = if length == 0 {
            Value::FALSE
        } else {
            Value::from_num(0.0)
        };
        return true;
    }
    let Some(iterator) = validate_int(vm, args[1], "Iterator") else {
        return false;
    };
    if iterator < 0.0 || iterator >= length as f64 {
        args[0] = Value::FALSE;
        return true;
    }

    let mut index = iterator as usize;
    let next = {
        let bytes = vm.heap.get(receiver).as_string().as_bytes();
        loop {
            index += 1;
            if index >= bytes.len() {
                break None;
            }
            if bytes[index] & 0xc0 != 0x80 {
                break Some(index);
            }
        }
    };
    args[0] = match next {
        Some(i) => Value::from_num(i as f64),
        None => Value::FALSE,
    };
    true
}

pub(crate) fn string_iterate_byte(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let length = vm.heap.get(receiver).as_string().len();

    if args[1].is_null() {
        args[0] = if length == 0 {
            Value::FALSE
        } else {
            Value::from_num(0.0)
        };
        return true;
    }
    let Some(iterator) = validate_int(vm, args[1], "Iterator") else {
        return false;
    };
    if iterator < 0.0 || iterator >= length as f64 {
        args[0] = Value::FALSE;
        return true;
    }

    let next = iterator as usize + 1;
    args[0] = if next >= length {
        Value::FALSE
    } else {
        Value::from_num(next as f64)
    };
    true
}

pub(crate) fn string_iterator_value(vm: &mut Vm, args: &mut [Value]) -> bool {
    let receiver = args[0].as_obj_id();
    let length = vm.heap.get(receiver).as_string().len();
    let Some(index) = validate_index(vm, args[1], length, "Iterator") else {
        return false;
    };
    let piece = {
        let bytes = vm.heap.get(receiver).as_string().as_bytes();
        code_point_slice(bytes, index).to_vec()
    };
    args[0] = vm.new_string_from_bytes(piece);
    true
}

pub(crate) fn string_to_string(_vm: &mut Vm, args: &mut [Value]) -> bool {
    // Already a string.
    true
}

/// Delegates to the host's dollar handler; null when none is configured.
pub(crate) fn string_dollar(vm: &mut Vm, args: &mut [Value]) -> bool {
    match vm.config.dollar_operator {
        Some(handler) => handler(vm, args),
        None => {
            args[0] = Value::NULL;
            true
        }
    }
}

// ---- metaclass ----

pub(crate) fn string_from_code_point(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(code_point) = validate_int(vm, args[1], "Code point") else {
        return false;
    };
    if code_point < 0.0 {
        return prim_error(vm, messages::CODE_POINT_NEGATIVE);
    }
    if code_point > 0x10ffff as f64 {
        return prim_error(vm, messages::CODE_POINT_TOO_LARGE);
    }
    let mut buf = [0u8; 4];
    let width = utf8::encode(code_point as u32, &mut buf);
    args[0] = vm.new_string_from_bytes(buf[..width].to_vec());
    true
}

pub(crate) fn string_from_byte(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(byte) = validate_int(vm, args[1], "Byte") else {
        return false;
    };
    if byte < 0.0 {
        return prim_error(vm, messages::BYTE_NEGATIVE);
    }
    if byte > 0xff as f64 {
        return prim_error(vm, messages::BYTE_TOO_LARGE);
    }
    args[0] = vm.new_string_from_bytes(vec![byte as u8]);
    true
}
