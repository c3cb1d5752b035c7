//! Primitives on Num and its metaclass.
//!
//! Arithmetic validates that the right operand is a number; bitwise
//! operators reinterpret both sides as unsigned 32-bit integers; `==` with
//! a non-number is false rather than an error.

use crate::primitives::common::{num_to_string, validate_num, validate_string};
use crate::vm::Vm;
use finch_core::Value;

/// Truncate toward zero with two's-complement wrapping for negatives.
fn to_u32(value: f64) -> u32 {
    value as i64 as u32
}

macro_rules! num_fn {
    ($name:ident, $func:expr) => {
        pub(crate) fn $name(_vm: &mut Vm, args: &mut [Value]) -> bool {
            let x = args[0].as_num();
            args[0] = Value::from_num($func(x));
            true
        }
    };
}

num_fn!(num_abs, f64::abs);
num_fn!(num_acos, f64::acos);
num_fn!(num_asin, f64::asin);
num_fn!(num_atan, f64::atan);
num_fn!(num_cbrt, f64::cbrt);
num_fn!(num_ceil, f64::ceil);
num_fn!(num_cos, f64::cos);
num_fn!(num_exp, f64::exp);
num_fn!(num_floor, f64::floor);
num_fn!(num_fraction, f64::fract);
num_fn!(num_log, f64::ln);
num_fn!(num_log2, f64::log2);
num_fn!(num_negate, |x: f64| -x);
num_fn!(num_round, f64::round);
num_fn!(num_sin, f64::sin);
num_fn!(num_sqrt, f64::sqrt);
num_fn!(num_tan, f64::tan);
num_fn!(num_truncate, f64::trunc);

macro_rules! num_infix {
    ($name:ident, $op:tt) => {
        pub(crate) fn $name(vm: &mut Vm, args: &mut [Value]) -> bool {
            let Some(rhs) = validate_num(vm, args[1], "Right operand") else {
                return false;
            };
            args[0] = Value::from_num(args[0].as_num() $op rhs);
            true
        }
    };
}

num_infix!(num_plus, +);
num_infix!(num_minus, -);
num_infix!(num_multiply, *);
num_infix!(num_divide, /);
num_infix!(num_mod, %);

macro_rules! num_compare {
    ($name:ident, $op:tt) => {
        pub(crate) fn $name(vm: &mut Vm, args: &mut [Value]) -> bool {
            let Some(rhs) = validate_num(vm, args[1], "Right operand") else {
                return false;
            };
            args[0] = Value::from_bool(args[0].as_num() $op rhs);
            true
        }
    };
}

num_compare!(num_lt, <);
num_compare!(num_gt, >);
num_compare!(num_le, <=);
num_compare!(num_ge, >=);

macro_rules! num_bitwise {
    ($name:ident, $op:tt) => {
        pub(crate) fn $name(vm: &mut Vm, args: &mut [Value]) -> bool {
            let Some(rhs) = validate_num(vm, args[1], "Right operand") else {
                return false;
            };
            let left = to_u32(args[0].as_num());
            let right = to_u32(rhs);
            args[0] = Value::from_num((left $op right) as f64);
            true
        }
    };
}

num_bitwise!(num_bitwise_and, &);
num_bitwise!(num_bitwise_or, |);
num_bitwise!(num_bitwise_xor, ^);

pub(crate) fn num_bitwise_not(_vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_num(!to_u32(args[0].as_num()) as f64);
    true
}

pub(crate) fn num_shl(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(rhs) = validate_num(vm, args[1], "Right operand") else {
        return false;
    };
    let shifted = to_u32(args[0].as_num()).wrapping_shl(to_u32(rhs));
    args[0] = Value::from_num(shifted as f64);
    true
}

pub(crate) fn num_shr(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(rhs) = validate_num(vm, args[1], "Right operand") else {
        return false;
    };
    let shifted = to_u32(args[0].as_num()).wrapping_shr(to_u32(rhs));
    args[0] = Value::from_num(shifted as f64);
    true
}

pub(crate) fn num_min(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(other) = validate_num(vm, args[1], "Other value") else {
        return false;
    };
    let value = args[0].as_num();
    args[0] = Value::from_num(if value < other { value } else { other });
    true
}

pub(crate) fn num_max(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(other) = validate_num(vm, args[1], "Other value") else {
        return false;
    };
    let value = args[0].as_num();
    args[0] = Value::from_num(if value > other { value } else { other });
    true
}

pub(crate) fn num_clamp(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(min) = validate_num(vm, args[1], "Min value") else {
        return false;
    };
    let Some(max) = validate_num(vm, args[2], "Max value") else {
        return false;
    };
    let value = args[0].as_num();
    let result = if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    };
    args[0] = Value::from_num(result);
    true
}

pub(crate) fn num_pow(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(power) = validate_num(vm, args[1], "Power value") else {
        return false;
    };
    args[0] = Value::from_num(args[0].as_num().powf(power));
    true
}

pub(crate) fn num_atan2(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(x) = validate_num(vm, args[1], "x value") else {
        return false;
    };
    args[0] = Value::from_num(args[0].as_num().atan2(x));
    true
}

pub(crate) fn num_sign(_vm: &mut Vm, args: &mut [Value]) -> bool {
    let value = args[0].as_num();
    let sign = if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    };
    args[0] = Value::from_num(sign);
    true
}

pub(crate) fn num_is_integer(_vm: &mut Vm, args: &mut [Value]) -> bool {
    let value = args[0].as_num();
    args[0] = Value::from_bool(value.is_finite() && value.trunc() == value);
    true
}

pub(crate) fn num_is_nan(_vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_bool(args[0].as_num().is_nan());
    true
}

pub(crate) fn num_is_infinity(_vm: &mut Vm, args: &mut [Value]) -> bool {
    args[0] = Value::from_bool(args[0].as_num().is_infinite());
    true
}

/// `..` builds an inclusive range, `...` an exclusive one.
pub(crate) fn num_dotdot(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(to) = validate_num(vm, args[1], "Right hand side of range") else {
        return false;
    };
    args[0] = vm.new_range(args[0].as_num(), to, true);
    true
}

pub(crate) fn num_dotdotdot(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(to) = validate_num(vm, args[1], "Right hand side of range") else {
        return false;
    };
    args[0] = vm.new_range(args[0].as_num(), to, false);
    true
}

pub(crate) fn num_eqeq(_vm: &mut Vm, args: &mut [Value]) -> bool {
    let result = args[1].is_num() && args[0].as_num() == args[1].as_num();
    args[0] = Value::from_bool(result);
    true
}

pub(crate) fn num_bangeq(_vm: &mut Vm, args: &mut [Value]) -> bool {
    let result = !args[1].is_num() || args[0].as_num() != args[1].as_num();
    args[0] = Value::from_bool(result);
    true
}

pub(crate) fn num_to_string_prim(vm: &mut Vm, args: &mut [Value]) -> bool {
    let rendered = num_to_string(args[0].as_num());
    args[0] = vm.new_string(&rendered);
    true
}

// ---- metaclass ----

pub(crate) fn num_from_string(vm: &mut Vm, args: &mut [Value]) -> bool {
    let Some(string) = validate_string(vm, args[1], "Argument") else {
        return false;
    };
    let text = vm.heap.get(string).as_string().to_display_string();
    let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
    if trimmed.is_empty() {
        args[0] = Value::NULL;
        return true;
    }

    let (digits, negative) = match trimmed.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };
    if let Some(hex) = digits.strip_prefix("0x") {
        match i64::from_str_radix(hex, 16) {
            Ok(n) => {
                let n = if negative { -n } else { n };
                args[0] = Value::from_num(n as f64);
            }
            Err(_) => args[0] = Value::NULL,
        }
        return true;
    }

    match trimmed.parse::<f64>() {
        Ok(n) => args[0] = Value::from_num(n),
        Err(_) => args[0] = Value::NULL,
    }
    true
}

macro_rules! num_const {
    ($name:ident, $value:expr) => {
        pub(crate) fn $name(_vm: &mut Vm, args: &mut [Value]) -> bool {
            args[0] = Value::from_num($value);
            true
        }
    };
}

num_const!(num_infinity, f64::INFINITY);
num_const!(num_nan, f64::NAN);
num_const!(num_pi, 3.14159265358979323846264338327950288);
num_const!(num_tau, 6.28318530717958647692528676655900577);
num_const!(num_largest, f64::MAX);
num_const!(num_smallest, f64::MIN_POSITIVE);
num_const!(num_max_safe_integer, 9007199254740991.0);
num_const!(num_min_safe_integer, -9007199254740991.0);
