//! The static primitive registration table.
//!
//! Each entry names a built-in class, a method signature, and the native
//! function bound there. Bootstrap walks the table once per class after
//! the class exists and binds every matching entry into the class's method
//! table, or its metaclass's when the entry is class-side.

use crate::classes;
use crate::objects::{Method, PrimitiveFn};
use crate::primitives::{bool_, fiber, fn_, list, map, num, object, range, string, system};
use crate::vm::Vm;
use finch_core::ObjectId;

#[derive(Clone, Copy)]
pub enum EntryKind {
    /// Native method executed inline.
    Primitive(PrimitiveFn),
    /// `Fn.call(...)`: bound as the special function-call method kind so
    /// the dispatcher transfers control into the receiver closure.
    FunctionCall,
}

pub struct PrimitiveEntry {
    pub class_name: &'static str,
    pub signature: &'static str,
    pub on_metaclass: bool,
    pub kind: EntryKind,
}

const fn prim(
    class_name: &'static str,
    signature: &'static str,
    func: PrimitiveFn,
) -> PrimitiveEntry {
    PrimitiveEntry {
        class_name,
        signature,
        on_metaclass: false,
        kind: EntryKind::Primitive(func),
    }
}

const fn static_prim(
    class_name: &'static str,
    signature: &'static str,
    func: PrimitiveFn,
) -> PrimitiveEntry {
    PrimitiveEntry {
        class_name,
        signature,
        on_metaclass: true,
        kind: EntryKind::Primitive(func),
    }
}

const fn fn_call(signature: &'static str) -> PrimitiveEntry {
    PrimitiveEntry {
        class_name: "Fn",
        signature,
        on_metaclass: false,
        kind: EntryKind::FunctionCall,
    }
}

pub static PRIMITIVES: &[PrimitiveEntry] = &[
    // Bool
    prim("Bool", "!", bool_::bool_not),
    prim("Bool", "toString", bool_::bool_to_string),
    // Class
    prim("Class", "name", object::class_name),
    prim("Class", "supertype", object::class_supertype),
    prim("Class", "toString", object::class_to_string),
    prim("Class", "attributes", object::class_attributes),
    // Fiber
    static_prim("Fiber", "new(_)", fiber::fiber_new),
    static_prim("Fiber", "abort(_)", fiber::fiber_abort),
    static_prim("Fiber", "current", fiber::fiber_current),
    static_prim("Fiber", "suspend()", fiber::fiber_suspend),
    static_prim("Fiber", "yield()", fiber::fiber_yield),
    static_prim("Fiber", "yield(_)", fiber::fiber_yield1),
    prim("Fiber", "call()", fiber::fiber_call),
    prim("Fiber", "call(_)", fiber::fiber_call1),
    prim("Fiber", "error", fiber::fiber_error),
    prim("Fiber", "isDone", fiber::fiber_is_done),
    prim("Fiber", "transfer()", fiber::fiber_transfer),
    prim("Fiber", "transfer(_)", fiber::fiber_transfer1),
    prim("Fiber", "transferError(_)", fiber::fiber_transfer_error),
    prim("Fiber", "try()", fiber::fiber_try),
    prim("Fiber", "try(_)", fiber::fiber_try1),
    // Fn
    static_prim("Fn", "new(_)", fn_::fn_new),
    prim("Fn", "arity", fn_::fn_arity),
    prim("Fn", "toString", fn_::fn_to_string),
    fn_call("call()"),
    fn_call("call(_)"),
    fn_call("call(_,_)"),
    fn_call("call(_,_,_)"),
    fn_call("call(_,_,_,_)"),
    fn_call("call(_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_,_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_,_,_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_,_,_,_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_,_,_,_,_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_,_,_,_,_,_,_,_,_,_)"),
    fn_call("call(_,_,_,_,_,_,_,_,_,_,_,_,_,_,_,_)"),
    // Null
    prim("Null", "!", object::null_not),
    prim("Null", "toString", object::null_to_string),
    // Num
    static_prim("Num", "fromString(_)", num::num_from_string),
    static_prim("Num", "infinity", num::num_infinity),
    static_prim("Num", "nan", num::num_nan),
    static_prim("Num", "pi", num::num_pi),
    static_prim("Num", "tau", num::num_tau),
    static_prim("Num", "largest", num::num_largest),
    static_prim("Num", "smallest", num::num_smallest),
    static_prim("Num", "maxSafeInteger", num::num_max_safe_integer),
    static_prim("Num", "minSafeInteger", num::num_min_safe_integer),
    prim("Num", "-(_)", num::num_minus),
    prim("Num", "+(_)", num::num_plus),
    prim("Num", "*(_)", num::num_multiply),
    prim("Num", "/(_)", num::num_divide),
    prim("Num", "%(_)", num::num_mod),
    prim("Num", "<(_)", num::num_lt),
    prim("Num", ">(_)", num::num_gt),
    prim("Num", "<=(_)", num::num_le),
    prim("Num", ">=(_)", num::num_ge),
    prim("Num", "&(_)", num::num_bitwise_and),
    prim("Num", "|(_)", num::num_bitwise_or),
    prim("Num", "^(_)", num::num_bitwise_xor),
    prim("Num", "<<(_)", num::num_shl),
    prim("Num", ">>(_)", num::num_shr),
    prim("Num", "~", num::num_bitwise_not),
    prim("Num", "-", num::num_negate),
    prim("Num", "..(_)", num::num_dotdot),
    prim("Num", "...(_)", num::num_dotdotdot),
    prim("Num", "abs", num::num_abs),
    prim("Num", "acos", num::num_acos),
    prim("Num", "asin", num::num_asin),
    prim("Num", "atan", num::num_atan),
    prim("Num", "atan(_)", num::num_atan2),
    prim("Num", "cbrt", num::num_cbrt),
    prim("Num", "ceil", num::num_ceil),
    prim("Num", "cos", num::num_cos),
    prim("Num", "exp", num::num_exp),
    prim("Num", "floor", num::num_floor),
    prim("Num", "fraction", num::num_fraction),
    prim("Num", "isInfinity", num::num_is_infinity),
    prim("Num", "isInteger", num::num_is_integer),
    prim("Num", "isNan", num::num_is_nan),
    prim("Num", "log", num::num_log),
    prim("Num", "log2", num::num_log2),
    prim("Num", "min(_)", num::num_min),
    prim("Num", "max(_)", num::num_max),
    prim("Num", "clamp(_,_)", num::num_clamp),
    prim("Num", "pow(_)", num::num_pow),
    prim("Num", "round", num::num_round),
    prim("Num", "sign", num::num_sign),
    prim("Num", "sin", num::num_sin),
    prim("Num", "sqrt", num::num_sqrt),
    prim("Num", "tan", num::num_tan),
    prim("Num", "truncate", num::num_truncate),
    prim("Num", "toString", num::num_to_string_prim),
    prim("Num", "==(_)", num::num_eqeq),
    prim("Num", "!=(_)", num::num_bangeq),
    // Object
    static_prim("Object", "same(_,_)", object::object_same),
    prim("Object", "!", object::object_not),
    prim("Object", "==(_)", object::object_eqeq),
    prim("Object", "!=(_)", object::object_bangeq),
    prim("Object", "is(_)", object::object_is),
    prim("Object", "toString", object::object_to_string),
    prim("Object", "type", object::object_type),
    // List
    static_prim("List", "filled(_,_)", list::list_filled),
    static_prim("List", "new()", list::list_new),
    prim("List", "[_]", list::list_subscript),
    prim("List", "[_]=(_)", list::list_subscript_setter),
    prim("List", "add(_)", list::list_add),
    prim("List", "addCore_(_)", list::list_add_core),
    prim("List", "clear()", list::list_clear),
    prim("List", "count", list::list_count),
    prim("List", "insert(_,_)", list::list_insert),
    prim("List", "iterate(_)", list::list_iterate),
    prim("List", "iteratorValue(_)", list::list_iterator_value),
    prim("List", "removeAt(_)", list::list_remove_at),
    prim("List", "remove(_)", list::list_remove_value),
    prim("List", "indexOf(_)", list::list_index_of),
    prim("List", "swap(_,_)", list::list_swap),
    // Map
    static_prim("Map", "new()", map::map_new),
    prim("Map", "[_]", map::map_subscript),
    prim("Map", "[_]=(_)", map::map_subscript_setter),
    prim("Map", "addCore_(_,_)", map::map_add_core),
    prim("Map", "clear()", map::map_clear),
    prim("Map", "containsKey(_)", map::map_contains_key),
    prim("Map", "count", map::map_count),
    prim("Map", "remove(_)", map::map_remove),
    prim("Map", "iterate(_)", map::map_iterate),
    prim("Map", "keyIteratorValue_(_)", map::map_key_iterator_value),
    prim("Map", "valueIteratorValue_(_)", map::map_value_iterator_value),
    // Range
    prim("Range", "from", range::range_from),
    prim("Range", "to", range::range_to),
    prim("Range", "min", range::range_min),
    prim("Range", "max", range::range_max),
    prim("Range", "isInclusive", range::range_is_inclusive),
    prim("Range", "iterate(_)", range::range_iterate),
    prim("Range", "iteratorValue(_)", range::range_iterator_value),
    prim("Range", "toString", range::range_to_string),
    // String
    static_prim("String", "fromCodePoint(_)", string::string_from_code_point),
    static_prim("String", "fromByte(_)", string::string_from_byte),
    prim("String", "+(_)", string::string_plus),
    prim("String", "[_]", string::string_subscript),
    prim("String", "byteAt_(_)", string::string_byte_at),
    prim("String", "byteCount_", string::string_byte_count),
    prim("String", "codePointAt_(_)", string::string_code_point_at),
    prim("String", "contains(_)", string::string_contains),
    prim("String", "count", string::string_count),
    prim("String", "endsWith(_)", string::string_ends_with),
    prim("String", "indexOf(_)", string::string_index_of1),
    prim("String", "indexOf(_,_)", string::string_index_of2),
    prim("String", "iterate(_)", string::string_iterate),
    prim("String", "iterateByte_(_)", string::string_iterate_byte),
    prim("String", "iteratorValue(_)", string::string_iterator_value),
    prim("String", "startsWith(_)", string::string_starts_with),
    prim("String", "toString", string::string_to_string),
    prim("String", "$(_)", string::string_dollar),
    // System
    static_prim("System", "clock", system::system_clock),
    static_prim("System", "gc()", system::system_gc),
    static_prim("System", "writeString_(_)", system::system_write_string),
];

/// Bind every table entry for `class_name` into the class's method table,
/// or its metaclass's for class-side entries.
pub fn register_class_primitives(vm: &mut Vm, class_name: &str, class: ObjectId) {
    for entry in PRIMITIVES.iter().filter(|e| e.class_name == class_name) {
        let symbol = vm.method_names.ensure(entry.signature);
        let target = if entry.on_metaclass {
            match vm.heap.get(class).class {
                Some(metaclass) => metaclass,
                // No metaclass yet; bootstrap registers again once the
                // wiring exists.
                None => continue,
            }
        } else {
            class
        };
        let method = match entry.kind {
            EntryKind::Primitive(func) => Method::Primitive(func),
            EntryKind::FunctionCall => Method::FunctionCall,
        };
        classes::bind_method(vm, target, symbol, method);
    }
}
