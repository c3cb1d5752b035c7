//! Heap object kinds.
//!
//! Every heap object lives in a slot of the runtime heap together with a
//! header naming its class (see `heap`). The payload is one of the twelve
//! kinds below.

use crate::utf8;
use crate::vm::Vm;
use finch_core::{FastHashMap, ObjectId, Text, Value};
use std::hash::Hasher;
use std::rc::Rc;

/// Native method: `args[0]` is the receiver, `args[1..]` the arguments.
/// Returns true when the result has been written into `args[0]`; false when
/// a fiber switch is pending or an error was recorded on the current fiber.
pub type PrimitiveFn = fn(&mut Vm, &mut [Value]) -> bool;

/// Host-provided method with the same calling convention.
pub type ForeignFn = fn(&mut Vm, &mut [Value]) -> bool;

/// One slot of a class's method table.
#[derive(Clone, Copy)]
pub enum Method {
    /// The interpreter must never dispatch through this: lookup treats it
    /// as method-not-found.
    None,
    /// Native method executed inline on the fiber stack.
    Primitive(PrimitiveFn),
    /// `Fn.call(...)`: the dispatcher checks arity and pushes a call frame
    /// for the receiver closure itself.
    FunctionCall,
    /// Host-provided method.
    Foreign(ForeignFn),
    /// Closure compiled from script source.
    Block(ObjectId),
}

/// Immutable byte string with its hash computed at construction. The bytes
/// are *interpreted* as UTF-8 for code-point operations but are not
/// guaranteed to be valid UTF-8 (`String.fromByte` can produce lone bytes).
pub struct ObjString {
    bytes: Box<[u8]>,
    hash: u64,
}

impl ObjString {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mut hasher = ahash::AHasher::default();
        hasher.write(&bytes);
        Self {
            bytes: bytes.into_boxed_slice(),
            hash: hasher.finish(),
        }
    }

    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn code_point_count(&self) -> usize {
        utf8::count_code_points(&self.bytes)
    }

    /// Lossy view for host-facing output (error reporting, write sink).
    pub fn to_display_string(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn eq_content(&self, other: &ObjString) -> bool {
        self.hash == other.hash && self.bytes == other.bytes
    }
}

pub struct ObjRange {
    pub from: f64,
    pub to: f64,
    pub is_inclusive: bool,
}

impl ObjRange {
    pub fn min(&self) -> f64 {
        self.from.min(self.to)
    }

    pub fn max(&self) -> f64 {
        self.from.max(self.to)
    }
}

/// Named variable table. The core module's name is `None`.
pub struct ObjModule {
    pub name: Option<Text>,
    pub variable_names: Vec<Text>,
    pub variables: Vec<Value>,
}

impl ObjModule {
    pub fn new(name: Option<Text>) -> Self {
        Self {
            name,
            variable_names: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn find_variable(&self, name: &str) -> Option<usize> {
        self.variable_names.iter().position(|n| n == name)
    }
}

/// Compiled function: bytecode plus the metadata the interpreter and the
/// fiber machinery need. The compiler that fills `code` and `constants` is
/// an external collaborator.
pub struct ObjFn {
    pub code: Vec<u8>,
    pub constants: Vec<Value>,
    pub module: ObjectId,
    pub max_slots: usize,
    pub num_upvalues: usize,
    pub arity: usize,
    pub name: Text,
}

/// A function together with its captured upvalues.
pub struct ObjClosure {
    pub func: ObjectId,
    pub upvalues: Vec<ObjectId>,
}

/// Indirection to an outer local: open while the owning frame is live on
/// some fiber stack, closed (owning the value) after the frame returns.
pub enum ObjUpvalue {
    Open { fiber: ObjectId, slot: usize },
    Closed(Value),
}

pub struct ObjClass {
    pub name: Text,
    pub superclass: Option<ObjectId>,
    /// Dense method table indexed by signature symbol.
    pub methods: Vec<Method>,
    pub num_fields: usize,
    pub attributes: Value,
}

impl ObjClass {
    pub fn method(&self, symbol: usize) -> Method {
        self.methods.get(symbol).copied().unwrap_or(Method::None)
    }
}

pub struct ObjInstance {
    pub fields: Vec<Value>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FiberState {
    /// The root fiber of an `interpret` call; cannot itself be called.
    Root,
    /// An ordinary fiber.
    Other,
    /// A runtime error aborts this fiber and is returned to the caller as
    /// the result of `try()` instead of unwinding further.
    Try,
}

pub struct CallFrame {
    pub closure: ObjectId,
    pub ip: usize,
    /// Index into the fiber's value stack where this frame's slots begin.
    pub stack_start: usize,
}

pub struct ObjFiber {
    pub stack: Vec<Value>,
    pub frames: Vec<CallFrame>,
    /// Open upvalues pointing into `stack`, in slot order.
    pub open_upvalues: Vec<ObjectId>,
    /// The fiber that called this one, if it was entered with `call`/`try`.
    pub caller: Option<ObjectId>,
    /// Null means no error; any other value means the fiber has aborted.
    pub error: Value,
    pub state: FiberState,
}

impl ObjFiber {
    pub fn has_error(&self) -> bool {
        !self.error.is_null()
    }

    pub fn is_done(&self) -> bool {
        self.frames.is_empty() || self.has_error()
    }
}

/// Opaque host data attached to a foreign class instance.
pub struct ObjForeign {
    pub data: Vec<u8>,
}

/// Map key: restricted to value types so keys can embed their own hash and
/// content and never need heap access for equality.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Null,
    Bool(bool),
    /// Bit pattern of the (NaN-normalized) number.
    Num(u64),
    Range {
        from: u64,
        to: u64,
        is_inclusive: bool,
    },
    Class(ObjectId),
    Str {
        hash: u64,
        bytes: Rc<[u8]>,
    },
}

pub struct ObjMap {
    pub entries: FastHashMap<MapKey, Value>,
}

impl ObjMap {
    pub fn new() -> Self {
        Self {
            entries: finch_core::fast_map_new(),
        }
    }
}

impl Default for ObjMap {
    fn default() -> Self {
        Self::new()
    }
}

pub enum Obj {
    Str(ObjString),
    List(Vec<Value>),
    Map(ObjMap),
    Range(ObjRange),
    Module(ObjModule),
    Fn(ObjFn),
    Closure(ObjClosure),
    Upvalue(ObjUpvalue),
    Class(ObjClass),
    Instance(ObjInstance),
    Fiber(ObjFiber),
    Foreign(ObjForeign),
}

impl Obj {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Obj::Str(_) => "string",
            Obj::List(_) => "list",
            Obj::Map(_) => "map",
            Obj::Range(_) => "range",
            Obj::Module(_) => "module",
            Obj::Fn(_) => "function",
            Obj::Closure(_) => "closure",
            Obj::Upvalue(_) => "upvalue",
            Obj::Class(_) => "class",
            Obj::Instance(_) => "instance",
            Obj::Fiber(_) => "fiber",
            Obj::Foreign(_) => "foreign",
        }
    }

    /// Estimated retained size, used for collector pacing.
    pub fn size(&self) -> usize {
        let base = std::mem::size_of::<Obj>();
        let value = std::mem::size_of::<Value>();
        let deep = match self {
            Obj::Str(s) => s.len(),
            Obj::List(items) => items.capacity() * value,
            Obj::Map(m) => m.entries.capacity() * (std::mem::size_of::<MapKey>() + value),
            Obj::Range(_) => 0,
            Obj::Module(m) => {
                m.variables.capacity() * value
                    + m.variable_names.iter().map(|n| n.len()).sum::<usize>()
            }
            Obj::Fn(f) => f.code.capacity() + f.constants.capacity() * value,
            Obj::Closure(c) => c.upvalues.capacity() * std::mem::size_of::<ObjectId>(),
            Obj::Upvalue(_) => 0,
            Obj::Class(c) => c.methods.capacity() * std::mem::size_of::<Method>() + c.name.len(),
            Obj::Instance(i) => i.fields.capacity() * value,
            Obj::Fiber(f) => {
                f.stack.capacity() * value
                    + f.frames.capacity() * std::mem::size_of::<CallFrame>()
            }
            Obj::Foreign(f) => f.data.capacity(),
        };
        base + deep
    }
}
