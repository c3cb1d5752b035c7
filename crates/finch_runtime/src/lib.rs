//! The finch runtime core: uniform tagged values, a single-inheritance
//! object system with metaclasses, cooperative fibers, and the native
//! primitives behind the built-in classes.
//!
//! The compiler and the bytecode interpreter loop are external
//! collaborators; `interpret` holds the contract the core consumes from
//! them plus the declaration subset that runs the embedded bootstrap.

pub mod bootstrap;
pub mod classes;
pub mod config;
pub mod errors;
pub mod heap;
pub mod interpret;
pub mod objects;
mod primitives;
pub mod registry;
pub mod utf8;
pub mod vm;

pub use config::{Clock, ErrorKind, ForeignClassMethods, SystemClock, VmConfig};
pub use finch_core::{ObjectId, Text, Value};
pub use heap::{Heap, HeapObj};
pub use interpret::{interpret, InterpretResult};
pub use objects::{
    CallFrame, FiberState, ForeignFn, Method, Obj, ObjClass, ObjClosure, ObjFiber, ObjFn,
    ObjInstance, ObjMap, ObjModule, ObjRange, ObjString, ObjUpvalue, PrimitiveFn,
};
pub use vm::{CoreClasses, Dispatch, SymbolTable, Vm};
