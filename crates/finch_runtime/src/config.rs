//! Host configuration supplied at VM construction.

use crate::objects::{ForeignFn, PrimitiveFn};
use std::time::Instant;

/// Which kind of failure an `error` callback invocation reports. For
/// `StackTrace`, the line and module identify a frame and the message names
/// the function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Compile,
    Runtime,
    StackTrace,
}

/// Monotonic clock capability behind `System.clock`.
pub trait Clock {
    /// Seconds elapsed since an arbitrary fixed origin.
    fn elapsed_secs(&self) -> f64;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Allocation and teardown hooks for a foreign class. `allocate` runs with
/// the class on the stack as a constructor primitive; `finalize` sees the
/// raw host data right before the instance is swept.
pub struct ForeignClassMethods {
    pub allocate: ForeignFn,
    pub finalize: Option<fn(&mut [u8])>,
}

pub type WriteFn = Box<dyn FnMut(&str)>;
pub type ErrorFn = Box<dyn FnMut(ErrorKind, Option<&str>, i32, &str)>;
pub type ResolveModuleFn = Box<dyn Fn(&str, &str) -> String>;
pub type LoadModuleFn = Box<dyn Fn(&str) -> Option<String>>;
pub type BindForeignMethodFn = Box<dyn Fn(&str, bool, &str) -> Option<ForeignFn>>;
pub type BindForeignClassFn = Box<dyn Fn(&str, &str) -> Option<ForeignClassMethods>>;

pub struct VmConfig {
    /// Sink for `System.writeString_`. Output is dropped when unset.
    pub write: Option<WriteFn>,
    /// Receives compile errors, runtime errors, and stack trace frames.
    pub error: Option<ErrorFn>,
    /// Maps (importer module, import string) to a canonical module name.
    pub resolve_module: Option<ResolveModuleFn>,
    /// Produces source for a module name, or `None` if unknown.
    pub load_module: Option<LoadModuleFn>,
    /// Resolves a `(className, isStatic, signature)` triple to a host
    /// function for foreign methods.
    pub bind_foreign_method: Option<BindForeignMethodFn>,
    /// Resolves a `(moduleName, className)` pair to the allocate/finalize
    /// hooks of a foreign class.
    pub bind_foreign_class: Option<BindForeignClassFn>,
    /// Handler behind `String.$`; the method yields null when unset.
    pub dollar_operator: Option<PrimitiveFn>,
    pub clock: Box<dyn Clock>,
    /// Collector tuning, in bytes / bytes / percent.
    pub initial_heap_size: usize,
    pub min_heap_size: usize,
    pub heap_growth_percent: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            write: None,
            error: None,
            resolve_module: None,
            load_module: None,
            bind_foreign_method: None,
            bind_foreign_class: None,
            dollar_operator: None,
            clock: Box::new(SystemClock::new()),
            initial_heap_size: 10 * 1024 * 1024,
            min_heap_size: 1024 * 1024,
            heap_growth_percent: 50,
        }
    }
}
