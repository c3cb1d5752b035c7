//! The `Vm` aggregate: heap, module table, signature symbol table, core
//! class registry, current fiber, host configuration, and the primitive
//! dispatch entry point.

use crate::config::VmConfig;
use crate::heap::Heap;
use crate::interpret;
use crate::objects::{
    CallFrame, FiberState, Method, Obj, ObjClosure, ObjFiber, ObjFn, ObjInstance, ObjModule,
    ObjRange, ObjString,
};
use finch_core::{fast_map_new, FastHashMap, ObjectId, Text, Value};
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Interns method signatures ("call(_)", "+(_)", "iterate(_)") to the dense
/// indices used by every class's method table.
pub struct SymbolTable {
    names: Vec<Text>,
    index: FastHashMap<Text, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            index: fast_map_new(),
        }
    }

    pub fn ensure(&mut self, name: &str) -> usize {
        if let Some(&symbol) = self.index.get(name) {
            return symbol;
        }
        let symbol = self.names.len();
        let text = Text::from_str(name);
        self.names.push(text.clone());
        self.index.insert(text, symbol);
        symbol
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn name(&self, symbol: usize) -> Option<&str> {
        self.names.get(symbol).map(|t| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The classes the runtime itself needs to find. All fields are filled by
/// the time bootstrap completes.
#[derive(Default, Clone, Copy)]
pub struct CoreClasses {
    pub object: Option<ObjectId>,
    pub class: Option<ObjectId>,
    pub object_metaclass: Option<ObjectId>,
    pub bool_: Option<ObjectId>,
    pub num: Option<ObjectId>,
    pub string: Option<ObjectId>,
    pub list: Option<ObjectId>,
    pub map: Option<ObjectId>,
    pub range: Option<ObjectId>,
    pub fn_: Option<ObjectId>,
    pub fiber: Option<ObjectId>,
    pub null: Option<ObjectId>,
    pub system: Option<ObjectId>,
}

impl CoreClasses {
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> {
        [
            self.object,
            self.class,
            self.object_metaclass,
            self.bool_,
            self.num,
            self.string,
            self.list,
            self.map,
            self.range,
            self.fn_,
            self.fiber,
            self.null,
            self.system,
        ]
        .into_iter()
        .flatten()
    }
}

/// Outcome of dispatching one method invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A primitive ran and wrote its result into `args[0]`.
    Complete,
    /// Control moved to another fiber (or the VM went idle), or an error
    /// was recorded on the fiber that made the call.
    Pending,
    /// A call frame was pushed for a closure; execution continues in the
    /// interpreter loop.
    Frame,
    /// The receiver's class has no method for the signature; an error was
    /// recorded on the current fiber.
    NoMethod,
}

pub struct Vm {
    pub heap: Heap,
    /// Module table; the core module registers under `None`. Insertion
    /// order is iteration order, which keeps GC marking deterministic.
    pub modules: IndexMap<Option<Text>, ObjectId>,
    pub method_names: SymbolTable,
    pub core: CoreClasses,
    /// The single currently running fiber, if any.
    pub fiber: Option<ObjectId>,
    pub config: VmConfig,
    temp_roots: SmallVec<[Value; 8]>,
}

impl Vm {
    /// Construct a VM and run the core bootstrap. Any compile or runtime
    /// error during bootstrap is fatal and surfaces here.
    pub fn new(config: VmConfig) -> Result<Self, String> {
        let mut vm = Self {
            heap: Heap::with_tuning(
                config.initial_heap_size,
                config.min_heap_size,
                config.heap_growth_percent,
            ),
            modules: IndexMap::new(),
            method_names: SymbolTable::new(),
            core: CoreClasses::default(),
            fiber: None,
            config,
            temp_roots: SmallVec::new(),
        };
        crate::bootstrap::initialize_core(&mut vm)?;
        Ok(vm)
    }

    // ---- allocation ----

    /// Allocate a heap object, collecting first if the heap has grown past
    /// its threshold. Values reachable only from unfinished structures must
    /// be protected with `push_root` across this call.
    pub fn alloc_obj(&mut self, class: Option<ObjectId>, obj: Obj) -> ObjectId {
        if self.heap.should_gc() {
            self.collect_garbage();
        }
        self.heap.alloc(class, obj)
    }

    pub fn push_root(&mut self, value: Value) {
        self.temp_roots.push(value);
    }

    pub fn pop_root(&mut self) {
        self.temp_roots.pop();
    }

    pub fn collect_garbage(&mut self) {
        let mut roots: Vec<Value> =
            Vec::with_capacity(self.temp_roots.len() + self.modules.len() + 16);
        roots.extend(self.temp_roots.iter().copied());
        for &module in self.modules.values() {
            roots.push(Value::obj(module));
        }
        for class in self.core.iter() {
            roots.push(Value::obj(class));
        }
        if let Some(fiber) = self.fiber {
            roots.push(Value::obj(fiber));
        }
        self.heap.mark_from(&roots);
        self.heap.sweep();
    }

    // ---- constructors ----

    pub fn new_string(&mut self, s: &str) -> Value {
        self.new_string_from_bytes(s.as_bytes().to_vec())
    }

    pub fn new_string_from_bytes(&mut self, bytes: Vec<u8>) -> Value {
        let class = self.core.string;
        Value::obj(self.alloc_obj(class, Obj::Str(ObjString::from_bytes(bytes))))
    }

    pub fn new_list(&mut self, items: Vec<Value>) -> Value {
        let class = self.core.list;
        Value::obj(self.alloc_obj(class, Obj::List(items)))
    }

    pub fn new_range(&mut self, from: f64, to: f64, is_inclusive: bool) -> Value {
        let class = self.core.range;
        Value::obj(self.alloc_obj(
            class,
            Obj::Range(ObjRange {
                from,
                to,
                is_inclusive,
            }),
        ))
    }

    pub fn new_map(&mut self) -> Value {
        let class = self.core.map;
        Value::obj(self.alloc_obj(class, Obj::Map(crate::objects::ObjMap::new())))
    }

    /// Create a fiber ready to run `closure`. The closure value sits in the
    /// implicit receiver slot at the bottom of the stack, and one frame is
    /// set up at the start of the function's code.
    pub fn new_fiber(&mut self, closure: ObjectId) -> ObjectId {
        self.push_root(Value::obj(closure));
        let max_slots = {
            let c = self.heap.get(closure).as_closure();
            self.heap.get(c.func).as_fn().max_slots
        };
        let mut stack = Vec::with_capacity((max_slots + 1).next_power_of_two());
        stack.push(Value::obj(closure));
        let fiber = ObjFiber {
            stack,
            frames: vec![CallFrame {
                closure,
                ip: 0,
                stack_start: 0,
            }],
            open_upvalues: Vec::new(),
            caller: None,
            error: Value::NULL,
            state: FiberState::Other,
        };
        let class = self.core.fiber;
        let fiber = self.alloc_obj(class, Obj::Fiber(fiber));
        self.pop_root();
        fiber
    }

    pub fn new_function(&mut self, func: ObjFn) -> ObjectId {
        let class = self.core.fn_;
        self.alloc_obj(class, Obj::Fn(func))
    }

    /// Wrap a function in a closure with no captured upvalues.
    pub fn new_closure(&mut self, func: ObjectId) -> ObjectId {
        self.push_root(Value::obj(func));
        let class = self.core.fn_;
        let closure = self.alloc_obj(
            class,
            Obj::Closure(ObjClosure {
                func,
                upvalues: Vec::new(),
            }),
        );
        self.pop_root();
        closure
    }

    /// Instantiate `class`, with every field set to null.
    pub fn new_instance(&mut self, class: ObjectId) -> ObjectId {
        self.push_root(Value::obj(class));
        let num_fields = self.heap.get(class).as_class().num_fields;
        let instance = self.alloc_obj(
            Some(class),
            Obj::Instance(ObjInstance {
                fields: vec![Value::NULL; num_fields],
            }),
        );
        self.pop_root();
        instance
    }

    // ---- modules ----

    pub fn core_module(&self) -> Option<ObjectId> {
        self.modules.get(&None).copied()
    }

    pub fn ensure_module(&mut self, name: Option<&str>) -> ObjectId {
        let key = name.map(Text::from_str);
        if let Some(&id) = self.modules.get(&key) {
            return id;
        }
        let class = self.core.object;
        let id = self.alloc_obj(class, Obj::Module(ObjModule::new(key.clone())));
        self.modules.insert(key, id);
        id
    }

    pub fn define_variable(
        &mut self,
        module: ObjectId,
        name: &str,
        value: Value,
    ) -> Result<usize, String> {
        let m = self.heap.get_mut(module).as_module_mut();
        if m.find_variable(name).is_some() {
            return Err(format!("Variable '{name}' is already defined."));
        }
        m.variable_names.push(Text::from_str(name));
        m.variables.push(value);
        Ok(m.variables.len() - 1)
    }

    pub fn module_variable(&self, module: ObjectId, name: &str) -> Option<Value> {
        let m = self.heap.get(module).as_module();
        m.find_variable(name).map(|i| m.variables[i])
    }

    // ---- values ----

    pub fn class_of(&self, value: Value) -> Option<ObjectId> {
        if value.is_num() {
            self.core.num
        } else if value.is_bool() {
            self.core.bool_
        } else if value.is_null() {
            self.core.null
        } else if value.is_obj() {
            self.heap.get(value.as_obj_id()).class
        } else {
            None
        }
    }

    /// Spec equality: identical encoding, or byte-identical strings. Every
    /// other heap object compares by identity.
    pub fn value_eq(&self, a: Value, b: Value) -> bool {
        if a == b {
            return true;
        }
        if !a.is_obj() || !b.is_obj() {
            return false;
        }
        let oa = self.heap.get(a.as_obj_id());
        let ob = self.heap.get(b.as_obj_id());
        match (&oa.obj, &ob.obj) {
            (Obj::Str(x), Obj::Str(y)) => x.eq_content(y),
            _ => false,
        }
    }

    // ---- errors ----

    /// Record a runtime error on the current fiber.
    pub fn fiber_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        let error = self.new_string(&message);
        if let Some(fiber) = self.fiber {
            self.heap.get_mut(fiber).as_fiber_mut().error = error;
        }
    }

    pub fn has_error(&self) -> bool {
        self.fiber
            .map(|f| self.heap.get(f).as_fiber().has_error())
            .unwrap_or(false)
    }

    /// The current fiber's error value (null when there is none).
    pub fn error_value(&self) -> Value {
        self.fiber
            .map(|f| self.heap.get(f).as_fiber().error)
            .unwrap_or(Value::NULL)
    }

    // ---- dispatch ----

    /// Resolve `signature` against the receiver's class and invoke the
    /// bound method. `args[0]` is the receiver.
    pub fn invoke(&mut self, signature: &str, args: &mut [Value]) -> Dispatch {
        match self.method_names.find(signature) {
            Some(symbol) => self.invoke_symbol(symbol, args),
            None => {
                self.no_method_error(args[0], signature);
                Dispatch::NoMethod
            }
        }
    }

    pub fn invoke_symbol(&mut self, symbol: usize, args: &mut [Value]) -> Dispatch {
        debug_assert!(!args.is_empty(), "dispatch needs a receiver");
        // Root the arguments for the duration of the call: primitives may
        // allocate, and in tests the values are not on any fiber stack.
        for &v in args.iter() {
            self.temp_roots.push(v);
        }
        let result = self.invoke_symbol_inner(symbol, args);
        let keep = self.temp_roots.len() - args.len();
        self.temp_roots.truncate(keep);
        result
    }

    fn invoke_symbol_inner(&mut self, symbol: usize, args: &mut [Value]) -> Dispatch {
        let Some(class_id) = self.class_of(args[0]) else {
            let signature = self.signature_name(symbol);
            self.no_method_error(args[0], &signature);
            return Dispatch::NoMethod;
        };
        let method = self.heap.get(class_id).as_class().method(symbol);
        match method {
            Method::None => {
                let signature = self.signature_name(symbol);
                self.no_method_error(args[0], &signature);
                Dispatch::NoMethod
            }
            Method::Primitive(func) => {
                if func(self, args) {
                    Dispatch::Complete
                } else {
                    Dispatch::Pending
                }
            }
            Method::Foreign(func) => {
                if func(self, args) {
                    Dispatch::Complete
                } else {
                    Dispatch::Pending
                }
            }
            Method::FunctionCall => {
                if !interpret::check_arity(self, args[0], args.len()) {
                    return Dispatch::Pending;
                }
                self.begin_closure_call(args[0].as_obj_id(), args)
            }
            Method::Block(closure) => self.begin_closure_call(closure, args),
        }
    }

    /// Push the arguments onto the current fiber's stack and set up a call
    /// frame; the interpreter loop takes it from there.
    fn begin_closure_call(&mut self, closure: ObjectId, args: &[Value]) -> Dispatch {
        let Some(fiber) = self.fiber else {
            return Dispatch::Pending;
        };
        self.heap
            .get_mut(fiber)
            .as_fiber_mut()
            .stack
            .extend_from_slice(args);
        interpret::call_function(self, fiber, closure, args.len());
        Dispatch::Frame
    }

    fn signature_name(&self, symbol: usize) -> String {
        self.method_names
            .name(symbol)
            .unwrap_or("<unknown>")
            .to_string()
    }

    fn no_method_error(&mut self, receiver: Value, signature: &str) {
        let class_name = match self.class_of(receiver) {
            Some(id) => self.heap.get(id).as_class().name.as_str().to_string(),
            None => receiver
                .is_obj()
                .then(|| self.heap.get(receiver.as_obj_id()).obj.kind_name())
                .unwrap_or("value")
                .to_string(),
        };
        self.fiber_error(format!("{class_name} does not implement '{signature}'."));
    }
}
