//! Heap management and mark/sweep collection.
//!
//! Objects live in a slot vector; a slot index is the `ObjectId`. The slot
//! vector together with the free list plays the role the all-objects list
//! plays in a pointer-based runtime: sweep walks every slot. Mark state is
//! a side bitset, one bit per slot.

use crate::objects::{Method, Obj, ObjUpvalue};
use finch_core::{ObjectId, Value};

/// A heap object: the payload plus its header. The class pointer is `None`
/// only transiently, for objects created before their class exists during
/// bootstrap; the bootstrap's final pass repairs those.
pub struct HeapObj {
    pub class: Option<ObjectId>,
    pub obj: Obj,
}

macro_rules! typed_accessor {
    ($name:ident, $name_mut:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> &$ty {
            match &self.obj {
                Obj::$variant(inner) => inner,
                other => panic!(concat!("expected ", stringify!($variant), ", found {}"), other.kind_name()),
            }
        }

        pub fn $name_mut(&mut self) -> &mut $ty {
            match &mut self.obj {
                Obj::$variant(inner) => inner,
                other => panic!(concat!("expected ", stringify!($variant), ", found {}"), other.kind_name()),
            }
        }
    };
}

/// Typed views of the payload. These are used after dispatch or validation
/// has already established the kind, so a mismatch is a runtime bug.
impl HeapObj {
    typed_accessor!(as_string, as_string_mut, Str, crate::objects::ObjString);
    typed_accessor!(as_list, as_list_mut, List, Vec<Value>);
    typed_accessor!(as_map, as_map_mut, Map, crate::objects::ObjMap);
    typed_accessor!(as_range, as_range_mut, Range, crate::objects::ObjRange);
    typed_accessor!(as_module, as_module_mut, Module, crate::objects::ObjModule);
    typed_accessor!(as_fn, as_fn_mut, Fn, crate::objects::ObjFn);
    typed_accessor!(as_closure, as_closure_mut, Closure, crate::objects::ObjClosure);
    typed_accessor!(as_upvalue, as_upvalue_mut, Upvalue, ObjUpvalue);
    typed_accessor!(as_class, as_class_mut, Class, crate::objects::ObjClass);
    typed_accessor!(as_instance, as_instance_mut, Instance, crate::objects::ObjInstance);
    typed_accessor!(as_fiber, as_fiber_mut, Fiber, crate::objects::ObjFiber);

    pub fn is_string(&self) -> bool {
        matches!(self.obj, Obj::Str(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self.obj, Obj::Class(_))
    }

    pub fn is_closure(&self) -> bool {
        matches!(self.obj, Obj::Closure(_))
    }

    pub fn is_fiber(&self) -> bool {
        matches!(self.obj, Obj::Fiber(_))
    }

    pub fn is_range(&self) -> bool {
        matches!(self.obj, Obj::Range(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.obj, Obj::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self.obj, Obj::Map(_))
    }
}

pub struct Heap {
    objects: Vec<Option<HeapObj>>,
    free_list: Vec<usize>,
    marks: Vec<u64>,
    alloc_bytes: usize,
    gc_threshold_bytes: usize,
    min_heap_bytes: usize,
    growth_percent: usize,
}

impl Heap {
    pub fn with_tuning(initial_heap: usize, min_heap: usize, growth_percent: usize) -> Self {
        Self {
            objects: Vec::with_capacity(1024),
            free_list: Vec::new(),
            marks: Vec::new(),
            alloc_bytes: 0,
            gc_threshold_bytes: initial_heap.max(min_heap),
            min_heap_bytes: min_heap,
            growth_percent,
        }
    }

    /// Allocate a heap object. Collection is the caller's concern: the VM
    /// collects before this runs, so values referenced only by the new
    /// payload must already be rooted by then.
    pub fn alloc(&mut self, class: Option<ObjectId>, obj: Obj) -> ObjectId {
        self.alloc_bytes += obj.size();
        let slot = HeapObj { class, obj };
        if let Some(id) = self.free_list.pop() {
            self.objects[id] = Some(slot);
            ObjectId(id)
        } else {
            let id = self.objects.len();
            self.objects.push(Some(slot));
            ObjectId(id)
        }
    }

    #[inline]
    pub fn should_gc(&self) -> bool {
        self.alloc_bytes >= self.gc_threshold_bytes
    }

    pub fn get(&self, id: ObjectId) -> &HeapObj {
        self.objects[id.0]
            .as_ref()
            .expect("object was garbage collected")
    }

    pub fn get_mut(&mut self, id: ObjectId) -> &mut HeapObj {
        self.objects[id.0]
            .as_mut()
            .expect("object was garbage collected")
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        id.0 < self.objects.len() && self.objects[id.0].is_some()
    }

    /// Ids of all live objects, for whole-heap passes (bootstrap repair,
    /// invariant checks).
    pub fn live_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| ObjectId(i))
    }

    pub fn live_count(&self) -> usize {
        self.objects.iter().filter(|slot| slot.is_some()).count()
    }

    fn is_marked(&self, id: ObjectId) -> bool {
        let word = id.0 >> 6;
        let bit = id.0 & 63;
        self.marks.get(word).is_some_and(|w| (w & (1 << bit)) != 0)
    }

    /// Set the mark bit; returns false if it was already set.
    fn set_mark(&mut self, id: ObjectId) -> bool {
        let word = id.0 >> 6;
        let bit = id.0 & 63;
        if word >= self.marks.len() {
            self.marks.resize(word + 1, 0);
        }
        let w = &mut self.marks[word];
        let mask = 1 << bit;
        if (*w & mask) != 0 {
            return false;
        }
        *w |= mask;
        true
    }

    /// Mark everything reachable from `roots` using an explicit gray
    /// worklist; cycles (metaclass triangle, fiber caller chains) are
    /// handled by the mark bits.
    pub fn mark_from(&mut self, roots: &[Value]) {
        self.marks.clear();

        let mut gray: Vec<ObjectId> = Vec::with_capacity(64);
        for root in roots {
            if root.is_obj() {
                gray.push(root.as_obj_id());
            }
        }

        while let Some(id) = gray.pop() {
            if !self.contains(id) || !self.set_mark(id) {
                continue;
            }
            let Some(slot) = self.objects[id.0].as_ref() else {
                continue;
            };
            if let Some(class) = slot.class {
                gray.push(class);
            }
            let mut push_value = |gray: &mut Vec<ObjectId>, v: Value| {
                if v.is_obj() {
                    gray.push(v.as_obj_id());
                }
            };
            match &slot.obj {
                Obj::Str(_) | Obj::Foreign(_) => {}
                Obj::List(items) => {
                    for v in items {
                        push_value(&mut gray, *v);
                    }
                }
                Obj::Map(map) => {
                    for (key, v) in &map.entries {
                        if let crate::objects::MapKey::Class(class) = key {
                            gray.push(*class);
                        }
                        push_value(&mut gray, *v);
                    }
                }
                Obj::Range(_) => {}
                Obj::Module(module) => {
                    for v in &module.variables {
                        push_value(&mut gray, *v);
                    }
                }
                Obj::Fn(func) => {
                    gray.push(func.module);
                    for v in &func.constants {
                        push_value(&mut gray, *v);
                    }
                }
                Obj::Closure(closure) => {
                    gray.push(closure.func);
                    for upvalue in &closure.upvalues {
                        gray.push(*upvalue);
                    }
                }
                Obj::Upvalue(upvalue) => match upvalue {
                    ObjUpvalue::Open { fiber, .. } => gray.push(*fiber),
                    ObjUpvalue::Closed(v) => push_value(&mut gray, *v),
                },
                Obj::Class(class) => {
                    if let Some(superclass) = class.superclass {
                        gray.push(superclass);
                    }
                    push_value(&mut gray, class.attributes);
                    for method in &class.methods {
                        if let Method::Block(closure) = method {
                            gray.push(*closure);
                        }
                    }
                }
                Obj::Instance(instance) => {
                    for v in &instance.fields {
                        push_value(&mut gray, *v);
                    }
                }
                Obj::Fiber(fiber) => {
                    for v in &fiber.stack {
                        push_value(&mut gray, *v);
                    }
                    for frame in &fiber.frames {
                        gray.push(frame.closure);
                    }
                    for upvalue in &fiber.open_upvalues {
                        gray.push(*upvalue);
                    }
                    if let Some(caller) = fiber.caller {
                        gray.push(caller);
                    }
                    push_value(&mut gray, fiber.error);
                }
            }
        }
    }

    /// Free unmarked slots and retune the collection threshold.
    pub fn sweep(&mut self) {
        let mut live_bytes = 0;

        self.free_list.clear();
        for i in 0..self.objects.len() {
            match &self.objects[i] {
                Some(slot) if self.is_marked(ObjectId(i)) => {
                    live_bytes += slot.obj.size();
                }
                Some(_) => {
                    self.objects[i] = None;
                    self.free_list.push(i);
                }
                None => {
                    self.free_list.push(i);
                }
            }
        }

        // Drop trailing empty slots so the heap can shrink.
        while self.objects.last().is_some_and(|o| o.is_none()) {
            self.objects.pop();
        }
        let new_len = self.objects.len();
        self.free_list.retain(|&i| i < new_len);

        self.marks.clear();
        self.alloc_bytes = live_bytes;
        self.gc_threshold_bytes =
            (live_bytes + live_bytes * self.growth_percent / 100).max(self.min_heap_bytes);
    }
}
