//! Class construction, superclass binding, and metaclass wiring.

use crate::objects::{Method, Obj, ObjClass};
use crate::vm::Vm;
use finch_core::{ObjectId, Text, Value};

/// Create a lone class with no superclass and no metaclass wiring. The
/// caller is responsible for setting the header's class pointer.
pub fn new_single_class(vm: &mut Vm, num_fields: usize, name: Text) -> ObjectId {
    vm.alloc_obj(
        None,
        Obj::Class(ObjClass {
            name,
            superclass: None,
            methods: Vec::new(),
            num_fields,
            attributes: Value::NULL,
        }),
    )
}

/// Make `superclass` the superclass of `subclass`, copying the method table
/// so lookup stays O(1) by signature index; later binds replace slots in
/// place. Also inherits the superclass's field count.
pub fn bind_superclass(vm: &mut Vm, subclass: ObjectId, superclass: ObjectId) {
    let (methods, super_fields) = {
        let sup = vm.heap.get(superclass).as_class();
        (sup.methods.clone(), sup.num_fields)
    };
    let sub = vm.heap.get_mut(subclass).as_class_mut();
    sub.superclass = Some(superclass);
    sub.num_fields += super_fields;
    sub.methods = methods;
}

/// Create a class and its metaclass. The metaclass is a subclass of the
/// superclass's metaclass, so the metaclass hierarchy parallels the class
/// hierarchy and class-side methods inherit; its own class is Class,
/// closing the triangle.
pub fn new_class(vm: &mut Vm, superclass: ObjectId, num_fields: usize, name: Text) -> ObjectId {
    let metaclass_name = name.concat(" metaclass");
    let metaclass = new_single_class(vm, 0, metaclass_name);
    vm.heap.get_mut(metaclass).class = vm.core.class;

    // Keep the metaclass alive while the class itself is allocated.
    vm.push_root(Value::obj(metaclass));
    let metaclass_super = vm.heap.get(superclass).class.or(vm.core.class);
    if let Some(metaclass_super) = metaclass_super {
        bind_superclass(vm, metaclass, metaclass_super);
    }

    let class = new_single_class(vm, num_fields, name);
    vm.heap.get_mut(class).class = Some(metaclass);
    bind_superclass(vm, class, superclass);
    vm.pop_root();

    class
}

/// Bind `method` into `class`'s table at `symbol`, padding intermediate
/// slots with the absent marker.
pub fn bind_method(vm: &mut Vm, class: ObjectId, symbol: usize, method: Method) {
    let c = vm.heap.get_mut(class).as_class_mut();
    if symbol >= c.methods.len() {
        c.methods.resize(symbol + 1, Method::None);
    }
    c.methods[symbol] = method;
}

/// Create a class from a declaration and define it as a module variable,
/// as the interpreter does for a `class` statement. `superclass` must be a
/// class value.
pub fn define_class(
    vm: &mut Vm,
    module: ObjectId,
    name: &str,
    superclass: Value,
) -> Result<ObjectId, String> {
    if !superclass.is_obj() || !vm.heap.get(superclass.as_obj_id()).is_class() {
        return Err(format!(
            "Class '{name}' cannot inherit from a non-class object."
        ));
    }
    let class = new_class(vm, superclass.as_obj_id(), 0, Text::from_str(name));
    vm.push_root(Value::obj(class));
    let defined = vm.define_variable(module, name, Value::obj(class));
    vm.pop_root();
    defined?;
    Ok(class)
}

/// Walk the superclass chain of `class` looking for `target`.
pub fn is_subclass_of(vm: &Vm, class: ObjectId, target: ObjectId) -> bool {
    let mut current = Some(class);
    while let Some(id) = current {
        if id == target {
            return true;
        }
        current = vm.heap.get(id).as_class().superclass;
    }
    false
}
