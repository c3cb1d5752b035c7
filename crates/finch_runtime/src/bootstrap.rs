//! Core-module initialization.
//!
//! Builds the Object/Class/Object-metaclass triangle natively, interprets
//! the embedded bootstrap source that declares the remaining built-in
//! classes, attaches primitives from the registration table, and finally
//! repairs the class pointers of objects created before their class
//! existed.

use crate::classes;
use crate::interpret::{self, InterpretResult};
use crate::objects::Obj;
use crate::registry;
use crate::vm::Vm;
use finch_core::{ObjectId, Text, Value};

/// Declarations for every built-in class that is not part of the bootstrap
/// triangle. Method bodies come from the primitive table, not from here.
pub(crate) const BOOTSTRAP_SOURCE: &str = "\
// The built-in classes, declared in the language itself.
class Bool {}
class Fiber {}
class Fn {}
class Null {}
class Num {}
class String {}
class List {}
class Map {}
class Range {}
class System {}
";

pub fn initialize_core(vm: &mut Vm) -> Result<(), String> {
    // The core module registers under the null key.
    let core_module = vm.ensure_module(None);

    // Object, the root: a single class with no superclass. Its instance
    // primitives go in before anything inherits from it, because binding a
    // superclass copies the method table.
    let object = classes::new_single_class(vm, 0, Text::from_str("Object"));
    vm.core.object = Some(object);
    vm.define_variable(core_module, "Object", Value::obj(object))?;
    registry::register_class_primitives(vm, "Object", object);

    // Class, a subclass of Object.
    let class = classes::new_single_class(vm, 0, Text::from_str("Class"));
    vm.core.class = Some(class);
    vm.define_variable(core_module, "Class", Value::obj(class))?;
    classes::bind_superclass(vm, class, object);
    registry::register_class_primitives(vm, "Class", class);

    // The metaclass triangle: Object's class is "Object metaclass", whose
    // class is Class, whose class is itself.
    let object_metaclass =
        classes::new_single_class(vm, 0, Text::from_str("Object metaclass"));
    vm.core.object_metaclass = Some(object_metaclass);
    vm.define_variable(core_module, "Object metaclass", Value::obj(object_metaclass))?;
    vm.heap.get_mut(object).class = Some(object_metaclass);
    vm.heap.get_mut(object_metaclass).class = Some(class);
    vm.heap.get_mut(class).class = Some(class);
    classes::bind_superclass(vm, object_metaclass, class);

    // Now that Object has a metaclass, its class-side primitives can bind.
    registry::register_class_primitives(vm, "Object", object);

    // Declare the remaining built-ins by interpreting the embedded source.
    // Any failure here is fatal.
    match interpret::interpret(vm, None, BOOTSTRAP_SOURCE) {
        InterpretResult::Success => {}
        InterpretResult::CompileError => {
            return Err("core bootstrap source failed to compile".to_string());
        }
        InterpretResult::RuntimeError => {
            return Err("core bootstrap source failed to run".to_string());
        }
    }

    // Attach primitives to each declared class.
    vm.core.bool_ = Some(attach(vm, core_module, "Bool")?);
    vm.core.fiber = Some(attach(vm, core_module, "Fiber")?);
    vm.core.fn_ = Some(attach(vm, core_module, "Fn")?);
    vm.core.null = Some(attach(vm, core_module, "Null")?);
    vm.core.num = Some(attach(vm, core_module, "Num")?);
    vm.core.string = Some(attach(vm, core_module, "String")?);
    vm.core.list = Some(attach(vm, core_module, "List")?);
    vm.core.map = Some(attach(vm, core_module, "Map")?);
    vm.core.range = Some(attach(vm, core_module, "Range")?);
    vm.core.system = Some(attach(vm, core_module, "System")?);

    repair_orphan_classes(vm);
    Ok(())
}

/// Look up a class the bootstrap source declared and bind its primitives.
fn attach(vm: &mut Vm, core_module: ObjectId, name: &str) -> Result<ObjectId, String> {
    let value = vm
        .module_variable(core_module, name)
        .ok_or_else(|| format!("core bootstrap did not declare '{name}'"))?;
    if !(value.is_obj() && vm.heap.get(value.as_obj_id()).is_class()) {
        return Err(format!("core module variable '{name}' is not a class"));
    }
    let class = value.as_obj_id();
    registry::register_class_primitives(vm, name, class);
    Ok(class)
}

/// Objects allocated before their class existed carry a null class
/// pointer: strings made ahead of the String class, and modules made ahead
/// of Object. One pass over the object list fixes both, establishing the
/// every-object-has-a-class invariant.
fn repair_orphan_classes(vm: &mut Vm) {
    let string_class = vm.core.string;
    let object_class = vm.core.object;
    let ids: Vec<ObjectId> = vm.heap.live_ids().collect();
    for id in ids {
        let slot = vm.heap.get(id);
        if slot.class.is_some() {
            continue;
        }
        let repaired = match slot.obj {
            Obj::Str(_) => string_class,
            Obj::Module(_) => object_class,
            _ => None,
        };
        if repaired.is_some() {
            vm.heap.get_mut(id).class = repaired;
        }
    }
}
