use std::cell::RefCell;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObject, JsObjectType, ObjectBase, ObjectType};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::operations::object::{define_own_property, get, get_prototype_of};
use crate::runner::ds::operations::test_and_comparison::is_callable;
use crate::runner::ds::realm::JsCodeRealmType;
use crate::runner::ds::value::JsValue;

/// Host implementation of `[[Call]]`: receives `this` and the argument list.
pub type NativeCallFn = Rc<dyn Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType>>;

/// Host implementation of `[[Construct]]`: receives the argument list and `new.target`.
pub type NativeConstructFn =
    Rc<dyn Fn(Vec<JsValue>, &JsObjectType) -> Result<JsObjectType, JErrorType>>;

pub enum FunctionKind {
    Normal,
    ClassConstructor,
}

pub struct FunctionObjectBase {
    pub name: String,
    pub function_kind: FunctionKind,
    pub object_base: ObjectBase,
}
impl FunctionObjectBase {
    pub fn new(name: String, function_kind: FunctionKind, prototype: Option<JsObjectType>) -> Self {
        FunctionObjectBase {
            name,
            function_kind,
            object_base: ObjectBase::new_with_prototype(prototype),
        }
    }

    pub fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.object_base
    }

    pub fn get_object_base(&self) -> &ObjectBase {
        &self.object_base
    }
}

/// What invoking a function object does, cloned out of the object so that no borrow is
/// held while it runs.
pub enum FunctionBehaviour {
    Native {
        call: Option<NativeCallFn>,
        construct: Option<NativeConstructFn>,
    },
    Bound {
        target: JsObjectType,
        this: JsValue,
        arguments: Vec<JsValue>,
    },
}

pub trait JsFunctionObject: JsObject {
    fn get_function_object_base_mut(&mut self) -> &mut FunctionObjectBase;

    fn get_function_object_base(&self) -> &FunctionObjectBase;

    fn as_js_function_object(&self) -> &dyn JsFunctionObject;

    fn behaviour(&self) -> FunctionBehaviour;
}

pub struct FunctionObject {
    function_object: FunctionObjectBase,
    call: Option<NativeCallFn>,
    construct: Option<NativeConstructFn>,
}
impl FunctionObject {
    pub fn new(
        function_object: FunctionObjectBase,
        call: Option<NativeCallFn>,
        construct: Option<NativeConstructFn>,
    ) -> Self {
        FunctionObject {
            function_object,
            call,
            construct,
        }
    }
}
impl JsObject for FunctionObject {
    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        self.function_object.get_object_base_mut()
    }

    fn get_object_base(&self) -> &ObjectBase {
        self.function_object.get_object_base()
    }

    fn as_js_object(&self) -> &dyn JsObject {
        self
    }

    fn as_js_object_mut(&mut self) -> &mut dyn JsObject {
        self
    }

    fn to_string(&self) -> String {
        match self.function_object.function_kind {
            FunctionKind::ClassConstructor => format!("class {} {{ }}", self.function_object.name),
            FunctionKind::Normal => format!(
                "function {}() {{ [native code] }}",
                self.function_object.name
            ),
        }
    }
}
impl JsFunctionObject for FunctionObject {
    fn get_function_object_base_mut(&mut self) -> &mut FunctionObjectBase {
        &mut self.function_object
    }

    fn get_function_object_base(&self) -> &FunctionObjectBase {
        &self.function_object
    }

    fn as_js_function_object(&self) -> &dyn JsFunctionObject {
        self
    }

    fn behaviour(&self) -> FunctionBehaviour {
        FunctionBehaviour::Native {
            call: self.call.clone(),
            construct: self.construct.clone(),
        }
    }
}

pub struct BoundFunctionObject {
    bound_target_function: JsObjectType,
    bound_this: JsValue,
    bound_arguments: Vec<JsValue>,
    function_object: FunctionObjectBase,
}
impl JsObject for BoundFunctionObject {
    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        self.function_object.get_object_base_mut()
    }

    fn get_object_base(&self) -> &ObjectBase {
        self.function_object.get_object_base()
    }

    fn as_js_object(&self) -> &dyn JsObject {
        self
    }

    fn as_js_object_mut(&mut self) -> &mut dyn JsObject {
        self
    }

    fn to_string(&self) -> String {
        format!(
            "function {}() {{ [native code] }}",
            self.function_object.name
        )
    }
}
impl JsFunctionObject for BoundFunctionObject {
    fn get_function_object_base_mut(&mut self) -> &mut FunctionObjectBase {
        &mut self.function_object
    }

    fn get_function_object_base(&self) -> &FunctionObjectBase {
        &self.function_object
    }

    fn as_js_function_object(&self) -> &dyn JsFunctionObject {
        self
    }

    fn behaviour(&self) -> FunctionBehaviour {
        FunctionBehaviour::Bound {
            target: self.bound_target_function.clone(),
            this: self.bound_this.clone(),
            arguments: self.bound_arguments.clone(),
        }
    }
}

/// Wraps a function object into a `JsObjectType` and gives it its own `name` property.
pub fn function_object_create(f: Box<dyn JsFunctionObject>) -> JsObjectType {
    let name = f.get_function_object_base().name.to_string();
    let fo = Rc::new(RefCell::new(ObjectType::Function(f)));
    define_own_property(
        &fo,
        PropertyKey::from("name"),
        PropertyDescriptor::new_readonly(JsValue::String(name), true),
    );
    fo
}

/// A plain, non-constructible host function.
pub fn create_builtin_function<F>(realm: &JsCodeRealmType, name: &str, f: F) -> JsObjectType
where
    F: Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + 'static,
{
    let call: NativeCallFn = Rc::new(f);
    function_object_create(Box::new(FunctionObject::new(
        FunctionObjectBase::new(
            name.to_string(),
            FunctionKind::Normal,
            Some(realm.function_prototype()),
        ),
        Some(call),
        None,
    )))
}

/// The target of a bound function, if `f` is one.
pub fn bound_target_function(f: &JsObjectType) -> Option<JsObjectType> {
    match &*f.borrow() {
        ObjectType::Function(func) => match func.behaviour() {
            FunctionBehaviour::Bound { target, .. } => Some(target),
            FunctionBehaviour::Native { .. } => None,
        },
        _ => None,
    }
}

/// Creates a bound function exotic object. Its `[[Prototype]]` is the target's, so static
/// lookups through the bound function see the same chain as the target.
pub fn bound_function_create(
    target: &JsObjectType,
    bound_this: JsValue,
    bound_arguments: Vec<JsValue>,
) -> Result<JsObjectType, JErrorType> {
    if !is_callable(&JsValue::Object(target.clone())) {
        return Err(JErrorType::TypeError(
            "Bind must be called on a function".to_string(),
        ));
    }
    let target_name = match get(target, &PropertyKey::from("name"))? {
        JsValue::String(s) => s,
        _ => String::new(),
    };
    let prototype = get_prototype_of(target);
    Ok(function_object_create(Box::new(BoundFunctionObject {
        bound_target_function: target.clone(),
        bound_this,
        bound_arguments,
        function_object: FunctionObjectBase::new(
            format!("bound {}", target_name),
            FunctionKind::Normal,
            prototype,
        ),
    })))
}
