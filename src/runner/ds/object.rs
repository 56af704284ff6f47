use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::JsFunctionObject;
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::operations::object::{
    call, construct, define_own_property, delete_property, get_own_property, get_prototype_of,
    get_with_receiver, has_property, own_property_keys, set_prototype_of, set_with_receiver,
};
use crate::runner::ds::operations::test_and_comparison::same_value;
use crate::runner::ds::value::JsValue;

pub type JsObjectType = Rc<RefCell<ObjectType>>;

pub enum ObjectType {
    Ordinary(Box<dyn JsObject>),
    Function(Box<dyn JsFunctionObject>),
    Proxy(ProxyObject),
}
impl ObjectType {
    pub fn is_callable(&self) -> bool {
        match self {
            ObjectType::Ordinary(_) => false,
            ObjectType::Function(_) => true,
            ObjectType::Proxy(p) => (*p.target).borrow().is_callable(),
        }
    }

    pub fn as_js_object(&self) -> &dyn JsObject {
        match self {
            ObjectType::Ordinary(o) => o.as_js_object(),
            ObjectType::Function(o) => o.as_js_object(),
            ObjectType::Proxy(o) => o.as_js_object(),
        }
    }

    pub fn as_js_object_mut(&mut self) -> &mut dyn JsObject {
        match self {
            ObjectType::Ordinary(o) => o.as_js_object_mut(),
            ObjectType::Function(o) => o.as_js_object_mut(),
            ObjectType::Proxy(o) => o.as_js_object_mut(),
        }
    }

    pub fn as_js_function_object(&self) -> Option<&dyn JsFunctionObject> {
        match self {
            ObjectType::Function(f) => Some(f.as_js_function_object()),
            _ => None,
        }
    }

    pub fn as_proxy(&self) -> Option<&ProxyObject> {
        match self {
            ObjectType::Proxy(p) => Some(p),
            _ => None,
        }
    }
}
impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Ordinary(o) => write!(f, "Ordinary({})", o.to_string()),
            ObjectType::Function(o) => write!(f, "Function({})", o.to_string()),
            ObjectType::Proxy(_) => write!(f, "Proxy"),
        }
    }
}

pub struct ObjectBase {
    properties: IndexMap<PropertyKey, PropertyDescriptor>,
    prototype: Option<JsObjectType>,
}
impl ObjectBase {
    pub fn new() -> Self {
        ObjectBase {
            properties: IndexMap::new(),
            prototype: None,
        }
    }

    pub fn new_with_prototype(prototype: Option<JsObjectType>) -> Self {
        ObjectBase {
            properties: IndexMap::new(),
            prototype,
        }
    }
}
impl Default for ObjectBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordinary internal methods over an `ObjectBase`.
///
/// These only touch the object's own slots. Anything that can run host code
/// (accessors, constructors, proxy traps) lives in `operations::object`, which
/// never holds a `RefCell` borrow across such a call.
pub trait JsObject {
    fn get_object_base_mut(&mut self) -> &mut ObjectBase;

    fn get_object_base(&self) -> &ObjectBase;

    fn as_js_object(&self) -> &dyn JsObject;

    fn as_js_object_mut(&mut self) -> &mut dyn JsObject;

    fn get_prototype_of(&self) -> Option<JsObjectType> {
        self.get_object_base().prototype.clone()
    }

    /// Replaces the prototype slot. Cycle detection needs the owning `Rc` and is done by
    /// `operations::object::set_prototype_of`.
    fn set_prototype_of(&mut self, prototype: Option<JsObjectType>) -> bool {
        let unchanged = match (&self.get_object_base().prototype, &prototype) {
            (None, None) => true,
            (Some(current), Some(p)) => Rc::ptr_eq(current, p),
            _ => false,
        };
        if !unchanged {
            self.get_object_base_mut().prototype = prototype;
        }
        true
    }

    fn get_own_property(&self, property: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.get_object_base().properties.get(property)
    }

    fn define_own_property(
        &mut self,
        property: PropertyKey,
        descriptor: PropertyDescriptor,
    ) -> bool {
        ordinary_define_own_property(self, property, descriptor)
    }

    fn delete(&mut self, property: &PropertyKey) -> bool {
        match self.get_own_property(property) {
            None => true,
            Some(pd) => {
                if pd.is_configurable() {
                    self.get_object_base_mut().properties.shift_remove(property);
                    true
                } else {
                    false
                }
            }
        }
    }

    fn own_property_keys(&self) -> Vec<PropertyKey> {
        let mut int_keys = vec![];
        let mut str_keys = vec![];
        let mut sym_keys = vec![];
        for key in self.get_object_base().properties.keys() {
            match key {
                PropertyKey::Int(_) => int_keys.push(key.clone()),
                PropertyKey::Str(_) => str_keys.push(key.clone()),
                PropertyKey::Sym(_) => sym_keys.push(key.clone()),
            }
        }
        int_keys.sort_by_key(|k| match k {
            PropertyKey::Int(i) => *i,
            _ => 0,
        });

        let mut result = int_keys;
        result.append(&mut str_keys);
        result.append(&mut sym_keys);
        result
    }

    fn to_string(&self) -> String {
        "[object Object]".to_string()
    }
}

pub fn ordinary_define_own_property<J: JsObject + ?Sized>(
    o: &mut J,
    property: PropertyKey,
    descriptor: PropertyDescriptor,
) -> bool {
    match o.get_own_property(&property) {
        None => {}
        Some(current) => {
            if !current.is_configurable() {
                if descriptor.is_configurable()
                    || current.is_enumerable() != descriptor.is_enumerable()
                {
                    return false;
                }
                match (current, &descriptor) {
                    (
                        PropertyDescriptor::Data {
                            value: current_value,
                            writable: current_writable,
                            ..
                        },
                        PropertyDescriptor::Data {
                            value, writable, ..
                        },
                    ) => {
                        if !*current_writable && (*writable || !same_value(current_value, value)) {
                            return false;
                        }
                    }
                    (PropertyDescriptor::Accessor { .. }, PropertyDescriptor::Accessor { .. }) => {
                        if current != &descriptor {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
        }
    }
    o.get_object_base_mut()
        .properties
        .insert(property, descriptor);
    true
}

pub struct OrdinaryObject {
    base: ObjectBase,
}
impl OrdinaryObject {
    pub fn new(prototype: Option<JsObjectType>) -> Self {
        OrdinaryObject {
            base: ObjectBase::new_with_prototype(prototype),
        }
    }
}
impl JsObject for OrdinaryObject {
    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn get_object_base(&self) -> &ObjectBase {
        &self.base
    }

    fn as_js_object(&self) -> &dyn JsObject {
        self
    }

    fn as_js_object_mut(&mut self) -> &mut dyn JsObject {
        self
    }
}

pub fn object_create(prototype: Option<JsObjectType>) -> JsObjectType {
    Rc::new(RefCell::new(ObjectType::Ordinary(Box::new(OrdinaryObject::new(
        prototype,
    )))))
}

/// Interception hooks for a `ProxyObject`. Every hook defaults to the ordinary
/// behaviour of the target, so a handler only overrides what it needs.
pub trait ProxyHandler {
    fn get_prototype_of(&self, target: &JsObjectType) -> Option<JsObjectType> {
        get_prototype_of(target)
    }

    fn set_prototype_of(&self, target: &JsObjectType, prototype: Option<JsObjectType>) -> bool {
        set_prototype_of(target, prototype)
    }

    fn get_own_property(
        &self,
        target: &JsObjectType,
        property: &PropertyKey,
    ) -> Option<PropertyDescriptor> {
        get_own_property(target, property)
    }

    fn define_own_property(
        &self,
        target: &JsObjectType,
        property: PropertyKey,
        descriptor: PropertyDescriptor,
    ) -> bool {
        define_own_property(target, property, descriptor)
    }

    fn delete(&self, target: &JsObjectType, property: &PropertyKey) -> bool {
        delete_property(target, property)
    }

    fn has(&self, target: &JsObjectType, property: &PropertyKey) -> Result<bool, JErrorType> {
        has_property(target, property)
    }

    fn get(
        &self,
        target: &JsObjectType,
        property: &PropertyKey,
        receiver: &JsValue,
    ) -> Result<JsValue, JErrorType> {
        get_with_receiver(target, property, receiver)
    }

    fn set(
        &self,
        target: &JsObjectType,
        property: PropertyKey,
        value: JsValue,
        receiver: &JsValue,
    ) -> Result<bool, JErrorType> {
        set_with_receiver(target, property, value, receiver)
    }

    fn own_property_keys(&self, target: &JsObjectType) -> Vec<PropertyKey> {
        own_property_keys(target)
    }

    fn call(
        &self,
        target: &JsObjectType,
        this: &JsValue,
        args: Vec<JsValue>,
    ) -> Result<JsValue, JErrorType> {
        call(&JsValue::Object(target.clone()), this, args)
    }

    fn construct(
        &self,
        target: &JsObjectType,
        args: Vec<JsValue>,
        new_target: &JsObjectType,
    ) -> Result<JsObjectType, JErrorType> {
        construct(target, args, Some(new_target))
    }

    fn as_any(&self) -> &dyn Any;
}

pub struct ProxyObject {
    target: JsObjectType,
    handler: Rc<dyn ProxyHandler>,
    // Never populated; keeps `as_js_object` total for proxies.
    object_base: ObjectBase,
}
impl ProxyObject {
    pub fn new(target: JsObjectType, handler: Rc<dyn ProxyHandler>) -> Self {
        ProxyObject {
            target,
            handler,
            object_base: ObjectBase::new(),
        }
    }

    pub fn target(&self) -> &JsObjectType {
        &self.target
    }

    pub fn handler(&self) -> &Rc<dyn ProxyHandler> {
        &self.handler
    }
}
impl JsObject for ProxyObject {
    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.object_base
    }

    fn get_object_base(&self) -> &ObjectBase {
        &self.object_base
    }

    fn as_js_object(&self) -> &dyn JsObject {
        self
    }

    fn as_js_object_mut(&mut self) -> &mut dyn JsObject {
        self
    }

    fn to_string(&self) -> String {
        match self.target.try_borrow() {
            Ok(t) => t.as_js_object().to_string(),
            Err(_) => "[object Proxy]".to_string(),
        }
    }
}

pub fn proxy_create(target: JsObjectType, handler: Rc<dyn ProxyHandler>) -> JsObjectType {
    Rc::new(RefCell::new(ObjectType::Proxy(ProxyObject::new(
        target, handler,
    ))))
}
