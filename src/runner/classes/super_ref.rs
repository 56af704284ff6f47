//! One-shot references to a specific base, used to reach a member that several bases
//! define under the same name.
//!
//! `instance.class(A).m()` reads `m` from `A.prototype` but calls it with the instance
//! behind the reference. The route to `A.prototype` is taken by the first get or set;
//! every later access on the same reference goes straight to the instance, so code
//! running inside `m` sees ordinary `this` semantics.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::runner::classes::error::ClassesError;
use crate::runner::classes::registry::{name_of_type, BaseTypeSet, PrototypeSet};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{object_create, proxy_create, JsObjectType, ProxyHandler};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::operations::object::{
    define_own_property, delete_property, get, get_own_property, get_with_receiver,
    has_property, own_property_keys, set_with_receiver,
};
use crate::runner::ds::operations::test_and_comparison::is_callable;
use crate::runner::ds::value::JsValue;

pub struct SuperReference {
    receiver: JsValue,
    route: RefCell<Option<JsObjectType>>,
}
impl SuperReference {
    fn receiver_object(&self) -> Option<&JsObjectType> {
        self.receiver.as_object()
    }
}
impl ProxyHandler for SuperReference {
    fn get_prototype_of(&self, _target: &JsObjectType) -> Option<JsObjectType> {
        self.route.borrow().clone()
    }

    fn set_prototype_of(&self, _target: &JsObjectType, _prototype: Option<JsObjectType>) -> bool {
        false
    }

    fn get_own_property(
        &self,
        target: &JsObjectType,
        property: &PropertyKey,
    ) -> Option<PropertyDescriptor> {
        match self.receiver_object() {
            Some(r) => get_own_property(r, property),
            None => get_own_property(target, property),
        }
    }

    fn define_own_property(
        &self,
        _target: &JsObjectType,
        property: PropertyKey,
        descriptor: PropertyDescriptor,
    ) -> bool {
        match self.receiver_object() {
            Some(r) => define_own_property(r, property, descriptor),
            None => false,
        }
    }

    fn delete(&self, _target: &JsObjectType, property: &PropertyKey) -> bool {
        match self.receiver_object() {
            Some(r) => delete_property(r, property),
            None => false,
        }
    }

    fn has(&self, _target: &JsObjectType, property: &PropertyKey) -> Result<bool, JErrorType> {
        let route = self.route.borrow().clone();
        match (route, self.receiver_object()) {
            (Some(base), _) => has_property(&base, property),
            (None, Some(r)) => has_property(r, property),
            (None, None) => Ok(false),
        }
    }

    fn get(
        &self,
        _target: &JsObjectType,
        property: &PropertyKey,
        _receiver: &JsValue,
    ) -> Result<JsValue, JErrorType> {
        let route = self.route.borrow_mut().take();
        match (route, self.receiver_object()) {
            (Some(base), _) => get_with_receiver(&base, property, &self.receiver),
            (None, Some(r)) => get(r, property),
            (None, None) => Ok(JsValue::Undefined),
        }
    }

    fn set(
        &self,
        _target: &JsObjectType,
        property: PropertyKey,
        value: JsValue,
        _receiver: &JsValue,
    ) -> Result<bool, JErrorType> {
        let route = self.route.borrow_mut().take();
        match (route, self.receiver_object()) {
            (Some(base), _) => set_with_receiver(&base, property, value, &self.receiver),
            (None, Some(r)) => set_with_receiver(r, property, value, &self.receiver),
            (None, None) => Ok(false),
        }
    }

    fn own_property_keys(&self, target: &JsObjectType) -> Vec<PropertyKey> {
        match self.receiver_object() {
            Some(r) => own_property_keys(r),
            None => own_property_keys(target),
        }
    }

    fn construct(
        &self,
        _target: &JsObjectType,
        _args: Vec<JsValue>,
        _new_target: &JsObjectType,
    ) -> Result<JsObjectType, JErrorType> {
        Err(ClassesError::OperationNotSupported.into())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn super_reference_create(receiver: JsValue, route: JsObjectType) -> JsObjectType {
    proxy_create(
        object_create(None),
        Rc::new(SuperReference {
            receiver,
            route: RefCell::new(Some(route)),
        }),
    )
}

/// `instance.class(type)`: routes the next access to `type.prototype`.
pub fn select_instance_base(
    this: &JsValue,
    candidate: &JsValue,
    base_types: &BaseTypeSet,
    prototypes: &PrototypeSet,
) -> Result<JsObjectType, JErrorType> {
    let t = match candidate {
        JsValue::Object(t) if is_callable(candidate) => t,
        _ => return Err(ClassesError::ArgumentNotCallable.into()),
    };
    match get(t, &PropertyKey::from("prototype"))? {
        JsValue::Object(p) if prototypes.contains(&p) => {
            debug!(base = %name_of_type(candidate), "super reference to base prototype");
            Ok(super_reference_create(this.clone(), p))
        }
        JsValue::Null if base_types.contains(t) => {
            Err(ClassesError::SuperclassPrototypeIsNull(name_of_type(candidate)).into())
        }
        _ => Err(ClassesError::NotADirectBase(name_of_type(candidate)).into()),
    }
}

/// `Composite.class(type)`: routes the next access to `type` itself. Bases whose
/// `prototype` is null are still reachable here.
pub fn select_static_base(
    this: &JsValue,
    candidate: &JsValue,
    base_types: &BaseTypeSet,
) -> Result<JsObjectType, JErrorType> {
    let t = match candidate {
        JsValue::Object(t) if is_callable(candidate) => t,
        _ => return Err(ClassesError::ArgumentNotCallable.into()),
    };
    if !base_types.contains(t) {
        return Err(ClassesError::NotADirectSuperclass(name_of_type(candidate)).into());
    }
    debug!(base = %name_of_type(candidate), "super reference to base type");
    Ok(super_reference_create(this.clone(), t.clone()))
}
