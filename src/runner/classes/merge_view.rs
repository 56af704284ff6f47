//! A read/write view over an ordered list of backing objects.
//!
//! The view is a proxy whose handler scans `[target, objects...]` in order. The first
//! object that has a property answers reads and writes for it, with the original
//! receiver kept as `this` so accessors observe the real instance. A write that nobody
//! claims lands as a fresh own property on the receiver.

use std::any::Any;
use std::rc::Rc;

use tracing::trace;

use crate::runner::classes::error::ClassesError;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{proxy_create, JsObjectType, ObjectType, ProxyHandler};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::{
    create_data_property, get_with_receiver, has_property, set_with_receiver,
};
use crate::runner::ds::value::JsValue;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergeKind {
    /// Backed by the declared base types.
    Constructor,
    /// Backed by the prototypes of the declared base types.
    Prototype,
}

pub struct MergeView {
    kind: MergeKind,
    objects: Vec<JsValue>,
}
impl MergeView {
    pub(crate) fn new(kind: MergeKind, objects: Vec<JsValue>) -> Self {
        MergeView { kind, objects }
    }

    pub fn kind(&self) -> MergeKind {
        self.kind
    }

    pub fn objects(&self) -> &[JsValue] {
        &self.objects
    }

    /// The first backing object that has `property`, the target included.
    fn owner_of(
        &self,
        target: &JsObjectType,
        property: &PropertyKey,
    ) -> Result<Option<JsObjectType>, JErrorType> {
        if has_property(target, property)? {
            return Ok(Some(target.clone()));
        }
        for o in &self.objects {
            let o = match o {
                JsValue::Object(o) => o,
                _ => return Err(ClassesError::CorruptPrototypeList.into()),
            };
            if has_property(o, property)? {
                return Ok(Some(o.clone()));
            }
        }
        Ok(None)
    }
}
impl ProxyHandler for MergeView {
    fn set_prototype_of(&self, _target: &JsObjectType, _prototype: Option<JsObjectType>) -> bool {
        false
    }

    fn has(&self, target: &JsObjectType, property: &PropertyKey) -> Result<bool, JErrorType> {
        Ok(self.owner_of(target, property)?.is_some())
    }

    fn get(
        &self,
        target: &JsObjectType,
        property: &PropertyKey,
        receiver: &JsValue,
    ) -> Result<JsValue, JErrorType> {
        match self.owner_of(target, property)? {
            Some(owner) => get_with_receiver(&owner, property, receiver),
            None => Ok(JsValue::Undefined),
        }
    }

    fn set(
        &self,
        target: &JsObjectType,
        property: PropertyKey,
        value: JsValue,
        receiver: &JsValue,
    ) -> Result<bool, JErrorType> {
        if let Some(owner) = self.owner_of(target, &property)? {
            return set_with_receiver(&owner, property, value, receiver);
        }
        match receiver {
            JsValue::Object(r) => {
                trace!(property = %property, "no backing object owns property, adding it to receiver");
                Ok(create_data_property(r, property, value))
            }
            _ => Ok(false),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn merge_view_create(target: JsObjectType, kind: MergeKind, objects: Vec<JsValue>) -> JsObjectType {
    proxy_create(target, Rc::new(MergeView::new(kind, objects)))
}

/// The backing list of `o` when it is a merge view, as a fresh copy.
pub fn merge_view_objects(o: &JsObjectType) -> Option<(MergeKind, Vec<JsValue>)> {
    match &*o.borrow() {
        ObjectType::Proxy(p) => p
            .handler()
            .as_any()
            .downcast_ref::<MergeView>()
            .map(|view| (view.kind(), view.objects().to_vec())),
        _ => None,
    }
}
