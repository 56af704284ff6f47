//! Multiple inheritance on top of the single-parent object model.
//!
//! [`classes`] composes a constructor from several bases:
//!
//! ```text
//!            C.prototype ──► merge view(A.prototype, B.prototype)
//! C ──► merge view(A, B)
//! ```
//!
//! A class that extends the composite sees members of every base, first declared base
//! first. Constructing it constructs each base in turn and merges their state onto one
//! instance. `instanceof` keeps working for every base, however deep or diamond shaped the
//! hierarchy gets, and `x.class(B)` reaches a member of `B` that an earlier base shadows.
//!
//! ## Example
//!
//! ```
//! use just_classes::runner::classes::classes;
//! use just_classes::runner::ds::class_object::ClassBuilder;
//! use just_classes::runner::ds::operations::object::{construct, invoke};
//! use just_classes::runner::ds::operations::test_and_comparison::instance_of;
//! use just_classes::runner::ds::object_property::PropertyKey;
//! use just_classes::runner::ds::realm::CodeRealm;
//! use just_classes::runner::ds::value::JsValue;
//!
//! let realm = CodeRealm::new();
//! let a = ClassBuilder::new(&realm, "A").method("m", |_, _| Ok(JsValue::from("A"))).build().unwrap();
//! let b = ClassBuilder::new(&realm, "B").method("m", |_, _| Ok(JsValue::from("B"))).build().unwrap();
//! let composite = classes(&realm, &[JsValue::from(&a), JsValue::from(&b)]).unwrap();
//! let c = ClassBuilder::new(&realm, "C").extends(&composite).build().unwrap();
//!
//! let instance = JsValue::Object(construct(&c, vec![], None).unwrap());
//! assert_eq!(invoke(&instance, &PropertyKey::from("m"), vec![]).unwrap(), JsValue::from("A"));
//! let via_b = invoke(&instance, &PropertyKey::from("class"), vec![JsValue::from(&b)]).unwrap();
//! assert_eq!(invoke(&via_b, &PropertyKey::from("m"), vec![]).unwrap(), JsValue::from("B"));
//! assert!(instance_of(&instance, &JsValue::from(&b)).unwrap());
//! ```

pub mod construct;
pub mod error;
pub mod identity;
pub mod merge_view;
pub mod prototype_list;
pub mod registry;
pub mod super_ref;

use std::rc::Rc;

use tracing::debug;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{
    create_builtin_function, function_object_create, FunctionKind, FunctionObject,
    FunctionObjectBase, NativeCallFn, NativeConstructFn,
};
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::operations::object::define_property_or_throw;
use crate::runner::ds::realm::JsCodeRealmType;
use crate::runner::ds::value::JsValue;

use self::construct::construct_composite;
use self::identity::install_has_instance;
use self::merge_view::{merge_view_create, MergeKind};
use self::registry::{name_of_type, register_bases};
use self::super_ref::{select_instance_base, select_static_base};

pub use self::error::ClassesError;
pub use self::identity::{is_prototype_of, type_check};
pub use self::prototype_list::{get_prototype_list_of, list_parents, prototype_list_of};

/// Composes a constructor that inherits from every one of `bases`.
///
/// Each call yields a new composite, even for the same bases.
pub fn classes(realm: &JsCodeRealmType, bases: &[JsValue]) -> Result<JsObjectType, JErrorType> {
    let registration = register_bases(bases)?;
    let base_types = Rc::new(registration.base_types);
    let prototypes = Rc::new(registration.prototypes);
    let name = format!(
        "({})",
        base_types
            .iter()
            .map(|b| name_of_type(&JsValue::Object(b.clone())))
            .collect::<Vec<_>>()
            .join(",")
    );
    debug!(name = %name, bases = base_types.len(), "composing classes");
    install_has_instance(realm, &base_types)?;

    let call: NativeCallFn = {
        let name = name.to_string();
        Rc::new(move |_: &JsValue, _: Vec<JsValue>| {
            Err::<JsValue, JErrorType>(ClassesError::ConstructorRequiresNew(name.to_string()).into())
        })
    };
    let construct: NativeConstructFn = {
        let realm = realm.clone();
        let base_types = base_types.clone();
        Rc::new(move |args: Vec<JsValue>, new_target: &JsObjectType| {
            construct_composite(&realm, &base_types, args, new_target)
        })
    };
    let constructor_target = function_object_create(Box::new(FunctionObject::new(
        FunctionObjectBase::new(name.to_string(), FunctionKind::ClassConstructor, None),
        Some(call),
        Some(construct),
    )));
    let constructor = merge_view_create(
        constructor_target.clone(),
        MergeKind::Constructor,
        base_types.to_values(),
    );

    let prototype_target = object_create(None);
    let prototype = merge_view_create(
        prototype_target.clone(),
        MergeKind::Prototype,
        prototypes.to_values(),
    );

    let static_selector = {
        let base_types = base_types.clone();
        create_builtin_function(realm, "class", move |this, args| {
            let candidate = args.first().cloned().unwrap_or(JsValue::Undefined);
            Ok(JsValue::Object(select_static_base(this, &candidate, &base_types)?))
        })
    };
    let instance_selector = {
        let base_types = base_types.clone();
        let prototypes = prototypes.clone();
        create_builtin_function(realm, "class", move |this, args| {
            let candidate = args.first().cloned().unwrap_or(JsValue::Undefined);
            Ok(JsValue::Object(select_instance_base(
                this,
                &candidate,
                &base_types,
                &prototypes,
            )?))
        })
    };

    define_property_or_throw(
        &constructor_target,
        PropertyKey::from("prototype"),
        PropertyDescriptor::new_readonly(JsValue::Object(prototype), false),
    )?;
    define_property_or_throw(
        &constructor_target,
        PropertyKey::from("class"),
        PropertyDescriptor::new_hidden(JsValue::Object(static_selector)),
    )?;
    define_property_or_throw(
        &prototype_target,
        PropertyKey::from("constructor"),
        PropertyDescriptor::new_hidden(JsValue::Object(constructor.clone())),
    )?;
    define_property_or_throw(
        &prototype_target,
        PropertyKey::from("class"),
        PropertyDescriptor::new_hidden(JsValue::Object(instance_selector)),
    )?;
    Ok(constructor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::class_object::ClassBuilder;
    use crate::runner::ds::operations::object::{
        call, get, get_own_property, invoke, set_prototype_of,
    };
    use crate::runner::ds::realm::CodeRealm;

    #[test]
    fn test_composite_name_and_descriptors() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let b = ClassBuilder::new(&realm, "B").build().unwrap();
        let c = classes(&realm, &[JsValue::from(&a), JsValue::from(&b)]).unwrap();
        assert_eq!(get(&c, &PropertyKey::from("name")).unwrap(), JsValue::from("(A,B)"));

        let name = get_own_property(&c, &PropertyKey::from("name")).unwrap();
        assert!(!name.is_writable() && !name.is_enumerable() && name.is_configurable());
        let prototype = get_own_property(&c, &PropertyKey::from("prototype")).unwrap();
        assert!(!prototype.is_writable() && !prototype.is_configurable());
        assert!(!get_own_property(&c, &PropertyKey::from("class"))
            .unwrap()
            .is_enumerable());

        let proto = get(&c, &PropertyKey::from("prototype")).unwrap();
        assert_eq!(
            get(proto.as_object().unwrap(), &PropertyKey::from("constructor")).unwrap(),
            JsValue::Object(c.clone())
        );
    }

    #[test]
    fn test_composite_requires_new() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let c = classes(&realm, &[JsValue::from(&a)]).unwrap();
        let err = call(&JsValue::Object(c), &JsValue::Undefined, vec![]).unwrap_err();
        assert_eq!(err.message(), "Class constructor (A) cannot be invoked without 'new'");
    }

    #[test]
    fn test_composite_refuses_reparenting() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let c = classes(&realm, &[JsValue::from(&a)]).unwrap();
        assert!(!set_prototype_of(&c, Some(realm.object_prototype())));
    }

    #[test]
    fn test_each_call_yields_a_new_composite() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let first = classes(&realm, &[JsValue::from(&a)]).unwrap();
        let second = classes(&realm, &[JsValue::from(&a)]).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_static_selector_reaches_shadowed_member() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A")
            .static_method("who", |_, _| Ok(JsValue::from("A")))
            .build()
            .unwrap();
        let b = ClassBuilder::new(&realm, "B")
            .static_method("who", |_, _| Ok(JsValue::from("B")))
            .build()
            .unwrap();
        let c = JsValue::Object(classes(&realm, &[JsValue::from(&a), JsValue::from(&b)]).unwrap());
        assert_eq!(invoke(&c, &PropertyKey::from("who"), vec![]).unwrap(), JsValue::from("A"));
        let via_b = invoke(&c, &PropertyKey::from("class"), vec![JsValue::from(&b)]).unwrap();
        assert_eq!(invoke(&via_b, &PropertyKey::from("who"), vec![]).unwrap(), JsValue::from("B"));
    }
}
