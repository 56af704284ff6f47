use std::cell::Cell;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::FunctionBehaviour;
use crate::runner::ds::object::{object_create, JsObjectType, ObjectType, ProxyHandler};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::operations::type_conversion::to_display_string;
use crate::runner::ds::realm::JsCodeRealmType;
use crate::runner::ds::value::{JsNumberType, JsValue};

/// Nesting limit for property lookups. Proxies can route a prototype chain back onto itself,
/// which the cycle check in `set_prototype_of` cannot see.
const MAX_LOOKUP_DEPTH: usize = 256;

/// Upper bound for a `length` read from an array-like.
const MAX_ARRAY_LENGTH: usize = u32::MAX as usize;

thread_local! {
    static LOOKUP_DEPTH: Cell<usize> = Cell::new(0);
}

struct LookupDepthGuard;
impl LookupDepthGuard {
    fn enter() -> Result<LookupDepthGuard, JErrorType> {
        LOOKUP_DEPTH.with(|depth| {
            if depth.get() >= MAX_LOOKUP_DEPTH {
                Err(JErrorType::RangeError(
                    "Maximum call stack size exceeded".to_string(),
                ))
            } else {
                depth.set(depth.get() + 1);
                Ok(LookupDepthGuard)
            }
        })
    }
}
impl Drop for LookupDepthGuard {
    fn drop(&mut self) {
        LOOKUP_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn proxy_parts(o: &JsObjectType) -> Option<(JsObjectType, Rc<dyn ProxyHandler>)> {
    match &*o.borrow() {
        ObjectType::Proxy(p) => Some((p.target().clone(), p.handler().clone())),
        _ => None,
    }
}

/// Splits an ordinary lookup into "found here" or "ask the parent", releasing the borrow
/// before the caller acts on either.
fn own_or_parent(
    o: &JsObjectType,
    property: &PropertyKey,
) -> (Option<PropertyDescriptor>, Option<JsObjectType>) {
    let ot = o.borrow();
    let obj = ot.as_js_object();
    match obj.get_own_property(property) {
        Some(d) => (Some(d.clone()), None),
        None => (None, obj.get_prototype_of()),
    }
}

pub fn get_prototype_of(o: &JsObjectType) -> Option<JsObjectType> {
    if let Some((target, handler)) = proxy_parts(o) {
        return handler.get_prototype_of(&target);
    }
    let ot = o.borrow();
    ot.as_js_object().get_prototype_of()
}

pub fn set_prototype_of(o: &JsObjectType, prototype: Option<JsObjectType>) -> bool {
    if let Some((target, handler)) = proxy_parts(o) {
        return handler.set_prototype_of(&target, prototype);
    }
    let mut p = prototype.clone();
    while let Some(current) = p {
        if Rc::ptr_eq(&current, o) {
            // To prevent circular chain
            return false;
        }
        if current.borrow().as_proxy().is_some() {
            break;
        }
        p = current.borrow().as_js_object().get_prototype_of();
    }
    let mut ot = o.borrow_mut();
    ot.as_js_object_mut().set_prototype_of(prototype)
}

pub fn get_own_property(o: &JsObjectType, property: &PropertyKey) -> Option<PropertyDescriptor> {
    if let Some((target, handler)) = proxy_parts(o) {
        return handler.get_own_property(&target, property);
    }
    let ot = o.borrow();
    ot.as_js_object().get_own_property(property).cloned()
}

pub fn has_own_property(o: &JsObjectType, property: &PropertyKey) -> bool {
    get_own_property(o, property).is_some()
}

pub fn define_own_property(
    o: &JsObjectType,
    property: PropertyKey,
    descriptor: PropertyDescriptor,
) -> bool {
    if let Some((target, handler)) = proxy_parts(o) {
        return handler.define_own_property(&target, property, descriptor);
    }
    let mut ot = o.borrow_mut();
    ot.as_js_object_mut().define_own_property(property, descriptor)
}

pub fn define_property_or_throw(
    o: &JsObjectType,
    property: PropertyKey,
    descriptor: PropertyDescriptor,
) -> Result<(), JErrorType> {
    let name = property.to_string();
    if define_own_property(o, property, descriptor) {
        Ok(())
    } else {
        Err(JErrorType::TypeError(format!(
            "Cannot redefine property: {}",
            name
        )))
    }
}

pub fn create_data_property(o: &JsObjectType, property: PropertyKey, value: JsValue) -> bool {
    define_own_property(o, property, PropertyDescriptor::new_data(value))
}

pub fn delete_property(o: &JsObjectType, property: &PropertyKey) -> bool {
    if let Some((target, handler)) = proxy_parts(o) {
        return handler.delete(&target, property);
    }
    let mut ot = o.borrow_mut();
    ot.as_js_object_mut().delete(property)
}

pub fn own_property_keys(o: &JsObjectType) -> Vec<PropertyKey> {
    if let Some((target, handler)) = proxy_parts(o) {
        return handler.own_property_keys(&target);
    }
    let ot = o.borrow();
    ot.as_js_object().own_property_keys()
}

pub fn has_property(o: &JsObjectType, property: &PropertyKey) -> Result<bool, JErrorType> {
    let _depth = LookupDepthGuard::enter()?;
    if let Some((target, handler)) = proxy_parts(o) {
        return handler.has(&target, property);
    }
    match own_or_parent(o, property) {
        (Some(_), _) => Ok(true),
        (None, Some(parent)) => has_property(&parent, property),
        (None, None) => Ok(false),
    }
}

pub fn get(o: &JsObjectType, property: &PropertyKey) -> Result<JsValue, JErrorType> {
    get_with_receiver(o, property, &JsValue::Object(o.clone()))
}

pub fn get_with_receiver(
    o: &JsObjectType,
    property: &PropertyKey,
    receiver: &JsValue,
) -> Result<JsValue, JErrorType> {
    let _depth = LookupDepthGuard::enter()?;
    if let Some((target, handler)) = proxy_parts(o) {
        return handler.get(&target, property, receiver);
    }
    match own_or_parent(o, property) {
        (Some(PropertyDescriptor::Data { value, .. }), _) => Ok(value),
        (Some(PropertyDescriptor::Accessor { get, .. }), _) => match get {
            None => Ok(JsValue::Undefined),
            Some(getter) => call(&JsValue::Object(getter), receiver, Vec::new()),
        },
        (None, Some(parent)) => get_with_receiver(&parent, property, receiver),
        (None, None) => Ok(JsValue::Undefined),
    }
}

/// Property read on an arbitrary value. Primitives have no wrapper objects in this host, so
/// they read as `undefined`; `undefined` and `null` throw.
pub fn get_value(v: &JsValue, property: &PropertyKey) -> Result<JsValue, JErrorType> {
    match v {
        JsValue::Object(o) => get(o, property),
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(format!(
            "Cannot read properties of {} (reading '{}')",
            v, property
        ))),
        _ => Ok(JsValue::Undefined),
    }
}

pub fn set(o: &JsObjectType, property: PropertyKey, value: JsValue) -> Result<bool, JErrorType> {
    set_with_receiver(o, property, value, &JsValue::Object(o.clone()))
}

pub fn set_with_receiver(
    o: &JsObjectType,
    property: PropertyKey,
    value: JsValue,
    receiver: &JsValue,
) -> Result<bool, JErrorType> {
    let _depth = LookupDepthGuard::enter()?;
    if let Some((target, handler)) = proxy_parts(o) {
        return handler.set(&target, property, value, receiver);
    }
    let own_desc = match own_or_parent(o, &property) {
        (Some(d), _) => d,
        (None, Some(parent)) => return set_with_receiver(&parent, property, value, receiver),
        (None, None) => PropertyDescriptor::new_data(JsValue::Undefined),
    };
    match own_desc {
        PropertyDescriptor::Data { writable, .. } => {
            if !writable {
                return Ok(false);
            }
            let r = match receiver {
                JsValue::Object(r) => r,
                _ => return Ok(false),
            };
            match get_own_property(r, &property) {
                Some(PropertyDescriptor::Data {
                    writable: true,
                    enumerable,
                    configurable,
                    ..
                }) => Ok(define_own_property(
                    r,
                    property,
                    PropertyDescriptor::Data {
                        value,
                        writable: true,
                        enumerable,
                        configurable,
                    },
                )),
                Some(_) => Ok(false),
                None => Ok(create_data_property(r, property, value)),
            }
        }
        PropertyDescriptor::Accessor { set, .. } => match set {
            None => Ok(false),
            Some(setter) => {
                call(&JsValue::Object(setter), receiver, vec![value])?;
                Ok(true)
            }
        },
    }
}

/// Assignment with strict-mode semantics: a refused write is a TypeError.
pub fn put(o: &JsObjectType, property: &PropertyKey, value: JsValue) -> Result<(), JErrorType> {
    if set(o, property.clone(), value)? {
        Ok(())
    } else {
        Err(JErrorType::TypeError(format!(
            "Cannot assign to read only property '{}' of object",
            property
        )))
    }
}

pub fn call(f: &JsValue, this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let fo = match f {
        JsValue::Object(o) => o,
        _ => {
            return Err(JErrorType::TypeError(format!(
                "{} is not a function",
                to_display_string(f)
            )))
        }
    };
    if let Some((target, handler)) = proxy_parts(fo) {
        if !target.borrow().is_callable() {
            return Err(JErrorType::TypeError(format!(
                "{} is not a function",
                to_display_string(f)
            )));
        }
        return handler.call(&target, this, args);
    }
    let (name, behaviour) = match &*fo.borrow() {
        ObjectType::Function(func) => (
            func.get_function_object_base().name.to_string(),
            func.behaviour(),
        ),
        other => {
            return Err(JErrorType::TypeError(format!(
                "{} is not a function",
                other.as_js_object().to_string()
            )))
        }
    };
    match behaviour {
        FunctionBehaviour::Native { call: Some(c), .. } => c(this, args),
        FunctionBehaviour::Native { call: None, .. } => Err(JErrorType::TypeError(format!(
            "Class constructor {} cannot be invoked without 'new'",
            name
        ))),
        FunctionBehaviour::Bound {
            target,
            this: bound_this,
            arguments,
        } => {
            let mut all_args = arguments;
            all_args.extend(args);
            call(&JsValue::Object(target), &bound_this, all_args)
        }
    }
}

/// `[[Construct]]`. `new_target` defaults to `f` itself.
pub fn construct(
    f: &JsObjectType,
    args: Vec<JsValue>,
    new_target: Option<&JsObjectType>,
) -> Result<JsObjectType, JErrorType> {
    let new_target = new_target.unwrap_or(f).clone();
    if let Some((target, handler)) = proxy_parts(f) {
        return handler.construct(&target, args, &new_target);
    }
    let (name, behaviour) = match &*f.borrow() {
        ObjectType::Function(func) => (
            func.get_function_object_base().name.to_string(),
            func.behaviour(),
        ),
        other => {
            return Err(JErrorType::TypeError(format!(
                "{} is not a constructor",
                other.as_js_object().to_string()
            )))
        }
    };
    match behaviour {
        FunctionBehaviour::Native {
            construct: Some(c), ..
        } => c(args, &new_target),
        FunctionBehaviour::Native {
            construct: None, ..
        } => Err(JErrorType::TypeError(format!(
            "{} is not a constructor",
            name
        ))),
        FunctionBehaviour::Bound {
            target, arguments, ..
        } => {
            let new_target = if Rc::ptr_eq(&new_target, f) {
                target.clone()
            } else {
                new_target
            };
            let mut all_args = arguments;
            all_args.extend(args);
            construct(&target, all_args, Some(&new_target))
        }
    }
}

/// Looks up `property` on `v` and calls it with `v` as `this`.
pub fn invoke(v: &JsValue, property: &PropertyKey, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let f = get_value(v, property)?;
    call(&f, v, args)
}

/// Allocates `this` for a constructor: `new_target.prototype` when it is an object,
/// `fallback` otherwise.
pub fn ordinary_create_from_constructor(
    new_target: &JsObjectType,
    fallback: &JsObjectType,
) -> Result<JsObjectType, JErrorType> {
    let prototype = match get(new_target, &PropertyKey::from("prototype"))? {
        JsValue::Object(p) => p,
        _ => fallback.clone(),
    };
    Ok(object_create(Some(prototype)))
}

pub fn create_array_from_list(realm: &JsCodeRealmType, elements: Vec<JsValue>) -> JsObjectType {
    let array = object_create(Some(realm.object_prototype()));
    let length = elements.len();
    for (index, element) in elements.into_iter().enumerate() {
        create_data_property(&array, PropertyKey::Int(index as u32), element);
    }
    define_own_property(
        &array,
        PropertyKey::from("length"),
        PropertyDescriptor::Data {
            value: JsValue::Number(JsNumberType::Integer(length as i64)),
            writable: true,
            enumerable: false,
            configurable: false,
        },
    );
    array
}

/// Any object counts as array-like: its `length` goes through `to_length`, so an object
/// without a numeric `length` reads as an empty list.
pub fn is_array_like(v: &JsValue) -> bool {
    v.is_object()
}

pub fn create_list_from_array_like(v: &JsValue) -> Result<Vec<JsValue>, JErrorType> {
    let o = match v {
        JsValue::Object(o) => o,
        _ => {
            return Err(JErrorType::TypeError(
                "CreateListFromArrayLike called on non-object".to_string(),
            ))
        }
    };
    let length = match get(o, &PropertyKey::from("length"))? {
        JsValue::Number(n) => n.to_length(),
        _ => 0,
    };
    if length > MAX_ARRAY_LENGTH {
        return Err(JErrorType::RangeError("Invalid array length".to_string()));
    }
    let mut list = Vec::new();
    for index in 0..length {
        list.push(get(o, &PropertyKey::Int(index as u32))?);
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::function_object::create_builtin_function;
    use crate::runner::ds::realm::CodeRealm;
    use std::cell::RefCell;

    #[test]
    fn test_get_walks_prototype_chain() {
        let parent = object_create(None);
        put(&parent, &PropertyKey::from("x"), JsValue::from(1)).unwrap();
        let child = object_create(Some(parent));
        assert_eq!(get(&child, &PropertyKey::from("x")).unwrap(), JsValue::from(1));
        assert!(has_property(&child, &PropertyKey::from("x")).unwrap());
        assert!(!has_own_property(&child, &PropertyKey::from("x")));
    }

    #[test]
    fn test_set_shadows_inherited_data_property_on_receiver() {
        let parent = object_create(None);
        put(&parent, &PropertyKey::from("x"), JsValue::from(1)).unwrap();
        let child = object_create(Some(parent.clone()));
        put(&child, &PropertyKey::from("x"), JsValue::from(2)).unwrap();
        assert_eq!(get(&child, &PropertyKey::from("x")).unwrap(), JsValue::from(2));
        assert_eq!(get(&parent, &PropertyKey::from("x")).unwrap(), JsValue::from(1));
    }

    #[test]
    fn test_inherited_readonly_property_blocks_assignment() {
        let parent = object_create(None);
        define_own_property(
            &parent,
            PropertyKey::from("x"),
            PropertyDescriptor::new_readonly(JsValue::from(1), true),
        );
        let child = object_create(Some(parent));
        let err = put(&child, &PropertyKey::from("x"), JsValue::from(2)).unwrap_err();
        assert!(err.is_type_error());
        assert!(!has_own_property(&child, &PropertyKey::from("x")));
    }

    #[test]
    fn test_accessors_receive_the_receiver() {
        let realm = CodeRealm::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_by_setter = seen.clone();
        let getter = create_builtin_function(&realm, "get x", |this, _| {
            get_value(this, &PropertyKey::from("_x"))
        });
        let setter = create_builtin_function(&realm, "set x", move |this, args| {
            seen_by_setter.borrow_mut().push(args[0].clone());
            put(this.as_object().unwrap(), &PropertyKey::from("_x"), args[0].clone())?;
            Ok(JsValue::Undefined)
        });
        let parent = object_create(None);
        define_own_property(
            &parent,
            PropertyKey::from("x"),
            PropertyDescriptor::new_accessor(Some(getter), Some(setter)),
        );
        let child = object_create(Some(parent.clone()));
        put(&child, &PropertyKey::from("x"), JsValue::from(9)).unwrap();
        assert_eq!(get(&child, &PropertyKey::from("x")).unwrap(), JsValue::from(9));
        assert!(has_own_property(&child, &PropertyKey::from("_x")));
        assert!(!has_own_property(&parent, &PropertyKey::from("_x")));
        assert_eq!(*seen.borrow(), vec![JsValue::from(9)]);
    }

    #[test]
    fn test_array_like_round_trip() {
        let realm = CodeRealm::new();
        let array = create_array_from_list(&realm, vec![JsValue::from(1), JsValue::from("two")]);
        let list = create_list_from_array_like(&JsValue::Object(array)).unwrap();
        assert_eq!(list, vec![JsValue::from(1), JsValue::from("two")]);
        assert!(create_list_from_array_like(&JsValue::from(3)).is_err());
    }

    #[test]
    fn test_oversized_array_like_length_is_a_range_error() {
        let o = object_create(None);
        put(
            &o,
            &PropertyKey::from("length"),
            JsValue::Number(JsNumberType::Integer(i64::MAX)),
        )
        .unwrap();
        let err = create_list_from_array_like(&JsValue::Object(o)).unwrap_err();
        assert!(err.is_range_error());
        assert_eq!(err.message(), "Invalid array length");
    }

    struct Forwarding;
    impl ProxyHandler for Forwarding {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_prototype_cycle_through_proxy_fails_lookup_instead_of_overflowing() {
        let target = object_create(None);
        let proxy = crate::runner::ds::object::proxy_create(target.clone(), Rc::new(Forwarding));
        assert!(set_prototype_of(&target, Some(proxy.clone())));

        let missing = PropertyKey::from("missing");
        assert!(has_property(&proxy, &missing).unwrap_err().is_range_error());
        assert!(get(&proxy, &missing).unwrap_err().is_range_error());
        assert!(set(&proxy, missing.clone(), JsValue::from(1))
            .unwrap_err()
            .is_range_error());

        // The depth counter unwinds, so unrelated lookups keep working.
        let plain = object_create(None);
        put(&plain, &PropertyKey::from("x"), JsValue::from(1)).unwrap();
        assert_eq!(get(&plain, &PropertyKey::from("x")).unwrap(), JsValue::from(1));
    }
}
