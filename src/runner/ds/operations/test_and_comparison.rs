use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{bound_target_function, FunctionBehaviour};
use crate::runner::ds::object::{JsObjectType, ObjectType};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::{call, get, get_prototype_of};
use crate::runner::ds::operations::type_conversion::{to_boolean, to_display_string};
use crate::runner::ds::symbol::SYMBOL_HAS_INSTANCE;
use crate::runner::ds::value::{JsNumberType, JsValue};

fn number_value(n: &JsNumberType) -> Option<f64> {
    match n {
        JsNumberType::Integer(i) => Some(*i as f64),
        JsNumberType::Float(f) => Some(*f),
        JsNumberType::PositiveInfinity => Some(f64::INFINITY),
        JsNumberType::NegativeInfinity => Some(f64::NEG_INFINITY),
        JsNumberType::NaN => None,
    }
}

/// `SameValue`: NaN equals NaN, and integers compare equal to the floats they denote.
pub fn same_value(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Undefined, JsValue::Undefined) => true,
        (JsValue::Null, JsValue::Null) => true,
        (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
        (JsValue::String(a), JsValue::String(b)) => a == b,
        (JsValue::Symbol(a), JsValue::Symbol(b)) => a == b,
        (JsValue::Object(a), JsValue::Object(b)) => same_object(a, b),
        (JsValue::Number(na), JsValue::Number(nb)) => match (number_value(na), number_value(nb)) {
            (Some(x), Some(y)) => x == y,
            (None, None) => true,
            _ => false,
        },
        _ => false,
    }
}

pub fn same_object(a: &JsObjectType, b: &JsObjectType) -> bool {
    Rc::ptr_eq(a, b)
}

pub fn is_callable(v: &JsValue) -> bool {
    match v {
        JsValue::Object(o) => o.borrow().is_callable(),
        _ => false,
    }
}

/// True when `v` has a `[[Construct]]` behaviour. Plain host functions and bound
/// functions over them are callable but not constructible.
pub fn is_constructor(v: &JsValue) -> bool {
    let o = match v {
        JsValue::Object(o) => o,
        _ => return false,
    };
    let behaviour = match &*o.borrow() {
        ObjectType::Function(f) => f.behaviour(),
        ObjectType::Proxy(p) => return is_constructor(&JsValue::Object(p.target().clone())),
        ObjectType::Ordinary(_) => return false,
    };
    match behaviour {
        FunctionBehaviour::Native { construct, .. } => construct.is_some(),
        FunctionBehaviour::Bound { target, .. } => is_constructor(&JsValue::Object(target)),
    }
}

/// The `instanceof` operator: honours `[Symbol.hasInstance]` before falling back to
/// `ordinary_has_instance`.
pub fn instance_of(v: &JsValue, target: &JsValue) -> Result<bool, JErrorType> {
    let t = match target {
        JsValue::Object(t) => t,
        _ => {
            return Err(JErrorType::TypeError(
                "Right-hand side of 'instanceof' is not an object".to_string(),
            ))
        }
    };
    let inst_of_handler = get(t, &PropertyKey::Sym(SYMBOL_HAS_INSTANCE.clone()))?;
    if !inst_of_handler.is_nullish() {
        let result = call(&inst_of_handler, target, vec![v.clone()])?;
        return Ok(to_boolean(&result));
    }
    if !is_callable(target) {
        return Err(JErrorType::TypeError(
            "Right-hand side of 'instanceof' is not callable".to_string(),
        ));
    }
    ordinary_has_instance(target, v)
}

pub fn ordinary_has_instance(c: &JsValue, o: &JsValue) -> Result<bool, JErrorType> {
    if !is_callable(c) {
        return Ok(false);
    }
    let c_obj = match c {
        JsValue::Object(c_obj) => c_obj,
        _ => return Ok(false),
    };
    if let Some(bc) = bound_target_function(c_obj) {
        return instance_of(o, &JsValue::Object(bc));
    }
    let o_obj = match o {
        JsValue::Object(o_obj) => o_obj,
        _ => return Ok(false),
    };
    let p = match get(c_obj, &PropertyKey::from("prototype"))? {
        JsValue::Object(p) => p,
        other => {
            return Err(JErrorType::TypeError(format!(
                "Function has non-object prototype '{}' in instanceof check",
                to_display_string(&other)
            )))
        }
    };
    let mut current = get_prototype_of(o_obj);
    while let Some(parent) = current {
        if same_object(&parent, &p) {
            return Ok(true);
        }
        current = get_prototype_of(&parent);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::function_object::{bound_function_create, create_builtin_function};
    use crate::runner::ds::object::object_create;
    use crate::runner::ds::operations::object::{construct, define_own_property};
    use crate::runner::ds::object_property::PropertyDescriptor;
    use crate::runner::ds::realm::CodeRealm;
    use crate::runner::ds::class_object::ClassBuilder;

    #[test]
    fn test_same_value_nan() {
        let nan = JsValue::Number(JsNumberType::NaN);
        assert!(same_value(&nan, &nan));
        assert!(same_value(
            &JsValue::Number(JsNumberType::Integer(2)),
            &JsValue::Number(JsNumberType::Float(2.0))
        ));
    }

    #[test]
    fn test_instance_of_walks_real_chain() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let b = ClassBuilder::new(&realm, "B").extends(&a).build().unwrap();
        let instance = JsValue::Object(construct(&b, vec![], None).unwrap());
        assert!(instance_of(&instance, &JsValue::Object(a.clone())).unwrap());
        assert!(instance_of(&instance, &JsValue::Object(b)).unwrap());
        assert!(!instance_of(&JsValue::from(1), &JsValue::Object(a)).unwrap());
    }

    #[test]
    fn test_instance_of_sees_through_bound_functions() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let bound = bound_function_create(&a, JsValue::Undefined, vec![]).unwrap();
        let twice = bound_function_create(&bound, JsValue::Undefined, vec![]).unwrap();
        let instance = JsValue::Object(construct(&twice, vec![], None).unwrap());
        assert!(instance_of(&instance, &JsValue::Object(a)).unwrap());
        assert!(instance_of(&instance, &JsValue::Object(twice)).unwrap());
    }

    #[test]
    fn test_constructibility() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let f = create_builtin_function(&realm, "f", |_, _| Ok(JsValue::Undefined));
        assert!(is_constructor(&JsValue::Object(a.clone())));
        assert!(!is_constructor(&JsValue::Object(f.clone())));
        assert!(is_callable(&JsValue::Object(f.clone())));
        let bound_f = bound_function_create(&f, JsValue::Undefined, vec![]).unwrap();
        assert!(!is_constructor(&JsValue::Object(bound_f)));
        assert!(!is_constructor(&JsValue::Object(object_create(None))));
        assert!(!is_constructor(&JsValue::from("A")));
    }

    #[test]
    fn test_non_object_prototype_in_instanceof() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let weird = ClassBuilder::new(&realm, "Weird").extends(&a).build().unwrap();
        // Class prototypes are non-configurable, so use a fresh function instead.
        let f = create_builtin_function(&realm, "f", |_, _| Ok(JsValue::Undefined));
        define_own_property(
            &f,
            PropertyKey::from("prototype"),
            PropertyDescriptor::new_data(JsValue::from(42)),
        );
        let instance = JsValue::Object(construct(&weird, vec![], None).unwrap());
        let err = instance_of(&instance, &JsValue::Object(f)).unwrap_err();
        assert_eq!(
            err.message(),
            "Function has non-object prototype '42' in instanceof check"
        );
    }
}
