use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexSet;

use crate::runner::classes::error::ClassesError;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::get;
use crate::runner::ds::operations::test_and_comparison::is_constructor;
use crate::runner::ds::operations::type_conversion::to_display_string;
use crate::runner::ds::value::JsValue;

/// An object keyed by reference identity, so it can live in hashed collections.
#[derive(Clone)]
pub struct ObjectIdentity(pub JsObjectType);
impl PartialEq for ObjectIdentity {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for ObjectIdentity {}
impl Hash for ObjectIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const () as usize).hash(state)
    }
}

/// An ordered set of objects compared by identity.
#[derive(Clone, Default)]
pub struct OrderedObjectSet {
    members: IndexSet<ObjectIdentity>,
}
impl OrderedObjectSet {
    pub fn new() -> Self {
        OrderedObjectSet {
            members: IndexSet::new(),
        }
    }

    /// Returns false when `o` is already a member.
    pub fn insert(&mut self, o: JsObjectType) -> bool {
        self.members.insert(ObjectIdentity(o))
    }

    pub fn contains(&self, o: &JsObjectType) -> bool {
        self.members.contains(&ObjectIdentity(o.clone()))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JsObjectType> {
        self.members.iter().map(|m| &m.0)
    }

    pub fn to_values(&self) -> Vec<JsValue> {
        self.iter().map(|o| JsValue::Object(o.clone())).collect()
    }
}

/// The declared bases of one composite, in declaration order.
pub type BaseTypeSet = OrderedObjectSet;

/// The distinct non-null prototypes of a `BaseTypeSet`, in first-seen order.
pub type PrototypeSet = OrderedObjectSet;

pub struct Registration {
    pub base_types: BaseTypeSet,
    pub prototypes: PrototypeSet,
}

/// Validates the candidate bases and collects their prototypes.
///
/// Each candidate's `prototype` is read exactly once.
pub fn register_bases(candidates: &[JsValue]) -> Result<Registration, JErrorType> {
    if candidates.is_empty() {
        return Err(ClassesError::NoBasesSpecified.into());
    }
    let mut base_types = BaseTypeSet::new();
    let mut prototypes = PrototypeSet::new();
    for candidate in candidates {
        let base = match candidate {
            JsValue::Object(o) if is_constructor(candidate) => o.clone(),
            _ => return Err(ClassesError::NotConstructible(name_of_type(candidate)).into()),
        };
        if !base_types.insert(base.clone()) {
            return Err(ClassesError::DuplicateBase(name_of_type(candidate)).into());
        }
        match get(&base, &PropertyKey::from("prototype"))? {
            JsValue::Object(p) => {
                prototypes.insert(p);
            }
            JsValue::Null | JsValue::Undefined => {}
            _ => return Err(ClassesError::InvalidPrototype(name_of_type(candidate)).into()),
        }
    }
    Ok(Registration {
        base_types,
        prototypes,
    })
}

/// A readable name for a type in error messages: its `name` when that is a usable
/// identifier, otherwise its string form.
pub fn name_of_type(v: &JsValue) -> String {
    if let JsValue::Object(o) = v {
        if let Ok(JsValue::String(name)) = get(o, &PropertyKey::from("name")) {
            if is_identifier_like(&name) {
                return name;
            }
        }
    }
    to_display_string(v)
}

fn is_identifier_like(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::runner::ds::class_object::ClassBuilder;
    use crate::runner::ds::function_object::{
        create_builtin_function, function_object_create, FunctionKind, FunctionObject,
        FunctionObjectBase, NativeConstructFn,
    };
    use crate::runner::ds::object::object_create;
    use crate::runner::ds::object_property::PropertyDescriptor;
    use crate::runner::ds::operations::object::define_own_property;
    use crate::runner::ds::realm::{CodeRealm, JsCodeRealmType};

    fn constructible(realm: &JsCodeRealmType, name: &str) -> JsObjectType {
        let construct: NativeConstructFn = Rc::new(|_, _| Ok(object_create(None)));
        function_object_create(Box::new(FunctionObject::new(
            FunctionObjectBase::new(
                name.to_string(),
                FunctionKind::Normal,
                Some(realm.function_prototype()),
            ),
            None,
            Some(construct),
        )))
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let err = register_bases(&[]).err().unwrap();
        assert_eq!(err.message(), "No superclasses specified");
    }

    #[test]
    fn test_duplicates_are_rejected_in_any_position() {
        let realm = CodeRealm::new();
        let a = JsValue::Object(ClassBuilder::new(&realm, "A").build().unwrap());
        let b = JsValue::Object(ClassBuilder::new(&realm, "B").build().unwrap());
        for list in vec![
            vec![a.clone(), a.clone()],
            vec![a.clone(), b.clone(), a.clone()],
            vec![b.clone(), a.clone(), a.clone()],
        ] {
            let err = register_bases(&list).err().unwrap();
            assert_eq!(err.message(), "Duplicate superclass A");
        }
    }

    #[test]
    fn test_non_constructors_are_rejected() {
        let realm = CodeRealm::new();
        let f = create_builtin_function(&realm, "plain", |_, _| Ok(JsValue::Undefined));
        let err = register_bases(&[JsValue::Object(f)]).err().unwrap();
        assert_eq!(err.message(), "plain is not a constructor");
        let err = register_bases(&[JsValue::from(7)]).err().unwrap();
        assert_eq!(err.message(), "7 is not a constructor");
    }

    #[test]
    fn test_primitive_prototype_is_rejected() {
        let realm = CodeRealm::new();
        let t = constructible(&realm, "T");
        define_own_property(
            &t,
            PropertyKey::from("prototype"),
            PropertyDescriptor::new_data(JsValue::from(42)),
        );
        let err = register_bases(&[JsValue::Object(t)]).err().unwrap();
        assert_eq!(err.message(), "Property 'prototype' of T is not an object or null");
    }

    #[test]
    fn test_prototypes_skip_null_and_deduplicate() {
        let realm = CodeRealm::new();
        let shared = object_create(None);
        let (x, y, z) = (
            constructible(&realm, "X"),
            constructible(&realm, "Y"),
            constructible(&realm, "Z"),
        );
        for t in [&x, &y] {
            define_own_property(
                t,
                PropertyKey::from("prototype"),
                PropertyDescriptor::new_data(JsValue::Object(shared.clone())),
            );
        }
        define_own_property(
            &z,
            PropertyKey::from("prototype"),
            PropertyDescriptor::new_data(JsValue::Null),
        );
        let registration = register_bases(&[
            JsValue::Object(z.clone()),
            JsValue::Object(x.clone()),
            JsValue::Object(y.clone()),
        ])
        .unwrap();
        assert_eq!(registration.base_types.len(), 3);
        assert_eq!(registration.prototypes.len(), 1);
        assert!(registration.prototypes.contains(&shared));
        let order: Vec<_> = registration.base_types.iter().cloned().collect();
        assert!(Rc::ptr_eq(&order[0], &z));
        assert!(Rc::ptr_eq(&order[2], &y));
    }

    #[test]
    fn test_prototype_is_read_once() {
        let realm = CodeRealm::new();
        let t = constructible(&realm, "Counted");
        let reads = Rc::new(Cell::new(0));
        let r = reads.clone();
        let getter = create_builtin_function(&realm, "get prototype", move |_, _| {
            r.set(r.get() + 1);
            Ok(JsValue::Object(object_create(None)))
        });
        define_own_property(
            &t,
            PropertyKey::from("prototype"),
            PropertyDescriptor::new_accessor(Some(getter), None),
        );
        register_bases(&[JsValue::Object(t)]).unwrap();
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn test_name_falls_back_to_string_form() {
        let realm = CodeRealm::new();
        let anonymous = constructible(&realm, "");
        assert_eq!(name_of_type(&JsValue::Object(anonymous)), "function () { [native code] }");
        let odd = constructible(&realm, "not valid");
        assert_eq!(
            name_of_type(&JsValue::Object(odd)),
            "function not valid() { [native code] }"
        );
    }
}
