//! Native definition of ES-style classes.
//!
//! A [`ClassBuilder`] produces a class constructor function object that behaves like the
//! result of a `class` declaration: the constructor cannot be called without `new`, base
//! classes allocate `this` from `new.target.prototype`, and derived classes obtain `this`
//! by constructing their current `[[Prototype]]` with `new.target` propagated.
//!
//! ```
//! use just_classes::runner::ds::class_object::ClassBuilder;
//! use just_classes::runner::ds::operations::object::{construct, get, put};
//! use just_classes::runner::ds::object_property::PropertyKey;
//! use just_classes::runner::ds::realm::CodeRealm;
//! use just_classes::runner::ds::value::JsValue;
//!
//! let realm = CodeRealm::new();
//! let point = ClassBuilder::new(&realm, "Point")
//!     .constructor(|this, args, _| {
//!         let x = args.first().cloned().unwrap_or(JsValue::Undefined);
//!         put(this.as_object().unwrap(), &PropertyKey::from("x"), x)
//!     })
//!     .build()
//!     .unwrap();
//! let p = construct(&point, vec![JsValue::from(3)], None).unwrap();
//! assert_eq!(get(&p, &PropertyKey::from("x")).unwrap(), JsValue::from(3));
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{
    create_builtin_function, function_object_create, FunctionKind, FunctionObject,
    FunctionObjectBase, NativeConstructFn,
};
use crate::runner::ds::object::{object_create, JsObjectType, ObjectType};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::operations::object::{
    construct, define_property_or_throw, get, get_own_property, get_prototype_of,
    ordinary_create_from_constructor,
};
use crate::runner::ds::operations::test_and_comparison::is_constructor;
use crate::runner::ds::operations::type_conversion::to_display_string;
use crate::runner::ds::realm::JsCodeRealmType;
use crate::runner::ds::value::JsValue;

/// Runs after `this` exists: receives `this`, the constructor arguments and `new.target`.
pub type ClassInitializer =
    Rc<dyn Fn(&JsValue, &[JsValue], &JsObjectType) -> Result<(), JErrorType>>;

/// Maps a derived constructor's arguments to the arguments of its `super(...)` call.
pub type SuperArgumentsMapper = Rc<dyn Fn(&[JsValue]) -> Result<Vec<JsValue>, JErrorType>>;

enum MemberKind {
    Method(JsObjectType),
    Getter(JsObjectType),
    Setter(JsObjectType),
    Value(JsValue),
}

struct ClassMember {
    key: PropertyKey,
    is_static: bool,
    kind: MemberKind,
}

pub struct ClassBuilder {
    realm: JsCodeRealmType,
    name: String,
    heritage: Option<JsValue>,
    initializer: Option<ClassInitializer>,
    super_arguments: Option<SuperArgumentsMapper>,
    members: Vec<ClassMember>,
}
impl ClassBuilder {
    pub fn new(realm: &JsCodeRealmType, name: &str) -> Self {
        ClassBuilder {
            realm: realm.clone(),
            name: name.to_string(),
            heritage: None,
            initializer: None,
            super_arguments: None,
            members: Vec::new(),
        }
    }

    /// `class X extends <parent>`; `parent` may be `JsValue::Null`.
    pub fn extends(mut self, parent: impl Into<JsValue>) -> Self {
        self.heritage = Some(parent.into());
        self
    }

    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&JsValue, &[JsValue], &JsObjectType) -> Result<(), JErrorType> + 'static,
    {
        self.initializer = Some(Rc::new(f));
        self
    }

    pub fn super_arguments<F>(mut self, f: F) -> Self
    where
        F: Fn(&[JsValue]) -> Result<Vec<JsValue>, JErrorType> + 'static,
    {
        self.super_arguments = Some(Rc::new(f));
        self
    }

    pub fn method<F>(self, key: impl Into<PropertyKey>, f: F) -> Self
    where
        F: Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + 'static,
    {
        self.add_method(key.into(), false, f)
    }

    pub fn static_method<F>(self, key: impl Into<PropertyKey>, f: F) -> Self
    where
        F: Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + 'static,
    {
        self.add_method(key.into(), true, f)
    }

    pub fn getter<F>(self, key: impl Into<PropertyKey>, f: F) -> Self
    where
        F: Fn(&JsValue) -> Result<JsValue, JErrorType> + 'static,
    {
        self.add_getter(key.into(), false, f)
    }

    pub fn static_getter<F>(self, key: impl Into<PropertyKey>, f: F) -> Self
    where
        F: Fn(&JsValue) -> Result<JsValue, JErrorType> + 'static,
    {
        self.add_getter(key.into(), true, f)
    }

    pub fn setter<F>(self, key: impl Into<PropertyKey>, f: F) -> Self
    where
        F: Fn(&JsValue, JsValue) -> Result<(), JErrorType> + 'static,
    {
        self.add_setter(key.into(), false, f)
    }

    pub fn static_setter<F>(self, key: impl Into<PropertyKey>, f: F) -> Self
    where
        F: Fn(&JsValue, JsValue) -> Result<(), JErrorType> + 'static,
    {
        self.add_setter(key.into(), true, f)
    }

    /// A static data property, e.g. `static x = 1`.
    pub fn static_value(mut self, key: impl Into<PropertyKey>, value: JsValue) -> Self {
        self.members.push(ClassMember {
            key: key.into(),
            is_static: true,
            kind: MemberKind::Value(value),
        });
        self
    }

    fn add_method<F>(mut self, key: PropertyKey, is_static: bool, f: F) -> Self
    where
        F: Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + 'static,
    {
        let method = create_builtin_function(&self.realm, &key.to_string(), f);
        self.members.push(ClassMember {
            key,
            is_static,
            kind: MemberKind::Method(method),
        });
        self
    }

    fn add_getter<F>(mut self, key: PropertyKey, is_static: bool, f: F) -> Self
    where
        F: Fn(&JsValue) -> Result<JsValue, JErrorType> + 'static,
    {
        let getter =
            create_builtin_function(&self.realm, &format!("get {}", key), move |this, _| f(this));
        self.members.push(ClassMember {
            key,
            is_static,
            kind: MemberKind::Getter(getter),
        });
        self
    }

    fn add_setter<F>(mut self, key: PropertyKey, is_static: bool, f: F) -> Self
    where
        F: Fn(&JsValue, JsValue) -> Result<(), JErrorType> + 'static,
    {
        let setter = create_builtin_function(&self.realm, &format!("set {}", key), move |this, args| {
            f(this, args.into_iter().next().unwrap_or(JsValue::Undefined))?;
            Ok(JsValue::Undefined)
        });
        self.members.push(ClassMember {
            key,
            is_static,
            kind: MemberKind::Setter(setter),
        });
        self
    }

    pub fn build(self) -> Result<JsObjectType, JErrorType> {
        let (proto_parent, constructor_parent) = match &self.heritage {
            None => (
                Some(self.realm.object_prototype()),
                self.realm.function_prototype(),
            ),
            Some(JsValue::Null) => (None, self.realm.function_prototype()),
            Some(parent) => {
                let parent_obj = match parent {
                    JsValue::Object(p) if is_constructor(parent) => p.clone(),
                    _ => {
                        return Err(JErrorType::TypeError(format!(
                            "Class extends value {} is not a constructor or null",
                            to_display_string(parent)
                        )))
                    }
                };
                let proto_parent = match get(&parent_obj, &PropertyKey::from("prototype"))? {
                    JsValue::Object(p) => Some(p),
                    JsValue::Null => None,
                    other => {
                        return Err(JErrorType::TypeError(format!(
                            "Class extends value does not have valid prototype property {}",
                            to_display_string(&other)
                        )))
                    }
                };
                (proto_parent, parent_obj)
            }
        };
        let is_derived = self.heritage.is_some();
        let prototype = object_create(proto_parent);

        let self_ref: Rc<RefCell<Weak<RefCell<ObjectType>>>> = Rc::new(RefCell::new(Weak::new()));
        let state = ClassConstructor {
            self_ref: self_ref.clone(),
            name: self.name.to_string(),
            is_derived,
            fallback_prototype: self.realm.object_prototype(),
            initializer: self.initializer.clone(),
            super_arguments: self.super_arguments.clone(),
        };
        let construct_behaviour: NativeConstructFn =
            Rc::new(move |args: Vec<JsValue>, new_target: &JsObjectType| {
                state.construct(args, new_target)
            });

        let f = function_object_create(Box::new(FunctionObject::new(
            FunctionObjectBase::new(
                self.name.to_string(),
                FunctionKind::ClassConstructor,
                Some(constructor_parent),
            ),
            None,
            Some(construct_behaviour),
        )));
        *self_ref.borrow_mut() = Rc::downgrade(&f);

        define_property_or_throw(
            &f,
            PropertyKey::from("prototype"),
            PropertyDescriptor::new_readonly(JsValue::Object(prototype.clone()), false),
        )?;
        define_property_or_throw(
            &prototype,
            PropertyKey::from("constructor"),
            PropertyDescriptor::new_hidden(JsValue::Object(f.clone())),
        )?;
        for member in self.members {
            let home = if member.is_static { &f } else { &prototype };
            let descriptor = match member.kind {
                MemberKind::Method(m) => PropertyDescriptor::new_hidden(JsValue::Object(m)),
                MemberKind::Value(v) => PropertyDescriptor::new_data(v),
                MemberKind::Getter(g) => {
                    let setter = existing_accessor_half(home, &member.key, false);
                    PropertyDescriptor::new_accessor(Some(g), setter)
                }
                MemberKind::Setter(s) => {
                    let getter = existing_accessor_half(home, &member.key, true);
                    PropertyDescriptor::new_accessor(getter, Some(s))
                }
            };
            define_property_or_throw(home, member.key, descriptor)?;
        }
        Ok(f)
    }
}

/// What `new` does for a class built by `ClassBuilder`.
struct ClassConstructor {
    // Weak, since the function object owns this state.
    self_ref: Rc<RefCell<Weak<RefCell<ObjectType>>>>,
    name: String,
    is_derived: bool,
    fallback_prototype: JsObjectType,
    initializer: Option<ClassInitializer>,
    super_arguments: Option<SuperArgumentsMapper>,
}
impl ClassConstructor {
    fn construct(
        &self,
        args: Vec<JsValue>,
        new_target: &JsObjectType,
    ) -> Result<JsObjectType, JErrorType> {
        let this = if self.is_derived {
            let f = self.self_ref.borrow().upgrade().ok_or_else(|| {
                JErrorType::ReferenceError(format!("Class constructor {} is gone", self.name))
            })?;
            let parent = match get_prototype_of(&f) {
                Some(p) if is_constructor(&JsValue::Object(p.clone())) => p,
                _ => {
                    return Err(JErrorType::TypeError(format!(
                        "Super constructor of class {} is not a constructor",
                        self.name
                    )))
                }
            };
            let super_args = match &self.super_arguments {
                Some(mapper) => mapper(&args)?,
                None => args.clone(),
            };
            construct(&parent, super_args, Some(new_target))?
        } else {
            ordinary_create_from_constructor(new_target, &self.fallback_prototype)?
        };
        if let Some(init) = &self.initializer {
            init(&JsValue::Object(this.clone()), &args, new_target)?;
        }
        Ok(this)
    }
}

/// A getter and a setter declared separately for the same key share one accessor property.
fn existing_accessor_half(
    home: &JsObjectType,
    key: &PropertyKey,
    want_getter: bool,
) -> Option<JsObjectType> {
    match get_own_property(home, key) {
        Some(PropertyDescriptor::Accessor { get, set, .. }) => {
            if want_getter {
                get
            } else {
                set
            }
        }
        _ => None,
    }
}
