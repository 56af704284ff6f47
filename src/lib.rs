//! # just-classes - Multiple inheritance for a prototype object model
//!
//! An ES-style object model in Rust (objects, functions, classes, proxies, realms) and, on
//! top of it, composite classes that inherit from several bases at once:
//! - Merged property resolution, first declared base first
//! - Per-base super references for members that several bases share
//! - Construction that runs every base constructor and merges their state
//! - `instanceof` that sees through composites, however deep the hierarchy
//! - Prototype-list introspection
//!
//! ## Quick Start
//!
//! ```
//! use just_classes::runner::classes::classes;
//! use just_classes::runner::ds::class_object::ClassBuilder;
//! use just_classes::runner::ds::object_property::PropertyKey;
//! use just_classes::runner::ds::operations::object::{construct, create_data_property, get};
//! use just_classes::runner::ds::operations::test_and_comparison::instance_of;
//! use just_classes::runner::ds::realm::CodeRealm;
//! use just_classes::runner::ds::value::JsValue;
//!
//! let realm = CodeRealm::new();
//! let named = ClassBuilder::new(&realm, "Named")
//!     .constructor(|this, _, _| {
//!         create_data_property(this.as_object().unwrap(), PropertyKey::from("name"), JsValue::from("n"));
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//! let sized = ClassBuilder::new(&realm, "Sized")
//!     .constructor(|this, _, _| {
//!         create_data_property(this.as_object().unwrap(), PropertyKey::from("size"), JsValue::from(3));
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//!
//! // class Box extends classes(Named, Sized) { }
//! let composite = classes(&realm, &[JsValue::from(&named), JsValue::from(&sized)]).unwrap();
//! let boxed = ClassBuilder::new(&realm, "Box").extends(&composite).build().unwrap();
//!
//! let b = construct(&boxed, vec![], None).unwrap();
//! assert_eq!(get(&b, &PropertyKey::from("name")).unwrap(), JsValue::from("n"));
//! assert_eq!(get(&b, &PropertyKey::from("size")).unwrap(), JsValue::from(3));
//! assert!(instance_of(&JsValue::from(&b), &JsValue::from(&sized)).unwrap());
//! ```
//!
//! ## Architecture
//!
//! - **[`runner::ds`]** - Data structures (values, objects, functions, classes, realms)
//! - **[`runner::classes`]** - Composite classes built from several bases
//! - **[`runner::plugin`]** - Publishing the bindings into a host global object

#[macro_use]
extern crate lazy_static;

pub mod runner;
