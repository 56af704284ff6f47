extern crate just_classes;

use just_classes::runner::ds::class_object::ClassBuilder;
use just_classes::runner::ds::object::{object_create, JsObjectType};
use just_classes::runner::ds::object_property::PropertyKey;
use just_classes::runner::ds::operations::object::{
    call, construct, create_list_from_array_like, get, has_own_property,
};
use just_classes::runner::ds::operations::test_and_comparison::instance_of;
use just_classes::runner::ds::realm::CodeRealm;
use just_classes::runner::ds::value::JsValue;
use just_classes::runner::plugin::{install, ConfigError, InstallConfig};
use pretty_assertions::assert_eq;
use std::fs;

fn binding(global: &JsObjectType, name: &str) -> JsValue {
    get(global, &PropertyKey::from(name)).unwrap()
}

// ── Installation ─────────────────────────────────────────────────────

#[test]
fn test_install_once() {
    let realm = CodeRealm::new();
    let global = object_create(Some(realm.object_prototype()));
    assert!(install(&realm, &global, &InstallConfig::default()).unwrap());
    let first = binding(&global, "classes");
    assert!(!install(&realm, &global, &InstallConfig::default()).unwrap());
    assert_eq!(binding(&global, "classes"), first);
    assert!(has_own_property(&global, &PropertyKey::from("getPrototypeListOf")));
}

#[test]
fn test_installed_bindings_work_together() {
    let realm = CodeRealm::new();
    let global = object_create(Some(realm.object_prototype()));
    install(&realm, &global, &InstallConfig::default()).unwrap();

    let a = ClassBuilder::new(&realm, "A").build().unwrap();
    let b = ClassBuilder::new(&realm, "B").build().unwrap();
    let composite = call(
        &binding(&global, "classes"),
        &JsValue::Undefined,
        vec![JsValue::from(&a), JsValue::from(&b)],
    )
    .unwrap();
    assert_eq!(
        get(composite.as_object().unwrap(), &PropertyKey::from("name")).unwrap(),
        JsValue::from("(A,B)")
    );

    let list = call(
        &binding(&global, "getPrototypeListOf"),
        &JsValue::Undefined,
        vec![composite.clone()],
    )
    .unwrap();
    assert_eq!(
        create_list_from_array_like(&list).unwrap(),
        vec![JsValue::from(&a), JsValue::from(&b)]
    );

    let c = ClassBuilder::new(&realm, "C")
        .extends(composite.clone())
        .build()
        .unwrap();
    let instance = JsValue::Object(construct(&c, vec![], None).unwrap());
    assert!(instance_of(&instance, &JsValue::from(&b)).unwrap());
}

#[test]
fn test_classes_binding_reports_errors() {
    let realm = CodeRealm::new();
    let global = object_create(None);
    install(&realm, &global, &InstallConfig::default()).unwrap();
    let err = call(&binding(&global, "classes"), &JsValue::Undefined, vec![]).unwrap_err();
    assert_eq!(err.message(), "No superclasses specified");
    let err = call(
        &binding(&global, "getPrototypeListOf"),
        &JsValue::Undefined,
        vec![JsValue::Null],
    )
    .unwrap_err();
    assert!(err.is_type_error());
}

// ── Configuration ────────────────────────────────────────────────────

#[test]
fn test_install_from_config_file() {
    let path = std::env::temp_dir().join(format!("just-classes-{}.toml", std::process::id()));
    fs::write(
        &path,
        "[bindings]\nclasses = \"multi\"\nprototype_list = \"parentsOf\"\n",
    )
    .unwrap();
    let config = InstallConfig::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let realm = CodeRealm::new();
    let global = object_create(None);
    assert!(install(&realm, &global, &config).unwrap());
    assert!(has_own_property(&global, &PropertyKey::from("multi")));
    assert!(has_own_property(&global, &PropertyKey::from("parentsOf")));
    assert!(!has_own_property(&global, &PropertyKey::from("classes")));
}

#[test]
fn test_config_errors() {
    match InstallConfig::parse("[bindings]\nclasses = 1") {
        Err(ConfigError::Parse(_)) => {}
        other => panic!("expected a parse error, got {:?}", other),
    }
}
