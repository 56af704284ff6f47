//! Publishing the bindings into a host's global object.
//!
//! ```
//! use just_classes::runner::ds::object::object_create;
//! use just_classes::runner::ds::realm::CodeRealm;
//! use just_classes::runner::plugin::config::InstallConfig;
//! use just_classes::runner::plugin::install::install;
//!
//! let realm = CodeRealm::new();
//! let global = object_create(Some(realm.object_prototype()));
//! assert!(install(&realm, &global, &InstallConfig::default()).unwrap());
//! // Already there, so nothing happens the second time.
//! assert!(!install(&realm, &global, &InstallConfig::default()).unwrap());
//! ```

use tracing::info;

use crate::runner::classes::{classes, get_prototype_list_of};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::create_builtin_function;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::operations::object::{define_property_or_throw, has_own_property};
use crate::runner::ds::realm::JsCodeRealmType;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::config::InstallConfig;

/// The `classes(...)` binding.
pub fn create_classes_function(realm: &JsCodeRealmType) -> JsObjectType {
    let r = realm.clone();
    create_builtin_function(realm, "classes", move |_, args| {
        Ok(JsValue::Object(classes(&r, &args)?))
    })
}

/// The `getPrototypeListOf(o)` binding.
pub fn create_prototype_list_function(realm: &JsCodeRealmType) -> JsObjectType {
    let r = realm.clone();
    create_builtin_function(realm, "getPrototypeListOf", move |_, args| {
        let v = args.first().cloned().unwrap_or(JsValue::Undefined);
        Ok(JsValue::Object(get_prototype_list_of(&r, &v)?))
    })
}

/// Defines both bindings on `global` unless it already owns the composition binding.
/// Returns whether anything was defined.
pub fn install(
    realm: &JsCodeRealmType,
    global: &JsObjectType,
    config: &InstallConfig,
) -> Result<bool, JErrorType> {
    let names = &config.bindings;
    if has_own_property(global, &PropertyKey::from(names.classes.as_str())) {
        return Ok(false);
    }
    define_property_or_throw(
        global,
        PropertyKey::from(names.classes.as_str()),
        PropertyDescriptor::new_hidden(JsValue::Object(create_classes_function(realm))),
    )?;
    define_property_or_throw(
        global,
        PropertyKey::from(names.prototype_list.as_str()),
        PropertyDescriptor::new_hidden(JsValue::Object(create_prototype_list_function(realm))),
    )?;
    info!(
        classes = %names.classes,
        prototype_list = %names.prototype_list,
        "installed classes bindings"
    );
    Ok(true)
}
