use crate::runner::classes::error::ClassesError;
use crate::runner::classes::merge_view::merge_view_objects;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::operations::object::{create_array_from_list, get_prototype_of};
use crate::runner::ds::realm::JsCodeRealmType;
use crate::runner::ds::value::JsValue;

/// The direct logical parents of `o`.
///
/// A composite constructor or prototype lists its bases (or their prototypes) in
/// declaration order; anything else lists its single native parent, if any. The result
/// is a fresh vector on every call.
pub fn list_parents(o: &JsObjectType) -> Result<Vec<JsObjectType>, JErrorType> {
    if let Some((_, objects)) = merge_view_objects(o) {
        return objects
            .into_iter()
            .map(|entry| match entry {
                JsValue::Object(p) => Ok(p),
                _ => Err(ClassesError::CorruptPrototypeList.into()),
            })
            .collect();
    }
    Ok(get_prototype_of(o).into_iter().collect())
}

/// `list_parents` for an arbitrary value. Primitives other than `undefined` and `null`
/// have no parents in this host.
pub fn prototype_list_of(v: &JsValue) -> Result<Vec<JsObjectType>, JErrorType> {
    match v {
        JsValue::Object(o) => list_parents(o),
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(
            "Cannot convert undefined or null to object".to_string(),
        )),
        _ => Ok(Vec::new()),
    }
}

/// The `getPrototypeListOf` binding: the prototype list as a new array object.
pub fn get_prototype_list_of(
    realm: &JsCodeRealmType,
    v: &JsValue,
) -> Result<JsObjectType, JErrorType> {
    let parents = prototype_list_of(v)?
        .into_iter()
        .map(JsValue::Object)
        .collect();
    Ok(create_array_from_list(realm, parents))
}
