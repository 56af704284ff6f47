//! `new` on a composite constructor.
//!
//! Arguments come in one of two styles, fixed by the first argument that is not
//! `undefined`:
//!
//! ```text
//! new C([a1, a2], [b1])                                  // positional, one list per base
//! new C({ base: B, arguments: [b1] }, { base: A })       // tagged, any order
//! ```
//!
//! Each base is then constructed in declaration order with `new.target` kept as the most
//! derived class, and the own properties of each result are copied onto `this` unless
//! `this` already has them.

use tracing::debug;

use crate::runner::classes::error::ClassesError;
use crate::runner::classes::registry::{name_of_type, BaseTypeSet};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::{
    construct, create_list_from_array_like, define_property_or_throw, get, get_own_property,
    has_own_property, has_property, is_array_like, ordinary_create_from_constructor,
    own_property_keys,
};
use crate::runner::ds::realm::JsCodeRealmType;
use crate::runner::ds::value::JsValue;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ArgumentStyle {
    Positional,
    Tagged,
}

fn style_of(arg: &JsValue) -> Result<Option<ArgumentStyle>, JErrorType> {
    match arg {
        JsValue::Undefined => Ok(None),
        JsValue::Object(o) => {
            if has_property(o, &PropertyKey::from("base"))? {
                Ok(Some(ArgumentStyle::Tagged))
            } else {
                Ok(Some(ArgumentStyle::Positional))
            }
        }
        _ => Err(ClassesError::InvalidArguments.into()),
    }
}

/// The argument list each base is constructed with, in `base_types` order.
pub fn resolve_base_arguments(
    base_types: &BaseTypeSet,
    args: &[JsValue],
) -> Result<Vec<Vec<JsValue>>, JErrorType> {
    let mut style = None;
    for arg in args {
        match (style, style_of(arg)?) {
            (_, None) => {}
            (None, found) => style = found,
            (Some(current), Some(found)) if current != found => {
                return Err(ClassesError::MixedArgumentStyles.into())
            }
            _ => {}
        }
    }
    debug!(style = ?style, "resolving superclass arguments");
    let mut resolved = vec![Vec::new(); base_types.len()];
    match style {
        None => {}
        Some(ArgumentStyle::Positional) => {
            for (slot, arg) in resolved.iter_mut().zip(args.iter()) {
                if let JsValue::Object(_) = arg {
                    *slot = create_list_from_array_like(arg)?;
                }
            }
        }
        Some(ArgumentStyle::Tagged) => {
            let bases: Vec<&JsObjectType> = base_types.iter().collect();
            let mut seen = vec![false; bases.len()];
            for arg in args {
                let o = match arg {
                    JsValue::Object(o) => o,
                    _ => continue,
                };
                let base = get(o, &PropertyKey::from("base"))?;
                let index = match &base {
                    JsValue::Object(b) => bases.iter().position(|d| std::rc::Rc::ptr_eq(d, b)),
                    _ => None,
                };
                let index = match index {
                    Some(i) => i,
                    None => {
                        return Err(ClassesError::NotADirectSuperclass(name_of_type(&base)).into())
                    }
                };
                if seen[index] {
                    return Err(ClassesError::DuplicateBase(name_of_type(&base)).into());
                }
                seen[index] = true;
                let base_args = get(o, &PropertyKey::from("arguments"))?;
                match &base_args {
                    JsValue::Undefined => {}
                    v if is_array_like(v) => resolved[index] = create_list_from_array_like(v)?,
                    _ => {
                        return Err(
                            ClassesError::InvalidArgumentsForBase(name_of_type(&base)).into()
                        )
                    }
                }
            }
        }
    }
    Ok(resolved)
}

/// Builds an instance of a composite: `this` comes from `new_target`, then every base
/// contributes the own properties nobody before it claimed.
pub fn construct_composite(
    realm: &JsCodeRealmType,
    base_types: &BaseTypeSet,
    args: Vec<JsValue>,
    new_target: &JsObjectType,
) -> Result<JsObjectType, JErrorType> {
    let per_base = resolve_base_arguments(base_types, &args)?;
    let this = ordinary_create_from_constructor(new_target, &realm.object_prototype())?;
    for (base, base_args) in base_types.iter().zip(per_base.into_iter()) {
        debug!(base = %name_of_type(&JsValue::Object(base.clone())), "constructing superclass");
        let part = construct(base, base_args, Some(new_target))?;
        for key in own_property_keys(&part) {
            if has_own_property(&this, &key) {
                continue;
            }
            if let Some(descriptor) = get_own_property(&part, &key) {
                define_property_or_throw(&this, key, descriptor)?;
            }
        }
    }
    Ok(this)
}
