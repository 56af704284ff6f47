//! `instanceof` across composite hierarchies.
//!
//! Every declared base gets a shared `[Symbol.hasInstance]` that first asks the ordinary
//! check and then walks prototype lists, which is the only way to see past a composite
//! prototype. The ordinary check may re-enter the shared function (bound constructors
//! forward to their target), so an in-progress scope makes nested calls use the walk
//! alone.

use std::cell::Cell;

use indexmap::IndexSet;
use tracing::debug;

use crate::runner::classes::prototype_list::{list_parents, prototype_list_of};
use crate::runner::classes::registry::{name_of_type, BaseTypeSet, ObjectIdentity};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{bound_target_function, create_builtin_function};
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::operations::object::{define_property_or_throw, get, get_own_property};
use crate::runner::ds::operations::test_and_comparison::{
    is_callable, is_constructor, ordinary_has_instance, same_object,
};
use crate::runner::ds::realm::JsCodeRealmType;
use crate::runner::ds::symbol::SYMBOL_HAS_INSTANCE;
use crate::runner::ds::value::JsValue;

const HAS_INSTANCE_INTRINSIC: &str = "%ClassesHasInstance%";

thread_local! {
    static CHECK_IN_PROGRESS: Cell<bool> = Cell::new(false);
}

/// Marks an outermost type check as running on this thread until dropped.
struct IdentityCheckScope;
impl IdentityCheckScope {
    /// `None` when a check is already running.
    fn enter() -> Option<IdentityCheckScope> {
        CHECK_IN_PROGRESS.with(|flag| {
            if flag.get() {
                None
            } else {
                flag.set(true);
                Some(IdentityCheckScope)
            }
        })
    }
}
impl Drop for IdentityCheckScope {
    fn drop(&mut self) {
        CHECK_IN_PROGRESS.with(|flag| flag.set(false));
    }
}

/// Whether `value` is an instance of `ctor`, composites included.
pub fn type_check(ctor: &JsValue, value: &JsValue) -> Result<bool, JErrorType> {
    if !is_callable(ctor) || !value.is_object() {
        return Ok(false);
    }
    if let Some(_scope) = IdentityCheckScope::enter() {
        if ordinary_has_instance(ctor, value)? {
            return Ok(true);
        }
    }
    let mut ctor = match ctor {
        JsValue::Object(c) => c.clone(),
        _ => return Ok(false),
    };
    while let Some(target) = bound_target_function(&ctor) {
        ctor = target;
    }
    match get(&ctor, &PropertyKey::from("prototype"))? {
        JsValue::Object(proto) => is_prototype_of(&proto, value),
        _ => Ok(false),
    }
}

/// Whether `proto` appears anywhere in the prototype tree of `value`.
pub fn is_prototype_of(proto: &JsObjectType, value: &JsValue) -> Result<bool, JErrorType> {
    if !value.is_object() {
        return Ok(false);
    }
    let mut visited = IndexSet::new();
    let mut pending = prototype_list_of(value)?;
    pending.reverse();
    while let Some(node) = pending.pop() {
        if same_object(&node, proto) {
            return Ok(true);
        }
        if !visited.insert(ObjectIdentity(node.clone())) {
            continue;
        }
        let mut parents = list_parents(&node)?;
        parents.reverse();
        pending.extend(parents);
    }
    Ok(false)
}

/// The realm-wide `[Symbol.hasInstance]` shared by every participating base.
pub fn shared_has_instance(realm: &JsCodeRealmType) -> JsObjectType {
    realm.get_or_create_intrinsic(HAS_INSTANCE_INTRINSIC, || {
        create_builtin_function(realm, "[Symbol.hasInstance]", |this, args| {
            let value = args.first().cloned().unwrap_or(JsValue::Undefined);
            Ok(JsValue::Boolean(type_check(this, &value)?))
        })
    })
}

/// Whether `o` or one of its prototype-list ancestors owns `has_instance`.
fn inherits_has_instance(o: &JsObjectType, has_instance: &JsObjectType) -> Result<bool, JErrorType> {
    let key = PropertyKey::Sym(SYMBOL_HAS_INSTANCE.clone());
    let mut visited = IndexSet::new();
    let mut pending = vec![o.clone()];
    while let Some(node) = pending.pop() {
        if !visited.insert(ObjectIdentity(node.clone())) {
            continue;
        }
        if let Some(PropertyDescriptor::Data {
            value: JsValue::Object(f),
            ..
        }) = get_own_property(&node, &key)
        {
            if same_object(&f, has_instance) {
                return Ok(true);
            }
        }
        pending.extend(list_parents(&node)?);
    }
    Ok(false)
}

/// Gives each base the shared `[Symbol.hasInstance]` unless it already reaches it, or
/// defines its own.
///
/// Constructible ancestors are handled first, so in `class B extends A` the function lands
/// on `A` and `B` inherits it. That keeps `instanceof A` working for composites that only
/// name `B`.
pub fn install_has_instance(
    realm: &JsCodeRealmType,
    base_types: &BaseTypeSet,
) -> Result<(), JErrorType> {
    let has_instance = shared_has_instance(realm);
    let mut visited = IndexSet::new();
    for base in base_types.iter() {
        install_on_type(base, &has_instance, &mut visited)?;
    }
    Ok(())
}

fn install_on_type(
    t: &JsObjectType,
    has_instance: &JsObjectType,
    visited: &mut IndexSet<ObjectIdentity>,
) -> Result<(), JErrorType> {
    if !visited.insert(ObjectIdentity(t.clone())) {
        return Ok(());
    }
    let name = name_of_type(&JsValue::Object(t.clone()));
    if inherits_has_instance(t, has_instance)? {
        debug!(base = %name, "hasInstance already inherited");
        return Ok(());
    }
    for parent in list_parents(t)? {
        if is_constructor(&JsValue::Object(parent.clone())) {
            install_on_type(&parent, has_instance, visited)?;
        }
    }
    if inherits_has_instance(t, has_instance)? {
        debug!(base = %name, "hasInstance inherited from ancestor");
        return Ok(());
    }
    let key = PropertyKey::Sym(SYMBOL_HAS_INSTANCE.clone());
    if get_own_property(t, &key).is_some() {
        debug!(base = %name, "base defines its own hasInstance");
        return Ok(());
    }
    debug!(base = %name, "installing hasInstance");
    define_property_or_throw(
        t,
        key,
        PropertyDescriptor::new_hidden(JsValue::Object(has_instance.clone())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::classes::merge_view::{merge_view_create, MergeKind};
    use crate::runner::ds::class_object::ClassBuilder;
    use crate::runner::ds::object::object_create;
    use crate::runner::ds::operations::object::construct;
    use crate::runner::ds::operations::test_and_comparison::instance_of;
    use crate::runner::ds::realm::CodeRealm;

    #[test]
    fn test_walks_through_merge_views() {
        let left = object_create(None);
        let right = object_create(None);
        let view = merge_view_create(
            object_create(None),
            MergeKind::Prototype,
            vec![JsValue::Object(left.clone()), JsValue::Object(right.clone())],
        );
        let instance = JsValue::Object(object_create(Some(object_create(Some(view)))));
        assert!(is_prototype_of(&left, &instance).unwrap());
        assert!(is_prototype_of(&right, &instance).unwrap());
        assert!(!is_prototype_of(&object_create(None), &instance).unwrap());
        assert!(!is_prototype_of(&left, &JsValue::from(1)).unwrap());
    }

    #[test]
    fn test_type_check_rejects_non_objects() {
        let realm = CodeRealm::new();
        let a = JsValue::Object(ClassBuilder::new(&realm, "A").build().unwrap());
        assert!(!type_check(&a, &JsValue::from("str")).unwrap());
        assert!(!type_check(&JsValue::from(1), &a).unwrap());
    }

    #[test]
    fn test_scope_resets_after_check() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let instance = JsValue::Object(construct(&a, vec![], None).unwrap());
        assert!(type_check(&JsValue::Object(a.clone()), &instance).unwrap());
        assert!(IdentityCheckScope::enter().is_some());
    }

    #[test]
    fn test_scope_resets_when_check_fails() {
        let realm = CodeRealm::new();
        let broken = create_builtin_function(&realm, "Broken", |_, _| Ok(JsValue::Undefined));
        let failing_getter = create_builtin_function(&realm, "get prototype", |_, _| {
            Err(JErrorType::TypeError("prototype unavailable".to_string()))
        });
        define_property_or_throw(
            &broken,
            PropertyKey::from("prototype"),
            PropertyDescriptor::new_accessor(Some(failing_getter), None),
        )
        .unwrap();
        let plain = JsValue::Object(object_create(None));
        let err = type_check(&JsValue::Object(broken), &plain).unwrap_err();
        assert_eq!(err.message(), "prototype unavailable");
        assert!(IdentityCheckScope::enter().is_some());

        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let mut bases = BaseTypeSet::new();
        bases.insert(a.clone());
        install_has_instance(&realm, &bases).unwrap();
        let a_prototype = get(&a, &PropertyKey::from("prototype")).unwrap();
        let view = merge_view_create(object_create(None), MergeKind::Prototype, vec![a_prototype]);
        let instance = JsValue::Object(object_create(Some(view)));
        assert!(instance_of(&instance, &JsValue::Object(a)).unwrap());
    }

    #[test]
    fn test_install_is_skipped_for_custom_has_instance() {
        let realm = CodeRealm::new();
        let custom = create_builtin_function(&realm, "custom", |_, _| Ok(JsValue::from(true)));
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        define_property_or_throw(
            &a,
            PropertyKey::Sym(SYMBOL_HAS_INSTANCE.clone()),
            PropertyDescriptor::new_hidden(JsValue::Object(custom.clone())),
        )
        .unwrap();
        let b = ClassBuilder::new(&realm, "B").build().unwrap();
        let mut bases = BaseTypeSet::new();
        bases.insert(a.clone());
        bases.insert(b.clone());
        install_has_instance(&realm, &bases).unwrap();

        let key = PropertyKey::Sym(SYMBOL_HAS_INSTANCE.clone());
        assert_eq!(
            get_own_property(&a, &key).unwrap().value(),
            JsValue::Object(custom)
        );
        assert_eq!(
            get_own_property(&b, &key).unwrap().value(),
            JsValue::Object(shared_has_instance(&realm))
        );
    }

    #[test]
    fn test_install_lands_on_root_ancestor() {
        let realm = CodeRealm::new();
        let a = ClassBuilder::new(&realm, "A").build().unwrap();
        let b = ClassBuilder::new(&realm, "B").extends(&a).build().unwrap();
        let mut bases = BaseTypeSet::new();
        bases.insert(b.clone());
        install_has_instance(&realm, &bases).unwrap();

        let key = PropertyKey::Sym(SYMBOL_HAS_INSTANCE.clone());
        assert!(get_own_property(&a, &key).is_some());
        assert!(get_own_property(&b, &key).is_none());
        assert!(get_own_property(&realm.function_prototype(), &key)
            .map(|d| d.value() != JsValue::Object(shared_has_instance(&realm)))
            .unwrap_or(false));
    }
}
