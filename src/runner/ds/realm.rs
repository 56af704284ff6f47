use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{
    bound_function_create, create_builtin_function, function_object_create, FunctionKind,
    FunctionObject, FunctionObjectBase, NativeCallFn,
};
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::operations::object::define_own_property;
use crate::runner::ds::operations::test_and_comparison::ordinary_has_instance;
use crate::runner::ds::symbol::SYMBOL_HAS_INSTANCE;
use crate::runner::ds::value::JsValue;

pub type JsCodeRealmType = Rc<CodeRealm>;

/// The intrinsics every object in a realm ultimately hangs off.
///
/// Host extensions may park their own realm-wide objects in the intrinsic table, keyed by a
/// `%Name%` style string.
pub struct CodeRealm {
    object_prototype: JsObjectType,
    function_prototype: JsObjectType,
    intrinsics: RefCell<HashMap<&'static str, JsObjectType>>,
}
impl CodeRealm {
    pub fn new() -> JsCodeRealmType {
        let object_prototype = object_create(None);
        let noop: NativeCallFn =
            Rc::new(|_this: &JsValue, _args: Vec<JsValue>| Ok::<_, JErrorType>(JsValue::Undefined));
        let function_prototype = function_object_create(Box::new(FunctionObject::new(
            FunctionObjectBase::new(
                String::new(),
                FunctionKind::Normal,
                Some(object_prototype.clone()),
            ),
            Some(noop),
            None,
        )));
        let realm = Rc::new(CodeRealm {
            object_prototype,
            function_prototype,
            intrinsics: RefCell::new(HashMap::new()),
        });
        realm.install_function_prototype_methods();
        realm
    }

    pub fn object_prototype(&self) -> JsObjectType {
        self.object_prototype.clone()
    }

    pub fn function_prototype(&self) -> JsObjectType {
        self.function_prototype.clone()
    }

    /// Returns the host intrinsic registered under `name`, creating it on first use.
    pub fn get_or_create_intrinsic<F>(&self, name: &'static str, create: F) -> JsObjectType
    where
        F: FnOnce() -> JsObjectType,
    {
        if let Some(o) = self.intrinsics.borrow().get(name) {
            return o.clone();
        }
        let o = create();
        self.intrinsics.borrow_mut().insert(name, o.clone());
        o
    }

    pub fn find_intrinsic(&self, name: &str) -> Option<JsObjectType> {
        self.intrinsics.borrow().get(name).cloned()
    }

    fn install_function_prototype_methods(self: &Rc<Self>) {
        let has_instance = create_builtin_function(self, "[Symbol.hasInstance]", |this, args| {
            let v = args.first().cloned().unwrap_or(JsValue::Undefined);
            Ok(JsValue::Boolean(ordinary_has_instance(this, &v)?))
        });
        let bind = create_builtin_function(self, "bind", |this, args| {
            let target = match this {
                JsValue::Object(o) => o.clone(),
                _ => {
                    return Err(JErrorType::TypeError(
                        "Bind must be called on a function".to_string(),
                    ))
                }
            };
            let mut args = args.into_iter();
            let bound_this = args.next().unwrap_or(JsValue::Undefined);
            Ok(JsValue::Object(bound_function_create(
                &target,
                bound_this,
                args.collect(),
            )?))
        });
        define_own_property(
            &self.function_prototype,
            PropertyKey::Sym(SYMBOL_HAS_INSTANCE.clone()),
            PropertyDescriptor::new_readonly(JsValue::Object(has_instance), false),
        );
        define_own_property(
            &self.function_prototype,
            PropertyKey::from("bind"),
            PropertyDescriptor::new_hidden(JsValue::Object(bind)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::operations::object::{get, get_prototype_of, invoke};

    #[test]
    fn test_function_prototype_chains_to_object_prototype() {
        let realm = CodeRealm::new();
        let parent = get_prototype_of(&realm.function_prototype()).unwrap();
        assert!(Rc::ptr_eq(&parent, &realm.object_prototype()));
        assert!(get_prototype_of(&realm.object_prototype()).is_none());
    }

    #[test]
    fn test_bind_is_reachable_from_builtins() {
        let realm = CodeRealm::new();
        let f = create_builtin_function(&realm, "id", |this, _| Ok(this.clone()));
        let bound = invoke(
            &JsValue::Object(f),
            &PropertyKey::from("bind"),
            vec![JsValue::from(5)],
        )
        .unwrap();
        let name = get(bound.as_object().unwrap(), &PropertyKey::from("name")).unwrap();
        assert_eq!(name, JsValue::from("bound id"));
    }

    #[test]
    fn test_intrinsic_slot_is_created_once() {
        let realm = CodeRealm::new();
        let first = realm.get_or_create_intrinsic("%Thing%", || object_create(None));
        let second = realm.get_or_create_intrinsic("%Thing%", || object_create(None));
        assert!(Rc::ptr_eq(&first, &second));
        assert!(realm.find_intrinsic("%Other%").is_none());
    }
}
