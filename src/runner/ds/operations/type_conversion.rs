use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::{JsNumberType, JsValue};

pub fn to_boolean(v: &JsValue) -> bool {
    match v {
        JsValue::Undefined | JsValue::Null => false,
        JsValue::Boolean(b) => *b,
        JsValue::String(s) => !s.is_empty(),
        JsValue::Symbol(_) => true,
        JsValue::Number(n) => match n {
            JsNumberType::Integer(i) => *i != 0,
            JsNumberType::Float(f) => *f != 0.0,
            JsNumberType::NaN => false,
            JsNumberType::PositiveInfinity | JsNumberType::NegativeInfinity => true,
        },
        JsValue::Object(_) => true,
    }
}

/// String form used in diagnostics. Never runs host code, and tolerates objects that are
/// currently borrowed elsewhere.
pub fn to_display_string(v: &JsValue) -> String {
    match v {
        JsValue::Object(o) => match o.try_borrow() {
            Ok(ot) => match &*ot {
                ObjectType::Proxy(p) => match p.target().try_borrow() {
                    Ok(t) => t.as_js_object().to_string(),
                    Err(_) => "[object Proxy]".to_string(),
                },
                other => other.as_js_object().to_string(),
            },
            Err(_) => "[object Object]".to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::object::object_create;

    #[test]
    fn test_to_boolean() {
        assert!(!to_boolean(&JsValue::from("")));
        assert!(to_boolean(&JsValue::from("x")));
        assert!(!to_boolean(&JsValue::Number(JsNumberType::NaN)));
        assert!(to_boolean(&JsValue::Object(object_create(None))));
    }

    #[test]
    fn test_display_string() {
        assert_eq!(to_display_string(&JsValue::from(42)), "42");
        assert_eq!(to_display_string(&JsValue::Null), "null");
        assert_eq!(
            to_display_string(&JsValue::Object(object_create(None))),
            "[object Object]"
        );
    }
}
