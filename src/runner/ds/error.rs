use thiserror::Error;

use crate::runner::ds::value::JsValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JErrorType {
    #[error("Uncaught reference error: {0}.")]
    ReferenceError(String),
    #[error("Uncaught type error: {0}.")]
    TypeError(String),
    #[error("Uncaught range error: {0}.")]
    RangeError(String),
    /// A value raised by host code, e.g. a constructor body that fails.
    #[error("Uncaught {0}")]
    Thrown(JsValue),
}
impl JErrorType {
    /// The bare message without the `Uncaught ...` framing.
    pub fn message(&self) -> String {
        match self {
            JErrorType::ReferenceError(m) => m.to_string(),
            JErrorType::TypeError(m) => m.to_string(),
            JErrorType::RangeError(m) => m.to_string(),
            JErrorType::Thrown(v) => v.to_string(),
        }
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, JErrorType::TypeError(_))
    }

    pub fn is_range_error(&self) -> bool {
        matches!(self, JErrorType::RangeError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_display() {
        let e = JErrorType::TypeError("x is not a function".to_string());
        assert_eq!(e.to_string(), "Uncaught type error: x is not a function.");
        assert_eq!(e.message(), "x is not a function");
        assert!(e.is_type_error());
    }

    #[test]
    fn test_thrown_value_message() {
        let e = JErrorType::Thrown(JsValue::from("boom"));
        assert_eq!(e.message(), "boom");
        assert!(!e.is_type_error());
    }
}
