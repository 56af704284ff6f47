use thiserror::Error;

use crate::runner::ds::error::JErrorType;

/// Every way composing, constructing or inspecting a composite class can fail.
///
/// At the host boundary these all become a `TypeError` carrying the message below, so
/// callers can match on the text without knowing about this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassesError {
    #[error("No superclasses specified")]
    NoBasesSpecified,
    #[error("Duplicate superclass {0}")]
    DuplicateBase(String),
    #[error("{0} is not a constructor")]
    NotConstructible(String),
    #[error("Property 'prototype' of {0} is not an object or null")]
    InvalidPrototype(String),
    #[error("Invalid arguments")]
    InvalidArguments,
    #[error("Mixed argument styles")]
    MixedArgumentStyles,
    #[error("Invalid arguments for superclass {0}")]
    InvalidArgumentsForBase(String),
    #[error("{0} is not a direct superclass")]
    NotADirectSuperclass(String),
    #[error("{0} is not a direct superclass")]
    NotADirectBase(String),
    #[error("Argument is not a function")]
    ArgumentNotCallable,
    #[error("Property 'prototype' of superclass {0} is null")]
    SuperclassPrototypeIsNull(String),
    #[error("Operation not supported")]
    OperationNotSupported,
    #[error("Corrupt prototype list")]
    CorruptPrototypeList,
    #[error("Class constructor {0} cannot be invoked without 'new'")]
    ConstructorRequiresNew(String),
}

impl From<ClassesError> for JErrorType {
    fn from(e: ClassesError) -> Self {
        JErrorType::TypeError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_stable() {
        assert_eq!(
            ClassesError::NoBasesSpecified.to_string(),
            "No superclasses specified"
        );
        assert_eq!(
            ClassesError::InvalidPrototype("42".to_string()).to_string(),
            "Property 'prototype' of 42 is not an object or null"
        );
        assert_eq!(
            ClassesError::NotADirectBase("A".to_string()).to_string(),
            ClassesError::NotADirectSuperclass("A".to_string()).to_string()
        );
    }

    #[test]
    fn test_converts_to_type_error() {
        let e: JErrorType = ClassesError::MixedArgumentStyles.into();
        assert!(e.is_type_error());
        assert_eq!(e.message(), "Mixed argument styles");
        assert_eq!(e.to_string(), "Uncaught type error: Mixed argument styles.");
    }
}
