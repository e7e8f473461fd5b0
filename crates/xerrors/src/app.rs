use std::any::Any;
use std::error::Error;
use std::fmt::{Debug, Display};

use serde::Serialize;

/// A domain error that can be wrapped by [`XError`](crate::XError).
///
/// The code is the identity of the error: two domain errors with equal codes
/// are the same failure as far as [`XError::is`](crate::XError::is) is
/// concerned, and it is the only field the default marshaller writes.
/// Implementations live in the consuming application, never in this crate.
pub trait AppError: Error + Send + Sync + 'static {
    type Code: PartialEq + Display + Debug + Serialize + Send + Sync;

    /// Stable code for this error. Must return the same value on every call.
    fn code(&self) -> Self::Code;

    /// Human readable text. Defaults to the `Display` rendering.
    fn message(&self) -> String {
        self.to_string()
    }
}

/// Object-safe face of an [`AppError`], handed to marshallers once the
/// concrete domain type has been erased.
pub trait ErasedAppError: Send + Sync {
    /// The code rendered with `Display`.
    fn code_string(&self) -> String;

    /// The code as JSON, following the `Serialize` impl of the code type.
    fn code_value(&self) -> Result<serde_json::Value, serde_json::Error>;

    fn text(&self) -> String;

    fn as_error(&self) -> &(dyn Error + Send + Sync + 'static);

    fn as_any(&self) -> &dyn Any;
}

impl<E: AppError> ErasedAppError for E {
    fn code_string(&self) -> String {
        self.code().to_string()
    }

    fn code_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.code())
    }

    fn text(&self) -> String {
        AppError::message(self)
    }

    fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("status {0}")]
    struct Status(u16);

    impl AppError for Status {
        type Code = u16;

        fn code(&self) -> Self::Code {
            self.0
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("quota")]
    struct Quota;

    impl AppError for Quota {
        type Code = &'static str;

        fn code(&self) -> Self::Code {
            "QUOTA_EXCEEDED"
        }

        fn message(&self) -> String {
            "quota exceeded for tenant".to_string()
        }
    }

    #[test]
    fn message_defaults_to_display() {
        assert_eq!(AppError::message(&Status(404)), "status 404");
        assert_eq!(AppError::message(&Quota), "quota exceeded for tenant");
    }

    #[test]
    fn erased_view_keeps_code_type() {
        let erased: &dyn ErasedAppError = &Status(503);
        assert_eq!(erased.code_value().unwrap(), serde_json::json!(503));
        assert_eq!(erased.code_string(), "503");
        assert_eq!(erased.text(), "status 503");
        assert_eq!(erased.as_error().to_string(), "status 503");
        assert!(erased.as_any().downcast_ref::<Status>().is_some());
        assert!(erased.as_any().downcast_ref::<Quota>().is_none());
    }
}
