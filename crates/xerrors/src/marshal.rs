//! Pluggable serialization for [`XError`](crate::XError).
//!
//! A [`Marshaller`] turns an [`XErrorView`] into bytes. One marshaller is
//! registered process-wide and used by [`XError::marshal_json`]; callers that
//! want a per-domain strategy pass one explicitly to
//! [`XError::marshal_json_with`].
//!
//! The registry sits behind an `RwLock`, but replacing the marshaller while
//! other threads are serializing leaves it unspecified which strategy those
//! calls observe. Install custom marshallers during initialization.
//!
//! Example
//! ```rust,ignore
//! use xerrors::{setup_marshaller, MarshalError};
//!
//! setup_marshaller(|view| {
//!     let typed = view
//!         .app_error::<TypedAppError>()
//!         .ok_or_else(MarshalError::unrecognized::<TypedAppError>)?;
//!     Ok(serde_json::to_vec(&serde_json::json!({
//!         "code": typed.code(),
//!         "type": typed.err_type,
//!     }))?)
//! });
//! ```
//!
//! [`XError::marshal_json`]: crate::XError::marshal_json
//! [`XError::marshal_json_with`]: crate::XError::marshal_json_with

use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::{Cause, ErasedAppError};

pub type MarshalResult = Result<Vec<u8>, MarshalError>;

#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    /// The marshaller does not know how to serialize this domain error.
    #[error("error marshalling: unrecognized domain error, expected {expected}")]
    Unrecognized { expected: &'static str },

    #[error("error marshalling: {0}")]
    Encode(#[from] serde_json::Error),
}

impl MarshalError {
    /// Shorthand for a strategy that expected a `T` in the domain slot.
    pub fn unrecognized<T: ?Sized>() -> Self {
        MarshalError::Unrecognized {
            expected: std::any::type_name::<T>(),
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, MarshalError::Unrecognized { .. })
    }
}

/// Read-only snapshot of a structured error: the domain error, its causes and
/// the fully rendered text.
pub struct XErrorView<'a> {
    app: &'a dyn ErasedAppError,
    causes: &'a [Cause],
    message: String,
}

impl<'a> XErrorView<'a> {
    pub fn new(app: &'a dyn ErasedAppError, causes: &'a [Cause], message: String) -> Self {
        Self {
            app,
            causes,
            message,
        }
    }

    pub fn app(&self) -> &'a dyn ErasedAppError {
        self.app
    }

    /// The domain error as a `T`, or `None` when it is some other type.
    pub fn app_error<T: Any>(&self) -> Option<&'a T> {
        self.app.as_any().downcast_ref::<T>()
    }

    pub fn code_value(&self) -> Result<serde_json::Value, MarshalError> {
        Ok(self.app.code_value()?)
    }

    pub fn causes(&self) -> &'a [Cause] {
        self.causes
    }

    /// The rendered error text, code prefix included.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for XErrorView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XErrorView")
            .field("code", &self.app.code_string())
            .field("causes", &self.causes)
            .field("message", &self.message)
            .finish()
    }
}

/// Wire shape written by [`default_marshaller`].
#[derive(Debug, Serialize)]
pub struct DefaultJson<C> {
    pub code: C,
}

/// Writes `{"code": <code>}`. The JSON type of `code` follows the domain
/// error's code type.
pub fn default_marshaller(view: &XErrorView<'_>) -> MarshalResult {
    let code = view.code_value()?;
    Ok(serde_json::to_vec(&DefaultJson { code })?)
}

type MarshalFn = dyn Fn(&XErrorView<'_>) -> MarshalResult + Send + Sync;

/// A shareable serialization strategy. Cheap to clone.
#[derive(Clone)]
pub struct Marshaller(Arc<MarshalFn>);

impl Marshaller {
    pub fn new<F>(strategy: F) -> Self
    where
        F: Fn(&XErrorView<'_>) -> MarshalResult + Send + Sync + 'static,
    {
        Marshaller(Arc::new(strategy))
    }

    pub fn marshal(&self, view: &XErrorView<'_>) -> MarshalResult {
        (self.0)(view)
    }
}

impl Default for Marshaller {
    fn default() -> Self {
        Marshaller::new(default_marshaller)
    }
}

impl fmt::Debug for Marshaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Marshaller(..)")
    }
}

static MARSHALLER: Lazy<RwLock<Marshaller>> = Lazy::new(|| RwLock::new(Marshaller::default()));

/// Replace the process-wide marshaller with `strategy`.
///
/// Applies to every later serialization, including errors built before this
/// call.
pub fn setup_marshaller<F>(strategy: F)
where
    F: Fn(&XErrorView<'_>) -> MarshalResult + Send + Sync + 'static,
{
    set_marshaller(Marshaller::new(strategy));
}

pub fn set_marshaller(marshaller: Marshaller) {
    // the guarded value is always a complete Arc, so a poisoned lock is still usable
    *MARSHALLER.write().unwrap_or_else(PoisonError::into_inner) = marshaller;
    #[cfg(feature = "tracing")]
    tracing::debug!("structured error marshaller replaced");
}

/// Restore [`default_marshaller`] as the process-wide marshaller.
pub fn reset_marshaller() {
    set_marshaller(Marshaller::default());
}

/// The marshaller currently registered. The lock is released before return,
/// so the strategy may itself call [`setup_marshaller`].
pub fn current_marshaller() -> Marshaller {
    MARSHALLER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppError, XError};

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct Named(&'static str);

    impl AppError for Named {
        type Code = &'static str;

        fn code(&self) -> Self::Code {
            self.0
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("http {0}")]
    struct Numeric(u16);

    impl AppError for Numeric {
        type Code = u16;

        fn code(&self) -> Self::Code {
            self.0
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("broken")]
    struct Broken;

    /// A code whose `Serialize` impl always fails.
    #[derive(Debug, PartialEq)]
    struct Unencodable;

    impl fmt::Display for Unencodable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("UNENCODABLE")
        }
    }

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(<S::Error as serde::ser::Error>::custom("refusing to encode"))
        }
    }

    impl AppError for Broken {
        type Code = Unencodable;

        fn code(&self) -> Self::Code {
            Unencodable
        }
    }

    #[test]
    fn default_shape_is_code_only() {
        let err = XError::new(Named("INVALID_INPUT"), "invalid user input", ["bad field"]);
        let bytes = err.marshal_json_with(&Marshaller::default()).unwrap();
        assert_eq!(bytes, br#"{"code":"INVALID_INPUT"}"#);
    }

    #[test]
    fn default_shape_keeps_numeric_codes() {
        let err = XError::from_app(Numeric(404));
        let bytes = err.marshal_json_with(&Marshaller::default()).unwrap();
        assert_eq!(bytes, br#"{"code":404}"#);
    }

    #[test]
    fn encode_failure_is_returned() {
        let err = XError::from_app(Broken);
        let result = err.marshal_json_with(&Marshaller::default());
        assert!(matches!(result, Err(MarshalError::Encode(_))));
    }

    #[test]
    fn injected_marshaller_sees_full_view() {
        let marshaller = Marshaller::new(|view| {
            Ok(serde_json::to_vec(&serde_json::json!({
                "code": view.code_value()?,
                "message": view.message(),
                "causes": view.causes().len(),
            }))?)
        });
        let err = XError::new(Named("ENTRY_NOT_FOUND"), "entry not found", ["no rows"]);
        let value: serde_json::Value =
            serde_json::from_slice(&err.marshal_json_with(&marshaller).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "code": "ENTRY_NOT_FOUND",
                "message": "[ENTRY_NOT_FOUND]: entry not found: no rows",
                "causes": 1,
            })
        );
    }

    #[test]
    fn strategy_rejects_unexpected_domain_type() {
        let marshaller = Marshaller::new(|view| {
            let numeric = view
                .app_error::<Numeric>()
                .ok_or_else(MarshalError::unrecognized::<Numeric>)?;
            Ok(numeric.0.to_string().into_bytes())
        });

        let ok = XError::from_app(Numeric(503)).marshal_json_with(&marshaller);
        assert_eq!(ok.unwrap(), b"503");

        let err = XError::from_app(Named("X"))
            .marshal_json_with(&marshaller)
            .unwrap_err();
        assert!(err.is_unrecognized());
        assert!(err.to_string().starts_with("error marshalling"));
    }

    #[test]
    fn view_debug_shows_code() {
        let err = XError::from_app(Named("INVALID_INPUT"));
        let rendered = format!("{:?}", err.view());
        assert!(rendered.contains("INVALID_INPUT"));
    }
}
