//! Structured application errors.
//!
//! An [`XError`] binds a consumer-defined domain error (anything implementing
//! [`AppError`]) to an optional override message and an ordered list of causes.
//! It renders as `"[<code>]: <text>"`, matches other errors by domain code or by
//! cause, and serializes through a swappable [`Marshaller`].
//!
//! ```rust,ignore
//! use xerrors::{AppError, XError};
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("{0}")]
//! struct NotFound(&'static str);
//!
//! impl AppError for NotFound {
//!     type Code = &'static str;
//!     fn code(&self) -> Self::Code { self.0 }
//! }
//!
//! let err = XError::with_message(NotFound("ENTRY_NOT_FOUND"), "user 42");
//! assert_eq!(err.to_string(), "[ENTRY_NOT_FOUND]: user 42");
//! assert_eq!(err.marshal_json().unwrap(), br#"{"code":"ENTRY_NOT_FOUND"}"#);
//! ```

pub mod app;
pub mod chain;
pub mod marshal;
pub mod result_ext;
pub mod xerror;

// public exports
pub use app::{AppError, ErasedAppError};
pub use chain::register_app_error;
pub use marshal::{
    current_marshaller, default_marshaller, reset_marshaller, set_marshaller, setup_marshaller,
    DefaultJson, MarshalError, MarshalResult, Marshaller, XErrorView,
};
pub use result_ext::ResultExt;
pub use xerror::{Cause, XError};
