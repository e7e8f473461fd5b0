//! Walking and comparing `source()` chains.
//!
//! Rust errors carry no equality, so two links are considered the same error
//! when both their `Debug` and `Display` renderings agree. That covers
//! unit-like sentinel errors and value errors such as `io::Error` built from
//! the same kind and message. Addresses are not compared: every zero-sized
//! error shares one.
//!
//! Domain errors of other types than the one being matched are only
//! recognized in a chain once registered with [`register_app_error`].

use std::any::TypeId;
use std::error::Error;
use std::iter;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::{AppError, ErasedAppError, XError};

/// Iterate over `err` followed by every error reachable through `source()`.
pub fn iter_chain<'a>(
    err: &'a (dyn Error + 'static),
) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    iter::successors(Some(err), |&e| e.source())
}

/// First domain error of type `E` found in the chain of `err`.
///
/// A link is recognized when it is an `E` itself, or an [`XError<E>`], in
/// which case its domain error is returned.
pub fn find_app<'a, E: AppError>(err: &'a (dyn Error + 'static)) -> Option<&'a E> {
    iter_chain(err).find_map(recognize::<E>)
}

fn recognize<'a, E: AppError>(err: &'a (dyn Error + 'static)) -> Option<&'a E> {
    err.downcast_ref::<E>()
        .or_else(|| err.downcast_ref::<XError<E>>().map(XError::app))
}

fn recognize_erased<'a, T: AppError>(
    err: &'a (dyn Error + 'static),
) -> Option<&'a dyn ErasedAppError> {
    recognize::<T>(err).map(|app| app as &dyn ErasedAppError)
}

type Recognizer = for<'a> fn(&'a (dyn Error + 'static)) -> Option<&'a dyn ErasedAppError>;

static RECOGNIZERS: Lazy<RwLock<Vec<(TypeId, Recognizer)>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Make domain errors of type `T` (bare, or wrapped in an `XError<T>`)
/// recognizable by [`XError::is`] on structured errors of any domain type,
/// so that they are matched by code instead of being looked up among causes.
///
/// Registration is process-wide and idempotent. Like the marshaller, it
/// belongs in initialization code.
pub fn register_app_error<T: AppError>() {
    let id = TypeId::of::<T>();
    let mut recognizers = RECOGNIZERS.write().unwrap_or_else(PoisonError::into_inner);
    if recognizers.iter().any(|(known, _)| *known == id) {
        return;
    }
    recognizers.push((id, recognize_erased::<T> as Recognizer));
    #[cfg(feature = "tracing")]
    tracing::debug!(app_error = std::any::type_name::<T>(), "domain error type registered");
}

/// A domain error found in a chain: either of the type being matched, or of
/// some registered type.
pub(crate) enum Recognized<'a, E> {
    Same(&'a E),
    Other(&'a dyn ErasedAppError),
}

/// First link of `err`'s chain that carries a domain code.
pub(crate) fn find_code_bearer<'a, E: AppError>(
    err: &'a (dyn Error + 'static),
) -> Option<Recognized<'a, E>> {
    iter_chain(err).find_map(|link| {
        recognize::<E>(link)
            .map(Recognized::Same)
            .or_else(|| recognize_registered(link).map(Recognized::Other))
    })
}

fn recognize_registered<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a dyn ErasedAppError> {
    let recognizers = RECOGNIZERS.read().unwrap_or_else(PoisonError::into_inner);
    let found = recognizers.iter().find_map(|(_, recognize)| recognize(err));
    found
}

/// Codes of two domain errors of possibly different types, compared as JSON,
/// or by their `Display` text when either fails to encode.
pub(crate) fn same_code(a: &dyn ErasedAppError, b: &dyn ErasedAppError) -> bool {
    match (a.code_value(), b.code_value()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.code_string() == b.code_string(),
    }
}

/// Whether `a` and `b` denote the same error.
pub fn same_error(a: &(dyn Error + 'static), b: &(dyn Error + 'static)) -> bool {
    a.to_string() == b.to_string() && format!("{a:?}") == format!("{b:?}")
}

/// Whether any link in the chain of `err` is the same error as `target`.
pub fn error_is(err: &(dyn Error + 'static), target: &(dyn Error + 'static)) -> bool {
    iter_chain(err).any(|link| same_error(link, target))
}

/// Cause matching used by [`XError::is`].
///
/// A cause matches when either chain contains the other, or when the cause is
/// a nested `XError<E>` that matches `target` itself.
pub(crate) fn cause_matches<E: AppError>(
    cause: &(dyn Error + 'static),
    target: &(dyn Error + 'static),
) -> bool {
    if error_is(target, cause) || error_is(cause, target) {
        return true;
    }
    cause
        .downcast_ref::<XError<E>>()
        .is_some_and(|nested| nested.is(target))
}
