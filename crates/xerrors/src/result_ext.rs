use crate::{AppError, Cause, XError};

/// Extension trait for `Result` that wraps the error side into an [`XError`],
/// keeping the original error as the single cause.
///
/// Example
/// ```rust,ignore
/// use xerrors::ResultExt;
///
/// fn load(id: u64) -> Result<User, XError<AppErr>> {
///     db.fetch(id).wrap_err(ENTRY_NOT_FOUND, format!("user {id}"))
/// }
/// ```
pub trait ResultExt<T> {
    /// Wrap an `Err` with `app` and an override message.
    fn wrap_err<E: AppError>(self, app: E, message: impl Into<String>) -> Result<T, XError<E>>;

    /// Wrap an `Err` with `app` and no message.
    fn wrap_app<E: AppError>(self, app: E) -> Result<T, XError<E>>;

    /// Like [`ResultExt::wrap_app`], building the domain error only on `Err`.
    fn wrap_app_with<E, F>(self, app: F) -> Result<T, XError<E>>
    where
        E: AppError,
        F: FnOnce() -> E;
}

impl<T, C> ResultExt<T> for Result<T, C>
where
    C: Into<Cause>,
{
    fn wrap_err<E: AppError>(self, app: E, message: impl Into<String>) -> Result<T, XError<E>> {
        self.map_err(|cause| XError::new(app, message, [cause]))
    }

    fn wrap_app<E: AppError>(self, app: E) -> Result<T, XError<E>> {
        self.map_err(|cause| XError::new(app, String::new(), [cause]))
    }

    fn wrap_app_with<E, F>(self, app: F) -> Result<T, XError<E>>
    where
        E: AppError,
        F: FnOnce() -> E,
    {
        self.map_err(|cause| XError::new(app(), String::new(), [cause]))
    }
}
