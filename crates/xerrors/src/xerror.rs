use std::error::Error;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::chain::{self, Recognized};
use crate::marshal::{current_marshaller, MarshalResult, Marshaller, XErrorView};
use crate::AppError;

/// A nested failure carried by an [`XError`].
pub type Cause = Box<dyn Error + Send + Sync + 'static>;

const CAUSE_SEPARATOR: &str = "\n";

/// A domain error together with an optional message and the causes that led
/// to it.
///
/// Rendered as `"[<code>]: <text>"` where `<text>` is, in order of preference,
/// `"<message>: <causes>"`, `"<causes>"`, `"<message>"`, or the domain
/// error's own message. Causes are joined with a newline.
///
/// All three parts are fixed at construction.
#[derive(Debug)]
pub struct XError<E> {
    app: E,
    causes: Vec<Cause>,
    message: String,
}

impl<E: AppError> XError<E> {
    pub fn new<M, I>(app: E, message: M, causes: I) -> Self
    where
        M: Into<String>,
        I: IntoIterator,
        I::Item: Into<Cause>,
    {
        Self {
            app,
            causes: causes.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// Wrap a bare domain error: no message, no causes.
    pub fn from_app(app: E) -> Self {
        Self {
            app,
            causes: Vec::new(),
            message: String::new(),
        }
    }

    pub fn with_message(app: E, message: impl Into<String>) -> Self {
        Self {
            app,
            causes: Vec::new(),
            message: message.into(),
        }
    }

    pub fn app(&self) -> &E {
        &self.app
    }

    pub fn into_app(self) -> E {
        self.app
    }

    pub fn code(&self) -> E::Code {
        self.app.code()
    }

    pub fn causes(&self) -> &[Cause] {
        &self.causes
    }

    /// The override message; empty when none was given.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this error represents or contains `target`.
    ///
    /// If a domain error can be found in `target`'s chain (one of type `E`, or
    /// of a type registered with [`register_app_error`]), the answer is
    /// decided by comparing codes alone and the causes are never looked at.
    /// Otherwise the causes are scanned in order for a match.
    ///
    /// [`register_app_error`]: crate::chain::register_app_error
    pub fn is(&self, target: &(dyn Error + 'static)) -> bool {
        match chain::find_code_bearer::<E>(target) {
            Some(Recognized::Same(app)) => return app.code() == self.app.code(),
            Some(Recognized::Other(app)) => return chain::same_code(app, &self.app),
            None => {}
        }
        self.causes
            .iter()
            .any(|cause| chain::cause_matches::<E>(&**cause, target))
    }

    /// Read-only snapshot handed to marshallers.
    pub fn view(&self) -> XErrorView<'_> {
        XErrorView::new(&self.app, &self.causes, self.to_string())
    }

    /// Serialize with the process-wide marshaller.
    ///
    /// The registry is read on every call, so a marshaller installed after
    /// this error was built still applies.
    pub fn marshal_json(&self) -> MarshalResult {
        self.marshal_json_with(&current_marshaller())
    }

    /// Serialize with an explicitly supplied marshaller, bypassing the registry.
    pub fn marshal_json_with(&self, marshaller: &Marshaller) -> MarshalResult {
        let result = marshaller.marshal(&self.view());
        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::debug!(code = %self.app.code(), error = %err, "failed to marshal structured error");
        }
        result
    }

    /// Emit a tracing event carrying the rendered error and its code.
    #[cfg(feature = "tracing")]
    pub fn emit_tracing(&self, level: tracing::Level, message: &str) {
        use tracing::{event, Level};

        let code = self.app.code();
        let causes = self.causes.len();
        if level == Level::ERROR {
            event!(Level::ERROR, error = %self, %code, causes, "{message}");
        } else if level == Level::WARN {
            event!(Level::WARN, error = %self, %code, causes, "{message}");
        } else if level == Level::INFO {
            event!(Level::INFO, error = %self, %code, causes, "{message}");
        } else if level == Level::DEBUG {
            event!(Level::DEBUG, error = %self, %code, causes, "{message}");
        } else {
            event!(Level::TRACE, error = %self, %code, causes, "{message}");
        }
    }
}

impl<E: AppError> fmt::Display for XError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: ", self.app.code())?;

        if self.causes.is_empty() {
            if self.message.is_empty() {
                return f.write_str(&self.app.message());
            }
            return f.write_str(&self.message);
        }

        if !self.message.is_empty() {
            write!(f, "{}: ", self.message)?;
        }
        for (i, cause) in self.causes.iter().enumerate() {
            if i > 0 {
                f.write_str(CAUSE_SEPARATOR)?;
            }
            write!(f, "{cause}")?;
        }
        Ok(())
    }
}

impl<E: AppError> Error for XError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.causes
            .first()
            .map(|cause| &**cause as &(dyn Error + 'static))
    }
}

impl<E: AppError> From<E> for XError<E> {
    fn from(app: E) -> Self {
        Self::from_app(app)
    }
}

/// Serializes whatever the registered marshaller produces. The marshaller's
/// output must be JSON for this to succeed.
impl<E: AppError> Serialize for XError<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error as _;

        let bytes = self.marshal_json().map_err(S::Error::custom)?;
        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(S::Error::custom)?;
        value.serialize(serializer)
    }
}
