#![allow(dead_code)]

use xerrors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("{app_code}")]
pub struct AppErr {
    pub app_code: &'static str,
    pub http_code: u16,
}

impl AppError for AppErr {
    type Code = &'static str;

    fn code(&self) -> Self::Code {
        self.app_code
    }
}

/// A domain error with an extra classification field, for marshallers that
/// emit a richer shape.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("{app}")]
pub struct TypedAppErr {
    pub app: AppErr,
    pub err_type: &'static str,
}

impl AppError for TypedAppErr {
    type Code = &'static str;

    fn code(&self) -> Self::Code {
        self.app.code()
    }
}

pub const INVALID_INPUT: AppErr = AppErr {
    app_code: "INVALID_INPUT",
    http_code: 400,
};

pub const ENTRY_NOT_FOUND: AppErr = AppErr {
    app_code: "ENTRY_NOT_FOUND",
    http_code: 404,
};

pub const INTERNAL_SERVER: TypedAppErr = TypedAppErr {
    app: AppErr {
        app_code: "INTERNAL_SERVER",
        http_code: 500,
    },
    err_type: "SERVER_ERROR",
};

#[derive(Debug, thiserror::Error)]
#[error("sql: no rows in result set")]
pub struct NoRows;

#[derive(Debug, thiserror::Error)]
#[error("sql: connection is already closed")]
pub struct ConnDone;

pub fn closed() -> std::io::Error {
    std::io::Error::other("file already closed")
}
