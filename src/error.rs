use std::fmt;

/// Message reported for any failed comparison. The underlying cause is kept
/// for logging only.
pub const COMPARE_FAILED_MESSAGE: &str = "Error fetching schema differences";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Connection,
    Query,
    Snapshot,
    Timeout,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "Config",
            ErrorKind::Connection => "Connection",
            ErrorKind::Query => "Query",
            ErrorKind::Snapshot => "Snapshot",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Internal => "Internal",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

/// A comparison that was abandoned because a metadata fetch failed.
///
/// Displays only [`COMPARE_FAILED_MESSAGE`]; the provider error is available
/// through [`CompareError::cause`] and `source()`.
#[derive(Debug)]
pub struct CompareError {
    kind: ErrorKind,
    cause: anyhow::Error,
}

impl CompareError {
    pub fn new(cause: anyhow::Error) -> Self {
        Self {
            kind: classify_error(&cause),
            cause,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", COMPARE_FAILED_MESSAGE)
    }
}

impl std::error::Error for CompareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

pub fn classify_error(err: &anyhow::Error) -> ErrorKind {
    if let Some(app) = err.downcast_ref::<AppError>() {
        return app.kind;
    }
    if let Some(compare) = err.downcast_ref::<CompareError>() {
        return compare.kind;
    }
    ErrorKind::Internal
}
