use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Db(rusqlite::Error),
    Pool(r2d2::Error),
    /// Malformed or out-of-range input (score out of scale, bad sort key,
    /// non-positive page/limit).
    Validation(String),
    /// Duplicate active assignment, re-completing a completed review,
    /// reconciliation requested without divergence.
    Conflict(String),
    NotFound(&'static str),
    /// Operation attempted outside its legal state (re-deciding a terminal
    /// award, full-proposal submission without an approved award).
    InvalidState(String),
    /// Carried for endpoint wrappers; the core itself never raises it.
    Unauthorized(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Pool(e) => write!(f, "Pool error: {e}"),
            AppError::Validation(msg) => write!(f, "Validation error: {msg}"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::NotFound(what) => write!(f, "Not found: {what}"),
            AppError::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Pool(e)
    }
}

/// True when the error is a SQLite UNIQUE constraint hit. Call sites that
/// ride on a unique index use this to surface `Conflict` instead of `Db`.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => {
            err.code == rusqlite::ErrorCode::ConstraintViolation
        }
        _ => false,
    }
}
