//! Shared error taxonomy for backends, service, CLI and server.
//!
//! # Responsibility
//! - Define the single closed set of failures any record operation can report.
//! - Render errors to the `{message, code}` wire shape at process boundaries.
//!
//! # Invariants
//! - Every variant maps to exactly one stable `code()` string.
//! - Backends return these values; only CLI/server turn them into exit codes
//!   or HTTP statuses.

use crate::codec::CodecError;
use crate::db::DbError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type MappResult<T> = Result<T, MappError>;

/// Every failure a record operation can surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappError {
    /// Input failed record schema validation.
    #[error("{0}")]
    Validation(#[from] CodecError),
    /// Read/update addressed an identity that does not exist.
    #[error("single model {id} not found")]
    NotFound { id: String },
    /// Remote side answered 401.
    #[error("authentication error")]
    Authentication,
    /// Remote side answered 403.
    #[error("forbidden")]
    Forbidden,
    /// Remote side answered with an unclassified status >= 400.
    #[error("{body}")]
    HttpStatus { status: u16, body: String },
    /// Remote side could not be reached.
    #[error("{0}")]
    Http(String),
    /// Remote response body could not be read.
    #[error("{0}")]
    Read(String),
    /// Remote response or persisted value could not be decoded.
    #[error("{0}")]
    Parse(String),
    /// Output could not be serialized.
    #[error("{0}")]
    Marshal(String),
    /// Outbound request could not be built.
    #[error("{0}")]
    Request(String),
    /// Local store failure other than not-found.
    #[error("{0}")]
    Db(String),
    /// Body identity disagrees with the addressed identity.
    #[error("single model id mismatch: path `{path_id}`, body `{body_id}`")]
    IdMismatch { path_id: String, body_id: String },
    /// Action exists but not for the selected backend.
    #[error("{0}")]
    InvalidAction(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("{0}")]
    MissingArgument(String),
    #[error("{0}")]
    InvalidArgument(String),
}

impl MappError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> String {
        match self {
            Self::Validation(err) => err.code().to_string(),
            Self::NotFound { .. } => "not_found".to_string(),
            Self::Authentication => "authentication_error".to_string(),
            Self::Forbidden => "forbidden".to_string(),
            Self::HttpStatus { status, .. } => format!("http_{status}"),
            Self::Http(_) => "http_error".to_string(),
            Self::Read(_) => "read_error".to_string(),
            Self::Parse(_) => "parse_error".to_string(),
            Self::Marshal(_) => "marshal_error".to_string(),
            Self::Request(_) => "request_error".to_string(),
            Self::Db(_) => "db_error".to_string(),
            Self::IdMismatch { .. } => "id_mismatch".to_string(),
            Self::InvalidAction(_) => "invalid_action".to_string(),
            Self::UnknownCommand(_) => "unknown_command".to_string(),
            Self::UnknownAction(_) => "unknown_action".to_string(),
            Self::MissingArgument(_) => "missing_argument".to_string(),
            Self::InvalidArgument(_) => "invalid_argument".to_string(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Boundary rendering: schema failures collapse to `validation_error`.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            Self::Validation(err) => ErrorBody {
                message: format!("Validation Error: {err}"),
                code: "validation_error".to_string(),
            },
            other => ErrorBody {
                message: other.to_string(),
                code: other.code(),
            },
        }
    }
}

impl From<DbError> for MappError {
    fn from(value: DbError) -> Self {
        Self::Db(value.to_string())
    }
}

impl From<rusqlite::Error> for MappError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(value.to_string())
    }
}

/// Wire shape of an error: `{"message": ..., "code": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }
}
