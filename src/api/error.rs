use thiserror::Error;

use crate::auth::verifier::VerifierError;
use crate::config::ConfigError;

/// Classification of every error that can reach the response layer.
///
/// Absent or mistyped envelope fields never show up here: they are folded
/// into empty strings at decode time and only resurface as `ClientError`
/// when a business service rejects the empty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    ClientError,
    NotFound,
    Unexpected,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Unauthenticated => 401,
            ErrorKind::ClientError => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Unexpected => 500,
        }
    }
}

/// Error surfaced by the pipeline. `Display` is the raw message, which is
/// what ends up verbatim in a failure body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    ClientError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            ApiError::ClientError(_) => ErrorKind::ClientError,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Unexpected(format!("JSON error: {}", err))
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Unexpected(err.to_string())
    }
}

impl From<VerifierError> for ApiError {
    fn from(err: VerifierError) -> Self {
        match err {
            VerifierError::Rejected(msg) => ApiError::Unauthenticated(msg),
            VerifierError::Unavailable(msg) => ApiError::Unexpected(msg),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Unexpected(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
