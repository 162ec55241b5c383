//! Error types and error codes for Verso
//!
//! This module defines:
//! - `VersoError`: the failure taxonomy of the configuration repository
//! - `ErrorCode`: structured error codes carried alongside transport statuses

use serde::{Deserialize, Serialize};

/// Result alias used by every store operation.
pub type Result<T> = std::result::Result<T, VersoError>;

/// Application-specific error types
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VersoError {
    #[error("config for service '{0}' has already been created")]
    AlreadyExists(String),

    #[error("config for service '{0}' not found")]
    NotFound(String),

    #[error("version {1} configuration for '{0}' service not found")]
    VersionNotFound(String, u32),

    #[error("no change in config for service '{0}'")]
    NoChange(String),

    #[error("duplicate key '{0}' in config data")]
    DuplicateKey(String),

    #[error("invalid config payload: {0}")]
    InvalidPayload(String),

    #[error("stored config payload is corrupt: {0}")]
    CorruptPayload(String),

    #[error("config store unavailable: {0}")]
    StoreUnavailable(String),
}

impl VersoError {
    /// Structured code for this error.
    pub fn code(&self) -> ErrorCode<'static> {
        match self {
            VersoError::AlreadyExists(_) => CONFIG_ALREADY_EXIST,
            VersoError::NotFound(_) => CONFIG_NOT_EXIST,
            VersoError::VersionNotFound(_, _) => CONFIG_VERSION_NOT_EXIST,
            VersoError::NoChange(_) => CONFIG_NO_CHANGE,
            VersoError::DuplicateKey(_) => CONFIG_DUPLICATE_KEY,
            VersoError::InvalidPayload(_) => PARAMETER_VALIDATE_ERROR,
            VersoError::CorruptPayload(_) => DATA_CORRUPTED,
            VersoError::StoreUnavailable(_) => DATA_ACCESS_ERROR,
        }
    }

    /// Whether the error was caused by the request rather than the store.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            VersoError::CorruptPayload(_) | VersoError::StoreUnavailable(_)
        )
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "data access error",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const CONFIG_ALREADY_EXIST: ErrorCode<'static> = ErrorCode {
    code: 24000,
    message: "config already exist",
};

pub const CONFIG_NOT_EXIST: ErrorCode<'static> = ErrorCode {
    code: 24001,
    message: "config not exist",
};

pub const CONFIG_VERSION_NOT_EXIST: ErrorCode<'static> = ErrorCode {
    code: 24002,
    message: "config version not exist",
};

pub const CONFIG_NO_CHANGE: ErrorCode<'static> = ErrorCode {
    code: 24003,
    message: "config not changed",
};

pub const CONFIG_DUPLICATE_KEY: ErrorCode<'static> = ErrorCode {
    code: 24004,
    message: "duplicate key in config data",
};

pub const DATA_CORRUPTED: ErrorCode<'static> = ErrorCode {
    code: 30001,
    message: "stored data corrupted",
};
