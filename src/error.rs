//! Error types for the GitHub repository provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The main error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Resource of type '{type_name}' with identifier '{identifier}' already exists.")]
    AlreadyExists {
        type_name: String,
        identifier: String,
    },

    #[error("Resource of type '{type_name}' with identifier '{identifier}' was not found.")]
    NotFound {
        type_name: String,
        identifier: String,
    },

    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    InternalFailure(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("GitHub API error: {0}")]
    GitHub(#[from] GitHubError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ProviderError {
    /// The CloudFormation error code reported for this error.
    pub fn error_code(&self) -> HandlerErrorCode {
        match self {
            Self::AlreadyExists { .. } => HandlerErrorCode::AlreadyExists,
            Self::NotFound { .. } => HandlerErrorCode::NotFound,
            Self::AccessDenied(_) => HandlerErrorCode::AccessDenied,
            Self::InvalidRequest(_) => HandlerErrorCode::InvalidRequest,
            Self::InternalFailure(_)
            | Self::GitHub(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_)
            | Self::InvalidConfig(_) => HandlerErrorCode::InternalFailure,
        }
    }
}

/// Errors returned by the GitHub REST API client.
///
/// 404 and 403 responses get their own variants so callers can tell a missing
/// repository from a permission problem without inspecting the message.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("Not Found: {message}")]
    NotFound { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String, errors: Vec<String> },

    #[error("API request failed ({status}): {message}")]
    Request {
        status: u16,
        message: String,
        errors: Vec<String>,
    },

    #[error("HTTP request error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse response: {message}")]
    Decode { message: String },
}

impl GitHubError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Forbidden { .. } => Some(403),
            Self::Request { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::Decode { .. } => None,
        }
    }

    /// Sub-error messages reported in the response body.
    pub fn errors(&self) -> &[String] {
        match self {
            Self::Forbidden { errors, .. } | Self::Request { errors, .. } => errors,
            _ => &[],
        }
    }
}

/// Error codes understood by the CloudFormation handler contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerErrorCode {
    AlreadyExists,
    NotFound,
    AccessDenied,
    InternalFailure,
    InvalidRequest,
}

impl fmt::Display for HandlerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::AlreadyExists => "AlreadyExists",
            Self::NotFound => "NotFound",
            Self::AccessDenied => "AccessDenied",
            Self::InternalFailure => "InternalFailure",
            Self::InvalidRequest => "InvalidRequest",
        };
        f.write_str(code)
    }
}

/// A specialized Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Result type returned by the GitHub API client.
pub type GitHubResult<T> = std::result::Result<T, GitHubError>;
