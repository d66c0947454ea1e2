//! Structured error types for variable composition.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // File content errors
    FileRead,
    InvalidYaml,
    InvalidJson,

    // Executable module sources
    ModuleDisabled,
    ModuleFailed,

    // Service document errors
    ServiceFileNotFound,
    InvalidServiceFile,

    // Internal errors
    Internal,
}

/// Structured error raised while reading or composing variable sources.
#[derive(Debug, Serialize)]
pub struct ComposeError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ComposeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
            details: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn file_read(path: &str, err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::FileRead, format!("Failed to read {}", path))
            .with_path(path)
            .with_details(err.to_string())
    }

    pub fn invalid_yaml(path: &str, err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidYaml, format!("Invalid YAML in {}", path))
            .with_path(path)
            .with_details(err.to_string())
    }

    pub fn invalid_json(path: &str, err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidJson, format!("Invalid JSON in {}", path))
            .with_path(path)
            .with_details(err.to_string())
    }

    pub fn module_disabled(path: &str) -> Self {
        Self::new(
            ErrorCode::ModuleDisabled,
            format!(
                "Refusing to load module source {} (pass --allow-modules to enable)",
                path
            ),
        )
        .with_path(path)
    }

    pub fn module_failed(path: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ModuleFailed,
            format!("Failed to evaluate module {}", path),
        )
        .with_path(path)
        .with_details(reason.to_string())
    }

    pub fn service_file_not_found(dir: &str) -> Self {
        Self::new(
            ErrorCode::ServiceFileNotFound,
            format!(
                "No serverless.yml, serverless.yaml, serverless.json or serverless.js in {}",
                dir
            ),
        )
        .with_path(dir)
    }

    pub fn invalid_service_file(path: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidServiceFile, reason).with_path(path)
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::Internal, err.to_string())
    }
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref details) = self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ComposeError {}

/// Result type for composition operations.
pub type ComposeResult<T> = std::result::Result<T, ComposeError>;
