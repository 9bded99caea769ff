// errors.rs
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
  #[error("validation error: {0}")]
  ValidationError(String),
  #[error("storage error: {0}")]
  StorageError(String),
  #[error("store has not been initialized")]
  NotInitialized,
  #[error("external error: {0}")]
  ExternalError(String),
}

/// Errors raised while resolving settings. They are fatal: the binary exits
/// with a diagnostic instead of running with a half-valid configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
  #[error("required setting not found: {0}")]
  Missing(String),
  #[error("setting '{name}' has invalid integer value: {value:?}")]
  InvalidInteger { name: String, value: String },
}
