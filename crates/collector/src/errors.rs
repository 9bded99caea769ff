// Archivo: errors.rs
// Errors of the collection pipeline. `CollectorError` stops a run and maps
// to the process exit code; `CycleError` only ends the current cycle.
use duw_domain::{ConfigError, DomainError};
use thiserror::Error;

/// Failures that prevent the collector from running at all.
#[derive(Error, Debug)]
pub enum CollectorError {
  /// A setting is missing or malformed.
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),
  /// The local store could not be opened or migrated.
  #[error("initialization failed: {0}")]
  Initialization(#[from] DomainError),
}

impl CollectorError {
  /// Exit code reported by the binary for this failure.
  pub fn exit_code(&self) -> u8 {
    1
  }
}

/// Reasons a single fetch, parse and persist cycle did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
  #[error("empty response from the status endpoint")]
  EmptyResponse,
  #[error("response is not valid text: {0}")]
  InvalidPayload(String),
  #[error("response could not be parsed into snapshots")]
  Unparsable,
  #[error("none of the {attempted} snapshots could be saved")]
  NothingPersisted { attempted: usize },
}

pub type Result<T> = std::result::Result<T, CollectorError>;
