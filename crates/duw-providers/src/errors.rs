// Archivo: errors.rs
use duw_domain::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),
  #[error("{url} answered with status {status}")]
  Status { url: String, status: u16 },
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("invalid remote reference '{0}', expected <owner>/<repo>/<branch>/<path>")]
  InvalidRemoteRef(String),
  #[error("downloaded file ({0} bytes) is not a SQLite database")]
  NotADatabase(usize),
  #[error("empty response from {0}")]
  EmptyResponse(String),
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl From<ProviderError> for DomainError {
  fn from(e: ProviderError) -> Self {
    DomainError::ExternalError(e.to_string())
  }
}
