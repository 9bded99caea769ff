// Archivo: ports.rs
// Contracts for the external collaborators of the collector: the HTTP
// transport, the settings source and the remote backup of the store file.
// Each one has a single production implementation in `duw-providers` and
// in-memory doubles in `stubs`.
use crate::errors::{ConfigError, DomainError};
use std::path::Path;

/// Minimal HTTP surface used by the collector.
///
/// Every method returns the response body, or an empty vector when the
/// request failed or the status was not 2xx. Callers cannot tell those two
/// cases apart and treat both as a failed request.
pub trait Transport: Send + Sync {
  fn get(&self, url: &str) -> Vec<u8>;
  fn put(&self, url: &str, body: &[u8]) -> Vec<u8>;
  fn patch(&self, url: &str, body: &[u8]) -> Vec<u8>;
}

/// Named settings with defaults.
pub trait ConfigSource: Send + Sync {
  /// Raw value of `name`, `None` when the setting is not defined.
  fn lookup(&self, name: &str) -> Option<String>;

  fn get_string(&self, name: &str, default: &str) -> String {
    self.lookup(name).unwrap_or_else(|| default.to_string())
  }

  /// Integer setting. An absent setting yields `default`; a present but
  /// malformed one is an error, never silently replaced by the default.
  fn get_int(&self, name: &str, default: i64) -> Result<i64, ConfigError> {
    match self.lookup(name) {
      None => Ok(default),
      Some(value) => parse_int(name, &value),
    }
  }

  fn require_string(&self, name: &str) -> Result<String, ConfigError> {
    self.lookup(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
  }

  fn require_int(&self, name: &str) -> Result<i64, ConfigError> {
    let value = self.require_string(name)?;
    parse_int(name, &value)
  }
}

fn parse_int(name: &str, value: &str) -> Result<i64, ConfigError> {
  value.parse::<i64>().map_err(|_| ConfigError::InvalidInteger { name: name.to_string(),
                                                                 value: value.to_string() })
}

/// Remote copy of the store file.
///
/// `remote_ref` has the form `<owner>/<repo>/<branch>/<file path>`.
pub trait RemoteBackupSync: Send + Sync {
  /// Downloads the remote file over `local_path`.
  fn fetch(&self, remote_ref: &str, local_path: &Path) -> Result<(), DomainError>;

  /// Uploads `local_path` to the remote reference with a commit message.
  fn push(&self, remote_ref: &str, local_path: &Path, message: &str) -> Result<(), DomainError>;
}
