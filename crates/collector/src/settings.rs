// Archivo: settings.rs
// Typed view of the collector settings, resolved through a `ConfigSource`.
use duw_domain::{ConfigError, ConfigSource};
use std::path::PathBuf;
use std::time::Duration;

pub const DUW_STATUS_URL: &str = "https://rezerwacje.duw.pl/status_kolejek/query.php?status";
pub const DEFAULT_DB_PATH: &str = "duw_data.db";
pub const DEFAULT_POLLING_RATE_SECONDS: i64 = 5;
pub const DEFAULT_GITHUB_BRANCH: &str = "main";
pub const DEFAULT_REMOTE_FILE: &str = "duw_data.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorSettings {
  /// Local SQLite file (`DB_PATH`).
  pub db_path: PathBuf,
  /// `<owner>/<repo>` holding the remote copy (`GITHUB_REPO`); empty disables sync.
  pub github_repo: String,
  pub github_branch: String,
  /// Path of the store inside the remote repository.
  pub remote_file: String,
  /// Seconds between cycles in polling mode. Zero or negative values are
  /// accepted and make the loop run back to back.
  pub polling_rate_seconds: i64,
  pub source_url: String,
}

impl CollectorSettings {
  pub fn resolve(config: &dyn ConfigSource) -> Result<Self, ConfigError> {
    Ok(Self { db_path: PathBuf::from(config.get_string("DB_PATH", DEFAULT_DB_PATH)),
              github_repo: config.get_string("GITHUB_REPO", ""),
              github_branch: config.get_string("GITHUB_BRANCH", DEFAULT_GITHUB_BRANCH),
              remote_file: config.get_string("GITHUB_DB_FILE", DEFAULT_REMOTE_FILE),
              polling_rate_seconds: config.get_int("POLLING_RATE_SECONDS", DEFAULT_POLLING_RATE_SECONDS)?,
              source_url: config.get_string("DUW_URL", DUW_STATUS_URL) })
  }

  /// `<owner>/<repo>/<branch>/<file>` of the remote copy, `None` when remote
  /// sync is disabled.
  pub fn remote_ref(&self) -> Option<String> {
    let repo = self.github_repo.trim().trim_end_matches('/');
    if repo.is_empty() {
      return None;
    }
    Some(format!("{}/{}/{}", repo, self.github_branch, self.remote_file))
  }

  pub fn polling_interval(&self) -> Duration {
    Duration::from_secs(self.polling_rate_seconds.max(0) as u64)
  }
}
