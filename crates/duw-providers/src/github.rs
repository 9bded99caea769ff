// Archivo: github.rs
// Keeps a copy of the SQLite store in a GitHub repository.
use crate::errors::ProviderError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use duw_domain::{DomainError, RemoteBackupSync, Transport};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";
pub const API_BASE: &str = "https://api.github.com";

/// First bytes of every SQLite 3 database file.
const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// `<owner>/<repo>/<branch>/<path>`; the path may contain further slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
  pub owner: String,
  pub repo: String,
  pub branch: String,
  pub path: String,
}

impl RemoteRef {
  pub fn parse(remote_ref: &str) -> Result<Self, ProviderError> {
    let parts: Vec<&str> = remote_ref.splitn(4, '/').collect();
    if parts.len() != 4 || parts.iter().any(|p| p.trim().is_empty()) {
      return Err(ProviderError::InvalidRemoteRef(remote_ref.to_string()));
    }
    Ok(Self { owner: parts[0].to_string(),
              repo: parts[1].to_string(),
              branch: parts[2].to_string(),
              path: parts[3].to_string() })
  }

  pub fn raw_url(&self) -> String {
    format!("{}/{}/{}/{}/{}", RAW_CONTENT_BASE, self.owner, self.repo, self.branch, self.path)
  }

  pub fn contents_url(&self) -> String {
    format!("{}/repos/{}/{}/contents/{}", API_BASE, self.owner, self.repo, self.path)
  }
}

#[derive(Deserialize)]
struct ContentsEntry {
  sha: String,
}

#[derive(Serialize)]
struct PutContents<'a> {
  message: &'a str,
  content: String,
  branch: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  sha: Option<String>,
}

/// GitHub-backed `RemoteBackupSync`.
///
/// Downloads go through `raw.githubusercontent.com`. Uploads use the contents
/// API through an authenticated transport; without one, `push` only logs what
/// it would upload.
pub struct GitHubBackupSync {
  raw: Box<dyn Transport>,
  api: Option<Box<dyn Transport>>,
}

impl GitHubBackupSync {
  /// Read-only sync: `push` is a dry run.
  pub fn new(raw: Box<dyn Transport>) -> Self {
    Self { raw, api: None }
  }

  /// Sync that uploads with `api`, a transport carrying the GitHub token.
  pub fn with_api(raw: Box<dyn Transport>, api: Box<dyn Transport>) -> Self {
    Self { raw, api: Some(api) }
  }

  pub fn is_dry_run(&self) -> bool {
    self.api.is_none()
  }

  fn download(&self, remote_ref: &str, local_path: &Path) -> Result<(), ProviderError> {
    let remote = RemoteRef::parse(remote_ref)?;
    let url = remote.raw_url();
    let content = self.raw.get(&url);
    if content.is_empty() {
      return Err(ProviderError::EmptyResponse(url));
    }
    if !content.starts_with(SQLITE_HEADER) {
      return Err(ProviderError::NotADatabase(content.len()));
    }

    let partial = partial_path(local_path);
    fs::write(&partial, &content)?;
    if let Err(e) = fs::rename(&partial, local_path) {
      let _ = fs::remove_file(&partial);
      return Err(e.into());
    }
    debug!("wrote {} bytes to {}", content.len(), local_path.display());
    Ok(())
  }

  fn upload(&self, remote_ref: &str, local_path: &Path, message: &str) -> Result<(), ProviderError> {
    let remote = RemoteRef::parse(remote_ref)?;
    let content = fs::read(local_path)?;

    let Some(api) = self.api.as_ref() else {
      info!("dry run: would push {} ({} bytes) to {} with message '{}'",
            local_path.display(),
            content.len(),
            remote_ref,
            message);
      return Ok(());
    };

    let url = remote.contents_url();
    // An empty answer means the file does not exist yet on that branch.
    let current = api.get(&format!("{}?ref={}", url, remote.branch));
    let sha = if current.is_empty() {
      None
    } else {
      Some(serde_json::from_slice::<ContentsEntry>(&current)?.sha)
    };

    let body = serde_json::to_vec(&PutContents { message,
                                                 content: STANDARD.encode(&content),
                                                 branch: &remote.branch,
                                                 sha })?;
    if api.put(&url, &body).is_empty() {
      return Err(ProviderError::EmptyResponse(url));
    }
    info!("pushed {} bytes to {}", content.len(), remote_ref);
    Ok(())
  }
}

fn partial_path(local_path: &Path) -> PathBuf {
  let mut name = local_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".part");
  local_path.with_file_name(name)
}

impl RemoteBackupSync for GitHubBackupSync {
  fn fetch(&self, remote_ref: &str, local_path: &Path) -> Result<(), DomainError> {
    Ok(self.download(remote_ref, local_path)?)
  }

  fn push(&self, remote_ref: &str, local_path: &Path, message: &str) -> Result<(), DomainError> {
    Ok(self.upload(remote_ref, local_path, message)?)
  }
}
