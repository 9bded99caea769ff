use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use duw_domain::stubs::StaticTransport;
use duw_domain::RemoteBackupSync;
use duw_providers::{GitHubBackupSync, RemoteRef};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

const REMOTE: &str = "someone/duw-data/main/data/duw_data.db";
const RAW_URL: &str = "https://raw.githubusercontent.com/someone/duw-data/main/data/duw_data.db";
const CONTENTS_URL: &str = "https://api.github.com/repos/someone/duw-data/contents/data/duw_data.db";

fn temp_db() -> PathBuf {
  std::env::temp_dir().join(format!("duw_backup_{}.db", Uuid::new_v4()))
}

fn sqlite_bytes() -> Vec<u8> {
  let mut bytes = b"SQLite format 3\0".to_vec();
  bytes.extend_from_slice(&[7u8; 64]);
  bytes
}

#[test]
fn remote_ref_splits_owner_repo_branch_and_path() {
  let r = RemoteRef::parse(REMOTE).unwrap();
  assert_eq!(r.owner, "someone");
  assert_eq!(r.repo, "duw-data");
  assert_eq!(r.branch, "main");
  assert_eq!(r.path, "data/duw_data.db");
  assert_eq!(r.raw_url(), RAW_URL);
  assert_eq!(r.contents_url(), CONTENTS_URL);

  assert!(RemoteRef::parse("someone/duw-data/main").is_err());
  assert!(RemoteRef::parse("someone//main/file.db").is_err());
  assert!(RemoteRef::parse("").is_err());
}

#[test]
fn fetch_writes_the_downloaded_database() {
  let path = temp_db();
  let raw = StaticTransport::new().respond(RAW_URL, sqlite_bytes());
  let sync = GitHubBackupSync::new(Box::new(raw));

  sync.fetch(REMOTE, &path).unwrap();

  assert_eq!(fs::read(&path).unwrap(), sqlite_bytes());
  let _ = fs::remove_file(&path);
}

#[test]
fn fetch_rejects_files_that_are_not_databases() {
  let path = temp_db();
  fs::write(&path, sqlite_bytes()).unwrap();
  let raw = StaticTransport::new().respond(RAW_URL, "404: Not Found");
  let sync = GitHubBackupSync::new(Box::new(raw));

  assert!(sync.fetch(REMOTE, &path).is_err());

  assert_eq!(fs::read(&path).unwrap(), sqlite_bytes());
  let _ = fs::remove_file(&path);
}

#[test]
fn fetch_fails_on_empty_download() {
  let path = temp_db();
  let sync = GitHubBackupSync::new(Box::new(StaticTransport::new()));

  assert!(sync.fetch(REMOTE, &path).is_err());
  assert!(!path.exists());
}

#[test]
fn push_without_api_is_a_dry_run() {
  let path = temp_db();
  fs::write(&path, sqlite_bytes()).unwrap();
  let raw = StaticTransport::new();
  let sync = GitHubBackupSync::new(Box::new(raw.clone()));

  assert!(sync.is_dry_run());
  sync.push(REMOTE, &path, "Update DUW data").unwrap();

  assert!(raw.requests().is_empty());
  let _ = fs::remove_file(&path);
}

#[test]
fn push_fails_when_local_file_is_missing() {
  let sync = GitHubBackupSync::new(Box::new(StaticTransport::new()));
  assert!(sync.push(REMOTE, &temp_db(), "m").is_err());
}

#[test]
fn push_replaces_the_existing_remote_file() {
  let path = temp_db();
  fs::write(&path, sqlite_bytes()).unwrap();
  let get_url = format!("{}?ref=main", CONTENTS_URL);
  let api = StaticTransport::new().respond(&get_url, r#"{"sha":"abc123","size":80}"#)
                                  .respond(CONTENTS_URL, r#"{"content":{"sha":"def456"}}"#);
  let sync = GitHubBackupSync::with_api(Box::new(StaticTransport::new()), Box::new(api.clone()));

  sync.push(REMOTE, &path, "Update DUW data - now").unwrap();

  let requests = api.requests();
  assert_eq!(requests.len(), 2);
  assert_eq!(requests[0].method, "GET");
  assert_eq!(requests[1].method, "PUT");
  let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
  assert_eq!(body["message"], "Update DUW data - now");
  assert_eq!(body["branch"], "main");
  assert_eq!(body["sha"], "abc123");
  assert_eq!(body["content"], STANDARD.encode(sqlite_bytes()));
  let _ = fs::remove_file(&path);
}

#[test]
fn push_creates_a_missing_remote_file_without_sha() {
  let path = temp_db();
  fs::write(&path, sqlite_bytes()).unwrap();
  let api = StaticTransport::new().respond(CONTENTS_URL, r#"{"content":{}}"#);
  let sync = GitHubBackupSync::with_api(Box::new(StaticTransport::new()), Box::new(api.clone()));

  sync.push(REMOTE, &path, "first").unwrap();

  let body: serde_json::Value = serde_json::from_slice(&api.requests()[1].body).unwrap();
  assert!(body.get("sha").is_none());
  let _ = fs::remove_file(&path);
}

#[test]
fn push_reports_a_rejected_upload() {
  let path = temp_db();
  fs::write(&path, sqlite_bytes()).unwrap();
  let sync = GitHubBackupSync::with_api(Box::new(StaticTransport::new()), Box::new(StaticTransport::new()));

  assert!(sync.push(REMOTE, &path, "m").is_err());
  let _ = fs::remove_file(&path);
}
