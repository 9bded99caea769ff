// Archivo: domain_stubs.rs
// In-memory doubles for the collector ports. They are not durable and exist
// for tests and quick wiring.
use crate::clock::Clock;
use crate::errors::DomainError;
use crate::ports::{ConfigSource, RemoteBackupSync, Transport};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A request observed by `StaticTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
  pub method: &'static str,
  pub url: String,
  pub body: Vec<u8>,
}

#[derive(Default)]
struct Route {
  queued: VecDeque<Vec<u8>>,
  fallback: Vec<u8>,
}

/// Transport answering from a fixed routing table.
///
/// Unknown URLs and exhausted sequences answer with an empty body, which is
/// how the real transport reports failures.
#[derive(Clone, Default)]
pub struct StaticTransport {
  routes: Arc<Mutex<HashMap<String, Route>>>,
  requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StaticTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answers every request to `url` with `body`.
  pub fn respond(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
    self.routes
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .entry(url.to_string())
        .or_default()
        .fallback = body.into();
    self
  }

  /// Answers successive requests to `url` with `bodies`, then with the
  /// fallback body (empty unless `respond` was used).
  pub fn respond_sequence(self, url: &str, bodies: Vec<Vec<u8>>) -> Self {
    self.routes
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .entry(url.to_string())
        .or_default()
        .queued
        .extend(bodies);
    self
  }

  pub fn requests(&self) -> Vec<RecordedRequest> {
    self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
  }

  fn answer(&self, method: &'static str, url: &str, body: &[u8]) -> Vec<u8> {
    self.requests
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push(RecordedRequest { method,
                                url: url.to_string(),
                                body: body.to_vec() });
    let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
    match routes.get_mut(url) {
      Some(route) => route.queued.pop_front().unwrap_or_else(|| route.fallback.clone()),
      None => Vec::new(),
    }
  }
}

impl Transport for StaticTransport {
  fn get(&self, url: &str) -> Vec<u8> {
    self.answer("GET", url, &[])
  }

  fn put(&self, url: &str, body: &[u8]) -> Vec<u8> {
    self.answer("PUT", url, body)
  }

  fn patch(&self, url: &str, body: &[u8]) -> Vec<u8> {
    self.answer("PATCH", url, body)
  }
}

/// Settings backed by a map.
#[derive(Debug, Clone, Default)]
pub struct MapConfigSource {
  values: HashMap<String, String>,
}

impl MapConfigSource {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, name: &str, value: &str) -> Self {
    self.values.insert(name.to_string(), value.to_string());
    self
  }
}

impl ConfigSource for MapConfigSource {
  fn lookup(&self, name: &str) -> Option<String> {
    self.values.get(name).cloned()
  }
}

/// Clock frozen at a given formatted instant.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
  pub fn new(timestamp: &str) -> Self {
    Self(timestamp.to_string())
  }
}

impl Clock for FixedClock {
  fn now_formatted(&self) -> String {
    self.0.clone()
  }
}

/// A call observed by `RecordingBackupSync`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupCall {
  Fetch { remote_ref: String, local_path: String },
  Push { remote_ref: String, local_path: String, message: String },
}

/// Backup double that records calls. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingBackupSync {
  calls: Arc<Mutex<Vec<BackupCall>>>,
  fail_fetch: bool,
}

impl RecordingBackupSync {
  pub fn new() -> Self {
    Self::default()
  }

  /// Backup whose `fetch` always fails.
  pub fn failing_fetch() -> Self {
    Self { fail_fetch: true,
           ..Self::default() }
  }

  pub fn calls(&self) -> Vec<BackupCall> {
    self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
  }

  fn record(&self, call: BackupCall) {
    self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
  }
}

impl RemoteBackupSync for RecordingBackupSync {
  fn fetch(&self, remote_ref: &str, local_path: &Path) -> Result<(), DomainError> {
    self.record(BackupCall::Fetch { remote_ref: remote_ref.to_string(),
                                    local_path: local_path.display().to_string() });
    if self.fail_fetch {
      return Err(DomainError::ExternalError(format!("remote file {} unavailable", remote_ref)));
    }
    Ok(())
  }

  fn push(&self, remote_ref: &str, local_path: &Path, message: &str) -> Result<(), DomainError> {
    self.record(BackupCall::Push { remote_ref: remote_ref.to_string(),
                                   local_path: local_path.display().to_string(),
                                   message: message.to_string() });
    Ok(())
  }
}
