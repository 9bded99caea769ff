// clock.rs
use chrono::Local;

/// Format shared by every persisted `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of the capture time written into snapshots.
pub trait Clock: Send + Sync {
  /// Current wall-clock time rendered with `TIMESTAMP_FORMAT`.
  fn now_formatted(&self) -> String;
}

/// Local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now_formatted(&self) -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
  }
}
