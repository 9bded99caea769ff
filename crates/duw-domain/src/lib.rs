mod clock;
mod domain_repository;
mod domain_stubs;
mod errors;
mod ports;
mod ticket;

pub use clock::{Clock, SystemClock, TIMESTAMP_FORMAT};
pub use domain_repository::{InMemoryTicketStore, TicketStore};
pub use errors::{ConfigError, DomainError};
pub use ports::{ConfigSource, RemoteBackupSync, Transport};
pub use ticket::{ServiceSummary, TicketSnapshot, QUEUE_STATUS_ACTIVE};
// Test doubles are public so the other workspace crates can use them in
// their integration tests.
pub mod stubs {
  pub use crate::domain_stubs::{BackupCall, FixedClock, MapConfigSource, RecordedRequest, RecordingBackupSync,
                                StaticTransport};
}
