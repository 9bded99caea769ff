// ticket.rs
use crate::DomainError;
use std::fmt;

/// Status written for every snapshot parsed from the live feed.
pub const QUEUE_STATUS_ACTIVE: &str = "active";

/// Values read from the first service entry reported for a city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSummary {
  pub name: String,
  pub id: i32,
  pub operations_count: i32,
  pub enabled_operations: i32,
}

impl Default for ServiceSummary {
  fn default() -> Self {
    Self { name: String::new(),
           id: -1,
           operations_count: 0,
           enabled_operations: 0 }
  }
}

/// One observed row of queue state for a city.
///
/// Snapshots are values: the `with_*` helpers consume the snapshot and return
/// a new one, nothing mutates a snapshot in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSnapshot {
  id: Option<i64>,
  city: String,
  queue_status: String,
  queue_length: i32,
  timestamp: String,
  service: ServiceSummary,
}

impl TicketSnapshot {
  pub fn new(city: &str, queue_length: i32, timestamp: &str) -> Result<Self, DomainError> {
    if city.trim().is_empty() {
      return Err(DomainError::ValidationError("city must not be empty".to_string()));
    }
    if timestamp.trim().is_empty() {
      return Err(DomainError::ValidationError("timestamp must not be empty".to_string()));
    }
    Ok(Self { id: None,
              city: city.to_string(),
              queue_status: QUEUE_STATUS_ACTIVE.to_string(),
              queue_length,
              timestamp: timestamp.to_string(),
              service: ServiceSummary::default() })
  }

  pub fn with_service(self, service: ServiceSummary) -> Self {
    Self { service, ..self }
  }

  pub fn with_queue_status(self, queue_status: &str) -> Self {
    Self { queue_status: queue_status.to_string(),
           ..self }
  }

  /// Attaches the identifier assigned by the store.
  pub fn with_id(self, id: i64) -> Self {
    Self { id: Some(id), ..self }
  }

  pub fn id(&self) -> Option<i64> {
    self.id
  }

  pub fn city(&self) -> &str {
    &self.city
  }

  pub fn queue_status(&self) -> &str {
    &self.queue_status
  }

  pub fn queue_length(&self) -> i32 {
    self.queue_length
  }

  pub fn timestamp(&self) -> &str {
    &self.timestamp
  }

  pub fn service(&self) -> &ServiceSummary {
    &self.service
  }

  pub fn service_name(&self) -> &str {
    &self.service.name
  }

  pub fn service_id(&self) -> i32 {
    self.service.id
  }

  pub fn operations_count(&self) -> i32 {
    self.service.operations_count
  }

  pub fn enabled_operations(&self) -> i32 {
    self.service.enabled_operations
  }
}

impl fmt::Display for TicketSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "TicketSnapshot(city: {}, queue_length: {}, service: {} [{}], timestamp: {})",
           self.city, self.queue_length, self.service.name, self.service.id, self.timestamp)
  }
}
