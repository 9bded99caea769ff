// Archivo: transformer.rs
// Maps the JSON document returned by the DUW status endpoint into
// `TicketSnapshot`s.
use duw_domain::{Clock, ServiceSummary, TicketSnapshot};
use log::warn;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Turns a raw payload into snapshots; `None` when nothing usable was found.
pub trait ResponseTransformer: Send + Sync {
  fn parse(&self, payload: &str) -> Option<Vec<TicketSnapshot>>;
}

/// Parser for the `{"result": {"<city>": [<service>, ...]}}` document.
///
/// Cities come out in document order. Every snapshot of one call carries the
/// same timestamp, read once from the injected clock.
pub struct DuwResponseTransformer {
  clock: Arc<dyn Clock>,
}

impl DuwResponseTransformer {
  pub fn new(clock: Arc<dyn Clock>) -> Self {
    Self { clock }
  }
}

impl ResponseTransformer for DuwResponseTransformer {
  fn parse(&self, payload: &str) -> Option<Vec<TicketSnapshot>> {
    if payload.is_empty() {
      return None;
    }
    let root: Value = serde_json::from_str(payload).ok()?;
    let cities = root.get("result")?.as_object()?;

    let timestamp = self.clock.now_formatted();
    let tickets: Vec<TicketSnapshot> = cities.iter()
                                             .filter_map(|(city, entries)| city_snapshot(city, entries, &timestamp))
                                             .collect();
    if tickets.is_empty() {
      None
    } else {
      Some(tickets)
    }
  }
}

fn city_snapshot(city: &str, entries: &Value, timestamp: &str) -> Option<TicketSnapshot> {
  let entries = entries.as_array().filter(|e| !e.is_empty())?;
  // The first entry stands for the whole city.
  let first = entries[0].as_object()?;
  let service = service_summary(first);
  match TicketSnapshot::new(city, saturating_i32(entries.len()), timestamp) {
    Ok(snapshot) => Some(snapshot.with_service(service)),
    Err(e) => {
      warn!("skipping city {:?}: {}", city, e);
      None
    }
  }
}

fn service_summary(entry: &Map<String, Value>) -> ServiceSummary {
  let defaults = ServiceSummary::default();
  let (operations_count, enabled_operations) = match entry.get("operations").and_then(Value::as_array) {
    Some(operations) => {
      let enabled = operations.iter()
                              .filter(|op| op.get("enabled").and_then(Value::as_bool).unwrap_or(false))
                              .count();
      (saturating_i32(operations.len()), saturating_i32(enabled))
    }
    None => (0, 0),
  };
  ServiceSummary { name: entry.get("name")
                              .and_then(Value::as_str)
                              .map(str::to_string)
                              .unwrap_or(defaults.name),
                   id: entry.get("id")
                            .and_then(Value::as_i64)
                            .and_then(|id| i32::try_from(id).ok())
                            .unwrap_or(defaults.id),
                   operations_count,
                   enabled_operations }
}

fn saturating_i32(n: usize) -> i32 {
  i32::try_from(n).unwrap_or(i32::MAX)
}
