use duw_domain::{DomainError, InMemoryTicketStore, ServiceSummary, TicketSnapshot, TicketStore, QUEUE_STATUS_ACTIVE};
use std::path::Path;

#[test]
fn new_snapshot_uses_defaults_until_service_is_attached() {
  let s = TicketSnapshot::new("Wrocław", 3, "2024-05-01 10:00:00").expect("snapshot");
  assert_eq!(s.id(), None);
  assert_eq!(s.queue_status(), QUEUE_STATUS_ACTIVE);
  assert_eq!(s.service_name(), "");
  assert_eq!(s.service_id(), -1);
  assert_eq!(s.operations_count(), 0);
  assert_eq!(s.enabled_operations(), 0);

  let s = s.with_service(ServiceSummary { name: "Odbiór karty".into(),
                                          id: 7,
                                          operations_count: 4,
                                          enabled_operations: 2 });
  assert_eq!(s.service_name(), "Odbiór karty");
  assert_eq!(s.service_id(), 7);
  assert_eq!(s.queue_length(), 3);
}

#[test]
fn blank_city_is_rejected() {
  match TicketSnapshot::new("   ", 1, "2024-05-01 10:00:00") {
    Err(DomainError::ValidationError(_)) => {}
    other => panic!("expected validation error, got: {:?}", other),
  }
}

#[test]
fn in_memory_store_requires_initialize_and_assigns_ids() {
  let mut store = InMemoryTicketStore::new();
  let s = TicketSnapshot::new("Legnica", 1, "2024-05-01 10:00:00").unwrap();
  assert_eq!(store.append(&s), Err(DomainError::NotInitialized));

  store.initialize(Path::new("mem.db")).expect("initialize");
  assert_eq!(store.append(&s).unwrap(), 1);
  assert_eq!(store.append(&s).unwrap(), 2);
  let rows = store.list_snapshots().unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[1].id(), Some(2));
  assert_eq!(store.count().unwrap(), 2);
}
