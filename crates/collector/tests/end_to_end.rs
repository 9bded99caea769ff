use collector::{DuwResponseTransformer, LifecycleController, RunMode, DUW_STATUS_URL};
use duw_domain::stubs::{FixedClock, MapConfigSource, RecordingBackupSync, StaticTransport};
use duw_domain::TicketStore;
use duw_persistence::DieselTicketStore;
use std::sync::Arc;
use uuid::Uuid;

#[test]
fn collected_snapshots_survive_a_reopen() {
  let db_path = std::env::temp_dir().join(format!("duw_e2e_{}.db", Uuid::new_v4()));
  let payload = r#"{"result":{"Wrocław":[{"name":"Odbiór","id":9,"operations":[{"enabled":true}]}],"Opole":[{"name":"X","id":2}]}}"#;
  let transport = StaticTransport::new().respond(DUW_STATUS_URL, payload);
  let config = MapConfigSource::new().with("DB_PATH", db_path.to_str().unwrap());
  let clock = Arc::new(FixedClock::new("2024-05-01 08:30:00"));

  let mut c = LifecycleController::new(Box::new(transport),
                                       Box::new(DieselTicketStore::new()),
                                       Box::new(config),
                                       Box::new(RecordingBackupSync::new()),
                                       Box::new(DuwResponseTransformer::new(clock)));
  c.start(RunMode::OneShot).expect("start");
  c.stop();

  let mut reopened = DieselTicketStore::new();
  reopened.initialize(&db_path).expect("reopen");
  let rows = reopened.list_snapshots().expect("list");
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].city(), "Wrocław");
  assert_eq!(rows[0].service_id(), 9);
  assert_eq!(rows[0].enabled_operations(), 1);
  assert_eq!(rows[0].timestamp(), "2024-05-01 08:30:00");
  assert_eq!(rows[1].city(), "Opole");
  assert!(rows[0].id().unwrap() < rows[1].id().unwrap());

  drop(reopened);
  let _ = std::fs::remove_file(&db_path);
}
