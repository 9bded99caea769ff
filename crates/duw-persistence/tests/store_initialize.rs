use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use duw_domain::{DomainError, TicketSnapshot, TicketStore};
use duw_persistence::{DieselTicketStore, SchemaGeneration};
use std::path::PathBuf;
use uuid::Uuid;

fn temp_db() -> PathBuf {
  std::env::temp_dir().join(format!("duw_test_{}.db", Uuid::new_v4()))
}

#[derive(QueryableByName)]
struct EntryRow {
  #[diesel(sql_type = Text)]
  entry: String,
}

fn schema_objects(path: &PathBuf) -> Vec<String> {
  let mut conn = SqliteConnection::establish(path.to_str().unwrap()).expect("raw connection");
  diesel::sql_query("SELECT type || ':' || name AS entry FROM sqlite_master \
                     WHERE name NOT LIKE 'sqlite_%' ORDER BY entry").load::<EntryRow>(&mut conn)
                                                                   .expect("sqlite_master")
                                                                   .into_iter()
                                                                   .map(|r| r.entry)
                                                                   .collect()
}

#[test]
fn initialize_twice_is_idempotent() {
  let path = temp_db();
  let mut store = DieselTicketStore::new();
  store.initialize(&path).expect("first initialize");
  let first = schema_objects(&path);
  assert_eq!(first,
             vec!["index:idx_city".to_string(),
                  "index:idx_created_at".to_string(),
                  "index:idx_timestamp".to_string(),
                  "table:ticket_info".to_string()]);

  store.append(&TicketSnapshot::new("Wrocław", 2, "2024-05-01 10:00:00").unwrap()).expect("append");
  store.initialize(&path).expect("second initialize");
  assert_eq!(schema_objects(&path), first);
  assert_eq!(store.count().unwrap(), 1, "re-initializing must keep rows");
  assert_eq!(store.schema_generation().unwrap(), Some(SchemaGeneration::Current));
  let _ = std::fs::remove_file(path);
}

#[test]
fn unopenable_path_fails() {
  let path = std::env::temp_dir().join(format!("missing_dir_{}", Uuid::new_v4())).join("store.db");
  let mut store = DieselTicketStore::new();
  match store.initialize(&path) {
    Err(DomainError::StorageError(_)) => {}
    other => panic!("expected storage error, got: {:?}", other),
  }
  assert!(store.path().is_none());
}

#[test]
fn empty_path_is_rejected() {
  let mut store = DieselTicketStore::new();
  match store.initialize(std::path::Path::new("")) {
    Err(DomainError::ValidationError(_)) => {}
    other => panic!("expected validation error, got: {:?}", other),
  }
}

#[test]
fn non_database_file_fails() {
  let path = temp_db();
  std::fs::write(&path, b"<html>404: Not Found</html>".repeat(400)).unwrap();
  let mut store = DieselTicketStore::new();
  assert!(store.initialize(&path).is_err());
  let _ = std::fs::remove_file(path);
}

#[test]
fn calls_before_initialize_report_not_initialized() {
  let store = DieselTicketStore::new();
  let s = TicketSnapshot::new("Legnica", 1, "2024-05-01 10:00:00").unwrap();
  assert_eq!(store.append(&s), Err(DomainError::NotInitialized));
  assert_eq!(store.count(), Err(DomainError::NotInitialized));
}

#[test]
fn existing_current_store_gets_missing_indexes_back() {
  let path = temp_db();
  DieselTicketStore::open(&path).expect("create");
  {
    let mut conn = SqliteConnection::establish(path.to_str().unwrap()).unwrap();
    conn.batch_execute("DROP INDEX idx_city;").unwrap();
  }
  DieselTicketStore::open(&path).expect("reopen");
  assert!(schema_objects(&path).contains(&"index:idx_city".to_string()));
  let _ = std::fs::remove_file(path);
}
