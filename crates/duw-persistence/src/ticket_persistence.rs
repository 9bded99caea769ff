use crate::migration::{self, SchemaGeneration, SchemaOutcome};
use crate::schema;
use crate::schema::ticket_info::dsl as ticket_dsl;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;
use duw_domain::{DomainError, ServiceSummary, TicketSnapshot, TicketStore};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed `TicketStore`.
///
/// The store owns a single connection: the collector runs on one thread and
/// is the only writer of its database file.
pub struct DieselTicketStore {
  conn: Option<Mutex<SqliteConnection>>,
  path: Option<PathBuf>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = schema::ticket_info)]
struct NewTicketRow<'a> {
  city: &'a str,
  queue_status: &'a str,
  queue_length: i32,
  timestamp: &'a str,
  service_name: Option<&'a str>,
  service_id: Option<i32>,
  operations_count: Option<i32>,
  enabled_operations: Option<i32>,
}

impl<'a> From<&'a TicketSnapshot> for NewTicketRow<'a> {
  fn from(s: &'a TicketSnapshot) -> Self {
    NewTicketRow { city: s.city(),
                   queue_status: s.queue_status(),
                   queue_length: s.queue_length(),
                   timestamp: s.timestamp(),
                   service_name: Some(s.service_name()),
                   service_id: Some(s.service_id()),
                   operations_count: Some(s.operations_count()),
                   enabled_operations: Some(s.enabled_operations()) }
  }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = schema::ticket_info)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct TicketRow {
  id: i64,
  city: String,
  queue_status: String,
  queue_length: i32,
  timestamp: String,
  service_name: Option<String>,
  service_id: Option<i32>,
  operations_count: Option<i32>,
  enabled_operations: Option<i32>,
}

impl TicketRow {
  fn into_snapshot(self) -> Result<TicketSnapshot, DomainError> {
    let defaults = ServiceSummary::default();
    let service = ServiceSummary { name: self.service_name.unwrap_or(defaults.name),
                                   id: self.service_id.unwrap_or(defaults.id),
                                   operations_count: self.operations_count.unwrap_or(defaults.operations_count),
                                   enabled_operations: self.enabled_operations
                                                           .unwrap_or(defaults.enabled_operations) };
    Ok(TicketSnapshot::new(&self.city, self.queue_length, &self.timestamp)?.with_queue_status(&self.queue_status)
                                                                            .with_service(service)
                                                                            .with_id(self.id))
  }
}

#[derive(QueryableByName)]
struct RowId {
  #[diesel(sql_type = BigInt)]
  id: i64,
}

fn map_db_err<T>(res: std::result::Result<T, DieselError>) -> Result<T, DomainError> {
  res.map_err(|e| DomainError::StorageError(format!("db: {}", e)))
}

impl DieselTicketStore {
  /// Store without a connection; call `initialize` before using it.
  pub fn new() -> Self {
    Self { conn: None, path: None }
  }

  /// Opens the store at `path`, creating or upgrading the schema.
  pub fn open(path: &Path) -> Result<Self, DomainError> {
    let mut store = Self::new();
    store.initialize(path)?;
    Ok(store)
  }

  /// Path of the open database file, if any.
  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  /// Current generation of the snapshot table (`None` if it is missing).
  pub fn schema_generation(&self) -> Result<Option<SchemaGeneration>, DomainError> {
    let mut conn = self.conn()?;
    map_db_err(migration::detect_generation(&mut conn))
  }

  fn conn(&self) -> Result<MutexGuard<'_, SqliteConnection>, DomainError> {
    let conn = self.conn.as_ref().ok_or(DomainError::NotInitialized)?;
    conn.lock().map_err(|e| DomainError::StorageError(format!("mutex poisoned: {:?}", e)))
  }
}

impl Default for DieselTicketStore {
  fn default() -> Self {
    Self::new()
  }
}

impl TicketStore for DieselTicketStore {
  fn initialize(&mut self, path: &Path) -> Result<(), DomainError> {
    let url = path.to_str()
                  .filter(|p| !p.trim().is_empty())
                  .ok_or_else(|| DomainError::ValidationError(format!("invalid database path: {:?}", path)))?;
    let mut conn = SqliteConnection::establish(url).map_err(|e| {
                                                     DomainError::StorageError(format!("cannot open {}: {}", url, e))
                                                   })?;
    map_db_err(conn.batch_execute("PRAGMA busy_timeout = 5000;"))?;
    let outcome = migration::prepare_schema(&mut conn).map_err(|e| {
                                                        DomainError::StorageError(format!("schema setup for {} failed: \
                                                                                           {}",
                                                                                          url, e))
                                                      })?;
    match outcome {
      SchemaOutcome::Created => info!("created ticket store at {}", url),
      SchemaOutcome::UpToDate => debug!("ticket store at {} already up to date", url),
      SchemaOutcome::Migrated { rows } => info!("migrated legacy ticket store at {} ({} rows)", url, rows),
    }
    self.conn = Some(Mutex::new(conn));
    self.path = Some(path.to_path_buf());
    Ok(())
  }

  fn append(&self, snapshot: &TicketSnapshot) -> Result<i64, DomainError> {
    let mut conn = self.conn()?;
    let row = NewTicketRow::from(snapshot);
    conn.transaction::<i64, DieselError, _>(|conn| {
          diesel::insert_into(schema::ticket_info::table).values(&row).execute(conn)?;
          diesel::sql_query("SELECT last_insert_rowid() AS id").get_result::<RowId>(conn).map(|r| r.id)
        })
        .map_err(|e| DomainError::StorageError(format!("insert ticket for {}: {}", snapshot.city(), e)))
  }

  fn list_snapshots(&self) -> Result<Vec<TicketSnapshot>, DomainError> {
    let mut conn = self.conn()?;
    let rows = map_db_err(ticket_dsl::ticket_info.order(ticket_dsl::id.asc())
                                                 .select(TicketRow::as_select())
                                                 .load::<TicketRow>(&mut *conn))?;
    rows.into_iter().map(TicketRow::into_snapshot).collect()
  }

  fn count(&self) -> Result<i64, DomainError> {
    let mut conn = self.conn()?;
    map_db_err(ticket_dsl::ticket_info.count().get_result::<i64>(&mut *conn))
  }
}
