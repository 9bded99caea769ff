//! Schema creation and the one-time upgrade from the legacy layout.
//!
//! The generation of an existing table is detected by introspection
//! (`sqlite_master` and `pragma_table_info`) instead of a migrations ledger:
//! stores written by the legacy collector never had one.
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::{BigInt, Text};
use diesel::sqlite::SqliteConnection;

pub const TICKET_TABLE: &str = "ticket_info";
pub const BACKUP_TABLE: &str = "ticket_info_backup";
/// Column holding the raw payload text; only the legacy layout has it.
pub const LEGACY_MARKER_COLUMN: &str = "raw_json";
pub const LEGACY_SERVICE_NAME: &str = "legacy_service";

const CREATE_CURRENT_SCHEMA: &str = r#"
  CREATE TABLE IF NOT EXISTS ticket_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    city TEXT NOT NULL,
    queue_status TEXT NOT NULL,
    queue_length INTEGER NOT NULL,
    timestamp TEXT NOT NULL,
    service_name TEXT,
    service_id INTEGER,
    operations_count INTEGER DEFAULT 0,
    enabled_operations INTEGER DEFAULT 0,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
  );
  CREATE INDEX IF NOT EXISTS idx_timestamp ON ticket_info(timestamp);
  CREATE INDEX IF NOT EXISTS idx_city ON ticket_info(city);
  CREATE INDEX IF NOT EXISTS idx_created_at ON ticket_info(created_at);
"#;

/// Layout generation of the snapshot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaGeneration {
  Legacy,
  Current,
}

/// What `prepare_schema` did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
  Created,
  UpToDate,
  Migrated { rows: usize },
}

#[derive(QueryableByName)]
struct CountRow {
  #[diesel(sql_type = BigInt)]
  count: i64,
}

#[derive(QueryableByName)]
struct ColumnRow {
  #[diesel(sql_type = Text)]
  name: String,
}

pub fn table_exists(conn: &mut SqliteConnection, table: &str) -> QueryResult<bool> {
  let row = diesel::sql_query("SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?")
    .bind::<Text, _>(table)
    .get_result::<CountRow>(conn)?;
  Ok(row.count > 0)
}

pub fn table_columns(conn: &mut SqliteConnection, table: &str) -> QueryResult<Vec<String>> {
  let rows = diesel::sql_query("SELECT name FROM pragma_table_info(?)").bind::<Text, _>(table)
                                                                       .load::<ColumnRow>(conn)?;
  Ok(rows.into_iter().map(|r| r.name).collect())
}

/// Generation of the snapshot table, `None` when the table does not exist.
pub fn detect_generation(conn: &mut SqliteConnection) -> QueryResult<Option<SchemaGeneration>> {
  if !table_exists(conn, TICKET_TABLE)? {
    return Ok(None);
  }
  let columns = table_columns(conn, TICKET_TABLE)?;
  if columns.iter().any(|c| c == LEGACY_MARKER_COLUMN) {
    Ok(Some(SchemaGeneration::Legacy))
  } else {
    Ok(Some(SchemaGeneration::Current))
  }
}

/// Brings the store to the current generation. Safe to run on every start.
pub fn prepare_schema(conn: &mut SqliteConnection) -> QueryResult<SchemaOutcome> {
  match detect_generation(conn)? {
    None => {
      conn.batch_execute(CREATE_CURRENT_SCHEMA)?;
      Ok(SchemaOutcome::Created)
    }
    Some(SchemaGeneration::Current) => {
      conn.batch_execute(CREATE_CURRENT_SCHEMA)?;
      Ok(SchemaOutcome::UpToDate)
    }
    Some(SchemaGeneration::Legacy) => {
      let rows = migrate_legacy(conn)?;
      Ok(SchemaOutcome::Migrated { rows })
    }
  }
}

/// Rewrites a legacy table into the current layout inside one transaction,
/// so a failure leaves the original table untouched.
fn migrate_legacy(conn: &mut SqliteConnection) -> QueryResult<usize> {
  conn.transaction::<usize, DieselError, _>(|conn| {
        let legacy_columns = table_columns(conn, TICKET_TABLE)?;
        // Very old stores predate the creation timestamp column.
        let created_at = if legacy_columns.iter().any(|c| c == "created_at") {
          "created_at"
        } else {
          "CURRENT_TIMESTAMP"
        };
        conn.batch_execute(&format!("DROP TABLE IF EXISTS {BACKUP_TABLE};
                                     CREATE TABLE {BACKUP_TABLE} AS SELECT * FROM {TICKET_TABLE};
                                     DROP TABLE {TICKET_TABLE};"))?;
        conn.batch_execute(CREATE_CURRENT_SCHEMA)?;
        let rows = diesel::sql_query(format!("INSERT INTO {TICKET_TABLE} (id, city, queue_status, queue_length, \
                                              timestamp, service_name, service_id, operations_count, \
                                              enabled_operations, created_at)
                                              SELECT id, city, queue_status, queue_length, timestamp,
                                                     '{LEGACY_SERVICE_NAME}', 0, 0, 0, {created_at}
                                              FROM {BACKUP_TABLE}")).execute(conn)?;
        conn.batch_execute(&format!("DROP TABLE {BACKUP_TABLE};"))?;
        Ok(rows)
      })
}
