use crate::DomainError;
use crate::TicketSnapshot;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Append-only store of ticket snapshots.
///
/// `initialize` must succeed before any other call; implementations return
/// `DomainError::NotInitialized` otherwise.
pub trait TicketStore: Send {
    /// Opens (or creates) the store at `path` and brings its schema up to
    /// date. Calling it again on the same path is harmless.
    fn initialize(&mut self, path: &Path) -> Result<(), DomainError>;

    /// Inserts one snapshot and returns the identifier assigned to it.
    fn append(&self, snapshot: &TicketSnapshot) -> Result<i64, DomainError>;

    /// All persisted snapshots ordered by identifier.
    fn list_snapshots(&self) -> Result<Vec<TicketSnapshot>, DomainError>;

    /// Number of persisted snapshots.
    fn count(&self) -> Result<i64, DomainError>;
}

/// In-memory store for tests and wiring. Clones share the same rows.
#[derive(Clone, Default)]
pub struct InMemoryTicketStore {
    rows: Arc<Mutex<Vec<TicketSnapshot>>>,
    initialized_paths: Arc<Mutex<Vec<String>>>,
    fail_initialize: bool,
    rejected_cities: Arc<Vec<String>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `initialize` always fails.
    pub fn failing_initialize() -> Self {
        Self { fail_initialize: true,
               ..Self::default() }
    }

    /// Store that refuses to append snapshots for the given cities.
    pub fn rejecting(cities: &[&str]) -> Self {
        Self { rejected_cities: Arc::new(cities.iter().map(|c| c.to_string()).collect()),
               ..Self::default() }
    }

    /// Paths passed to `initialize`, in call order.
    pub fn initialized_paths(&self) -> Vec<String> {
        self.initialized_paths.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn lock<'a, T>(&'a self, m: &'a Mutex<T>) -> Result<MutexGuard<'a, T>, DomainError> {
        m.lock().map_err(|e| DomainError::StorageError(format!("mutex poisoned: {:?}", e)))
    }

    fn ensure_initialized(&self) -> Result<(), DomainError> {
        if self.lock(&self.initialized_paths)?.is_empty() {
            return Err(DomainError::NotInitialized);
        }
        Ok(())
    }
}

impl TicketStore for InMemoryTicketStore {
    fn initialize(&mut self, path: &Path) -> Result<(), DomainError> {
        if self.fail_initialize {
            return Err(DomainError::StorageError(format!("cannot open {}", path.display())));
        }
        self.lock(&self.initialized_paths)?.push(path.display().to_string());
        Ok(())
    }

    fn append(&self, snapshot: &TicketSnapshot) -> Result<i64, DomainError> {
        self.ensure_initialized()?;
        if self.rejected_cities.iter().any(|c| c == snapshot.city()) {
            return Err(DomainError::StorageError(format!("insert rejected for {}", snapshot.city())));
        }
        let mut rows = self.lock(&self.rows)?;
        let id = rows.len() as i64 + 1;
        rows.push(snapshot.clone().with_id(id));
        Ok(id)
    }

    fn list_snapshots(&self) -> Result<Vec<TicketSnapshot>, DomainError> {
        self.ensure_initialized()?;
        Ok(self.lock(&self.rows)?.clone())
    }

    fn count(&self) -> Result<i64, DomainError> {
        self.ensure_initialized()?;
        Ok(self.lock(&self.rows)?.len() as i64)
    }
}
