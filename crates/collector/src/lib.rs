//! Crate `collector`: the DUW queue-status collection pipeline.
//!
//! `LifecycleController` wires the ports defined in `duw_domain` (transport,
//! settings, store, remote backup) with a `ResponseTransformer` and runs
//! either a single fetch-parse-persist cycle or a polling loop that can be
//! cancelled through a `StopHandle`.
//!
//! Quick example with the in-memory doubles:
//! ```rust
//! use collector::{DuwResponseTransformer, LifecycleController, RunMode, DUW_STATUS_URL};
//! use duw_domain::stubs::{FixedClock, MapConfigSource, RecordingBackupSync, StaticTransport};
//! use duw_domain::{InMemoryTicketStore, TicketStore};
//! use std::sync::Arc;
//!
//! let transport = StaticTransport::new().respond(DUW_STATUS_URL, r#"{"result":{"Wrocław":[{"name":"A","id":1}]}}"#);
//! let store = InMemoryTicketStore::new();
//! let clock = Arc::new(FixedClock::new("2024-05-01 10:00:00"));
//! let mut controller = LifecycleController::new(Box::new(transport),
//!                                               Box::new(store.clone()),
//!                                               Box::new(MapConfigSource::new()),
//!                                               Box::new(RecordingBackupSync::new()),
//!                                               Box::new(DuwResponseTransformer::new(clock)));
//! controller.start(RunMode::OneShot).unwrap();
//! assert_eq!(store.count().unwrap(), 1);
//! ```
pub mod errors;
pub mod lifecycle;
pub mod settings;
pub mod transformer;

pub use errors::*;
pub use lifecycle::*;
pub use settings::*;
pub use transformer::*;
