//! SQLite persistence for ticket snapshots.
//!
//! Exposes `DieselTicketStore`, the `duw_domain::TicketStore` implementation
//! used by the collector, and the `migration` module that creates the schema
//! and upgrades stores written with the legacy layout.

pub mod migration;
pub mod schema;
mod ticket_persistence;

pub use migration::{SchemaGeneration, SchemaOutcome};
pub use ticket_persistence::DieselTicketStore;
