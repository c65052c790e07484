//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the repository ports backed by PostgreSQL via
//! `diesel-async` with `bb8` connection pooling.
//!
//! The adapters stay thin: they translate between Diesel row structs and
//! validated domain types and map storage failures onto the port error
//! enums. Row structs (`models.rs`) and table definitions (`schema.rs`) are
//! internal to this module and never leak into the domain layer.

mod diesel_allocation_repository;
mod diesel_error_mapping;
mod diesel_ledger_repository;
mod diesel_participant_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_allocation_repository::DieselAllocationRepository;
pub use diesel_ledger_repository::DieselLedgerRepository;
pub use diesel_participant_repository::DieselParticipantRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
