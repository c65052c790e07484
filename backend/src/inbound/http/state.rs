//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AllocationCommand, AllocationQuery, FixtureAllocationCommand, FixtureAllocationQuery,
    FixtureLedgerQuery, FixtureParticipantDirectory, LedgerQuery, ParticipantDirectory,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```
/// use transplant_registry::inbound::http::state::HttpState;
///
/// let state = HttpState::default();
/// let _directory = state.directory.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub directory: Arc<dyn ParticipantDirectory>,
    pub allocation: Arc<dyn AllocationCommand>,
    pub allocation_query: Arc<dyn AllocationQuery>,
    pub ledger: Arc<dyn LedgerQuery>,
}

impl Default for HttpState {
    fn default() -> Self {
        Self {
            directory: Arc::new(FixtureParticipantDirectory),
            allocation: Arc::new(FixtureAllocationCommand),
            allocation_query: Arc::new(FixtureAllocationQuery),
            ledger: Arc::new(FixtureLedgerQuery),
        }
    }
}
