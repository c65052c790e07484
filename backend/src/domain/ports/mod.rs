//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod allocation_command;
mod allocation_query;
mod allocation_repository;
mod ledger_query;
mod ledger_repository;
mod participant_directory;
mod participant_repository;

#[cfg(test)]
pub use allocation_command::MockAllocationCommand;
pub use allocation_command::{
    AllocationCommand, CompleteTransplantCommand, CreateDonationCommand, CreateRequestCommand,
    FixtureAllocationCommand, MatchOrgansCommand, MatchOutcome, RecordTransactionCommand,
    ReleaseDonationCommand, ReviewRequestCommand, VerifyDonationCommand,
};
#[cfg(test)]
pub use allocation_query::MockAllocationQuery;
pub use allocation_query::{AllocationQuery, FixtureAllocationQuery, RegistryStats};
#[cfg(test)]
pub use allocation_repository::MockAllocationRepository;
pub use allocation_repository::{
    AllocationCounts, AllocationRepository, AllocationRepositoryError,
    FixtureAllocationRepository,
};
#[cfg(test)]
pub use ledger_query::MockLedgerQuery;
pub use ledger_query::{FixtureLedgerQuery, LedgerQuery};
#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use ledger_repository::{FixtureLedgerRepository, LedgerRepository, LedgerRepositoryError};
#[cfg(test)]
pub use participant_directory::MockParticipantDirectory;
pub use participant_directory::{
    FixtureParticipantDirectory, ParticipantDirectory, RegisterParticipantRequest,
    SetVerifiedRequest,
};
#[cfg(test)]
pub use participant_repository::MockParticipantRepository;
pub use participant_repository::{
    FixtureParticipantRepository, ParticipantRepository, ParticipantRepositoryError,
};
