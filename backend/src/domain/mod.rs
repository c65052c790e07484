//! Domain primitives, aggregates, and services.
//!
//! Purpose: model the organ allocation registry — participants, organ
//! requests, organ donations, their status machines, and the append-only
//! audit ledger — independently of transport and storage. Types are
//! immutable except through transition methods that enforce the forward-only
//! status sequences; invariants and serialisation contracts are documented
//! on each type.

pub mod allocation_service;
pub mod donation;
pub mod error;
pub mod ledger;
pub mod live_organ;
pub mod organ;
pub mod participant;
pub mod ports;
pub mod registry_service;
pub mod request;

pub use self::allocation_service::AllocationService;
pub use self::donation::{
    DonationStatus, DonationTransitionError, DonationValidationError, OrganDonation,
    OrganDonationDraft,
};
pub use self::error::{Error, ErrorCode};
pub use self::ledger::{LedgerAction, LedgerEntry, LedgerEntryDraft};
pub use self::live_organ::LiveOrganView;
pub use self::organ::{OrganType, ParseOrganTypeError, Urgency, UrgencyError};
pub use self::participant::{
    Participant, ParticipantId, ParticipantName, ParticipantValidationError, Role,
};
pub use self::registry_service::RegistryService;
pub use self::request::{
    OrganRequest, OrganRequestDraft, RequestStatus, RequestTransitionError,
    RequestValidationError,
};

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
