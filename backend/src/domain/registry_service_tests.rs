//! Tests for the participant directory service.

use std::sync::Arc;

use chrono::Utc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockLedgerRepository, MockParticipantRepository};
use crate::domain::Role;

fn participant(role: Role) -> Participant {
    let name = ParticipantName::new("Ada Lovelace").expect("valid name");
    Participant::register(name, role, Utc::now())
}

fn ledger_accepting_one_entry() -> MockLedgerRepository {
    let mut ledger = MockLedgerRepository::new();
    ledger.expect_append().times(1).return_once(|_| Ok(()));
    ledger
}

#[tokio::test]
async fn register_persists_and_ledgers_an_unverified_participant() {
    let mut repo = MockParticipantRepository::new();
    repo.expect_save().times(1).return_once(|_| Ok(()));

    let service = RegistryService::new(Arc::new(repo), Arc::new(ledger_accepting_one_entry()));
    let registered = service
        .register(RegisterParticipantRequest {
            name: "Grace Hopper".to_owned(),
            role: Role::Doctor,
        })
        .await
        .expect("registration succeeds");

    assert_eq!(registered.role(), Role::Doctor);
    assert!(!registered.verified());
}

#[tokio::test]
async fn register_rejects_invalid_names_without_persisting() {
    let mut repo = MockParticipantRepository::new();
    repo.expect_save().times(0);
    let mut ledger = MockLedgerRepository::new();
    ledger.expect_append().times(0);

    let service = RegistryService::new(Arc::new(repo), Arc::new(ledger));
    let error = service
        .register(RegisterParticipantRequest {
            name: "x".to_owned(),
            role: Role::Patient,
        })
        .await
        .expect_err("invalid name");

    assert_eq!(error.code, ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn get_returns_not_found_when_missing() {
    let mut repo = MockParticipantRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let service = RegistryService::new(Arc::new(repo), Arc::new(MockLedgerRepository::new()));
    let error = service
        .get(ParticipantId::random())
        .await
        .expect_err("not found");

    assert_eq!(error.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn set_verified_requires_an_adjudicating_role() {
    let actor = participant(Role::Patient);
    let actor_id = actor.id();

    let mut repo = MockParticipantRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(actor)));
    repo.expect_save().times(0);

    let service = RegistryService::new(Arc::new(repo), Arc::new(MockLedgerRepository::new()));
    let error = service
        .set_verified(SetVerifiedRequest {
            actor_id,
            participant_id: ParticipantId::random(),
            verified: true,
        })
        .await
        .expect_err("patients may not verify");

    assert_eq!(error.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn set_verified_rejects_unregistered_actors() {
    let mut repo = MockParticipantRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let service = RegistryService::new(Arc::new(repo), Arc::new(MockLedgerRepository::new()));
    let error = service
        .set_verified(SetVerifiedRequest {
            actor_id: ParticipantId::random(),
            participant_id: ParticipantId::random(),
            verified: true,
        })
        .await
        .expect_err("unknown actor");

    assert_eq!(error.code, ErrorCode::Unauthorized);
}

#[tokio::test]
async fn set_verified_flips_the_flag_for_a_doctor() {
    let doctor = participant(Role::Doctor);
    let doctor_id = doctor.id();
    let target = participant(Role::Donor);
    let target_id = target.id();

    let mut repo = MockParticipantRepository::new();
    repo.expect_find_by_id()
        .withf(move |id| *id == doctor_id)
        .times(1)
        .return_once(move |_| Ok(Some(doctor)));
    repo.expect_find_by_id()
        .withf(move |id| *id == target_id)
        .times(1)
        .return_once(move |_| Ok(Some(target)));
    repo.expect_save().times(1).return_once(|_| Ok(()));

    let service = RegistryService::new(Arc::new(repo), Arc::new(ledger_accepting_one_entry()));
    let updated = service
        .set_verified(SetVerifiedRequest {
            actor_id: doctor_id,
            participant_id: target_id,
            verified: true,
        })
        .await
        .expect("verification succeeds");

    assert!(updated.verified());
    assert_eq!(updated.id(), target_id);
}

#[tokio::test]
async fn connection_failures_surface_as_service_unavailable() {
    let mut repo = MockParticipantRepository::new();
    repo.expect_save()
        .times(1)
        .return_once(|_| Err(ParticipantRepositoryError::connection("pool unavailable")));

    let service = RegistryService::new(Arc::new(repo), Arc::new(MockLedgerRepository::new()));
    let error = service
        .register(RegisterParticipantRequest {
            name: "Grace Hopper".to_owned(),
            role: Role::Patient,
        })
        .await
        .expect_err("service unavailable");

    assert_eq!(error.code, ErrorCode::ServiceUnavailable);
}
