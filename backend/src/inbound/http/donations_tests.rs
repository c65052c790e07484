//! Tests for organ donation HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::Utc;
use serde_json::Value;

use super::*;
use crate::domain::ports::{MockAllocationCommand, MockAllocationQuery, MockParticipantDirectory};
use crate::domain::{OrganType, Participant, ParticipantId, ParticipantName, Role};

fn donor() -> Participant {
    let name = ParticipantName::new("Tim Berners-Lee").expect("valid name");
    Participant::register(name, Role::Donor, Utc::now())
}

fn pending_donation(donor_id: ParticipantId) -> OrganDonation {
    OrganDonation::offer(
        donor_id,
        OrganType::Kidney,
        Some(51.5),
        Some(-0.12),
        None,
        Utc::now(),
    )
    .expect("valid donation")
}

fn test_app(
    directory: MockParticipantDirectory,
    allocation: MockAllocationCommand,
    allocation_query: MockAllocationQuery,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState {
        directory: Arc::new(directory),
        allocation: Arc::new(allocation),
        allocation_query: Arc::new(allocation_query),
        ..HttpState::default()
    };
    App::new()
        .app_data(web::Data::new(state))
        .wrap(crate::inbound::http::test_utils::test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(crate::inbound::http::participants::login)
                .service(create_donation)
                .service(get_donation)
                .service(verify_donation)
                .service(release_donation),
        )
}

async fn login_and_get_cookie(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    participant_id: ParticipantId,
) -> actix_web::cookie::Cookie<'static> {
    let login_res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({ "participantId": participant_id.to_string() }))
            .to_request(),
    )
    .await;
    assert!(login_res.status().is_success());
    login_res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

#[actix_web::test]
async fn create_donation_returns_the_pending_offer() {
    let actor = donor();
    let actor_id = actor.id();
    let donation = pending_donation(actor_id);

    let mut directory = MockParticipantDirectory::new();
    directory.expect_get().return_once(move |_| Ok(actor));
    let mut allocation = MockAllocationCommand::new();
    allocation
        .expect_create_donation()
        .withf(move |command| {
            command.actor_id == actor_id
                && command.organ == OrganType::Kidney
                && command.latitude == Some(51.5)
        })
        .times(1)
        .return_once(move |_| Ok(donation));

    let app = actix_test::init_service(test_app(
        directory,
        allocation,
        MockAllocationQuery::new(),
    ))
    .await;
    let cookie = login_and_get_cookie(&app, actor_id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/donations")
            .cookie(cookie)
            .set_json(serde_json::json!({
                "organ": "kidney",
                "latitude": 51.5,
                "longitude": -0.12,
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["medicalClearance"], false);
    assert_eq!(body["matchedRequestId"], Value::Null);
}

#[actix_web::test]
async fn create_donation_rejects_malformed_viability_deadlines() {
    let actor = donor();
    let actor_id = actor.id();

    let mut directory = MockParticipantDirectory::new();
    directory.expect_get().return_once(move |_| Ok(actor));
    let mut allocation = MockAllocationCommand::new();
    allocation.expect_create_donation().times(0);

    let app = actix_test::init_service(test_app(
        directory,
        allocation,
        MockAllocationQuery::new(),
    ))
    .await;
    let cookie = login_and_get_cookie(&app, actor_id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/donations")
            .cookie(cookie)
            .set_json(serde_json::json!({
                "organ": "kidney",
                "viableUntil": "tomorrow-ish",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "invalid_timestamp");
    assert_eq!(body["details"]["field"], "viableUntil");
}

#[actix_web::test]
async fn create_donation_requires_authentication() {
    let app = actix_test::init_service(test_app(
        MockParticipantDirectory::new(),
        MockAllocationCommand::new(),
        MockAllocationQuery::new(),
    ))
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/donations")
            .set_json(serde_json::json!({ "organ": "kidney" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn get_donation_returns_the_stored_offer() {
    let donation = pending_donation(ParticipantId::random());
    let donation_id = donation.id();

    let mut query = MockAllocationQuery::new();
    query
        .expect_get_donation()
        .withf(move |id| *id == donation_id)
        .times(1)
        .return_once(move |_| Ok(donation));

    let app = actix_test::init_service(test_app(
        MockParticipantDirectory::new(),
        MockAllocationCommand::new(),
        query,
    ))
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/donations/{donation_id}"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], donation_id.to_string());
    assert_eq!(body["organ"], "kidney");
}

#[actix_web::test]
async fn verify_passes_notes_to_the_service() {
    let doctor = {
        let name = ParticipantName::new("Grace Hopper").expect("valid name");
        Participant::register(name, Role::Doctor, Utc::now())
    };
    let doctor_id = doctor.id();
    let mut verified = pending_donation(ParticipantId::random());
    let donation_id = verified.id();
    verified
        .verify(Some("bloodwork clean".to_owned()), Utc::now())
        .expect("verify donation");

    let mut directory = MockParticipantDirectory::new();
    directory.expect_get().return_once(move |_| Ok(doctor));
    let mut allocation = MockAllocationCommand::new();
    allocation
        .expect_verify_donation()
        .withf(move |command| {
            command.actor_id == doctor_id
                && command.donation_id == donation_id
                && command.notes.as_deref() == Some("bloodwork clean")
        })
        .times(1)
        .return_once(move |_| Ok(verified));

    let app = actix_test::init_service(test_app(
        directory,
        allocation,
        MockAllocationQuery::new(),
    ))
    .await;
    let cookie = login_and_get_cookie(&app, doctor_id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/donations/{donation_id}/verify"))
            .cookie(cookie)
            .set_json(serde_json::json!({ "notes": "bloodwork clean" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["status"], "verified");
    assert_eq!(body["medicalClearance"], true);
}

#[actix_web::test]
async fn release_conflict_maps_to_http_409() {
    let doctor = {
        let name = ParticipantName::new("Grace Hopper").expect("valid name");
        Participant::register(name, Role::Doctor, Utc::now())
    };
    let doctor_id = doctor.id();

    let mut directory = MockParticipantDirectory::new();
    directory.expect_get().return_once(move |_| Ok(doctor));
    let mut allocation = MockAllocationCommand::new();
    allocation
        .expect_release_donation()
        .times(1)
        .return_once(|_| Err(Error::conflict("donation has not been verified")));

    let app = actix_test::init_service(test_app(
        directory,
        allocation,
        MockAllocationQuery::new(),
    ))
    .await;
    let cookie = login_and_get_cookie(&app, doctor_id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/donations/3fa85f64-5717-4562-b3fc-2c963f66afa6/release")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
