//! Tests for participant HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::Utc;
use serde_json::Value;

use super::*;
use crate::domain::ports::MockParticipantDirectory;
use crate::domain::{ParticipantName, Role};

fn sample_participant(role: Role) -> Participant {
    let name = ParticipantName::new("Ada Lovelace").expect("valid name");
    Participant::register(name, role, Utc::now())
}

fn test_app(
    directory: MockParticipantDirectory,
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
        ..HttpState::default()
    };
    App::new()
        .app_data(web::Data::new(state))
        .wrap(crate::inbound::http::test_utils::test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(register_participant)
                .service(login)
                .service(get_participant)
                .service(set_participant_verification),
        )
}

#[actix_web::test]
async fn register_returns_participant_and_session_cookie() {
    let registered = sample_participant(Role::Patient);
    let mut directory = MockParticipantDirectory::new();
    directory
        .expect_register()
        .times(1)
        .return_once(move |_| Ok(registered));

    let app = actix_test::init_service(test_app(directory)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/participants")
            .set_json(serde_json::json!({ "name": "Ada Lovelace", "role": "patient" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .response()
            .cookies()
            .any(|cookie| cookie.name() == "session")
    );
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["role"], "patient");
    assert_eq!(body["verified"], false);
}

#[actix_web::test]
async fn register_rejects_unknown_roles() {
    let mut directory = MockParticipantDirectory::new();
    directory.expect_register().times(0);

    let app = actix_test::init_service(test_app(directory)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/participants")
            .set_json(serde_json::json!({ "name": "Ada Lovelace", "role": "surgeon" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "invalid_role");
}

#[actix_web::test]
async fn login_establishes_a_session_for_known_participants() {
    let participant = sample_participant(Role::Doctor);
    let participant_id = participant.id();
    let mut directory = MockParticipantDirectory::new();
    directory
        .expect_get()
        .times(1)
        .return_once(move |_| Ok(participant));

    let app = actix_test::init_service(test_app(directory)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({ "participantId": participant_id.to_string() }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .response()
            .cookies()
            .any(|cookie| cookie.name() == "session")
    );
}

#[actix_web::test]
async fn login_rejects_malformed_ids() {
    let mut directory = MockParticipantDirectory::new();
    directory.expect_get().times(0);

    let app = actix_test::init_service(test_app(directory)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({ "participantId": "not-a-uuid" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn get_participant_surfaces_not_found() {
    let mut directory = MockParticipantDirectory::new();
    directory
        .expect_get()
        .times(1)
        .return_once(|id| Err(Error::not_found(format!("participant {id} not found"))));

    let app = actix_test::init_service(test_app(directory)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/participants/3fa85f64-5717-4562-b3fc-2c963f66afa6")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn verification_requires_an_authenticated_session() {
    let mut directory = MockParticipantDirectory::new();
    directory.expect_set_verified().times(0);

    let app = actix_test::init_service(test_app(directory)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/participants/3fa85f64-5717-4562-b3fc-2c963f66afa6/verification")
            .set_json(serde_json::json!({ "verified": true }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn verification_passes_the_session_actor_through() {
    let doctor = sample_participant(Role::Doctor);
    let doctor_id = doctor.id();
    let mut verified = sample_participant(Role::Donor);
    verified.set_verified(true);
    let target_id = verified.id();

    let mut directory = MockParticipantDirectory::new();
    directory
        .expect_get()
        .times(1)
        .return_once(move |_| Ok(doctor));
    directory
        .expect_set_verified()
        .withf(move |request| {
            request.actor_id == doctor_id
                && request.participant_id == target_id
                && request.verified
        })
        .times(1)
        .return_once(move |_| Ok(verified));

    let app = actix_test::init_service(test_app(directory)).await;
    let login_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({ "participantId": doctor_id.to_string() }))
            .to_request(),
    )
    .await;
    let cookie = login_res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/participants/{target_id}/verification"))
            .cookie(cookie)
            .set_json(serde_json::json!({ "verified": true }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["verified"], true);
}
