//! Tests for matching and completion HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{MockAllocationCommand, MockParticipantDirectory};
use crate::domain::{
    OrganDonation, OrganRequest, OrganType, Participant, ParticipantId, ParticipantName, Role,
    Urgency,
};

fn doctor() -> Participant {
    let name = ParticipantName::new("Grace Hopper").expect("valid name");
    Participant::register(name, Role::Doctor, Utc::now())
}

fn matched_pair() -> MatchOutcome {
    let now = Utc::now();
    let mut request = OrganRequest::open(
        ParticipantId::random(),
        OrganType::Heart,
        Urgency::new(5).expect("valid urgency"),
        "dilated cardiomyopathy".to_owned(),
        now,
    )
    .expect("valid request");
    let mut donation = OrganDonation::offer(
        ParticipantId::random(),
        OrganType::Heart,
        None,
        None,
        None,
        now,
    )
    .expect("valid donation");

    request.approve(None, now).expect("approve");
    donation.verify(None, now).expect("verify");
    donation.release(now).expect("release");
    request.mark_matched(donation.id(), now).expect("match");
    donation.allocate(request.id(), now).expect("allocate");

    MatchOutcome { request, donation }
}

fn test_app(
    directory: MockParticipantDirectory,
    allocation: MockAllocationCommand,
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
        ..HttpState::default()
    };
    App::new()
        .app_data(web::Data::new(state))
        .wrap(crate::inbound::http::test_utils::test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(crate::inbound::http::participants::login)
                .service(match_organs)
                .service(complete_transplant),
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
async fn match_returns_both_sides_with_cross_references() {
    let actor = doctor();
    let actor_id = actor.id();
    let outcome = matched_pair();
    let request_id = outcome.request.id();
    let donation_id = outcome.donation.id();

    let mut directory = MockParticipantDirectory::new();
    directory.expect_get().return_once(move |_| Ok(actor));
    let mut allocation = MockAllocationCommand::new();
    allocation
        .expect_match_organs()
        .withf(move |command| {
            command.actor_id == actor_id
                && command.request_id == request_id
                && command.donation_id == donation_id
        })
        .times(1)
        .return_once(move |_| Ok(outcome));

    let app = actix_test::init_service(test_app(directory, allocation)).await;
    let cookie = login_and_get_cookie(&app, actor_id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/matches")
            .cookie(cookie)
            .set_json(serde_json::json!({
                "requestId": request_id.to_string(),
                "donationId": donation_id.to_string(),
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["request"]["status"], "matched");
    assert_eq!(
        body["request"]["matchedDonationId"],
        donation_id.to_string()
    );
    assert_eq!(body["donation"]["status"], "allocated");
    assert_eq!(
        body["donation"]["matchedRequestId"],
        request_id.to_string()
    );
}

#[actix_web::test]
async fn match_rejects_malformed_donation_ids() {
    let actor = doctor();
    let actor_id = actor.id();

    let mut directory = MockParticipantDirectory::new();
    directory.expect_get().return_once(move |_| Ok(actor));
    let mut allocation = MockAllocationCommand::new();
    allocation.expect_match_organs().times(0);

    let app = actix_test::init_service(test_app(directory, allocation)).await;
    let cookie = login_and_get_cookie(&app, actor_id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/matches")
            .cookie(cookie)
            .set_json(serde_json::json!({
                "requestId": Uuid::new_v4().to_string(),
                "donationId": "not-a-uuid",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "donationId");
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[actix_web::test]
async fn match_requires_authentication() {
    let app = actix_test::init_service(test_app(
        MockParticipantDirectory::new(),
        MockAllocationCommand::new(),
    ))
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/matches")
            .set_json(serde_json::json!({
                "requestId": Uuid::new_v4().to_string(),
                "donationId": Uuid::new_v4().to_string(),
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn completion_returns_the_closed_pair() {
    let actor = doctor();
    let actor_id = actor.id();
    let mut outcome = matched_pair();
    let now = Utc::now();
    outcome.request.mark_transplanted(now).expect("transplant");
    outcome.donation.complete(now).expect("complete");
    let request_id = outcome.request.id();

    let mut directory = MockParticipantDirectory::new();
    directory.expect_get().return_once(move |_| Ok(actor));
    let mut allocation = MockAllocationCommand::new();
    allocation
        .expect_complete_transplant()
        .withf(move |command| command.request_id == request_id)
        .times(1)
        .return_once(move |_| Ok(outcome));

    let app = actix_test::init_service(test_app(directory, allocation)).await;
    let cookie = login_and_get_cookie(&app, actor_id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/matches/{request_id}/complete"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["request"]["status"], "transplanted");
    assert_eq!(body["donation"]["status"], "completed");
}

#[actix_web::test]
async fn completing_an_unmatched_request_maps_to_http_409() {
    let actor = doctor();
    let actor_id = actor.id();

    let mut directory = MockParticipantDirectory::new();
    directory.expect_get().return_once(move |_| Ok(actor));
    let mut allocation = MockAllocationCommand::new();
    allocation
        .expect_complete_transplant()
        .times(1)
        .return_once(|_| Err(Error::conflict("request has no matched donation")));

    let app = actix_test::init_service(test_app(directory, allocation)).await;
    let cookie = login_and_get_cookie(&app, actor_id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/matches/3fa85f64-5717-4562-b3fc-2c963f66afa6/complete")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
