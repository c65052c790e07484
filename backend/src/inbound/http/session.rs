//! Participant session handling for the REST adapter.
//!
//! Handlers never touch `actix_session` directly; [`SessionContext`] exposes
//! the three operations they need (persist on login, optional read, required
//! read) in terms of [`ParticipantId`], and maps cookie failures onto the
//! domain error type.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, ParticipantId};

pub(crate) const PARTICIPANT_ID_KEY: &str = "participant_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated participant's id in the session cookie.
    ///
    /// The session key is rotated first so a cookie captured before login
    /// cannot be replayed as the authenticated participant.
    pub fn persist_participant(&self, participant_id: &ParticipantId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(PARTICIPANT_ID_KEY, participant_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current participant id from the session, if present.
    ///
    /// A stored value that does not parse as a participant id is treated as
    /// no session rather than an error; the caller ends up at the login
    /// path either way.
    pub fn participant_id(&self) -> Result<Option<ParticipantId>, Error> {
        let id = self
            .0
            .get::<String>(PARTICIPANT_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match raw.parse::<ParticipantId>() {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid participant id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated participant id or return `401 Unauthorized`.
    pub fn require_participant_id(&self) -> Result<ParticipantId, Error> {
        self.participant_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    //! Sessions are exercised through the real login endpoint so the tests
    //! cover the cookie contract the rest of the adapter relies on.

    use std::sync::Arc;

    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::MockParticipantDirectory;
    use crate::domain::{Participant, ParticipantName, Role};
    use crate::inbound::http::participants::login;
    use crate::inbound::http::state::HttpState;
    use crate::inbound::http::test_utils::test_session_middleware;

    fn doctor() -> Participant {
        let name = ParticipantName::new("Grace Hopper").expect("valid name");
        Participant::register(name, Role::Doctor, Utc::now())
    }

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_participant_id()?;
        Ok(HttpResponse::Ok().body(id.to_string()))
    }

    fn state_with_directory(participant: Participant) -> HttpState {
        let mut directory = MockParticipantDirectory::new();
        directory
            .expect_get()
            .return_once(move |_| Ok(participant));
        HttpState {
            directory: Arc::new(directory),
            ..HttpState::default()
        }
    }

    #[actix_web::test]
    async fn login_issues_a_cookie_that_authenticates_later_calls() {
        let participant = doctor();
        let participant_id = participant.id();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with_directory(participant)))
                .service(
                    web::scope("/api/v1")
                        .wrap(test_session_middleware())
                        .service(login)
                        .route("/whoami", web::get().to(whoami)),
                ),
        )
        .await;

        let login_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "participantId": participant_id.to_string() }))
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let cookie = login_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie issued")
            .into_owned();

        let whoami_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(whoami_res.status(), StatusCode::OK);
        let body = test::read_body(whoami_res).await;
        assert_eq!(body, participant_id.to_string());
    }

    #[actix_web::test]
    async fn requests_without_a_session_are_unauthorised() {
        let app = test::init_service(
            App::new().service(
                web::scope("/api/v1")
                    .wrap(test_session_middleware())
                    .route("/whoami", web::get().to(whoami)),
            ),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/whoami").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn sessions_holding_a_malformed_id_do_not_authenticate() {
        // Writes junk under the participant key through the raw session,
        // standing in for a cookie minted by an older deployment.
        let app = test::init_service(
            App::new().service(
                web::scope("/api/v1")
                    .wrap(test_session_middleware())
                    .route(
                        "/seed",
                        web::post().to(|session: Session| async move {
                            session
                                .insert(PARTICIPANT_ID_KEY, "participant-17")
                                .expect("seed junk id");
                            HttpResponse::Ok()
                        }),
                    )
                    .route("/whoami", web::get().to(whoami)),
            ),
        )
        .await;

        let seed_res = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/v1/seed").to_request(),
        )
        .await;
        let cookie = seed_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie issued")
            .into_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
