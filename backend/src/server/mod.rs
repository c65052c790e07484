//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use transplant_registry::Trace;
#[cfg(debug_assertions)]
use transplant_registry::doc::ApiDoc;
use transplant_registry::domain::{AllocationService, RegistryService};
use transplant_registry::inbound::http::donations::{
    create_donation, get_donation, release_donation, verify_donation,
};
use transplant_registry::inbound::http::health::{HealthState, live, ready};
use transplant_registry::inbound::http::ledger::{list_ledger_entries, record_transaction};
use transplant_registry::inbound::http::matching::{complete_transplant, match_organs};
use transplant_registry::inbound::http::participants::{
    get_participant, login, register_participant, set_participant_verification,
};
use transplant_registry::inbound::http::registry::{list_live_organs, registry_stats};
use transplant_registry::inbound::http::requests::{
    approve_request, create_request, get_request, list_pending_requests, reject_request,
};
use transplant_registry::inbound::http::state::HttpState;
use transplant_registry::outbound::persistence::{
    DieselAllocationRepository, DieselLedgerRepository, DieselParticipantRepository,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

/// Build the shared HTTP state from the configured persistence layer.
///
/// With a database pool, the registry and allocation services run over the
/// Diesel repositories; both services share the same participant and ledger
/// adapters so writes land in one place. Without a pool, the fixture ports
/// keep the server bootable for smoke tests.
fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    match &config.db_pool {
        Some(pool) => {
            let participants = Arc::new(DieselParticipantRepository::new(pool.clone()));
            let ledger = Arc::new(DieselLedgerRepository::new(pool.clone()));
            let allocations = Arc::new(DieselAllocationRepository::new(pool.clone()));

            let directory = Arc::new(RegistryService::new(participants.clone(), ledger.clone()));
            let allocation = Arc::new(AllocationService::new(participants, allocations, ledger));

            web::Data::new(HttpState {
                directory,
                allocation: allocation.clone(),
                allocation_query: allocation.clone(),
                ledger: allocation,
            })
        }
        None => web::Data::new(HttpState::default()),
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    // Static segment must win over the `{id}` matcher, so the pending
    // listing registers before the request lookup.
    let api = web::scope("/api/v1")
        .wrap(session)
        .service(register_participant)
        .service(login)
        .service(get_participant)
        .service(set_participant_verification)
        .service(create_request)
        .service(list_pending_requests)
        .service(get_request)
        .service(approve_request)
        .service(reject_request)
        .service(create_donation)
        .service(get_donation)
        .service(verify_donation)
        .service(release_donation)
        .service(match_organs)
        .service(complete_transplant)
        .service(record_transaction)
        .service(list_ledger_entries)
        .service(list_live_organs)
        .service(registry_stats);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] containing session and binding settings.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::Value;

    use super::*;

    #[actix_web::test]
    async fn fixture_state_serves_the_pending_listing() {
        let deps = AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: build_http_state(&ServerConfig::new(
                Key::generate(),
                false,
                SameSite::Lax,
                "127.0.0.1:0".parse().expect("socket addr"),
            )),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        };
        let app = test::init_service(build_app(deps)).await;

        // The static route must not be shadowed by /requests/{id}.
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/requests/pending?organ=heart")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert!(body.is_array());
    }

    #[actix_web::test]
    async fn readiness_flips_once_the_server_is_created() {
        let health_state = web::Data::new(HealthState::new());
        assert!(!health_state.is_ready());

        let config = ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            "127.0.0.1:0".parse().expect("socket addr"),
        );
        let server = create_server(health_state.clone(), config).expect("server binds");

        assert!(health_state.is_ready());
        drop(server);
    }
}
