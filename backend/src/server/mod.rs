//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerSettings;
pub use state_builders::{AppState, build_app_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use std::net::SocketAddr;

use pr_reviewer::Trace;
#[cfg(debug_assertions)]
use pr_reviewer::doc::ApiDoc;
use pr_reviewer::inbound::http::error::{json_error_handler, query_error_handler};
use pr_reviewer::inbound::http::health::{HealthState, live, ready};
use pr_reviewer::inbound::http::pull_requests::{
    create_pull_request, get_pull_request, merge_pull_request, reassign_reviewer,
};
use pr_reviewer::inbound::http::state::HttpState;
use pr_reviewer::inbound::http::stats::get_statistics;
use pr_reviewer::inbound::http::teams::{create_team, get_team};
use pr_reviewer::inbound::http::users::{bulk_deactivate, get_review, set_is_active};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

pub(crate) fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(Trace)
        .service(create_team)
        .service(get_team)
        .service(set_is_active)
        .service(bulk_deactivate)
        .service(get_review)
        .service(create_pull_request)
        .service(merge_pull_request)
        .service(reassign_reviewer)
        .service(get_pull_request)
        .service(get_statistics)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server bound to `bind_addr`.
///
/// `health_state` is marked ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(http_state);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}
