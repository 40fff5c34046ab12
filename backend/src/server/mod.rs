//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, ServerSettings};
pub use state_builders::{
    Collaborators, Repositories, StartupError, build_http_state, http_state_ports,
};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{SameOrigin, Trace};
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::Error;
use crate::inbound::http::accounts::{
    check_reset_token, confirm, forgot_password, login, logout, register, reset_password,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::listings::{
    attach_image, create, create_form, delete, edit, edit_form, image_form, messages,
    owner_listing, toggle_published,
};
use crate::inbound::http::public::{
    category, home, published_listings, search, send_message, show,
};
use crate::inbound::http::state::HttpState;

/// Form bodies are small; only image uploads need a larger payload limit.
const FORM_LIMIT_BYTES: usize = 16 * 1024;

/// Shared state handed to every worker's [`App`].
#[derive(Clone)]
pub struct AppDependencies {
    /// Readiness and liveness flags.
    pub health_state: web::Data<HealthState>,
    /// Ports used by the handlers.
    pub http_state: web::Data<HttpState>,
    /// Upper bound on raw request bodies such as image uploads.
    pub max_upload_bytes: usize,
}

/// Build the application with every route and middleware registered.
pub fn build_app(
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
        max_upload_bytes,
    } = deps;

    let forms = web::FormConfig::default()
        .limit(FORM_LIMIT_BYTES)
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into());

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(forms)
        .app_data(web::PayloadConfig::new(max_upload_bytes))
        .wrap(SameOrigin)
        .wrap(Trace)
        .service(login)
        .service(logout)
        .service(register)
        .service(confirm)
        .service(forgot_password)
        .service(check_reset_token)
        .service(reset_password)
        .service(owner_listing)
        .service(create_form)
        .service(create)
        .service(image_form)
        .service(attach_image)
        .service(edit_form)
        .service(edit)
        .service(delete)
        .service(toggle_published)
        .service(messages)
        .service(home)
        .service(category)
        .service(search)
        .service(published_listings)
        .service(show)
        .service(send_message)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        http_state,
        max_upload_bytes,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            max_upload_bytes,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;

    use super::*;
    use crate::inbound::http::test_utils::MockPorts;

    fn deps(max_upload_bytes: usize) -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: MockPorts::default().into_state(),
            max_upload_bytes,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn health_endpoints_are_mounted() {
        let app = test::init_service(build_app(deps(1024))).await;
        let get = |uri: &'static str| test::TestRequest::get().uri(uri).to_request();

        let live_res = test::call_service(&app, get("/health/live")).await;
        assert_eq!(live_res.status(), StatusCode::OK);
        let ready_res = test::call_service(&app, get("/health/ready")).await;
        assert_eq!(ready_res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_form_bodies_are_json_errors() {
        let app = test::init_service(build_app(deps(1024))).await;
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{}")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "invalid_request");
    }
}
