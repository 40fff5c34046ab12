//! Backend entry-point: loads settings, wires adapters, and serves HTTP.

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use listings::inbound::http::credential_config::{BuildMode, credential_settings_from_env};
use listings::inbound::http::health::HealthState;
use listings::server::{ServerConfig, ServerSettings, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().wrap_err("failed to load server settings")?;
    let credentials =
        credential_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .wrap_err("invalid credential configuration")?;
    let http_state = build_http_state(&settings, &credentials)
        .await
        .wrap_err("failed to assemble adapters")?;

    let config = ServerConfig::new(settings.bind_addr(), http_state)
        .with_max_upload_bytes(settings.max_upload_bytes());
    info!(addr = %config.bind_addr(), "listening");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)
        .wrap_err("failed to bind HTTP listener")?;
    let outcome = server.await;
    health_state.mark_draining();
    outcome.wrap_err("HTTP server stopped with an error")
}
