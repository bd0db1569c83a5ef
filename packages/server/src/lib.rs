#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime explorer dashboard.
//!
//! Serves filter options and per-interaction dashboard snapshots computed
//! from the cached Chicago incident table. A frontend renders the map and
//! charts from these JSON payloads.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crime_explorer_dashboard::config::DashboardConfig;
use crime_explorer_dashboard::store::IncidentStore;

/// Shared application state.
pub struct AppState {
    /// Cached incident table and the configuration it was loaded with.
    pub store: Arc<IncidentStore>,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/options", web::get().to(handlers::options))
            .route("/dashboard", web::get().to(handlers::dashboard))
            .route("/refresh", web::post().to(handlers::refresh)),
    );
}

/// Starts the crime explorer API server.
///
/// Reads the configuration from the environment, warms the incident cache,
/// and starts the Actix-Web HTTP server. The caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is invalid, the
/// HTTP client cannot be built, or the server fails to bind or encounters
/// a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = DashboardConfig::from_env().map_err(std::io::Error::other)?;
    let bind_addr = config.bind_addr.clone();
    let port = config.port;
    let store = IncidentStore::new(config).map_err(std::io::Error::other)?;

    log::info!("Loading incidents...");
    let loaded = store.load().await;
    match &loaded.notice {
        Some(notice) => log::warn!("{}", notice.message),
        None => log::info!("Loaded {} incidents", loaded.table.len()),
    }

    let state = web::Data::new(AppState {
        store: Arc::new(store),
    });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
