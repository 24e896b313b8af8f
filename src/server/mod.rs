mod extract;
mod handlers;

use crate::config::Config;
use crate::credentials::{CredentialManager, MemoryCredentialStore};
use crate::error::{AppError, Result};
use crate::google::{GoogleClient, GoogleOAuth, OAuthProvider};
use crate::service::SheetsService;
use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub oauth: Arc<dyn OAuthProvider>,
    pub credentials: Arc<CredentialManager>,
    pub sheets: Arc<SheetsService>,
    pub frontend_url: Arc<str>,
}

pub fn router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.frontend_url)?;

    Ok(Router::new()
        .route("/", get(handlers::root))
        .route("/auth/login", get(handlers::login))
        .route("/auth/callback", get(handlers::callback))
        .route("/auth/status", get(handlers::status))
        .route("/auth/logout", post(handlers::logout))
        .route("/spreadsheets", get(handlers::list_spreadsheets))
        .route(
            "/spreadsheet/{spreadsheet_id}/sheet/{sheet_name}",
            get(handlers::get_sheet_data),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(frontend_url: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(frontend_url.trim_end_matches('/')).map_err(|e| {
        AppError::Config(format!("Invalid frontend URL '{}': {}", frontend_url, e))
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Wire up the Google-backed state from configuration.
pub fn build_state(config: &Config) -> Result<AppState> {
    let timeout = config.server.request_timeout();

    let oauth: Arc<dyn OAuthProvider> = Arc::new(GoogleOAuth::new(&config.google, timeout)?);
    let credentials = Arc::new(CredentialManager::new(
        Arc::new(MemoryCredentialStore::new()),
        oauth.clone(),
    ));
    let sheets = Arc::new(SheetsService::new(
        credentials.clone(),
        Arc::new(GoogleClient::new(timeout)?),
    ));

    if config.google.identity().is_err() {
        warn!("Google OAuth client identity not configured; login will fail until it is set");
    }

    Ok(AppState {
        oauth,
        credentials,
        sheets,
        frontend_url: config.server.frontend_url.as_str().into(),
    })
}

/// Serve the API until Ctrl-C.
#[instrument(name = "Serving", skip_all, fields(bind = %config.server.bind))]
pub async fn serve(config: &Config) -> Result<()> {
    let app = router(build_state(config)?)?;

    let listener = TcpListener::bind(&config.server.bind).await?;
    info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
