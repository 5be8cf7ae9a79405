//! HTTP API server

use super::handlers::{self, AppState};
use crate::config::CoachConfig;
use crate::session::EvaluationSession;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
    /// Largest accepted request body (base64 images included)
    pub max_body_bytes: usize,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self::from(&CoachConfig::default())
    }
}

impl From<&CoachConfig> for ApiServerConfig {
    fn from(config: &CoachConfig) -> Self {
        Self {
            addr: config.listen_addr,
            max_body_bytes: config.max_upload_bytes,
        }
    }
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    session: EvaluationSession,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, session: EvaluationSession) -> Self {
        Self { config, session }
    }

    pub fn config(&self) -> &ApiServerConfig {
        &self.config
    }

    /// Build router
    pub fn router(&self) -> Router {
        build_router(
            AppState {
                session: self.session.clone(),
            },
            self.config.max_body_bytes,
        )
    }

    /// Serve until Ctrl-C
    pub async fn serve(self) -> anyhow::Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!("API server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/modes", get(handlers::modes))
        .route("/evaluate", post(handlers::evaluate))
        .route("/history", get(handlers::history))
        .route("/history/trend", get(handlers::trend))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
