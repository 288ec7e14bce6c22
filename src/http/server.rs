//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, metrics)
//! - Bind server to listener
//! - Sweep expired wizard sessions in the background
//! - Persist drafts on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::drafts::DraftStore;
use crate::http::handlers;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::llm::{LlmError, ReportClient};
use crate::observability::metrics;
use crate::report::ReportGenerator;
use crate::security::with_security_headers;
use crate::wizard::SessionStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub generator: ReportGenerator,
    pub sessions: SessionStore,
    pub drafts: DraftStore,
}

/// HTTP server for the report API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server whose generator talks to the configured endpoint.
    pub fn new(config: ServiceConfig) -> Result<Self, LlmError> {
        let client = ReportClient::new(config.llm.clone(), &config.retries, &config.timeouts)?;
        Ok(Self::with_generator(config, ReportGenerator::new(client)))
    }

    pub fn with_generator(config: ServiceConfig, generator: ReportGenerator) -> Self {
        let drafts = DraftStore::from_config(&config.drafts);
        let state = AppState {
            config: Arc::new(config),
            generator,
            sessions: SessionStore::new(),
            drafts,
        };
        let router = Self::build_router(&state);
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let config = &state.config;

        let api = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/generate-report", post(handlers::generate_report))
            .route("/api/validate", post(handlers::validate))
            .route("/api/derive-last-week", post(handlers::derive_last_week))
            .route("/api/sessions", post(handlers::create_session))
            .route("/api/sessions/{id}", get(handlers::get_session))
            .route("/api/sessions/{id}/shop-info", post(handlers::submit_shop_info))
            .route("/api/sessions/{id}/data", post(handlers::submit_data))
            .route("/api/sessions/{id}/back", post(handlers::back))
            .route("/api/sessions/{id}/restart", post(handlers::restart))
            .route("/api/sessions/{id}/download", get(handlers::download))
            .route("/api/sessions/{id}/print", get(handlers::print))
            .route("/api/drafts", get(handlers::list_drafts))
            .route(
                "/api/drafts/{key}",
                get(handlers::get_draft)
                    .put(handlers::put_draft)
                    .delete(handlers::delete_draft),
            )
            .with_state(state.clone())
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.server_request_secs,
            )));

        with_security_headers(api, &config.security)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    /// Router with all layers, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweeper = spawn_session_sweeper(&self.state, shutdown.resubscribe());

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        sweeper.abort();
        if let Err(e) = self.state.drafts.save() {
            tracing::error!(error = %e, "Failed to save drafts on shutdown");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn spawn_session_sweeper(
    state: &AppState,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let sessions = state.sessions.clone();
    let ttl = Duration::from_secs(state.config.sessions.ttl_secs);
    let every = Duration::from_secs(state.config.sessions.sweep_interval_secs);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    sessions.purge_expired(ttl);
                }
                _ = shutdown.recv() => break,
            }
        }
    })
}
