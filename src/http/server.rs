//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router for the preview API
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown signal fires

use std::time::Duration;

use axum::{
    routing::{get, put},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::http::handlers::*;
use crate::routing::ProxyRouter;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: ProxyRouter,
}

/// HTTP server exposing decision previews and override mutation.
pub struct PreviewServer {
    app: Router,
}

impl PreviewServer {
    pub fn new(router: ProxyRouter, config: &ListenerConfig) -> Self {
        let state = AppState { router };
        let app = Self::build_router(state, Duration::from_secs(config.request_timeout_secs));
        Self { app }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState, timeout: Duration) -> Router {
        Router::new()
            .route("/health", get(get_health))
            .route("/decision", get(get_decision))
            .route("/profiles", get(get_profiles))
            .route("/snapshot", get(get_snapshot))
            .route("/overrides/tab/{id}", put(put_tab_override).delete(delete_tab_override))
            .route("/overrides/group/{id}", put(put_group_override).delete(delete_group_override))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(timeout))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The configured router, for in-process use.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Bind the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ServerError> {
        TcpListener::bind(&config.bind_address)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.bind_address.clone(),
                source,
            })
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Preview API starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Preview API stopped");
        Ok(())
    }
}
