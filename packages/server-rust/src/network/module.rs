//! Network module with deferred startup lifecycle.
//!
//! Implements the deferred startup pattern: `new()` creates resources,
//! `start()` binds the TCP listener, and `serve()` starts accepting
//! connections. Binding before serving lets the caller learn the actual
//! port (useful with port 0) before any request is handled.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    delete_wine, delete_wine_confirm, edit_wine, edit_wine_form, health_handler,
    liveness_handler, new_wine, new_wine_form, not_found_handler, readiness_handler, wine_detail,
    wine_list, AppState,
};
use super::middleware::{build_http_layers, track_in_flight};
use super::shutdown::ShutdownController;
use crate::render::Views;
use crate::traits::WineStore;

/// Assembles the axum router with all routes and middleware.
///
/// Routes:
/// - `GET /` -- wine list
/// - `GET|POST /new` -- create form
/// - `GET /{id}` -- wine detail
/// - `GET|POST /{id}/edit` -- edit form
/// - `GET|POST /{id}/delete` -- delete confirmation and deletion
/// - `GET /health`, `/health/live`, `/health/ready` -- health probes
///
/// Anything else renders the not-found page.
pub fn build_router(state: AppState) -> Router {
    let layers = build_http_layers(&state.config);
    let in_flight = axum::middleware::from_fn_with_state(
        Arc::clone(&state.shutdown),
        track_in_flight,
    );

    Router::new()
        .route("/", get(wine_list))
        .route("/new", get(new_wine_form).post(new_wine))
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/{id}", get(wine_detail))
        .route("/{id}/edit", get(edit_wine_form).post(edit_wine))
        .route("/{id}/delete", get(delete_wine_confirm).post(delete_wine))
        .fallback(not_found_handler)
        .layer(in_flight)
        .layer(layers)
        .with_state(state)
}

/// Manages the HTTP server lifecycle.
///
/// 1. `new()` -- allocates shared state (shutdown controller)
/// 2. `start()` -- binds TCP listener to the configured address
/// 3. `serve()` -- accepts connections until shutdown is signalled, drains
///    in-flight requests, then closes the store
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    store: Arc<dyn WineStore>,
    views: Arc<Views>,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, store: Arc<dyn WineStore>, views: Arc<Views>) -> Self {
        Self {
            config,
            listener: None,
            store,
            views,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    /// Returns a shared reference to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    fn app_state(&self) -> AppState {
        AppState {
            store: Arc::clone(&self.store),
            views: Arc::clone(&self.views),
            shutdown: Arc::clone(&self.shutdown),
            config: Arc::new(self.config.clone()),
            start_time: Instant::now(),
        }
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves.
    ///
    /// After the shutdown signal the health state moves to Draining, the
    /// server stops accepting connections, in-flight requests get up to
    /// `drain_timeout` to finish, and the store is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first, if the server
    /// hits a fatal I/O error, or if the store fails to close.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let Some(listener) = self.listener.take() else {
            anyhow::bail!("start() must be called before serve()");
        };
        let router = build_router(self.app_state());
        let shutdown_ctrl = Arc::clone(&self.shutdown);

        shutdown_ctrl.set_ready();
        info!("serving HTTP connections");

        let signal_ctrl = Arc::clone(&shutdown_ctrl);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("shutdown requested, draining");
                signal_ctrl.trigger_shutdown();
            })
            .await?;

        if shutdown_ctrl.wait_for_drain(self.config.drain_timeout).await {
            info!("all requests drained");
        } else {
            warn!(
                in_flight = shutdown_ctrl.in_flight_count(),
                "drain timeout expired with requests remaining"
            );
        }

        self.store.close().await?;
        info!("store closed");
        Ok(())
    }
}
