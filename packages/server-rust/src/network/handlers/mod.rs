//! HTTP handler definitions for the Cellar server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod health;
pub mod wines;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use wines::{
    delete_wine, delete_wine_confirm, edit_wine, edit_wine_form, new_wine, new_wine_form,
    not_found_handler, wine_detail, wine_list,
};

use std::sync::Arc;
use std::time::Instant;

use axum::response::Response;

use super::{NetworkConfig, ShutdownController};
use crate::error::AppError;
use crate::render::Views;
use crate::traits::WineStore;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// The wine store; owns every record.
    pub store: Arc<dyn WineStore>,
    /// Page renderer.
    pub views: Arc<Views>,
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Network configuration (bind address, timeouts).
    pub config: Arc<NetworkConfig>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Turns a handler outcome into a response, rendering error pages.
    pub(crate) fn respond(&self, result: Result<Response, AppError>) -> Response {
        result.unwrap_or_else(|err| err.into_page(&self.views))
    }
}
