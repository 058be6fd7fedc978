//! HTTP API module
//! 
//! Timer control, presets, history and profile endpoints.

pub mod handlers;
pub mod library;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;
use library::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/status", get(timer_status_handler))
        .route("/timer/settings", get(get_settings_handler).put(update_settings_handler))
        .route("/music", get(get_music_handler).put(update_music_handler))
        .route("/presets", get(list_presets_handler).post(create_preset_handler))
        .route(
            "/presets/:id",
            get(get_preset_handler)
                .put(update_preset_handler)
                .delete(delete_preset_handler),
        )
        .route("/presets/:id/favorite", post(favorite_preset_handler))
        .route("/presets/:id/apply", post(apply_preset_handler))
        .route("/history", get(list_history_handler))
        .route("/history/stats", get(history_stats_handler))
        .route("/history/:id", axum::routing::delete(delete_history_handler))
        .route("/profile", get(get_profile_handler).put(update_profile_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
