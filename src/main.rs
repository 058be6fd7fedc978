//! Shadowbox Timer - A round timer for shadow-boxing workouts
//!
//! This is the main entry point for the shadowbox-timer server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use shadowbox_timer::{
    api::create_router,
    config::Config,
    services::{CommandPlayer, HistoryStore, PresetStore, SoundService},
    state::AppState,
    tasks::{spawn_sound_cues, spawn_workout_recorder},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("shadowbox_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting shadowbox-timer server v{}", env!("CARGO_PKG_VERSION"));
    let settings = config.timer_settings();
    info!(
        "Configuration: host={}, port={}, rounds={}, round={}s, rest={}s, get-ready={}s",
        config.host,
        config.port,
        settings.total_rounds,
        settings.round_time,
        settings.rest_time,
        settings.get_ready_time
    );

    let data_dir = config.data_dir();
    info!("Data directory: {}", data_dir.display());
    let presets = PresetStore::open(data_dir.join("presets.json"));
    let history = HistoryStore::open(data_dir);

    let sound = match config.bell_command.as_deref() {
        Some(bell) => match CommandPlayer::new(bell, config.music_command.as_deref()) {
            Ok(player) => SoundService::new(Box::new(player)),
            Err(e) => {
                error!("Invalid sound command, bells will only be logged: {}", e);
                SoundService::silent()
            }
        },
        None => {
            if config.music_command.is_some() {
                warn!("--music-command has no effect without --bell-command");
            }
            SoundService::silent()
        }
    };

    // Create application state
    let state = Arc::new(
        AppState::new(settings, sound, presets, history)?
            .with_server(config.host.clone(), config.port)
            .with_intensity(config.intensity),
    );

    // Background cue and recorder tasks
    let cues = spawn_sound_cues(state.engine(), Arc::clone(&state.sound));
    let recorder = spawn_workout_recorder(Arc::clone(&state));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start|pause|reset - Control the session");
    info!("  GET  /timer/status            - Current phase and countdown");
    info!("  GET|PUT /timer/settings       - Rounds and durations");
    info!("  GET|PUT /music                - Music settings");
    info!("  /presets, /history, /profile  - Workout library");
    info!("  GET  /status                  - Server status");
    info!("  GET  /health                  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    cues.abort();
    recorder.abort();

    info!("Server shutdown complete");
    Ok(())
}
