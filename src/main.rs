//! ATG Workout - A state-managed HTTP server that tracks a workout routine
//!
//! This is the main entry point for the atg-workout application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use atg_workout::{
    api::create_router,
    catalog::Routine,
    config::Config,
    persistence::FileStore,
    state::{now_millis, AppState, WorkoutSession},
    tasks::elapsed_ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("atg_workout={},tower_http=info", config.log_level()))
        .init();

    info!("Starting atg-workout server v{}", env!("CARGO_PKG_VERSION"));

    let routine = match &config.routine {
        Some(path) => Routine::load(path)?,
        None => Routine::builtin()?,
    };
    let data_dir = config.resolve_data_dir()?;
    let store = FileStore::new(&data_dir);
    info!(
        "Configuration: host={}, port={}, routine='{}' ({} exercises), state={}",
        config.host,
        config.port,
        routine.title,
        routine.len(),
        store.path().display()
    );

    // Restore or start the session
    let session = WorkoutSession::initialize(Arc::new(routine), Box::new(store), now_millis())?;
    let state = Arc::new(AppState::new(session, config.port, config.host.clone()));

    // Start the elapsed time ticker
    let ticker = tokio::spawn(elapsed_ticker_task(Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /status                     - Progress and elapsed time");
    info!("  GET  /routine                    - Exercises with session state");
    info!("  POST /exercises/:id/complete     - Complete an exercise");
    info!("  POST /exercises/:id/skip         - Skip a skippable exercise");
    info!("  POST /exercises/:id/timer/start  - Start an exercise countdown");
    info!("  POST /exercises/:id/timer/pause  - Pause an exercise countdown");
    info!("  POST /pause                      - Toggle workout pause");
    info!("  POST /reset                      - Reset progress ({{\"confirm\": true}})");
    info!("  GET  /health                     - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Tear down ticks so nothing mutates state after shutdown
    ticker.abort();
    state.shutdown();

    info!("Server shutdown complete");
    Ok(())
}
