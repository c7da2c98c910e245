//! Tomato Timer - A Pomodoro session timer service
//!
//! This is the main entry point for the tomato-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tomato_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    services::{Backend, HttpBackend, MemoryBackend},
    tasks::{session_notifier_task, session_ticker_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tomato_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tomato-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, backend={}",
          config.host, config.port, config.backend_url.as_deref().unwrap_or("in-memory"));

    let fallback_settings = config.timer_settings();
    let backend: Arc<dyn Backend> = match &config.backend_url {
        Some(url) => Arc::new(HttpBackend::new(url.clone())),
        None => Arc::new(MemoryBackend::new(fallback_settings.clone())),
    };

    // Create application state and load settings once
    let state = Arc::new(AppState::new(config.port, config.host.clone(), fallback_settings, backend));
    if let Err(e) = state.load_settings().await {
        tracing::error!("Failed to apply loaded settings: {}", e);
    }

    // Start the background tasks
    let ticker = tokio::spawn(session_ticker_task(Arc::clone(&state)));
    let notifier = tokio::spawn(session_notifier_task(Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timer                      - Timer status");
    info!("  POST /timer/start|pause|reset    - Control the countdown");
    info!("  POST /timer/skip                 - Finish the current session");
    info!("  POST /timer/session/:type        - Switch to focus, shortBreak or longBreak");
    info!("  GET  /settings, PUT /settings    - Read or replace timer settings");
    info!("  GET  /tasks, POST /tasks         - List or create tasks");
    info!("  POST /tasks/:id/select           - Put a task on the timer");
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

    // Drop the pending tick schedule
    ticker.abort();
    notifier.abort();

    info!("Server shutdown complete");
    Ok(())
}
