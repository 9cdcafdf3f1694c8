//! HTTP surface of the Azalea Air booking site.
//!
//! # Responsibility
//! - Route JSON and CSV endpoints onto `azalea_core` use-cases.
//! - Own process lifecycle: bind, serve, graceful shutdown.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ServerError};
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use handlers::boarding_pass::get_boarding_pass;
use handlers::flight::get_flight_config;
use handlers::health::health;
use handlers::rsvp::{create_rsvp, download_manifest, list_rsvps, rsvp_summary};
use log::{error, info};
use tokio::net::TcpListener;
use tokio::signal;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/rsvp", post(create_rsvp).get(list_rsvps))
        .route("/api/rsvp/summary", get(rsvp_summary))
        .route("/api/rsvp/download", get(download_manifest))
        .route("/api/flight-config", get(get_flight_config))
        .route("/api/boarding-pass/:id", get(get_boarding_pass))
        .route("/api/health", get(health))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(state)
}

/// Loads state from `config.db_path` and serves until a shutdown signal.
pub async fn run(config: &ServerConfig) -> Result<(), ServerError> {
    let db_path = config.db_path.clone();
    let state = tokio::task::spawn_blocking(move || AppState::load(db_path))
        .await
        .map_err(|err| ServerError::Io(std::io::Error::other(err)))??;

    if state.flight().is_none() {
        info!(
            "event=server_start module=server status=degraded reason=flight_not_configured hint=\"run azalea configure --set-date YYYY-MM-DD\""
        );
    }

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!(
        "event=server_start module=server status=ok address={address} db_path={}",
        config.db_path.display()
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
        info!("event=shutdown_signal module=server status=ok signal=ctrl_c");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown_signal module=server status=ok signal=terminate");
            }
            Err(err) => {
                error!("event=signal_install module=server status=error signal=terminate error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
