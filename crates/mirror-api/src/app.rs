//! Application lifecycle: binds both listeners, serves, and shuts down.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use mirror_core::config::AppConfig;
use mirror_core::error::{AppError, ErrorKind};

use crate::net;
use crate::router::{build_relay_router, build_static_router};
use crate::state::AppState;

/// Both servers, running in the background.
#[derive(Debug)]
pub struct RunningServer {
    /// Shared state, including the relay engine.
    pub state: AppState,
    /// Bound relay address.
    pub relay_addr: SocketAddr,
    /// Bound static file address, if the file server is enabled.
    pub http_addr: Option<SocketAddr>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<Result<(), AppError>>>,
}

/// Binds the relay listener and, if enabled, the static file listener,
/// then serves both in background tasks.
pub async fn start_server(config: AppConfig) -> Result<RunningServer, AppError> {
    let relay_listener = bind(&config.server.relay_addr()).await?;
    let relay_addr = relay_listener.local_addr()?;

    let static_listener = if config.static_files.enabled {
        Some(bind(&config.server.http_addr()).await?)
    } else {
        None
    };
    let http_addr = match &static_listener {
        Some(listener) => Some(listener.local_addr()?),
        None => None,
    };

    let state = AppState::new(config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = Vec::with_capacity(2);

    let relay_app = build_relay_router(state.clone());
    let relay_shutdown = shutdown_rx.clone();
    tasks.push(tokio::spawn(async move {
        axum::serve(relay_listener, relay_app)
            .with_graceful_shutdown(wait_for_shutdown(relay_shutdown))
            .await
            .map_err(|e| AppError::internal(format!("Relay server error: {e}")))
    }));

    if let Some(listener) = static_listener {
        let static_app = build_static_router(&state.config.static_files);
        let static_shutdown = shutdown_rx;
        tasks.push(tokio::spawn(async move {
            axum::serve(listener, static_app)
                .with_graceful_shutdown(wait_for_shutdown(static_shutdown))
                .await
                .map_err(|e| AppError::internal(format!("Static file server error: {e}")))
        }));
    }

    Ok(RunningServer {
        state,
        relay_addr,
        http_addr,
        shutdown_tx,
        tasks,
    })
}

impl RunningServer {
    /// Logs where the relay and file server can be reached.
    pub fn log_banner(&self) {
        let host = net::display_host(&self.state.config.server.bind_address);
        let ws_path = &self.state.config.relay.ws_path;

        tracing::info!(
            "Relay listening on ws://{}:{}{}",
            host,
            self.relay_addr.port(),
            ws_path
        );
        match self.http_addr {
            Some(addr) => tracing::info!(
                "Serving '{}' on http://{}:{}",
                self.state.config.static_files.root,
                host,
                addr.port()
            ),
            None => tracing::info!("Static file server disabled"),
        }
    }

    /// Closes every session, then stops both servers.
    ///
    /// Returns `true` if all sessions closed within the grace period.
    pub async fn shutdown(self) -> Result<bool, AppError> {
        let grace = Duration::from_secs(self.state.config.server.shutdown_grace_seconds);
        let clean = self.state.engine.shutdown(grace).await;

        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            task.await
                .map_err(|e| AppError::internal(format!("Server task failed: {e}")))??;
        }

        tracing::info!("Mirror relay shut down");
        Ok(clean)
    }
}

/// Runs the relay until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting mirror relay v{}", env!("CARGO_PKG_VERSION"));

    let server = start_server(config).await?;
    server.log_banner();

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    if !server.shutdown().await? {
        tracing::warn!("Some sessions did not close within the grace period");
    }
    Ok(())
}

async fn bind(addr: &str) -> Result<TcpListener, AppError> {
    TcpListener::bind(addr).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Io,
            format!("Failed to bind {addr}: {e}"),
            e,
        )
    })
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
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
