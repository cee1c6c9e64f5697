// ABOUTME: HTTP server lifecycle: bind, serve the application router and shut down gracefully
// ABOUTME: Stops accepting connections on Ctrl-C or SIGTERM and drains in-flight requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::routes::build_router;

/// Assistant HTTP server
pub struct AssistantServer {
    resources: Arc<ServerResources>,
}

impl AssistantServer {
    /// Create a server over shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Bind `address` and serve until a shutdown signal arrives
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound or serving fails
    pub async fn run(&self, address: &str) -> AppResult<()> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {address}: {e}")))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    ///
    /// # Errors
    /// Returns an error if serving fails
    pub async fn serve(&self, listener: TcpListener) -> AppResult<()> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| AppError::internal(format!("Transport error: {e}")))?;
        info!("HTTP server listening on http://{local_addr}");

        let app = build_router(&self.resources);
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Transport error: {e}")))?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}
