use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// docvault HTTP server.
pub struct DocvaultServer {
    config: ServerConfig,
}

impl DocvaultServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router over fresh state (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(self.config.clone()).shared())
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        if self.config.admin_token.is_empty() {
            tracing::warn!("admin_token is empty; registration is disabled");
        }
        let bind_addr = self.config.bind_addr;
        let app = build_router(AppState::new(self.config).shared());
        let listener = TcpListener::bind(bind_addr).await?;
        tracing::info!("docvault listening on {bind_addr}");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = DocvaultServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn router_builds() {
        let server = DocvaultServer::new(ServerConfig::default());
        let _router = server.router();
    }
}
