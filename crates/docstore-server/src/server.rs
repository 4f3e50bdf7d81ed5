use std::sync::Arc;

use docstore_core::{
    ContentStore, DocumentService, FsContentStore, InMemoryRegistry, LocationRegistry,
    LogRegistry, SyncMode,
};
use tokio::net::TcpListener;

use crate::config::{RegistryBackend, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Wire the configured registry and a filesystem content store together.
pub fn build_service(config: &ServerConfig) -> ServerResult<DocumentService> {
    let registry: Arc<dyn LocationRegistry> = match config.registry {
        RegistryBackend::Memory => Arc::new(InMemoryRegistry::new()),
        RegistryBackend::Log => {
            let sync_mode = if config.sync_writes {
                SyncMode::EveryWrite
            } else {
                SyncMode::OsDefault
            };
            Arc::new(LogRegistry::open(&config.registry_path(), sync_mode)?)
        }
    };
    let content: Arc<dyn ContentStore> = Arc::new(FsContentStore::new(&config.root_dir)?);
    Ok(DocumentService::new(registry, content))
}

/// docstore HTTP server.
pub struct DocstoreServer {
    config: ServerConfig,
    service: Arc<DocumentService>,
}

impl DocstoreServer {
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let service = Arc::new(build_service(&config)?);
        Ok(Self { config, service })
    }

    /// Serve an already-built service, e.g. an in-memory one.
    pub fn with_service(config: ServerConfig, service: Arc<DocumentService>) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn service(&self) -> &Arc<DocumentService> {
        &self.service
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        let state = AppState::new(Arc::clone(&self.service), self.config.max_upload_label());
        build_router(state, self.config.max_upload_size)
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            bind_addr = %self.config.bind_addr,
            root_dir = %self.config.root_dir.display(),
            registry = ?self.config.registry,
            "docstore server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
