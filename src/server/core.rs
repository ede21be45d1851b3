//! Server core
//!
//! Builds the shared state and router, binds the listener and serves requests
//! until a shutdown signal arrives.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{ServerConfig, SessionBackend};
use crate::error::WebError;
use crate::middleware::logging::log_requests;
use crate::server::handlers;
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};
use crate::storage::StorageLocator;

/// Session records live beside the `user_*` roots under the storage root
const SESSION_DIR: &str = ".sessions";

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub locator: Arc<StorageLocator>,
    pub sessions: Arc<dyn SessionStore>,
}

pub struct Server {
    state: AppState,
}

impl Server {
    /// Creates a server with the session store named by `session_backend`
    pub async fn new(config: ServerConfig) -> Result<Self, WebError> {
        let sessions: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::File => {
                let dir = std::path::absolute(config.storage_root_path())?.join(SESSION_DIR);
                let store = FileSessionStore::open(&dir).map_err(|e| {
                    error!("Failed to open session directory {}: {}", dir.display(), e);
                    e
                })?;
                info!("Session directory: {}", dir.display());
                Arc::new(store)
            }
            SessionBackend::Memory => {
                warn!("In-memory sessions: identities are forgotten on restart");
                Arc::new(MemorySessionStore::new())
            }
        };
        Self::with_session_store(config, sessions).await
    }

    pub async fn with_session_store(
        config: ServerConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, WebError> {
        let base = std::path::absolute(config.storage_root_path())?;
        let locator = StorageLocator::new(base);

        if let Err(e) = locator.ensure_base().await {
            error!("Failed to create storage root {}: {}", locator.base().display(), e);
            return Err(e.into());
        }
        info!("Storage root directory: {}", locator.base().display());

        if !config.confine_paths {
            warn!("Path confinement disabled: client paths are not checked against their storage root");
        }

        Ok(Self {
            state: AppState {
                config: Arc::new(config),
                locator: Arc::new(locator),
                sessions,
            },
        })
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn start(self) -> Result<(), WebError> {
        let socket = self.state.config.listen_socket();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };

        info!("Access your files at: http://localhost:{}", self.state.config.port);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Wires every route onto the shared state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/favicon.ico", get(handlers::favicon))
        .route("/user/{user_id}", get(handlers::recover_session))
        .route("/admin", get(handlers::admin))
        .route("/upload", post(handlers::upload))
        .route("/download/{*filepath}", get(handlers::download))
        .route("/delete/{*filepath}", get(handlers::delete))
        .route("/create-folder", post(handlers::create_folder))
        .route("/{*folder_path}", get(handlers::browse))
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
