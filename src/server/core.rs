use axum::Router;
use log::{info, warn};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::{ServerConfig, prepare_root};
use crate::error::FileManagerError;
use crate::server::handlers::AppState;
use crate::server::routes::build_router;
use crate::storage::{FileOps, PathResolver};

pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Prepare the sandbox root, build the router and bind the listener.
    pub async fn new(config: ServerConfig) -> Result<Self, FileManagerError> {
        let root = prepare_root(&config.root_path())?;
        info!("Sandbox root directory: {}", root.display());

        let static_dir = config.static_path();
        if !static_dir.is_dir() {
            warn!(
                "Static UI directory {} not found; only the API will be served",
                static_dir.display()
            );
        }

        let ops = FileOps::new(PathResolver::new(root));
        let router = build_router(AppState::new(ops), &static_dir, config.max_upload_bytes());

        let addr = config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| FileManagerError::Bind(addr.clone(), e))?;
        info!("Server bound to {}", addr);

        Ok(Self { listener, router })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve requests until Ctrl-C.
    pub async fn start(self) -> Result<(), FileManagerError> {
        info!("Starting file manager on {}", self.local_addr()?);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
