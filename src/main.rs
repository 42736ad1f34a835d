//! File manager server - Entry Point
//!
//! Serves a sandboxed directory tree over HTTP.

use env_logger::Env;
use log::{error, info};

use file_manager::Server;
use file_manager::config::ServerConfig;
use file_manager::error::FileManagerError;

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Launching file manager...");

    if let Err(e) = run().await {
        error!("Server startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), FileManagerError> {
    let config = ServerConfig::load()?;
    let server = Server::new(config).await?;
    server.start().await
}
