//! Web File Manager - Entry Point

use env_logger::Env;
use log::{error, info};
use std::process;

use web_file_manager::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting Web File Manager...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        error!("Server terminated: {}", e);
        process::exit(1);
    }
}
