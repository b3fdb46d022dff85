//! Teamroom real-time chat and notification server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin teamroom-server
//! cargo run --bin teamroom-server -- --host 0.0.0.0 --port 3000 --directory directory.json
//! ```

use std::sync::Arc;

use clap::Parser;
use teamroom_server::{
    app::build_app_state, config::ServerConfig, infrastructure::directory::InMemoryDirectory,
    ui::Server,
};
use teamroom_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "teamroom-server")]
#[command(about = "Real-time project chat and notification server", long_about = None)]
struct Args {
    #[command(flatten)]
    config: ServerConfig,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = args.config;

    // Membership and user directory (external collaborators)
    let directory = match &config.directory {
        Some(path) => match InMemoryDirectory::load(path).await {
            Ok(directory) => directory,
            Err(e) => {
                tracing::error!("Failed to load directory: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No directory file given; membership and usernames are empty");
            InMemoryDirectory::new()
        }
    };
    if config.enforce_membership {
        tracing::info!("Project membership is enforced");
    }

    let state = build_app_state(&config, Arc::new(directory));
    let server = Server::new(state);
    if let Err(e) = server.run(config.host.clone(), config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
