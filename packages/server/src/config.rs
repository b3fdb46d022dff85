//! Server configuration.
//!
//! Every option can be given on the command line or through a `TEAMROOM_*`
//! environment variable.

use std::{path::PathBuf, time::Duration};

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TEAMROOM_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TEAMROOM_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Capacity of each connection's outbound queue
    #[arg(long, env = "TEAMROOM_OUTBOUND_BUFFER", default_value_t = 256)]
    pub outbound_buffer: usize,

    /// Recipients notified concurrently by one fan-out
    #[arg(long, env = "TEAMROOM_FANOUT_CONCURRENCY", default_value_t = 16)]
    pub fanout_concurrency: usize,

    /// Time bound of a single notification push, in milliseconds
    #[arg(long, env = "TEAMROOM_PUSH_TIMEOUT_MS", default_value_t = 2000)]
    pub push_timeout_ms: u64,

    /// Maximum number of messages returned by a project listing
    #[arg(long, env = "TEAMROOM_MESSAGE_PAGE_SIZE", default_value_t = 200)]
    pub message_page_size: usize,

    /// Number of notifications returned by a listing
    #[arg(long, env = "TEAMROOM_NOTIFICATION_PAGE_SIZE", default_value_t = 20)]
    pub notification_page_size: usize,

    /// Reject joins, reads and sends by users who are not project members
    #[arg(long, env = "TEAMROOM_ENFORCE_MEMBERSHIP")]
    pub enforce_membership: bool,

    /// JSON file seeding users and project memberships
    #[arg(long, env = "TEAMROOM_DIRECTORY")]
    pub directory: Option<PathBuf>,
}

impl ServerConfig {
    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            outbound_buffer: 256,
            fanout_concurrency: 16,
            push_timeout_ms: 2000,
            message_page_size: 200,
            notification_page_size: 20,
            enforce_membership: false,
            directory: None,
        }
    }
}
