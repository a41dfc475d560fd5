use std::time::Duration;

use clap::Parser;

/// Chat relay server. Clients register a unique screen name, then
/// every line they send is broadcast to all connected clients.
#[derive(Debug, Parser)]
#[command(name = "chatter", version, about)]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:9001")]
    pub listen: String,

    /// Seconds a client may stay silent before being kicked
    #[arg(long, default_value_t = 600)]
    pub idle_timeout_secs: u64,
}

impl Config {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}
