use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chatter::config::Config;
use chatter::server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("chatter=info".parse()?))
        .init();

    let config = Config::parse();

    let server = Server::bind(&config.listen, config.idle_timeout()).await?;
    server.run().await
}
