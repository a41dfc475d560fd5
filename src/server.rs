//! Listener: binds the chat port and spawns one session task per
//! accepted connection.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::registry::ClientRegistry;

pub struct Server {
    listener: TcpListener,
    registry: ClientRegistry,
    idle_timeout: Duration,
}

impl Server {
    /// Binds the listening socket. An unavailable port is the only
    /// startup failure.
    pub async fn bind(listen: &str, idle_timeout: Duration) -> Result<Self> {
        let listener = TcpListener::bind(listen)
            .await
            .with_context(|| format!("failed to bind {listen}"))?;

        Ok(Self {
            listener,
            registry: ClientRegistry::default(),
            idle_timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> Result<()> {
        info!(addr = %self.local_addr()?, "chat server listening");

        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "accept failed");
                    continue;
                }
            };

            let registry = self.registry.clone();
            let idle_timeout = self.idle_timeout;

            tokio::spawn(async move {
                if let Err(err) = crate::conn::handle(registry, socket, peer, idle_timeout).await {
                    warn!(%peer, error = %err, "connection error");
                }
            });
        }
    }
}
