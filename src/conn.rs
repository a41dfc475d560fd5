//! Per-connection session handling.
//!
//! Each accepted socket runs [`handle`] in its own task. A session
//! moves through three phases: name negotiation, the active relay
//! loop, and teardown. Teardown is bound to the [`Membership`] guard,
//! so every exit path unregisters the client exactly once.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until, timeout};
use tracing::{debug, info, warn};

use crate::protocol::{self, Request};
use crate::registry::{ClientId, ClientRegistry};

/// Why an active session stopped reading.
enum Exit {
    Quit,
    Eof,
    Timeout,
}

/// Registry membership for one session. Dropping it releases the name
/// and sink, so the disconnect command, peer EOF, the idle timeout,
/// and I/O errors all converge on the same cleanup.
struct Membership {
    registry: ClientRegistry,
    id: ClientId,
    name: Option<String>,
}

impl Drop for Membership {
    fn drop(&mut self) {
        self.registry.remove_client(self.id, self.name.as_deref());
    }
}

pub async fn handle(
    registry: ClientRegistry,
    socket: TcpStream,
    peer: SocketAddr,
    idle_timeout: Duration,
) -> Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    // Declared after the socket halves so it drops before them: the
    // registry entries are gone by the time the peer sees the close.
    let mut membership = Membership {
        registry: registry.clone(),
        id: registry.next_id(),
        name: None,
    };

    // Name negotiation: prompt until the peer offers a name nobody
    // holds. EOF or silence before acceptance just closes the socket;
    // nothing has been registered yet.
    let name = loop {
        writer.write_all(protocol::SUBMIT_NAME.as_bytes()).await?;
        writer.write_all(b"\n").await?;

        let line = match timeout(idle_timeout, lines.next_line()).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) | Err(_) => {
                debug!(%peer, "gone before choosing a name");
                return Ok(());
            }
            Ok(Err(e)) => return Err(e.into()),
        };

        let candidate = line.trim();
        if candidate.is_empty() || candidate == protocol::SYSTEM_SENDER {
            continue;
        }
        if registry.try_register_name(candidate) {
            membership.name = Some(candidate.to_string());
            break candidate.to_string();
        }
        debug!(%peer, candidate, "name already taken");
    };

    writer.write_all(protocol::NAME_ACCEPTED.as_bytes()).await?;
    writer.write_all(b"\n").await?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.add_sink(membership.id, tx);
    info!(%peer, %name, clients = registry.len(), "client joined");
    registry.broadcast(&protocol::system_message(&format!(
        "{name} has joined the chatter."
    )));

    // Active loop: fan this client's lines out to everyone, relay
    // broadcasts from other sessions back to this peer, and kick the
    // peer once it has been silent past the idle deadline. Incoming
    // broadcasts do not count as activity.
    let mut deadline = Instant::now() + idle_timeout;
    let exit = loop {
        tokio::select! {
            outgoing = rx.recv() => {
                // The sender half stays in the registry until cleanup;
                // a closed channel means we were already removed.
                let Some(line) = outgoing else { break Exit::Eof };
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
            incoming = lines.next_line() => {
                match incoming {
                    Ok(Some(line)) => {
                        deadline = Instant::now() + idle_timeout;
                        match protocol::parse_request(&line) {
                            Request::Disconnect => break Exit::Quit,
                            Request::Chat(text) if text.is_empty() => {}
                            Request::Chat(text) => {
                                registry.broadcast(&protocol::message(&name, &text));
                            }
                        }
                    }
                    Ok(None) => break Exit::Eof,
                    Err(e) => {
                        warn!(%peer, %name, error = %e, "read failed");
                        break Exit::Eof;
                    }
                }
            }
            _ = sleep_until(deadline) => break Exit::Timeout,
        }
    };

    match exit {
        Exit::Quit => {
            info!(%peer, %name, "client disconnected");
            registry.broadcast(&protocol::system_message(&format!(
                "{name} has left the chatter."
            )));
        }
        Exit::Timeout => {
            info!(%peer, %name, "kicking idle client");
            registry.broadcast(&protocol::system_message(&format!(
                "{name} kicked off for inactivity."
            )));
        }
        Exit::Eof => {
            info!(%peer, %name, "client hung up");
        }
    }

    Ok(())
}
