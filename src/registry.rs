//! Shared registry of connected clients.
//!
//! The only mutable state shared between sessions: the set of claimed
//! display names and the map of active broadcast sinks. Every session
//! holds a clone of [`ClientRegistry`] and goes through it for all
//! cross-session effects.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{DashMap, DashSet};
use tokio::sync::mpsc;

/// Identifies one session for sink bookkeeping. Names cannot serve as
/// the key because a session may die before it ever owns one.
pub type ClientId = u64;

/// Send capability for one connected client. Sending never blocks; the
/// owning session drains the channel and writes to its own socket.
pub type Sink = mpsc::UnboundedSender<String>;

#[derive(Clone, Default)]
pub struct ClientRegistry {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    names: DashSet<String>,
    sinks: DashMap<ClientId, Sink>,
    next_id: AtomicU64,
}

impl ClientRegistry {
    pub fn next_id(&self) -> ClientId {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Claims `name` if nobody holds it. Check and insert are a single
    /// atomic step, so two sessions racing on the same name cannot
    /// both win. Names are case-sensitive.
    pub fn try_register_name(&self, name: &str) -> bool {
        self.inner.names.insert(name.to_string())
    }

    /// Registers a send capability; visible to subsequent broadcasts
    /// immediately.
    pub fn add_sink(&self, id: ClientId, sink: Sink) {
        self.inner.sinks.insert(id, sink);
    }

    /// Releases a session's name and sink. Idempotent: a second call
    /// for the same session is a no-op.
    pub fn remove_client(&self, id: ClientId, name: Option<&str>) {
        if let Some(name) = name {
            self.inner.names.remove(name);
        }
        self.inner.sinks.remove(&id);
    }

    /// Delivers `line` to every registered sink. A sink whose session
    /// is already gone fails to receive and is skipped; it unregisters
    /// itself on the way out.
    pub fn broadcast(&self, line: &str) {
        for entry in self.inner.sinks.iter() {
            let _ = entry.value().send(line.to_string());
        }
    }

    /// Number of active (named) clients.
    pub fn len(&self) -> usize {
        self.inner.sinks.len()
    }
}
