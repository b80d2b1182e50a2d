use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::doc_store::SharedDocument;

/// Server-side identity of one connected client. Owned by its connection's routine.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    display_name: String,
    peer: SocketAddr,
    attached: Option<SharedDocument>,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The document edit/view commands implicitly target.
    pub fn attached(&self) -> Option<&SharedDocument> {
        self.attached.as_ref()
    }
}

/// Read-only view of an active session, for diagnostics.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSummary {
    pub id: Uuid,
    pub display_name: String,
    pub peer: String,
    pub connected_at: DateTime<Utc>,
    pub document: Option<String>,
}

#[derive(Debug)]
struct Entry {
    display_name: String,
    peer: SocketAddr,
    connected_at: DateTime<Utc>,
    attached: Option<SharedDocument>,
}

/// Active sessions plus the connected-session counter.
///
/// The registry lock is never held while a document lock is taken.
#[derive(Debug)]
pub struct SessionRegistry {
    active: Mutex<HashMap<Uuid, Entry>>,
    connected: AtomicUsize,
    next_display_name: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            connected: AtomicUsize::new(0),
            next_display_name: AtomicU64::new(1),
        }
    }

    pub fn register(&self, peer: SocketAddr) -> Session {
        let id = Uuid::new_v4();
        let display_name = self.next_display_name.fetch_add(1, Ordering::Relaxed).to_string();
        self.active.lock().insert(
            id,
            Entry {
                display_name: display_name.clone(),
                peer,
                connected_at: Utc::now(),
                attached: None,
            },
        );
        let connected = self.connected.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Session {} ({}) connected from {}, {} connected", display_name, id, peer, connected);
        Session {
            id,
            display_name,
            peer,
            attached: None,
        }
    }

    /// Moves `session` from its current document (if any) to `doc`.
    pub fn attach(&self, session: &mut Session, doc: SharedDocument) {
        if let Some(previous) = session.attached.take() {
            previous.lock().detach(session.id);
        }
        doc.lock().attach(session.id);
        if let Some(entry) = self.active.lock().get_mut(&session.id) {
            entry.attached = Some(doc.clone());
        }
        session.attached = Some(doc);
    }

    /// Drops the session's entry and its document attachment. Applied edits stay.
    pub fn deregister(&self, id: Uuid) {
        let Some(entry) = self.active.lock().remove(&id) else {
            return;
        };
        if let Some(doc) = entry.attached {
            doc.lock().detach(id);
        }
        let connected = self.connected.fetch_sub(1, Ordering::SeqCst) - 1;
        info!("Session {} ({}) disconnected, {} connected", entry.display_name, id, connected);
    }

    pub fn connected_count(&self) -> usize {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        let entries: Vec<_> = self
            .active
            .lock()
            .iter()
            .map(|(id, entry)| {
                (
                    *id,
                    entry.display_name.clone(),
                    entry.peer,
                    entry.connected_at,
                    entry.attached.clone(),
                )
            })
            .collect();

        let mut summaries: Vec<SessionSummary> = entries
            .into_iter()
            .map(|(id, display_name, peer, connected_at, attached)| SessionSummary {
                id,
                display_name,
                peer: peer.to_string(),
                connected_at,
                document: attached.map(|doc| doc.lock().name().to_string()),
            })
            .collect();
        summaries.sort_by_key(|summary| summary.connected_at);
        summaries
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
