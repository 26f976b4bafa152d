//! MCP session state for the HTTP transports.
//!
//! Each session remembers the caller's credential and the tool set that
//! credential may see, plus a ring buffer of SSE events so a client can
//! reconnect with `Last-Event-ID` and catch up.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::response::sse::Event;
use tokio::sync::{OnceCell, RwLock, broadcast};

use crate::gating;
use crate::tools::{ToolContext, ToolName};

/// Maximum number of events kept per session for replay.
const HISTORY_SIZE: usize = 100;

/// Idle time after which a session is dropped.
const SESSION_TIMEOUT: Duration = Duration::from_secs(3600);

/// How often stale sessions are swept.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// A buffered SSE event.
#[derive(Clone, Debug)]
pub struct BufferedEvent {
    /// Event ID, increasing per session.
    pub id: u64,
    /// SSE event name (`message`, `endpoint`).
    pub event_type: &'static str,
    /// JSON payload.
    pub data: String,
}

impl BufferedEvent {
    /// Convert to an axum SSE event.
    #[must_use]
    pub fn to_sse_event(&self) -> Event {
        Event::default().id(self.id.to_string()).event(self.event_type).data(self.data.clone())
    }
}

/// One MCP connection: a credential and the tools it may see.
pub struct McpConnection {
    /// Tool context carrying the connection's credential.
    pub ctx: ToolContext,
    tools: OnceCell<Vec<ToolName>>,
}

impl McpConnection {
    /// Create a connection; the visible tool set is resolved on first use.
    #[must_use]
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx, tools: OnceCell::new() }
    }

    /// Create a connection with a fixed tool set (no introspection).
    #[must_use]
    pub fn with_tools(ctx: ToolContext, tools: Vec<ToolName>) -> Self {
        Self { ctx, tools: OnceCell::from(tools) }
    }

    /// Tools this connection may list and call. Resolved once.
    pub async fn visible_tools(&self) -> &[ToolName] {
        self.tools.get_or_init(|| gating::resolve_tools(&self.ctx.client)).await
    }
}

impl std::fmt::Debug for McpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpConnection").field("tools", &self.tools.get().map(Vec::len)).finish()
    }
}

/// An HTTP MCP session.
pub struct Session {
    /// Session identifier (UUID v4).
    pub id: String,
    /// Fingerprint of the credential that opened the session.
    pub owner: String,
    /// Protocol state.
    pub connection: McpConnection,
    tx: broadcast::Sender<BufferedEvent>,
    history: RwLock<VecDeque<BufferedEvent>>,
    next_event_id: AtomicU64,
    last_active: RwLock<Instant>,
}

impl Session {
    /// Create a new session.
    #[must_use]
    pub fn new(id: String, owner: String, connection: McpConnection) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            id,
            owner,
            connection,
            tx,
            history: RwLock::new(VecDeque::with_capacity(HISTORY_SIZE)),
            next_event_id: AtomicU64::new(1),
            last_active: RwLock::new(Instant::now()),
        }
    }

    /// Store an event for replay and broadcast it to live subscribers.
    pub async fn push_event(&self, event_type: &'static str, data: impl Into<String>) -> u64 {
        let id = self.next_event_id.fetch_add(1, Ordering::SeqCst);
        let event = BufferedEvent { id, event_type, data: data.into() };

        {
            let mut history = self.history.write().await;
            if history.len() >= HISTORY_SIZE {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        // No subscribers is fine; the event stays in history.
        let _ = self.tx.send(event);
        self.touch().await;

        id
    }

    /// Events after the given ID, oldest first.
    pub async fn events_after(&self, last_event_id: u64) -> Vec<BufferedEvent> {
        self.history.read().await.iter().filter(|e| e.id > last_event_id).cloned().collect()
    }

    /// Subscribe to live events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BufferedEvent> {
        self.tx.subscribe()
    }

    async fn is_stale(&self) -> bool {
        self.last_active.read().await.elapsed() > SESSION_TIMEOUT
    }

    /// Mark the session as active.
    pub async fn touch(&self) {
        *self.last_active.write().await = Instant::now();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("next_event_id", &self.next_event_id.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// All live HTTP sessions.
#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
}

impl SessionManager {
    /// Create an empty session manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session for a connection.
    pub async fn create_session(&self, owner: String, connection: McpConnection) -> Arc<Session> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(id.clone(), owner, connection));
        self.sessions.write().await.insert(id, Arc::clone(&session));

        tracing::info!(session_id = %session.id, owner = %session.owner, "Created session");
        session
    }

    /// Look up a session and mark it active.
    pub async fn get_session(&self, id: &str) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(id).cloned()?;
        session.touch().await;
        Some(session)
    }

    /// Close a session.
    pub async fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Removed session");
        }
        removed
    }

    /// Drop sessions idle longer than the timeout.
    pub async fn cleanup_stale_sessions(&self) -> usize {
        let mut stale = Vec::new();
        for (id, session) in self.sessions.read().await.iter() {
            if session.is_stale().await {
                stale.push(id.clone());
            }
        }

        if !stale.is_empty() {
            let mut sessions = self.sessions.write().await;
            for id in &stale {
                sessions.remove(id);
                tracing::info!(session_id = %id, "Cleaned up stale session");
            }
        }

        stale.len()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Spawn the periodic cleanup task.
    pub fn start_cleanup_task(&self) {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                let cleaned = manager.cleanup_stale_sessions().await;
                if cleaned > 0 {
                    tracing::debug!(count = cleaned, "Session cleanup completed");
                }
            }
        });
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PerigonClient;
    use crate::config::Config;

    fn connection() -> McpConnection {
        let client = PerigonClient::new(&Config::for_testing("http://127.0.0.1:9")).unwrap();
        McpConnection::with_tools(ToolContext::new(client), vec![ToolName::SearchNewsArticles])
    }

    #[tokio::test]
    async fn test_session_creation_and_lookup() {
        let manager = SessionManager::new();
        let session = manager.create_session("abc".into(), connection()).await;

        assert!(!session.id.is_empty());
        assert_eq!(manager.session_count().await, 1);
        assert!(manager.get_session(&session.id).await.is_some());
        assert!(manager.get_session("nonexistent").await.is_none());
        assert!(manager.remove_session(&session.id).await);
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_event_replay() {
        let session = Session::new("s".into(), "abc".into(), connection());
        for n in 1..=3 {
            let id = session.push_event("message", format!(r#"{{"n": {n}}}"#)).await;
            assert_eq!(id, n);
        }

        let events = session.events_after(1).await;
        assert_eq!(events.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_ring_buffer_overflow() {
        let session = Session::new("s".into(), "abc".into(), connection());
        for i in 0..150 {
            session.push_event("message", format!(r#"{{"n": {i}}}"#)).await;
        }

        let events = session.events_after(0).await;
        assert_eq!(events.len(), HISTORY_SIZE);
        assert_eq!(events[0].id, 51);
    }

    #[tokio::test]
    async fn test_fixed_tool_set_skips_introspection() {
        let conn = connection();
        assert_eq!(conn.visible_tools().await, &[ToolName::SearchNewsArticles]);
    }
}
