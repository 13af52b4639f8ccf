//! Per-session memory for the analysis flow.
//!
//! Each browser session gets its own slot, keyed by the session cookie. The
//! resume text and analysis result are stored together as one snapshot and
//! replaced as a unit, so a follow-up never sees text from one run paired
//! with the result of another.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::analysis::mode::AnalysisMode;

/// The outcome of one analysis run, kept as context for follow-up questions.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSnapshot {
    pub resume_text: String,
    pub analysis: String,
    pub mode: AnalysisMode,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub snapshot: Option<AnalysisSnapshot>,
    pub last_seen: DateTime<Utc>,
}

impl SessionState {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            snapshot: None,
            last_seen: now,
        }
    }
}

/// Process-local store of every live session. Cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// The latest analysis for this session, if one has completed.
    pub async fn snapshot(&self, session_id: Uuid) -> Option<AnalysisSnapshot> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .and_then(|s| s.snapshot.clone())
    }

    /// Replaces the session's snapshot with the outcome of a new analysis run.
    /// Expired sessions are dropped on the way.
    pub async fn record_analysis(&self, session_id: Uuid, snapshot: AnalysisSnapshot) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let ttl = self.ttl;
        sessions.retain(|id, s| *id == session_id || now - s.last_seen <= ttl);

        let session = sessions
            .entry(session_id)
            .or_insert_with(|| SessionState::new(now));
        session.snapshot = Some(snapshot);
        session.last_seen = now;
    }

    /// Refreshes the idle timer without changing the snapshot.
    pub async fn touch(&self, session_id: Uuid) {
        if let Some(session) = self.sessions.write().await.get_mut(&session_id) {
            session.last_seen = Utc::now();
        }
    }

    /// Drops sessions idle for longer than the TTL. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_seen <= self.ttl);
        before - sessions.len()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
