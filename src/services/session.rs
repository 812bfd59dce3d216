use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{ChatMessage, Place},
    services::answer::welcome_message,
};

/// Per-visitor conversation state
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every read or update through the store
    pub last_active: DateTime<Utc>,
    pub history: Vec<ChatMessage>,
    pub last_recommendations: Vec<Place>,
}

impl ChatSession {
    /// Starts with the welcome message as the first bot turn
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active: now,
            history: vec![ChatMessage::bot(welcome_message())],
            last_recommendations: Vec::new(),
        }
    }

    pub fn push_exchange(&mut self, question: impl Into<String>, reply: impl Into<String>) {
        self.history.push(ChatMessage::user(question));
        self.history.push(ChatMessage::bot(reply));
    }

    pub fn recommended(&self, name: &str) -> Option<&Place> {
        self.last_recommendations.iter().find(|place| place.name == name)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 30;

/// In-memory sessions keyed by id
///
/// A session untouched for longer than the idle timeout counts as ended: lookups
/// treat it as missing and the next `create` sweeps it out of the map.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, ChatSession>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    fn is_expired(&self, session: &ChatSession, now: DateTime<Utc>) -> bool {
        now - session.last_active > self.idle_timeout
    }

    pub async fn create(&self) -> ChatSession {
        let session = ChatSession::new();
        let mut sessions = self.inner.write().await;

        let before = sessions.len();
        sessions.retain(|_, existing| !self.is_expired(existing, session.created_at));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, "Idle sessions discarded");
        }

        sessions.insert(session.id, session.clone());
        tracing::info!(session_id = %session.id, "Session created");
        session
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ChatSession> {
        self.update(id, |session| session.clone()).await
    }

    /// Applies `f` to the session under the write lock and marks it active
    pub async fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut ChatSession) -> T) -> AppResult<T> {
        let now = Utc::now();
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(&id)
            .filter(|session| !self.is_expired(session, now))
            .ok_or(AppError::SessionNotFound(id))?;
        session.last_active = now;
        Ok(f(session))
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        match self.inner.write().await.remove(&id) {
            Some(_) => {
                tracing::info!(session_id = %id, "Session discarded");
                Ok(())
            }
            None => Err(AppError::SessionNotFound(id)),
        }
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.len()
    }
}
