//! In-memory session store
//!
//! Each session sits behind its own async mutex, so at most one utterance
//! per session is in flight while different sessions proceed independently.
//! Idle sessions are dropped after the configured TTL.

use super::session::ConversationSession;
use crate::config::ChatConfig;
use crate::error::{QuoteBotError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::Instant;
use uuid::Uuid;

/// Exclusive handle on one session; released on drop
pub type SessionGuard = OwnedMutexGuard<ConversationSession>;

struct SessionSlot {
    session: Arc<AsyncMutex<ConversationSession>>,
    last_used: Instant,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            session: Arc::new(AsyncMutex::new(ConversationSession::new())),
            last_used: Instant::now(),
        }
    }

    fn is_idle_for(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_used) > ttl
    }
}

pub struct SessionStore {
    slots: Mutex<HashMap<String, SessionSlot>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(Duration::from_secs(config.session_ttl_secs))
    }

    fn slots(&self) -> Result<MutexGuard<'_, HashMap<String, SessionSlot>>> {
        self.slots
            .lock()
            .map_err(|e| QuoteBotError::Other(anyhow::anyhow!("session lock poisoned: {}", e)))
    }

    /// Start an empty session and return its id
    pub fn create(&self) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.slots()?.insert(id.clone(), SessionSlot::new());
        tracing::debug!(session = %id, "Created session");
        Ok(id)
    }

    /// Id of a live session: `requested` if it exists and has not expired,
    /// otherwise a freshly created one.
    pub fn resolve(&self, requested: Option<&str>) -> Result<String> {
        if let Some(id) = requested {
            let mut slots = self.slots()?;
            let now = Instant::now();
            match slots.get(id) {
                Some(slot) if !slot.is_idle_for(self.ttl, now) => return Ok(id.to_string()),
                Some(_) => {
                    slots.remove(id);
                    tracing::debug!(session = %id, "Session expired");
                }
                None => {}
            }
        }
        self.create()
    }

    /// Wait for exclusive access to a session.
    pub async fn checkout(&self, id: &str) -> Result<SessionGuard> {
        let session = {
            let mut slots = self.slots()?;
            let slot = slots
                .get_mut(id)
                .ok_or_else(|| QuoteBotError::SessionNotFound(id.to_string()))?;
            slot.last_used = Instant::now();
            Arc::clone(&slot.session)
        };
        Ok(session.lock_owned().await)
    }

    /// Copy of a session's current state
    pub async fn snapshot(&self, id: &str) -> Result<ConversationSession> {
        let guard = self.checkout(id).await?;
        Ok(guard.clone())
    }

    /// Clear a session's history. Returns false when the id is unknown.
    pub async fn reset(&self, id: &str) -> Result<bool> {
        match self.checkout(id).await {
            Ok(mut guard) => {
                guard.reset();
                tracing::debug!(session = %id, "Reset session");
                Ok(true)
            }
            Err(QuoteBotError::SessionNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Drop sessions idle longer than the TTL. Sessions with an utterance in
    /// flight are kept.
    pub fn expire_idle(&self) -> Result<usize> {
        let now = Instant::now();
        let mut slots = self.slots()?;
        let before = slots.len();
        slots.retain(|_, slot| {
            !slot.is_idle_for(self.ttl, now) || slot.session.try_lock().is_err()
        });
        let expired = before - slots.len();
        if expired > 0 {
            tracing::debug!(expired, "Expired idle sessions");
        }
        Ok(expired)
    }

    pub fn len(&self) -> usize {
        self.slots().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Turn;

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_create_and_resolve() {
        let store = store();
        let id = store.create().unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(store.resolve(Some(&id)).unwrap(), id);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_gets_new_session() {
        let store = store();
        let id = store.resolve(Some("nope")).unwrap();
        assert_ne!(id, "nope");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_unknown_is_not_found() {
        let store = store();
        let err = store.checkout("missing").await.unwrap_err();
        assert!(matches!(err, QuoteBotError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_mutation_visible_in_snapshot() {
        let store = store();
        let id = store.create().unwrap();
        {
            let mut guard = store.checkout(&id).await.unwrap();
            guard.commit(Turn::new("q", "a", Arc::from(Vec::new())));
        }
        assert_eq!(store.snapshot(&id).await.unwrap().len(), 1);

        assert!(store.reset(&id).await.unwrap());
        assert!(store.snapshot(&id).await.unwrap().is_empty());
        assert!(!store.reset("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_one_holder_per_session() {
        let store = store();
        let a = store.create().unwrap();
        let b = store.create().unwrap();

        let _held = store.checkout(&a).await.unwrap();
        // Other sessions are unaffected
        let other = tokio::time::timeout(Duration::from_millis(50), store.checkout(&b)).await;
        assert!(other.is_ok());
        // The same session waits
        let same = tokio::time::timeout(Duration::from_millis(50), store.checkout(&a)).await;
        assert!(same.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let store = store();
        let id = store.create().unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(store.expire_idle().unwrap(), 0);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(store.expire_idle().unwrap(), 1);
        assert!(store.is_empty());
        assert_ne!(store.resolve(Some(&id)).unwrap(), id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_session_survives_expiry() {
        let store = store();
        let id = store.create().unwrap();
        let _guard = store.checkout(&id).await.unwrap();

        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(store.expire_idle().unwrap(), 0);
        assert_eq!(store.len(), 1);
    }
}
