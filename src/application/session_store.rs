//! In-memory registry of live conversation sessions.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::conversation::CampaignSession;

/// A session guarded so that one action at a time is applied to it.
pub type SessionHandle = Arc<Mutex<CampaignSession>>;

struct Entry {
    session: SessionHandle,
    in_flight: Arc<AtomicUsize>,
}

impl Entry {
    /// Busy while an action is being applied, even if the session lock is
    /// released for network work, or while a commit batch is outstanding.
    fn is_busy(&self) -> bool {
        if self.in_flight.load(Ordering::Acquire) > 0 {
            return true;
        }
        match self.session.try_lock() {
            Ok(session) => session.is_commit_in_flight(),
            Err(_) => true,
        }
    }
}

/// Marks a session as in use until dropped.
#[must_use = "the session counts as idle once the guard is dropped"]
pub struct InFlightGuard {
    counter: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Sessions keyed by id.
///
/// The map lock is only held to look a session up; work on a session holds
/// that session's own mutex instead.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: CampaignSession) -> SessionHandle {
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        let entry = Entry {
            session: handle.clone(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        };
        self.sessions.write().await.insert(id, entry);
        handle
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|entry| entry.session.clone())
    }

    /// Looks a session up and marks it in use for as long as the guard lives.
    ///
    /// The idle sweeper never evicts a checked-out session.
    pub async fn checkout(&self, id: Uuid) -> Option<(SessionHandle, InFlightGuard)> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id)?;
        entry.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlightGuard {
            counter: entry.in_flight.clone(),
        };
        Some((entry.session.clone(), guard))
    }

    /// Returns `true` if a session was removed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drops sessions untouched for longer than `max_idle`.
    ///
    /// Busy sessions are always kept: checked out, locked, or with a commit
    /// batch outstanding.
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, entry| {
            entry.is_busy()
                || entry
                    .session
                    .try_lock()
                    .is_ok_and(|session| session.updated_at() >= cutoff)
        });

        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{Effect, FlowSettings, Owner, Step, UserAction};

    fn session() -> CampaignSession {
        CampaignSession::new(
            Uuid::new_v4(),
            Owner {
                user_id: "u".to_string(),
                account_id: "a".to_string(),
            },
            FlowSettings::default(),
        )
    }

    fn committing_session() -> CampaignSession {
        let mut s = session();
        for action in [
            UserAction::Select("start".to_string()),
            UserAction::Select("new".to_string()),
            UserAction::Enter {
                text: "Spring".to_string(),
                label: None,
            },
            UserAction::Enter {
                text: "https://shop.example.com/".to_string(),
                label: None,
            },
            UserAction::Continue,
            UserAction::Select("google".to_string()),
            UserAction::Continue,
            UserAction::Select("cpc".to_string()),
            UserAction::Continue,
            UserAction::Skip,
            UserAction::Skip,
            UserAction::Skip,
        ] {
            s.handle(action);
        }
        assert_eq!(s.step(), &Step::Review);
        assert!(matches!(s.handle(UserAction::Commit), Effect::Commit { .. }));
        assert!(s.is_commit_in_flight());
        s
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let store = SessionStore::new();
        let handle = store.insert(session()).await;
        let id = handle.lock().await.id();

        assert!(store.get(id).await.is_some());
        assert_eq!(store.len().await, 1);
        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge_idle_keeps_busy_sessions() {
        let store = SessionStore::new();
        store.insert(session()).await;
        let busy = store.insert(session()).await;

        let _guard = busy.lock().await;
        // A negative idle window expires every session that is not busy.
        let purged = store.purge_idle(Duration::seconds(-60)).await;

        assert_eq!(purged, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_purge_idle_keeps_committing_session_with_lock_released() {
        let store = SessionStore::new();
        store.insert(committing_session()).await;

        let purged = store.purge_idle(Duration::seconds(-60)).await;

        assert_eq!(purged, 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_purge_idle_keeps_checked_out_session() {
        let store = SessionStore::new();
        let handle = store.insert(session()).await;
        let id = handle.lock().await.id();

        let (_, guard) = store.checkout(id).await.unwrap();
        assert_eq!(store.purge_idle(Duration::seconds(-60)).await, 0);

        drop(guard);
        assert_eq!(store.purge_idle(Duration::seconds(-60)).await, 1);
        assert!(store.checkout(id).await.is_none());
    }

    #[tokio::test]
    async fn test_purge_idle_nothing_expired() {
        let store = SessionStore::new();
        store.insert(session()).await;
        assert_eq!(store.purge_idle(Duration::hours(1)).await, 0);
    }
}
