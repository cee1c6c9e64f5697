// ABOUTME: Per-session state storage and per-session turn serialization
// ABOUTME: Keeps conversation history and detected location in a bounded in-memory LRU store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sessions
//!
//! A session is identified by an opaque key carried in a signed cookie. Its
//! state lives in a [`SessionStore`]; the default store is an in-memory LRU so
//! abandoned sessions cannot grow memory without bound.
//!
//! Turns of the same session must not interleave, otherwise two concurrent
//! turns could both read the same history and one append would be lost.
//! [`SessionLocks`] hands out one async mutex per active session key.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::chat::ConversationHistory;
use crate::errors::AppResult;
use crate::external::DetectedLocation;

/// State remembered between requests of one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Conversation history, system message first
    #[serde(default)]
    pub history: ConversationHistory,
    /// Detected city
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Detected country
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Detected timezone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl SessionState {
    /// Record the known parts of a detected location
    pub fn set_location(&mut self, location: &DetectedLocation) {
        if location.city.is_some() {
            self.city.clone_from(&location.city);
        }
        if location.country.is_some() {
            self.country.clone_from(&location.country);
        }
        if location.timezone.is_some() {
            self.timezone.clone_from(&location.timezone);
        }
    }
}

/// Storage for session state
///
/// # Errors
/// Implementations backed by external storage report failures as `AppError`
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// State for `key`, or `None` for an unknown session
    async fn get(&self, key: &str) -> AppResult<Option<SessionState>>;

    /// Replace the state for `key`
    async fn set(&self, key: &str, state: SessionState) -> AppResult<()>;

    /// Forget `key`
    async fn remove(&self, key: &str) -> AppResult<()>;
}

/// In-memory session store with least-recently-used eviction
pub struct InMemorySessionStore {
    sessions: Mutex<LruCache<String, SessionState>>,
}

impl InMemorySessionStore {
    /// Create a store keeping at most `capacity` sessions
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of sessions currently held
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no session is held
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> AppResult<Option<SessionState>> {
        Ok(self.sessions.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, state: SessionState) -> AppResult<()> {
        self.sessions.lock().await.put(key.to_owned(), state);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.sessions.lock().await.pop(key);
        Ok(())
    }
}

/// One async mutex per active session key
#[derive(Default)]
pub struct SessionLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    /// Create an empty lock table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other turn of `key` is running and claim the session
    pub async fn acquire(&self, key: &str) -> SessionTurnGuard<'_> {
        let lock = Arc::clone(self.locks.entry(key.to_owned()).or_default().value());
        let guard = lock.lock_owned().await;
        SessionTurnGuard {
            locks: self,
            key: key.to_owned(),
            guard: Some(guard),
        }
    }

    /// Number of keys with a live lock entry
    #[must_use]
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive claim on one session, released on drop
pub struct SessionTurnGuard<'a> {
    locks: &'a SessionLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionTurnGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Entries with waiters are still referenced and stay in the table
        self.locks
            .locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
