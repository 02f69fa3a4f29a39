//! Authority sets cached per authenticated session.
//!
//! Written once per login, read on every request, removed at logout or expiry.
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::authority::AuthoritySet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Session → authority set store.
///
/// Implementations must be safe for many concurrent readers overlapping with
/// writers, and a `put` must be visible to every `get` that starts after it
/// returns.
pub trait SessionAuthorityCache: Send + Sync {
    /// Publishes the set for a session. A re-login replaces the previous set.
    fn put(&self, session: SessionId, authorities: AuthoritySet) -> Arc<AuthoritySet>;

    /// `None` for unknown or expired sessions.
    fn get(&self, session: &SessionId) -> Option<Arc<AuthoritySet>>;

    /// Returns `true` when an entry was removed.
    fn invalidate(&self, session: &SessionId) -> bool;
}

#[derive(Debug)]
struct Entry {
    authorities: Arc<AuthoritySet>,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process cache on a sharded concurrent map.
///
/// Readers only take a shard read lock; the published `Arc` is never mutated.
#[derive(Debug, Default)]
pub struct InMemorySessionCache {
    entries: DashMap<SessionId, Entry>,
    ttl: Option<chrono::Duration>,
}

impl InMemorySessionCache {
    /// Sessions never expire on their own.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions expire `ttl` after login. A TTL too large for the clock is
    /// treated as no expiry.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: chrono::Duration::from_std(ttl).ok(),
        }
    }

    /// Drops expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionAuthorityCache for InMemorySessionCache {
    fn put(&self, session: SessionId, authorities: AuthoritySet) -> Arc<AuthoritySet> {
        let authorities = Arc::new(authorities);
        let expires_at = self.ttl.and_then(|ttl| Utc::now().checked_add_signed(ttl));
        self.entries.insert(
            session,
            Entry {
                authorities: Arc::clone(&authorities),
                expires_at,
            },
        );
        authorities
    }

    fn get(&self, session: &SessionId) -> Option<Arc<AuthoritySet>> {
        let now = Utc::now();
        {
            let entry = self.entries.get(session)?;
            if !entry.is_expired(now) {
                return Some(Arc::clone(&entry.authorities));
            }
        }
        // Re-check under the write lock so a concurrent re-login is not dropped.
        self.entries.remove_if(session, |_, entry| entry.is_expired(now));
        None
    }

    fn invalidate(&self, session: &SessionId) -> bool {
        self.entries.remove(session).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> AuthoritySet {
        names.iter().copied().collect()
    }

    #[test]
    fn put_get_invalidate() {
        let cache = InMemorySessionCache::new();
        let id = SessionId::generate();

        assert!(cache.get(&id).is_none());

        cache.put(id, set(&["SCOPE_openid"]));
        let got = cache.get(&id).unwrap();
        assert!(got.contains("SCOPE_openid"));

        assert!(cache.invalidate(&id));
        assert!(!cache.invalidate(&id));
        assert!(cache.get(&id).is_none());
    }

    #[test]
    fn relogin_replaces_the_set() {
        let cache = InMemorySessionCache::new();
        let id = SessionId::generate();

        cache.put(id, set(&["a"]));
        let old = cache.get(&id).unwrap();
        cache.put(id, set(&["b"]));

        // Readers holding the old set keep an unchanged snapshot.
        assert!(old.contains("a"));
        assert!(cache.get(&id).unwrap().contains("b"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let cache = InMemorySessionCache::with_ttl(Duration::ZERO);
        let id = SessionId::generate();
        cache.put(id, set(&["a"]));

        assert!(cache.get(&id).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn purge_removes_only_expired() {
        let expired = InMemorySessionCache::with_ttl(Duration::ZERO);
        expired.put(SessionId::generate(), set(&["a"]));
        expired.put(SessionId::generate(), set(&["b"]));
        assert_eq!(expired.purge_expired(), 2);

        let live = InMemorySessionCache::with_ttl(Duration::from_secs(3600));
        live.put(SessionId::generate(), set(&["a"]));
        assert_eq!(live.purge_expired(), 0);
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn session_id_parsing() {
        let id = SessionId::generate();
        assert_eq!(SessionId::parse(&id.to_string()), Some(id));
        assert_eq!(SessionId::parse("not-a-uuid"), None);
    }
}
