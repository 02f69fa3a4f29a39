/*
 * Responsibility
 * - Entry point for the (external) login flow once the provider round-trip is done
 * - Claim mapping → publish to the session cache, exactly once per login
 * - Logout / session teardown
 */
use std::sync::Arc;

use super::assertion::IdentityAssertion;
use super::authority::AuthoritySet;
use super::claim_mapper::ClaimMapper;
use super::session_cache::{SessionAuthorityCache, SessionId};

#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub session_id: SessionId,
    pub authorities: Arc<AuthoritySet>,
}

#[derive(Clone)]
pub struct LoginService {
    mapper: ClaimMapper,
    sessions: Arc<dyn SessionAuthorityCache>,
}

impl std::fmt::Debug for LoginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginService")
            .field("mapper", &self.mapper)
            .finish_non_exhaustive()
    }
}

impl LoginService {
    pub fn new(mapper: ClaimMapper, sessions: Arc<dyn SessionAuthorityCache>) -> Self {
        Self { mapper, sessions }
    }

    /// Derives the authority set for a fresh login and publishes it under a
    /// new session id.
    ///
    /// `granted` is what the provider exchange already yielded (granted scopes
    /// and the like); it is kept as-is and claim-derived authorities are added.
    pub fn complete_login(
        &self,
        assertion: &IdentityAssertion,
        granted: &AuthoritySet,
    ) -> EstablishedSession {
        self.complete_login_for(SessionId::generate(), assertion, granted)
    }

    /// Same as [`complete_login`](Self::complete_login) for a session id the
    /// caller already minted (re-login on an existing session).
    pub fn complete_login_for(
        &self,
        session_id: SessionId,
        assertion: &IdentityAssertion,
        granted: &AuthoritySet,
    ) -> EstablishedSession {
        let authorities = self.mapper.map_with_granted(granted, assertion);
        tracing::debug!(%session_id, %authorities, "login authorities derived");

        let authorities = self.sessions.put(session_id, authorities);
        EstablishedSession {
            session_id,
            authorities,
        }
    }

    pub fn logout(&self, session_id: &SessionId) -> bool {
        let removed = self.sessions.invalidate(session_id);
        tracing::debug!(%session_id, removed, "session invalidated");
        removed
    }

    pub fn sessions(&self) -> &Arc<dyn SessionAuthorityCache> {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::authz::assertion::{ClaimValue, TokenAssertion};
    use crate::services::authz::session_cache::InMemorySessionCache;

    #[test]
    fn login_publishes_mapped_authorities() {
        let cache = Arc::new(InMemorySessionCache::new());
        let login = LoginService::new(ClaimMapper::new(), cache.clone());

        let assertion: IdentityAssertion = TokenAssertion::new()
            .with_claim("email_verified", ClaimValue::Bool(true))
            .into();
        let granted: AuthoritySet = ["SCOPE_openid"].into_iter().collect();

        let session = login.complete_login(&assertion, &granted);
        let cached = cache.get(&session.session_id).unwrap();

        assert_eq!(cached, session.authorities);
        assert!(cached.contains("SCOPE_openid"));
        assert!(cached.contains("VerifiedUser"));
    }

    #[test]
    fn logout_removes_session() {
        let cache = Arc::new(InMemorySessionCache::new());
        let login = LoginService::new(ClaimMapper::new(), cache.clone());

        let assertion: IdentityAssertion = TokenAssertion::new().into();
        let session = login.complete_login(&assertion, &AuthoritySet::new());

        assert!(cache.get(&session.session_id).is_some());
        assert!(login.logout(&session.session_id));
        assert!(cache.get(&session.session_id).is_none());
    }

    #[test]
    fn relogin_recomputes() {
        let cache = Arc::new(InMemorySessionCache::new());
        let login = LoginService::new(ClaimMapper::new(), cache.clone());
        let id = SessionId::generate();

        let unverified: IdentityAssertion = TokenAssertion::new()
            .with_claim("email_verified", ClaimValue::Bool(false))
            .into();
        let verified: IdentityAssertion = TokenAssertion::new()
            .with_claim("email_verified", ClaimValue::Bool(true))
            .into();

        login.complete_login_for(id, &unverified, &AuthoritySet::new());
        assert!(cache.get(&id).unwrap().is_empty());

        login.complete_login_for(id, &verified, &AuthoritySet::new());
        assert!(cache.get(&id).unwrap().contains("VerifiedUser"));
    }
}
