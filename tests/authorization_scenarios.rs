//! End-to-end login → cache → decision scenarios against the built-in policy.

use std::sync::Arc;
use std::thread;

use oidc_authz::services::authz::{
    AuthorizationEngine, AuthoritySet, ClaimMapper, ClaimValue, Decision, DispatchKind,
    IdentityAssertion, InMemorySessionCache, LoginService, RequestDescriptor,
    SessionAuthorityCache, SessionId, TokenAssertion, map_to_authorities, policy,
};
use serde_json::json;

fn engine() -> AuthorizationEngine {
    AuthorizationEngine::new(policy::default_policy().unwrap())
}

fn set(names: &[&str]) -> AuthoritySet {
    names.iter().copied().collect()
}

#[test]
fn scenario_a_verified_email() {
    let assertion: IdentityAssertion =
        serde_json::from_value(json!({ "token": { "email_verified": true } })).unwrap();
    assert_eq!(map_to_authorities(&assertion), set(&["VerifiedUser"]));
}

#[test]
fn scenario_b_unverified_email() {
    let assertion: IdentityAssertion =
        serde_json::from_value(json!({ "token": { "email_verified": false } })).unwrap();
    assert_eq!(map_to_authorities(&assertion), AuthoritySet::new());
}

#[test]
fn scenario_c_required_scope_present() {
    let held = set(&["SCOPE_openid"]);
    let req = RequestDescriptor::authenticated("/test", DispatchKind::Request, &held);
    assert_eq!(engine().decide(&req), Decision::Allow);
}

#[test]
fn scenario_d_no_session() {
    let req = RequestDescriptor::anonymous("/test", DispatchKind::Request);
    assert_eq!(engine().decide(&req), Decision::ChallengeLogin);
}

#[test]
fn scenario_e_authenticated_without_scope() {
    let held = AuthoritySet::new();
    let req = RequestDescriptor::authenticated("/test", DispatchKind::Request, &held);
    assert_eq!(engine().decide(&req), Decision::Deny);
}

#[test]
fn scenario_f_error_dispatch_is_allowed_on_any_path() {
    let e = engine();
    let held = AuthoritySet::new();
    for path in ["/test", "/test/deep/path", "/private", "/"] {
        let anonymous = RequestDescriptor::anonymous(path, DispatchKind::Error);
        assert_eq!(e.decide(&anonymous), Decision::Allow, "{path}");
        let empty = RequestDescriptor::authenticated(path, DispatchKind::Error, &held);
        assert_eq!(e.decide(&empty), Decision::Allow, "{path}");
    }
}

#[test]
fn cache_miss_is_unauthenticated() {
    let cache = InMemorySessionCache::new();
    let unknown = SessionId::generate();
    let held = cache.get(&unknown);

    let req = RequestDescriptor::new("/anything", DispatchKind::Request, held.as_deref());
    assert_eq!(engine().decide(&req), Decision::ChallengeLogin);
}

#[test]
fn login_then_request() {
    let cache = Arc::new(InMemorySessionCache::new());
    let login = LoginService::new(ClaimMapper::new(), cache.clone());
    let e = engine();

    let assertion: IdentityAssertion = TokenAssertion::new()
        .with_claim("email_verified", ClaimValue::Bool(true))
        .into();

    // Provider granted the openid scope.
    let session = login.complete_login(&assertion, &set(&["SCOPE_openid"]));
    let held = cache.get(&session.session_id).unwrap();
    let req = RequestDescriptor::authenticated("/test/x", DispatchKind::Request, &held);
    assert_eq!(e.decide(&req), Decision::Allow);

    // Same claims, no scope: logged in but not allowed on /test.
    let session = login.complete_login(&assertion, &AuthoritySet::new());
    let held = cache.get(&session.session_id).unwrap();
    assert!(held.contains("VerifiedUser"));
    let req = RequestDescriptor::authenticated("/test/x", DispatchKind::Request, &held);
    assert_eq!(e.decide(&req), Decision::Deny);
    let req = RequestDescriptor::authenticated("/profile", DispatchKind::Request, &held);
    assert_eq!(e.decide(&req), Decision::Allow);

    // After logout the session is gone.
    login.logout(&session.session_id);
    let held = cache.get(&session.session_id);
    let req = RequestDescriptor::new("/profile", DispatchKind::Request, held.as_deref());
    assert_eq!(e.decide(&req), Decision::ChallengeLogin);
}

#[test]
fn concurrent_readers_with_a_writer() {
    let cache = Arc::new(InMemorySessionCache::new());
    let e = Arc::new(engine());
    let session = SessionId::generate();
    cache.put(session, set(&["SCOPE_openid"]));

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let e = Arc::clone(&e);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    let held = cache.get(&session);
                    let req =
                        RequestDescriptor::new("/test", DispatchKind::Request, held.as_deref());
                    // Either snapshot is valid; never a torn state.
                    let d = e.decide(&req);
                    assert!(matches!(d, Decision::Allow | Decision::Deny), "{d:?}");
                }
            })
        })
        .collect();

    let writer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..1_000 {
                let next = if i % 2 == 0 {
                    AuthoritySet::new()
                } else {
                    set(&["SCOPE_openid"])
                };
                cache.put(session, next);
            }
        })
    };

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    // Last write (i = 999) granted the scope.
    let held = cache.get(&session).unwrap();
    assert!(held.contains("SCOPE_openid"));
}
