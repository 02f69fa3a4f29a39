//! Per-request authorization decision.
//!
//! `decide` is a pure function of the request descriptor and the (immutable)
//! policy table: no I/O, no locking, no mutation. Running it twice on the same
//! input gives the same answer, which is what keeps an internally re-dispatched
//! request from being judged differently than the original one.
use std::fmt;

use super::authority::AuthoritySet;
use super::policy::{AccessSpec, DispatchKind, PolicyRule, PolicyTable};

/// What the dispatch layer knows about a request at authorization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDescriptor<'a> {
    pub path: &'a str,
    pub dispatch: DispatchKind,
    /// `None` when the caller has no session.
    pub authorities: Option<&'a AuthoritySet>,
}

impl<'a> RequestDescriptor<'a> {
    pub fn new(path: &'a str, dispatch: DispatchKind, authorities: Option<&'a AuthoritySet>) -> Self {
        Self {
            path,
            dispatch,
            authorities,
        }
    }

    pub fn anonymous(path: &'a str, dispatch: DispatchKind) -> Self {
        Self::new(path, dispatch, None)
    }

    pub fn authenticated(
        path: &'a str,
        dispatch: DispatchKind,
        authorities: &'a AuthoritySet,
    ) -> Self {
        Self::new(path, dispatch, Some(authorities))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Authenticated, but lacking the required authority.
    Deny,
    /// Not authenticated; send the caller to the identity provider.
    ChallengeLogin,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::ChallengeLogin => "challenge_login",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationEngine {
    policy: PolicyTable,
}

impl AuthorizationEngine {
    pub fn new(policy: PolicyTable) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    pub fn decide(&self, request: &RequestDescriptor<'_>) -> Decision {
        self.evaluate(request).0
    }

    /// Decision plus the rule that produced it.
    pub fn evaluate(&self, request: &RequestDescriptor<'_>) -> (Decision, &PolicyRule) {
        let rule = self.policy.match_rule(request.path, request.dispatch);

        let decision = match (rule.access(), request.authorities) {
            (AccessSpec::Public, _) => Decision::Allow,
            (_, None) => Decision::ChallengeLogin,
            (AccessSpec::AnyAuthenticated, Some(_)) => Decision::Allow,
            (AccessSpec::RequiresAuthority(required), Some(held)) => {
                if held.contains(required.as_str()) {
                    Decision::Allow
                } else {
                    Decision::Deny
                }
            }
        };

        (decision, rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> AuthorizationEngine {
        let table = PolicyTable::builder()
            .permit_dispatch(DispatchKind::INTERNAL)
            .permit("/public/**")
            .require_authority("/test/**", "SCOPE_openid")
            .any_request_authenticated()
            .unwrap();
        AuthorizationEngine::new(table)
    }

    fn set(names: &[&str]) -> AuthoritySet {
        names.iter().copied().collect()
    }

    #[test]
    fn public_allows_anyone() {
        let e = engine();
        let req = RequestDescriptor::anonymous("/public/a", DispatchKind::Request);
        assert_eq!(e.decide(&req), Decision::Allow);
    }

    #[test]
    fn required_authority_outcomes() {
        let e = engine();
        let openid = set(&["SCOPE_openid"]);
        let none = AuthoritySet::new();

        let req = RequestDescriptor::authenticated("/test", DispatchKind::Request, &openid);
        assert_eq!(e.decide(&req), Decision::Allow);

        let req = RequestDescriptor::authenticated("/test", DispatchKind::Request, &none);
        assert_eq!(e.decide(&req), Decision::Deny);

        let req = RequestDescriptor::anonymous("/test", DispatchKind::Request);
        assert_eq!(e.decide(&req), Decision::ChallengeLogin);
    }

    #[test]
    fn any_authenticated_ignores_authority_contents() {
        let e = engine();
        let none = AuthoritySet::new();

        let req = RequestDescriptor::authenticated("/profile", DispatchKind::Request, &none);
        assert_eq!(e.decide(&req), Decision::Allow);

        let req = RequestDescriptor::anonymous("/profile", DispatchKind::Request);
        assert_eq!(e.decide(&req), Decision::ChallengeLogin);
    }

    #[test]
    fn internal_dispatches_bypass_path_rules() {
        let e = engine();
        let none = AuthoritySet::new();
        for kind in DispatchKind::INTERNAL {
            let req = RequestDescriptor::anonymous("/test/secret", kind);
            assert_eq!(e.decide(&req), Decision::Allow);
            let req = RequestDescriptor::authenticated("/anything", kind, &none);
            assert_eq!(e.decide(&req), Decision::Allow);
        }
    }

    #[test]
    fn evaluate_reports_matched_rule() {
        let e = engine();
        let req = RequestDescriptor::anonymous("/test/x", DispatchKind::Request);
        let (decision, rule) = e.evaluate(&req);
        assert_eq!(decision, Decision::ChallengeLogin);
        assert_eq!(rule.pattern().as_str(), "/test/**");
    }

    #[test]
    fn decide_is_deterministic() {
        let e = engine();
        let openid = set(&["SCOPE_openid"]);
        let req = RequestDescriptor::authenticated("/test/a", DispatchKind::Request, &openid);
        assert_eq!(e.decide(&req), e.decide(&req));
    }
}
