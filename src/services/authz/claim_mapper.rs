//! Provider assertion → internal authorities.
//!
//! Mapping is additive: every rule only ever grants into the set being built,
//! so a new claim rule cannot take away what another rule (or the defaults)
//! already granted. Missing or oddly-typed claims grant nothing and never fail.
use super::assertion::{AttributeAssertion, ClaimValue, IdentityAssertion, TokenAssertion};
use super::authority::AuthoritySet;

pub const EMAIL_VERIFIED_CLAIM: &str = "email_verified";
pub const VERIFIED_USER: &str = "VerifiedUser";

/// Derives the authority set for a login.
///
/// Holds only immutable configuration (the default authorities), so one
/// instance is shared by every login.
#[derive(Debug, Clone, Default)]
pub struct ClaimMapper {
    defaults: AuthoritySet,
}

impl ClaimMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authorities granted to every login regardless of claims.
    pub fn with_defaults(defaults: AuthoritySet) -> Self {
        Self { defaults }
    }

    pub fn map_to_authorities(&self, assertion: &IdentityAssertion) -> AuthoritySet {
        let mut out = self.defaults.clone();
        match assertion {
            IdentityAssertion::Token(token) => map_token_claims(token, &mut out),
            IdentityAssertion::Attributes(attrs) => map_attributes(attrs, &mut out),
        }
        out
    }

    /// Union of the authorities the provider already granted (scopes etc.),
    /// the defaults, and the claim-derived ones.
    pub fn map_with_granted(
        &self,
        granted: &AuthoritySet,
        assertion: &IdentityAssertion,
    ) -> AuthoritySet {
        let mut out = granted.clone();
        out.extend_from(&self.map_to_authorities(assertion));
        out
    }
}

/// Claim mapping without defaults.
pub fn map_to_authorities(assertion: &IdentityAssertion) -> AuthoritySet {
    ClaimMapper::new().map_to_authorities(assertion)
}

fn map_token_claims(token: &TokenAssertion, out: &mut AuthoritySet) {
    if token.claim(EMAIL_VERIFIED_CLAIM).and_then(ClaimValue::as_bool) == Some(true) {
        out.grant(VERIFIED_USER);
    }
}

// No attribute rules yet. Group membership from user-info would go here.
fn map_attributes(_attrs: &AttributeAssertion, _out: &mut AuthoritySet) {}
