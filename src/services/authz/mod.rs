//! Request authorization and claim → authority mapping.
//!
//! Login: assertion → [`ClaimMapper`] → [`SessionAuthorityCache`].
//! Request: descriptor + cached set → [`AuthorizationEngine`] → [`Decision`].
pub mod assertion;
pub mod authority;
pub mod claim_mapper;
pub mod engine;
pub mod login;
pub mod policy;
pub mod session_cache;

pub use assertion::{AttributeAssertion, ClaimValue, IdentityAssertion, TokenAssertion};
pub use authority::{Authority, AuthoritySet};
pub use claim_mapper::{ClaimMapper, map_to_authorities};
pub use engine::{AuthorizationEngine, Decision, RequestDescriptor};
pub use login::{EstablishedSession, LoginService};
pub use policy::{AccessSpec, DispatchKind, PolicyError, PolicyRule, PolicyTable};
pub use session_cache::{InMemorySessionCache, SessionAuthorityCache, SessionId};
