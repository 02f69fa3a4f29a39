//! Ordered policy rules, first match wins.
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

use super::PolicyError;
use super::pattern::PathPattern;
use crate::services::authz::authority::Authority;

/// How a request reached the handling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchKind {
    /// The original inbound request.
    Request,
    Forward,
    Error,
    Include,
}

impl DispatchKind {
    pub const ALL: [DispatchKind; 4] = [Self::Request, Self::Forward, Self::Error, Self::Include];
    pub const INTERNAL: [DispatchKind; 3] = [Self::Forward, Self::Error, Self::Include];

    pub fn is_internal(self) -> bool {
        !matches!(self, Self::Request)
    }
}

impl fmt::Display for DispatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Request => "request",
            Self::Forward => "forward",
            Self::Error => "error",
            Self::Include => "include",
        };
        f.write_str(s)
    }
}

/// What a matched rule requires of the caller.
///
/// JSON form: `"public"`, `"any_authenticated"` or `{"requires_authority": "NAME"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSpec {
    Public,
    AnyAuthenticated,
    RequiresAuthority(Authority),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    pattern: PathPattern,
    dispatch: BTreeSet<DispatchKind>,
    access: AccessSpec,
}

impl PolicyRule {
    /// A rule that applies to every dispatch kind.
    pub fn new(pattern: PathPattern, access: AccessSpec) -> Self {
        Self::for_dispatch(pattern, DispatchKind::ALL, access)
    }

    pub fn for_dispatch(
        pattern: PathPattern,
        dispatch: impl IntoIterator<Item = DispatchKind>,
        access: AccessSpec,
    ) -> Self {
        Self {
            pattern,
            dispatch: dispatch.into_iter().collect(),
            access,
        }
    }

    /// `/**` → `AnyAuthenticated`, every dispatch kind.
    pub fn catch_all() -> Self {
        Self::new(PathPattern::any(), AccessSpec::AnyAuthenticated)
    }

    pub fn applies_to(&self, path: &str, dispatch: DispatchKind) -> bool {
        self.dispatch.contains(&dispatch) && self.pattern.matches(path)
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn dispatch(&self) -> impl Iterator<Item = DispatchKind> + '_ {
        self.dispatch.iter().copied()
    }

    pub fn access(&self) -> &AccessSpec {
        &self.access
    }

    fn covers_all_dispatch(&self) -> bool {
        DispatchKind::ALL.iter().all(|k| self.dispatch.contains(k))
    }

    /// Matches every (path, dispatch kind) pair.
    fn is_total(&self) -> bool {
        self.pattern.is_catch_all() && self.covers_all_dispatch()
    }
}

/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    // Every rule except the terminal catch-all, in declaration order.
    rules: Vec<PolicyRule>,
    fallback: PolicyRule,
}

impl PolicyTable {
    /// Validates the rule list.
    ///
    /// The last rule must be the catch-all (`/**`, every dispatch kind,
    /// `AnyAuthenticated`), and no earlier rule may match everything.
    pub fn new(mut rules: Vec<PolicyRule>) -> Result<Self, PolicyError> {
        let Some(fallback) = rules.pop() else {
            return Err(PolicyError::Empty);
        };

        if !fallback.is_total() || fallback.access != AccessSpec::AnyAuthenticated {
            return Err(PolicyError::MissingCatchAll {
                last: fallback.pattern.to_string(),
            });
        }

        if let Some(index) = rules.iter().position(PolicyRule::is_total) {
            return Err(PolicyError::UnreachableRules { index });
        }

        Ok(Self { rules, fallback })
    }

    pub fn builder() -> PolicyTableBuilder {
        PolicyTableBuilder::default()
    }

    /// The first rule, in declaration order, that applies. Always returns a rule.
    pub fn match_rule(&self, path: &str, dispatch: DispatchKind) -> &PolicyRule {
        self.rules
            .iter()
            .find(|rule| rule.applies_to(path, dispatch))
            .unwrap_or(&self.fallback)
    }

    pub fn rules(&self) -> impl Iterator<Item = &PolicyRule> {
        self.rules.iter().chain(std::iter::once(&self.fallback))
    }

    pub fn len(&self) -> usize {
        self.rules.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Fluent construction in declaration order, ending with the catch-all.
///
/// ```ignore
/// let table = PolicyTable::builder()
///     .permit_dispatch(DispatchKind::INTERNAL)
///     .require_authority("/test/**", "SCOPE_openid")
///     .any_request_authenticated()?;
/// ```
#[derive(Debug, Default)]
pub struct PolicyTableBuilder {
    rules: Vec<PolicyRule>,
    error: Option<PolicyError>,
}

impl PolicyTableBuilder {
    /// Lets the given dispatch kinds through on every path.
    #[must_use]
    pub fn permit_dispatch(mut self, kinds: impl IntoIterator<Item = DispatchKind>) -> Self {
        self.rules.push(PolicyRule::for_dispatch(
            PathPattern::any(),
            kinds,
            AccessSpec::Public,
        ));
        self
    }

    #[must_use]
    pub fn permit(self, pattern: &str) -> Self {
        self.path_rule(pattern, AccessSpec::Public)
    }

    #[must_use]
    pub fn authenticated(self, pattern: &str) -> Self {
        self.path_rule(pattern, AccessSpec::AnyAuthenticated)
    }

    #[must_use]
    pub fn require_authority(self, pattern: &str, authority: impl Into<Authority>) -> Self {
        self.path_rule(pattern, AccessSpec::RequiresAuthority(authority.into()))
    }

    #[must_use]
    pub fn rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends the catch-all and validates.
    pub fn any_request_authenticated(mut self) -> Result<PolicyTable, PolicyError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.rules.push(PolicyRule::catch_all());
        PolicyTable::new(self.rules)
    }

    fn path_rule(mut self, pattern: &str, access: AccessSpec) -> Self {
        match PathPattern::parse(pattern) {
            Ok(p) => self.rules.push(PolicyRule::new(p, access)),
            // Keep the first error; it is reported when the table is built.
            Err(e) if self.error.is_none() => self.error = Some(e),
            Err(_) => {}
        }
        self
    }
}
