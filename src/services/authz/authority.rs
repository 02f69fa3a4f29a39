//! Internal authorities and the per-session authority set.
//!
//! An authority is an opaque permission token (`SCOPE_openid`, `VerifiedUser`).
//! Equality is exact string match; there is no hierarchy between authorities.
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Ordering and equality are the inner string's, so set lookups by `&str` agree.
impl Borrow<str> for Authority {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Authority {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Authority {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Set of authorities attached to an authenticated session.
///
/// Unordered by contract. The `BTreeSet` backing only keeps `Debug` output and
/// log lines stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthoritySet(BTreeSet<Authority>);

impl AuthoritySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an authority. Returns `false` when it was already present.
    pub fn grant(&mut self, authority: impl Into<Authority>) -> bool {
        self.0.insert(authority.into())
    }

    /// Accumulates every authority of `other` into `self`.
    pub fn extend_from(&mut self, other: &AuthoritySet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Authority> {
        self.0.iter()
    }
}

impl<A: Into<Authority>> FromIterator<A> for AuthoritySet {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for AuthoritySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, authority) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(authority.as_str())?;
        }
        f.write_str("]")
    }
}
