/*
 * Responsibility
 * - Identity assertions handed over by the login flow after the provider round-trip
 * - Token claims (verified ID token) and user-info attributes are distinct variants
 * - Produced once per login and consumed once by the claim mapper
 */
use std::collections::BTreeMap;

use serde::Deserialize;

/// A single ID-token claim value.
///
/// Providers put arbitrary JSON into claims; only booleans and strings are
/// interpreted. Everything else is carried as `Other` and ignored by mapping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Bool(bool),
    Text(String),
    Other(serde_json::Value),
}

impl ClaimValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Claims from a verified ID token.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TokenAssertion {
    claims: BTreeMap<String, ClaimValue>,
}

impl TokenAssertion {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: ClaimValue) -> Self {
        self.claims.insert(name.into(), value);
        self
    }

    /// Returns `None` for a missing claim and for an explicit JSON `null`.
    pub fn claim(&self, name: &str) -> Option<&ClaimValue> {
        self.claims
            .get(name)
            .filter(|v| !matches!(v, ClaimValue::Other(serde_json::Value::Null)))
    }
}

/// Attributes from a user-info endpoint response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AttributeAssertion {
    attributes: BTreeMap<String, serde_json::Value>,
}

impl AttributeAssertion {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }
}

/// What the provider asserted about the user, by source.
///
/// JSON form: `{"token": {...claims}}` or `{"attributes": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityAssertion {
    Token(TokenAssertion),
    Attributes(AttributeAssertion),
}

impl From<TokenAssertion> for IdentityAssertion {
    fn from(t: TokenAssertion) -> Self {
        Self::Token(t)
    }
}

impl From<AttributeAssertion> for IdentityAssertion {
    fn from(a: AttributeAssertion) -> Self {
        Self::Attributes(a)
    }
}
