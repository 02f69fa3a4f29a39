/*
 * Responsibility
 * - Static policy source read once at startup (JSON file or embedded defaults)
 * - Raw config rules → validated PolicyTable
 */
use std::path::Path;

use serde::Deserialize;

use super::PolicyError;
use super::pattern::PathPattern;
use super::table::{AccessSpec, DispatchKind, PolicyRule, PolicyTable};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyDocument {
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub pattern: String,
    // None = every dispatch kind
    #[serde(default)]
    pub dispatch: Option<Vec<DispatchKind>>,
    pub access: AccessSpec,
}

impl PolicyDocument {
    pub fn from_json(raw: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn into_table(self) -> Result<PolicyTable, PolicyError> {
        let rules = self
            .rules
            .into_iter()
            .map(|r| {
                let pattern = PathPattern::parse(&r.pattern)?;
                Ok(match r.dispatch {
                    Some(kinds) => PolicyRule::for_dispatch(pattern, kinds, r.access),
                    None => PolicyRule::new(pattern, r.access),
                })
            })
            .collect::<Result<Vec<_>, PolicyError>>()?;

        PolicyTable::new(rules)
    }
}

/// Built-in policy:
/// internal dispatches pass, `/health` is public, `/test/**` needs
/// `SCOPE_openid`, everything else needs a login.
pub fn default_policy() -> Result<PolicyTable, PolicyError> {
    PolicyTable::builder()
        .permit_dispatch(DispatchKind::INTERNAL)
        .permit("/health")
        .require_authority("/test/**", "SCOPE_openid")
        .any_request_authenticated()
}

/// Loads the policy from `path` when given, otherwise the built-in one.
pub fn load_policy(path: Option<&Path>) -> Result<PolicyTable, PolicyError> {
    let table = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
                path: path.display().to_string(),
                source,
            })?;
            PolicyDocument::from_json(&raw)?.into_table()?
        }
        None => default_policy()?,
    };

    let source = path.map_or_else(|| "built-in".to_owned(), |p| p.display().to_string());
    tracing::info!(rules = table.len(), %source, "authorization policy loaded");

    Ok(table)
}
