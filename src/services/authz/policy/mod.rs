mod pattern;
mod source;
mod table;

use thiserror::Error;

pub use pattern::PathPattern;
pub use source::{PolicyDocument, RuleConfig, default_policy, load_policy};
pub use table::{AccessSpec, DispatchKind, PolicyRule, PolicyTable, PolicyTableBuilder};

/// Policy configuration problems. All of them surface at startup.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy has no rules")]
    Empty,
    #[error("last policy rule must be the catch-all '/**' -> any_authenticated, got '{last}'")]
    MissingCatchAll { last: String },
    #[error("policy rule #{index} matches every request; the rules after it are unreachable")]
    UnreachableRules { index: usize },
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },
    #[error("failed to read policy file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid policy document: {0}")]
    Parse(#[from] serde_json::Error),
}
