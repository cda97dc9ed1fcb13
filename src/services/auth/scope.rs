use std::{collections::BTreeSet, str::FromStr};

/// How the required scopes are matched against a token's granted scopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopePolicy {
    /// Every required scope must be granted.
    #[default]
    All,
    /// At least one required scope must be granted.
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope policy '{0}' (expected 'all' or 'any')")]
pub struct InvalidScopePolicy(pub String);

impl FromStr for ScopePolicy {
    type Err = InvalidScopePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            _ => Err(InvalidScopePolicy(s.to_owned())),
        }
    }
}

/// Scopes a protected route requires, plus the matching policy.
///
/// An empty requirement is always satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeRequirement {
    required: BTreeSet<String>,
    policy: ScopePolicy,
}

impl ScopeRequirement {
    pub fn new<I, S>(required: I, policy: ScopePolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            policy,
        }
    }

    /// Comma-separated list, e.g. `"orders:read, orders:write"`.
    pub fn parse_list(list: &str, policy: ScopePolicy) -> Self {
        Self::new(
            list.split(',').map(str::trim).filter(|s| !s.is_empty()),
            policy,
        )
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub fn policy(&self) -> ScopePolicy {
        self.policy
    }

    pub fn is_satisfied_by(&self, granted: &[String]) -> bool {
        if self.required.is_empty() {
            return true;
        }

        let has = |scope: &String| granted.contains(scope);
        match self.policy {
            ScopePolicy::All => self.required.iter().all(has),
            ScopePolicy::Any => self.required.iter().any(has),
        }
    }
}
