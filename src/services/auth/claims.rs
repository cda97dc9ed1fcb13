use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::services::auth::token::Token;

/// `aud` claim: either a bare string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Default for Audience {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl Audience {
    /// Collapse a one-element list into a bare string. Other shapes are kept.
    pub fn normalized(self) -> Self {
        match self {
            Self::Many(mut values) if values.len() == 1 => Self::Single(values.remove(0)),
            other => other,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("missing 'jti' claim")]
    MissingTokenId,
    #[error("'scopes' must be an array of strings")]
    InvalidScopes,
}

/// Claims of a token that passed every validation stage.
///
/// Only the validator can build one, so holding a `ClaimSet` means the
/// signature, time window and revocation checks all succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    token_id: String,
    audience: Audience,
    subject: Option<String>,
    scopes: Vec<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl ClaimSet {
    pub(crate) fn project(token: Token) -> Result<Self, ClaimError> {
        let (registered, claims) = token.into_parts();

        let token_id = registered.token_id.ok_or(ClaimError::MissingTokenId)?;

        Ok(Self {
            token_id,
            audience: registered.audience.unwrap_or_default().normalized(),
            subject: registered.subject,
            scopes: scopes(&claims)?,
            expires_at: registered.temporal.expires_at,
        })
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    pub fn audience(&self) -> &Audience {
        &self.audience
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// `exp`, if the token carries one. Bounds how long a revocation must be kept.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn into_parts(
        self,
    ) -> (String, Audience, Option<String>, Vec<String>, Option<DateTime<Utc>>) {
        (
            self.token_id,
            self.audience,
            self.subject,
            self.scopes,
            self.expires_at,
        )
    }
}

// `scopes` (array) wins; a space-delimited `scope` string is accepted as fallback.
fn scopes(claims: &Map<String, Value>) -> Result<Vec<String>, ClaimError> {
    match claims.get("scopes") {
        Some(Value::Array(items)) => {
            return items
                .iter()
                .map(|v| v.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .ok_or(ClaimError::InvalidScopes);
        }
        None | Some(Value::Null) => {}
        Some(_) => return Err(ClaimError::InvalidScopes),
    }

    match claims.get("scope") {
        Some(Value::String(s)) => Ok(s.split_whitespace().map(str::to_owned).collect()),
        _ => Ok(Vec::new()),
    }
}
