use std::{borrow::Cow, error::Error as StdError};

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub const MISSING_HEADER: &str = "Missing Authorization header";
pub const NOT_BEARER: &str = "Authorization header must use the Bearer scheme";
pub const NOT_VERIFIED: &str = "Access token could not be verified";
pub const REVOKED: &str = "Access token has been revoked";
pub const MISSING_SCOPES: &str = "Access token is missing required scopes";

/// The only rejection the bearer pipeline produces.
///
/// Every failure (missing header, malformed token, bad signature, expiry,
/// revocation, backend trouble) ends up here with a different `reason`.
/// The reason is safe to show to clients; `source` is for logs only.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct AccessDenied {
    reason: Cow<'static, str>,
    #[source]
    source: Option<BoxError>,
}

impl AccessDenied {
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
            source: None,
        }
    }

    pub fn with_source(
        reason: impl Into<Cow<'static, str>>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            reason: reason.into(),
            source: Some(source.into()),
        }
    }

    pub fn missing_header() -> Self {
        Self::new(MISSING_HEADER)
    }

    pub fn not_verified() -> Self {
        Self::new(NOT_VERIFIED)
    }

    pub fn revoked() -> Self {
        Self::new(REVOKED)
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
