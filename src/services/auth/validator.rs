use std::sync::Arc;

use axum::http::{HeaderMap, header};
use tracing::{debug, warn};

use crate::services::auth::{
    claims::{ClaimError, ClaimSet},
    error::{AccessDenied, NOT_BEARER, NOT_VERIFIED},
    key::PublicKeyMaterial,
    revocation::RevocationChecker,
    signature::SignatureVerifier,
    temporal::{Clock, SystemClock, TemporalValidator},
    token::Token,
};

/// Bearer access-token validation pipeline.
///
/// header → parse → signature → time window → revocation → claims.
/// Each stage is a hard gate; the first failure is returned and nothing
/// after it runs. Signature and time-window failures share one message so
/// clients cannot tell which check failed.
pub struct BearerTokenValidator {
    verifier: SignatureVerifier,
    temporal: TemporalValidator,
    revocation: Arc<dyn RevocationChecker>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for BearerTokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenValidator")
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

impl BearerTokenValidator {
    pub fn new(key: Arc<PublicKeyMaterial>, revocation: Arc<dyn RevocationChecker>) -> Self {
        Self {
            verifier: SignatureVerifier::new(key),
            temporal: TemporalValidator,
            revocation,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the `Authorization: Bearer <jwt>` header of a request.
    pub async fn validate(&self, headers: &HeaderMap) -> Result<ClaimSet, AccessDenied> {
        let jwt = bearer_token(headers)?;
        self.validate_token(jwt).await
    }

    /// Validate a compact JWT string.
    pub async fn validate_token(&self, jwt: &str) -> Result<ClaimSet, AccessDenied> {
        let token =
            Token::parse(jwt).map_err(|err| AccessDenied::with_source(err.to_string(), err))?;

        if !self.verifier.verify(&token) {
            return Err(AccessDenied::not_verified());
        }

        if !self
            .temporal
            .is_valid(&token.registered().temporal, self.clock.now())
        {
            debug!("token outside its validity window");
            return Err(AccessDenied::not_verified());
        }

        let Some(token_id) = token.registered().token_id.clone() else {
            return Err(AccessDenied::with_source(
                NOT_VERIFIED,
                ClaimError::MissingTokenId,
            ));
        };

        // The lookup may do I/O. It runs inside the caller's request future,
        // so request timeouts and disconnects cancel it.
        match self.revocation.is_revoked(&token_id).await {
            Ok(false) => {}
            Ok(true) => return Err(AccessDenied::revoked()),
            Err(err) => {
                warn!(error = %err, jti = %token_id, "revocation lookup failed");
                return Err(AccessDenied::with_source(NOT_VERIFIED, err));
            }
        }

        ClaimSet::project(token).map_err(|err| AccessDenied::with_source(NOT_VERIFIED, err))
    }
}

/// Extract the token from `Authorization: Bearer <jwt>`. The scheme is case-sensitive.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AccessDenied> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(AccessDenied::missing_header)?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| AccessDenied::new(NOT_BEARER))
}
