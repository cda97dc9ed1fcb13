use std::sync::Arc;

use jsonwebtoken::{Algorithm, Validation};
use tracing::debug;

use crate::services::auth::{key::PublicKeyMaterial, token::Token};

/// Verifies token signatures against the configured issuer key.
///
/// The algorithm and key both come from configuration. Header fields that
/// could smuggle a key (`jwk`, `jku`, `x5c`, ...) are never looked at, and a
/// token whose `alg` differs from the pinned one is rejected outright.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: Arc<PublicKeyMaterial>,
    validation: Validation,
}

impl SignatureVerifier {
    pub fn new(key: Arc<PublicKeyMaterial>) -> Self {
        // Signature only: time window, audience and required claims are
        // checked by the later pipeline stages.
        let mut validation = Validation::new(key.algorithm());
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self { key, validation }
    }

    pub fn verify(&self, token: &Token) -> bool {
        let header_alg = token
            .header()
            .algorithm()
            .and_then(|alg| alg.parse::<Algorithm>().ok());

        if header_alg != Some(self.key.algorithm()) {
            debug!(
                alg = ?token.header().algorithm(),
                kid = ?token.header().key_id(),
                "token alg does not match pinned alg"
            );
            return false;
        }

        if token.signature().is_empty() {
            return false;
        }

        match jsonwebtoken::decode::<serde_json::Value>(
            token.raw(),
            self.key.decoding_key(),
            &self.validation,
        ) {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, kid = ?token.header().key_id(), "token signature rejected");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::testing;
    use serde_json::json;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(testing::trusted_key())
    }

    fn parse(jwt: &str) -> Token {
        Token::parse(jwt).unwrap()
    }

    #[test]
    fn accepts_token_signed_by_trusted_key() {
        let jwt = testing::sign(&json!({"jti": "t1"}));
        assert!(verifier().verify(&parse(&jwt)));
    }

    #[test]
    fn rejects_token_signed_by_other_key() {
        let jwt = testing::sign_untrusted(&json!({"jti": "t1"}));
        assert!(!verifier().verify(&parse(&jwt)));
    }

    #[test]
    fn rejects_algorithm_other_than_pinned() {
        let jwt = testing::sign_ec(&json!({"jti": "t1"}));
        assert!(!verifier().verify(&parse(&jwt)));
    }

    #[test]
    fn rejects_tampered_payload() {
        let jwt = testing::sign(&json!({"jti": "t1", "sub": "alice"}));
        let forged = testing::sign(&json!({"jti": "t1", "sub": "mallory"}));

        let mut parts: Vec<&str> = jwt.split('.').collect();
        parts[1] = forged.split('.').nth(1).unwrap();
        let tampered = parts.join(".");

        assert!(!verifier().verify(&parse(&tampered)));
    }

    #[test]
    fn rejects_unsigned_token() {
        let jwt = testing::sign(&json!({"jti": "t1"}));
        let unsigned = format!("{}.", jwt.rsplit_once('.').unwrap().0);
        assert!(!verifier().verify(&parse(&unsigned)));
    }
}
