//! Shared fixtures for auth tests: PEM keys, token minting and fake stores.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use crate::services::{
    auth::{
        key::PublicKeyMaterial,
        revocation::{RevocationChecker, RevocationError},
        temporal::FixedClock,
        validator::BearerTokenValidator,
    },
    cache::CacheError,
};

pub const TRUSTED_PUBLIC_PEM: &str = include_str!("../../../fixtures/keys/trusted-public.pem");
pub const TRUSTED_PRIVATE_PEM: &str = include_str!("../../../fixtures/keys/trusted-private.pem");
pub const UNTRUSTED_PRIVATE_PEM: &str =
    include_str!("../../../fixtures/keys/untrusted-private.pem");
pub const EC_PUBLIC_PEM: &str = include_str!("../../../fixtures/keys/ec-public.pem");
pub const EC_PRIVATE_PEM: &str = include_str!("../../../fixtures/keys/ec-private.pem");

// 2026-01-01T12:00:00Z
pub const NOW_TS: i64 = 1_767_268_800;

pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(NOW_TS, 0).unwrap()
}

pub fn trusted_key() -> Arc<PublicKeyMaterial> {
    Arc::new(PublicKeyMaterial::from_pem(TRUSTED_PUBLIC_PEM.as_bytes(), Algorithm::RS256).unwrap())
}

pub fn validator(store: Arc<dyn RevocationChecker>) -> BearerTokenValidator {
    BearerTokenValidator::new(trusted_key(), store).with_clock(Arc::new(FixedClock(now())))
}

/// Claims of a token valid at `NOW_TS`.
pub fn claims(jti: &str) -> Value {
    json!({
        "jti": jti,
        "aud": ["client1"],
        "sub": "user-1",
        "scopes": ["read"],
        "iat": NOW_TS - 60,
        "nbf": NOW_TS - 60,
        "exp": NOW_TS + 600,
    })
}

fn encode(alg: Algorithm, key: &EncodingKey, claims: &Value) -> String {
    jsonwebtoken::encode(&Header::new(alg), claims, key).unwrap()
}

pub fn sign(claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(TRUSTED_PRIVATE_PEM.as_bytes()).unwrap();
    encode(Algorithm::RS256, &key, claims)
}

pub fn sign_untrusted(claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(UNTRUSTED_PRIVATE_PEM.as_bytes()).unwrap();
    encode(Algorithm::RS256, &key, claims)
}

pub fn sign_ec(claims: &Value) -> String {
    let key = EncodingKey::from_ec_pem(EC_PRIVATE_PEM.as_bytes()).unwrap();
    encode(Algorithm::ES256, &key, claims)
}

pub fn bearer(jwt: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {jwt}")).unwrap(),
    );
    headers
}

/// Never revoked; counts lookups.
#[derive(Debug, Default)]
pub struct CountingStore {
    lookups: AtomicUsize,
}

impl CountingStore {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RevocationChecker for CountingStore {
    async fn is_revoked(&self, _token_id: &str) -> Result<bool, RevocationError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    }

    async fn revoke(&self, _token_id: &str) -> Result<(), RevocationError> {
        Ok(())
    }
}

/// Backend that is always down.
#[derive(Debug)]
pub struct FailingStore;

#[async_trait]
impl RevocationChecker for FailingStore {
    async fn is_revoked(&self, _token_id: &str) -> Result<bool, RevocationError> {
        Err(CacheError::BackendConnection("connection refused".into()).into())
    }

    async fn revoke(&self, _token_id: &str) -> Result<(), RevocationError> {
        Err(CacheError::BackendConnection("connection refused".into()).into())
    }
}
