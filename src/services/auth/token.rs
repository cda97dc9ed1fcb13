//! Compact JWS parsing (header / payload / signature) without any cryptography.
//!
//! `Token::parse` only checks structure and the shape of the registered claims.
//! Whether the token can be trusted is decided later by the signature and
//! temporal checks.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::services::auth::claims::Audience;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("The JWT string must have two dots")]
    MissingDots,
    #[error("Error while decoding from Base64Url, invalid base64 characters detected")]
    InvalidBase64,
    #[error("Error while decoding from JSON")]
    InvalidJson,
    #[error("{0} must be an array")]
    NotAnObject(&'static str),
    #[error("Encryption is not supported yet")]
    Encrypted,
    #[error("Value is not in the allowed date format: {0}")]
    InvalidDate(String),
    #[error("{0} must be a string")]
    NotAString(&'static str),
    #[error("aud must be a string or an array of strings")]
    InvalidAudience,
}

/// JOSE header fields the gate reads. Key-bearing fields (`jwk`, `jku`, `x5c`) are dropped.
#[derive(Debug, Clone)]
pub struct TokenHeader {
    algorithm: Option<String>,
    key_id: Option<String>,
}

impl TokenHeader {
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }
}

/// Time-related registered claims (`iat`, `nbf`, `exp`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemporalClaims {
    pub issued_at: Option<DateTime<Utc>>,
    pub not_before: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Registered claims the gate cares about, with their types already checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisteredClaims {
    pub token_id: Option<String>,
    pub subject: Option<String>,
    pub audience: Option<Audience>,
    pub temporal: TemporalClaims,
}

/// A parsed, not yet trusted, token. Lives for one validation call.
#[derive(Debug, Clone)]
pub struct Token {
    raw: String,
    header: TokenHeader,
    claims: Map<String, Value>,
    registered: RegisteredClaims,
    signature: Vec<u8>,
}

impl Token {
    pub fn parse(jwt: &str) -> Result<Self, ParseError> {
        let mut parts = jwt.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError::MissingDots);
        };

        let header = decode_object(header_b64, "headers")?;
        if header.contains_key("enc") {
            return Err(ParseError::Encrypted);
        }

        let claims = decode_object(payload_b64, "claims")?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| ParseError::InvalidBase64)?;

        let registered = RegisteredClaims {
            token_id: optional_string(&claims, "jti")?,
            subject: optional_string(&claims, "sub")?,
            audience: audience(&claims)?,
            temporal: TemporalClaims {
                issued_at: date(&claims, "iat")?,
                not_before: date(&claims, "nbf")?,
                expires_at: date(&claims, "exp")?,
            },
        };

        let header = TokenHeader {
            algorithm: header.get("alg").and_then(Value::as_str).map(str::to_owned),
            key_id: header.get("kid").and_then(Value::as_str).map(str::to_owned),
        };

        Ok(Self {
            raw: jwt.to_owned(),
            header,
            claims,
            registered,
            signature,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn registered(&self) -> &RegisteredClaims {
        &self.registered
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub(crate) fn into_parts(self) -> (RegisteredClaims, Map<String, Value>) {
        (self.registered, self.claims)
    }
}

fn decode_object(segment: &str, part: &'static str) -> Result<Map<String, Value>, ParseError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| ParseError::InvalidBase64)?;

    match serde_json::from_slice::<Value>(&bytes).map_err(|_| ParseError::InvalidJson)? {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject(part)),
    }
}

fn optional_string(
    claims: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, ParseError> {
    match claims.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ParseError::NotAString(name)),
    }
}

fn audience(claims: &Map<String, Value>) -> Result<Option<Audience>, ParseError> {
    match claims.get("aud") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(Audience::Single(s.clone()))),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .map(|v| Some(Audience::Many(v)))
            .ok_or(ParseError::InvalidAudience),
        Some(_) => Err(ParseError::InvalidAudience),
    }
}

// Accepts integer / fractional seconds, as a JSON number or a numeric string.
fn date(claims: &Map<String, Value>, name: &str) -> Result<Option<DateTime<Utc>>, ParseError> {
    let Some(value) = claims.get(name) else {
        return Ok(None);
    };

    let invalid = || ParseError::InvalidDate(value.to_string());

    let seconds = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|s| s.is_finite())
    .ok_or_else(invalid)?;

    if let Some(whole) = value.as_i64() {
        return DateTime::from_timestamp(whole, 0).map(Some).ok_or_else(invalid);
    }

    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
        .map(Some)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segment(value: &Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    fn compact(header: &Value, payload: &Value) -> String {
        format!("{}.{}.c2ln", segment(header), segment(payload))
    }

    #[test]
    fn parses_header_claims_and_signature() {
        let jwt = compact(
            &json!({"alg": "RS256", "typ": "JWT", "kid": "k1"}),
            &json!({"jti": "t1", "sub": "u1", "aud": ["c1"], "exp": 1_700_000_000, "scopes": ["read"]}),
        );

        let token = Token::parse(&jwt).unwrap();

        assert_eq!(token.header().algorithm(), Some("RS256"));
        assert_eq!(token.header().key_id(), Some("k1"));
        assert_eq!(token.signature(), b"sig");
        assert_eq!(token.registered().token_id.as_deref(), Some("t1"));
        assert_eq!(token.registered().subject.as_deref(), Some("u1"));
        assert_eq!(
            token.registered().audience,
            Some(Audience::Many(vec!["c1".into()]))
        );
        assert_eq!(
            token.registered().temporal.expires_at,
            DateTime::from_timestamp(1_700_000_000, 0)
        );
        assert_eq!(token.claims()["scopes"], json!(["read"]));
    }

    #[test]
    fn rejects_wrong_number_of_segments() {
        assert_eq!(Token::parse("").unwrap_err(), ParseError::MissingDots);
        assert_eq!(Token::parse("a.b").unwrap_err(), ParseError::MissingDots);
        assert_eq!(Token::parse("a.b.c.d").unwrap_err(), ParseError::MissingDots);
    }

    #[test]
    fn rejects_bad_encodings() {
        assert_eq!(
            Token::parse("!!!.e30.c2ln").unwrap_err(),
            ParseError::InvalidBase64
        );
        // "bm90IGpzb24" is base64url("not json")
        assert_eq!(
            Token::parse("bm90IGpzb24.e30.c2ln").unwrap_err(),
            ParseError::InvalidJson
        );
        let header = segment(&json!(["RS256"]));
        assert_eq!(
            Token::parse(&format!("{header}.e30.c2ln")).unwrap_err(),
            ParseError::NotAnObject("headers")
        );
    }

    #[test]
    fn rejects_encrypted_tokens() {
        let jwt = compact(&json!({"alg": "RSA-OAEP", "enc": "A256GCM"}), &json!({}));
        assert_eq!(Token::parse(&jwt).unwrap_err(), ParseError::Encrypted);
    }

    #[test]
    fn date_claims_accept_numbers_and_numeric_strings() {
        let jwt = compact(
            &json!({"alg": "RS256"}),
            &json!({"iat": "1700000000", "nbf": 1_700_000_000.5}),
        );
        let temporal = Token::parse(&jwt).unwrap().registered().temporal;

        assert_eq!(temporal.issued_at, DateTime::from_timestamp(1_700_000_000, 0));
        assert_eq!(
            temporal.not_before,
            DateTime::from_timestamp(1_700_000_000, 500_000_000)
        );
        assert_eq!(temporal.expires_at, None);
    }

    #[test]
    fn rejects_non_numeric_dates() {
        let jwt = compact(&json!({"alg": "RS256"}), &json!({"exp": "tomorrow"}));
        assert_eq!(
            Token::parse(&jwt).unwrap_err().to_string(),
            "Value is not in the allowed date format: \"tomorrow\""
        );
    }

    #[test]
    fn rejects_mistyped_registered_claims() {
        let jwt = compact(&json!({"alg": "RS256"}), &json!({"jti": 42}));
        assert_eq!(Token::parse(&jwt).unwrap_err(), ParseError::NotAString("jti"));

        let jwt = compact(&json!({"alg": "RS256"}), &json!({"aud": ["a", 1]}));
        assert_eq!(Token::parse(&jwt).unwrap_err(), ParseError::InvalidAudience);
    }
}
