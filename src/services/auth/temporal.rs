use chrono::{DateTime, Utc};

use crate::services::auth::token::TemporalClaims;

/// Time source for validation. Injected so tests (and future skew policies) control "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Zero-leeway time window check.
///
/// Valid when `iat <= now`, `nbf <= now` and `now < exp`; absent claims are
/// not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalValidator;

impl TemporalValidator {
    pub fn is_valid(&self, claims: &TemporalClaims, now: DateTime<Utc>) -> bool {
        if claims.issued_at.is_some_and(|iat| now < iat) {
            return false;
        }
        if claims.not_before.is_some_and(|nbf| now < nbf) {
            return false;
        }
        if claims.expires_at.is_some_and(|exp| now >= exp) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn no_temporal_claims_is_valid() {
        assert!(TemporalValidator.is_valid(&TemporalClaims::default(), now()));
    }

    #[test]
    fn expiry_is_exclusive() {
        let at = |exp| TemporalClaims {
            expires_at: Some(exp),
            ..Default::default()
        };

        assert!(TemporalValidator.is_valid(&at(now() + Duration::seconds(1)), now()));
        assert!(!TemporalValidator.is_valid(&at(now()), now()));
        assert!(!TemporalValidator.is_valid(&at(now() - Duration::seconds(1)), now()));
    }

    #[test]
    fn not_before_is_inclusive() {
        let at = |nbf| TemporalClaims {
            not_before: Some(nbf),
            ..Default::default()
        };

        assert!(TemporalValidator.is_valid(&at(now()), now()));
        assert!(!TemporalValidator.is_valid(&at(now() + Duration::seconds(1)), now()));
    }

    #[test]
    fn issued_in_the_future_is_invalid() {
        let claims = TemporalClaims {
            issued_at: Some(now() + Duration::milliseconds(1)),
            ..Default::default()
        };
        assert!(!TemporalValidator.is_valid(&claims, now()));
    }

    #[test]
    fn fixed_clock_returns_its_instant() {
        assert_eq!(FixedClock(now()).now(), now());
    }
}
