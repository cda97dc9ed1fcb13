/*
 * Responsibility
 * - 環境変数の読み込み (鍵の場所, 署名アルゴリズム, revocation backend, scope 要件など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::services::auth::{
    PublicKeyMaterial, ScopePolicy, ScopeRequirement,
    key::KeyError,
    revocation::valkey::DEFAULT_PREFIX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where the issuer public key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// File under the storage root, read once at startup.
    File { root: PathBuf, relative: String },
    /// PEM passed directly (e.g. from a secrets manager through the environment).
    Pem(String),
}

impl KeySource {
    pub fn load(&self, algorithm: Algorithm) -> Result<PublicKeyMaterial, KeyError> {
        match self {
            KeySource::File { root, relative } => {
                PublicKeyMaterial::from_storage(root, relative, algorithm)
            }
            KeySource::Pem(pem) => PublicKeyMaterial::from_pem(pem.as_bytes(), algorithm),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub public_key: KeySource,
    pub jwt_algorithm: Algorithm,

    // Valkey-backed revocation when set, in-memory otherwise
    pub redis_url: Option<String>,
    pub revocation_key_prefix: String,
    pub revocation_ttl: Duration,

    pub required_scopes: ScopeRequirement,

    // Postgres user lookup when set, subject-only users otherwise
    pub database_url: Option<String>,

    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. `from_env` is this over the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match non_empty("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let public_key = match non_empty("OAUTH_PUBLIC_KEY_PEM") {
            Some(pem) => KeySource::Pem(pem.replace("\\n", "\n")),
            None => KeySource::File {
                root: PathBuf::from(non_empty("STORAGE_PATH").unwrap_or_else(|| "storage".into())),
                relative: non_empty("OAUTH_PUBLIC_KEY")
                    .unwrap_or_else(|| "oauth-public.key".into()),
            },
        };

        let jwt_algorithm = match non_empty("OAUTH_JWT_ALGORITHM") {
            Some(v) => Algorithm::from_str(v.trim())
                .map_err(|_| ConfigError::Invalid("OAUTH_JWT_ALGORITHM"))?,
            None => Algorithm::RS256,
        };

        let redis_url = non_empty("REDIS_URL");

        let revocation_key_prefix =
            non_empty("REVOCATION_KEY_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let revocation_ttl_seconds: u64 = match non_empty("REVOCATION_TTL_SECONDS") {
            Some(v) => v
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid("REVOCATION_TTL_SECONDS"))?,
            None => 3600,
        };

        let scope_policy = match non_empty("SCOPE_POLICY") {
            Some(v) => ScopePolicy::from_str(&v).map_err(|_| ConfigError::Invalid("SCOPE_POLICY"))?,
            None => ScopePolicy::default(),
        };
        let required_scopes =
            ScopeRequirement::parse_list(&lookup("REQUIRED_SCOPES").unwrap_or_default(), scope_policy);

        let database_url = non_empty("DATABASE_URL");

        let request_timeout_seconds: u64 = match non_empty("REQUEST_TIMEOUT_SECONDS") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?,
            None => 30,
        };

        Ok(Self {
            addr,
            app_env,
            public_key,
            jwt_algorithm,
            redis_url,
            revocation_key_prefix,
            revocation_ttl: Duration::from_secs(revocation_ttl_seconds),
            required_scopes,
            database_url,
            request_timeout: Duration::from_secs(request_timeout_seconds),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(
            config.public_key,
            KeySource::File {
                root: PathBuf::from("storage"),
                relative: "oauth-public.key".into(),
            }
        );
        assert_eq!(config.jwt_algorithm, Algorithm::RS256);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.revocation_key_prefix, "oauth:revoked");
        assert_eq!(config.revocation_ttl, Duration::from_secs(3600));
        assert_eq!(config.required_scopes, ScopeRequirement::none());
        assert_eq!(config.database_url, None);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn inline_pem_wins_over_file_and_unescapes_newlines() {
        let config = config(&[
            ("OAUTH_PUBLIC_KEY_PEM", "-----BEGIN PUBLIC KEY-----\\nabc"),
            ("OAUTH_PUBLIC_KEY", "other.key"),
        ])
        .unwrap();

        assert_eq!(
            config.public_key,
            KeySource::Pem("-----BEGIN PUBLIC KEY-----\nabc".into())
        );
    }

    #[test]
    fn scopes_and_policy() {
        let config = config(&[("REQUIRED_SCOPES", "read, write"), ("SCOPE_POLICY", "any")]).unwrap();
        assert_eq!(
            config.required_scopes,
            ScopeRequirement::new(["read", "write"], ScopePolicy::Any)
        );
    }

    #[test]
    fn invalid_values_fail_fast() {
        assert_eq!(
            config(&[("OAUTH_JWT_ALGORITHM", "none")]).unwrap_err(),
            ConfigError::Invalid("OAUTH_JWT_ALGORITHM")
        );
        assert_eq!(
            config(&[("SCOPE_POLICY", "most")]).unwrap_err(),
            ConfigError::Invalid("SCOPE_POLICY")
        );
        assert_eq!(
            config(&[("REVOCATION_TTL_SECONDS", "0")]).unwrap_err(),
            ConfigError::Invalid("REVOCATION_TTL_SECONDS")
        );
        assert_eq!(
            config(&[("PORT", "http")]).unwrap_err(),
            ConfigError::Invalid("PORT")
        );
    }

    #[test]
    fn production_env() {
        assert!(config(&[("APP_ENV", "prod")]).unwrap().app_env.is_production());
    }

    #[test]
    fn key_source_loads_fixture_file() {
        let source = KeySource::File {
            root: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/keys"),
            relative: "trusted-public.pem".into(),
        };
        assert_eq!(source.load(Algorithm::RS256).unwrap().algorithm(), Algorithm::RS256);
    }
}
