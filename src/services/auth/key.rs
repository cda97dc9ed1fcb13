use std::path::{Path, PathBuf};

use jsonwebtoken::{Algorithm, DecodingKey};

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to read public key {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid public key pem: {0}")]
    InvalidPem(#[source] jsonwebtoken::errors::Error),
    #[error("unsupported signing algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),
}

/// Trusted issuer public key, pinned to one signing algorithm.
///
/// - Loaded once at startup and shared read-only (`Arc`) afterwards.
/// - Only asymmetric algorithms are accepted; there is never a private key here.
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct PublicKeyMaterial {
    algorithm: Algorithm,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for PublicKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKeyMaterial")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl PublicKeyMaterial {
    /// `pem` must be an SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`) document.
    pub fn from_pem(pem: &[u8], algorithm: Algorithm) -> Result<Self, KeyError> {
        let decoding_key = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
            other => return Err(KeyError::UnsupportedAlgorithm(other)),
        }
        .map_err(KeyError::InvalidPem)?;

        Ok(Self {
            algorithm,
            decoding_key,
        })
    }

    /// Read the key file at `relative` under the storage root.
    pub fn from_storage(
        storage_root: &Path,
        relative: &str,
        algorithm: Algorithm,
    ) -> Result<Self, KeyError> {
        let path = storage_path(storage_root, relative);
        let pem = std::fs::read(&path).map_err(|source| KeyError::Read { path, source })?;
        Self::from_pem(&pem, algorithm)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// `storage_path("/oauth-public.key")` style resolution: a leading `/` is relative to the root.
pub fn storage_path(storage_root: &Path, relative: &str) -> PathBuf {
    storage_root.join(relative.trim_start_matches('/'))
}
