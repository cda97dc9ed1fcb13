pub mod claims;
pub mod error;
pub mod key;
pub mod revocation;
pub mod scope;
pub mod signature;
pub mod temporal;
pub mod token;
pub mod user;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::{Audience, ClaimSet};
pub use error::AccessDenied;
pub use key::PublicKeyMaterial;
pub use revocation::{InMemoryRevocationStore, RevocationChecker, ValkeyRevocationStore};
pub use scope::{ScopePolicy, ScopeRequirement};
pub use validator::BearerTokenValidator;
