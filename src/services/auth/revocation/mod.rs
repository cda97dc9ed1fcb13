pub mod memory;
pub mod store;
pub mod valkey;

pub use memory::InMemoryRevocationStore;
pub use store::{RevocationChecker, RevocationError};
pub use valkey::ValkeyRevocationStore;
