pub mod access;

pub use access::BearerAuth;
