pub mod builder;
pub mod claims;
pub mod error;

pub use builder::{ClaimSetBuilder, FlagFallback};
pub use claims::{BASE_CREDENTIAL_TYPE, ClaimSet, VerifiableCredential};
pub use error::ClaimSetError;
