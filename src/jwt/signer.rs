use async_trait::async_trait;

use crate::credential::ClaimSet;

use super::{error::JwtSignerError, signed::SignedJwt};

pub mod remote;

/// A JWT signer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JwtSigner: Send + Sync {
    async fn sign(&self, claims: &ClaimSet) -> Result<SignedJwt, JwtSignerError>;
}

/// Provides the identifier of the key the oracle must sign with.
pub trait KeyIdResolver: Send + Sync {
    fn key_id(&self) -> Option<String>;
}

impl KeyIdResolver for String {
    fn key_id(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl KeyIdResolver for Option<String> {
    fn key_id(&self) -> Option<String> {
        self.clone()
    }
}

// Accept closures as KeyIdResolver implementations
impl<F> KeyIdResolver for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn key_id(&self) -> Option<String> {
        self()
    }
}
