use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "aws")]
pub mod kms;

/// Signature algorithms the oracle is asked to use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SigningAlgorithm {
    /// ECDSA over P-256 with SHA-256.
    EcdsaSha256,
}

/// How the oracle must interpret the message it receives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageType {
    /// The message is signed as-is, the oracle hashes it.
    Raw,
    /// The message is already a digest and must not be hashed again.
    Digest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignRequest {
    pub key_id: String,
    pub message: Vec<u8>,
    pub message_type: MessageType,
    pub signing_algorithm: SigningAlgorithm,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignResponse {
    /// Key that produced the signature, when reported by the oracle.
    pub key_id: Option<String>,
    /// DER-encoded ECDSA signature.
    pub signature: Option<Vec<u8>>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SigningOracleError {
    #[error("signing oracle transport error: `{0}`")]
    Transport(String),
    #[error("signing oracle rejected the request: `{0}`")]
    Rejected(String),
}

/// A remote, key-isolated service producing signatures without exposing key material.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SigningOracle: Send + Sync {
    async fn sign(&self, request: SignRequest) -> Result<SignResponse, SigningOracleError>;
}

#[async_trait]
impl<T> SigningOracle for &T
where
    T: SigningOracle + ?Sized,
{
    async fn sign(&self, request: SignRequest) -> Result<SignResponse, SigningOracleError> {
        (**self).sign(request).await
    }
}
