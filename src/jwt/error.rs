use thiserror::Error;

use super::ecdsa::SignatureCodecError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JwtSignerError {
    #[error("signing key id is missing")]
    SigningKeyMissing,
    #[error("remote signing failed: `{0}`")]
    SigningFailed(String),
    #[error("invalid signature: `{0}`")]
    InvalidSignature(String),
    #[error("unable to encode token: `{0}`")]
    Encoding(String),
}

impl From<SignatureCodecError> for JwtSignerError {
    fn from(err: SignatureCodecError) -> Self {
        Self::InvalidSignature(err.to_string())
    }
}
