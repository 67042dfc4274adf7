use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::credential::ClaimSet;
use crate::jwt::ecdsa::{ES256_COORDINATE_SIZE, der_to_jose};
use crate::jwt::{error::JwtSignerError, header::JoseHeader, signed::SignedJwt};
use crate::oracle::{MessageType, SignRequest, SigningAlgorithm, SigningOracle};

use super::{JwtSigner, KeyIdResolver};

/// Signs ES256 JWTs by delegating the signature to a remote [`SigningOracle`].
///
/// Each call goes through `key resolved -> digested -> signed -> converted -> assembled`
/// and either returns the whole compact token or an error.
pub struct RemoteSigner<O, K>
where
    O: SigningOracle,
    K: KeyIdResolver,
{
    oracle: O,
    key_id: K,
    timeout: Option<Duration>,
}

impl<O, K> RemoteSigner<O, K>
where
    O: SigningOracle,
    K: KeyIdResolver,
{
    pub fn new(oracle: O, key_id: K) -> Self {
        Self {
            oracle,
            key_id,
            timeout: None,
        }
    }

    /// Bounds the duration of the oracle call. An elapsed call is dropped and reported as
    /// [`JwtSignerError::SigningFailed`].
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    pub async fn create_signed_jwt<C>(&self, claims: &C) -> Result<SignedJwt, JwtSignerError>
    where
        C: Serialize + Sync + ?Sized,
    {
        let key_id = self
            .key_id
            .key_id()
            .filter(|kid| !kid.is_empty())
            .ok_or(JwtSignerError::SigningKeyMissing)?;
        debug!(%key_id, "signing key resolved");

        let encoded_header = encode_json(&JoseHeader::es256(key_id.as_str()))?;
        let encoded_payload = encode_json(claims)?;
        let signing_input = format!("{encoded_header}.{encoded_payload}");
        let digest = Sha256::digest(signing_input.as_bytes()).to_vec();
        debug!("signing input digested");

        let request = SignRequest {
            key_id,
            message: digest,
            message_type: MessageType::Digest,
            signing_algorithm: SigningAlgorithm::EcdsaSha256,
        };
        let call = self.oracle.sign(request);
        let response = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call).await.map_err(|_| {
                JwtSignerError::SigningFailed(format!(
                    "signing oracle did not answer within {timeout:?}"
                ))
            })?,
            None => call.await,
        }
        .map_err(|e| JwtSignerError::SigningFailed(e.to_string()))?;

        let der_signature = response
            .signature
            .filter(|signature| !signature.is_empty())
            .ok_or_else(|| {
                JwtSignerError::InvalidSignature(
                    "signing oracle response does not contain a signature".to_string(),
                )
            })?;
        debug!("signing oracle returned a signature");

        let jose_signature = der_to_jose(&der_signature, ES256_COORDINATE_SIZE)?;
        let encoded_signature = URL_SAFE_NO_PAD.encode(jose_signature);
        debug!("signature converted to JOSE format");

        Ok(SignedJwt {
            value: format!("{signing_input}.{encoded_signature}"),
        })
    }
}

#[async_trait]
impl<O, K> JwtSigner for RemoteSigner<O, K>
where
    O: SigningOracle,
    K: KeyIdResolver,
{
    async fn sign(&self, claims: &ClaimSet) -> Result<SignedJwt, JwtSignerError> {
        self.create_signed_jwt(claims).await
    }
}

fn encode_json<T>(value: &T) -> Result<String, JwtSignerError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_vec(value).map_err(|e| JwtSignerError::Encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}
