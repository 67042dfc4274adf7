use async_trait::async_trait;
use aws_sdk_kms::Client;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::types::{MessageType as KmsMessageType, SigningAlgorithmSpec};
use tracing::debug;

use super::{MessageType, SignRequest, SignResponse, SigningAlgorithm, SigningOracle, SigningOracleError};

/// Signing oracle backed by an asymmetric AWS KMS key.
#[derive(Debug, Clone)]
pub struct KmsSigningOracle {
    client: Client,
}

impl KmsSigningOracle {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the default AWS configuration chain.
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_from_env().await;
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl SigningOracle for KmsSigningOracle {
    async fn sign(&self, request: SignRequest) -> Result<SignResponse, SigningOracleError> {
        let message_type = match request.message_type {
            MessageType::Raw => KmsMessageType::Raw,
            MessageType::Digest => KmsMessageType::Digest,
        };
        let signing_algorithm = match request.signing_algorithm {
            SigningAlgorithm::EcdsaSha256 => SigningAlgorithmSpec::EcdsaSha256,
        };

        debug!(key_id = %request.key_id, "sending KMS sign request");
        let response = self
            .client
            .sign()
            .key_id(request.key_id)
            .message(Blob::new(request.message))
            .message_type(message_type)
            .signing_algorithm(signing_algorithm)
            .send()
            .await
            .map_err(|err| {
                let message = DisplayErrorContext(&err).to_string();
                if err.as_service_error().is_some() {
                    SigningOracleError::Rejected(message)
                } else {
                    SigningOracleError::Transport(message)
                }
            })?;

        Ok(SignResponse {
            key_id: response.key_id().map(str::to_string),
            signature: response.signature().map(|blob| blob.as_ref().to_vec()),
        })
    }
}
