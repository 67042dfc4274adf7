use async_trait::async_trait;
use aws_sdk_ssm::Client;
use aws_sdk_ssm::error::DisplayErrorContext;
use tracing::debug;

use super::{ParameterStore, ParameterStoreError};

/// Parameter store backed by AWS Systems Manager Parameter Store.
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
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
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String, ParameterStoreError> {
        debug!(parameter = name, "retrieving parameter");
        let response = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_parameter_not_found())
                {
                    ParameterStoreError::NotFound(name.to_string())
                } else {
                    ParameterStoreError::Backend(DisplayErrorContext(&err).to_string())
                }
            })?;

        response
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| ParameterStoreError::NotFound(name.to_string()))
    }
}
