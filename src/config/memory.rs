use std::collections::HashMap;

use async_trait::async_trait;

use super::{ConfigKey, ParameterNames, ParameterStore, ParameterStoreError};

/// A fixed set of parameters held in memory. Useful for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryParameterStore {
    parameters: HashMap<String, String>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under the fully qualified parameter `name`.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Stores `value` under the name `names` resolves for `key`.
    pub fn with_key(self, names: &ParameterNames, key: ConfigKey, value: impl Into<String>) -> Self {
        self.with_parameter(names.resolve(key), value)
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String, ParameterStoreError> {
        self.parameters
            .get(name)
            .cloned()
            .ok_or_else(|| ParameterStoreError::NotFound(name.to_string()))
    }
}
