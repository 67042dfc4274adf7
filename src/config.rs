use std::env::{self, VarError};

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
#[cfg(feature = "aws")]
pub mod ssm;

const STACK_PREFIX_ENV_NAME: &str = "AWS_STACK_NAME";
const COMMON_PREFIX_ENV_NAME: &str = "COMMON_PARAMETER_NAME_PREFIX";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterStoreError {
    #[error("parameter not found: `{0}`")]
    NotFound(String),
    #[error("parameter store backend error: `{0}`")]
    Backend(String),
}

/// Key/value configuration lookups used while building and signing credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Returns the value stored under the fully qualified parameter `name`.
    async fn get_parameter(&self, name: &str) -> Result<String, ParameterStoreError>;
}

/// Which prefix a configuration key lives under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scope {
    /// Parameters shared across stacks.
    Common,
    /// Parameters owned by the deployed stack.
    Stack,
}

/// Configuration entries consumed by the issuer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigKey {
    Issuer,
    SigningKeyId,
    Ttl,
    TtlUnit,
    ContainsUniqueId,
    ExpiryRemoved,
}

impl ConfigKey {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::Issuer => "verifiable-credential/issuer",
            ConfigKey::SigningKeyId => "verifiableCredentialKmsSigningKeyId",
            ConfigKey::Ttl => "verifiable-credential/ttl",
            ConfigKey::TtlUnit => "verifiable-credential/ttl-unit",
            ConfigKey::ContainsUniqueId => "release-flags/vc-contains-unique-id",
            ConfigKey::ExpiryRemoved => "release-flags/vc-expiry-removed",
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            ConfigKey::ContainsUniqueId | ConfigKey::ExpiryRemoved => Scope::Stack,
            _ => Scope::Common,
        }
    }
}

/// Turns configuration keys into fully qualified parameter names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterNames {
    stack_prefix: String,
    common_prefix: String,
}

impl ParameterNames {
    pub fn new(stack_prefix: impl Into<String>, common_prefix: impl Into<String>) -> Self {
        Self {
            stack_prefix: stack_prefix.into(),
            common_prefix: common_prefix.into(),
        }
    }

    /// Reads both prefixes from `AWS_STACK_NAME` and `COMMON_PARAMETER_NAME_PREFIX`.
    /// Unset variables leave the corresponding prefix empty.
    pub fn from_env() -> Self {
        Self::with_env(env::var)
    }

    fn with_env<F>(env_var: F) -> Self
    where
        F: Fn(&'static str) -> Result<String, VarError>,
    {
        Self {
            stack_prefix: env_var(STACK_PREFIX_ENV_NAME).unwrap_or_default(),
            common_prefix: env_var(COMMON_PREFIX_ENV_NAME).unwrap_or_default(),
        }
    }

    pub fn resolve(&self, key: ConfigKey) -> String {
        self.qualify(key.name(), key.scope())
    }

    /// Prefixes `name` according to `scope`. Absolute names (leading `/`) are returned as-is.
    pub fn qualify(&self, name: &str, scope: Scope) -> String {
        if name.starts_with('/') {
            return name.to_string();
        }
        let prefix = match scope {
            Scope::Common => &self.common_prefix,
            Scope::Stack => &self.stack_prefix,
        };
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("/{name}")
        } else {
            format!("/{prefix}/{name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ConfigKey::Issuer, "/common/verifiable-credential/issuer")]
    #[case(ConfigKey::SigningKeyId, "/common/verifiableCredentialKmsSigningKeyId")]
    #[case(ConfigKey::Ttl, "/common/verifiable-credential/ttl")]
    #[case(ConfigKey::TtlUnit, "/common/verifiable-credential/ttl-unit")]
    #[case(ConfigKey::ContainsUniqueId, "/toy-stack/release-flags/vc-contains-unique-id")]
    #[case(ConfigKey::ExpiryRemoved, "/toy-stack/release-flags/vc-expiry-removed")]
    fn resolve_key(#[case] key: ConfigKey, #[case] expected: &str) {
        let names = ParameterNames::new("toy-stack", "common");
        assert_eq!(names.resolve(key), expected);
    }

    #[test]
    fn absolute_names_are_not_prefixed() {
        let names = ParameterNames::new("toy-stack", "common");
        assert_eq!(
            names.qualify("/release-flags/vc-expiry-removed", Scope::Stack),
            "/release-flags/vc-expiry-removed"
        );
    }

    #[test]
    fn empty_prefix_yields_root_name() {
        let names = ParameterNames::default();
        assert_eq!(
            names.resolve(ConfigKey::Issuer),
            "/verifiable-credential/issuer"
        );
    }

    #[test]
    fn names_from_env() {
        let env_var = |name: &'static str| match name {
            STACK_PREFIX_ENV_NAME => Ok("toy-stack".to_string()),
            COMMON_PREFIX_ENV_NAME => Ok("/common/".to_string()),
            _ => Err(VarError::NotPresent),
        };
        let names = ParameterNames::with_env(env_var);
        assert_eq!(names, ParameterNames::new("toy-stack", "/common/"));
        assert_eq!(
            names.resolve(ConfigKey::SigningKeyId),
            "/common/verifiableCredentialKmsSigningKeyId"
        );
    }

    #[test]
    fn names_from_env_missing_vars() {
        let names = ParameterNames::with_env(|_| Err(VarError::NotPresent));
        assert_eq!(names, ParameterNames::default());
    }
}
