use std::time::Duration;

use tracing::{debug, info};

use crate::IssuanceError;
use crate::config::{ConfigKey, ParameterNames, ParameterStore};
use crate::credential::{ClaimSet, ClaimSetBuilder, FlagFallback};
use crate::jwt::signed::SignedJwt;
use crate::jwt::signer::remote::RemoteSigner;
use crate::oracle::SigningOracle;

/// Issues verifiable credentials for a single deployment: claim sets are built against its
/// configuration and signed with the key the configuration names.
pub struct CredentialIssuer<S, O>
where
    S: ParameterStore,
    O: SigningOracle,
{
    store: S,
    oracle: O,
    names: ParameterNames,
    flag_fallback: FlagFallback,
    signing_timeout: Option<Duration>,
}

impl<S, O> CredentialIssuer<S, O>
where
    S: ParameterStore,
    O: SigningOracle,
{
    pub fn new(store: S, oracle: O, names: ParameterNames) -> Self {
        Self {
            store,
            oracle,
            names,
            flag_fallback: FlagFallback::default(),
            signing_timeout: None,
        }
    }

    pub fn with_flag_fallback(self, flag_fallback: FlagFallback) -> Self {
        Self {
            flag_fallback,
            ..self
        }
    }

    pub fn with_signing_timeout(self, timeout: Duration) -> Self {
        Self {
            signing_timeout: Some(timeout),
            ..self
        }
    }

    /// A new claim set builder bound to this issuer's configuration.
    pub fn builder(&self) -> ClaimSetBuilder<'_, S> {
        ClaimSetBuilder::new(&self.store, self.names.clone()).with_flag_fallback(self.flag_fallback)
    }

    /// Signs `claims` with the configured signing key.
    pub async fn issue(&self, claims: &ClaimSet) -> Result<SignedJwt, IssuanceError> {
        let name = self.names.resolve(ConfigKey::SigningKeyId);
        let key_id = self
            .store
            .get_parameter(&name)
            .await
            .map_err(|e| IssuanceError::ConfigResolution(e.to_string()))?;
        debug!(parameter = %name, "signing key id retrieved");

        let mut signer = RemoteSigner::new(&self.oracle, key_id);
        if let Some(timeout) = self.signing_timeout {
            signer = signer.with_timeout(timeout);
        }
        let token = signer.create_signed_jwt(claims).await?;
        info!(subject = %claims.subject(), "verifiable credential issued");
        Ok(token)
    }
}
