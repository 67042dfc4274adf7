use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{ConfigKey, ParameterNames, ParameterStore, ParameterStoreError};
use crate::time_unit::TimeUnit;

use super::claims::{BASE_CREDENTIAL_TYPE, ClaimSet, is_empty_document};
use super::error::ClaimSetError;

/// What to do when a release flag cannot be read from configuration.
///
/// A flag that is simply not stored is always read as `false`; the policy only applies to
/// backend failures.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum FlagFallback {
    /// Log the failure and read the flag as `false`.
    #[default]
    DefaultFalse,
    /// Fail the build with [`ClaimSetError::ConfigResolution`].
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TimeToLive {
    unit: TimeUnit,
    value: i64,
}

/// Accumulates and validates the claims of a single verifiable credential.
///
/// Every step consumes the builder and hands it back only if the supplied value is valid,
/// so a half-built claim set never escapes a failed step.
pub struct ClaimSetBuilder<'a, S>
where
    S: ParameterStore,
{
    store: &'a S,
    names: ParameterNames,
    flag_fallback: FlagFallback,
    claims: ClaimSet,
    ttl: Option<TimeToLive>,
}

impl<'a, S> ClaimSetBuilder<'a, S>
where
    S: ParameterStore,
{
    pub fn new(store: &'a S, names: ParameterNames) -> Self {
        Self {
            store,
            names,
            flag_fallback: FlagFallback::default(),
            claims: ClaimSet::default(),
            ttl: None,
        }
    }

    pub fn with_flag_fallback(self, flag_fallback: FlagFallback) -> Self {
        Self {
            flag_fallback,
            ..self
        }
    }

    /// Claims accumulated so far.
    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Result<Self, ClaimSetError> {
        let subject = subject.into();
        if subject.is_empty() {
            return Err(ClaimSetError::empty("subject"));
        }
        self.claims.sub = subject;
        Ok(self)
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Result<Self, ClaimSetError> {
        let issuer = issuer.into();
        if issuer.is_empty() {
            return Err(ClaimSetError::empty("issuer"));
        }
        self.claims.iss = issuer;
        Ok(self)
    }

    pub fn time_to_live(mut self, unit: TimeUnit, ttl: i64) -> Result<Self, ClaimSetError> {
        if ttl <= 0 {
            return Err(ClaimSetError::invalid("ttl", "must be greater than zero"));
        }
        self.ttl = Some(TimeToLive { unit, value: ttl });
        Ok(self)
    }

    /// Same as [`Self::time_to_live`], parsing the unit case-insensitively.
    pub fn time_to_live_str(self, unit: &str, ttl: i64) -> Result<Self, ClaimSetError> {
        let unit = unit
            .parse::<TimeUnit>()
            .map_err(|e| ClaimSetError::invalid("ttlUnit", e.to_string()))?;
        self.time_to_live(unit, ttl)
    }

    pub fn verifiable_credential_type(
        self,
        credential_type: impl Into<String>,
    ) -> Result<Self, ClaimSetError> {
        self.verifiable_credential_types([credential_type])
    }

    /// Appends the given types, skipping the ones already present.
    pub fn verifiable_credential_types<I, T>(mut self, types: I) -> Result<Self, ClaimSetError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let types: Vec<String> = types.into_iter().map(Into::into).collect();
        if types.is_empty() || types.iter().any(String::is_empty) {
            return Err(ClaimSetError::empty("VerifiableCredential type"));
        }
        let current = &mut self.claims.vc.types;
        if !current.iter().any(|t| t == BASE_CREDENTIAL_TYPE) {
            current.insert(0, BASE_CREDENTIAL_TYPE.to_string());
        }
        for credential_type in types {
            if !current.contains(&credential_type) {
                current.push(credential_type);
            }
        }
        Ok(self)
    }

    pub fn verifiable_credential_subject(mut self, subject: Value) -> Result<Self, ClaimSetError> {
        if is_empty_document(&subject) {
            return Err(ClaimSetError::empty("VerifiableCredential subject"));
        }
        self.claims.vc.credential_subject = subject;
        Ok(self)
    }

    pub fn verifiable_credential_context<I, T>(mut self, contexts: I) -> Result<Self, ClaimSetError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let contexts: Vec<String> = contexts.into_iter().map(Into::into).collect();
        if contexts.is_empty() || contexts.iter().any(String::is_empty) {
            return Err(ClaimSetError::empty("VerifiableCredential context"));
        }
        self.claims.vc.context = Some(contexts);
        Ok(self)
    }

    pub fn verifiable_credential_evidence(mut self, evidence: Value) -> Result<Self, ClaimSetError> {
        if is_empty_document(&evidence) {
            return Err(ClaimSetError::empty("VerifiableCredential evidence"));
        }
        self.claims.vc.evidence = Some(evidence);
        Ok(self)
    }

    /// Finishes the claim set using the current time.
    pub async fn build(self) -> Result<ClaimSet, ClaimSetError> {
        self.build_at(Utc::now()).await
    }

    /// Finishes the claim set as if it was issued at `now`.
    pub async fn build_at(self, now: DateTime<Utc>) -> Result<ClaimSet, ClaimSetError> {
        if self.claims.sub.is_empty() {
            return Err(ClaimSetError::invalid("subject", "must be set before building"));
        }
        if is_empty_document(&self.claims.vc.credential_subject) {
            return Err(ClaimSetError::invalid(
                "VerifiableCredential subject",
                "must be set before building",
            ));
        }

        let now_ms = now.timestamp_millis();
        let mut claims = self.claims.clone();
        claims.nbf = now_ms.div_euclid(1000);

        if claims.iss.is_empty() {
            claims.iss = self.resolve_issuer().await?;
        }

        if self.is_flag_enabled(ConfigKey::ContainsUniqueId).await? {
            claims.jti = Some(generate_unique_id());
        }

        if self.is_flag_enabled(ConfigKey::ExpiryRemoved).await? {
            debug!("credential expiry removed by release flag");
        } else {
            let ttl = match self.ttl {
                Some(ttl) => ttl,
                None => self.resolve_ttl().await?,
            };
            claims.exp = Some(expiry(now_ms, ttl)?);
        }

        debug!(subject = %claims.sub, issuer = %claims.iss, "claim set built");
        Ok(claims)
    }

    async fn resolve_issuer(&self) -> Result<String, ClaimSetError> {
        let issuer = self.required_parameter(ConfigKey::Issuer).await.map_err(|e| {
            ClaimSetError::ConfigResolution(format!(
                "verifiable credential issuer not resolved: {e}"
            ))
        })?;
        Ok(issuer)
    }

    async fn resolve_ttl(&self) -> Result<TimeToLive, ClaimSetError> {
        let unit = self
            .required_parameter(ConfigKey::TtlUnit)
            .await
            .map_err(ClaimSetError::ConfigResolution)?
            .parse::<TimeUnit>()
            .map_err(|e| ClaimSetError::invalid("ttlUnit", e.to_string()))?;
        let raw_value = self
            .required_parameter(ConfigKey::Ttl)
            .await
            .map_err(ClaimSetError::ConfigResolution)?;
        let value = raw_value
            .trim()
            .parse::<i64>()
            .map_err(|e| ClaimSetError::invalid("ttl", format!("`{raw_value}`: {e}")))?;
        if value <= 0 {
            return Err(ClaimSetError::invalid("ttl", "must be greater than zero"));
        }
        Ok(TimeToLive { unit, value })
    }

    /// Non-empty value for `key`, or the reason it could not be obtained.
    async fn required_parameter(&self, key: ConfigKey) -> Result<String, String> {
        let name = self.names.resolve(key);
        match self.store.get_parameter(&name).await {
            Ok(value) if value.is_empty() => Err(format!("empty value retrieved for `{name}`")),
            Ok(value) => Ok(value),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn is_flag_enabled(&self, key: ConfigKey) -> Result<bool, ClaimSetError> {
        let name = self.names.resolve(key);
        match self.store.get_parameter(&name).await {
            Ok(value) => Ok(value.trim().eq_ignore_ascii_case("true")),
            Err(ParameterStoreError::NotFound(_)) => {
                debug!(flag = %name, "release flag not set");
                Ok(false)
            }
            Err(e) => match self.flag_fallback {
                FlagFallback::DefaultFalse => {
                    warn!(flag = %name, "release flag lookup failed, defaulting to false: {e}");
                    Ok(false)
                }
                FlagFallback::Fail => Err(ClaimSetError::ConfigResolution(format!(
                    "release flag `{name}` lookup failed: {e}"
                ))),
            },
        }
    }
}

fn expiry(now_ms: i64, ttl: TimeToLive) -> Result<i64, ClaimSetError> {
    ttl.value
        .checked_mul(ttl.unit.millis())
        .and_then(|duration| now_ms.checked_add(duration))
        .ok_or_else(|| ClaimSetError::invalid("ttl", "is too large"))
}

fn generate_unique_id() -> String {
    format!("urn:uuid:{}", Uuid::new_v4())
}
