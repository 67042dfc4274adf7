use tracing::debug;

use crate::IssuanceError;
use crate::config::ParameterStore;
use crate::issuer::CredentialIssuer;
use crate::jwt::signed::SignedJwt;
use crate::oracle::SigningOracle;
use crate::parameters::IssueArgs;

pub struct IssueCommand<S, O>
where
    S: ParameterStore,
    O: SigningOracle,
{
    issuer: CredentialIssuer<S, O>,
}

impl<S, O> IssueCommand<S, O>
where
    S: ParameterStore,
    O: SigningOracle,
{
    pub fn new(issuer: CredentialIssuer<S, O>) -> Self {
        Self { issuer }
    }

    pub async fn issue(&self, args: &IssueArgs) -> Result<SignedJwt, IssuanceError> {
        let mut builder = self
            .issuer
            .builder()
            .subject(args.subject.as_str())?
            .verifiable_credential_subject(args.credential_subject.clone())?;

        if !args.types.is_empty() {
            builder = builder.verifiable_credential_types(args.types.iter().cloned())?;
        }
        if !args.contexts.is_empty() {
            builder = builder.verifiable_credential_context(args.contexts.iter().cloned())?;
        }
        if let Some(evidence) = &args.evidence {
            builder = builder.verifiable_credential_evidence(evidence.clone())?;
        }
        if let Some(issuer) = &args.issuer {
            builder = builder.issuer(issuer.as_str())?;
        }
        if let (Some(ttl), Some(unit)) = (args.ttl, args.ttl_unit.as_deref()) {
            builder = builder.time_to_live_str(unit, ttl)?;
        }

        let claims = builder.build().await?;
        debug!(subject = %claims.subject(), "claim set built");
        self.issuer.issue(&claims).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::{Value, json};

    use super::*;
    use crate::config::memory::InMemoryParameterStore;
    use crate::config::{ConfigKey, ParameterNames};
    use crate::credential::ClaimSetError;
    use crate::oracle::{MockSigningOracle, SignResponse};

    fn names() -> ParameterNames {
        ParameterNames::new("stack", "common")
    }

    fn store() -> InMemoryParameterStore {
        let names = names();
        InMemoryParameterStore::new()
            .with_key(&names, ConfigKey::Issuer, "configured-issuer")
            .with_key(&names, ConfigKey::SigningKeyId, "signing-key")
            .with_key(&names, ConfigKey::Ttl, "15")
            .with_key(&names, ConfigKey::TtlUnit, "minutes")
    }

    fn oracle() -> MockSigningOracle {
        let mut oracle = MockSigningOracle::new();
        oracle.expect_sign().returning(|_| {
            let der = vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
            Ok(SignResponse {
                key_id: Some("signing-key".to_string()),
                signature: Some(der),
            })
        });
        oracle
    }

    fn args() -> IssueArgs {
        IssueArgs {
            subject: "subject".to_string(),
            credential_subject: json!({"name": "Ada"}),
            types: vec![],
            contexts: vec![],
            evidence: None,
            issuer: None,
            ttl: None,
            ttl_unit: None,
            fail_closed_flags: false,
            signing_timeout_secs: None,
        }
    }

    fn payload(token: &SignedJwt) -> Value {
        let segment = token.value().split('.').nth(1).unwrap();
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segment).unwrap()).unwrap()
    }

    fn command() -> IssueCommand<InMemoryParameterStore, MockSigningOracle> {
        IssueCommand::new(CredentialIssuer::new(store(), oracle(), names()))
    }

    #[tokio::test]
    async fn issue_with_configured_defaults() {
        let token = command().issue(&args()).await.unwrap();

        let payload = payload(&token);
        assert_eq!(payload["iss"], "configured-issuer");
        assert_eq!(payload["sub"], "subject");
        assert_eq!(payload["vc"]["type"], json!(["VerifiableCredential"]));
        assert!(payload.get("jti").is_none());
        let nbf = payload["nbf"].as_i64().unwrap();
        let exp = payload["exp"].as_i64().unwrap();
        assert!(exp >= nbf * 1000 + 15 * 60 * 1000);
        assert!(exp < (nbf + 1) * 1000 + 15 * 60 * 1000);
    }

    #[tokio::test]
    async fn issue_with_overrides() {
        let args = IssueArgs {
            types: vec!["IdentityCheckCredential".to_string()],
            contexts: vec!["https://www.w3.org/2018/credentials/v1".to_string()],
            evidence: Some(json!([{"type": "IdentityCheck"}])),
            issuer: Some("cli-issuer".to_string()),
            ttl: Some(1),
            ttl_unit: Some("DAYS".to_string()),
            ..args()
        };

        let token = command().issue(&args).await.unwrap();

        let payload = payload(&token);
        assert_eq!(payload["iss"], "cli-issuer");
        assert_eq!(
            payload["vc"]["type"],
            json!(["VerifiableCredential", "IdentityCheckCredential"])
        );
        assert_eq!(
            payload["vc"]["@context"],
            json!(["https://www.w3.org/2018/credentials/v1"])
        );
        assert_eq!(payload["vc"]["evidence"], json!([{"type": "IdentityCheck"}]));
        let nbf = payload["nbf"].as_i64().unwrap();
        let exp = payload["exp"].as_i64().unwrap();
        assert!(exp >= nbf * 1000 + 86_400_000);
    }

    #[tokio::test]
    async fn invalid_ttl_unit() {
        let args = IssueArgs {
            ttl: Some(1),
            ttl_unit: Some("fortnights".to_string()),
            ..args()
        };

        let result = command().issue(&args).await;

        assert_matches!(result, Err(IssuanceError::ClaimSet(ClaimSetError::Validation { field, .. })) => {
            assert_eq!(field, "ttlUnit");
        });
    }

    #[tokio::test]
    async fn empty_credential_subject() {
        let args = IssueArgs {
            credential_subject: json!({}),
            ..args()
        };

        let result = command().issue(&args).await;

        assert_matches!(
            result,
            Err(IssuanceError::ClaimSet(ClaimSetError::Validation { .. }))
        );
    }
}
