use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type every verifiable credential carries in first position.
pub const BASE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// JWT claims of an issued verifiable credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimSet {
    /// Subject. Identifier of the credential holder.
    pub(crate) sub: String,
    /// Issuer. Resolved from configuration unless set explicitly.
    pub(crate) iss: String,
    /// Not before, in seconds since the epoch.
    pub(crate) nbf: i64,
    /// Expiration time, in milliseconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) exp: Option<i64>,
    /// JWT ID as `urn:uuid:<v4>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) jti: Option<String>,
    pub(crate) vc: VerifiableCredential,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifiableCredential {
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub(crate) context: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub(crate) types: Vec<String>,
    #[serde(rename = "credentialSubject")]
    pub(crate) credential_subject: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) evidence: Option<Value>,
}

impl Default for ClaimSet {
    fn default() -> Self {
        Self {
            sub: String::new(),
            iss: String::new(),
            nbf: 0,
            exp: None,
            jti: None,
            vc: VerifiableCredential {
                context: None,
                types: vec![BASE_CREDENTIAL_TYPE.to_string()],
                credential_subject: Value::Null,
                evidence: None,
            },
        }
    }
}

impl ClaimSet {
    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn issuer(&self) -> &str {
        &self.iss
    }

    pub fn not_before(&self) -> i64 {
        self.nbf
    }

    pub fn expiry(&self) -> Option<i64> {
        self.exp
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.jti.as_deref()
    }

    pub fn types(&self) -> &[String] {
        &self.vc.types
    }

    pub fn context(&self) -> Option<&[String]> {
        self.vc.context.as_deref()
    }

    pub fn credential_subject(&self) -> &Value {
        &self.vc.credential_subject
    }

    pub fn evidence(&self) -> Option<&Value> {
        self.vc.evidence.as_ref()
    }
}

/// A JSON document counts as empty when it is `null`, `""`, `[]` or `{}`.
pub(crate) fn is_empty_document(document: &Value) -> bool {
    match document {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
