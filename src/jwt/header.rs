use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

const JWT_TYPE: &str = "JWT";

/// JOSE header of issued credentials. Field order is part of the signed bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoseHeader {
    pub kid: String,
    pub typ: String,
    pub alg: Algorithm,
}

impl JoseHeader {
    pub fn es256(kid: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            typ: JWT_TYPE.to_string(),
            alg: Algorithm::ES256,
        }
    }
}
