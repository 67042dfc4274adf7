pub mod commands;
pub mod config;
pub mod credential;
pub mod issuer;
pub mod jwt;
pub mod oracle;
pub mod parameters;
pub mod time_unit;

use thiserror::Error;

use crate::credential::ClaimSetError;
use crate::jwt::error::JwtSignerError;

#[derive(Error, Debug)]
pub enum IssuanceError {
    #[error("building claim set: `{0}`")]
    ClaimSet(#[from] ClaimSetError),
    #[error("signing JWT: `{0}`")]
    JwtSigner(#[from] JwtSignerError),
    #[error("resolving signing key id: `{0}`")]
    ConfigResolution(String),
}
