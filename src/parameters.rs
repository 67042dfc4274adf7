use std::time::Duration;

use clap::{Args, Subcommand};
use serde_json::Value;

use crate::credential::FlagFallback;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Builds a verifiable credential for a subject and prints the signed JWT.
    Issue(IssueArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct IssueArgs {
    /// Subject the credential is issued for (`sub` claim)
    #[arg(long, required = true)]
    pub subject: String,

    /// JSON document describing the credential subject
    #[arg(long, required = true, value_parser = parse_json)]
    pub credential_subject: Value,

    /// Verifiable credential type, in addition to `VerifiableCredential`. Can be repeated.
    #[arg(long = "type")]
    pub types: Vec<String>,

    /// JSON-LD context URI. Can be repeated.
    #[arg(long = "context")]
    pub contexts: Vec<String>,

    /// JSON document with the evidence supporting the credential
    #[arg(long, value_parser = parse_json)]
    pub evidence: Option<Value>,

    /// Issuer of the credential. Read from configuration when absent.
    #[arg(long)]
    pub issuer: Option<String>,

    /// Time-to-live of the credential. Read from configuration when absent.
    #[arg(long, requires = "ttl_unit")]
    pub ttl: Option<i64>,

    /// Unit of `--ttl`: seconds, minutes, hours, days, months or years
    #[arg(long, requires = "ttl")]
    pub ttl_unit: Option<String>,

    /// Fail instead of reading a release flag as disabled when its lookup fails
    #[arg(long, default_value_t = false)]
    pub fail_closed_flags: bool,

    /// Maximum time to wait for the signing service, in seconds
    #[arg(long)]
    pub signing_timeout_secs: Option<u64>,
}

impl IssueArgs {
    pub fn flag_fallback(&self) -> FlagFallback {
        if self.fail_closed_flags {
            FlagFallback::Fail
        } else {
            FlagFallback::DefaultFalse
        }
    }

    pub fn signing_timeout(&self) -> Option<Duration> {
        self.signing_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_json(value: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(value)
}
