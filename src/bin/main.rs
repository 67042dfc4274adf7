use std::error::Error;

use clap::Parser;
use tracing::Level;
use vc_issuer::commands::issue::IssueCommand;
use vc_issuer::config::ParameterNames;
use vc_issuer::config::ssm::SsmParameterStore;
use vc_issuer::issuer::CredentialIssuer;
use vc_issuer::oracle::kms::KmsSigningOracle;
use vc_issuer::parameters::Commands;

#[derive(Parser, Debug)]
#[command(name = "vc-issuer-cli")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every issuance stage
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let max_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Issue(args) => {
            let store = SsmParameterStore::from_env().await;
            let oracle = KmsSigningOracle::from_env().await;
            let mut issuer = CredentialIssuer::new(store, oracle, ParameterNames::from_env())
                .with_flag_fallback(args.flag_fallback());
            if let Some(timeout) = args.signing_timeout() {
                issuer = issuer.with_signing_timeout(timeout);
            }

            let token = IssueCommand::new(issuer).issue(&args).await?;
            println!("{token}");
            Ok(())
        }
    }
}
