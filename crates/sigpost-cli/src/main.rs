mod send;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sigpost-cli")]
#[command(about = "Record search interaction signals from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send one signal for a search document read from a JSON file
    Send {
        /// Path to the document JSON, or `-` for stdin
        document: PathBuf,

        /// Signal type tag
        #[arg(long = "type", default_value = sigpost_signals::DEFAULT_SIGNAL_TYPE)]
        kind: String,

        /// Signal strength
        #[arg(long, default_value_t = sigpost_signals::DEFAULT_SIGNAL_WEIGHT, allow_negative_numbers = true)]
        weight: i64,
    },
    /// Print the loaded configuration (secrets redacted)
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("sigpost-cli: run `sigpost-cli --help` for available commands");
        return Ok(());
    };

    let config = sigpost_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Send {
            document,
            kind,
            weight,
        } => send::run_send(&config, &document, &kind, weight).await?,
        Commands::Config => println!("{config:#?}"),
    }

    Ok(())
}
