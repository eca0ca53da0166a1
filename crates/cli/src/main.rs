use clap::{Parser, Subcommand};
use mirror_core::MirrorError;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "mirror")]
#[command(about = "Mirror a Kraken Futures account onto a follower account", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cancel resting orders and submit the orders that mirror the source account
    Run {
        /// Config file path
        #[arg(short, long, default_value = mirror_core::config_loader::DEFAULT_CONFIG_PATH)]
        config: String,
    },
    /// Compute and print the mirror plan without submitting anything
    Plan {
        /// Config file path
        #[arg(short, long, default_value = mirror_core::config_loader::DEFAULT_CONFIG_PATH)]
        config: String,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run { config } => commands::run::run(&config).await,
        Commands::Plan { config, json } => commands::plan::run(&config, json).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Maps a failure to its documented exit status; untyped failures exit with 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<MirrorError>()
        .map_or(1, MirrorError::exit_code)
}
