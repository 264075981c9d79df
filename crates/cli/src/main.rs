use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cinder_cli::{
    DEFAULT_CONFIG_PATH, RunOverrides, StrategyKind, commands::run as run_cmd, load_config,
    resolve_run,
};

#[derive(Debug, Parser)]
#[command(name = "cinder", about = "Annealing auction bidding agent", version)]
struct Cli {
    /// Path to the session configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: PathBuf,

    /// Log engine decisions at debug level
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a bidding session against the simulated market
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Number of rounds to run (from config by default)
    #[arg(long, value_name = "N")]
    rounds: Option<usize>,

    /// Seed for the session's random draws
    #[arg(long, value_name = "SEED", env = "CINDER_SEED")]
    seed: Option<u64>,

    /// Strategy override: "annealing" or "probe"
    #[arg(long, value_name = "STRATEGY")]
    strategy: Option<String>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Run(args) => {
            let strategy = match args.strategy.as_deref() {
                None => None,
                Some("annealing") => Some(StrategyKind::Annealing),
                Some("probe") => Some(StrategyKind::Probe),
                Some(other) => {
                    return Err(eyre::eyre!(
                        "unknown strategy {other:?}, expected \"annealing\" or \"probe\""
                    ));
                }
            };
            let plan = resolve_run(
                &config,
                RunOverrides {
                    rounds: args.rounds,
                    seed: args.seed,
                    strategy,
                },
            );
            run_cmd::run(&config, plan).await
        }
    }
}
