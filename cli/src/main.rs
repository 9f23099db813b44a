//! bearer-cli: run custody engine commands against a local LMDB store.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use bearer_cli::{open_engine, CliConfig, Overrides};
use bearer_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "bearer-cli", about = "Bearer-token custody engine commands")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "BEARER_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the LMDB store.
    #[arg(long, env = "BEARER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log filter: "trace", "debug", "info", "warn", "error", or a directive list.
    #[arg(long, env = "BEARER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format: "human" or "json".
    #[arg(long, env = "BEARER_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Seed for token value generation.
    #[arg(long, env = "BEARER_RNG_SEED")]
    rng_seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a state-changing operation (initdemo, cashin, transferTokens, cashOut, deleteState, resetAll).
    Invoke {
        function: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run a read-only operation (read, getTokens, getTransactions).
    Query {
        function: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the effective configuration.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    let config = Overrides {
        data_dir: cli.data_dir,
        log_level: cli.log_level,
        log_format: cli.log_format,
        rng_seed: cli.rng_seed,
    }
    .apply(file_config);

    init_logging(config.log_format, &config.log_level);

    let output = match cli.command {
        Command::Config => Some(config.to_toml_string()?.into_bytes()),
        Command::Invoke { function, args } => {
            let mut engine = open_engine(&config)
                .with_context(|| format!("failed to open store at {}", config.data_dir.display()))?;
            tracing::info!(function = %function, args = args.len(), "invoke");
            bearer_engine::invoke(&mut engine, &function, &args)?
        }
        Command::Query { function, args } => {
            let engine = open_engine(&config)
                .with_context(|| format!("failed to open store at {}", config.data_dir.display()))?;
            tracing::debug!(function = %function, args = args.len(), "query");
            Some(bearer_engine::query(&engine, &function, &args)?)
        }
    };

    if let Some(bytes) = output {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&bytes)?;
        writeln!(stdout)?;
    }
    Ok(())
}
