use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use service::{initialize, Storage};
use tracing::{debug, error};

/// Read and write module-scoped configuration items.
#[derive(Debug, Parser)]
#[command(name = "easy-config", version)]
struct Cli {
    /// Config file (defaults to $CONFIG_PATH or ./easy-config.toml)
    #[arg(long, short)]
    config: Option<String>,

    /// Module namespace, overrides the config file
    #[arg(long, short)]
    module: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the value of a key (empty when absent)
    Get { key: String },
    /// Create or overwrite a key
    Set { key: String, value: String },
    /// Delete a key
    Remove { key: String },
    /// Print every key of the module
    List,
}

fn load_config(cli: &Cli) -> anyhow::Result<configs::AppConfig> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let mut cfg = configs::load_from_file(path)?;
            cfg.normalize_and_validate()?;
            cfg
        }
        None => configs::AppConfig::load_or_default()?,
    };
    if let Some(module) = &cli.module {
        cfg.module = module.clone();
        cfg.normalize_and_validate()?;
    }
    Ok(cfg)
}

async fn run(cli: Cli, cfg: configs::AppConfig) -> anyhow::Result<()> {
    let storage = Storage::from_config(&cfg.storage);
    let handler = initialize(&storage, &cfg.module).await?;

    match cli.command {
        Command::Get { key } => {
            let value = handler.try_get(&key).await?.unwrap_or_default();
            if cli.json {
                println!("{}", serde_json::json!({ "module": handler.module(), "key": key, "value": value }));
            } else {
                println!("{value}");
            }
        }
        Command::Set { key, value } => {
            handler.set(&key, &value).await?;
            debug!(module = handler.module(), %key, "value stored");
        }
        Command::Remove { key } => {
            handler.try_remove(&key).await?;
        }
        Command::List => {
            let items = handler.try_list().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for item in items {
                    println!("{}={}", item.key, item.value);
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // .env may carry RUST_LOG, CONFIG_PATH and EASY_CONFIG_DB_PASSWORD
    dotenv().ok();
    let cli = Cli::parse();

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(event = "config_invalid", error = %e, "cannot load configuration");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(cfg.logging.format == configs::LogFormat::Json);

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli, cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(event = "command_failed", error = %e, "easy-config command failed");
            ExitCode::FAILURE
        }
    }
}
