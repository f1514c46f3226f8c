use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use prefadapt::{
    config::{load_rule_tables, Config, LogFormat},
    pipeline::{PersonalizationRequest, Personalizer},
};

/// Preference-adaptive answer personalization
#[derive(Debug, Parser)]
#[command(name = "prefadapt", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse preference text and print the signal as JSON
    Parse {
        /// Preference text (joined with spaces)
        text: Vec<String>,
    },
    /// Personalize a JSON request read from a file or stdin
    Personalize {
        /// Request file; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },
    /// Print the effective rule tables as JSON
    Rules,
    /// Validate a rule file
    ValidateRules {
        /// Rule file to check
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "prefadapt starting");

    match cli.command {
        Command::Parse { text } => {
            let personalizer = Personalizer::from_config(&config)?;
            let signal = personalizer.parser().parse(&text.join(" "));
            println!("{}", serde_json::to_string_pretty(&signal)?);
        }
        Command::Personalize { input, pretty } => {
            let request = read_request(input.as_ref())?;
            let personalizer = Arc::new(Personalizer::from_config(&config)?);
            let timeout = Duration::from_millis(config.request.timeout_ms);

            let task = tokio::task::spawn_blocking(move || personalizer.personalize(&request));
            let response = match tokio::time::timeout(timeout, task).await {
                Ok(joined) => joined.context("Personalization task failed")?,
                Err(_) => {
                    error!(timeout_ms = config.request.timeout_ms, "Personalization timed out");
                    anyhow::bail!("Personalization timed out after {} ms", config.request.timeout_ms);
                }
            };

            let json = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{}", json);
        }
        Command::Rules => {
            let tables = config.rule_tables()?;
            println!("{}", tables.to_json_pretty()?);
        }
        Command::ValidateRules { path } => match load_rule_tables(&path) {
            Ok(tables) => {
                println!(
                    "{}: ok ({} adaptation rules, {} edge case rules)",
                    path.display(),
                    tables.adaptation.as_ref().map(|r| r.len()).unwrap_or(0),
                    tables.edge_cases.as_ref().map(|r| r.len()).unwrap_or(0),
                );
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Rule file is invalid");
                return Err(e.into());
            }
        },
    }

    Ok(())
}

/// Read a personalization request from a file, or stdin when no path is given
fn read_request(path: Option<&PathBuf>) -> anyhow::Result<PersonalizationRequest> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };
    serde_json::from_str(&json).context("Invalid personalization request")
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
