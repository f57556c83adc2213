pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quoteflow_core::config::{AppConfig, ConfigError, LoadOptions};
use quoteflow_core::ApplicationError;

use crate::commands::{CommandResult, EXIT_CONFIG};

#[derive(Debug, Parser)]
#[command(
    name = "quoteflow",
    about = "Quoteflow lifecycle CLI",
    long_about = "Inspect the quote status machine: legal transitions, locks, automatic moves, and simulated write paths.",
    after_help = "Examples:\n  quoteflow transitions received\n  quoteflow check draft receiving\n  quoteflow simulate sent receiving --all-proposals-received"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a quoteflow.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List every quote status with its label, tone, and lock state")]
    Statuses,
    #[command(about = "List the statuses reachable in one step from a status")]
    Transitions { status: String },
    #[command(about = "Check whether a quote may move from one status to another")]
    Check { from: String, to: String },
    #[command(about = "Report whether edit and approval actions are closed for a status value")]
    Locked { status: String },
    #[command(about = "Show the automatic status that follows from the given facts")]
    Next {
        status: String,
        #[arg(long, help = "All expected supplier proposals have arrived")]
        all_proposals_received: bool,
    },
    #[command(about = "Print every legal transition edge")]
    Graph {
        #[arg(long, help = "Emit Graphviz DOT instead of JSON")]
        dot: bool,
    },
    #[command(about = "Drive a new draft quote through the write gate and print its audit trail")]
    Simulate {
        #[arg(required = true, help = "Statuses to request, in order")]
        steps: Vec<String>,
        #[arg(long, help = "Treat every proposal as received when checking automatic moves")]
        all_proposals_received: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let options = LoadOptions { config_path: cli.config.clone(), ..LoadOptions::default() };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            let result = config_failure(error);
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };

    if let Err(error) = logging::init(&config.logging) {
        eprintln!("{error:#}");
    }

    let result = match cli.command {
        Command::Statuses => commands::status::list(),
        Command::Transitions { status } => commands::status::transitions(&status),
        Command::Check { from, to } => commands::check::run(&from, &to),
        Command::Locked { status } => commands::status::locked(&status),
        Command::Next { status, all_proposals_received } => {
            commands::next::run(&status, all_proposals_received)
        }
        Command::Graph { dot } => commands::graph::run(dot),
        Command::Simulate { steps, all_proposals_received } => {
            commands::simulate::run(&config, &steps, all_proposals_received)
        }
        Command::Config => commands::config::run(&config, cli.config.as_deref()),
    };

    tracing::debug!(
        event_name = "cli.command_finished",
        exit_code = result.exit_code,
        "command finished"
    );

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

pub fn config_failure(error: ConfigError) -> CommandResult {
    let error = ApplicationError::Configuration(error.to_string());
    CommandResult::failure("startup", "config_validation", error.to_string(), EXIT_CONFIG)
}
