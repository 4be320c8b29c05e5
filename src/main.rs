#![allow(non_snake_case)]

use std::env;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tuningScheduler::cli::{self, Cli, Commands};
use tuningScheduler::config::{AppConfig, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Cli::parse();
    let config = match args.config.or_else(|| env::var("CONFIG_FILE").ok()) {
        Some(path) => match AppConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "failed to load config");
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };

    let settings = match Settings::load(&config) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let command = args.command.unwrap_or(Commands::Serve { port: None });
    cli::cli(settings, command).await;
    ExitCode::SUCCESS
}
