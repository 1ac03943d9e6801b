#![deny(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
#![warn(clippy::expect_used)]

use crate::app_config::AppConfig;
use args::{CliArgs, Command};
use clap::{CommandFactory, Parser};
use commands::{config::config_cmd, memo::memo_cmd};
use db::open_repository;
use profile::{get_profile_path, Profile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app_config;
mod args;
mod commands;
mod db;
mod editor;
mod formatters;
mod profile;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let args = CliArgs::parse();

    let profile_path = get_profile_path(&args.config.profile_path);

    match args.command {
        Some(command) => {
            let profile = Profile::from_path(&profile_path)?;
            let config = AppConfig::from_profile(&profile_path, profile.as_ref());

            match command {
                Command::Config => config_cmd(&config)?,
                Command::Memo(command) => {
                    let repo = open_repository(&config).await?;
                    memo_cmd(&repo, &config, command).await?;
                }
            }
        }
        None => CliArgs::command().print_help()?,
    }

    Ok(())
}

/// Logs go to stderr so command output stays parseable
fn setup_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
