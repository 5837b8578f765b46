use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Text};
use log::debug;
use std::sync::Arc;

use weatherdash_core::{Config, FetcherHandle, QueryTarget, source_from_config};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "City weather lookup in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the Weatherbit API key in the local config file.
    Configure,

    /// Show current conditions for a city and exit.
    Show {
        /// City name, e.g. "London".
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { city }) => show_once(&city).await,
            None => prompt_loop().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("Weatherbit API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key from prompt")?;

    config.set_api_key(key.trim().to_owned());
    config.save()?;

    println!("API key saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show_once(city: &str) -> anyhow::Result<()> {
    let Some(target) = QueryTarget::new(city) else {
        anyhow::bail!("City name must not be empty");
    };

    let config = Config::load()?;
    let source = Arc::from(source_from_config(&config)?);
    let mut fetcher = FetcherHandle::spawn(source);

    fetcher.submit(target);
    let state = fetcher.wait_settled().await;
    println!("{}", render::state_line(&state));

    fetcher.shutdown().await;
    Ok(())
}

/// The interactive widget: prompt for a city, fetch, render, repeat.
/// Whitespace-only input does not trigger a fetch; Esc or Ctrl-C quits.
async fn prompt_loop() -> anyhow::Result<()> {
    let config = Config::load()?;
    let source = Arc::from(source_from_config(&config)?);
    let mut fetcher = FetcherHandle::spawn(source);

    println!("Weather Dashboard");
    println!("Enter a city name to look up current conditions (Esc to quit).");

    loop {
        let line = match Text::new("City:").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => {
                fetcher.shutdown().await;
                return Err(err).context("Failed to read city input");
            }
        };

        let Some(target) = QueryTarget::new(&line) else {
            continue;
        };

        debug!("submitting city '{target}'");
        fetcher.submit(target);
        println!("Loading weather data...");

        let state = fetcher.wait_settled().await;
        println!("{}", render::state_line(&state));
    }

    // Tears down the fetcher, cancelling any request still in flight.
    fetcher.shutdown().await;
    Ok(())
}
