use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use rtweather_core::{Config, RequestState, WeatherViewModel};
use tokio::sync::watch;
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "rtweather", version, about = "Current weather for any city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the provider API key (prompts when not given).
    Configure {
        #[arg(long)]
        api_key: Option<String>,

        /// Override the provider host, e.g. for a proxy.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Show current weather for a city.
    Show {
        /// City or location name.
        city: String,
    },

    /// Prompt for cities and show the weather for each until cancelled.
    Search,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key, base_url } => configure(api_key, base_url),
            Command::Show { city } => show(&city).await,
            Command::Search => search_loop().await,
        }
    }
}

fn configure(api_key: Option<String>, base_url: Option<String>) -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("WeatherAPI.com API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };
    cfg.set_api_key(api_key);
    if cfg.api_key.is_none() {
        bail!("API key must not be empty");
    }

    if let Some(url) = base_url {
        cfg.base_url = Some(url);
    }

    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn view_model() -> anyhow::Result<WeatherViewModel> {
    let cfg = Config::load()?;
    let api_key = cfg.resolve_api_key()?;
    debug!(base_url = cfg.base_url(), "using weather provider");
    Ok(WeatherViewModel::new(Arc::new(cfg.client()), api_key))
}

async fn show(city: &str) -> anyhow::Result<()> {
    let vm = view_model()?;
    println!("{}", show_with(&vm, city).await?);
    Ok(())
}

/// Runs one search and renders the settled state; an Error state is an `Err`.
async fn show_with(vm: &WeatherViewModel, city: &str) -> anyhow::Result<String> {
    vm.search(city).await.context("Weather task panicked")?;

    match vm.current() {
        Some(RequestState::Error(message)) => bail!(message),
        Some(state) => Ok(render::state(&state)),
        None => bail!("No weather state after search"),
    }
}

async fn search_loop() -> anyhow::Result<()> {
    let vm = view_model()?;
    let mut rx = vm.subscribe();

    loop {
        let city = match Text::new("City:").prompt() {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(err) => return Err(err).context("Failed to read city"),
        };

        let task = vm.search(city);
        render_until_settled(&mut rx, |out| println!("{out}")).await?;
        task.await.context("Weather task panicked")?;
    }
}

/// Renders every observed state until one is no longer `Loading`.
async fn render_until_settled(
    rx: &mut watch::Receiver<Option<RequestState>>,
    mut emit: impl FnMut(&str),
) -> anyhow::Result<()> {
    loop {
        let state = rx.borrow_and_update().clone();
        if let Some(state) = &state {
            emit(&render::state(state));
            if !state.is_loading() {
                return Ok(());
            }
        }
        rx.changed().await.context("Weather state closed")?;
    }
}
