use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::Select;
use meteolux_core::{
    Config, LocationConfig, MeteoLuxApi, MeteoLuxClient, RefreshCycle, Registry,
    model::Bookmark,
};
use tracing::{info, warn};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteolux", version, about = "MeteoLux weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pick a city from the MeteoLux bookmark list and store it.
    Setup,

    /// List configured locations.
    List,

    /// Remove a configured location.
    Remove {
        /// Location key as shown by `meteolux list`.
        key: String,
    },

    /// Refresh once and print the current weather.
    Show {
        /// Location key; may be omitted when only one location is configured.
        key: Option<String>,

        /// Also print the hourly forecast.
        #[arg(long)]
        hourly: bool,
    },

    /// Keep every configured location refreshing and print each update.
    Watch,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Setup => setup(&mut config).await,
            Command::List => {
                if config.locations.is_empty() {
                    println!("No locations configured. Run `meteolux setup` first.");
                }
                for (key, location) in &config.locations {
                    println!("{key}\t{}", location.name);
                }
                Ok(())
            }
            Command::Remove { key } => {
                let removed = config
                    .remove_location(&key)
                    .with_context(|| format!("No location configured with key '{key}'"))?;
                config.save()?;
                println!("Removed {}", removed.name);
                Ok(())
            }
            Command::Show { key, hourly } => show(&config, key.as_deref(), hourly).await,
            Command::Watch => watch(&config).await,
        }
    }
}

fn client(config: &Config) -> anyhow::Result<Arc<dyn MeteoLuxApi>> {
    let api: Arc<dyn MeteoLuxApi> = Arc::new(MeteoLuxClient::from_config(config)?);
    Ok(api)
}

struct CityChoice(Bookmark);

impl std::fmt::Display for CityChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.name)
    }
}

async fn setup(config: &mut Config) -> anyhow::Result<()> {
    let api = client(config)?;
    let cities = api
        .fetch_location_bookmarks(&config.language)
        .await
        .context("Failed to fetch the MeteoLux city list")?;

    if cities.is_empty() {
        bail!("MeteoLux returned no cities to choose from");
    }

    let choices: Vec<CityChoice> = cities.into_iter().map(CityChoice).collect();
    let CityChoice(city) = Select::new("City:", choices).prompt()?;

    let key = config.add_location(LocationConfig::from(&city))?;
    config.save()?;

    println!("Configured {} as '{key}'", city.name);
    Ok(())
}

async fn show(config: &Config, key: Option<&str>, hourly: bool) -> anyhow::Result<()> {
    let (_, location) = config.resolve_location(key)?;

    let mut cycle = RefreshCycle::new(
        location.clone(),
        config.language.clone(),
        config.scan_interval(),
        client(config)?,
    );
    cycle.refresh().await?;

    let state = cycle.state();
    print!("{}", output::render(&state));
    if hourly {
        print!("{}", output::render_hourly(&state));
    }

    Ok(())
}

async fn watch(config: &Config) -> anyhow::Result<()> {
    if config.locations.is_empty() {
        bail!("No locations configured.\nHint: run `meteolux setup` and pick a city first.");
    }

    let mut registry = Registry::from_config(client(config)?, config);

    for (key, location) in &config.locations {
        if let Err(err) = registry.setup(key, location.clone()).await {
            warn!("{err}");
        }
    }

    if registry.is_empty() {
        bail!("No location could be set up");
    }

    let keys: Vec<String> = registry.keys().map(str::to_string).collect();
    for key in keys {
        let Some(mut rx) = registry.state(&key) else {
            continue;
        };
        tokio::spawn(async move {
            loop {
                {
                    let state = rx.borrow_and_update();
                    if state.phase == meteolux_core::RefreshPhase::Idle {
                        print!("[{key}]\n{}", output::render(&state));
                    }
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });
    }

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("Shutting down");
    registry.unload_all();
    Ok(())
}
