use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use skycast_core::{Config, IpApiLocator, Locator, WeatherProvider, openweather_from_config};
use tracing_subscriber::EnvFilter;

use crate::runtime::{self, Options};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Terminal weather widget")]
pub struct Cli {
    /// City to fetch immediately on startup (implies --no-detect).
    #[arg(long)]
    pub city: Option<String>,

    /// Skip IP-based location detection on startup.
    #[arg(long)]
    pub no_detect: bool,

    /// Disable the animated color backdrop.
    #[arg(long)]
    pub mono: bool,

    /// Append tracing output to this file (the terminal itself is taken
    /// over by the widget).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key interactively.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        if let Some(path) = &self.log_file {
            init_tracing(path)?;
        }

        match self.command {
            Some(Command::Configure) => configure(),
            None => self.widget().await,
        }
    }

    async fn widget(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        // The environment beats the config file, so CI and one-off runs
        // need no `configure` step.
        if let Ok(key) = std::env::var("OPENWEATHER_API_KEY") {
            if !key.is_empty() {
                config.set_api_key(key);
            }
        }

        let provider: Arc<dyn WeatherProvider> = Arc::new(openweather_from_config(&config)?);
        let locator: Arc<dyn Locator> = Arc::new(IpApiLocator::new());

        let options = Options {
            detect: !self.no_detect && self.city.is_none(),
            initial_city: self.city,
            mono: self.mono,
        };

        runtime::run(provider, locator, options).await
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Text::new("OpenWeather API key:")
        .with_help_message("Create one for free at https://openweathermap.org/api")
        .prompt()?;

    config.set_api_key(key.trim().to_string());
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn init_tracing(path: &Path) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("skycast_core=debug,skycast_tui=debug")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_widget_flags() {
        let cli = Cli::try_parse_from(["skycast", "--city", "London", "--mono"]).unwrap();
        assert_eq!(cli.city.as_deref(), Some("London"));
        assert!(cli.mono);
        assert!(!cli.no_detect);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_configure_subcommand() {
        let cli = Cli::try_parse_from(["skycast", "configure"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Configure)));
    }
}
