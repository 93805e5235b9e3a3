use std::fmt::Write;

use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, Select};
use tokio::sync::oneshot;
use tracing::debug;
use weather_sdk::{
    ProviderUnits, TemperatureUnit, WeatherClient, WeatherError, WeatherResponse,
    celsius_to_fahrenheit, fahrenheit_to_celsius,
};

use crate::config::Config;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather SDK demo")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferred unit.
    Configure,

    /// Show current weather for a coordinate.
    Show {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// "celsius", "fahrenheit"; anything else asks for provider defaults.
        #[arg(long)]
        unit: Option<String>,
    },

    /// Run one of the SDK's temperature conversions.
    Convert {
        direction: Direction,

        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Direction {
    CToF,
    FToC,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, unit } => show(lat, lon, unit.as_deref()).await,
            Command::Convert { direction, value } => {
                let converted = match direction {
                    Direction::CToF => celsius_to_fahrenheit(value),
                    Direction::FToC => fahrenheit_to_celsius(value),
                };
                println!("{converted:.2}");
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let unit = Select::new("Preferred unit:", unit_choices())
        .prompt()
        .context("Failed to read preferred unit")?;

    cfg.api_key = Some(api_key.trim().to_string());
    cfg.unit = Some(unit.to_string());

    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn show(lat: f64, lon: f64, unit: Option<&str>) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let units = cfg.units(unit);
    let client = WeatherClient::new(cfg.api_key()?)?;
    debug!(lat, lon, %units, "requesting weather");

    let (tx, rx) = oneshot::channel::<Result<WeatherResponse, WeatherError>>();
    client.get_current_weather(lat, lon, units, tx);

    let response = rx
        .await
        .map_err(|_| anyhow!("Weather request ended without a result"))??;

    print!("{}", render(&response, units));
    Ok(())
}

/// Every named temperature unit, then the provider default.
fn unit_choices() -> Vec<&'static str> {
    TemperatureUnit::all()
        .iter()
        .map(TemperatureUnit::as_str)
        .chain([ProviderUnits::Standard.as_str()])
        .collect()
}

fn render(resp: &WeatherResponse, units: ProviderUnits) -> String {
    let symbol = match units {
        ProviderUnits::Metric => "°C",
        ProviderUnits::Imperial => "°F",
        ProviderUnits::Standard => "K",
    };

    // Writing to a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(out, "Location:    {}", resp.name.as_deref().unwrap_or("Unknown"));
    let _ = writeln!(out, "Condition:   {}", resp.summary().unwrap_or("Unknown"));
    if let Some(main) = &resp.main {
        let _ = writeln!(out, "Temperature: {:.1}{symbol}", main.temp);
        if let Some(feels_like) = main.feels_like {
            let _ = writeln!(out, "Feels like:  {feels_like:.1}{symbol}");
        }
        if let Some(humidity) = main.humidity {
            let _ = writeln!(out, "Humidity:    {humidity}%");
        }
    }
    if let Some(observed) = resp.observed_at() {
        let local = observed.with_timezone(&Local);
        let _ = writeln!(out, "Observed:    {}", local.format("%Y-%m-%d %H:%M"));
    }
    out
}
