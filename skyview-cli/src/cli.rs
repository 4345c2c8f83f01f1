use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, anyhow, bail};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use inquire::{Confirm, CustomType, InquireError, Password, Select, Text};
use skyview_core::{
    CityCandidate, Config, ConfiguredLocator, Controller, ControllerOptions, DayBoundary, LookupError,
    Session, WeatherSummary, provider::is_searchable, provider_from_config, search_cities,
};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "City weather lookup with a 5-day forecast")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional home location.
    Configure,

    /// List cities matching a name.
    Search {
        /// City name, at least 2 characters.
        query: String,
    },

    /// Show the forecast for a city (first match unless --pick).
    Show {
        /// City name.
        city: String,

        /// Choose among the matches interactively.
        #[arg(long)]
        pick: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the forecast for the current location.
    Here {
        /// Latitude; defaults to `[location]` in the config file.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude; defaults to `[location]` in the config file.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Search and browse forecasts in a prompt loop.
    Interactive,
}

#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Number of day tiles to show.
    #[arg(long)]
    pub days: Option<usize>,

    /// Calendar used to split days.
    #[arg(long, value_enum)]
    pub day_boundary: Option<BoundaryArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BoundaryArg {
    /// This machine's local time.
    Local,
    /// The forecast city's local time.
    City,
}

impl From<BoundaryArg> for DayBoundary {
    fn from(arg: BoundaryArg) -> Self {
        match arg {
            BoundaryArg::Local => DayBoundary::Local,
            BoundaryArg::City => DayBoundary::City,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command {
            Command::Configure => configure(config, self.config),
            Command::Search { query } => search(&config, &query).await,
            Command::Show { city, pick, output } => show(&config, &city, pick, &output).await,
            Command::Here { lat, lon, output } => here(&config, lat.zip(lon), &output).await,
            Command::Interactive => interactive(&config).await,
        }
    }
}

fn configure(mut config: Config, path: Option<PathBuf>) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Create one at https://home.openweathermap.org/api_keys")
        .prompt()?;
    config.set_api_key(api_key.trim().to_string());

    let set_home = Confirm::new("Set a home location for `skyview here`?")
        .with_default(config.location.coordinates().is_some())
        .prompt()?;

    if set_home {
        let lat = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a decimal number")
            .prompt()?;
        let lon = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a decimal number")
            .prompt()?;
        skyview_core::Coordinates::new(lat, lon)?;

        config.location.latitude = Some(lat);
        config.location.longitude = Some(lon);
        config.location.allow = true;
    }

    let saved_to = match path {
        Some(path) => {
            config.save_to(&path)?;
            path
        }
        None => config.save()?,
    };

    println!("Saved configuration to {}", saved_to.display());
    Ok(())
}

async fn search(config: &Config, query: &str) -> anyhow::Result<()> {
    if !is_searchable(query) {
        println!("Type at least 2 characters to search.");
        return Ok(());
    }

    let provider = provider_from_config(config)?;
    let cities = search_cities(provider.as_ref(), query, config.search.limit)
        .await
        .context("City search failed")?;

    if cities.is_empty() {
        println!("No matching cities.");
        return Ok(());
    }

    for (i, city) in cities.iter().enumerate() {
        println!("{}", render::candidate_line(i + 1, city));
    }

    Ok(())
}

/// Controller for one-shot commands: no typing, so no debounce.
fn controller(config: &Config, locator: ConfiguredLocator, debounce: Duration) -> anyhow::Result<Controller> {
    let provider = provider_from_config(config)?;
    let options = ControllerOptions { debounce, ..ControllerOptions::from(config) };
    Ok(Controller::new(provider, Arc::new(locator), options))
}

async fn show(config: &Config, city: &str, pick: bool, output: &OutputArgs) -> anyhow::Result<()> {
    if !is_searchable(city) {
        bail!("City name must have at least 2 characters");
    }

    let locator = ConfiguredLocator::from_config(&config.location, None);
    let ctl = controller(config, locator, Duration::ZERO)?;

    ctl.search_changed(city).await?;
    let session = ctl.snapshot();
    if let Some(err) = session.error() {
        bail!("{err}");
    }

    let handle = if pick && session.suggestions().len() > 1 {
        let chosen = choose_city(session.suggestions())?;
        ctl.select_city(chosen)
    } else {
        ctl.submit()
            .ok_or_else(|| anyhow!("No cities found matching '{city}'"))?
    };
    handle.await?;

    print_forecast(config, &ctl.snapshot(), output)
}

async fn here(config: &Config, explicit: Option<(f64, f64)>, output: &OutputArgs) -> anyhow::Result<()> {
    let locator = ConfiguredLocator::from_config(&config.location, explicit);
    let ctl = controller(config, locator, Duration::ZERO)?;

    ctl.use_current_location().await?;

    print_forecast(config, &ctl.snapshot(), output)
}

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let locator = ConfiguredLocator::from_config(&config.location, None);
    let ctl = controller(config, locator, config.search.debounce())?;
    let output = OutputArgs { json: false, days: None, day_boundary: None };

    loop {
        let input = match Text::new("City:")
            .with_help_message("'@' for current location, empty line to quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let input = input.trim();
        if input.is_empty() {
            break;
        }

        if input == "@" {
            ctl.use_current_location().await?;
        } else {
            ctl.search_changed(input).await?;
            let session = ctl.snapshot();

            if let Some(err @ LookupError::Search) = session.error() {
                eprintln!("{err}");
                continue;
            }
            if session.suggestions().is_empty() {
                if is_searchable(input) {
                    println!("No matching cities.");
                } else {
                    println!("Type at least 2 characters to search.");
                }
                continue;
            }

            let chosen = match choose_city(session.suggestions()) {
                Ok(city) => city,
                Err(e) if is_cancel(&e) => continue,
                Err(e) => return Err(e),
            };
            ctl.select_city(chosen).await?;
        }

        if let Err(e) = print_forecast(config, &ctl.snapshot(), &output) {
            eprintln!("{e}");
        }
    }

    Ok(())
}

fn choose_city(cities: &[CityCandidate]) -> anyhow::Result<CityCandidate> {
    let labels: Vec<String> = cities.iter().map(CityCandidate::display_name).collect();
    let chosen = Select::new("Which one?", labels).raw_prompt()?;
    debug!(index = chosen.index, "City chosen");

    cities
        .get(chosen.index)
        .cloned()
        .ok_or_else(|| anyhow!("No city at position {}", chosen.index))
}

fn is_cancel(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<InquireError>(),
        Some(InquireError::OperationCanceled | InquireError::OperationInterrupted)
    )
}

fn print_forecast(config: &Config, session: &Session, output: &OutputArgs) -> anyhow::Result<()> {
    if let Some(err) = session.error() {
        bail!("{err}");
    }

    let forecast = session
        .forecast()
        .ok_or_else(|| anyhow!("No forecast available"))?;

    let boundary = output.day_boundary.map_or(config.display.day_boundary, DayBoundary::from);
    let days = output.days.unwrap_or(config.display.days);
    let summary = WeatherSummary::build(forecast, boundary, days)?;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render::summary(&summary)?);
    }

    Ok(())
}
