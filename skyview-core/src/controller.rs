//! Drives a [`Session`] from user actions.
//!
//! Each action spawns one task. A newer search cancels the older search
//! (including its debounce wait), a newer forecast request cancels the older
//! fetch, and tickets make sure anything that still slips through is
//! dropped by [`Session::apply`].

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    aggregate::day_key,
    config::Config,
    error::{LookupError, LookupOrigin},
    geolocation::{GeolocationError, Geolocator},
    model::{CityCandidate, Coordinates, Forecast},
    provider::{self, WeatherProvider},
    session::{Session, Ticket, Tickets, Transition},
};

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub debounce: Duration,
    pub search_limit: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self { debounce: Duration::from_millis(300), search_limit: 5 }
    }
}

impl From<&Config> for ControllerOptions {
    fn from(cfg: &Config) -> Self {
        Self { debounce: cfg.search.debounce(), search_limit: cfg.search.limit }
    }
}

#[derive(Debug, Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    provider: Arc<dyn WeatherProvider>,
    locator: Arc<dyn Geolocator>,
    options: ControllerOptions,
    state: watch::Sender<Session>,
    tickets: Tickets,
    search_token: Mutex<CancellationToken>,
    forecast_token: Mutex<CancellationToken>,
}

impl Controller {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        locator: Arc<dyn Geolocator>,
        options: ControllerOptions,
    ) -> Self {
        let (state, _) = watch::channel(Session::new());

        Self {
            inner: Arc::new(Inner {
                provider,
                locator,
                options,
                state,
                tickets: Tickets::default(),
                search_token: Mutex::new(CancellationToken::new()),
                forecast_token: Mutex::new(CancellationToken::new()),
            }),
        }
    }

    /// Receiver notified after every applied transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// The search text changed. Looks the query up after the debounce delay
    /// unless another change arrives first.
    pub fn search_changed(&self, query: impl Into<String>) -> JoinHandle<()> {
        let query = query.into();
        let ticket = self.inner.tickets.next();
        let token = renew(&self.inner.search_token);
        self.inner.apply(Transition::SearchChanged { query: query.clone(), ticket });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if !provider::is_searchable(&query) {
                return;
            }

            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(inner.options.debounce) => {}
            }

            let result = tokio::select! {
                _ = token.cancelled() => return,
                r = provider::search_cities(inner.provider.as_ref(), &query, inner.options.search_limit) => r,
            };

            match result {
                Ok(cities) => {
                    debug!(%query, matches = cities.len(), "Suggestions loaded");
                    inner.apply(Transition::SuggestionsLoaded { ticket, cities });
                }
                Err(err) => {
                    warn!(%query, error = %format!("{err:#}"), "City search failed");
                    inner.apply(Transition::SearchFailed { ticket });
                }
            }
        })
    }

    /// A suggestion was chosen: close the dropdown and fetch its forecast.
    pub fn select_city(&self, city: CityCandidate) -> JoinHandle<()> {
        let at = city.coordinates();
        self.inner.search_token.lock().cancel();
        self.inner.apply(Transition::SuggestionPicked(city));
        self.fetch_forecast(at, LookupOrigin::City)
    }

    /// Form submit: picks the first suggestion, if any.
    pub fn submit(&self) -> Option<JoinHandle<()>> {
        let first = self.inner.state.borrow().suggestions().first().cloned();
        first.map(|city| self.select_city(city))
    }

    /// Forecast for the current location reported by the geolocator.
    pub fn use_current_location(&self) -> JoinHandle<()> {
        let (ticket, token) = self.inner.begin_forecast();

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let located = tokio::select! {
                _ = token.cancelled() => return,
                r = inner.locator.locate() => r,
            };

            match located {
                Ok(at) => inner.run_forecast(ticket, token, at, LookupOrigin::CurrentLocation).await,
                Err(GeolocationError::Denied) => {
                    warn!("Location access denied");
                    inner.apply(Transition::LocationDenied { ticket });
                }
                Err(GeolocationError::Unavailable(reason)) => {
                    warn!(%reason, "Location unavailable");
                    inner.apply(Transition::LocationUnavailable { ticket });
                }
            }
        })
    }

    /// Forecast for explicit coordinates, superseding any fetch in flight.
    pub fn fetch_forecast(&self, at: Coordinates, origin: LookupOrigin) -> JoinHandle<()> {
        let (ticket, token) = self.inner.begin_forecast();

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run_forecast(ticket, token, at, origin).await })
    }
}

impl Inner {
    fn apply(&self, transition: Transition) -> bool {
        self.state.send_if_modified(|session| session.apply(transition))
    }

    fn begin_forecast(&self) -> (Ticket, CancellationToken) {
        let ticket = self.tickets.next();
        let token = renew(&self.forecast_token);
        self.apply(Transition::ForecastRequested { ticket });
        (ticket, token)
    }

    async fn run_forecast(
        &self,
        ticket: Ticket,
        token: CancellationToken,
        at: Coordinates,
        origin: LookupOrigin,
    ) {
        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!(?ticket, "Forecast fetch superseded");
                return;
            }
            r = self.provider.forecast(at) => r,
        };

        let transition = match result {
            Ok(forecast) => match validate(&forecast) {
                Ok(()) => Transition::ForecastLoaded { ticket, forecast },
                Err(error) => {
                    warn!(%error, "Rejected forecast");
                    Transition::ForecastFailed { ticket, error }
                }
            },
            Err(err) => {
                warn!(?origin, error = %format!("{err:#}"), "Forecast fetch failed");
                Transition::ForecastFailed { ticket, error: LookupError::network(origin) }
            }
        };

        self.apply(transition);
    }
}

/// Cancels the token in `slot` and installs a fresh one.
fn renew(slot: &Mutex<CancellationToken>) -> CancellationToken {
    let mut current = slot.lock();
    current.cancel();
    *current = CancellationToken::new();
    current.clone()
}

fn validate(forecast: &Forecast) -> Result<(), LookupError> {
    forecast
        .samples
        .iter()
        .try_for_each(|s| day_key(s.timestamp, &Utc).map(|_| ()))
        .map_err(|e| LookupError::InvalidForecast(e.to_string()))
}
