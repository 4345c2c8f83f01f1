//! Lookup state owned by the front end, changed only through [`Transition`]s.
//!
//! Every search and every forecast fetch carries a [`Ticket`]. Results are
//! applied only when their ticket is still the newest one of its kind, so a
//! slow stale response can never overwrite a newer one.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tracing::debug;

use crate::{
    error::LookupError,
    model::{CityCandidate, Forecast},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Monotonic ticket source.
#[derive(Debug, Default)]
pub struct Tickets(AtomicU64);

impl Tickets {
    pub fn next(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[derive(Debug, Clone)]
pub enum Transition {
    /// The search text changed; `ticket` identifies the lookup it may start.
    SearchChanged { query: String, ticket: Ticket },
    SuggestionsLoaded { ticket: Ticket, cities: Vec<CityCandidate> },
    SearchFailed { ticket: Ticket },
    SuggestionPicked(CityCandidate),
    ForecastRequested { ticket: Ticket },
    ForecastLoaded { ticket: Ticket, forecast: Forecast },
    ForecastFailed { ticket: Ticket, error: LookupError },
    LocationDenied { ticket: Ticket },
    LocationUnavailable { ticket: Ticket },
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    query: String,
    suggestions: Vec<CityCandidate>,
    suggestions_visible: bool,
    search_ticket: Option<Ticket>,
    searching: bool,
    forecast_ticket: Option<Ticket>,
    loading: bool,
    forecast: Option<Arc<Forecast>>,
    error: Option<LookupError>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[CityCandidate] {
        &self.suggestions
    }

    /// Suggestions to show in the dropdown, empty when it is closed.
    pub fn visible_suggestions(&self) -> &[CityCandidate] {
        if self.suggestions_visible { self.suggestions.as_slice() } else { &[] }
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_deref()
    }

    pub fn error(&self) -> Option<&LookupError> {
        self.error.as_ref()
    }

    /// Applies `transition`; returns `false` when it was stale and ignored.
    pub fn apply(&mut self, transition: Transition) -> bool {
        match transition {
            Transition::SearchChanged { query, ticket } => {
                self.searching = crate::provider::is_searchable(&query);
                self.query = query;
                self.suggestions.clear();
                self.suggestions_visible = true;
                self.search_ticket = Some(ticket);
                // Errors stay with the action that raised them.
                self.error = None;
            }
            Transition::SuggestionsLoaded { ticket, cities } => {
                if !self.is_current_search(ticket) {
                    return self.ignore("suggestions", ticket);
                }
                self.searching = false;
                self.suggestions = cities;
            }
            Transition::SearchFailed { ticket } => {
                if !self.is_current_search(ticket) {
                    return self.ignore("search failure", ticket);
                }
                self.searching = false;
                self.suggestions.clear();
                self.error = Some(LookupError::Search);
            }
            Transition::SuggestionPicked(city) => {
                self.query = city.name;
                self.suggestions_visible = false;
                self.searching = false;
                self.search_ticket = None;
            }
            Transition::ForecastRequested { ticket } => {
                self.forecast_ticket = Some(ticket);
                self.loading = true;
                self.error = None;
            }
            Transition::ForecastLoaded { ticket, forecast } => {
                if !self.is_current_forecast(ticket) {
                    return self.ignore("forecast", ticket);
                }
                self.loading = false;
                self.forecast = Some(Arc::new(forecast));
                self.suggestions_visible = false;
                self.error = None;
            }
            Transition::ForecastFailed { ticket, error } => {
                if !self.is_current_forecast(ticket) {
                    return self.ignore("forecast failure", ticket);
                }
                self.loading = false;
                self.forecast = None;
                self.error = Some(error);
            }
            Transition::LocationDenied { ticket } => {
                if !self.is_current_forecast(ticket) {
                    return self.ignore("location denial", ticket);
                }
                self.loading = false;
                self.error = Some(LookupError::GeolocationDenied);
            }
            Transition::LocationUnavailable { ticket } => {
                if !self.is_current_forecast(ticket) {
                    return self.ignore("location unavailability", ticket);
                }
                self.loading = false;
                self.error = Some(LookupError::GeolocationUnavailable);
            }
        }

        true
    }

    fn is_current_search(&self, ticket: Ticket) -> bool {
        self.search_ticket == Some(ticket)
    }

    fn is_current_forecast(&self, ticket: Ticket) -> bool {
        self.forecast_ticket == Some(ticket)
    }

    fn ignore(&self, what: &str, ticket: Ticket) -> bool {
        debug!(?ticket, what, "Ignoring superseded result");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LocationLabel;

    fn city(name: &str) -> CityCandidate {
        CityCandidate {
            name: name.to_string(),
            state: None,
            country_code: "DE".into(),
            country_name: "Germany".into(),
            latitude: 52.5,
            longitude: 13.4,
        }
    }

    fn forecast(name: &str) -> Forecast {
        Forecast {
            location: LocationLabel { name: name.to_string(), country_code: "DE".into() },
            utc_offset_secs: 3600,
            samples: Vec::new(),
        }
    }

    #[test]
    fn tickets_increase() {
        let tickets = Tickets::default();
        let a = tickets.next();
        let b = tickets.next();
        assert!(b > a);
    }

    #[test]
    fn search_then_suggestions() {
        let tickets = Tickets::default();
        let mut s = Session::new();

        let t = tickets.next();
        assert!(s.apply(Transition::SearchChanged { query: "Ber".into(), ticket: t }));
        assert!(s.is_searching());

        assert!(s.apply(Transition::SuggestionsLoaded { ticket: t, cities: vec![city("Berlin")] }));
        assert!(!s.is_searching());
        assert_eq!(s.visible_suggestions().len(), 1);
    }

    #[test]
    fn stale_suggestions_are_ignored() {
        let tickets = Tickets::default();
        let mut s = Session::new();

        let old = tickets.next();
        s.apply(Transition::SearchChanged { query: "Pa".into(), ticket: old });
        let new = tickets.next();
        s.apply(Transition::SearchChanged { query: "Par".into(), ticket: new });

        assert!(!s.apply(Transition::SuggestionsLoaded { ticket: old, cities: vec![city("Pasadena")] }));
        assert!(s.suggestions().is_empty());
        assert_eq!(s.query(), "Par");
    }

    #[test]
    fn short_query_is_not_searching() {
        let tickets = Tickets::default();
        let mut s = Session::new();
        s.apply(Transition::SearchChanged { query: "B".into(), ticket: tickets.next() });
        assert!(!s.is_searching());
        assert!(s.suggestions().is_empty());
    }

    #[test]
    fn picking_a_suggestion_closes_dropdown_and_drops_pending_search() {
        let tickets = Tickets::default();
        let mut s = Session::new();
        let t = tickets.next();
        s.apply(Transition::SearchChanged { query: "Ber".into(), ticket: t });
        s.apply(Transition::SuggestionPicked(city("Berlin")));

        assert_eq!(s.query(), "Berlin");
        assert!(s.visible_suggestions().is_empty());
        assert!(!s.apply(Transition::SuggestionsLoaded { ticket: t, cities: vec![city("Bern")] }));
    }

    #[test]
    fn forecast_lifecycle() {
        let tickets = Tickets::default();
        let mut s = Session::new();

        let t = tickets.next();
        s.apply(Transition::ForecastRequested { ticket: t });
        assert!(s.is_loading());

        s.apply(Transition::ForecastLoaded { ticket: t, forecast: forecast("Berlin") });
        assert!(!s.is_loading());
        assert_eq!(s.forecast().unwrap().location.name, "Berlin");
        assert!(s.error().is_none());
    }

    #[test]
    fn failure_clears_previous_forecast() {
        let tickets = Tickets::default();
        let mut s = Session::new();

        let first = tickets.next();
        s.apply(Transition::ForecastRequested { ticket: first });
        s.apply(Transition::ForecastLoaded { ticket: first, forecast: forecast("Berlin") });

        let second = tickets.next();
        s.apply(Transition::ForecastRequested { ticket: second });
        s.apply(Transition::ForecastFailed { ticket: second, error: LookupError::CityForecast });

        assert!(s.forecast().is_none());
        assert_eq!(s.error(), Some(&LookupError::CityForecast));
        assert!(!s.is_loading());
    }

    #[test]
    fn newer_request_wins_over_late_older_response() {
        let tickets = Tickets::default();
        let mut s = Session::new();

        let old = tickets.next();
        s.apply(Transition::ForecastRequested { ticket: old });
        let new = tickets.next();
        s.apply(Transition::ForecastRequested { ticket: new });

        assert!(s.apply(Transition::ForecastLoaded { ticket: new, forecast: forecast("Paris") }));
        assert!(!s.apply(Transition::ForecastLoaded { ticket: old, forecast: forecast("Berlin") }));
        assert!(!s.apply(Transition::ForecastFailed { ticket: old, error: LookupError::CityForecast }));

        assert_eq!(s.forecast().unwrap().location.name, "Paris");
        assert!(s.error().is_none());
    }

    #[test]
    fn location_denied_keeps_forecast_but_shows_message() {
        let tickets = Tickets::default();
        let mut s = Session::new();

        let first = tickets.next();
        s.apply(Transition::ForecastRequested { ticket: first });
        s.apply(Transition::ForecastLoaded { ticket: first, forecast: forecast("Berlin") });

        let second = tickets.next();
        s.apply(Transition::ForecastRequested { ticket: second });
        s.apply(Transition::LocationDenied { ticket: second });

        assert!(s.forecast().is_some());
        assert_eq!(s.error(), Some(&LookupError::GeolocationDenied));
        assert!(!s.is_loading());
    }

    #[test]
    fn search_failure_surfaces_message() {
        let tickets = Tickets::default();
        let mut s = Session::new();
        let t = tickets.next();
        s.apply(Transition::SearchChanged { query: "Lon".into(), ticket: t });
        s.apply(Transition::SearchFailed { ticket: t });

        assert_eq!(s.error(), Some(&LookupError::Search));
        assert!(s.suggestions().is_empty());
    }

    #[test]
    fn typing_again_clears_earlier_errors() {
        let tickets = Tickets::default();
        let mut s = Session::new();

        let fetch = tickets.next();
        s.apply(Transition::ForecastRequested { ticket: fetch });
        s.apply(Transition::ForecastFailed { ticket: fetch, error: LookupError::CityForecast });

        let search = tickets.next();
        s.apply(Transition::SearchChanged { query: "Rome".into(), ticket: search });
        assert!(s.error().is_none());

        s.apply(Transition::SuggestionsLoaded { ticket: search, cities: vec![city("Rome")] });
        assert!(s.error().is_none());
        assert_eq!(s.visible_suggestions().len(), 1);

        let retry = tickets.next();
        s.apply(Transition::SearchChanged { query: "Lon".into(), ticket: retry });
        s.apply(Transition::SearchFailed { ticket: retry });
        s.apply(Transition::SearchChanged { query: "Lond".into(), ticket: tickets.next() });
        assert!(s.error().is_none());
    }
}
