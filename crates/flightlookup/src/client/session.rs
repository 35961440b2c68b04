//! Display state of one lookup session.
//!
//! [`Session::apply`] consumes an [`Event`] and returns the [`Effect`]s the
//! driver must carry out: arming or cancelling debounce timers and issuing
//! queries. The session never waits on anything itself, so every transition
//! can be exercised synchronously.
//!
//! Each outstanding query holds a ticket from a monotonic counter. A
//! response is applied only if its ticket is still the one awaited on its
//! channel; newer input, a newer query or a mode switch retires the ticket,
//! so out-of-order responses are dropped instead of overwriting newer state.

use std::fmt;

use tracing::debug;

use crate::airports::MIN_QUERY_LEN;
use crate::flights::{FlightQuery, RouteQuery};
use crate::model::{Airport, Flight};

/// Which kind of search the user is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMode {
    /// Search by flight number.
    #[default]
    FlightNumber,
    /// Search by date, origin and destination.
    Route,
}

/// An input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Flight number (flight-number mode).
    FlightNumber,
    /// Departure airport (route mode).
    Origin,
    /// Arrival airport (route mode).
    Destination,
    /// Flight date (route mode).
    Date,
}

impl Field {
    /// The mode this field belongs to.
    #[must_use]
    pub fn mode(self) -> SearchMode {
        match self {
            Self::FlightNumber => SearchMode::FlightNumber,
            Self::Origin | Self::Destination | Self::Date => SearchMode::Route,
        }
    }

    /// Whether typing in this field produces suggestions.
    #[must_use]
    pub fn has_suggestions(self) -> bool {
        !matches!(self, Self::Date)
    }

    const SUGGESTING: [Field; 3] = [Field::FlightNumber, Field::Origin, Field::Destination];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlightNumber => write!(f, "flight number"),
            Self::Origin => write!(f, "origin"),
            Self::Destination => write!(f, "destination"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// Where a suggesting field is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    /// Nothing pending or shown.
    #[default]
    Idle,
    /// A keystroke armed the debounce timer, or its query is in flight.
    DebouncePending,
    /// A suggestion list is visible.
    SuggestionsShown,
    /// A submitted search or picked suggestion is displayed.
    ResultShown,
}

/// User-facing status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A flight-number search found nothing.
    NoFlightsForNumber,
    /// A route search found nothing.
    NoFlightsForRoute,
    /// A search request failed.
    FetchFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFlightsForNumber => write!(f, "No flights found with that number."),
            Self::NoFlightsForRoute => write!(f, "No flights found for this route on that date."),
            Self::FetchFailed => write!(f, "An error occurred while fetching flight details."),
        }
    }
}

/// Identifies an outstanding query.
pub type Ticket = u64;

/// Something that happened to the session.
///
/// The first group comes from the user; the rest are produced by the driver
/// when timers fire and queries complete.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Switch between flight-number and route search.
    SetMode(SearchMode),
    /// The value of a field changed.
    Input {
        /// Field that changed.
        field: Field,
        /// Its full new value.
        value: String,
    },
    /// Choose the flight suggestion at this index.
    PickFlight(usize),
    /// Choose the airport suggestion at this index for a route field.
    PickAirport {
        /// `Origin` or `Destination`.
        field: Field,
        /// Index into that field's suggestions.
        index: usize,
    },
    /// Run the search for the current mode.
    Submit,
    /// A debounce timer elapsed.
    DebounceFired {
        /// Field whose timer fired.
        field: Field,
        /// Generation the timer was armed with.
        generation: u64,
    },
    /// Flight suggestions arrived.
    FlightSuggestions {
        /// Ticket of the query.
        ticket: Ticket,
        /// Suggestions, or the failure description.
        result: Result<Vec<Flight>, String>,
    },
    /// Airport suggestions arrived.
    AirportSuggestions {
        /// Field the query was for.
        field: Field,
        /// Ticket of the query.
        ticket: Ticket,
        /// Suggestions, or the failure description.
        result: Result<Vec<Airport>, String>,
    },
    /// Search results arrived.
    Results {
        /// Ticket of the query.
        ticket: Ticket,
        /// Flights, or the failure description.
        result: Result<Vec<Flight>, String>,
    },
}

impl Event {
    /// Whether the event comes from the user rather than a timer or query.
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(
            self,
            Self::SetMode(_)
                | Self::Input { .. }
                | Self::PickFlight(_)
                | Self::PickAirport { .. }
                | Self::Submit
        )
    }
}

/// Work the driver must perform after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the field's debounce timer with a new one.
    ArmTimer {
        /// Field to debounce.
        field: Field,
        /// Generation to report back in [`Event::DebounceFired`].
        generation: u64,
    },
    /// Drop the field's pending debounce timer.
    CancelTimer(Field),
    /// Fetch did-you-mean flights for `text`.
    FetchFlightSuggestions {
        /// Ticket to report back.
        ticket: Ticket,
        /// Typed text.
        text: String,
    },
    /// Fetch airports matching `text` for `field`.
    FetchAirports {
        /// Route field being completed.
        field: Field,
        /// Ticket to report back.
        ticket: Ticket,
        /// Typed text.
        text: String,
    },
    /// Run a flight search.
    FetchFlights {
        /// Ticket to report back.
        ticket: Ticket,
        /// The search.
        query: FlightQuery,
    },
}

/// Per-field bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
struct FieldSlot {
    value: String,
    state: FieldState,
    generation: u64,
    awaiting: Option<Ticket>,
}

/// All display state of one lookup session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    mode: SearchMode,
    flight_number: FieldSlot,
    origin: FieldSlot,
    destination: FieldSlot,
    date: FieldSlot,
    flight_suggestions: Vec<Flight>,
    origin_suggestions: Vec<Airport>,
    destination_suggestions: Vec<Airport>,
    results: Vec<Flight>,
    notice: Option<Notice>,
    loading: bool,
    awaiting_results: Option<Ticket>,
    next_ticket: Ticket,
    user_events: u64,
}

impl Session {
    /// Create an idle session in flight-number mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current search mode.
    #[must_use]
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Current value of a field.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        &self.slot(field).value
    }

    /// Lifecycle state of a field.
    #[must_use]
    pub fn field_state(&self, field: Field) -> FieldState {
        self.slot(field).state
    }

    /// Visible flight suggestions.
    #[must_use]
    pub fn flight_suggestions(&self) -> &[Flight] {
        &self.flight_suggestions
    }

    /// Visible airport suggestions for a route field.
    #[must_use]
    pub fn airport_suggestions(&self, field: Field) -> &[Airport] {
        match field {
            Field::Origin => &self.origin_suggestions,
            Field::Destination => &self.destination_suggestions,
            Field::FlightNumber | Field::Date => &[],
        }
    }

    /// Displayed search results.
    #[must_use]
    pub fn results(&self) -> &[Flight] {
        &self.results
    }

    /// Displayed status line, if any.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    /// Whether a submitted search is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Number of user events applied so far.
    #[must_use]
    pub fn user_events(&self) -> u64 {
        self.user_events
    }

    /// Apply one event and return the resulting work.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        if event.is_user() {
            self.user_events += 1;
        }
        match event {
            Event::SetMode(mode) => self.set_mode(mode),
            Event::Input { field, value } => self.input(field, value),
            Event::PickFlight(index) => self.pick_flight(index),
            Event::PickAirport { field, index } => self.pick_airport(field, index),
            Event::Submit => self.submit(),
            Event::DebounceFired { field, generation } => self.debounce_fired(field, generation),
            Event::FlightSuggestions { ticket, result } => {
                self.flight_suggestions_loaded(ticket, result);
                Vec::new()
            }
            Event::AirportSuggestions {
                field,
                ticket,
                result,
            } => {
                self.airport_suggestions_loaded(field, ticket, result);
                Vec::new()
            }
            Event::Results { ticket, result } => {
                self.results_loaded(ticket, result);
                Vec::new()
            }
        }
    }

    fn set_mode(&mut self, mode: SearchMode) -> Vec<Effect> {
        if mode == self.mode {
            return Vec::new();
        }
        self.mode = mode;
        self.results.clear();
        self.notice = None;
        self.loading = false;
        self.awaiting_results = None;

        let mut effects = Vec::new();
        for field in Field::SUGGESTING {
            if self.slot(field).state == FieldState::DebouncePending {
                effects.push(Effect::CancelTimer(field));
            }
            self.reset_suggestions(field);
        }
        effects
    }

    fn input(&mut self, field: Field, value: String) -> Vec<Effect> {
        if field.mode() != self.mode {
            debug!(%field, "ignoring input for a field outside the current mode");
            return Vec::new();
        }

        self.slot_mut(field).value = value;
        if !field.has_suggestions() {
            return Vec::new();
        }

        self.clear_suggestion_list(field);
        let slot = self.slot_mut(field);
        slot.awaiting = None;
        slot.generation += 1;
        slot.state = FieldState::DebouncePending;
        vec![Effect::ArmTimer {
            field,
            generation: slot.generation,
        }]
    }

    fn debounce_fired(&mut self, field: Field, generation: u64) -> Vec<Effect> {
        let slot = self.slot(field);
        if slot.generation != generation || slot.state != FieldState::DebouncePending {
            debug!(%field, generation, "dropping superseded debounce timer");
            return Vec::new();
        }

        let text = slot.value.trim().to_string();
        let min_len = if field == Field::FlightNumber { 1 } else { MIN_QUERY_LEN };
        if text.chars().count() < min_len {
            self.slot_mut(field).state = FieldState::Idle;
            return Vec::new();
        }

        let ticket = self.issue_ticket();
        self.slot_mut(field).awaiting = Some(ticket);
        let effect = if field == Field::FlightNumber {
            Effect::FetchFlightSuggestions { ticket, text }
        } else {
            Effect::FetchAirports {
                field,
                ticket,
                text,
            }
        };
        vec![effect]
    }

    fn flight_suggestions_loaded(&mut self, ticket: Ticket, result: Result<Vec<Flight>, String>) {
        if !self.accept(Field::FlightNumber, ticket) {
            return;
        }
        match result {
            Ok(flights) if !flights.is_empty() => {
                self.flight_suggestions = flights;
                self.flight_number.state = FieldState::SuggestionsShown;
            }
            Ok(_) => self.flight_number.state = FieldState::Idle,
            Err(e) => {
                debug!(error = %e, "flight suggestions failed");
                self.flight_number.state = FieldState::Idle;
            }
        }
    }

    fn airport_suggestions_loaded(
        &mut self,
        field: Field,
        ticket: Ticket,
        result: Result<Vec<Airport>, String>,
    ) {
        if !matches!(field, Field::Origin | Field::Destination) || !self.accept(field, ticket) {
            return;
        }
        let airports = match result {
            Ok(airports) => airports,
            Err(e) => {
                debug!(%field, error = %e, "airport suggestions failed");
                Vec::new()
            }
        };
        self.slot_mut(field).state = if airports.is_empty() {
            FieldState::Idle
        } else {
            FieldState::SuggestionsShown
        };
        if field == Field::Origin {
            self.origin_suggestions = airports;
        } else {
            self.destination_suggestions = airports;
        }
    }

    fn pick_flight(&mut self, index: usize) -> Vec<Effect> {
        if self.mode != SearchMode::FlightNumber {
            return Vec::new();
        }
        let Some(flight) = self.flight_suggestions.get(index).cloned() else {
            return Vec::new();
        };
        self.flight_suggestions.clear();
        self.flight_number.value.clone_from(&flight.flight_number);
        self.flight_number.state = FieldState::ResultShown;
        self.results = vec![flight];
        self.notice = None;
        self.loading = false;
        self.awaiting_results = None;
        Vec::new()
    }

    fn pick_airport(&mut self, field: Field, index: usize) -> Vec<Effect> {
        if self.mode != SearchMode::Route {
            return Vec::new();
        }
        let Some(label) = self.airport_suggestions(field).get(index).map(Airport::label) else {
            return Vec::new();
        };
        let pending = self.slot(field).state == FieldState::DebouncePending;
        self.reset_suggestions(field);
        let slot = self.slot_mut(field);
        slot.value = label;
        slot.generation += 1;
        if pending {
            vec![Effect::CancelTimer(field)]
        } else {
            Vec::new()
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        let query = match self.mode {
            SearchMode::FlightNumber => {
                let number = self.flight_number.value.trim();
                if number.is_empty() {
                    return Vec::new();
                }
                FlightQuery::Number(number.to_string())
            }
            SearchMode::Route => FlightQuery::Route(RouteQuery::new(
                &self.date.value,
                &self.origin.value,
                &self.destination.value,
            )),
        };

        let fields: &[Field] = match self.mode {
            SearchMode::FlightNumber => &[Field::FlightNumber],
            SearchMode::Route => &[Field::Origin, Field::Destination],
        };
        let mut effects = Vec::new();
        for &field in fields {
            if self.slot(field).state == FieldState::DebouncePending {
                effects.push(Effect::CancelTimer(field));
            }
            self.reset_suggestions(field);
        }

        let ticket = self.issue_ticket();
        self.awaiting_results = Some(ticket);
        self.loading = true;
        self.results.clear();
        self.notice = None;
        effects.push(Effect::FetchFlights { ticket, query });
        effects
    }

    fn results_loaded(&mut self, ticket: Ticket, result: Result<Vec<Flight>, String>) {
        if self.awaiting_results != Some(ticket) {
            debug!(ticket, "dropping stale search results");
            return;
        }
        self.awaiting_results = None;
        self.loading = false;

        match result {
            Ok(flights) => {
                if flights.is_empty() {
                    self.notice = Some(match self.mode {
                        SearchMode::FlightNumber => Notice::NoFlightsForNumber,
                        SearchMode::Route => Notice::NoFlightsForRoute,
                    });
                }
                self.results = flights;
            }
            Err(e) => {
                debug!(error = %e, "search failed");
                self.results.clear();
                self.notice = Some(Notice::FetchFailed);
            }
        }

        // A field typed into since the submit keeps its own cycle.
        for field in Field::SUGGESTING {
            if field.mode() != self.mode {
                continue;
            }
            let slot = self.slot_mut(field);
            if slot.state == FieldState::Idle {
                slot.state = FieldState::ResultShown;
            }
        }
    }

    fn accept(&mut self, field: Field, ticket: Ticket) -> bool {
        let slot = self.slot_mut(field);
        if slot.awaiting == Some(ticket) {
            slot.awaiting = None;
            true
        } else {
            debug!(%field, ticket, "dropping stale suggestions");
            false
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn clear_suggestion_list(&mut self, field: Field) {
        match field {
            Field::FlightNumber => self.flight_suggestions.clear(),
            Field::Origin => self.origin_suggestions.clear(),
            Field::Destination => self.destination_suggestions.clear(),
            Field::Date => {}
        }
    }

    fn reset_suggestions(&mut self, field: Field) {
        self.clear_suggestion_list(field);
        let slot = self.slot_mut(field);
        slot.awaiting = None;
        slot.state = FieldState::Idle;
    }

    fn slot(&self, field: Field) -> &FieldSlot {
        match field {
            Field::FlightNumber => &self.flight_number,
            Field::Origin => &self.origin,
            Field::Destination => &self.destination,
            Field::Date => &self.date,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut FieldSlot {
        match field {
            Field::FlightNumber => &mut self.flight_number,
            Field::Origin => &mut self.origin,
            Field::Destination => &mut self.destination,
            Field::Date => &mut self.date,
        }
    }
}
