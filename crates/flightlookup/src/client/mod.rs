//! Interactive lookup client.
//!
//! A [`LookupClient`] owns one [`Session`] inside a background task. User
//! events are sent over a channel; the task applies them, runs the debounce
//! timers and backend queries the session asks for, and feeds their outcomes
//! back in as further events. Every settled state is published on a
//! [`watch`] channel.

mod backend;
mod session;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

pub use backend::{HttpBackend, LookupBackend};
pub use session::{Effect, Event, Field, FieldState, Notice, SearchMode, Session, Ticket};

use crate::config::Config;
use crate::error::{Error, Result};

/// Quiet periods before a suggestion query is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTiming {
    /// Delay for the flight-number field.
    pub flight: Duration,
    /// Delay for the origin and destination fields.
    pub airport: Duration,
}

impl Default for DebounceTiming {
    fn default() -> Self {
        Self {
            flight: Duration::from_millis(500),
            airport: Duration::from_millis(300),
        }
    }
}

impl DebounceTiming {
    /// Timing from the `[client]` configuration section.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            flight: config.flight_debounce(),
            airport: config.airport_debounce(),
        }
    }

    fn for_field(self, field: Field) -> Duration {
        match field {
            Field::FlightNumber => self.flight,
            Field::Origin | Field::Destination | Field::Date => self.airport,
        }
    }
}

/// Handle to a running lookup session.
#[derive(Debug)]
pub struct LookupClient {
    events: mpsc::UnboundedSender<Event>,
    sent: AtomicU64,
    state: watch::Receiver<Session>,
    task: JoinHandle<()>,
}

impl LookupClient {
    /// Start a session that queries `backend`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(backend: Arc<dyn LookupBackend>, timing: DebounceTiming) -> Self {
        let (events, receiver) = mpsc::unbounded_channel();
        let (state_sender, state) = watch::channel(Session::new());
        let driver = Driver {
            session: Session::new(),
            backend,
            timing,
            timers: HashMap::new(),
            events: events.downgrade(),
            state: state_sender,
        };
        let task = tokio::spawn(driver.run(receiver));
        Self {
            events,
            sent: AtomicU64::new(0),
            state,
            task,
        }
    }

    /// Queue an event for the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session task has stopped.
    pub fn send(&self, event: Event) -> Result<()> {
        let user = event.is_user();
        self.events
            .send(event)
            .map_err(|_| Error::internal("lookup session has stopped"))?;
        if user {
            self.sent.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    /// Switch search mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the session task has stopped.
    pub fn set_mode(&self, mode: SearchMode) -> Result<()> {
        self.send(Event::SetMode(mode))
    }

    /// Replace the value of a field.
    ///
    /// # Errors
    ///
    /// Returns an error if the session task has stopped.
    pub fn input(&self, field: Field, value: impl Into<String>) -> Result<()> {
        self.send(Event::Input {
            field,
            value: value.into(),
        })
    }

    /// Choose a flight suggestion.
    ///
    /// # Errors
    ///
    /// Returns an error if the session task has stopped.
    pub fn pick_flight(&self, index: usize) -> Result<()> {
        self.send(Event::PickFlight(index))
    }

    /// Choose an airport suggestion for `field`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session task has stopped.
    pub fn pick_airport(&self, field: Field, index: usize) -> Result<()> {
        self.send(Event::PickAirport { field, index })
    }

    /// Run the search for the current mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the session task has stopped.
    pub fn submit(&self) -> Result<()> {
        self.send(Event::Submit)
    }

    /// Snapshot of the latest published state.
    #[must_use]
    pub fn state(&self) -> Session {
        self.state.borrow().clone()
    }

    /// A receiver that observes every published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.clone()
    }

    /// Wait until the published state satisfies `condition`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session task stops first.
    pub async fn wait_until<F>(&self, mut condition: F) -> Result<Session>
    where
        F: FnMut(&Session) -> bool,
    {
        let mut state = self.state.clone();
        let session = state
            .wait_for(|s| condition(s))
            .await
            .map_err(|_| Error::internal("lookup session has stopped"))?;
        Ok(session.clone())
    }

    /// Wait until every user event sent so far has been applied and the
    /// resulting state satisfies `condition`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session task stops first.
    pub async fn settle<F>(&self, mut condition: F) -> Result<Session>
    where
        F: FnMut(&Session) -> bool,
    {
        let sent = self.sent.load(Ordering::SeqCst);
        self.wait_until(|s| s.user_events() >= sent && condition(s))
            .await
    }

    /// Stop the session, dropping any pending timers and queries.
    ///
    /// # Errors
    ///
    /// Returns an error if the session task panicked.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.events);
        self.task
            .await
            .map_err(|e| Error::internal(format!("lookup session task failed: {e}")))
    }
}

struct Driver {
    session: Session,
    backend: Arc<dyn LookupBackend>,
    timing: DebounceTiming,
    timers: HashMap<Field, JoinHandle<()>>,
    // Weak so the loop ends once the client handle is gone
    events: mpsc::WeakUnboundedSender<Event>,
    state: watch::Sender<Session>,
}

impl Driver {
    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<Event>) {
        debug!("lookup session started");
        while let Some(event) = receiver.recv().await {
            trace!(?event, "session event");
            for effect in self.session.apply(event) {
                self.perform(effect);
            }
            self.timers.retain(|_, timer| !timer.is_finished());
            self.state.send_replace(self.session.clone());
        }
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
        debug!("lookup session stopped");
    }

    fn perform(&mut self, effect: Effect) {
        trace!(?effect, "session effect");
        match effect {
            Effect::ArmTimer { field, generation } => {
                let delay = self.timing.for_field(field);
                let events = self.events.clone();
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    deliver(&events, Event::DebounceFired { field, generation });
                });
                if let Some(previous) = self.timers.insert(field, timer) {
                    previous.abort();
                }
            }
            Effect::CancelTimer(field) => {
                if let Some(timer) = self.timers.remove(&field) {
                    timer.abort();
                }
            }
            Effect::FetchFlightSuggestions { ticket, text } => {
                self.query(move |backend| async move {
                    let result = backend.flight_suggestions(&text).await;
                    Event::FlightSuggestions {
                        ticket,
                        result: result.map_err(|e| e.to_string()),
                    }
                });
            }
            Effect::FetchAirports {
                field,
                ticket,
                text,
            } => {
                self.query(move |backend| async move {
                    let result = backend.search_airports(&text).await;
                    Event::AirportSuggestions {
                        field,
                        ticket,
                        result: result.map_err(|e| e.to_string()),
                    }
                });
            }
            Effect::FetchFlights { ticket, query } => {
                self.query(move |backend| async move {
                    let result = backend.search_flights(&query).await;
                    Event::Results {
                        ticket,
                        result: result.map_err(|e| e.to_string()),
                    }
                });
            }
        }
    }

    /// Run a backend call in its own task and report its outcome.
    fn query<F, Fut>(&self, call: F)
    where
        F: FnOnce(Arc<dyn LookupBackend>) -> Fut,
        Fut: std::future::Future<Output = Event> + Send + 'static,
    {
        let future = call(Arc::clone(&self.backend));
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = future.await;
            deliver(&events, event);
        });
    }
}

fn deliver(events: &mpsc::WeakUnboundedSender<Event>, event: Event) {
    if let Some(sender) = events.upgrade() {
        let _ = sender.send(event);
    }
}
