//! Widget state machine.
//!
//! All input handling is synchronous: [`App::update`] consumes a message,
//! mutates the state and returns the side effects the runtime must perform
//! (spawning a location probe or a fetch cycle). Time is passed in
//! explicitly so every transition is testable without a clock or a
//! terminal.

use std::time::{Duration, Instant};

use skycast_core::{
    Coordinates, FetchError, LocateError, Query, Scene, WeatherReport,
};
use tracing::debug;

/// Pause after the last keystroke before a typed city is fetched.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Everything that can happen to the widget.
#[derive(Debug)]
pub enum Msg {
    /// A printable character was typed into the search field.
    TypedChar(char),
    /// Backspace in the search field.
    Backspace,
    /// Enter in the search field.
    Submitted,
    /// One frame elapsed; deadlines may have come due.
    Tick,
    /// The location probe finished.
    Located(Result<Coordinates, LocateError>),
    /// A fetch cycle finished.
    Fetched {
        seq: u64,
        query: Query,
        outcome: Result<WeatherReport, FetchError>,
    },
}

/// Work the runtime must perform on behalf of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Probe the IP location service.
    Locate,
    /// Run one fetch cycle for `query`, reporting back with `seq`.
    Fetch { seq: u64, query: Query },
}

#[derive(Debug, Default)]
pub struct App {
    /// Contents of the search field.
    pub input: String,
    /// A fetch cycle is in flight.
    pub loading: bool,
    /// The startup location probe (or the fetch it triggered) is in flight.
    pub detecting: bool,
    /// Message of the last failed cycle. Mutually exclusive with `report`.
    pub error: Option<String>,
    /// Data of the last successful cycle. Mutually exclusive with `error`.
    pub report: Option<WeatherReport>,

    debounce_deadline: Option<Instant>,
    next_seq: u64,
    live_seq: Option<u64>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Startup transitions: optionally kick off location detection and/or
    /// an immediate fetch for a city given on the command line.
    pub fn start(
        &mut self,
        detect: bool,
        initial_city: Option<String>,
        now: Instant,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();

        if detect {
            self.detecting = true;
            self.debounce_deadline = None;
            effects.push(Effect::Locate);
        }

        if let Some(city) = initial_city {
            self.input = city;
            effects.extend(self.update(Msg::Submitted, now));
        }

        effects
    }

    /// Scene of the animated backdrop, derived from the visible conditions.
    pub fn scene(&self) -> Scene {
        self.report
            .as_ref()
            .map(|r| Scene::for_condition(&r.current.condition))
            .unwrap_or_default()
    }

    pub fn update(&mut self, msg: Msg, now: Instant) -> Vec<Effect> {
        match msg {
            Msg::TypedChar(c) => {
                self.input.push(c);
                self.input_changed(now);
                Vec::new()
            }

            Msg::Backspace => {
                self.input.pop();
                self.input_changed(now);
                Vec::new()
            }

            Msg::Submitted => {
                if self.input.trim().is_empty() {
                    return Vec::new();
                }
                // An explicit submit supersedes any pending debounce.
                self.debounce_deadline = None;
                vec![self.submit(Query::City(self.input.clone()))]
            }

            Msg::Tick => match self.debounce_deadline {
                Some(deadline) if now >= deadline => {
                    self.debounce_deadline = None;
                    vec![self.submit(Query::City(self.input.clone()))]
                }
                _ => Vec::new(),
            },

            Msg::Located(Ok(coords)) => {
                // `detecting` stays on through the fetch this triggers; it
                // is released when that cycle completes.
                debug!(lat = coords.lat, lon = coords.lon, "location detected");
                vec![self.submit(Query::Coords(coords))]
            }

            Msg::Located(Err(err)) => {
                // Detection failures downgrade to manual entry, silently.
                debug!(error = %err, "location detection failed");
                self.detecting = false;
                if !self.input.is_empty() {
                    self.debounce_deadline = Some(now + DEBOUNCE);
                }
                Vec::new()
            }

            Msg::Fetched {
                seq,
                query,
                outcome,
            } => {
                self.finish_cycle(seq, &query, outcome, now);
                Vec::new()
            }
        }
    }

    /// Re-evaluate the debounce deadline after the search field changed.
    fn input_changed(&mut self, now: Instant) {
        if self.input.is_empty() {
            self.debounce_deadline = None;
        } else if self.detecting {
            // Typing is allowed during detection but fetches are held back
            // until the probe resolves.
            self.debounce_deadline = None;
        } else {
            self.debounce_deadline = Some(now + DEBOUNCE);
        }
    }

    /// Begin a fetch cycle: flag it live, raise `loading`, clear the error.
    /// The previous report stays visible until the cycle completes.
    fn submit(&mut self, query: Query) -> Effect {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live_seq = Some(seq);

        self.loading = true;
        self.error = None;

        debug!(seq, query = %query, "fetch cycle submitted");
        Effect::Fetch { seq, query }
    }

    fn finish_cycle(
        &mut self,
        seq: u64,
        query: &Query,
        outcome: Result<WeatherReport, FetchError>,
        now: Instant,
    ) {
        // A coords cycle always releases the detection flag, stale or not;
        // nothing else will. Dropping the gate re-arms the debounce for
        // whatever the user typed in the meantime.
        if query.is_coords() && self.detecting {
            self.detecting = false;
            if !self.input.is_empty() {
                self.debounce_deadline = Some(now + DEBOUNCE);
            }
        }

        if self.live_seq != Some(seq) {
            debug!(seq, "discarding stale fetch result");
            return;
        }

        self.loading = false;

        match outcome {
            Ok(report) => {
                self.report = Some(report);
                self.error = None;
            }
            Err(err) => {
                debug!(seq, error = %err, "fetch cycle failed");
                self.error = Some(if query.is_coords() {
                    "Failed to get location weather".to_string()
                } else {
                    err.to_string()
                });
                self.report = None;
            }
        }
    }
}
