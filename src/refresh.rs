//! Periodic guide refresh
//!
//! Fetch and parse run on a worker thread; the result comes back over an mpsc
//! channel and is applied on the UI thread. At most one cycle is in flight,
//! so the snapshot is always the complete output of a single cycle.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::epg::{EpgData, EpgParser, FeedSource, RefreshError};
use crate::store::GuideStore;

/// Message from a worker back to the UI thread
struct RefreshOutcome {
    cycle: u64,
    result: Result<EpgData, RefreshError>,
    elapsed: Duration,
}

/// What `drain` did with an arrived outcome
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshEvent {
    Applied {
        cycle: u64,
        channels: usize,
        programs: usize,
        elapsed: Duration,
    },
    Failed {
        cycle: u64,
        error: String,
    },
    /// Arrived after a newer cycle was already applied
    Discarded { cycle: u64 },
}

/// Repaint hook so a finished worker can wake an idle UI
pub type Waker = Arc<dyn Fn() + Send + Sync>;

pub struct RefreshCoordinator {
    interval: Duration,
    sender: Sender<RefreshOutcome>,
    receiver: Receiver<RefreshOutcome>,
    next_cycle: u64,
    in_flight: Option<u64>,
    last_started: Option<Instant>,
    last_applied: u64,
    manual_requested: bool,
    waker: Option<Waker>,
}

impl RefreshCoordinator {
    pub fn new(interval: Duration) -> Self {
        let (sender, receiver) = channel();
        Self {
            interval,
            sender,
            receiver,
            next_cycle: 1,
            in_flight: None,
            last_started: None,
            last_applied: 0,
            manual_requested: false,
            waker: None,
        }
    }

    pub fn with_waker(mut self, waker: Waker) -> Self {
        self.waker = Some(waker);
        self
    }

    /// Ask for a cycle as soon as none is in flight
    pub fn request_now(&mut self) {
        self.manual_requested = true;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Time left until the next scheduled cycle (zero if overdue)
    pub fn time_until_due(&self, now: Instant) -> Duration {
        match self.last_started {
            Some(started) => (started + self.interval).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// A new cycle may start: nothing in flight, and either the first cycle,
    /// a manual request, or the interval has passed since the last start.
    /// A tick that lands while a cycle is running waits for it to finish.
    pub fn is_due(&self, now: Instant) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.manual_requested
            || match self.last_started {
                None => true,
                Some(started) => now.duration_since(started) >= self.interval,
            }
    }

    /// Spawn a worker for the next cycle and return its number
    pub fn start(&mut self, source: Arc<dyn FeedSource>, now: Instant) -> u64 {
        let cycle = self.next_cycle;
        self.next_cycle += 1;
        self.in_flight = Some(cycle);
        self.last_started = Some(now);
        self.manual_requested = false;

        tracing::info!(cycle, source = %source.describe(), "starting guide refresh");

        let sender = self.sender.clone();
        let waker = self.waker.clone();
        thread::spawn(move || {
            let began = Instant::now();
            let result = panic::catch_unwind(AssertUnwindSafe(|| run_cycle(source.as_ref())))
                .unwrap_or(Err(RefreshError::Panicked));
            let _ = sender.send(RefreshOutcome {
                cycle,
                result,
                elapsed: began.elapsed(),
            });
            if let Some(wake) = waker {
                wake();
            }
        });

        cycle
    }

    /// Apply every finished cycle to the store (non-blocking)
    pub fn drain(&mut self, store: &mut GuideStore) -> Vec<RefreshEvent> {
        let mut events = Vec::new();
        while let Ok(outcome) = self.receiver.try_recv() {
            events.push(self.apply(outcome, store));
        }
        events
    }

    fn apply(&mut self, outcome: RefreshOutcome, store: &mut GuideStore) -> RefreshEvent {
        if self.in_flight == Some(outcome.cycle) {
            self.in_flight = None;
        }

        if outcome.cycle <= self.last_applied {
            tracing::debug!(cycle = outcome.cycle, "discarding superseded refresh result");
            return RefreshEvent::Discarded { cycle: outcome.cycle };
        }

        match outcome.result {
            Ok(data) => {
                self.last_applied = outcome.cycle;
                let channels = data.channels.len();
                let programs = data.program_count();
                tracing::info!(
                    cycle = outcome.cycle,
                    channels,
                    programs,
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    "guide refreshed"
                );
                store.replace(data);
                RefreshEvent::Applied {
                    cycle: outcome.cycle,
                    channels,
                    programs,
                    elapsed: outcome.elapsed,
                }
            }
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(cycle = outcome.cycle, error = %error, "guide refresh failed, keeping previous data");
                store.record_failure(error.clone());
                RefreshEvent::Failed {
                    cycle: outcome.cycle,
                    error,
                }
            }
        }
    }
}

/// One fetch + parse, run on the worker thread
pub fn run_cycle(source: &dyn FeedSource) -> Result<EpgData, RefreshError> {
    let bytes = source.fetch()?;
    let data = EpgParser::parse_bytes(&bytes)?;
    Ok(data)
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
