//! Application loop: startup sequencing and the steady-state tick.
//!
//! One [`App::tick`] per loop pass advances connectivity, pumps the
//! subscriber, and refreshes the presenter. Startup ordering is strict:
//!
//! ```text
//! Booting -> WifiConnecting -> TimeSyncing -> Running
//! ```
//!
//! The WiFi link must be up before time sync starts, and time sync must
//! finish (synced or budget exhausted) before `Running`, because the chrome
//! row shown in `Running` assumes both have been attempted. `Running` is
//! terminal: link drops and broker drops are handled by retry budgets and
//! status flags, never by leaving the phase.
//!
//! No tick blocks and no error halts the loop - every failure degrades to a
//! status glyph and a retry schedule.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::Millis;
use crate::config::Config;
use crate::presenter::{Presenter, Stage};
use crate::reading::{DecodeError, Reading, decode_reading};
use crate::retry::RetryBudget;
use crate::status::{ConnState, ConnectivityStatus};
use crate::telemetry::{Subscriber, SubscriberEvent, TelemetryTransport};
use crate::timesync::{SyncEvent, TimeService, TimeSync};
use crate::wallclock::WallClock;

/// Why a WiFi join attempt failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkError {
    /// Association/authentication with the access point failed.
    JoinFailed,
    /// Associated but no address was acquired.
    NoAddress,
}

/// Collaborator seam for the network link (CYW43 + DHCP on target, a fake in
/// tests). All calls are non-blocking.
pub trait NetworkLink {
    /// Fire one join attempt. Only called when down and the retry budget
    /// allows it.
    fn start_connect(&mut self);
    /// Take the result of the in-flight attempt, if it has completed.
    fn poll_connect(&mut self) -> Option<Result<(), LinkError>>;
    /// Level state of the link.
    fn is_up(&self) -> bool;
}

/// Link changes surfaced by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    Up,
    AttemptFailed(LinkError),
    Lost,
}

/// Global application phase. Only startup transitions exist; `Running` never
/// goes back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Booting,
    WifiConnecting,
    TimeSyncing,
    Running,
}

/// Everything notable that happened in one tick, for binary-side logging.
/// The core stays log-free; the firmware turns this into defmt lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickOutcome {
    pub phase_changed: Option<Phase>,
    pub link_event: Option<LinkEvent>,
    pub sync_event: Option<SyncEvent>,
    pub subscriber_event: Option<SubscriberEvent>,
    pub reading_decoded: bool,
    pub decode_failed: Option<DecodeError>,
}

/// The coordinating driver. Owns the only mutable copy of every piece of
/// shared state (current reading, display mode via the presenter, retry
/// budgets); collaborators are borrowed per tick.
pub struct App {
    config: Config,
    phase: Phase,
    link_state: ConnState,
    link_retry: RetryBudget,
    timesync: TimeSync,
    clock: WallClock,
    subscriber: Subscriber,
    presenter: Presenter,
    latest: Option<Reading>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            phase: Phase::Booting,
            link_state: ConnState::Disconnected,
            link_retry: RetryBudget::unbounded(config.link_retry_delay_ms),
            timesync: TimeSync::new(&config),
            clock: WallClock::new(config.zone_offset_seconds),
            subscriber: Subscriber::new(&config),
            presenter: Presenter::new(&config),
            latest: None,
            config,
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The current reading, if any ever decoded.
    pub fn latest_reading(&self) -> Option<&Reading> {
        self.latest.as_ref()
    }

    /// Advance everything by one tick and repaint changed display regions.
    pub fn tick<D, L, T, M>(
        &mut self,
        now: Millis,
        display: &mut D,
        link: &mut L,
        time: &mut T,
        transport: &mut M,
    ) -> TickOutcome
    where
        D: DrawTarget<Color = Rgb565>,
        L: NetworkLink,
        T: TimeService,
        M: TelemetryTransport,
    {
        let mut outcome = TickOutcome::default();

        match self.phase {
            Phase::Booting => {
                self.enter(Phase::WifiConnecting, &mut outcome);
                outcome.link_event = self.pump_link(now, link);
            }
            Phase::WifiConnecting => {
                outcome.link_event = self.pump_link(now, link);
                if self.link_state == ConnState::Connected {
                    self.presenter.show_notice("WIFI OK", now);
                    self.enter(Phase::TimeSyncing, &mut outcome);
                }
            }
            Phase::TimeSyncing => {
                outcome.sync_event = self.pump_timesync(now, time);
                if self.timesync.startup_done() {
                    self.enter(Phase::Running, &mut outcome);
                }
            }
            Phase::Running => {
                outcome.link_event = self.pump_link(now, link);
                outcome.sync_event = self.pump_timesync(now, time);

                let (event, payload) = self.subscriber.tick(now, transport);
                if event == Some(SubscriberEvent::Connected) {
                    self.presenter.show_notice("MQTT OK", now);
                }
                outcome.subscriber_event = event;

                if let Some(payload) = payload {
                    match decode_reading(&payload, now) {
                        Ok(reading) => {
                            self.latest = Some(reading);
                            outcome.reading_decoded = true;
                        }
                        // Malformed message: keep the last good reading so
                        // the display never flickers to "no data".
                        Err(err) => outcome.decode_failed = Some(err),
                    }
                }
            }
        }

        let stage = match self.phase {
            Phase::Booting | Phase::WifiConnecting => Stage::WifiConnecting,
            Phase::TimeSyncing => Stage::TimeSyncing {
                attempt: self.timesync.attempts_made(),
                max: self.config.time_sync_max_attempts,
            },
            Phase::Running => Stage::Live(self.latest.as_ref()),
        };
        let status = ConnectivityStatus {
            link: self.link_state,
            broker: self.subscriber.state(),
            time: self.timesync.state(),
        };
        self.presenter.refresh(display, now, stage, &status, &self.clock);

        outcome
    }

    fn enter(&mut self, phase: Phase, outcome: &mut TickOutcome) {
        self.phase = phase;
        outcome.phase_changed = Some(phase);
    }

    /// Drive the link through one non-blocking step: collect an in-flight
    /// attempt, detect drops, or begin the next eligible attempt.
    fn pump_link<L: NetworkLink>(&mut self, now: Millis, link: &mut L) -> Option<LinkEvent> {
        match self.link_state {
            ConnState::Connecting => match link.poll_connect()? {
                Ok(()) => {
                    self.link_state = ConnState::Connected;
                    self.link_retry.reset();
                    Some(LinkEvent::Up)
                }
                Err(err) => {
                    self.link_state = ConnState::Disconnected;
                    Some(LinkEvent::AttemptFailed(err))
                }
            },
            ConnState::Connected => {
                if link.is_up() {
                    None
                } else {
                    self.link_state = ConnState::Disconnected;
                    Some(LinkEvent::Lost)
                }
            }
            ConnState::Disconnected | ConnState::Failed => {
                if self.link_retry.ready(now) {
                    self.link_retry.begin_attempt(now);
                    self.link_state = ConnState::Connecting;
                    link.start_connect();
                }
                None
            }
        }
    }

    fn pump_timesync<T: TimeService>(&mut self, now: Millis, time: &mut T) -> Option<SyncEvent> {
        let event = self.timesync.tick(now, time, &mut self.clock);
        match event {
            Some(SyncEvent::Synced) => self.presenter.show_notice("TIME OK", now),
            Some(SyncEvent::Exhausted) => self.presenter.show_notice("TIME FAIL", now),
            _ => {}
        }
        event
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
