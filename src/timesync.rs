//! Clock synchronization state machine.
//!
//! Startup behaviour: up to a configured number of query attempts, paced by a
//! fixed delay. If every attempt fails the device keeps running with an
//! unsynced clock (the presenter shows a fallback string) - sync failure is
//! never fatal.
//!
//! After startup (success or exhausted budget), the clock is refreshed on a
//! fixed period. A failed refresh leaves the previous anchor in place and is
//! reported so the binary can log it; retries wait for the next period.
//!
//! The actual time query is behind [`TimeService`]: fire with
//! [`TimeService::start_query`], collect with [`TimeService::poll_result`].
//! Exactly one query is in flight at any time.

use crate::Millis;
use crate::config::Config;
use crate::retry::RetryBudget;
use crate::status::ConnState;
use crate::wallclock::WallClock;

/// Why a time query failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeError {
    /// Server name did not resolve.
    Lookup,
    /// No response within the query timeout.
    Timeout,
    /// Response arrived but was not a usable time packet.
    Protocol,
}

/// Collaborator seam for the time service client (SNTP on target, a fake in
/// tests). Both calls are non-blocking.
pub trait TimeService {
    /// Fire one query. Only called when no query is in flight.
    fn start_query(&mut self);
    /// Take the result of the in-flight query, if it has completed.
    fn poll_result(&mut self) -> Option<Result<u64, TimeError>>;
}

/// Outcome of one tick, for binary-side logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncEvent {
    /// Clock anchored (startup attempt or periodic refresh).
    Synced,
    /// A startup attempt failed; more budget remains.
    AttemptFailed(TimeError),
    /// Startup budget exhausted; running degraded until a periodic refresh
    /// succeeds.
    Exhausted,
    /// A periodic refresh failed; previous anchor retained.
    RefreshFailed(TimeError),
}

/// Poll-based sync driver. Owns the retry budget and refresh schedule; the
/// application loop owns the [`WallClock`] it feeds.
pub struct TimeSync {
    budget: RetryBudget,
    refresh_interval_ms: u64,
    state: ConnState,
    in_flight: bool,
    startup_done: bool,
    next_refresh_at: Millis,
}

impl TimeSync {
    pub fn new(config: &Config) -> Self {
        Self {
            budget: RetryBudget::bounded(
                config.time_sync_max_attempts,
                config.time_sync_retry_delay_ms,
            ),
            refresh_interval_ms: config.time_refresh_interval_ms,
            state: ConnState::Disconnected,
            in_flight: false,
            startup_done: false,
            next_refresh_at: 0,
        }
    }

    /// Whether the startup sequence has finished (synced or gave up). The
    /// application loop holds the `TimeSyncing` phase open until this flips.
    pub const fn startup_done(&self) -> bool {
        self.startup_done
    }

    /// Current state for the chrome-row glyph.
    pub const fn state(&self) -> ConnState {
        self.state
    }

    /// Startup attempts made so far (shown in the boot status line).
    pub const fn attempts_made(&self) -> u32 {
        self.budget.attempts_made()
    }

    /// Advance the state machine by one tick.
    pub fn tick<S: TimeService>(
        &mut self,
        now: Millis,
        service: &mut S,
        clock: &mut WallClock,
    ) -> Option<SyncEvent> {
        if self.in_flight {
            let result = service.poll_result()?;
            self.in_flight = false;
            return Some(self.finish_attempt(now, result, clock));
        }

        if !self.startup_done {
            if self.budget.ready(now) {
                self.budget.begin_attempt(now);
                self.state = ConnState::Connecting;
                self.in_flight = true;
                service.start_query();
            }
        } else if now >= self.next_refresh_at {
            self.next_refresh_at = now + self.refresh_interval_ms;
            self.in_flight = true;
            service.start_query();
        }
        None
    }

    fn finish_attempt(
        &mut self,
        now: Millis,
        result: Result<u64, TimeError>,
        clock: &mut WallClock,
    ) -> SyncEvent {
        match result {
            Ok(epoch) => {
                clock.set(epoch, now);
                self.state = ConnState::Connected;
                if !self.startup_done {
                    self.startup_done = true;
                    self.next_refresh_at = now + self.refresh_interval_ms;
                }
                self.budget.reset();
                SyncEvent::Synced
            }
            Err(err) if !self.startup_done => {
                if self.budget.exhausted() {
                    self.startup_done = true;
                    self.state = ConnState::Failed;
                    self.next_refresh_at = now + self.refresh_interval_ms;
                    SyncEvent::Exhausted
                } else {
                    self.state = ConnState::Disconnected;
                    SyncEvent::AttemptFailed(err)
                }
            }
            Err(err) => SyncEvent::RefreshFailed(err),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Completes every query one poll later with the scripted result.
    struct FakeTimeService {
        queries_started: u32,
        pending: Option<Result<u64, TimeError>>,
        script: Vec<Result<u64, TimeError>>,
    }

    impl FakeTimeService {
        fn new(script: Vec<Result<u64, TimeError>>) -> Self {
            Self {
                queries_started: 0,
                pending: None,
                script,
            }
        }

        fn always_failing() -> Self {
            Self::new(Vec::new())
        }
    }

    impl TimeService for FakeTimeService {
        fn start_query(&mut self) {
            self.queries_started += 1;
            self.pending = Some(if self.script.is_empty() {
                Err(TimeError::Timeout)
            } else {
                self.script.remove(0)
            });
        }

        fn poll_result(&mut self) -> Option<Result<u64, TimeError>> {
            self.pending.take()
        }
    }

    fn test_config() -> Config {
        Config {
            time_sync_max_attempts: 3,
            time_sync_retry_delay_ms: 1_000,
            time_refresh_interval_ms: 60_000,
            ..Config::DEFAULT
        }
    }

    /// Drive ticks until an event appears or the step limit is hit.
    fn run_until_event(
        sync: &mut TimeSync,
        service: &mut FakeTimeService,
        clock: &mut WallClock,
        now: &mut Millis,
    ) -> Option<SyncEvent> {
        for _ in 0..10_000 {
            if let Some(event) = sync.tick(*now, service, clock) {
                return Some(event);
            }
            *now += 100;
        }
        None
    }

    #[test]
    fn test_startup_success_anchors_clock() {
        let config = test_config();
        let mut sync = TimeSync::new(&config);
        let mut service = FakeTimeService::new(vec![Ok(1_700_000_000)]);
        let mut clock = WallClock::new(0);
        let mut now = 0;

        let event = run_until_event(&mut sync, &mut service, &mut clock, &mut now);
        assert_eq!(event, Some(SyncEvent::Synced));
        assert!(clock.is_synced());
        assert!(sync.startup_done());
        assert_eq!(sync.state(), ConnState::Connected);
        assert_eq!(service.queries_started, 1);
    }

    #[test]
    fn test_startup_stops_after_exactly_max_attempts() {
        let config = test_config();
        let mut sync = TimeSync::new(&config);
        let mut service = FakeTimeService::always_failing();
        let mut clock = WallClock::new(0);
        let mut now = 0;

        let mut events = Vec::new();
        while !sync.startup_done() {
            if let Some(event) = sync.tick(now, &mut service, &mut clock) {
                events.push(event);
            }
            now += 100;
        }

        assert_eq!(service.queries_started, 3);
        assert_eq!(
            events,
            vec![
                SyncEvent::AttemptFailed(TimeError::Timeout),
                SyncEvent::AttemptFailed(TimeError::Timeout),
                SyncEvent::Exhausted,
            ]
        );
        assert_eq!(sync.state(), ConnState::Failed);
        assert!(!clock.is_synced());
    }

    #[test]
    fn test_startup_attempts_are_paced() {
        let config = test_config();
        let mut sync = TimeSync::new(&config);
        let mut service = FakeTimeService::always_failing();
        let mut clock = WallClock::new(0);

        // First attempt fires immediately; the second must wait out the
        // configured delay even though the failure lands right away.
        sync.tick(0, &mut service, &mut clock);
        assert_eq!(service.queries_started, 1);
        assert_eq!(
            sync.tick(100, &mut service, &mut clock),
            Some(SyncEvent::AttemptFailed(TimeError::Timeout))
        );
        sync.tick(900, &mut service, &mut clock);
        assert_eq!(service.queries_started, 1);
        sync.tick(1_000, &mut service, &mut clock);
        assert_eq!(service.queries_started, 2);
    }

    #[test]
    fn test_periodic_refresh_failure_keeps_previous_anchor() {
        let config = test_config();
        let mut sync = TimeSync::new(&config);
        let mut service = FakeTimeService::new(vec![Ok(1_000), Err(TimeError::Timeout)]);
        let mut clock = WallClock::new(0);
        let mut now = 0;

        run_until_event(&mut sync, &mut service, &mut clock, &mut now);
        assert!(clock.is_synced());

        // Jump past the refresh interval; the refresh fails.
        now += config.time_refresh_interval_ms;
        let event = run_until_event(&mut sync, &mut service, &mut clock, &mut now);
        assert_eq!(event, Some(SyncEvent::RefreshFailed(TimeError::Timeout)));
        assert!(clock.is_synced());
        assert_eq!(sync.state(), ConnState::Connected);
        assert_eq!(service.queries_started, 2);
    }

    #[test]
    fn test_refresh_after_exhaustion_upgrades_degraded_clock() {
        let config = test_config();
        let mut sync = TimeSync::new(&config);
        let mut service = FakeTimeService::always_failing();
        let mut clock = WallClock::new(0);
        let mut now = 0;

        while !sync.startup_done() {
            sync.tick(now, &mut service, &mut clock);
            now += 100;
        }
        assert_eq!(sync.state(), ConnState::Failed);

        // The periodic schedule keeps running; a later success recovers.
        service.script = vec![Ok(2_000)];
        now += config.time_refresh_interval_ms;
        let event = run_until_event(&mut sync, &mut service, &mut clock, &mut now);
        assert_eq!(event, Some(SyncEvent::Synced));
        assert!(clock.is_synced());
        assert_eq!(sync.state(), ConnState::Connected);
    }

    #[test]
    fn test_no_refresh_before_interval() {
        let config = test_config();
        let mut sync = TimeSync::new(&config);
        let mut service = FakeTimeService::new(vec![Ok(1_000)]);
        let mut clock = WallClock::new(0);
        let mut now = 0;

        run_until_event(&mut sync, &mut service, &mut clock, &mut now);
        let after_sync = service.queries_started;

        for _ in 0..10 {
            now += 1_000;
            sync.tick(now, &mut service, &mut clock);
        }
        assert_eq!(service.queries_started, after_sync);
    }
}
