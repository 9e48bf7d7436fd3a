//! Telemetry subscription state machine.
//!
//! Receiving readings is the device's whole purpose, so unlike time sync the
//! broker connection retries forever: every failed or lost connection
//! schedules a fresh attempt no sooner than the configured delay after the
//! previous attempt began. One connect attempt = TCP session + MQTT handshake
//! + subscription; subscription state does not survive a disconnect, so the
//! transport re-subscribes inside every attempt.
//!
//! [`Subscriber::tick`] is non-blocking and must run every tick regardless of
//! connection state - message polling is a no-op while disconnected.

use core::fmt::Write;

use heapless::String;

use crate::Millis;
use crate::config::Config;
use crate::reading::Payload;
use crate::retry::RetryBudget;
use crate::status::ConnState;

/// Why a broker attempt failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrokerError {
    /// TCP session could not be established.
    Network,
    /// MQTT handshake rejected.
    Handshake,
    /// Session up but the subscription was refused.
    Subscribe,
}

/// Collaborator seam for the broker transport (rust-mqtt over TCP on target,
/// a fake in tests). All calls are non-blocking.
pub trait TelemetryTransport {
    /// Fire one connect + subscribe attempt. Only called when disconnected
    /// and the retry budget allows it.
    fn start_connect(&mut self);
    /// Take the result of the in-flight attempt, if it has completed.
    fn poll_connect(&mut self) -> Option<Result<(), BrokerError>>;
    /// Level state of the session; flipping to `false` signals a lost
    /// connection.
    fn is_connected(&self) -> bool;
    /// Take the next received payload, if any. Returns `None` (and performs
    /// no work) while disconnected.
    fn poll_message(&mut self) -> Option<Payload>;
}

/// Outcome of one tick, for binary-side logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriberEvent {
    /// Session established and subscribed.
    Connected,
    /// Connect attempt failed; will retry after the delay.
    ConnectFailed(BrokerError),
    /// Established session dropped; will reconnect after the delay.
    ConnectionLost,
}

/// Reconnect-forever subscription driver.
pub struct Subscriber {
    state: ConnState,
    retry: RetryBudget,
}

impl Subscriber {
    pub fn new(config: &Config) -> Self {
        Self {
            state: ConnState::Disconnected,
            retry: RetryBudget::unbounded(config.mqtt_reconnect_delay_ms),
        }
    }

    /// Current state for the chrome-row glyph.
    pub const fn state(&self) -> ConnState {
        self.state
    }

    /// Advance the connection state machine and poll for one payload.
    pub fn tick<T: TelemetryTransport>(
        &mut self,
        now: Millis,
        transport: &mut T,
    ) -> (Option<SubscriberEvent>, Option<Payload>) {
        let mut event = None;

        match self.state {
            ConnState::Connecting => {
                if let Some(result) = transport.poll_connect() {
                    match result {
                        Ok(()) => {
                            self.state = ConnState::Connected;
                            self.retry.reset();
                            event = Some(SubscriberEvent::Connected);
                        }
                        Err(err) => {
                            self.state = ConnState::Disconnected;
                            event = Some(SubscriberEvent::ConnectFailed(err));
                        }
                    }
                }
            }
            ConnState::Connected => {
                if !transport.is_connected() {
                    self.state = ConnState::Disconnected;
                    event = Some(SubscriberEvent::ConnectionLost);
                }
            }
            ConnState::Disconnected | ConnState::Failed => {
                if self.retry.ready(now) {
                    self.retry.begin_attempt(now);
                    self.state = ConnState::Connecting;
                    transport.start_connect();
                }
            }
        }

        // Poll every tick regardless of state; disconnected transports
        // return None.
        (event, transport.poll_message())
    }
}

/// Maximum client id length (prefix + 12 hex digits).
pub const CLIENT_ID_CAPACITY: usize = 48;

/// Build the broker client id: configured prefix + hex-encoded device MAC,
/// so multiple deployed devices never collide on the broker. An over-long
/// prefix is truncated rather than rejected.
pub fn make_client_id(prefix: &str, mac: &[u8; 6]) -> String<CLIENT_ID_CAPACITY> {
    let mut id: String<CLIENT_ID_CAPACITY> = String::new();
    let keep = prefix.len().min(CLIENT_ID_CAPACITY - 12);
    let _ = id.push_str(&prefix[..keep]);
    for byte in mac {
        let _ = write!(id, "{byte:02x}");
    }
    id
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeTransport {
        connects_started: Vec<Millis>,
        now: Millis,
        pending: Option<Result<(), BrokerError>>,
        /// `None` = attempts succeed, `Some(err)` = attempts fail with `err`.
        connect_error: Option<BrokerError>,
        connected: bool,
        polls_while_disconnected: u32,
        inbox: Vec<Payload>,
    }

    impl FakeTransport {
        fn failing(err: BrokerError) -> Self {
            Self {
                connect_error: Some(err),
                ..Self::default()
            }
        }

        fn succeeding() -> Self {
            Self::default()
        }

        fn push_payload(&mut self, bytes: &[u8]) {
            let mut payload = Payload::new();
            payload.extend_from_slice(bytes).unwrap();
            self.inbox.push(payload);
        }

        fn drop_session(&mut self) {
            self.connected = false;
        }
    }

    impl TelemetryTransport for FakeTransport {
        fn start_connect(&mut self) {
            self.connects_started.push(self.now);
            self.pending = Some(match self.connect_error {
                Some(err) => Err(err),
                None => Ok(()),
            });
        }

        fn poll_connect(&mut self) -> Option<Result<(), BrokerError>> {
            let result = self.pending.take();
            if let Some(Ok(())) = result {
                self.connected = true;
            }
            result
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn poll_message(&mut self) -> Option<Payload> {
            if !self.connected {
                self.polls_while_disconnected += 1;
                return None;
            }
            if self.inbox.is_empty() { None } else { Some(self.inbox.remove(0)) }
        }
    }

    fn test_config() -> Config {
        Config {
            mqtt_reconnect_delay_ms: 5_000,
            ..Config::DEFAULT
        }
    }

    #[test]
    fn test_connects_and_delivers_payloads() {
        let config = test_config();
        let mut subscriber = Subscriber::new(&config);
        let mut transport = FakeTransport::succeeding();

        let (event, _) = subscriber.tick(0, &mut transport);
        assert_eq!(event, None);
        assert_eq!(subscriber.state(), ConnState::Connecting);

        let (event, _) = subscriber.tick(100, &mut transport);
        assert_eq!(event, Some(SubscriberEvent::Connected));
        assert_eq!(subscriber.state(), ConnState::Connected);

        transport.push_payload(br#"{"co2": 650, "thi": 72.5}"#);
        let (_, payload) = subscriber.tick(200, &mut transport);
        assert_eq!(payload.unwrap().as_slice(), br#"{"co2": 650, "thi": 72.5}"#);
    }

    #[test]
    fn test_reconnect_never_sooner_than_delay() {
        let config = test_config();
        let mut subscriber = Subscriber::new(&config);
        let mut transport = FakeTransport::failing(BrokerError::Network);

        // Simulate a long run of 100 ms ticks against a dead broker.
        let mut now = 0;
        while now < 60_000 {
            transport.now = now;
            subscriber.tick(now, &mut transport);
            now += 100;
        }

        assert!(transport.connects_started.len() > 2);
        for pair in transport.connects_started.windows(2) {
            assert!(
                pair[1] - pair[0] >= config.mqtt_reconnect_delay_ms,
                "attempts at {} and {} closer than the configured delay",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_resubscribes_on_every_reconnect() {
        let config = test_config();
        let mut subscriber = Subscriber::new(&config);
        let mut transport = FakeTransport::succeeding();

        subscriber.tick(0, &mut transport);
        subscriber.tick(100, &mut transport);
        assert_eq!(subscriber.state(), ConnState::Connected);

        // Session drops; a second full connect+subscribe attempt must run.
        transport.drop_session();
        let (event, _) = subscriber.tick(200, &mut transport);
        assert_eq!(event, Some(SubscriberEvent::ConnectionLost));

        let mut now = 300;
        while subscriber.state() != ConnState::Connected {
            transport.now = now;
            subscriber.tick(now, &mut transport);
            now += 100;
        }
        assert_eq!(transport.connects_started.len(), 2);
    }

    #[test]
    fn test_polls_messages_while_disconnected() {
        let config = test_config();
        let mut subscriber = Subscriber::new(&config);
        let mut transport = FakeTransport::failing(BrokerError::Handshake);

        for now in [0, 100, 200] {
            let (_, payload) = subscriber.tick(now, &mut transport);
            assert!(payload.is_none());
        }
        assert_eq!(transport.polls_while_disconnected, 3);
    }

    #[test]
    fn test_failed_attempt_reports_error() {
        let config = test_config();
        let mut subscriber = Subscriber::new(&config);
        let mut transport = FakeTransport::failing(BrokerError::Subscribe);

        subscriber.tick(0, &mut transport);
        let (event, _) = subscriber.tick(100, &mut transport);
        assert_eq!(event, Some(SubscriberEvent::ConnectFailed(BrokerError::Subscribe)));
        assert_eq!(subscriber.state(), ConnState::Disconnected);
    }

    #[test]
    fn test_client_id_appends_mac_suffix() {
        let id = make_client_id("airwatch-", &[0xde, 0xad, 0xbe, 0xef, 0x01, 0x02]);
        assert_eq!(id.as_str(), "airwatch-deadbeef0102");
    }

    #[test]
    fn test_client_ids_differ_per_device() {
        let a = make_client_id("airwatch-", &[0, 0, 0, 0, 0, 1]);
        let b = make_client_id("airwatch-", &[0, 0, 0, 0, 0, 2]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_client_id_truncates_long_prefix() {
        let long = "x".repeat(CLIENT_ID_CAPACITY);
        let id = make_client_id(&long, &[0; 6]);
        assert_eq!(id.len(), CLIENT_ID_CAPACITY);
        assert!(id.ends_with("000000000000"));
    }
}
