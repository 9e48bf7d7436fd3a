//! MQTT subscription plumbing: rust-mqtt over an embassy-net TCP socket,
//! plus the [`TelemetryTransport`] adapter handed to the core.
//!
//! One connect request = TCP connect + MQTT v5 handshake + subscribe. After
//! that the task sits in a receive loop, forwarding matching payloads into a
//! bounded channel and answering broker keep-alive with pings. Any receive
//! error tears the session down; the core notices via `is_connected()` and
//! schedules the next attempt.

use core::net::IpAddr;
use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, Stack};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;

use airwatch_pico2w::config::Config;
use airwatch_pico2w::reading::{PAYLOAD_BUDGET, Payload};
use airwatch_pico2w::telemetry::{BrokerError, TelemetryTransport};

/// MQTT packet buffers: payload budget plus header room.
const MQTT_BUFFER_SIZE: usize = PAYLOAD_BUDGET + 256;
/// Keep-alive ping cadence while idle.
const PING_INTERVAL: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

static CONNECT_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static CONNECT_RESULT: Signal<CriticalSectionRawMutex, Result<(), BrokerError>> = Signal::new();
static SESSION_UP: AtomicBool = AtomicBool::new(false);
static MESSAGES: Channel<CriticalSectionRawMutex, Payload, 4> = Channel::new();

/// Executes one connect + subscribe per request, then pumps messages until
/// the session drops.
#[embassy_executor::task]
pub async fn mqtt_task(
    stack: Stack<'static>,
    config: &'static Config,
    client_id: &'static str,
) -> ! {
    loop {
        CONNECT_REQUEST.wait().await;
        match run_session(stack, config, client_id).await {
            Ok(()) => info!("mqtt session closed"),
            Err(err) => {
                CONNECT_RESULT.signal(Err(err));
                warn!("mqtt connect attempt failed");
            }
        }
        SESSION_UP.store(false, Ordering::Relaxed);
    }
}

async fn resolve(stack: Stack<'static>, host: &str) -> Result<IpAddress, BrokerError> {
    // Accept a literal IPv4 address without a DNS round trip.
    if let Ok(IpAddr::V4(addr)) = host.parse::<IpAddr>() {
        return Ok(IpAddress::Ipv4(addr));
    }
    let addrs = stack
        .dns_query(host, DnsQueryType::A)
        .await
        .map_err(|_| BrokerError::Network)?;
    addrs.first().copied().ok_or(BrokerError::Network)
}

/// Connect, subscribe, then receive until the session errors. Returns `Ok`
/// only for a session that was up and later dropped; setup failures return
/// the error for the connect result signal.
async fn run_session(
    stack: Stack<'static>,
    config: &'static Config,
    client_id: &'static str,
) -> Result<(), BrokerError> {
    let addr = resolve(stack, config.mqtt_broker).await?;

    let mut rx_buffer = [0u8; 1024];
    let mut tx_buffer = [0u8; 1024];
    let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(CONNECT_TIMEOUT + PING_INTERVAL));
    socket
        .connect((addr, config.mqtt_port))
        .await
        .map_err(|_| BrokerError::Network)?;

    let mut mqtt_config: ClientConfig<'_, 5, CountingRng> =
        ClientConfig::new(MqttVersion::MQTTv5, CountingRng(20000));
    mqtt_config.add_client_id(client_id);
    mqtt_config.add_max_subscribe_qos(QualityOfService::QoS0);
    mqtt_config.max_packet_size = MQTT_BUFFER_SIZE as u32;

    let mut send_buffer = [0u8; 512];
    let mut recv_buffer = [0u8; MQTT_BUFFER_SIZE];
    let mut client = MqttClient::<_, 5, _>::new(
        socket,
        &mut send_buffer,
        512,
        &mut recv_buffer,
        MQTT_BUFFER_SIZE,
        mqtt_config,
    );

    client
        .connect_to_broker()
        .await
        .map_err(|_| BrokerError::Handshake)?;
    client
        .subscribe_to_topic(config.mqtt_topic)
        .await
        .map_err(|_| BrokerError::Subscribe)?;

    SESSION_UP.store(true, Ordering::Relaxed);
    CONNECT_RESULT.signal(Ok(()));
    info!("mqtt subscribed to {}", config.mqtt_topic);

    loop {
        match select(client.receive_message(), Timer::after(PING_INTERVAL)).await {
            Either::First(Ok((topic, payload))) => {
                if topic == config.mqtt_topic {
                    forward(payload);
                }
            }
            Either::First(Err(_)) => {
                warn!("mqtt receive error, dropping session");
                return Ok(());
            }
            Either::Second(()) => {
                if client.send_ping().await.is_err() {
                    warn!("mqtt ping failed, dropping session");
                    return Ok(());
                }
            }
        }
    }
}

/// Copy a received payload into the bounded channel. Oversized payloads are
/// dropped here; the decoder budget would reject them anyway. A full channel
/// drops the new payload - the display only ever shows the latest reading,
/// so backlog has no value.
fn forward(payload: &[u8]) {
    let mut buffer = Payload::new();
    if buffer.extend_from_slice(payload).is_err() {
        warn!("payload over budget ({} bytes), dropped", payload.len());
        return;
    }
    if MESSAGES.try_send(buffer).is_err() {
        warn!("payload channel full, dropped");
    }
}

/// Non-blocking front end over the MQTT task, handed to the core.
pub struct BrokerAdapter;

impl TelemetryTransport for BrokerAdapter {
    fn start_connect(&mut self) {
        CONNECT_RESULT.reset();
        CONNECT_REQUEST.signal(());
    }

    fn poll_connect(&mut self) -> Option<Result<(), BrokerError>> {
        CONNECT_RESULT.try_take()
    }

    fn is_connected(&self) -> bool {
        SESSION_UP.load(Ordering::Relaxed)
    }

    fn poll_message(&mut self) -> Option<Payload> {
        MESSAGES.try_receive().ok()
    }
}
