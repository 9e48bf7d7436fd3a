//! SNTP client: one 48-byte client-mode exchange per request, plus the
//! [`TimeService`] adapter handed to the core.

use defmt::warn;
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, with_timeout};

use airwatch_pico2w::config::Config;
use airwatch_pico2w::timesync::{TimeError, TimeService};

const NTP_PORT: u16 = 123;
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(3);
/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
const NTP_UNIX_OFFSET: u32 = 2_208_988_800;

static QUERY_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static QUERY_RESULT: Signal<CriticalSectionRawMutex, Result<u64, TimeError>> = Signal::new();

/// Executes one time query per request from the core.
#[embassy_executor::task]
pub async fn sntp_task(stack: Stack<'static>, config: &'static Config) -> ! {
    loop {
        QUERY_REQUEST.wait().await;
        let result = query_once(stack, config).await;
        if result.is_err() {
            warn!("sntp query failed");
        }
        QUERY_RESULT.signal(result);
    }
}

async fn query_once(stack: Stack<'static>, config: &'static Config) -> Result<u64, TimeError> {
    let addrs = stack
        .dns_query(config.ntp_server, DnsQueryType::A)
        .await
        .map_err(|_| TimeError::Lookup)?;
    let server = *addrs.first().ok_or(TimeError::Lookup)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(0).map_err(|_| TimeError::Protocol)?;

    // Client-mode request: LI=0, VN=3, Mode=3; the rest stays zero.
    let mut packet = [0u8; 48];
    packet[0] = 0x1B;
    let endpoint = embassy_net::IpEndpoint::new(server, NTP_PORT);
    socket
        .send_to(&packet, endpoint)
        .await
        .map_err(|_| TimeError::Protocol)?;

    let (len, _) = with_timeout(RESPONSE_TIMEOUT, socket.recv_from(&mut packet))
        .await
        .map_err(|_| TimeError::Timeout)?
        .map_err(|_| TimeError::Protocol)?;
    if len < 48 {
        return Err(TimeError::Protocol);
    }

    // Transmit timestamp seconds (bytes 40..44), NTP epoch.
    let secs = u32::from_be_bytes([packet[40], packet[41], packet[42], packet[43]]);
    if secs < NTP_UNIX_OFFSET {
        return Err(TimeError::Protocol);
    }
    Ok(u64::from(secs - NTP_UNIX_OFFSET))
}

/// Non-blocking front end over the SNTP task, handed to the core.
pub struct TimeAdapter;

impl TimeService for TimeAdapter {
    fn start_query(&mut self) {
        QUERY_RESULT.reset();
        QUERY_REQUEST.signal(());
    }

    fn poll_result(&mut self) -> Option<Result<u64, TimeError>> {
        QUERY_RESULT.try_take()
    }
}
