//! CYW43 WiFi plumbing: driver tasks plus the [`NetworkLink`] adapter.
//!
//! The core owns retry *policy*; this module only executes attempts. The
//! application loop signals a join request, the wifi task performs exactly
//! one join + DHCP wait and posts the result, and the adapter exposes both
//! ends as the non-blocking [`NetworkLink`] seam.

use cyw43::{Control, JoinOptions};
use defmt::{info, warn};
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, with_timeout};

use airwatch_pico2w::app::{LinkError, NetworkLink};
use airwatch_pico2w::config::Config;

/// How long one attempt waits for association + DHCP before reporting
/// failure.
const JOIN_TIMEOUT: Duration = Duration::from_secs(10);
const DHCP_TIMEOUT: Duration = Duration::from_secs(15);

static JOIN_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static JOIN_RESULT: Signal<CriticalSectionRawMutex, Result<(), LinkError>> = Signal::new();

// Type aliases for the radio task parameters
type WifiSpi =
    cyw43_pio::PioSpi<'static, embassy_rp::peripherals::PIO0, 0, embassy_rp::peripherals::DMA_CH0>;
type WifiRunner = cyw43::Runner<'static, embassy_rp::gpio::Output<'static>, WifiSpi>;

/// CYW43 driver runner.
#[embassy_executor::task]
pub async fn cyw43_task(runner: WifiRunner) -> ! {
    runner.run().await
}

/// Network stack runner.
#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Executes one join + DHCP acquisition per request from the core.
#[embassy_executor::task]
pub async fn wifi_task(
    mut control: Control<'static>,
    stack: Stack<'static>,
    config: &'static Config,
) -> ! {
    loop {
        JOIN_REQUEST.wait().await;
        let result = join_once(&mut control, stack, config).await;
        match &result {
            Ok(()) => {
                if let Some(v4) = stack.config_v4() {
                    info!("wifi up, address {}", v4.address);
                }
            }
            Err(_) => warn!("wifi join attempt failed"),
        }
        JOIN_RESULT.signal(result);
    }
}

async fn join_once(
    control: &mut Control<'static>,
    stack: Stack<'static>,
    config: &'static Config,
) -> Result<(), LinkError> {
    with_timeout(
        JOIN_TIMEOUT,
        control.join(
            config.wifi_ssid,
            JoinOptions::new(config.wifi_password.as_bytes()),
        ),
    )
    .await
    .map_err(|_| LinkError::JoinFailed)?
    .map_err(|_| LinkError::JoinFailed)?;

    with_timeout(DHCP_TIMEOUT, stack.wait_config_up())
        .await
        .map_err(|_| LinkError::NoAddress)?;
    Ok(())
}

/// Non-blocking front end over the wifi task, handed to the core.
pub struct LinkAdapter {
    stack: Stack<'static>,
}

impl LinkAdapter {
    pub fn new(stack: Stack<'static>) -> Self {
        Self { stack }
    }
}

impl NetworkLink for LinkAdapter {
    fn start_connect(&mut self) {
        JOIN_RESULT.reset();
        JOIN_REQUEST.signal(());
    }

    fn poll_connect(&mut self) -> Option<Result<(), LinkError>> {
        JOIN_RESULT.try_take()
    }

    fn is_up(&self) -> bool {
        self.stack.is_link_up() && self.stack.is_config_up()
    }
}
