//! CO2 + THI pocket monitor firmware for Raspberry Pi Pico 2 W (RP2350).
//!
//! Subscribes to a sensor feed over MQTT, keeps wall-clock time via SNTP,
//! and alternates large CO2 / THI values on a 240x135 ST7789 panel
//! (Pimoroni Display Pack pinout).
//!
//! # Architecture
//!
//! All policy lives in the `airwatch_pico2w` library as a host-testable
//! state machine ticked from one loop. This binary contributes the
//! collaborators: the CYW43 WiFi tasks, the SNTP client, the rust-mqtt
//! subscriber, and the display driver. Each network task performs exactly
//! one attempt per request signaled by the core, so every retry schedule is
//! owned (and tested) in one place.
//!
//! The binary only builds for the ARM target; host builds get a stub `main`
//! so `cargo test --lib` works without cross tooling.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]

// Modules only used in the binary (not testable on host)
#[cfg(target_arch = "arm")]
mod mqtt;
#[cfg(target_arch = "arm")]
mod net;
#[cfg(target_arch = "arm")]
mod sntp;
#[cfg(target_arch = "arm")]
mod st7789;

#[cfg(target_arch = "arm")]
mod firmware {
    use cyw43_pio::{PioSpi, RM2_CLOCK_DIVIDER};
    use defmt::{info, warn};
    use embassy_executor::Spawner;
    use embassy_rp::bind_interrupts;
    use embassy_rp::gpio::{Level, Output};
    use embassy_rp::peripherals::PIO0;
    use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
    use embassy_rp::spi::{self, Spi};
    use embassy_time::{Instant, Timer};
    use embedded_graphics::prelude::*;
    use static_cell::StaticCell;
    use {defmt_rtt as _, panic_probe as _};

    use airwatch_pico2w::app::{App, LinkEvent, Phase, TickOutcome};
    use airwatch_pico2w::colors::BLACK;
    use airwatch_pico2w::config::Config;
    use airwatch_pico2w::telemetry::{CLIENT_ID_CAPACITY, SubscriberEvent, make_client_id};
    use airwatch_pico2w::timesync::SyncEvent;

    use crate::st7789::{St7789Flusher, St7789Renderer};
    use crate::{mqtt, net, sntp, st7789};

    bind_interrupts!(struct Irqs {
        PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    });

    /// Edit the `YOUR_*` placeholders in `Config::DEFAULT` before flashing.
    static CONFIG: Config = Config::DEFAULT;

    // Program metadata for `picotool info`
    #[unsafe(link_section = ".bi_entries")]
    #[used]
    pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
        embassy_rp::binary_info::rp_program_name!(c"airwatch"),
        embassy_rp::binary_info::rp_program_description!(
            c"CO2 + THI pocket monitor for Pico 2 W"
        ),
        embassy_rp::binary_info::rp_cargo_version!(),
        embassy_rp::binary_info::rp_program_build_attribute!(),
    ];

    #[embassy_executor::main]
    async fn main(spawner: Spawner) {
        info!("airwatch starting...");

        let p = embassy_rp::init(Default::default());

        // Display pins (Display Pack: CS=17, DC=16, CLK=18, MOSI=19, BL=20)
        let display_cs = Output::new(p.PIN_17, Level::High);
        let display_dc = Output::new(p.PIN_16, Level::Low);
        let mut _backlight = Output::new(p.PIN_20, Level::High);

        let mut spi_config = spi::Config::default();
        spi_config.frequency = 62_500_000;
        let display_spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH1, spi_config);

        let mut flusher = St7789Flusher::new(display_spi, display_dc, display_cs);
        flusher.init().await;

        // SAFETY: framebuffer() is called exactly once.
        let framebuffer = unsafe { st7789::framebuffer() };
        St7789Renderer::new(&mut framebuffer[..]).clear(BLACK).ok();
        flusher.flush_buffer(&framebuffer[..]).await;
        info!("display initialized");

        // CYW43 radio (Pico 2 W: PWR=23, DIO=24, CS=25, CLK=29).
        // Firmware blobs come from the embassy repository's cyw43-firmware
        // directory; see cyw43-firmware/README.md.
        let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
        let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

        let pwr = Output::new(p.PIN_23, Level::Low);
        let wl_cs = Output::new(p.PIN_25, Level::High);
        let mut pio = Pio::new(p.PIO0, Irqs);
        let wl_spi = PioSpi::new(
            &mut pio.common,
            pio.sm0,
            RM2_CLOCK_DIVIDER,
            pio.irq0,
            wl_cs,
            p.PIN_24,
            p.PIN_29,
            p.DMA_CH0,
        );

        static STATE: StaticCell<cyw43::State> = StaticCell::new();
        let state = STATE.init(cyw43::State::new());
        let (net_device, mut control, runner) = cyw43::new(state, pwr, wl_spi, fw).await;
        spawner.spawn(net::cyw43_task(runner)).unwrap();

        control.init(clm).await;
        control
            .set_power_management(cyw43::PowerManagementMode::PowerSave)
            .await;

        // Broker client id: configured prefix + this device's MAC.
        let mac = control.address().await;
        static CLIENT_ID: StaticCell<heapless::String<CLIENT_ID_CAPACITY>> = StaticCell::new();
        let client_id = CLIENT_ID.init(make_client_id(CONFIG.mqtt_client_id_prefix, &mac));
        info!("mqtt client id: {}", client_id.as_str());

        // Network stack with DHCP. The seed only randomizes local ports; a
        // fixed value is fine for a single-purpose sensor display.
        let seed = 0x8d3f_a9c1_5e24_7b60;
        static RESOURCES: StaticCell<embassy_net::StackResources<6>> = StaticCell::new();
        let (stack, runner) = embassy_net::new(
            net_device,
            embassy_net::Config::dhcpv4(Default::default()),
            RESOURCES.init(embassy_net::StackResources::new()),
            seed,
        );
        spawner.spawn(net::net_task(runner)).unwrap();

        // One task per collaborator; each executes single attempts on
        // request from the core.
        spawner.spawn(net::wifi_task(control, stack, &CONFIG)).unwrap();
        spawner.spawn(sntp::sntp_task(stack, &CONFIG)).unwrap();
        spawner
            .spawn(mqtt::mqtt_task(stack, &CONFIG, client_id.as_str()))
            .unwrap();

        let mut link = net::LinkAdapter::new(stack);
        let mut time_service = sntp::TimeAdapter;
        let mut broker = mqtt::BrokerAdapter;
        let mut app = App::new(CONFIG);

        info!("tick loop starting");
        loop {
            let now = Instant::now().as_millis();
            let outcome = {
                let mut renderer = St7789Renderer::new(&mut framebuffer[..]);
                app.tick(now, &mut renderer, &mut link, &mut time_service, &mut broker)
            };
            log_outcome(&outcome);

            flusher.flush_buffer(&framebuffer[..]).await;
            Timer::after_millis(CONFIG.tick_interval_ms).await;
        }
    }

    const fn phase_name(phase: Phase) -> &'static str {
        match phase {
            Phase::Booting => "booting",
            Phase::WifiConnecting => "wifi-connecting",
            Phase::TimeSyncing => "time-syncing",
            Phase::Running => "running",
        }
    }

    /// Turn the core's tick report into defmt lines. The library stays
    /// log-free; this is the only place that narrates its events.
    fn log_outcome(outcome: &TickOutcome) {
        if let Some(phase) = outcome.phase_changed {
            info!("phase: {}", phase_name(phase));
        }
        match outcome.link_event {
            Some(LinkEvent::Up) => info!("wifi connected"),
            Some(LinkEvent::AttemptFailed(_)) => warn!("wifi join failed, will retry"),
            Some(LinkEvent::Lost) => warn!("wifi link lost, reconnecting"),
            None => {}
        }
        match outcome.sync_event {
            Some(SyncEvent::Synced) => info!("time synchronized"),
            Some(SyncEvent::AttemptFailed(_)) => warn!("time sync attempt failed"),
            Some(SyncEvent::Exhausted) => warn!("time sync gave up, clock stays unsynced"),
            Some(SyncEvent::RefreshFailed(_)) => warn!("time refresh failed, keeping previous time"),
            None => {}
        }
        match outcome.subscriber_event {
            Some(SubscriberEvent::Connected) => info!("broker subscribed"),
            Some(SubscriberEvent::ConnectFailed(_)) => warn!("broker connect failed, will retry"),
            Some(SubscriberEvent::ConnectionLost) => warn!("broker connection lost, will retry"),
            None => {}
        }
        if outcome.reading_decoded {
            info!("reading updated");
        }
        if outcome.decode_failed.is_some() {
            warn!("payload rejected, keeping last reading");
        }
    }
}

#[cfg(not(target_arch = "arm"))]
fn main() {
    // The firmware entry only exists for the RP2350 target. On the host this
    // package is its library plus `cargo test --lib`.
    println!("airwatch: build with --target thumbv8m.main-none-eabihf to produce firmware");
}
