//! Runtime settings for the monitor.
//!
//! A single immutable [`Config`] is constructed once at startup and passed by
//! reference to every component constructor; no module reads ambient globals.
//! Copy [`Config::DEFAULT`], replace the `YOUR_*` credential placeholders, and
//! flash.

/// All externally tunable values, grouped in construction order: network,
/// broker, time sync, cadences.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// WiFi network name.
    pub wifi_ssid: &'static str,
    /// WiFi passphrase.
    pub wifi_password: &'static str,
    /// Delay between WiFi join attempts (unbounded retry).
    pub link_retry_delay_ms: u64,

    /// MQTT broker hostname or IPv4 address.
    pub mqtt_broker: &'static str,
    /// MQTT broker port (1883 = plain MQTT).
    pub mqtt_port: u16,
    /// Topic carrying the sensor readings.
    pub mqtt_topic: &'static str,
    /// Client id prefix; a MAC-derived hex suffix is appended so multiple
    /// deployed devices never collide on the broker.
    pub mqtt_client_id_prefix: &'static str,
    /// Minimum delay between broker connect attempts (unbounded retry).
    pub mqtt_reconnect_delay_ms: u64,

    /// NTP server queried for wall-clock time.
    pub ntp_server: &'static str,
    /// Signed zone offset applied to server UTC time, in seconds.
    pub zone_offset_seconds: i64,
    /// Startup sync gives up after this many failed attempts.
    pub time_sync_max_attempts: u32,
    /// Delay between startup sync attempts.
    pub time_sync_retry_delay_ms: u64,
    /// Period of the post-startup time refresh.
    pub time_refresh_interval_ms: u64,

    /// Main loop tick interval.
    pub tick_interval_ms: u64,
    /// How long the CO2 view and the THI view each stay on screen.
    pub alternate_interval_ms: u64,
    /// How long transient connection notices stay on screen.
    pub connect_notice_ms: u64,
}

impl Config {
    pub const DEFAULT: Self = Self {
        wifi_ssid: "YOUR_WIFI_SSID",
        wifi_password: "YOUR_WIFI_PASSWORD",
        link_retry_delay_ms: 500,

        mqtt_broker: "YOUR_MQTT_BROKER_IP",
        mqtt_port: 1883,
        mqtt_topic: "sensor_data",
        mqtt_client_id_prefix: "airwatch-",
        mqtt_reconnect_delay_ms: 5_000,

        ntp_server: "pool.ntp.org",
        // UTC+9 (9 * 60 * 60)
        zone_offset_seconds: 32_400,
        time_sync_max_attempts: 10,
        time_sync_retry_delay_ms: 1_000,
        time_refresh_interval_ms: 60_000,

        tick_interval_ms: 100,
        alternate_interval_ms: 3_000,
        connect_notice_ms: 2_000,
    };
}

// =============================================================================
// Unit Tests
// =============================================================================
