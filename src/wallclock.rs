//! Wall-clock time derived from a synced epoch plus the monotonic tick clock.
//!
//! A successful time sync anchors an epoch second to a monotonic millisecond;
//! between syncs the clock free-runs off the monotonic source. The configured
//! zone offset is applied on read, so a re-sync never double-applies it.

use core::fmt::Write;

use heapless::String;

use crate::Millis;

/// Rendered when no sync has succeeded yet.
pub const UNSYNCED_TIME: &str = "--:--:--";

/// Process-wide wall-clock state. Owned by the application loop; the
/// presenter only reads formatted time.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    zone_offset_seconds: i64,
    /// Server epoch (UTC seconds) paired with the monotonic instant it was
    /// received, once the first sync succeeds.
    anchor: Option<(u64, Millis)>,
}

impl WallClock {
    pub const fn new(zone_offset_seconds: i64) -> Self {
        Self {
            zone_offset_seconds,
            anchor: None,
        }
    }

    /// Whether any sync has succeeded since boot.
    pub const fn is_synced(&self) -> bool {
        self.anchor.is_some()
    }

    /// Anchor the clock to a freshly received server time.
    pub fn set(&mut self, epoch_utc_seconds: u64, now: Millis) {
        self.anchor = Some((epoch_utc_seconds, now));
    }

    /// Local time of day as (hours, minutes, seconds), or `None` before the
    /// first successful sync.
    pub fn time_of_day(&self, now: Millis) -> Option<(u8, u8, u8)> {
        let (epoch, anchor_ms) = self.anchor?;
        let elapsed_s = now.saturating_sub(anchor_ms) / 1000;
        let local = epoch as i64 + elapsed_s as i64 + self.zone_offset_seconds;
        let second_of_day = local.rem_euclid(86_400);
        let hours = (second_of_day / 3600) as u8;
        let minutes = ((second_of_day % 3600) / 60) as u8;
        let seconds = (second_of_day % 60) as u8;
        Some((hours, minutes, seconds))
    }

    /// "HH:MM:SS", or the [`UNSYNCED_TIME`] fallback.
    pub fn display_time(&self, now: Millis) -> String<12> {
        let mut out = String::new();
        match self.time_of_day(now) {
            Some((h, m, s)) => {
                // String<12> always holds 8 chars; write! cannot fail here.
                let _ = write!(out, "{h:02}:{m:02}:{s:02}");
            }
            None => {
                let _ = out.push_str(UNSYNCED_TIME);
            }
        }
        out
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsynced_clock_has_no_time() {
        let clock = WallClock::new(32_400);
        assert!(!clock.is_synced());
        assert_eq!(clock.time_of_day(123_456), None);
        assert_eq!(clock.display_time(123_456).as_str(), UNSYNCED_TIME);
    }

    #[test]
    fn test_zone_offset_applied() {
        let mut clock = WallClock::new(32_400); // UTC+9
        clock.set(0, 0); // 1970-01-01 00:00:00 UTC
        assert_eq!(clock.time_of_day(0), Some((9, 0, 0)));
    }

    #[test]
    fn test_free_run_between_syncs() {
        let mut clock = WallClock::new(0);
        clock.set(1_000, 50_000);
        // 90 seconds of monotonic time later.
        assert_eq!(clock.time_of_day(140_000), Some((0, 18, 10)));
    }

    #[test]
    fn test_negative_offset_wraps_backwards() {
        let mut clock = WallClock::new(-3_600); // UTC-1
        clock.set(0, 0);
        assert_eq!(clock.time_of_day(0), Some((23, 0, 0)));
    }

    #[test]
    fn test_day_wrap() {
        let mut clock = WallClock::new(32_400);
        // 23:59:30 local -> 86370 - 32400 = 53970 UTC.
        clock.set(53_970, 0);
        assert_eq!(clock.time_of_day(0), Some((23, 59, 30)));
        assert_eq!(clock.time_of_day(30_000), Some((0, 0, 0)));
    }

    #[test]
    fn test_resync_replaces_anchor() {
        let mut clock = WallClock::new(0);
        clock.set(100, 0);
        clock.set(7_200, 1_000_000); // drift-corrected refresh
        assert_eq!(clock.time_of_day(1_000_000), Some((2, 0, 0)));
    }

    #[test]
    fn test_display_format() {
        let mut clock = WallClock::new(0);
        clock.set(3_725, 0); // 01:02:05 UTC
        assert_eq!(clock.display_time(0).as_str(), "01:02:05");
    }
}
