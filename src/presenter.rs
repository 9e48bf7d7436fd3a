//! Display presentation: chrome row, alternating value views, notices.
//!
//! The presenter owns all UI state - which of the two value views is on
//! screen, when it last switched, and any transient notice - and repaints by
//! content diffing: each refresh composes a [`FrameContent`] describing what
//! the screen should show and repaints only the regions whose content
//! changed since the previous frame. Refreshing with unchanged inputs paints
//! nothing, so the panel never flickers at the tick rate.
//!
//! # Update Strategy
//!
//! | Region | Repaints when |
//! |--------|---------------|
//! | Title  | Once, after a full clear |
//! | Clock  | The formatted time changes (once per second) |
//! | Glyphs | Any service's connection state changes |
//! | Body   | Mode alternates, a new value arrives, or the stage changes |
//! | Notice | A notice appears, changes, or expires |

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::String;

use crate::Millis;
use crate::colors::BLACK;
use crate::config::Config;
use crate::config::layout::BODY_REGION;
use crate::reading::Reading;
use crate::status::ConnectivityStatus;
use crate::wallclock::WallClock;
use crate::widgets;

/// Which of the two large-value views is on screen. Toggled by elapsed time;
/// persists until device reset.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum DisplayMode {
    /// CO2 concentration view.
    #[default]
    ShowCo2,
    /// Temperature-humidity index view.
    ShowThi,
}

impl DisplayMode {
    /// Switch to the other view.
    pub const fn toggle(self) -> Self {
        match self {
            Self::ShowCo2 => Self::ShowThi,
            Self::ShowThi => Self::ShowCo2,
        }
    }

    /// Label drawn above the value in this mode.
    pub const fn label(self) -> &'static str {
        match self {
            Self::ShowCo2 => "CO2:",
            Self::ShowThi => "THI:",
        }
    }
}

/// What the application loop wants on screen this tick.
#[derive(Clone, Copy, Debug)]
pub enum Stage<'a> {
    /// Startup: WiFi join in progress.
    WifiConnecting,
    /// Startup: time sync in progress (attempt counter shown).
    TimeSyncing { attempt: u32, max: u32 },
    /// Steady state, with the latest decoded reading if one exists.
    Live(Option<&'a Reading>),
}

/// Value-area content.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BodyContent {
    /// Startup status line.
    Boot(String<32>),
    /// No reading has ever been decoded.
    NoData,
    /// One labeled large value.
    Value {
        label: &'static str,
        text: String<16>,
    },
}

/// Everything one frame shows. Compared against the previously painted frame
/// to decide which regions repaint.
#[derive(Clone, PartialEq, Debug)]
pub struct FrameContent {
    pub time_text: String<12>,
    pub status: ConnectivityStatus,
    pub body: BodyContent,
    pub notice: Option<&'static str>,
}

/// Display driver front-end owned by the application loop.
pub struct Presenter {
    alternate_interval_ms: u64,
    notice_duration_ms: u64,
    mode: DisplayMode,
    last_switch: Option<Millis>,
    notice: Option<(&'static str, Millis)>,
    last: Option<FrameContent>,
}

impl Presenter {
    pub fn new(config: &Config) -> Self {
        Self {
            alternate_interval_ms: config.alternate_interval_ms,
            notice_duration_ms: config.connect_notice_ms,
            mode: DisplayMode::ShowCo2,
            last_switch: None,
            notice: None,
            last: None,
        }
    }

    /// Currently selected value view.
    pub const fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// The last painted frame, if any. Exposed for tests.
    pub fn last_frame(&self) -> Option<&FrameContent> {
        self.last.as_ref()
    }

    /// Show a transient notice in the bottom strip. A newer notice replaces
    /// an active one and restarts the timer.
    pub fn show_notice(&mut self, text: &'static str, now: Millis) {
        self.notice = Some((text, now));
    }

    /// Compose this tick's frame and repaint the regions that changed.
    pub fn refresh<D>(
        &mut self,
        display: &mut D,
        now: Millis,
        stage: Stage<'_>,
        status: &ConnectivityStatus,
        clock: &WallClock,
    ) where
        D: DrawTarget<Color = Rgb565>,
    {
        self.advance_timers(now);
        let frame = self.compose(now, stage, status, clock);

        match self.last.take() {
            None => {
                // First frame: full clear, then paint everything.
                display.clear(BLACK).ok();
                widgets::draw_title(display);
                widgets::draw_time(display, &frame.time_text);
                widgets::draw_status(display, &frame.status);
                self.draw_body(display, &frame.body);
                widgets::draw_notice(display, frame.notice);
            }
            Some(prev) => {
                if frame.time_text != prev.time_text {
                    widgets::draw_time(display, &frame.time_text);
                }
                if frame.status != prev.status {
                    widgets::draw_status(display, &frame.status);
                }
                if frame.body != prev.body {
                    self.draw_body(display, &frame.body);
                }
                if frame.notice != prev.notice {
                    widgets::draw_notice(display, frame.notice);
                }
            }
        }
        self.last = Some(frame);
    }

    /// Advance the mode-alternation timer and expire stale notices. The
    /// alternation interval is measured from the last mode switch, not from
    /// the reading's age, so tick granularity never skews the cadence.
    fn advance_timers(&mut self, now: Millis) {
        match self.last_switch {
            None => self.last_switch = Some(now),
            Some(switched_at) => {
                if now.saturating_sub(switched_at) >= self.alternate_interval_ms {
                    self.mode = self.mode.toggle();
                    self.last_switch = Some(now);
                }
            }
        }

        if let Some((_, shown_at)) = self.notice
            && now.saturating_sub(shown_at) >= self.notice_duration_ms
        {
            self.notice = None;
        }
    }

    fn compose(
        &self,
        now: Millis,
        stage: Stage<'_>,
        status: &ConnectivityStatus,
        clock: &WallClock,
    ) -> FrameContent {
        let body = match stage {
            Stage::WifiConnecting => {
                let mut line: String<32> = String::new();
                let _ = line.push_str("WiFi connecting...");
                BodyContent::Boot(line)
            }
            Stage::TimeSyncing { attempt, max } => {
                let mut line: String<32> = String::new();
                let _ = write!(line, "Time sync {attempt}/{max}...");
                BodyContent::Boot(line)
            }
            Stage::Live(None) => BodyContent::NoData,
            Stage::Live(Some(reading)) => {
                let mut text: String<16> = String::new();
                match self.mode {
                    DisplayMode::ShowCo2 => {
                        let _ = write!(text, "{}", reading.co2);
                    }
                    DisplayMode::ShowThi => {
                        let _ = write!(text, "{:.1}", reading.thi);
                    }
                }
                BodyContent::Value {
                    label: self.mode.label(),
                    text,
                }
            }
        };

        FrameContent {
            time_text: clock.display_time(now),
            status: *status,
            body,
            notice: self.notice.map(|(text, _)| text),
        }
    }

    fn draw_body<D>(&self, display: &mut D, body: &BodyContent)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        match body {
            BodyContent::Boot(line) => widgets::draw_boot_status(display, BODY_REGION, line),
            BodyContent::NoData => widgets::draw_no_data(display, BODY_REGION),
            BodyContent::Value { label, text } => {
                widgets::draw_reading_view(display, BODY_REGION, label, text);
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
