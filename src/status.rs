//! Connectivity state, tracked independently for the network link, the
//! broker session, and time sync.
//!
//! Transitions are driven only by the application loop tick; there is no
//! concurrent mutation. The presenter maps each service to one colored glyph
//! in the chrome row.

use embedded_graphics::pixelcolor::Rgb565;

use crate::colors::{GRAY, GREEN, RED, YELLOW};

/// Connection state of one dependent service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnState {
    /// Not connected; no attempt in flight.
    #[default]
    Disconnected,
    /// Attempt in flight.
    Connecting,
    /// Up and usable.
    Connected,
    /// Gave up (bounded budgets only; time sync after exhausting retries).
    Failed,
}

impl ConnState {
    /// Glyph color in the chrome row.
    pub const fn glyph_color(self) -> Rgb565 {
        match self {
            Self::Disconnected => GRAY,
            Self::Connecting => YELLOW,
            Self::Connected => GREEN,
            Self::Failed => RED,
        }
    }
}

/// Per-service connection state, one glyph each: W(iFi), M(QTT broker),
/// T(ime sync).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectivityStatus {
    pub link: ConnState,
    pub broker: ConnState,
    pub time: ConnState,
}

impl ConnectivityStatus {
    /// Glyph characters paired with each service's state, in chrome-row
    /// order.
    pub const fn glyphs(&self) -> [(char, ConnState); 3] {
        [('W', self.link), ('M', self.broker), ('T', self.time)]
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
