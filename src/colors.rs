//! Color constants for the monitor UI.
//!
//! Rgb565 is native to the ST7789 panel: 5 bits red, 6 bits green, 5 bits
//! blue, no conversion needed when writing to the display buffer. The
//! built-in `RgbColor` trait constants are used where they exist.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

/// Pure black. Background everywhere.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure white. Default text color.
pub const WHITE: Rgb565 = Rgb565::WHITE;

/// Connectivity glyph: service up.
pub const GREEN: Rgb565 = Rgb565::GREEN;

/// Connectivity glyph: attempt in flight.
pub const YELLOW: Rgb565 = Rgb565::YELLOW;

/// Connectivity glyph: service failed / gave up.
pub const RED: Rgb565 = Rgb565::RED;

/// Connectivity glyph: not yet attempted / waiting to retry.
/// RGB565: (12, 24, 12) - mid gray, readable but subdued.
pub const GRAY: Rgb565 = Rgb565::new(12, 24, 12);

/// Secondary text (notices, startup status lines).
/// RGB565: (16, 40, 31) - pale cyan, distinct from the value area.
pub const PALE_CYAN: Rgb565 = Rgb565::new(16, 40, 31);
