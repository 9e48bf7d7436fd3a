//! Display geometry and the fixed screen-coordinate table.
//!
//! The panel is a 1.14" ST7789 in landscape (240x135). Every element draws at
//! a pre-computed `const` position; `VERTICAL_OFFSET` nudges the whole layout
//! up or down at compile time without touching individual entries.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Display width in pixels (ST7789 1.14" panel, landscape).
pub const SCREEN_WIDTH: u32 = 240;

/// Display height in pixels.
pub const SCREEN_HEIGHT: u32 = 135;

/// Whole-layout vertical adjustment, applied to every Y coordinate below.
pub const VERTICAL_OFFSET: i32 = -5;

// =============================================================================
// Chrome row: title, clock, connectivity glyphs
// =============================================================================

/// Title anchor, top-left of the chrome row.
pub const TITLE_POS: Point = Point::new(5, 2 + VERTICAL_OFFSET);

/// Clock text anchor ("HH:MM:SS" or the unsynced fallback).
pub const TIME_POS: Point = Point::new(140, 2 + VERTICAL_OFFSET);

/// First connectivity glyph anchor; glyphs advance by [`STATUS_GLYPH_STEP`].
pub const STATUS_POS: Point = Point::new(190, 2 + VERTICAL_OFFSET);

/// Horizontal advance between connectivity glyphs.
pub const STATUS_GLYPH_STEP: i32 = 12;

// =============================================================================
// Value area: alternating large CO2 / THI view
// =============================================================================

/// Label anchor ("CO2:" / "THI:"), directly above the value.
pub const LARGE_LABEL_POS: Point = Point::new(15, 20 + VERTICAL_OFFSET);

/// Large numeric value anchor.
pub const LARGE_VALUE_POS: Point = Point::new(15, 40 + VERTICAL_OFFSET);

/// "no data" / startup status message anchor.
pub const NO_DATA_POS: Point = Point::new(40, 55 + VERTICAL_OFFSET);

/// Transient connection-notice anchor (bottom strip).
pub const NOTICE_POS: Point = Point::new(5, 123);

// =============================================================================
// Repaint regions (cleared before their content is redrawn)
// =============================================================================

/// Clock sub-region of the chrome row.
pub const TIME_REGION: Rectangle = Rectangle::new(Point::new(140, 0), Size::new(50, 12));

/// Connectivity-glyph sub-region of the chrome row.
pub const STATUS_REGION: Rectangle = Rectangle::new(Point::new(190, 0), Size::new(50, 12));

/// Everything between the chrome row and the notice strip.
pub const BODY_REGION: Rectangle = Rectangle::new(Point::new(0, 12), Size::new(SCREEN_WIDTH, 106));

/// Bottom strip reserved for transient notices.
pub const NOTICE_REGION: Rectangle =
    Rectangle::new(Point::new(0, 118), Size::new(SCREEN_WIDTH, SCREEN_HEIGHT - 118));

// =============================================================================
// Unit Tests
// =============================================================================
