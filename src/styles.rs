//! Pre-computed static text styles to avoid per-frame object construction.
//!
//! `MonoTextStyle` and `TextStyle` are `const`-constructible, so every style
//! used by the widgets lives in the binary's read-only data section. Glyph
//! colors vary at runtime; those call sites build a style from
//! [`LABEL_FONT`] with the color they need.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::text::{Alignment, Baseline, TextStyle, TextStyleBuilder};
use profont::{PROFONT_18_POINT, PROFONT_24_POINT};

use crate::colors::{PALE_CYAN, WHITE};

/// Left-aligned, top-baseline text. The coordinate table stores top-left
/// anchors, so every widget draws with this style.
pub const TOP_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();

/// Small font (6x10 pixels) for the chrome row and notices. Exposed for
/// dynamic-color styles: `MonoTextStyle::new(LABEL_FONT, color)`.
pub const LABEL_FONT: &MonoFont = &FONT_6X10;

/// Small white text: title and clock.
pub const CHROME_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, WHITE);

/// Small pale text: transient notices.
pub const NOTICE_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, PALE_CYAN);

/// Medium white text: the "CO2:" / "THI:" label and status messages
/// (`ProFont` 18pt).
pub const LABEL_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&PROFONT_18_POINT, WHITE);

/// Large white text: the alternating numeric value (`ProFont` 24pt).
pub const VALUE_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&PROFONT_24_POINT, WHITE);
