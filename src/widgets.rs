//! Drawing functions for the monitor's fixed screen regions.
//!
//! Each function paints one region: it clears the region's background first,
//! then draws its content at the coordinate-table position. Callers (the
//! presenter) decide *when* a region repaints; these functions only know
//! *how*. Everything draws through `DrawTarget<Color = Rgb565>`, so the same
//! code renders to the ST7789 framebuffer on target and to a plain byte
//! canvas in tests.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;

use crate::colors::BLACK;
use crate::config::layout::{
    LARGE_LABEL_POS, LARGE_VALUE_POS, NO_DATA_POS, NOTICE_POS, NOTICE_REGION, STATUS_GLYPH_STEP,
    STATUS_POS, STATUS_REGION, TIME_POS, TIME_REGION, TITLE_POS,
};
use crate::status::ConnectivityStatus;
use crate::styles::{CHROME_STYLE, LABEL_FONT, LABEL_STYLE, NOTICE_STYLE, TOP_LEFT, VALUE_STYLE};

/// Title shown in the chrome row.
pub const TITLE: &str = "AirWatch";

/// Message shown in the value area until the first reading decodes.
pub const NO_DATA_MESSAGE: &str = "NO DATA";

const CLEAR_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(BLACK);

fn clear_region<D>(display: &mut D, region: Rectangle)
where
    D: DrawTarget<Color = Rgb565>,
{
    region.into_styled(CLEAR_STYLE).draw(display).ok();
}

/// Draw the static title. Only needed once per full clear.
pub fn draw_title<D>(display: &mut D)
where
    D: DrawTarget<Color = Rgb565>,
{
    Text::with_text_style(TITLE, TITLE_POS, CHROME_STYLE, TOP_LEFT)
        .draw(display)
        .ok();
}

/// Repaint the clock text ("HH:MM:SS" or the unsynced fallback).
pub fn draw_time<D>(display: &mut D, time_text: &str)
where
    D: DrawTarget<Color = Rgb565>,
{
    clear_region(display, TIME_REGION);
    Text::with_text_style(time_text, TIME_POS, CHROME_STYLE, TOP_LEFT)
        .draw(display)
        .ok();
}

/// Repaint the connectivity glyphs, one colored character per service.
pub fn draw_status<D>(display: &mut D, status: &ConnectivityStatus)
where
    D: DrawTarget<Color = Rgb565>,
{
    clear_region(display, STATUS_REGION);
    let mut pos = STATUS_POS;
    for (glyph, state) in status.glyphs() {
        let style = MonoTextStyle::new(LABEL_FONT, state.glyph_color());
        let mut buf = [0u8; 4];
        Text::with_text_style(glyph.encode_utf8(&mut buf), pos, style, TOP_LEFT)
            .draw(display)
            .ok();
        pos.x += STATUS_GLYPH_STEP;
    }
}

/// Repaint the value area with the no-data message.
pub fn draw_no_data<D>(display: &mut D, body: Rectangle)
where
    D: DrawTarget<Color = Rgb565>,
{
    clear_region(display, body);
    Text::with_text_style(NO_DATA_MESSAGE, NO_DATA_POS, LABEL_STYLE, TOP_LEFT)
        .draw(display)
        .ok();
}

/// Repaint the value area with a startup status line.
pub fn draw_boot_status<D>(display: &mut D, body: Rectangle, message: &str)
where
    D: DrawTarget<Color = Rgb565>,
{
    clear_region(display, body);
    Text::with_text_style(message, NO_DATA_POS, NOTICE_STYLE, TOP_LEFT)
        .draw(display)
        .ok();
}

/// Repaint the value area with one large labeled value. The label sits
/// directly above the value so the pair reads as one unit.
pub fn draw_reading_view<D>(display: &mut D, body: Rectangle, label: &str, value: &str)
where
    D: DrawTarget<Color = Rgb565>,
{
    clear_region(display, body);
    Text::with_text_style(label, LARGE_LABEL_POS, LABEL_STYLE, TOP_LEFT)
        .draw(display)
        .ok();
    Text::with_text_style(value, LARGE_VALUE_POS, VALUE_STYLE, TOP_LEFT)
        .draw(display)
        .ok();
}

/// Repaint the notice strip; `None` just clears it.
pub fn draw_notice<D>(display: &mut D, notice: Option<&str>)
where
    D: DrawTarget<Color = Rgb565>,
{
    clear_region(display, NOTICE_REGION);
    if let Some(text) = notice {
        Text::with_text_style(text, NOTICE_POS, NOTICE_STYLE, TOP_LEFT)
            .draw(display)
            .ok();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
