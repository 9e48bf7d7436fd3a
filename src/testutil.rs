//! Host-test helpers. Compiled only under `cfg(test)`.

use std::collections::HashSet;

use embedded_graphics::Pixel;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::config::layout::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// A 240x135 draw target that records how much painting happened instead of
/// storing an image. Out-of-bounds pixels are dropped, matching the real
/// framebuffer's clipping.
pub struct TestCanvas {
    /// In-bounds pixels painted since construction or [`reset`](Self::reset).
    pub pixels_drawn: usize,
    /// Distinct colors painted.
    pub colors_used: HashSet<Rgb565>,
}

impl TestCanvas {
    pub fn new() -> Self {
        Self {
            pixels_drawn: 0,
            colors_used: HashSet::new(),
        }
    }

    /// Clear the paint counters (not a display clear).
    pub fn reset(&mut self) {
        self.pixels_drawn = 0;
        self.colors_used.clear();
    }
}

impl OriginDimensions for TestCanvas {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for TestCanvas {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && point.x < SCREEN_WIDTH as i32
                && point.y >= 0
                && point.y < SCREEN_HEIGHT as i32
            {
                self.pixels_drawn += 1;
                self.colors_used.insert(color);
            }
        }
        Ok(())
    }
}
