//! Async ST7789 display driver for the 1.14" 240x135 panel (Pimoroni
//! Display Pack pinout).
//!
//! The driver is split into two components:
//! - [`St7789Renderer`]: Implements `DrawTarget`, writes to the framebuffer
//! - [`St7789Flusher`]: Owns SPI + control pins, sends the framebuffer via DMA
//!
//! A single static framebuffer (64,800 bytes for 240x135 RGB565) is plenty at
//! the 10 Hz tick rate; the presenter already repaints only changed regions,
//! so the buffer is stable between flushes and the panel never flickers.
//!
//! The 240x135 area sits offset inside the controller's 240x320 RAM; in
//! landscape the visible window starts at column 40, row 53.

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Spi};
use embassy_time::Timer;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;

/// Display dimensions (landscape mode after 90 degree rotation).
pub const WIDTH: usize = 240;
pub const HEIGHT: usize = 135;
const BUFFER_SIZE: usize = WIDTH * HEIGHT * 2;

/// Panel window offsets inside the controller RAM (landscape).
const X_OFFSET: u16 = 40;
const Y_OFFSET: u16 = 53;

static mut FRAMEBUFFER: [u8; BUFFER_SIZE] = [0u8; BUFFER_SIZE];

/// Hand out the framebuffer.
///
/// # Safety
/// Must only be called once; the caller owns the buffer afterwards.
pub unsafe fn framebuffer() -> &'static mut [u8; BUFFER_SIZE] {
    unsafe { &mut *core::ptr::addr_of_mut!(FRAMEBUFFER) }
}

// ST7789 Commands
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

// MADCTL flags
const MADCTL_MX: u8 = 0x40; // Column address order
const MADCTL_MV: u8 = 0x20; // Row/column exchange

/// ST7789 flusher - owns SPI and handles async DMA transfers.
pub struct St7789Flusher<'d> {
    spi: Spi<'d, SPI0, Async>,
    dc: Output<'d>,
    cs: Output<'d>,
}

impl<'d> St7789Flusher<'d> {
    pub fn new(spi: Spi<'d, SPI0, Async>, dc: Output<'d>, cs: Output<'d>) -> Self {
        Self { spi, dc, cs }
    }

    /// Initialize the display hardware and pre-set the full-screen window.
    pub async fn init(&mut self) {
        // Software reset
        self.write_command(SWRESET).await;
        Timer::after_millis(150).await;

        // Exit sleep mode
        self.write_command(SLPOUT).await;
        Timer::after_millis(10).await;

        // Set pixel format to RGB565 (16-bit)
        self.write_command(COLMOD).await;
        self.write_data(&[0x55]).await;

        // Memory access control for 90 degree rotation (landscape)
        self.write_command(MADCTL).await;
        self.write_data(&[MADCTL_MV | MADCTL_MX]).await;

        // Inversion on (required for this panel)
        self.write_command(INVON).await;
        Timer::after_millis(10).await;

        // Normal display mode
        self.write_command(NORON).await;
        Timer::after_millis(10).await;

        // Display on
        self.write_command(DISPON).await;
        Timer::after_millis(10).await;

        // Window covers the visible 240x135 area; flushes only send RAMWR.
        self.set_window(0, 0, WIDTH as u16, HEIGHT as u16).await;
    }

    /// Send a command byte (DC low, CS low during transfer).
    async fn write_command(&mut self, cmd: u8) {
        self.cs.set_low();
        self.dc.set_low();
        self.spi.write(&[cmd]).await.ok();
        self.cs.set_high();
    }

    /// Send data bytes (DC high, CS low during transfer).
    async fn write_data(&mut self, data: &[u8]) {
        self.cs.set_low();
        self.dc.set_high();
        self.spi.write(data).await.ok();
        self.cs.set_high();
    }

    /// Set the drawing window, applying the panel offsets.
    async fn set_window(&mut self, x: u16, y: u16, w: u16, h: u16) {
        let x0 = x + X_OFFSET;
        let y0 = y + Y_OFFSET;
        let x1 = x0 + w - 1;
        let y1 = y0 + h - 1;

        self.write_command(CASET).await;
        self.write_data(&[(x0 >> 8) as u8, x0 as u8, (x1 >> 8) as u8, x1 as u8])
            .await;

        self.write_command(RASET).await;
        self.write_data(&[(y0 >> 8) as u8, y0 as u8, (y1 >> 8) as u8, y1 as u8])
            .await;
    }

    /// Flush the framebuffer to the display via async DMA transfer.
    pub async fn flush_buffer(&mut self, buffer: &[u8]) {
        self.cs.set_low();
        self.dc.set_low();
        // Single-byte command; DMA setup would cost more than it saves.
        self.spi.blocking_write(&[RAMWR]).ok();
        self.dc.set_high();
        self.spi.write(buffer).await.ok();
        self.cs.set_high();
    }
}

/// ST7789 renderer - implements DrawTarget, writes to the framebuffer.
pub struct St7789Renderer<'a> {
    framebuffer: &'a mut [u8],
}

impl<'a> St7789Renderer<'a> {
    pub fn new(framebuffer: &'a mut [u8]) -> Self {
        Self { framebuffer }
    }

    #[inline]
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if x >= 0 && x < WIDTH as i32 && y >= 0 && y < HEIGHT as i32 {
            let idx = (y as usize * WIDTH + x as usize) * 2;
            let raw: RawU16 = color.into();
            let bytes = raw.into_inner().to_be_bytes();
            self.framebuffer[idx] = bytes[0];
            self.framebuffer[idx + 1] = bytes[1];
        }
    }
}

impl OriginDimensions for St7789Renderer<'_> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for St7789Renderer<'_> {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &embedded_graphics::primitives::Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let drawable_area = area.intersection(&self.bounding_box());
        if drawable_area.size == Size::zero() {
            return Ok(());
        }

        let raw: RawU16 = color.into();
        let bytes = raw.into_inner().to_be_bytes();
        let x_start = drawable_area.top_left.x as usize;
        let width = drawable_area.size.width as usize;

        for y in drawable_area.rows() {
            let row_start = y as usize * WIDTH * 2;
            for x in x_start..x_start + width {
                let idx = row_start + x * 2;
                self.framebuffer[idx] = bytes[0];
                self.framebuffer[idx + 1] = bytes[1];
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let raw: RawU16 = color.into();
        let bytes = raw.into_inner().to_be_bytes();
        for chunk in self.framebuffer.chunks_exact_mut(2) {
            chunk[0] = bytes[0];
            chunk[1] = bytes[1];
        }
        Ok(())
    }
}
