//! ST7789 panel setup and frame pushing

use airmon_core::display::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, Panel};
use airmon_core::framebuffer::FrameBuffer;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use mipidsi::Builder;
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7789;
use mipidsi::options::ColorInversion;

use crate::error::AppError;

/// Bytes batched per SPI transfer by the display interface.
pub const SPI_BUFFER_LEN: usize = 512;

/// A display driver plus the backlight that has to be lit for it to show.
pub struct BacklitPanel<D, BL> {
    display: D,
    #[allow(dead_code, reason = "held so the pin stays driven high")]
    backlight: BL,
}

impl<D, BL> BacklitPanel<D, BL>
where
    D: DrawTarget<Color = Rgb565>,
    BL: OutputPin,
{
    /// Switch the backlight on and take ownership of the display.
    pub fn new(display: D, mut backlight: BL) -> Result<Self, AppError> {
        backlight.set_high().map_err(AppError::gpio)?;
        Ok(Self { display, backlight })
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}

impl<D, BL> Panel for BacklitPanel<D, BL>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: core::fmt::Debug,
{
    type Error = D::Error;

    fn render(&mut self, frame: &mut FrameBuffer) -> Result<(), Self::Error> {
        frame.flush(&mut self.display)
    }
}

/// Initialize the 240x240 ST7789 on `spi` and light its backlight.
///
/// `buffer` batches pixel writes and must outlive the panel. `delay` is only
/// borrowed for the reset sequence.
pub fn init_st7789<'a, SPI, DC, BL, D>(
    spi: SPI,
    dc: DC,
    backlight: BL,
    buffer: &'a mut [u8],
    delay: &mut D,
) -> Result<impl Panel + use<'a, SPI, DC, BL, D>, AppError>
where
    SPI: SpiDevice + 'a,
    DC: OutputPin + 'a,
    BL: OutputPin + 'a,
    D: DelayNs,
{
    let di = SpiInterface::new(spi, dc, buffer);
    let display = Builder::new(ST7789, di)
        .display_size(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX)
        .invert_colors(ColorInversion::Inverted)
        .init(delay)
        .map_err(AppError::display_init)?;

    log::info!("ST7789 ready, {DISPLAY_WIDTH_PX}x{DISPLAY_HEIGHT_PX}");

    BacklitPanel::new(display, backlight)
}
