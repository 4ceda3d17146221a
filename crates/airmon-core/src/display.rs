//! Screens and the panel abstraction
//!
//! Two screens exist: the "collecting data" notice shown during burn-in and
//! the four-line readout shown once per second afterwards. Both are drawn
//! into any `DrawTarget<Color = Rgb565>`, normally the [`FrameBuffer`], which
//! a [`Panel`] then pushes to the hardware.

use core::fmt::Write;

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, ascii::FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::air_quality::AirQualityScore;
use crate::framebuffer::FrameBuffer;
use crate::metrics::QualityLevel;

pub const DISPLAY_WIDTH_PX: u16 = 240;
pub const DISPLAY_HEIGHT_PX: u16 = 240;

/// Font used for every line on screen.
pub const FONT: &MonoFont<'static> = &FONT_10X20;

/// Left edge of the text block.
const TEXT_X_PX: i32 = 0;

/// Top of the first text line.
const TEXT_Y_PX: i32 = 30;

/// Distance between the tops of two consecutive lines.
const LINE_PITCH_PX: i32 = 28;

/// Capacity of one formatted line.
pub const LINE_CAPACITY: usize = 32;

pub const TEXT_COLOR: Rgb565 = Rgb565::GREEN;
pub const BACKGROUND_COLOR: Rgb565 = Rgb565::BLACK;

const WARMING_UP_LINES: [&str; 3] = ["Collecting data", "for air quality", "measurements."];

/// The display hardware.
///
/// Implementations push the frame (usually only its dirty region, see
/// [`FrameBuffer::flush`]) to a panel or a window.
pub trait Panel {
    type Error: core::fmt::Debug;

    fn render(&mut self, frame: &mut FrameBuffer) -> Result<(), Self::Error>;
}

impl<P: Panel + ?Sized> Panel for &mut P {
    type Error = P::Error;

    fn render(&mut self, frame: &mut FrameBuffer) -> Result<(), Self::Error> {
        (**self).render(frame)
    }
}

pub type Line = heapless::String<LINE_CAPACITY>;

/// Values shown on one refresh of the readout screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readout {
    /// Compensated temperature, °C.
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
    pub air_quality: AirQualityScore,
}

impl Readout {
    pub fn temperature_line(&self) -> Line {
        format_line(format_args!("Tmp: {:.2} *C", self.temperature))
    }

    pub fn humidity_line(&self) -> Line {
        format_line(format_args!("Hum: {:.2} %RH", self.humidity))
    }

    pub fn pressure_line(&self) -> Line {
        format_line(format_args!("Prs: {:.2} hPa", self.pressure))
    }

    pub fn air_quality_line(&self) -> Line {
        format_line(format_args!("Air: {:.2}", self.air_quality.total()))
    }

    /// The four lines with the color each one is drawn in. Only the air
    /// quality line is graded.
    pub fn lines(&self) -> [(Line, Rgb565); 4] {
        [
            (self.temperature_line(), TEXT_COLOR),
            (self.humidity_line(), TEXT_COLOR),
            (self.pressure_line(), TEXT_COLOR),
            (
                self.air_quality_line(),
                QualityLevel::from_air_quality(self.air_quality.total()).color(),
            ),
        ]
    }
}

/// Format into a fixed-capacity line. Text past the capacity is dropped.
fn format_line(args: core::fmt::Arguments<'_>) -> Line {
    let mut line = Line::new();
    line.write_fmt(args).ok();
    line
}

fn draw_line<D>(target: &mut D, index: usize, text: &str, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = MonoTextStyle::new(FONT, color);
    let origin = Point::new(TEXT_X_PX, TEXT_Y_PX + LINE_PITCH_PX * index as i32);
    Text::with_baseline(text, origin, style, Baseline::Top).draw(target)?;
    Ok(())
}

/// Clear the target and show the burn-in notice.
pub fn draw_warming_up<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(BACKGROUND_COLOR)?;
    for (index, text) in WARMING_UP_LINES.iter().enumerate() {
        draw_line(target, index, text, TEXT_COLOR)?;
    }
    Ok(())
}

/// Clear the target and draw the four readout lines.
pub fn draw_readout<D>(target: &mut D, readout: &Readout) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(BACKGROUND_COLOR)?;
    for (index, (text, color)) in readout.lines().iter().enumerate() {
        draw_line(target, index, text, *color)?;
    }
    Ok(())
}
