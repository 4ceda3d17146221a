//! RAM framebuffer with per-pixel change detection.
//!
//! Screens draw into this buffer instead of the SPI panel. After drawing
//! completes, only the rectangle containing changed pixels is pushed to the
//! hardware in a single `fill_contiguous` call. Refreshing four lines of text
//! every second therefore only resends the digits that moved.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    /// Expand the dirty region to include the given pixel coordinate.
    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Create a new dirty rect covering a single pixel.
    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }
}

/// Heap-backed framebuffer implementing `DrawTarget<Color = Rgb565>`.
///
/// A 240x240 panel takes 115,200 bytes. The whole buffer starts dirty so the
/// first flush overwrites whatever the panel showed at power-up.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRect>,
}

impl FrameBuffer {
    /// Allocate a framebuffer of `size` filled with black pixels.
    pub fn new(size: Size) -> Self {
        let width = size.width as usize;
        let height = size.height as usize;
        let mut frame = Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; width * height],
            dirty: None,
        };
        frame.invalidate();
        frame
    }

    /// Mark every pixel dirty so the next flush resends the whole frame.
    pub fn invalidate(&mut self) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        self.dirty = Some(DirtyRect {
            min_x: 0,
            min_y: 0,
            max_x: self.width - 1,
            max_y: self.height - 1,
        });
    }

    /// Area that the next flush would send, if any.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(|rect| {
            Rectangle::new(
                Point::new(rect.min_x as i32, rect.min_y as i32),
                Size::new(
                    (rect.max_x - rect.min_x + 1) as u32,
                    (rect.max_y - rect.min_y + 1) as u32,
                ),
            )
        })
    }

    /// Color of a pixel, `None` outside the frame.
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as usize, point.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Write a single pixel, expanding the dirty rect only if the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * self.width + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    /// Flush the dirty region to a hardware display, then reset the dirty state.
    ///
    /// Only the bounding rectangle of changed pixels is sent via
    /// `fill_contiguous`. If nothing changed, this is a no-op.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(area) = self.dirty_area() else {
            return Ok(());
        };
        self.dirty = None;

        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            area.size.width, area.size.height, area.top_left.x, area.top_left.y
        );

        let (left, top) = (area.top_left.x as usize, area.top_left.y as usize);
        let (width, height) = (area.size.width as usize, area.size.height as usize);
        let pixel_iter = self
            .pixels
            .chunks_exact(self.width)
            .skip(top)
            .take(height)
            .flat_map(|row| row[left..left + width].iter().copied());

        display.fill_contiguous(&area, pixel_iter)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if bounds.contains(point) {
                self.set_pixel(point.x as usize, point.y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_solid(&self.bounding_box(), color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    fn small() -> FrameBuffer {
        FrameBuffer::new(Size::new(8, 4))
    }

    #[test]
    fn test_new_frame_is_fully_dirty() {
        let frame = small();
        assert_eq!(
            frame.dirty_area(),
            Some(Rectangle::new(Point::zero(), Size::new(8, 4)))
        );
    }

    #[test]
    fn test_flush_clears_dirty_state() {
        let mut frame = small();
        let mut display = MockDisplay::<Rgb565>::new();
        frame.flush(&mut display).unwrap();
        assert_eq!(frame.dirty_area(), None);
    }

    #[test]
    fn test_unchanged_pixels_stay_clean() {
        let mut frame = small();
        let mut display = MockDisplay::<Rgb565>::new();
        frame.flush(&mut display).unwrap();

        frame.clear(Rgb565::BLACK).unwrap();
        assert_eq!(frame.dirty_area(), None);
    }

    #[test]
    fn test_dirty_rect_bounds_changed_pixels() {
        let mut frame = small();
        let mut display = MockDisplay::<Rgb565>::new();
        frame.flush(&mut display).unwrap();

        Pixel(Point::new(2, 1), Rgb565::GREEN).draw(&mut frame).unwrap();
        Pixel(Point::new(5, 3), Rgb565::RED).draw(&mut frame).unwrap();
        // Off-screen pixels are ignored.
        Pixel(Point::new(-1, 9), Rgb565::RED).draw(&mut frame).unwrap();

        assert_eq!(
            frame.dirty_area(),
            Some(Rectangle::new(Point::new(2, 1), Size::new(4, 3)))
        );
        assert_eq!(frame.pixel(Point::new(2, 1)), Some(Rgb565::GREEN));
        assert_eq!(frame.pixel(Point::new(8, 0)), None);
    }

    #[test]
    fn test_flush_pushes_changed_region() {
        let mut frame = small();
        let mut display = MockDisplay::<Rgb565>::new();
        frame.flush(&mut display).unwrap();

        let square = Rectangle::new(Point::new(1, 1), Size::new(2, 2));
        frame.fill_solid(&square, Rgb565::GREEN).unwrap();

        let mut second = MockDisplay::<Rgb565>::new();
        frame.flush(&mut second).unwrap();
        assert_eq!(second.get_pixel(Point::new(1, 1)), Some(Rgb565::GREEN));
        assert_eq!(second.get_pixel(Point::new(2, 2)), Some(Rgb565::GREEN));
        assert_eq!(second.get_pixel(Point::new(0, 0)), None);
    }
}
