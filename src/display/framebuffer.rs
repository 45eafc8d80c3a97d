/*
 *  display/framebuffer.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Runtime-sized 1bpp framebuffer
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PointsIter, Rectangle};

use crate::display::error::DisplayError;

/// Monochrome framebuffer sized at runtime, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    buf: Vec<BinaryColor>,
    w: usize,
    h: usize,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![BinaryColor::Off; w * h], w, h }
    }

    pub fn blank(&mut self) {
        self.buf.fill(BinaryColor::Off);
    }

    /// Map (x,y) to linear index; None when off-canvas
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        self.idx(Point::new(x as i32, y as i32)).map(|i| self.buf[i])
    }

    pub fn lit_count(&self) -> usize {
        self.buf.iter().filter(|p| p.is_on()).count()
    }

    /// Smallest rectangle holding every lit pixel.
    pub fn lit_bounds(&self) -> Option<Rectangle> {
        let mut min = (usize::MAX, usize::MAX);
        let mut max = (0usize, 0usize);
        let mut any = false;
        for (i, p) in self.buf.iter().enumerate() {
            if p.is_on() {
                let (x, y) = (i % self.w, i / self.w);
                min = (min.0.min(x), min.1.min(y));
                max = (max.0.max(x), max.1.max(y));
                any = true;
            }
        }
        any.then(|| {
            Rectangle::with_corners(
                Point::new(min.0 as i32, min.1 as i32),
                Point::new(max.0 as i32, max.1 as i32),
            )
        })
    }

    /// 8 pixels per byte, LSB first, row-major.
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.buf.len().div_ceil(8)];
        for (i, p) in self.buf.iter().enumerate() {
            if p.is_on() {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        bytes
    }

    /// Inverse of `to_packed_bytes`; the length must match exactly.
    pub fn load_packed(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        let expected = self.buf.len().div_ceil(8);
        if bytes.len() != expected {
            return Err(DisplayError::BufferSizeMismatch { expected, actual: bytes.len() });
        }
        for (i, p) in self.buf.iter_mut().enumerate() {
            *p = BinaryColor::from(bytes[i / 8] & (1 << (i % 8)) != 0);
        }
        Ok(())
    }

    /// Lit pixels as `(x, y)`, for replaying onto another target.
    pub fn lit_points(&self) -> impl Iterator<Item = Point> + '_ {
        let w = self.w;
        self.buf
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_on())
            .map(move |(i, _)| Point::new((i % w) as i32, (i / w) as i32))
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // clipped per pixel, areas may hang off the canvas
        for (p, c) in area.points().zip(colors) {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn test_off_canvas_pixels_are_dropped() {
        let mut fb = FrameBuffer::new(8, 4);
        fb.draw_iter([
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(8, 0), BinaryColor::On),
            Pixel(Point::new(7, 3), BinaryColor::On),
        ])
        .unwrap();
        assert_eq!(fb.lit_count(), 1);
        assert_eq!(fb.pixel(7, 3), Some(BinaryColor::On));
        assert_eq!(fb.pixel(8, 3), None);
    }

    #[test]
    fn test_fill_clips_overhanging_area() {
        let mut fb = FrameBuffer::new(8, 4);
        let area = Rectangle::new(Point::new(6, 2), Size::new(4, 4));
        fb.fill_solid(&area, BinaryColor::On).unwrap();
        // only the 2x2 corner lands on the canvas
        assert_eq!(fb.lit_count(), 4);
        assert_eq!(fb.lit_bounds(), Some(Rectangle::new(Point::new(6, 2), Size::new(2, 2))));
    }

    #[test]
    fn test_packed_bytes_reload() {
        let mut fb = FrameBuffer::new(16, 2);
        Line::new(Point::new(0, 0), Point::new(15, 0))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();
        let bytes = fb.to_packed_bytes();
        assert_eq!(bytes, vec![0xFF, 0xFF, 0x00, 0x00]);

        let mut other = FrameBuffer::new(16, 2);
        other.load_packed(&bytes).unwrap();
        assert_eq!(other, fb);
        assert!(other.load_packed(&bytes[..3]).is_err());
    }

    #[test]
    fn test_blank_frame_has_no_bounds() {
        let fb = FrameBuffer::new(128, 64);
        assert_eq!(fb.lit_bounds(), None);
        assert_eq!(fb.lit_points().count(), 0);
    }
}
