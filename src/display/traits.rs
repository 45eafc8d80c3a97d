/*
 *  display/traits.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Panel driver abstraction
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

use crate::display::error::DisplayError;

/// What a panel can do, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,
}

/// Minimal hardware abstraction every panel implements.
///
/// Drivers also implement `embedded_graphics::draw_target::DrawTarget` over an
/// internal framebuffer; drawing only touches that buffer and nothing reaches
/// the glass until `flush`.
pub trait DisplayDriver: Send {
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Bring the controller up. Safe to call more than once.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Contrast, 0-255. Drivers without a contrast register refuse.
    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError>;

    /// Push the framebuffer to the panel.
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Blank the framebuffer and flush it.
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Replace the framebuffer with packed 1bpp rows (LSB first) and flush.
    fn write_buffer(&mut self, buffer: &[u8]) -> Result<(), DisplayError>;

    fn set_invert(&mut self, _inverted: bool) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }

    /// 0, 90, 180 or 270 degrees.
    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        check_rotation(degrees)?;
        Err(DisplayError::UnsupportedOperation)
    }
}

pub fn check_rotation(degrees: u16) -> Result<(), DisplayError> {
    match degrees {
        0 | 90 | 180 | 270 => Ok(()),
        _ => Err(DisplayError::InvalidRotation(degrees)),
    }
}
