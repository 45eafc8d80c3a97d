/*
 *  display/drivers/mock.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  In-memory panel for headless runs and tests
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

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::DisplayConfig;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{check_rotation, DisplayCapabilities, DisplayDriver};

/// Panel that lives in memory.
///
/// Backs `driver: headless` so the monitor can run on a box with no I2C
/// bus, and gives tests a handle on every frame that was flushed.
#[derive(Debug, Clone)]
pub struct MockDriver {
    framebuffer: FrameBuffer,
    capabilities: DisplayCapabilities,
    /// Shared so tests can keep a handle after the driver moves into the loop
    state: Arc<Mutex<MockDriverState>>,
}

#[derive(Debug, Default)]
pub struct MockDriverState {
    pub init_count: usize,
    pub flush_count: usize,
    pub clear_count: usize,
    pub last_brightness: Option<u8>,
    pub last_rotation: Option<u16>,
    pub last_invert: Option<bool>,
    pub is_initialized: bool,
    /// Copy of the framebuffer taken at the most recent flush
    pub last_frame: Option<FrameBuffer>,

    /// Simulate failures (for error testing)
    pub simulate_flush_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let width = config.width.unwrap_or(DISPLAY_WIDTH);
        let height = config.height.unwrap_or(DISPLAY_HEIGHT);
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "headless panel cannot be {}x{}",
                width, height
            )));
        }

        let capabilities = DisplayCapabilities {
            width,
            height,
        };

        Ok(Self {
            framebuffer: FrameBuffer::new(width, height),
            capabilities,
            state: Arc::new(Mutex::new(MockDriverState::default())),
        })
    }

    pub fn new_with_size(width: u32, height: u32) -> Result<Self, DisplayError> {
        let config = DisplayConfig {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        };
        Self::new(&config)
    }

    /// Handle on the shared state, valid after the driver is moved.
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    /// Current (unflushed) framebuffer.
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    fn lock(&self) -> MutexGuard<'_, MockDriverState> {
        // a panicking test thread must not take the panel down with it
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();
        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("simulated init failure".to_string()));
        }
        state.init_count += 1;
        state.is_initialized = true;
        debug!("headless panel {}x{} ready", self.capabilities.width, self.capabilities.height);
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        self.lock().last_brightness = Some(value);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let snapshot = self.framebuffer.clone();
        let mut state = self.lock();
        if state.simulate_flush_failure {
            return Err(DisplayError::Other("simulated flush failure".to_string()));
        }
        state.flush_count += 1;
        state.last_frame = Some(snapshot);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.lock().clear_count += 1;
        self.framebuffer.blank();
        self.flush()
    }

    fn write_buffer(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        self.framebuffer.load_packed(buffer)?;
        self.flush()
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.lock().last_invert = Some(inverted);
        Ok(())
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        check_rotation(degrees)?;
        self.lock().last_rotation = Some(degrees);
        Ok(())
    }
}

impl DrawTarget for MockDriver {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.framebuffer.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.clear(color)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.framebuffer.fill_contiguous(area, colors)
    }
}

impl OriginDimensions for MockDriver {
    fn size(&self) -> Size {
        Size::new(self.capabilities.width, self.capabilities.height)
    }
}
