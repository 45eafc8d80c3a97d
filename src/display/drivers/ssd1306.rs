/*
 *  display/drivers/ssd1306.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  SSD1306 over I2C
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

use linux_embedded_hal::I2cdev;
use ssd1306::{
    mode::{BufferedGraphicsMode, DisplayConfig as _},
    prelude::*,
    size::{DisplaySize128x32, DisplaySize128x64},
    I2CDisplayInterface,
    Ssd1306,
};

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::config::DisplayConfig;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{check_rotation, DisplayCapabilities, DisplayDriver};

use log::{debug, info};

pub struct Ssd1306Driver {
    panel: Ssd1306Variants,
    framebuffer: FrameBuffer,
    capabilities: DisplayCapabilities,
}

/// The ssd1306 crate types the geometry, so each supported size is a variant.
enum Ssd1306Variants {
    Size128x64(Ssd1306<I2CInterface<I2cdev>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>),
    Size128x32(Ssd1306<I2CInterface<I2cdev>, DisplaySize128x32, BufferedGraphicsMode<DisplaySize128x32>>),
}

/// Runs the same body against whichever variant is live.
macro_rules! with_panel {
    ($variants:expr, $panel:ident => $body:expr) => {
        match $variants {
            Ssd1306Variants::Size128x64($panel) => $body,
            Ssd1306Variants::Size128x32($panel) => $body,
        }
    };
}

// The framebuffer and layout are landscape only, so quarter turns are refused
fn rotation_for(degrees: u16) -> Result<DisplayRotation, DisplayError> {
    check_rotation(degrees)?;
    match degrees {
        0 => Ok(DisplayRotation::Rotate0),
        180 => Ok(DisplayRotation::Rotate180),
        _ => Err(DisplayError::InvalidConfiguration(format!(
            "SSD1306 rotation {} would turn the panel portrait; use 0 or 180",
            degrees
        ))),
    }
}

fn brightness_for(value: u8) -> Brightness {
    match value {
        0..=63 => Brightness::DIMMEST,
        64..=127 => Brightness::DIM,
        128..=191 => Brightness::NORMAL,
        _ => Brightness::BRIGHTEST,
    }
}

impl Ssd1306Driver {
    /// Opens `i2c_bus_path` and talks to the controller at `address`
    /// (typically 0x3C or 0x3D).
    pub fn new_i2c(
        i2c_bus_path: &str,
        address: u8,
        config: &DisplayConfig,
    ) -> Result<Self, DisplayError> {
        info!("Initializing SSD1306 on {} at address 0x{:02X}", i2c_bus_path, address);

        let i2c = I2cdev::new(i2c_bus_path)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", i2c_bus_path, e)))?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);

        let width = config.width.unwrap_or(DISPLAY_WIDTH);
        let height = config.height.unwrap_or(DISPLAY_HEIGHT);
        let rotation = rotation_for(config.rotate_deg.unwrap_or(0))?;

        let panel = match (width, height) {
            (128, 64) => Ssd1306Variants::Size128x64(
                Ssd1306::new(interface, DisplaySize128x64, rotation).into_buffered_graphics_mode(),
            ),
            (128, 32) => Ssd1306Variants::Size128x32(
                Ssd1306::new(interface, DisplaySize128x32, rotation).into_buffered_graphics_mode(),
            ),
            _ => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Unsupported SSD1306 size: {}x{}", width, height)
                ));
            }
        };

        let capabilities = DisplayCapabilities {
            width,
            height,
        };

        let mut driver = Self {
            panel,
            framebuffer: FrameBuffer::new(width, height),
            capabilities,
        };

        driver.init()?;

        if let Some(brightness) = config.brightness {
            driver.set_brightness(brightness)?;
        }
        if config.invert.unwrap_or(false) {
            driver.set_invert(true)?;
        }

        info!("SSD1306 ready ({}x{})", width, height);
        Ok(driver)
    }

    /// Copy the framebuffer into the controller's buffer and push it out.
    fn flush_framebuffer(&mut self) -> Result<(), DisplayError> {
        let framebuffer = &self.framebuffer;
        with_panel!(&mut self.panel, panel => {
            panel.clear_buffer();
            for p in framebuffer.lit_points() {
                panel.set_pixel(p.x as u32, p.y as u32, true);
            }
            panel.flush()?;
        });
        Ok(())
    }
}

impl DisplayDriver for Ssd1306Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let result = with_panel!(&mut self.panel, panel => panel.init());
        result.map_err(|e| DisplayError::InitializationFailed(format!("{:?}", e)))
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        let level = brightness_for(value);
        debug!("SSD1306 brightness {}", value);
        let result = with_panel!(&mut self.panel, panel => panel.set_brightness(level));
        result.map_err(DisplayError::from)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.flush_framebuffer()
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.framebuffer.blank();
        self.flush()
    }

    fn write_buffer(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        self.framebuffer.load_packed(buffer)?;
        self.flush()
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        let result = with_panel!(&mut self.panel, panel => panel.set_invert(inverted));
        result.map_err(DisplayError::from)
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        let rotation = rotation_for(degrees)?;
        let result = with_panel!(&mut self.panel, panel => panel.set_rotation(rotation));
        result.map_err(DisplayError::from)
    }
}

// Drawing lands in our own framebuffer; the controller only sees it on flush
impl DrawTarget for Ssd1306Driver {
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

impl OriginDimensions for Ssd1306Driver {
    fn size(&self) -> Size {
        Size::new(self.capabilities.width, self.capabilities.height)
    }
}
