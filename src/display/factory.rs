/*
 *  display/factory.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Builds the configured panel driver
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
use log::info;

use crate::config::{DisplayConfig, DriverKind};
use crate::display::drivers::mock::MockDriver;
use crate::display::error::{DisplayError, DisplayFactoryError};
use crate::display::traits::{check_rotation, DisplayCapabilities, DisplayDriver};

#[cfg(feature = "driver-ssd1306")]
use crate::display::drivers::ssd1306::Ssd1306Driver;

/// Every panel this build can drive.
///
/// `DrawTarget` is not dyn compatible, so drivers are dispatched through an
/// enum instead of a boxed trait object.
pub enum PanelDriver {
    #[cfg(feature = "driver-ssd1306")]
    Ssd1306(Ssd1306Driver),
    Headless(MockDriver),
}

macro_rules! dispatch {
    ($self:expr, $d:ident => $body:expr) => {
        match $self {
            #[cfg(feature = "driver-ssd1306")]
            PanelDriver::Ssd1306($d) => $body,
            PanelDriver::Headless($d) => $body,
        }
    };
}

impl PanelDriver {
    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "driver-ssd1306")]
            PanelDriver::Ssd1306(_) => "ssd1306",
            PanelDriver::Headless(_) => "headless",
        }
    }
}

impl DisplayDriver for PanelDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        dispatch!(self, d => d.capabilities())
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        dispatch!(self, d => d.init())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        dispatch!(self, d => d.set_brightness(value))
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        dispatch!(self, d => d.flush())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        dispatch!(self, d => DisplayDriver::clear(d))
    }

    fn write_buffer(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        dispatch!(self, d => d.write_buffer(buffer))
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        dispatch!(self, d => d.set_invert(inverted))
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        dispatch!(self, d => d.set_rotation(degrees))
    }
}

impl DrawTarget for PanelDriver {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        dispatch!(self, d => d.draw_iter(pixels))
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        dispatch!(self, d => DrawTarget::clear(d, color))
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        dispatch!(self, d => d.fill_contiguous(area, colors))
    }
}

impl OriginDimensions for PanelDriver {
    fn size(&self) -> Size {
        dispatch!(self, d => d.size())
    }
}

pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Validate, then build the driver `config.driver` names.
    ///
    /// Hardware drivers are initialised here; a headless panel still gets
    /// invert and brightness applied so the state is inspectable.
    pub fn create_from_config(config: &DisplayConfig) -> Result<PanelDriver, DisplayFactoryError> {
        Self::validate_config(config)?;
        let driver_kind = config.driver.ok_or(DisplayFactoryError::NoDriverSpecified)?;

        match driver_kind {
            DriverKind::Headless => {
                info!("Creating headless panel");
                let mut driver = MockDriver::new(config)?;
                driver.init()?;
                if let Some(brightness) = config.brightness {
                    driver.set_brightness(brightness)?;
                }
                if let Some(invert) = config.invert {
                    driver.set_invert(invert)?;
                }
                if let Some(rotation) = config.rotate_deg {
                    driver.set_rotation(rotation)?;
                }
                Ok(PanelDriver::Headless(driver))
            }
            DriverKind::Ssd1306 => Self::create_ssd1306(config),
        }
    }

    #[cfg(feature = "driver-ssd1306")]
    fn create_ssd1306(config: &DisplayConfig) -> Result<PanelDriver, DisplayFactoryError> {
        use crate::config::BusConfig;

        match config.bus.as_ref() {
            Some(BusConfig::I2c { bus, address }) => {
                Ok(PanelDriver::Ssd1306(Ssd1306Driver::new_i2c(bus, *address, config)?))
            }
            None => Err(DisplayFactoryError::NoBusConfiguration),
        }
    }

    #[cfg(not(feature = "driver-ssd1306"))]
    fn create_ssd1306(_config: &DisplayConfig) -> Result<PanelDriver, DisplayFactoryError> {
        Err(DisplayFactoryError::DriverNotEnabled("SSD1306".to_string()))
    }

    /// Check a configuration without touching hardware.
    pub fn validate_config(config: &DisplayConfig) -> Result<(), DisplayFactoryError> {
        let driver_kind = config.driver.ok_or(DisplayFactoryError::NoDriverSpecified)?;

        if driver_kind != DriverKind::Headless && config.bus.is_none() {
            return Err(DisplayFactoryError::NoBusConfiguration);
        }

        if let Some(rotation) = config.rotate_deg {
            check_rotation(rotation).map_err(|e| DisplayFactoryError::ConfigError(e.to_string()))?;
            // the canvas stays width x height, a portrait panel would clip it
            if driver_kind == DriverKind::Ssd1306 && (rotation == 90 || rotation == 270) {
                return Err(DisplayFactoryError::ConfigError(format!(
                    "rotate_deg {} is not supported on the SSD1306; use 0 or 180",
                    rotation
                )));
            }
        }

        if config.width == Some(0) || config.height == Some(0) {
            return Err(DisplayFactoryError::ConfigError("display width/height must be > 0".to_string()));
        }

        Ok(())
    }
}
