/*
 *  display/mod.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Display subsystem
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

pub mod canvas;
pub mod drivers;
pub mod error;
pub mod factory;
pub mod framebuffer;
pub mod traits;

pub use canvas::draw_plan;
pub use drivers::mock::MockDriver;
pub use error::{DisplayError, DisplayFactoryError};
pub use factory::{DisplayDriverFactory, PanelDriver};
pub use framebuffer::FrameBuffer;
pub use traits::{DisplayCapabilities, DisplayDriver};

#[cfg(feature = "driver-ssd1306")]
pub use drivers::ssd1306::Ssd1306Driver;
