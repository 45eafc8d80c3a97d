/*
 *  display/canvas.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Rasterizes a layout plan onto any monochrome draw target
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

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::layout::LayoutPlan;

/// Draw every command of `plan` in order. Positions are top-left anchored,
/// anything past the canvas edge is clipped by the target.
pub fn draw_plan<D>(target: &mut D, plan: &LayoutPlan) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    for cmd in plan {
        let style = MonoTextStyle::new(cmd.font.mono_font(), BinaryColor::On);
        Text::with_baseline(&cmd.text, cmd.position, style, Baseline::Top).draw(target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    use crate::display::framebuffer::FrameBuffer;
    use crate::fonts::MonoFontMetrics;
    use crate::layout::LayoutEngine;
    use crate::snapshot::{IdleInfo, PlaybackSnapshot};

    fn engine() -> LayoutEngine<MonoFontMetrics> {
        LayoutEngine::new(MonoFontMetrics, Size::new(128, 64))
    }

    #[test]
    fn test_idle_plan_stays_below_padding() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 21, 5, 0).unwrap();
        let plan = engine().plan_idle(&IdleInfo::new(now, "192.168.1.20".into()));

        let mut fb = FrameBuffer::new(128, 64);
        draw_plan(&mut fb, &plan).unwrap();

        let bounds = fb.lit_bounds().unwrap();
        assert!(bounds.top_left.y >= 2);
        assert!(fb.lit_count() > 100);
    }

    #[test]
    fn test_long_title_is_clipped_not_wrapped() {
        let snap = PlaybackSnapshot {
            artist: "Godspeed You! Black Emperor".into(),
            title: "Storm: Lift Yr. Skinny Fists Like Antennas to Heaven".into(),
            elapsed_seconds: 65.0,
            volume_percent: Some(30),
            sample_format_label: "24bit 96 kHz 4608kbps".into(),
            bitrate_kbps: 4608,
        };
        let (_, plan) = engine().plan_playing(&snap);

        let mut fb = FrameBuffer::new(128, 64);
        draw_plan(&mut fb, &plan).unwrap();

        let bounds = fb.lit_bounds().unwrap();
        assert!(bounds.top_left.x >= 0);
        assert!(bounds.bottom_right().unwrap().y < 64);
    }

    #[test]
    fn test_empty_plan_draws_nothing() {
        let mut fb = FrameBuffer::new(128, 64);
        draw_plan(&mut fb, &LayoutPlan::default()).unwrap();
        assert_eq!(fb.lit_count(), 0);
    }
}
