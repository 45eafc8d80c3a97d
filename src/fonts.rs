/*
 *  fonts.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Font roles and text metrics
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

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::iso_8859_1::{FONT_6X10, FONT_7X13, FONT_9X15};
use embedded_graphics::prelude::Size;

/// Which face a line is drawn with. The layout only speaks in roles; the
/// mapping to concrete glyph sets lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontDescriptor {
    Artist,
    Title,
    /// elapsed time, volume and format line
    Info,
    /// idle screen branding line
    Banner,
    /// idle screen second line
    Subtitle,
}

impl FontDescriptor {
    pub fn mono_font(self) -> &'static MonoFont<'static> {
        match self {
            FontDescriptor::Artist | FontDescriptor::Title | FontDescriptor::Info => &FONT_6X10,
            FontDescriptor::Subtitle => &FONT_7X13,
            FontDescriptor::Banner => &FONT_9X15,
        }
    }
}

/// Measures rendered text. Used for centering only.
pub trait FontMetrics {
    fn text_size(&self, text: &str, font: FontDescriptor) -> Size;
}

/// Metrics for the fixed-pitch faces above.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoFontMetrics;

impl FontMetrics for MonoFontMetrics {
    fn text_size(&self, text: &str, font: FontDescriptor) -> Size {
        let face = font.mono_font();
        let n = text.chars().count() as u32;
        if n == 0 {
            return Size::new(0, face.character_size.height);
        }
        let width = n * face.character_size.width + (n - 1) * face.character_spacing;
        Size::new(width, face.character_size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_counts_chars_not_bytes() {
        let m = MonoFontMetrics;
        let w = FONT_6X10.character_size.width;
        let sp = FONT_6X10.character_spacing;
        assert_eq!(m.text_size("abc", FontDescriptor::Info).width, 3 * w + 2 * sp);
        assert_eq!(m.text_size("éàü", FontDescriptor::Info).width, 3 * w + 2 * sp);
    }

    #[test]
    fn test_empty_text_has_no_width() {
        let size = MonoFontMetrics.text_size("", FontDescriptor::Banner);
        assert_eq!(size.width, 0);
        assert_eq!(size.height, FONT_9X15.character_size.height);
    }

    #[test]
    fn test_banner_is_the_largest_face() {
        let m = MonoFontMetrics;
        let banner = m.text_size("X", FontDescriptor::Banner);
        let sub = m.text_size("X", FontDescriptor::Subtitle);
        let info = m.text_size("X", FontDescriptor::Info);
        assert!(banner.height > sub.height);
        assert!(sub.height > info.height);
    }
}
