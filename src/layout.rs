/*
 *  layout.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Fits now-playing and idle content onto the fixed text grid
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

use embedded_graphics::prelude::{Point, Size};

use crate::constants::{
    DEFAULT_BANNER, DEFAULT_SUBTITLE, FALLBACK_ARTIST, FALLBACK_TITLE, IDLE_ROW_OFFSETS,
    LEFT_INSET, LINE_PITCH, TITLE_SLICE_END, TOP_PADDING, VOLUME_COLUMN_X,
};
use crate::fonts::{FontDescriptor, FontMetrics};
use crate::snapshot::{IdleInfo, PlaybackSnapshot};

/// One positioned line of text. Positions are the top-left of the glyph box.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub text: String,
    pub position: Point,
    pub font: FontDescriptor,
}

/// Ordered draw commands for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPlan {
    commands: Vec<DrawCommand>,
}

impl LayoutPlan {
    fn push(&mut self, text: impl Into<String>, x: i32, y: i32, font: FontDescriptor) {
        self.commands.push(DrawCommand { text: text.into(), position: Point::new(x, y), font });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of distinct text rows used.
    pub fn row_count(&self) -> usize {
        let mut rows: Vec<i32> = self.commands.iter().map(|c| c.position.y).collect();
        rows.sort_unstable();
        rows.dedup();
        rows.len()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.text.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a LayoutPlan {
    type Item = &'a DrawCommand;
    type IntoIter = std::slice::Iter<'a, DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Which arrangement the now-playing screen uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleLayout {
    /// No title: fixed labels, time, volume and format line.
    Fallback,
    /// Title over three rows, nothing else below the artist.
    Long,
    /// Title over two rows, then time and volume.
    Medium,
    /// Title on one row, then time and volume, then format line.
    Short,
}

/// Length limits and slice points for one script class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleThresholds {
    pub long: usize,
    pub medium: usize,
    pub split1: usize,
    pub split2: usize,
}

/// Titles starting with a letter.
pub const LATIN_THRESHOLDS: TitleThresholds = TitleThresholds { long: 40, medium: 22, split1: 14, split2: 38 };
/// Titles starting with anything else (digits, symbols, other scripts).
pub const WIDE_THRESHOLDS: TitleThresholds = TitleThresholds { long: 60, medium: 24, split1: 16, split2: 40 };

/// Picks the threshold pair from the first character only. A coarse proxy
/// for how many characters of the script fit a row.
pub fn thresholds_for(title: &str) -> &'static TitleThresholds {
    match title.chars().next() {
        Some(c) if c.is_alphabetic() => &LATIN_THRESHOLDS,
        _ => &WIDE_THRESHOLDS,
    }
}

/// Classifies a title by character count. Both limits are exclusive.
pub fn classify_title(title: &str) -> TitleLayout {
    let len = title.chars().count();
    if len == 0 {
        return TitleLayout::Fallback;
    }
    let t = thresholds_for(title);
    if len > t.long {
        TitleLayout::Long
    } else if len > t.medium {
        TitleLayout::Medium
    } else {
        TitleLayout::Short
    }
}

/// Character-indexed slice `[start, end)`, clamped to the string.
fn char_slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}

/// Strips the byte-string rendering discovery may wrap an address in
/// (`b'` in front, `\n'` or `'` plus newline behind). Clean input passes
/// through untouched.
pub fn display_address(raw: &str) -> String {
    let s = raw.strip_prefix("b'").unwrap_or(raw);
    let s = s.trim_end();
    let s = s.strip_suffix('\'').unwrap_or(s);
    let s = s.strip_suffix("\\n").unwrap_or(s);
    s.trim().to_string()
}

/// Fixed idle screen text.
#[derive(Debug, Clone, PartialEq)]
pub struct IdleText {
    pub banner: String,
    pub subtitle: String,
}

impl Default for IdleText {
    fn default() -> Self {
        Self { banner: DEFAULT_BANNER.to_string(), subtitle: DEFAULT_SUBTITLE.to_string() }
    }
}

fn row(n: i32) -> i32 {
    TOP_PADDING + n * LINE_PITCH
}

/// Turns a snapshot or idle info into a draw plan. Holds no state beyond
/// its construction parameters, so equal inputs give equal plans.
#[derive(Debug, Clone)]
pub struct LayoutEngine<M> {
    metrics: M,
    canvas: Size,
    idle_text: IdleText,
}

impl<M: FontMetrics> LayoutEngine<M> {
    pub fn new(metrics: M, canvas: Size) -> Self {
        Self { metrics, canvas, idle_text: IdleText::default() }
    }

    pub fn with_idle_text(mut self, idle_text: IdleText) -> Self {
        self.idle_text = idle_text;
        self
    }

    fn centered_x(&self, text: &str, font: FontDescriptor) -> i32 {
        let w = self.metrics.text_size(text, font).width;
        (self.canvas.width.saturating_sub(w) / 2) as i32
    }

    /// Four centered lines: banner, subtitle, clock, address.
    pub fn plan_idle(&self, idle: &IdleInfo) -> LayoutPlan {
        let address = format!("IP {}", display_address(&idle.host_address));
        let lines = [
            (self.idle_text.banner.as_str(), FontDescriptor::Banner),
            (self.idle_text.subtitle.as_str(), FontDescriptor::Subtitle),
            (idle.local_timestamp.as_str(), FontDescriptor::Info),
            (address.as_str(), FontDescriptor::Info),
        ];

        let mut plan = LayoutPlan::default();
        for ((text, font), offset) in lines.into_iter().zip(IDLE_ROW_OFFSETS) {
            plan.push(text, self.centered_x(text, font), TOP_PADDING + offset, font);
        }
        plan
    }

    /// Lays out the now-playing screen and reports which arrangement won.
    pub fn plan_playing(&self, snapshot: &PlaybackSnapshot) -> (TitleLayout, LayoutPlan) {
        let layout = classify_title(&snapshot.title);
        let title = snapshot.title.as_str();
        let t = thresholds_for(title);
        let mut plan = LayoutPlan::default();

        match layout {
            TitleLayout::Fallback => {
                plan.push(FALLBACK_ARTIST, LEFT_INSET, row(0), FontDescriptor::Artist);
                plan.push(FALLBACK_TITLE, LEFT_INSET, row(1), FontDescriptor::Title);
                self.push_time_row(&mut plan, snapshot, row(2));
                plan.push(snapshot.sample_format_label.as_str(), LEFT_INSET, row(3), FontDescriptor::Info);
            }
            TitleLayout::Long => {
                plan.push(snapshot.artist.as_str(), LEFT_INSET, row(0), FontDescriptor::Artist);
                plan.push(char_slice(title, 0, t.split1), LEFT_INSET, row(1), FontDescriptor::Title);
                plan.push(char_slice(title, t.split1, t.split2), LEFT_INSET, row(2), FontDescriptor::Title);
                plan.push(char_slice(title, t.split2, TITLE_SLICE_END), LEFT_INSET, row(3), FontDescriptor::Title);
            }
            TitleLayout::Medium => {
                plan.push(snapshot.artist.as_str(), LEFT_INSET, row(0), FontDescriptor::Artist);
                plan.push(char_slice(title, 0, t.split1), LEFT_INSET, row(1), FontDescriptor::Title);
                plan.push(char_slice(title, t.split1, t.split2), LEFT_INSET, row(2), FontDescriptor::Title);
                self.push_time_row(&mut plan, snapshot, row(3));
            }
            TitleLayout::Short => {
                plan.push(snapshot.artist.as_str(), LEFT_INSET, row(0), FontDescriptor::Artist);
                plan.push(title, LEFT_INSET, row(1), FontDescriptor::Title);
                self.push_time_row(&mut plan, snapshot, row(2));
                plan.push(snapshot.sample_format_label.as_str(), LEFT_INSET, row(3), FontDescriptor::Info);
            }
        }
        (layout, plan)
    }

    fn push_time_row(&self, plan: &mut LayoutPlan, snapshot: &PlaybackSnapshot, y: i32) {
        plan.push(snapshot.elapsed_display(), LEFT_INSET, y, FontDescriptor::Info);
        plan.push(snapshot.volume_display(), VOLUME_COLUMN_X, y, FontDescriptor::Info);
    }
}
