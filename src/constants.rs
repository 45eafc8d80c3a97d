//! Global constants for the panel geometry and the fixed text grid.

/// Width of the reference panel in pixels.
pub const DISPLAY_WIDTH: u32 = 128;
/// Height of the reference panel in pixels.
pub const DISPLAY_HEIGHT: u32 = 64;

/// Default I2C bus and address of the SSD1306 module.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// Pixels above the first text row.
pub const TOP_PADDING: i32 = 2;
/// Left edge of every left-aligned line.
pub const LEFT_INSET: i32 = 0;
/// Vertical distance between rows on the now-playing screen. Fixed, not
/// derived from glyph height: four rows fill the 64px panel.
pub const LINE_PITCH: i32 = 15;
/// X position of the volume field sharing a row with the elapsed time.
pub const VOLUME_COLUMN_X: i32 = 88;

/// Row offsets (below the top padding) on the idle screen.
pub const IDLE_ROW_OFFSETS: [i32; 4] = [0, 18, 34, 48];

/// Titles are never drawn past this character.
pub const TITLE_SLICE_END: usize = 60;

/// Labels used when the stream carries no title at all.
pub const FALLBACK_ARTIST: &str = "no information";
pub const FALLBACK_TITLE: &str = "Internet Radio";

/// Idle screen defaults.
pub const DEFAULT_BANNER: &str = "moOde audio";
pub const DEFAULT_SUBTITLE: &str = "now playing monitor";

/// Render cadence.
pub const DEFAULT_TICK_MS: u64 = 1000;
