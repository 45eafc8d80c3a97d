/*
 *  snapshot.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Normalized per-tick view of the player
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

use chrono::{DateTime, Local};

use crate::session::{PlaybackStats, TrackInfo};

/// Format of the idle-screen clock line.
pub const IDLE_CLOCK_FORMAT: &str = "%b %d %H:%M:%S";

/// Transport state reported by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Play,
    Pause,
    Stop,
}

impl PlayState {
    /// Unknown or missing states count as stopped.
    pub fn from_stats(stats: &PlaybackStats) -> Self {
        match stats.get("state") {
            Some("play") => PlayState::Play,
            Some("pause") => PlayState::Pause,
            _ => PlayState::Stop,
        }
    }
}

/// What is playing right now, normalized so nothing downstream has to ask
/// whether a field was present.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub artist: String,
    pub title: String,
    pub elapsed_seconds: f64,
    pub volume_percent: Option<u8>,
    pub sample_format_label: String,
    pub bitrate_kbps: u32,
}

/// Result of normalizing one status round.
#[derive(Debug, Clone, PartialEq)]
pub enum Playback {
    Playing(PlaybackSnapshot),
    NothingPlaying,
}

impl Playback {
    pub fn from_raw(track: &TrackInfo, stats: &PlaybackStats) -> Self {
        match PlayState::from_stats(stats) {
            PlayState::Stop => Playback::NothingPlaying,
            PlayState::Play | PlayState::Pause => {
                Playback::Playing(PlaybackSnapshot::from_raw(track, stats))
            }
        }
    }

    pub fn snapshot(&self) -> Option<&PlaybackSnapshot> {
        match self {
            Playback::Playing(snapshot) => Some(snapshot),
            Playback::NothingPlaying => None,
        }
    }
}

impl PlaybackSnapshot {
    pub fn from_raw(track: &TrackInfo, stats: &PlaybackStats) -> Self {
        // radio streams carry the station in `name` instead of an artist
        let artist = track
            .get("artist")
            .or_else(|| track.get("name"))
            .unwrap_or_default()
            .to_string();
        let title = track.get("title").unwrap_or_default().to_string();

        let bitrate_kbps = stats
            .get("bitrate")
            .and_then(|b| b.trim().parse::<u32>().ok())
            .unwrap_or(0);

        let elapsed_seconds = stats
            .get("elapsed")
            .and_then(|e| e.trim().parse::<f64>().ok())
            .filter(|e| e.is_finite() && *e > 0.0)
            .unwrap_or(0.0);

        // -1 means no mixer
        let volume_percent = stats
            .get("volume")
            .and_then(|v| v.trim().parse::<i32>().ok())
            .filter(|v| *v >= 0)
            .map(|v| v.min(100) as u8);

        let sample_format_label = sample_format_label(stats.get("audio"), bitrate_kbps);

        PlaybackSnapshot {
            artist,
            title,
            elapsed_seconds,
            volume_percent,
            sample_format_label,
            bitrate_kbps,
        }
    }

    /// Elapsed time as `H:MM:SS`.
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }

    /// Volume field as drawn next to the elapsed time.
    pub fn volume_display(&self) -> String {
        match self.volume_percent {
            Some(v) => format!("Vol {}", v),
            None => "Vol ".to_string(),
        }
    }
}

/// Formats fractional seconds as `H:MM:SS`, hours unpadded.
pub fn format_elapsed(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{}:{:02}:{:02}", h, m, s)
}

/// Renders a sample rate in kHz.
///
/// Rates on a 100 Hz grid (44100, 48000, 96000, 88200) show as whole kHz,
/// anything finer keeps three decimals.
pub fn format_sample_rate(rate_hz: u32) -> String {
    if rate_hz % 100 == 0 {
        format!("{} kHz", rate_hz / 1000)
    } else {
        format!("{:.3} kHz", rate_hz as f64 / 1000.0)
    }
}

/// Splits an `audio` field into (bit depth, sample rate).
///
/// Fields are `<bitdepth>:<rate>:<channels>`. Servers that put the rate
/// first are detected by magnitude and swapped.
fn split_audio(audio: &str) -> Option<(String, u32)> {
    let mut parts = audio.trim().split(':');
    let first = parts.next()?.trim();
    let second = parts.next()?.trim();

    let as_rate = |s: &str| s.parse::<u32>().ok().filter(|r| *r >= 1000);
    match (as_rate(first), as_rate(second)) {
        (Some(rate), None) if !second.is_empty() => Some((second.to_string(), rate)),
        (_, Some(rate)) if !first.is_empty() => Some((first.to_string(), rate)),
        _ => None,
    }
}

/// Builds the info line, e.g. `16bit 44 kHz 320kbps`.
///
/// Without a usable `audio` field the label is only ` <bitrate>kbps`.
pub fn sample_format_label(audio: Option<&str>, bitrate_kbps: u32) -> String {
    let mut label = String::new();
    if let Some((bits, rate)) = audio.and_then(split_audio) {
        label.push_str(&format!("{}bit {}", bits, format_sample_rate(rate)));
    }
    label.push_str(&format!(" {}kbps", bitrate_kbps));
    label
}

/// Content of the idle screen, gathered by the render loop.
#[derive(Debug, Clone, PartialEq)]
pub struct IdleInfo {
    pub local_timestamp: String,
    /// Address as delivered by discovery, artifacts included.
    pub host_address: String,
}

impl IdleInfo {
    pub fn new(now: DateTime<Local>, host_address: String) -> Self {
        Self {
            local_timestamp: now.format(IDLE_CLOCK_FORMAT).to_string(),
            host_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stats(pairs: &[(&str, &str)]) -> PlaybackStats {
        PlaybackStats::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_label_whole_khz() {
        assert_eq!(sample_format_label(Some("16:44100:2"), 320), "16bit 44 kHz 320kbps");
        assert_eq!(sample_format_label(Some("24:96000:2"), 700), "24bit 96 kHz 700kbps");
        assert_eq!(sample_format_label(Some("24:192000:2"), 4608), "24bit 192 kHz 4608kbps");
    }

    #[test]
    fn test_label_fractional_khz() {
        assert_eq!(sample_format_label(Some("16:44056:2"), 320), "16bit 44.056 kHz 320kbps");
        assert_eq!(sample_format_label(Some("16:22050:1"), 64), "16bit 22.050 kHz 64kbps");
    }

    #[test]
    fn test_label_rate_first_order() {
        assert_eq!(sample_format_label(Some("44100:16:2"), 1411), "16bit 44 kHz 1411kbps");
        assert_eq!(sample_format_label(Some("48000:f:2"), 0), "fbit 48 kHz 0kbps");
    }

    #[test]
    fn test_label_without_audio() {
        assert_eq!(sample_format_label(None, 128), " 128kbps");
        assert_eq!(sample_format_label(Some("garbage"), 128), " 128kbps");
    }

    #[test]
    fn test_elapsed_format() {
        assert_eq!(format_elapsed(0.0), "0:00:00");
        assert_eq!(format_elapsed(59.9), "0:00:59");
        assert_eq!(format_elapsed(61.2), "0:01:01");
        assert_eq!(format_elapsed(3725.0), "1:02:05");
        assert_eq!(format_elapsed(-4.0), "0:00:00");
        assert_eq!(format_elapsed(f64::NAN), "0:00:00");
    }

    #[test]
    fn test_stop_is_nothing_playing() {
        let track = TrackInfo::from_pairs([("Title", "Anything")]);
        assert_eq!(Playback::from_raw(&track, &stats(&[("state", "stop")])), Playback::NothingPlaying);
        assert_eq!(Playback::from_raw(&track, &stats(&[])), Playback::NothingPlaying);
    }

    #[test]
    fn test_pause_still_shows_track() {
        let track = TrackInfo::from_pairs([("Title", "Hold")]);
        let playback = Playback::from_raw(&track, &stats(&[("state", "pause")]));
        assert_eq!(playback.snapshot().map(|s| s.title.as_str()), Some("Hold"));
    }

    #[test]
    fn test_artist_falls_back_to_stream_name() {
        let track = TrackInfo::from_pairs([("Name", "Radio Paradise"), ("Title", "")]);
        let snap = PlaybackSnapshot::from_raw(&track, &stats(&[("state", "play")]));
        assert_eq!(snap.artist, "Radio Paradise");
        assert_eq!(snap.title, "");
    }

    #[test]
    fn test_missing_fields_normalize_to_defaults() {
        let snap = PlaybackSnapshot::from_raw(&TrackInfo::default(), &stats(&[("state", "play")]));
        assert_eq!(snap.artist, "");
        assert_eq!(snap.title, "");
        assert_eq!(snap.elapsed_seconds, 0.0);
        assert_eq!(snap.volume_percent, None);
        assert_eq!(snap.bitrate_kbps, 0);
        assert_eq!(snap.sample_format_label, " 0kbps");
        assert_eq!(snap.volume_display(), "Vol ");
    }

    #[test]
    fn test_full_status() {
        let track = TrackInfo::from_pairs([("Artist", "Bonobo"), ("Title", "Kerala")]);
        let snap = PlaybackSnapshot::from_raw(
            &track,
            &stats(&[
                ("state", "play"),
                ("elapsed", "125.384"),
                ("volume", "57"),
                ("audio", "16:44100:2"),
                ("bitrate", "320"),
            ]),
        );
        assert_eq!(snap.artist, "Bonobo");
        assert_eq!(snap.elapsed_display(), "0:02:05");
        assert_eq!(snap.volume_percent, Some(57));
        assert_eq!(snap.volume_display(), "Vol 57");
        assert_eq!(snap.sample_format_label, "16bit 44 kHz 320kbps");
    }

    #[test]
    fn test_no_mixer_volume() {
        let snap = PlaybackSnapshot::from_raw(&TrackInfo::default(), &stats(&[("state", "play"), ("volume", "-1")]));
        assert_eq!(snap.volume_percent, None);
    }

    #[test]
    fn test_idle_clock_format() {
        let now = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 3).unwrap();
        let idle = IdleInfo::new(now, "192.168.1.42".into());
        assert_eq!(idle.local_timestamp, "Mar 07 09:05:03");
    }
}
