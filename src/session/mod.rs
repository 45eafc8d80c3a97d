/*
 *  session/mod.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Session protocol contract between the poller and the playback service
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

pub mod codec;
pub mod error;
pub mod mpd;

use std::collections::HashMap;

pub use error::SessionError;
pub use mpd::MpdSession;

/// Raw `key: value` fields from one protocol reply. Keys are lowercased on
/// insert so `Artist` and `artist` resolve the same way.
#[derive(Debug, Clone, Default, PartialEq)]
struct FieldMap(HashMap<String, String>);

impl FieldMap {
    fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (k, v) in pairs {
            // first occurrence wins, multi-value tags repeat the key
            map.entry(k.as_ref().to_ascii_lowercase()).or_insert_with(|| v.into());
        }
        FieldMap(map)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Tags describing the current song (`currentsong`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackInfo(FieldMap);

impl TrackInfo {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        TrackInfo(FieldMap::from_pairs(pairs))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }
}

/// Player status fields (`status`): state, elapsed, volume, audio, bitrate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackStats(FieldMap);

impl PlaybackStats {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        PlaybackStats(FieldMap::from_pairs(pairs))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }
}

/// Minimal contract over a stateful playback-service session.
///
/// Implementations own their transport. `close` is best effort: it never
/// fails, and after it returns the next `connect` must start from a fresh
/// connection rather than reuse whatever was there before.
#[allow(async_fn_in_trait)]
pub trait SessionClient {
    /// Open the transport and read the server greeting.
    async fn connect(&mut self) -> Result<(), SessionError>;

    /// Send the shared secret. Only called when one is configured.
    async fn authenticate(&mut self, secret: &str) -> Result<(), SessionError>;

    /// Query the current track and the player status in one round.
    async fn fetch_status(&mut self) -> Result<(TrackInfo, PlaybackStats), SessionError>;

    /// Tear the session down, swallowing any failure.
    async fn close(&mut self);
}
