/*
 *  tests/common/mod.rs
 *
 *  Shared fakes for the integration tests
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 */

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;

use mpdoled::session::{PlaybackStats, SessionClient, SessionError, TrackInfo};

pub type Round = Result<(TrackInfo, PlaybackStats), SessionError>;

/// Session that replays canned answers and records what was asked of it.
/// Once the script runs dry every fetch is a dropped link.
#[derive(Default)]
pub struct ScriptedClient {
    pub connects: VecDeque<Result<(), SessionError>>,
    pub auths: VecDeque<Result<(), SessionError>>,
    pub rounds: VecDeque<Round>,
    pub calls: Vec<&'static str>,
}

impl ScriptedClient {
    pub fn with_rounds<I: IntoIterator<Item = Round>>(rounds: I) -> Self {
        Self { rounds: rounds.into_iter().collect(), ..Default::default() }
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl SessionClient for ScriptedClient {
    async fn connect(&mut self) -> Result<(), SessionError> {
        self.calls.push("connect");
        self.connects.pop_front().unwrap_or(Ok(()))
    }

    async fn authenticate(&mut self, _secret: &str) -> Result<(), SessionError> {
        self.calls.push("authenticate");
        self.auths.pop_front().unwrap_or(Ok(()))
    }

    async fn fetch_status(&mut self) -> Round {
        self.calls.push("fetch_status");
        self.rounds.pop_front().unwrap_or_else(|| Err(dropped_link()))
    }

    async fn close(&mut self) {
        self.calls.push("close");
    }
}

pub fn dropped_link() -> SessionError {
    SessionError::Transport(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"))
}

pub fn playing(artist: &str, title: &str) -> Round {
    Ok((
        TrackInfo::from_pairs([("Artist", artist), ("Title", title)]),
        PlaybackStats::from_pairs([
            ("state", "play"),
            ("elapsed", "83.4"),
            ("volume", "55"),
            ("audio", "44100:16:2"),
            ("bitrate", "320"),
        ]),
    ))
}

pub fn stopped() -> Round {
    Ok((TrackInfo::default(), PlaybackStats::from_pairs([("state", "stop")])))
}
