/*
 *  poller.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Status polling with a single repair-and-retry cycle
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

use log::{debug, info, warn};
use thiserror::Error;

use crate::session::{PlaybackStats, SessionClient, SessionError, TrackInfo};
use crate::snapshot::Playback;

/// Where the session stands. Only the poller moves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    /// Link up, no credential configured.
    Connected,
    /// Link up and the credential was accepted.
    Authenticated,
    /// Last query failed; the link is suspect or already dropped.
    Degraded,
}

/// The poller gave up. The wrapped error is the one that ended the attempt.
#[derive(Debug, Error)]
pub enum PollerFatal {
    #[error("could not establish session: {0}")]
    Startup(#[source] SessionError),

    #[error("reconnecting failed: {0}")]
    Reconnect(#[source] SessionError),

    #[error("couldn't retrieve status after reconnect: {0}")]
    Retry(#[source] SessionError),

    #[error("status query rejected: {0}")]
    Query(#[source] SessionError),
}

impl PollerFatal {
    pub fn session_error(&self) -> &SessionError {
        match self {
            PollerFatal::Startup(e)
            | PollerFatal::Reconnect(e)
            | PollerFatal::Retry(e)
            | PollerFatal::Query(e) => e,
        }
    }
}

/// A successful poll, tagged with whether a repair cycle was needed.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Current(Playback),
    Recovered(Playback),
}

impl PollOutcome {
    pub fn playback(&self) -> &Playback {
        match self {
            PollOutcome::Current(p) | PollOutcome::Recovered(p) => p,
        }
    }

    pub fn into_playback(self) -> Playback {
        match self {
            PollOutcome::Current(p) | PollOutcome::Recovered(p) => p,
        }
    }

    pub fn was_recovered(&self) -> bool {
        matches!(self, PollOutcome::Recovered(_))
    }
}

/// Owns the session and turns raw status rounds into `Playback` values.
pub struct StatusPoller<C> {
    client: C,
    password: Option<String>,
    state: SessionState,
    reconnects: u64,
}

impl<C: SessionClient> StatusPoller<C> {
    pub fn new(client: C, password: Option<String>) -> Self {
        // an empty secret is the same as none
        let password = password.filter(|p| !p.is_empty());
        Self { client, password, state: SessionState::Disconnected, reconnects: 0 }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Repair cycles attempted since construction.
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// First connection, before the render loop starts.
    pub async fn connect(&mut self) -> Result<(), PollerFatal> {
        self.establish().await.map_err(PollerFatal::Startup)
    }

    /// Connect, then authenticate when a secret is configured.
    async fn establish(&mut self) -> Result<(), SessionError> {
        self.state = SessionState::Disconnected;
        self.client.connect().await?;
        self.state = SessionState::Connected;

        if let Some(secret) = self.password.as_deref() {
            if let Err(e) = self.client.authenticate(secret).await {
                // a half-open session is not kept around
                self.client.close().await;
                self.state = SessionState::Disconnected;
                return Err(e);
            }
            self.state = SessionState::Authenticated;
        }
        debug!("session state now {:?}", self.state);
        Ok(())
    }

    async fn fetch(&mut self) -> Result<(TrackInfo, PlaybackStats), SessionError> {
        let result = self.client.fetch_status().await;
        if result.is_err() {
            self.state = SessionState::Degraded;
        }
        result
    }

    /// One status round.
    ///
    /// A transport failure earns exactly one close/connect repair and one
    /// retry; anything else, or a second failure, is `PollerFatal`.
    pub async fn poll(&mut self) -> Result<PollOutcome, PollerFatal> {
        let first = self.fetch().await;
        let err = match first {
            Ok((track, stats)) => return Ok(PollOutcome::Current(Playback::from_raw(&track, &stats))),
            Err(e) if e.is_transient() => e,
            Err(e) => return Err(PollerFatal::Query(e)),
        };

        warn!("status query failed ({}), reconnecting", err);
        self.reconnects += 1;
        self.client.close().await;
        self.state = SessionState::Disconnected;
        self.establish().await.map_err(PollerFatal::Reconnect)?;

        match self.fetch().await {
            Ok((track, stats)) => {
                info!("session recovered after reconnect #{}", self.reconnects);
                Ok(PollOutcome::Recovered(Playback::from_raw(&track, &stats)))
            }
            Err(e) => Err(PollerFatal::Retry(e)),
        }
    }

    /// Best-effort teardown on shutdown.
    pub async fn close(&mut self) {
        self.client.close().await;
        self.state = SessionState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    type Round = Result<(TrackInfo, PlaybackStats), SessionError>;

    #[derive(Default)]
    struct Scripted {
        connects: VecDeque<Result<(), SessionError>>,
        auths: VecDeque<Result<(), SessionError>>,
        rounds: VecDeque<Round>,
        calls: Vec<&'static str>,
    }

    impl SessionClient for Scripted {
        async fn connect(&mut self) -> Result<(), SessionError> {
            self.calls.push("connect");
            self.connects.pop_front().unwrap_or(Ok(()))
        }

        async fn authenticate(&mut self, _secret: &str) -> Result<(), SessionError> {
            self.calls.push("auth");
            self.auths.pop_front().unwrap_or(Ok(()))
        }

        async fn fetch_status(&mut self) -> Round {
            self.calls.push("fetch");
            self.rounds.pop_front().unwrap_or_else(|| Err(SessionError::not_connected()))
        }

        async fn close(&mut self) {
            self.calls.push("close");
        }
    }

    fn playing() -> Round {
        Ok((
            TrackInfo::from_pairs([("Artist", "Low"), ("Title", "Lullaby")]),
            PlaybackStats::from_pairs([("state", "play"), ("elapsed", "12.5"), ("volume", "40")]),
        ))
    }

    fn dropped() -> Round {
        Err(SessionError::Transport(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")))
    }

    #[tokio::test]
    async fn test_connect_without_password_skips_auth() {
        let mut poller = StatusPoller::new(Scripted::default(), None);
        poller.connect().await.unwrap();
        assert_eq!(poller.state(), SessionState::Connected);
        assert_eq!(poller.client().calls, vec!["connect"]);
    }

    #[tokio::test]
    async fn test_empty_password_counts_as_none() {
        let mut poller = StatusPoller::new(Scripted::default(), Some(String::new()));
        poller.connect().await.unwrap();
        assert_eq!(poller.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_connect_with_password_authenticates() {
        let mut poller = StatusPoller::new(Scripted::default(), Some("hunter2".into()));
        poller.connect().await.unwrap();
        assert_eq!(poller.state(), SessionState::Authenticated);
        assert_eq!(poller.client().calls, vec!["connect", "auth"]);
    }

    #[tokio::test]
    async fn test_rejected_password_is_a_startup_failure() {
        let client = Scripted {
            auths: VecDeque::from([Err(SessionError::Auth("incorrect password".into()))]),
            ..Default::default()
        };
        let mut poller = StatusPoller::new(client, Some("wrong".into()));
        let err = poller.connect().await.unwrap_err();
        assert!(matches!(err, PollerFatal::Startup(SessionError::Auth(_))));
        assert_eq!(poller.state(), SessionState::Disconnected);
        assert_eq!(poller.client().calls, vec!["connect", "auth", "close"]);
    }

    #[tokio::test]
    async fn test_healthy_poll_is_current() {
        let client = Scripted { rounds: VecDeque::from([playing()]), ..Default::default() };
        let mut poller = StatusPoller::new(client, None);
        poller.connect().await.unwrap();

        let outcome = poller.poll().await.unwrap();
        assert!(!outcome.was_recovered());
        let snap = outcome.playback().snapshot().unwrap();
        assert_eq!(snap.artist, "Low");
        assert_eq!(poller.reconnects(), 0);
    }

    #[tokio::test]
    async fn test_one_drop_is_repaired_once() {
        let client = Scripted { rounds: VecDeque::from([dropped(), playing()]), ..Default::default() };
        let mut poller = StatusPoller::new(client, Some("pw".into()));
        poller.connect().await.unwrap();

        let outcome = poller.poll().await.unwrap();
        assert!(outcome.was_recovered());
        assert_eq!(outcome.playback().snapshot().unwrap().title, "Lullaby");
        assert_eq!(poller.reconnects(), 1);
        assert_eq!(poller.state(), SessionState::Authenticated);
        assert_eq!(
            poller.client().calls,
            vec!["connect", "auth", "fetch", "close", "connect", "auth", "fetch"]
        );
    }

    #[tokio::test]
    async fn test_second_drop_is_fatal() {
        let client = Scripted { rounds: VecDeque::from([dropped(), dropped()]), ..Default::default() };
        let mut poller = StatusPoller::new(client, None);
        poller.connect().await.unwrap();

        let err = poller.poll().await.unwrap_err();
        assert!(matches!(err, PollerFatal::Retry(_)));
        assert!(err.session_error().is_transient());
        assert_eq!(poller.state(), SessionState::Degraded);
        assert_eq!(poller.reconnects(), 1);
    }

    #[tokio::test]
    async fn test_failed_reconnect_is_fatal() {
        let client = Scripted {
            connects: VecDeque::from([
                Ok(()),
                Err(SessionError::Connection { endpoint: "localhost:6600".into(), reason: "refused".into() }),
            ]),
            rounds: VecDeque::from([dropped()]),
            ..Default::default()
        };
        let mut poller = StatusPoller::new(client, None);
        poller.connect().await.unwrap();

        let err = poller.poll().await.unwrap_err();
        assert!(matches!(err, PollerFatal::Reconnect(SessionError::Connection { .. })));
        assert_eq!(poller.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_query_errors_are_not_retried() {
        let client = Scripted {
            rounds: VecDeque::from([Err(SessionError::Query("[5@0] {status} unknown command".into()))]),
            ..Default::default()
        };
        let mut poller = StatusPoller::new(client, None);
        poller.connect().await.unwrap();

        let err = poller.poll().await.unwrap_err();
        assert!(matches!(err, PollerFatal::Query(_)));
        assert_eq!(poller.reconnects(), 0);
        assert_eq!(poller.client().calls, vec!["connect", "fetch"]);
        assert_eq!(poller.state(), SessionState::Degraded);
    }

    #[tokio::test]
    async fn test_poll_after_query_error_repairs_the_link() {
        let client = Scripted {
            rounds: VecDeque::from([Err(SessionError::Query("unparseable line".into())), dropped(), playing()]),
            ..Default::default()
        };
        let mut poller = StatusPoller::new(client, None);
        poller.connect().await.unwrap();

        assert!(matches!(poller.poll().await.unwrap_err(), PollerFatal::Query(_)));
        assert_eq!(poller.state(), SessionState::Degraded);

        let outcome = poller.poll().await.unwrap();
        assert!(outcome.was_recovered());
        assert_eq!(poller.state(), SessionState::Connected);
        assert_eq!(poller.reconnects(), 1);
    }

    #[tokio::test]
    async fn test_stopped_player_is_nothing_playing() {
        let stopped = Ok((TrackInfo::default(), PlaybackStats::from_pairs([("state", "stop")])));
        let client = Scripted { rounds: VecDeque::from([stopped]), ..Default::default() };
        let mut poller = StatusPoller::new(client, None);
        poller.connect().await.unwrap();

        let outcome = poller.poll().await.unwrap();
        assert_eq!(outcome.into_playback(), Playback::NothingPlaying);
    }
}
