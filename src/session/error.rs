/*
 *  session/error.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Session failure taxonomy
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

use std::io;
use thiserror::Error;

/// Everything that can go wrong talking to the playback service.
///
/// `Transport` is the only transient kind: the link dropped or stalled and a
/// fresh connection may fix it. `Query` means the server answered but refused
/// or garbled the reply, which reconnecting will not cure.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Socket could not be opened, or the greeting was not the expected one.
    #[error("could not connect to '{endpoint}': {reason}")]
    Connection { endpoint: String, reason: String },

    /// The credential step was rejected.
    #[error("password command failed: {0}")]
    Auth(String),

    /// I/O failure, EOF or timeout on an established link.
    #[error("transport failure: {0}")]
    Transport(#[from] io::Error),

    /// Protocol-level failure: ACK reply or malformed response line.
    #[error("query failed: {0}")]
    Query(String),
}

impl SessionError {
    /// Whether a close/connect repair cycle is worth attempting.
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionError::Transport(_))
    }

    pub(crate) fn not_connected() -> Self {
        SessionError::Transport(io::Error::new(io::ErrorKind::NotConnected, "session is not connected"))
    }

    pub(crate) fn timed_out(what: &str) -> Self {
        SessionError::Transport(io::Error::new(io::ErrorKind::TimedOut, format!("{what} timed out")))
    }
}
