/*
 *  session/mpd.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  MPD session over TCP
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

use std::time::Duration;

use log::{debug, info};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

use super::codec::{self, Reply};
use super::{PlaybackStats, SessionClient, SessionError, TrackInfo};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6600;
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_millis(3000);

/// One live TCP link. Never repaired in place: any doubt about its state and
/// it is dropped, the next connect opens a new one.
struct Link {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    // set once a reply could not be framed
    desynced: bool,
}

impl Link {
    async fn send(&mut self, command: &str) -> Result<(), SessionError> {
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Reads one raw line. Tag values are not guaranteed to be UTF-8, so
    /// undecodable bytes become U+FFFD rather than failing the read.
    async fn read_line(&mut self) -> Result<String, SessionError> {
        let mut raw = Vec::new();
        let n = self.reader.read_until(b'\n', &mut raw).await?;
        if n == 0 {
            return Err(SessionError::Transport(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            )));
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Sends one command and collects its attribute lines up to `OK`.
    async fn command(&mut self, command: &str) -> Result<Vec<(String, String)>, SessionError> {
        self.send(command).await?;
        let mut pairs = Vec::new();
        loop {
            let line = self.read_line().await?;
            let reply = codec::parse_line(&line).map_err(|e| {
                self.desynced = true;
                SessionError::Query(e)
            })?;
            match reply {
                Reply::Ok => return Ok(pairs),
                Reply::Ack(ack) => return Err(SessionError::Query(ack.to_string())),
                Reply::Pair(k, v) => pairs.push((k, v)),
            }
        }
    }
}

/// `SessionClient` speaking the MPD text protocol.
pub struct MpdSession {
    host: String,
    port: u16,
    io_timeout: Duration,
    link: Option<Link>,
    server_version: Option<String>,
}

impl MpdSession {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            io_timeout: DEFAULT_IO_TIMEOUT,
            link: None,
            server_version: None,
        }
    }

    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Protocol version from the last greeting, if connected.
    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    fn connection_error(&self, reason: impl Into<String>) -> SessionError {
        SessionError::Connection { endpoint: self.endpoint(), reason: reason.into() }
    }

    /// Runs a command under the I/O deadline. A malformed or half-read reply
    /// leaves the stream position unknown, so the link is dropped on the spot.
    async fn round_trip(&mut self, command: &str) -> Result<Vec<(String, String)>, SessionError> {
        let io_timeout = self.io_timeout;
        let verb = command.split_whitespace().next().unwrap_or(command);
        let link = self.link.as_mut().ok_or_else(SessionError::not_connected)?;
        let result = match timeout(io_timeout, link.command(command)).await {
            Ok(result) => result,
            Err(_) => {
                link.desynced = true;
                Err(SessionError::timed_out(verb))
            }
        };
        if link.desynced {
            debug!("dropping link to {} after unframed '{}' reply", self.endpoint(), verb);
            self.link = None;
        }
        result
    }
}

impl SessionClient for MpdSession {
    async fn connect(&mut self) -> Result<(), SessionError> {
        // never reuse a previous link
        self.link = None;
        self.server_version = None;

        let endpoint = self.endpoint();
        let stream = match timeout(self.io_timeout, TcpStream::connect(&endpoint)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(self.connection_error(e.to_string())),
            Err(_) => return Err(self.connection_error("connect timed out")),
        };
        let (read_half, writer) = stream.into_split();
        let mut link = Link { reader: BufReader::new(read_half), writer, desynced: false };

        let greeting = match timeout(self.io_timeout, link.read_line()).await {
            Ok(Ok(line)) => line,
            Ok(Err(e)) => return Err(self.connection_error(e.to_string())),
            Err(_) => return Err(self.connection_error("no greeting from server")),
        };
        let version = codec::parse_greeting(&greeting)
            .ok_or_else(|| self.connection_error(format!("unexpected greeting {:?}", greeting.trim_end())))?
            .to_string();

        info!("MPD server ........: {} (protocol {})", endpoint, version);
        self.server_version = Some(version);
        self.link = Some(link);
        Ok(())
    }

    async fn authenticate(&mut self, secret: &str) -> Result<(), SessionError> {
        let command = format!("password {}", codec::quote_arg(secret));
        match self.round_trip(&command).await {
            Ok(_) => Ok(()),
            Err(SessionError::Query(msg)) => Err(SessionError::Auth(msg)),
            Err(e) => Err(e),
        }
    }

    async fn fetch_status(&mut self) -> Result<(TrackInfo, PlaybackStats), SessionError> {
        let song = self.round_trip("currentsong").await?;
        let status = self.round_trip("status").await?;
        Ok((TrackInfo::from_pairs(song), PlaybackStats::from_pairs(status)))
    }

    async fn close(&mut self) {
        let Some(mut link) = self.link.take() else {
            return;
        };
        self.server_version = None;

        // polite goodbye first, the server does not answer `close`
        match timeout(self.io_timeout, link.send("close")).await {
            Ok(Err(e)) => debug!("close command failed on {}: {}", self.endpoint(), e),
            Err(_) => debug!("close command timed out on {}", self.endpoint()),
            Ok(Ok(())) => {}
        }
        match timeout(self.io_timeout, link.writer.shutdown()).await {
            Ok(Err(e)) => debug!("socket shutdown failed on {}: {}", self.endpoint(), e),
            Err(_) => debug!("socket shutdown timed out on {}", self.endpoint()),
            Ok(Ok(())) => {}
        }
        // link dropped here
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_without_connect_is_transient() {
        let mut session = MpdSession::new(DEFAULT_HOST, DEFAULT_PORT);
        let err = session.fetch_status().await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_close_without_link_is_a_no_op() {
        let mut session = MpdSession::new(DEFAULT_HOST, DEFAULT_PORT);
        session.close().await;
        assert!(!session.is_connected());
    }

    #[test]
    fn test_endpoint_format() {
        let session = MpdSession::new("moode.local", 6601).with_io_timeout(Duration::from_millis(250));
        assert_eq!(session.endpoint(), "moode.local:6601");
        assert_eq!(session.io_timeout, Duration::from_millis(250));
    }
}
