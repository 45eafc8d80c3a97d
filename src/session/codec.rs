/*
 *  session/codec.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Line codec for the MPD text protocol
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

use std::fmt;

/// Prefix of the banner the server sends right after accept.
pub const GREETING_PREFIX: &str = "OK MPD ";

/// One decoded response line.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Terminates a successful response.
    Ok,
    /// Terminates a failed response.
    Ack(AckError),
    /// One `key: value` attribute.
    Pair(String, String),
}

/// Decoded `ACK [code@index] {command} message` line.
#[derive(Debug, Clone, PartialEq)]
pub struct AckError {
    pub code: u32,
    pub index: u32,
    pub command: String,
    pub message: String,
}

impl fmt::Display for AckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}@{}] {{{}}} {}", self.code, self.index, self.command, self.message)
    }
}

/// Returns the protocol version announced by a greeting line.
pub fn parse_greeting(line: &str) -> Option<&str> {
    line.trim_end_matches(['\r', '\n'])
        .strip_prefix(GREETING_PREFIX)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Decodes one response line (trailing newline allowed).
pub fn parse_line(line: &str) -> Result<Reply, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line == "OK" {
        return Ok(Reply::Ok);
    }
    if let Some(rest) = line.strip_prefix("ACK ") {
        return parse_ack(rest).map(Reply::Ack);
    }
    match line.split_once(": ") {
        Some((key, value)) if !key.is_empty() => Ok(Reply::Pair(key.to_string(), value.to_string())),
        _ => Err(format!("malformed response line: {:?}", line)),
    }
}

fn parse_ack(rest: &str) -> Result<AckError, String> {
    let bad = || format!("malformed ACK line: {:?}", rest);

    let rest = rest.strip_prefix('[').ok_or_else(bad)?;
    let (code_at, rest) = rest.split_once(']').ok_or_else(bad)?;
    let (code, index) = code_at.split_once('@').ok_or_else(bad)?;
    let code = code.parse::<u32>().map_err(|_| bad())?;
    let index = index.parse::<u32>().map_err(|_| bad())?;

    let rest = rest.trim_start().strip_prefix('{').ok_or_else(bad)?;
    let (command, message) = rest.split_once('}').ok_or_else(bad)?;

    Ok(AckError {
        code,
        index,
        command: command.to_string(),
        message: message.trim().to_string(),
    })
}

/// Quotes a command argument, escaping `"` and `\`.
pub fn quote_arg(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
