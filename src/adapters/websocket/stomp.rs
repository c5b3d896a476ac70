//! Minimal STOMP 1.2 frame codec.
//!
//! Wire format: `COMMAND\nheader:value\n...\n\nbody\0`. Header values are
//! escaped (`\\`, `\n`, `\r`, `\c`) except on CONNECT and CONNECTED frames.
//! A text message holding only end-of-lines is a heart-beat.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    // client
    Connect,
    Stomp,
    Subscribe,
    Unsubscribe,
    Send,
    Disconnect,
    // server
    Connected,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Send => "SEND",
            Command::Disconnect => "DISCONNECT",
            Command::Connected => "CONNECTED",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    /// CONNECT-family frames carry raw header values.
    fn escapes_headers(&self) -> bool {
        !matches!(self, Command::Connect | Command::Stomp | Command::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = StompError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "CONNECT" => Command::Connect,
            "STOMP" => Command::Stomp,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "SEND" => Command::Send,
            "DISCONNECT" => Command::Disconnect,
            "CONNECTED" => Command::Connected,
            "MESSAGE" => Command::Message,
            "RECEIPT" => Command::Receipt,
            "ERROR" => Command::Error,
            other => return Err(StompError::UnknownCommand(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StompError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("frame has no command line")]
    MissingCommand,

    #[error("malformed header line '{0}'")]
    MalformedHeader(String),

    #[error("invalid escape sequence in header")]
    InvalidEscape,

    #[error("frame is not terminated by NUL")]
    Unterminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value for `name`. Repeated headers keep the first occurrence.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parse one frame. `Ok(None)` for a heart-beat.
    pub fn parse(text: &str) -> Result<Option<Frame>, StompError> {
        let text = text.trim_start_matches(['\r', '\n']);
        if text.is_empty() {
            return Ok(None);
        }

        let (head, body) = match text.split_once("\n\n") {
            Some(parts) => parts,
            None => match text.split_once("\r\n\r\n") {
                Some(parts) => parts,
                None => return Err(StompError::Unterminated),
            },
        };

        let mut lines = head.lines();
        let command: Command = lines
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .ok_or(StompError::MissingCommand)?
            .parse()?;

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| StompError::MalformedHeader(line.to_string()))?;
            if command.escapes_headers() {
                headers.push((unescape(name)?, unescape(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let body = match body.find('\0') {
            Some(end) => &body[..end],
            None => return Err(StompError::Unterminated),
        };

        Ok(Some(Frame {
            command,
            headers,
            body: body.to_string(),
        }))
    }

    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            if self.command.escapes_headers() {
                out.push_str(&escape(name));
                out.push(':');
                out.push_str(&escape(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(value: &str) -> Result<String, StompError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            _ => return Err(StompError::InvalidEscape),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connect_with_raw_headers() {
        let text = "CONNECT\naccept-version:1.2\nAuthorization:Bearer a.b.c\nchannelHeader:apm\n\n\0";
        let frame = Frame::parse(text).unwrap().unwrap();

        assert_eq!(frame.command, Command::Connect);
        assert_eq!(frame.get("Authorization"), Some("Bearer a.b.c"));
        assert_eq!(frame.get("channelHeader"), Some("apm"));
        assert!(frame.body.is_empty());
    }

    #[test]
    fn heartbeat_is_not_a_frame() {
        assert_eq!(Frame::parse("\n").unwrap(), None);
        assert_eq!(Frame::parse("\r\n").unwrap(), None);
    }

    #[test]
    fn first_repeated_header_wins() {
        let frame = Frame::parse("SEND\ndestination:/a\ndestination:/b\n\nhi\0")
            .unwrap()
            .unwrap();
        assert_eq!(frame.get("destination"), Some("/a"));
        assert_eq!(frame.body, "hi");
    }

    #[test]
    fn message_headers_are_escaped_on_the_wire() {
        let frame = Frame::new(Command::Message).header("note", "a:b\nc");
        let wire = frame.serialize();
        assert!(wire.contains("note:a\\cb\\nc\n"));

        let back = Frame::parse(&wire).unwrap().unwrap();
        assert_eq!(back.get("note"), Some("a:b\nc"));
    }

    #[test]
    fn crlf_frames_parse() {
        let frame = Frame::parse("SUBSCRIBE\r\nid:sub-0\r\ndestination:/apm\r\n\r\n\0")
            .unwrap()
            .unwrap();
        assert_eq!(frame.get("id"), Some("sub-0"));
        assert_eq!(frame.get("destination"), Some("/apm"));
    }

    #[test]
    fn rejects_unknown_commands_and_missing_nul() {
        assert_eq!(
            Frame::parse("PING\n\n\0"),
            Err(StompError::UnknownCommand("PING".into()))
        );
        assert_eq!(Frame::parse("SEND\n\nbody"), Err(StompError::Unterminated));
        assert!(matches!(
            Frame::parse("SEND\nno-colon\n\n\0"),
            Err(StompError::MalformedHeader(_))
        ));
    }

    #[test]
    fn bad_escape_is_rejected() {
        assert_eq!(
            Frame::parse("SEND\nx:\\t\n\n\0"),
            Err(StompError::InvalidEscape)
        );
    }
}
