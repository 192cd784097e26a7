//! STOMP 1.2 frame codec.
//!
//! A frame is a command line, `name:value` header lines, a blank line, the
//! body and a NUL byte. Header values are escaped except on CONNECT and
//! CONNECTED frames.

use std::fmt;
use std::str::FromStr;

use crate::utils::ClientError;

const NUL: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Connected,
    Subscribe,
    Unsubscribe,
    Send,
    Message,
    Receipt,
    Error,
    Disconnect,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Connected => "CONNECTED",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Send => "SEND",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
            Command::Disconnect => "DISCONNECT",
        }
    }

    fn escapes_headers(&self) -> bool {
        !matches!(self, Command::Connect | Command::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s {
            "CONNECT" | "STOMP" => Command::Connect,
            "CONNECTED" => Command::Connected,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "SEND" => Command::Send,
            "MESSAGE" => Command::Message,
            "RECEIPT" => Command::Receipt,
            "ERROR" => Command::Error,
            "DISCONNECT" => Command::Disconnect,
            other => {
                return Err(ClientError::Protocol {
                    error: format!("unknown command {other:?}"),
                });
            }
        };
        Ok(command)
    }
}

/// One STOMP frame. Headers keep their wire order; the first occurrence of a
/// repeated header wins on lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompFrame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StompFrame {
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

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Human-readable summary of an ERROR frame: its `message` header and body.
    pub fn error_message(&self) -> String {
        match (self.get("message"), self.body.is_empty()) {
            (Some(message), true) => message.to_string(),
            (Some(message), false) => format!("{message}: {}", self.body),
            (None, _) => self.body.clone(),
        }
    }

    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(self.body.len() + 64);
        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                push_escaped(&mut out, name);
                out.push(':');
                push_escaped(&mut out, value);
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push(NUL);
        out
    }

    /// Decodes one frame from a websocket text message.
    ///
    /// Returns `Ok(None)` for a heartbeat (only end-of-line characters).
    pub fn decode(text: &str) -> Result<Option<Self>, ClientError> {
        let text = text.trim_start_matches(['\r', '\n']);
        if text.is_empty() {
            return Ok(None);
        }

        let (command_line, mut rest) = split_line(text)?;
        let command: Command = command_line.parse()?;
        let escape = command.escapes_headers();

        let mut headers = Vec::new();
        loop {
            let (line, remaining) = split_line(rest)?;
            rest = remaining;
            if line.is_empty() {
                break;
            }
            let (name, value) = line.split_once(':').ok_or_else(|| ClientError::Protocol {
                error: format!("malformed header line {line:?}"),
            })?;
            if escape {
                headers.push((unescape(name)?, unescape(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let content_length = headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .map(|(_, v)| {
                v.trim().parse::<usize>().map_err(|_| ClientError::Protocol {
                    error: format!("invalid content-length {v:?}"),
                })
            })
            .transpose()?;

        let body = match content_length {
            Some(len) => {
                let body = rest.get(..len).ok_or_else(|| ClientError::Protocol {
                    error: format!("body shorter than content-length {len}"),
                })?;
                if !rest[len..].starts_with(NUL) {
                    return Err(ClientError::Protocol {
                        error: "frame body is not NUL terminated".to_string(),
                    });
                }
                body
            }
            None => {
                let end = rest.find(NUL).ok_or_else(|| ClientError::Protocol {
                    error: "frame body is not NUL terminated".to_string(),
                })?;
                &rest[..end]
            }
        };

        Ok(Some(Self {
            command,
            headers,
            body: body.to_string(),
        }))
    }
}

fn split_line(text: &str) -> Result<(&str, &str), ClientError> {
    let (line, rest) = text.split_once('\n').ok_or_else(|| ClientError::Protocol {
        error: "unexpected end of frame".to_string(),
    })?;
    Ok((line.strip_suffix('\r').unwrap_or(line), rest))
}

fn push_escaped(out: &mut String, raw: &str) {
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            c => out.push(c),
        }
    }
}

fn unescape(raw: &str) -> Result<String, ClientError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
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
            other => {
                return Err(ClientError::Protocol {
                    error: format!("invalid header escape \\{}", other.unwrap_or(' ')),
                });
            }
        }
    }
    Ok(out)
}
