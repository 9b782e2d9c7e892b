//! An owned IRC message: optional prefix plus command.
//!
//! # Example
//!
//! ```
//! use tale_proto::Message;
//!
//! let msg: Message = ":bob!rob@host PRIVMSG #lobby :hi".parse().unwrap();
//! assert_eq!(msg.source_nickname(), Some("bob"));
//!
//! let out = Message::privmsg("#lobby", "hello");
//! assert_eq!(out.to_string(), "PRIVMSG #lobby :hello\r\n");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::parser::ParsedLine;
use crate::prefix::Prefix;

/// A complete parsed IRC message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Message origin (e.g. `nick!user@host`), if present.
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// The nickname of the message origin, if the prefix names a user.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nickname)
    }

    /// Create a PRIVMSG to a target.
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    /// Create a NOTICE to a target.
    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::NOTICE(target.into(), text.into()).into()
    }

    /// Create a JOIN for a channel.
    pub fn join(channel: impl Into<String>) -> Self {
        Command::JOIN(channel.into()).into()
    }

    /// Create a NICK registration message.
    pub fn nick(nickname: impl Into<String>) -> Self {
        Command::NICK(nickname.into()).into()
    }

    /// Create a USER registration message.
    pub fn user(username: impl Into<String>, realname: impl Into<String>) -> Self {
        Command::USER(username.into(), "0".into(), realname.into()).into()
    }

    /// Create a PONG answering a PING token.
    pub fn pong(token: impl Into<String>) -> Self {
        Command::PONG(token.into(), None).into()
    }

    /// Create a NAMES query for a channel.
    pub fn names(channel: impl Into<String>) -> Self {
        Command::NAMES(channel.into()).into()
    }

    /// Create a QUIT with a parting message.
    pub fn quit(message: impl Into<String>) -> Self {
        Command::QUIT(Some(message.into())).into()
    }

    /// Attach a prefix (used mostly by test harnesses acting as a server).
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let trimmed = s.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            return Err(ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause: MessageParseError::EmptyMessage,
            });
        }

        let parsed = ParsedLine::parse(trimmed).map_err(|cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        })?;

        let command = Command::new(parsed.command, &parsed.params).map_err(|cause| {
            ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause,
            }
        })?;

        Ok(Message {
            prefix: parsed.prefix.map(Prefix::new_from_str),
            command,
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}\r\n", self.command)
    }
}
