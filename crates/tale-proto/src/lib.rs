//! # tale-proto
//!
//! A small IRC protocol library for client-side bots: message parsing and
//! encoding plus a line codec for tokio.
//!
//! ## Features
//!
//! - IRC message parsing with prefixes, commands, and parameters
//! - RFC 1459 case mapping for nick and channel comparison
//! - A CRLF line codec that reassembles lines split across socket reads
//!
//! ## Quick Start
//!
//! ```rust
//! use tale_proto::{Command, Message};
//!
//! let msg: Message = ":bob!rob@host PRIVMSG #lobby :Hello!".parse().unwrap();
//! assert_eq!(msg.source_nickname(), Some("bob"));
//! assert!(matches!(msg.command, Command::PRIVMSG(_, _)));
//!
//! let reply = Message::privmsg("#lobby", "Hello yourself");
//! assert_eq!(reply.to_string(), "PRIVMSG #lobby :Hello yourself\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod chan;
pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
mod parser;
pub mod prefix;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower};
pub use self::chan::ChannelExt;
pub use self::command::{Command, RPL_NAMREPLY};
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, MAX_LINE_LEN};
pub use self::message::Message;
pub use self::prefix::Prefix;
