//! IRC command types.
//!
//! Type-safe representations of the client-protocol commands this library
//! speaks. Anything else is captured in the `Raw` variant rather than
//! rejected, so callers can decide what to drop.

use std::fmt;

use crate::error::MessageParseError;

/// Numeric reply code for a NAMES list line (RPL_NAMREPLY).
pub const RPL_NAMREPLY: u16 = 353;

/// IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    /// `NICK nickname`
    NICK(String),
    /// `USER username mode realname` (sent as `USER username mode * :realname`)
    USER(String, String, String),
    /// `JOIN channel`
    JOIN(String),
    /// `PART channel [message]`
    PART(String, Option<String>),
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `NOTICE target :text`
    NOTICE(String, String),
    /// `PING token [token2]`
    PING(String, Option<String>),
    /// `PONG token [token2]`
    PONG(String, Option<String>),
    /// `NAMES channel`
    NAMES(String),
    /// `QUIT [message]`
    QUIT(Option<String>),
    /// A three-digit numeric reply with its arguments.
    Response(u16, Vec<String>),
    /// Any other command, kept verbatim.
    Raw(String, Vec<String>),
}

impl Command {
    /// Build a command from a parsed name and argument list.
    ///
    /// Unknown names and recognized names with the wrong arity both fall
    /// through to `Raw`; only an out-of-range numeric is an error.
    pub fn new(name: &str, args: &[&str]) -> Result<Command, MessageParseError> {
        if name.len() == 3 && name.chars().all(|c| c.is_ascii_digit()) {
            let code = name
                .parse::<u16>()
                .map_err(|_| MessageParseError::InvalidNumeric)?;
            return Ok(Command::Response(code, owned(args)));
        }

        let upper = name.to_ascii_uppercase();
        Ok(match (upper.as_str(), args) {
            ("NICK", [n]) => Command::NICK(n.to_string()),
            ("USER", [u, m, _, r]) => {
                Command::USER(u.to_string(), m.to_string(), r.to_string())
            }
            ("JOIN", [c, ..]) => Command::JOIN(c.to_string()),
            ("PART", [c]) => Command::PART(c.to_string(), None),
            ("PART", [c, m]) => Command::PART(c.to_string(), Some(m.to_string())),
            ("PRIVMSG", [t, x]) => Command::PRIVMSG(t.to_string(), x.to_string()),
            ("NOTICE", [t, x]) => Command::NOTICE(t.to_string(), x.to_string()),
            ("PING", [s]) => Command::PING(s.to_string(), None),
            ("PING", [s, t]) => Command::PING(s.to_string(), Some(t.to_string())),
            ("PONG", [s]) => Command::PONG(s.to_string(), None),
            ("PONG", [s, t]) => Command::PONG(s.to_string(), Some(t.to_string())),
            ("NAMES", [c, ..]) => Command::NAMES(c.to_string()),
            ("QUIT", []) => Command::QUIT(None),
            ("QUIT", [m]) => Command::QUIT(Some(m.to_string())),
            _ => Command::Raw(name.to_string(), owned(args)),
        })
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// The last argument needs a `:` marker when it is empty, contains a
/// space, or itself starts with a colon.
fn needs_colon(arg: &str) -> bool {
    arg.is_empty() || arg.contains(' ') || arg.starts_with(':')
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[String]) -> fmt::Result {
    let last = args.len().saturating_sub(1);
    for (i, arg) in args.iter().enumerate() {
        f.write_str(" ")?;
        if i == last && needs_colon(arg) {
            f.write_str(":")?;
        }
        f.write_str(arg)?;
    }
    Ok(())
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NICK(n) => write!(f, "NICK {}", n),
            Command::USER(u, m, r) => write!(f, "USER {} {} * :{}", u, m, r),
            Command::JOIN(c) => write!(f, "JOIN {}", c),
            Command::PART(c, None) => write!(f, "PART {}", c),
            Command::PART(c, Some(m)) => write!(f, "PART {} :{}", c, m),
            Command::PRIVMSG(t, x) => write!(f, "PRIVMSG {} :{}", t, x),
            Command::NOTICE(t, x) => write!(f, "NOTICE {} :{}", t, x),
            Command::PING(s, None) => write!(f, "PING :{}", s),
            Command::PING(s, Some(t)) => write!(f, "PING {} :{}", s, t),
            Command::PONG(s, None) => write!(f, "PONG :{}", s),
            Command::PONG(s, Some(t)) => write!(f, "PONG {} :{}", s, t),
            Command::NAMES(c) => write!(f, "NAMES {}", c),
            Command::QUIT(None) => write!(f, "QUIT"),
            Command::QUIT(Some(m)) => write!(f, "QUIT :{}", m),
            Command::Response(code, args) => {
                write!(f, "{:03}", code)?;
                write_args(f, args)
            }
            Command::Raw(name, args) => {
                f.write_str(name)?;
                write_args(f, args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_known_commands() {
        assert_eq!(
            Command::new("PRIVMSG", &["#lobby", "hi there"]).unwrap(),
            Command::PRIVMSG("#lobby".into(), "hi there".into())
        );
        assert_eq!(
            Command::new("ping", &["abc"]).unwrap(),
            Command::PING("abc".into(), None)
        );
    }

    #[test]
    fn numeric_becomes_response() {
        let cmd = Command::new("353", &["me", "=", "#lobby", "a b"]).unwrap();
        assert_eq!(
            cmd,
            Command::Response(RPL_NAMREPLY, vec!["me".into(), "=".into(), "#lobby".into(), "a b".into()])
        );
    }

    #[test]
    fn wrong_arity_falls_to_raw() {
        assert!(matches!(
            Command::new("PRIVMSG", &["#lobby"]).unwrap(),
            Command::Raw(_, _)
        ));
    }

    #[test]
    fn display_forms() {
        assert_eq!(
            Command::PRIVMSG("#lobby".into(), "hi there".into()).to_string(),
            "PRIVMSG #lobby :hi there"
        );
        assert_eq!(Command::PONG("xyz".into(), None).to_string(), "PONG :xyz");
        assert_eq!(Command::NAMES("#lobby".into()).to_string(), "NAMES #lobby");
        assert_eq!(
            Command::Response(RPL_NAMREPLY, vec!["me".into(), "=".into(), "#l".into(), "a b".into()])
                .to_string(),
            "353 me = #l :a b"
        );
    }
}
