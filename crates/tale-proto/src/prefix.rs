//! IRC message prefix types.
//!
//! A prefix identifies the origin of a message: either a server name or a
//! user's `nick!user@host` mask.

use std::fmt;

/// IRC message prefix.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// Server name (e.g. "irc.example.net").
    ServerName(String),
    /// User prefix: (nickname, username, hostname).
    Nickname(String, String, String),
}

impl Prefix {
    /// Parse a prefix string leniently, without validating the components.
    ///
    /// A dot before any `!` or `@` marks the prefix as a server name.
    pub fn new_from_str(s: &str) -> Self {
        let (name, rest) = match s.split_once('!') {
            Some((n, r)) => (n, Some(r)),
            None => (s, None),
        };

        match rest {
            Some(rest) => {
                let (user, host) = match rest.split_once('@') {
                    Some((u, h)) => (u, h),
                    None => (rest, ""),
                };
                Prefix::Nickname(name.to_string(), user.to_string(), host.to_string())
            }
            None => match name.split_once('@') {
                // nick@host without a user part
                Some((n, h)) if !n.contains('.') => {
                    Prefix::Nickname(n.to_string(), String::new(), h.to_string())
                }
                _ if name.contains('.') => Prefix::ServerName(name.to_string()),
                _ => Prefix::Nickname(name.to_string(), String::new(), String::new()),
            },
        }
    }

    /// The nickname, when this prefix identifies a user.
    pub fn nickname(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) => Some(nick),
            Prefix::ServerName(_) => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => write!(f, "{}", name),
            Prefix::Nickname(nick, user, host) => {
                write!(f, "{}", nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}
