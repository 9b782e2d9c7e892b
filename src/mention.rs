//! Mention correlation.
//!
//! Chat text is scanned for two kinds of mention. A username-shaped token
//! (four letters then four digits, the network's account convention)
//! triggers an asynchronous `NAMES` query; the reply is reconciled against
//! a single pending request to decide whether the mentioned user was
//! absent and should get a private alert. A configured channel name
//! appearing in text sends an immediate alert to that channel.
//!
//! One request may be pending per worker at a time; a newer detection
//! overwrites the old one, and a reply that arrives after the validity
//! window clears the slot without alerting.

use regex::Regex;
use std::sync::Arc;
use tale_proto::{irc_eq, Message};
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::BotResult;
use crate::state::Shared;

/// Username-shaped token: four letters then four digits.
const USERNAME_PATTERN: &str = "[A-Za-z]{4}[0-9]{4}";

/// Nick sigils a NAMES reply may prepend (op, voice, and friends).
const NICK_SIGILS: [char; 5] = ['@', '+', '%', '&', '~'];

/// Per-worker mention state.
pub struct MentionWatch {
    shared: Arc<Shared>,
    index: usize,
    channel: String,
    username_re: Regex,
    pending: Option<PendingMention>,
}

struct PendingMention {
    user: String,
    sender: String,
    channel: String,
    issued: Instant,
}

impl MentionWatch {
    /// Create the watch for the channel at `index`.
    pub fn new(shared: Arc<Shared>, index: usize) -> Self {
        let channel = shared.config.channels[index].clone();
        Self {
            shared,
            index,
            channel,
            username_re: Regex::new(USERNAME_PATTERN).expect("built-in pattern is valid"),
            pending: None,
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.shared.config.mention_window_secs)
    }

    /// Scan text for a username mention; on the first qualifying match,
    /// issue a `NAMES` query and (over)write the pending request.
    pub async fn scan_usernames(&mut self, text: &str, sender: &str) -> BotResult<()> {
        let Some(user) = find_username_mention(&self.username_re, text, sender) else {
            return Ok(());
        };

        debug!(
            user,
            sender,
            channel = %self.channel,
            "username mention detected, querying NAMES"
        );
        self.shared
            .gate
            .send(Message::names(self.channel.as_str()))
            .await?;
        self.pending = Some(PendingMention {
            user: user.to_string(),
            sender: sender.to_string(),
            channel: self.channel.clone(),
            issued: Instant::now(),
        });
        Ok(())
    }

    /// Alert every *other* configured channel whose name appears in the
    /// text at a word boundary, once per channel per message.
    pub async fn scan_channels(&self, text: &str, sender: &str) -> BotResult<()> {
        for (i, channel) in self.shared.config.channels.iter().enumerate() {
            if i == self.index {
                continue;
            }
            if channel_mentioned(text, channel) {
                self.shared
                    .gate
                    .send(Message::privmsg(
                        channel,
                        format!(
                            "[ALERT] {} mentioned this channel ({}) in {}",
                            sender, channel, self.channel
                        ),
                    ))
                    .await?;
            }
        }
        Ok(())
    }

    /// Reconcile a NAMES reply (the 353 numeric's arguments) against the
    /// pending request.
    pub async fn resolve_pending(&mut self, args: &[String]) -> BotResult<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let Some(list) = args.last() else {
            self.pending = Some(pending);
            return Ok(());
        };

        let present = list
            .split_whitespace()
            .any(|tok| irc_eq(tok.trim_start_matches(NICK_SIGILS), &pending.user));
        if present {
            debug!(user = %pending.user, "mentioned user is online, no alert");
            return Ok(());
        }

        // A stale reply must never trigger a late alert.
        if pending.issued.elapsed() > self.window() {
            debug!(user = %pending.user, "stale NAMES reply, dropping pending mention");
            return Ok(());
        }

        let channel = args[..args.len() - 1]
            .iter()
            .find(|a| a.starts_with('#'))
            .map(String::as_str)
            .unwrap_or(pending.channel.as_str());

        self.shared
            .gate
            .send(Message::privmsg(
                pending.user.as_str(),
                format!("[ALERT] {} mentioned you in {}.", pending.sender, channel),
            ))
            .await?;
        info!(user = %pending.user, channel, "sent offline mention alert");
        Ok(())
    }
}

/// First username-shaped token at an alphanumeric word boundary, skipping
/// the sender's own nick.
fn find_username_mention<'t>(re: &Regex, text: &'t str, sender: &str) -> Option<&'t str> {
    let bytes = text.as_bytes();
    for m in re.find_iter(text) {
        let start_ok = m.start() == 0 || !bytes[m.start() - 1].is_ascii_alphanumeric();
        let end_ok = m.end() >= text.len() || !bytes[m.end()].is_ascii_alphanumeric();
        if !(start_ok && end_ok) {
            continue;
        }
        if irc_eq(m.as_str(), sender) {
            continue;
        }
        return Some(m.as_str());
    }
    None
}

/// Whether `channel` appears in `text` at an alphanumeric word boundary,
/// case-insensitively.
fn channel_mentioned(text: &str, channel: &str) -> bool {
    let hay = text.to_ascii_lowercase();
    let needle = channel.to_ascii_lowercase();
    if needle.is_empty() {
        return false;
    }

    let mut from = 0;
    while let Some(pos) = hay[from..].find(&needle) {
        let start = from + pos;
        let end = start + needle.len();
        let start_ok = start == 0 || !hay.as_bytes()[start - 1].is_ascii_alphanumeric();
        let end_ok = end >= hay.len() || !hay.as_bytes()[end].is_ascii_alphanumeric();
        if start_ok && end_ok {
            return true;
        }
        from = end;
    }
    false
}
