//! Shared cross-worker state.
//!
//! One `Shared` instance is built at startup and handed to the dispatcher
//! and every worker behind an `Arc`. Moderation fields live behind a single
//! mutex; the per-channel mute flags are additionally mirrored as atomics
//! so the worker hot path can check them without taking the lock.
//!
//! Admin commands coordinate their state change with the confirmation
//! reply by holding the outbound send gate across both — see
//! [`crate::admin`] and [`crate::network::SendGate`].

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tale_proto::irc_eq;

use crate::config::BotConfig;
use crate::narrative::NarrativeTable;
use crate::network::SendGate;

/// Longest topic text the bot stores; `!settopic` input is truncated here.
pub const TOPIC_MAX_LEN: usize = 255;

/// Everything the dispatcher and workers share.
pub struct Shared {
    /// Immutable bot configuration.
    pub config: BotConfig,
    /// Read-only narrative response table.
    pub narratives: NarrativeTable,
    /// Mutable moderation state.
    pub moderation: Moderation,
    /// The serialized, rate-limited outbound send path.
    pub gate: SendGate,
}

/// Cross-worker moderation state: mute flags, topic, authed admins, and
/// the ignore list.
pub struct Moderation {
    mute: Vec<AtomicBool>,
    inner: Mutex<ModerationInner>,
    max_authed: usize,
    max_ignored: usize,
}

#[derive(Default)]
struct ModerationInner {
    topic: String,
    authed: Vec<String>,
    ignored: Vec<String>,
}

impl Moderation {
    /// Create zeroed state for `channel_count` channels.
    pub fn new(channel_count: usize, max_authed: usize, max_ignored: usize) -> Self {
        Self {
            mute: (0..channel_count).map(|_| AtomicBool::new(false)).collect(),
            inner: Mutex::new(ModerationInner::default()),
            max_authed,
            max_ignored,
        }
    }

    /// Lock-free mute check for a channel index.
    pub fn is_muted(&self, index: usize) -> bool {
        self.mute
            .get(index)
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Set a channel's mute flag. Out-of-range indices are ignored.
    pub fn set_muted(&self, index: usize, muted: bool) {
        if let Some(flag) = self.mute.get(index) {
            flag.store(muted, Ordering::Relaxed);
        }
    }

    /// The current topic, if one has been set.
    pub fn topic(&self) -> Option<String> {
        let inner = self.inner.lock();
        if inner.topic.is_empty() {
            None
        } else {
            Some(inner.topic.clone())
        }
    }

    /// Replace the topic, truncating to [`TOPIC_MAX_LEN`] bytes on a char
    /// boundary. Returns the stored text.
    pub fn set_topic(&self, topic: &str) -> String {
        let mut topic = topic.to_string();
        if topic.len() > TOPIC_MAX_LEN {
            let mut cut = TOPIC_MAX_LEN;
            while !topic.is_char_boundary(cut) {
                cut -= 1;
            }
            topic.truncate(cut);
        }
        self.inner.lock().topic = topic.clone();
        topic
    }

    /// Whether a nick has authenticated as an admin.
    pub fn is_authed(&self, nick: &str) -> bool {
        self.inner.lock().authed.iter().any(|a| irc_eq(a, nick))
    }

    /// Record an authed admin. Idempotent; returns false only when the
    /// capacity bound rejects a new entry.
    pub fn add_authed(&self, nick: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner.authed.iter().any(|a| irc_eq(a, nick)) {
            return true;
        }
        if inner.authed.len() >= self.max_authed {
            return false;
        }
        inner.authed.push(nick.to_string());
        true
    }

    /// Whether a nick is on the ignore list.
    pub fn is_ignored(&self, nick: &str) -> bool {
        self.inner.lock().ignored.iter().any(|n| irc_eq(n, nick))
    }

    /// Add a nick to the ignore list. Idempotent; returns false only when
    /// the capacity bound rejects a new entry.
    pub fn add_ignored(&self, nick: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner.ignored.iter().any(|n| irc_eq(n, nick)) {
            return true;
        }
        if inner.ignored.len() >= self.max_ignored {
            return false;
        }
        inner.ignored.push(nick.to_string());
        true
    }

    /// Remove a nick from the ignore list.
    pub fn remove_ignored(&self, nick: &str) {
        self.inner.lock().ignored.retain(|n| !irc_eq(n, nick));
    }

    /// Empty the ignore list.
    pub fn clear_ignored(&self) {
        self.inner.lock().ignored.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mute_flags_default_off_and_toggle() {
        let m = Moderation::new(3, 10, 32);
        assert!(!m.is_muted(0));
        m.set_muted(0, true);
        assert!(m.is_muted(0));
        assert!(!m.is_muted(1));
        m.set_muted(0, false);
        assert!(!m.is_muted(0));
        // out of range is a no-op, never a panic
        m.set_muted(99, true);
        assert!(!m.is_muted(99));
    }

    #[test]
    fn authed_set_is_case_insensitive_and_bounded() {
        let m = Moderation::new(1, 2, 32);
        assert!(m.add_authed("Oona"));
        assert!(m.is_authed("oona"));
        // idempotent re-add succeeds
        assert!(m.add_authed("OONA"));
        assert!(m.add_authed("bob"));
        // capacity reached: silently rejected
        assert!(!m.add_authed("eve"));
        assert!(!m.is_authed("eve"));
    }

    #[test]
    fn ignore_list_add_remove_clear() {
        let m = Moderation::new(1, 10, 2);
        assert!(m.add_ignored("eve"));
        assert!(m.is_ignored("EVE"));
        assert!(m.add_ignored("mallory"));
        assert!(!m.add_ignored("trent"));
        m.remove_ignored("eve");
        assert!(!m.is_ignored("eve"));
        m.clear_ignored();
        assert!(!m.is_ignored("mallory"));
    }

    #[test]
    fn topic_is_truncated_on_char_boundary() {
        let m = Moderation::new(1, 10, 32);
        assert_eq!(m.topic(), None);

        let long = "é".repeat(200); // 400 bytes
        let stored = m.set_topic(&long);
        assert!(stored.len() <= TOPIC_MAX_LEN);
        assert!(stored.chars().all(|c| c == 'é'));
        assert_eq!(m.topic().as_deref(), Some(stored.as_str()));
    }
}
