//! Narrative response table.
//!
//! A line-oriented `channel|trigger|response` file loaded once at startup
//! and consulted read-only by the workers. Lookup is first-match-wins in
//! file order; a `*` trigger matches anything, and literal triggers match
//! as case-insensitive substrings.

use std::path::Path;
use tale_proto::irc_to_lower;
use tracing::debug;

/// One `channel|trigger|response` row.
#[derive(Debug, Clone)]
struct NarrativeEntry {
    /// Channel name, stored IRC-lowercased.
    channel: String,
    trigger: String,
    response: String,
}

/// The loaded response table.
#[derive(Debug, Default)]
pub struct NarrativeTable {
    entries: Vec<NarrativeEntry>,
}

impl NarrativeTable {
    /// Load the table from a file. I/O failure is fatal at startup.
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Parse table content. Blank lines and `#`-comment lines (lines
    /// starting with `#` that carry no `|`) are skipped; so are rows with
    /// missing fields.
    pub fn parse(content: &str) -> Self {
        let mut entries = Vec::new();
        for line in content.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') && !line.contains('|') {
                continue;
            }

            let mut fields = line.splitn(3, '|');
            let (Some(channel), Some(trigger), Some(response)) =
                (fields.next(), fields.next(), fields.next())
            else {
                debug!(line, "skipping malformed narrative row");
                continue;
            };

            entries.push(NarrativeEntry {
                channel: irc_to_lower(channel.trim()),
                trigger: trigger.to_string(),
                response: response.to_string(),
            });
        }
        Self { entries }
    }

    /// Look up a response for a message in a channel. First match in table
    /// order wins.
    pub fn respond(&self, channel: &str, text: &str) -> Option<&str> {
        let channel = irc_to_lower(channel);
        let text = text.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|e| {
                e.channel == channel
                    && (e.trigger == "*" || text.contains(&e.trigger.to_ascii_lowercase()))
            })
            .map(|e| e.response.as_str())
    }

    /// Number of loaded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
