//! Per-channel workers.
//!
//! One worker task per configured channel. Each consumes its private FIFO
//! of raw protocol lines from the dispatcher, applies moderation checks,
//! and generates every reply for its channel. Lines are re-parsed locally:
//! NAMES replies have a different shape than PRIVMSG, so the worker trusts
//! nothing but the raw line.

use std::sync::Arc;
use tale_proto::{irc_eq, irc_to_lower, Command, Message, RPL_NAMREPLY};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::admin;
use crate::error::BotResult;
use crate::mention::MentionWatch;
use crate::state::Shared;

/// Identical inbound lines inside this window are treated as server
/// flood and dispatched once.
const DUPLICATE_WINDOW: Duration = Duration::from_secs(1);

/// The concurrent unit owning one channel's reply logic.
pub struct ChannelWorker {
    shared: Arc<Shared>,
    index: usize,
    inbound: mpsc::Receiver<String>,
    cancel: CancellationToken,
}

impl ChannelWorker {
    /// Create a worker for the channel at `index` in the configured list.
    pub fn new(
        shared: Arc<Shared>,
        index: usize,
        inbound: mpsc::Receiver<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            shared,
            index,
            inbound,
            cancel,
        }
    }

    /// Join the channel, then process inbound lines until shutdown.
    pub async fn run(mut self) -> BotResult<()> {
        let channel = self.shared.config.channels[self.index].clone();
        info!(channel = %channel, "worker joining channel");
        self.shared.gate.send(Message::join(channel.as_str())).await?;

        let mut mentions = MentionWatch::new(self.shared.clone(), self.index);
        let mut last: Option<(String, Instant)> = None;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                line = self.inbound.recv() => {
                    let Some(line) = line else { break };

                    // Flood idempotence: drop an identical line arriving
                    // within the suppression window.
                    let now = Instant::now();
                    if let Some((prev, at)) = &last {
                        if *prev == line && now.duration_since(*at) < DUPLICATE_WINDOW {
                            trace!(channel = %channel, "suppressing duplicate line");
                            continue;
                        }
                    }
                    last = Some((line.clone(), now));

                    if let Err(e) = self.process(&channel, &line, &mut mentions).await {
                        warn!(channel = %channel, error = %e, "failed to process line");
                    }
                }
            }
        }

        // The dispatcher owns the connection-level QUIT; this marker is the
        // worker's whole goodbye.
        debug!(channel = %channel, "worker exiting");
        Ok(())
    }

    async fn process(
        &self,
        channel: &str,
        line: &str,
        mentions: &mut MentionWatch,
    ) -> BotResult<()> {
        // Malformed lines drop with no reply and no crash.
        let Ok(msg) = line.parse::<Message>() else {
            trace!(line, "dropping unparsable line");
            return Ok(());
        };

        match &msg.command {
            Command::Response(RPL_NAMREPLY, args) => mentions.resolve_pending(args).await,
            Command::PRIVMSG(target, text) => {
                let Some(sender) = msg.source_nickname() else {
                    return Ok(());
                };
                self.handle_privmsg(channel, sender, target, text, mentions)
                    .await
            }
            _ => Ok(()),
        }
    }

    async fn handle_privmsg(
        &self,
        channel: &str,
        sender: &str,
        target: &str,
        text: &str,
        mentions: &mut MentionWatch,
    ) -> BotResult<()> {
        let shared = &self.shared;

        // The admin channel is command-only; it never gets narrative
        // replies.
        if irc_eq(channel, admin::ADMIN_CHANNEL)
            && admin::handle(shared, sender, text).await?
        {
            return Ok(());
        }

        // A muted channel is fully silent: no replies, no mention
        // correlation, no state changes.
        if shared.moderation.is_muted(self.index) {
            return Ok(());
        }

        if shared.moderation.is_ignored(sender) {
            debug!(channel, sender, "ignoring user");
            return Ok(());
        }

        if text.starts_with("!topic?") {
            if let Some(topic) = shared.moderation.topic() {
                shared
                    .gate
                    .send(Message::privmsg(target, format!("Current topic: {topic}")))
                    .await?;
                return Ok(());
            }
        }

        mentions.scan_usernames(text, sender).await?;
        mentions.scan_channels(text, sender).await?;

        if let Some(reply) = shared.narratives.respond(&irc_to_lower(channel), text) {
            debug!(channel, sender, "narrative reply");
            shared.gate.send(Message::privmsg(target, reply)).await?;
        }
        Ok(())
    }
}
