//! Admin command processing.
//!
//! Privileged commands arrive through the admin channel; authentication
//! arrives as a private `!auth` message handled by the dispatcher. Every
//! state change here happens while holding the send gate, so the mutation
//! and its confirmation reply are one atomic unit as far as any other
//! sender can observe.

use tale_proto::{irc_eq, Message};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::error::BotResult;
use crate::state::Shared;

/// The reserved channel privileged commands are issued through. If it is
/// not in the configured channel list, admin commands are simply
/// unreachable.
pub const ADMIN_CHANNEL: &str = "#admin";

/// Process a private `!auth` request from `sender`.
///
/// `rest` is everything after the `!auth ` prefix: either the bare
/// password, or `<nick> <password>` where the nick names the sender.
/// Returns whether authentication succeeded.
pub async fn try_auth(shared: &Shared, sender: &str, rest: &str) -> BotResult<bool> {
    let rest = rest.trim();
    let password = match rest.split_once(' ') {
        Some((first, pass)) if irc_eq(first, sender) => pass.trim(),
        _ => rest,
    };

    let ok = shared
        .config
        .admins
        .iter()
        .any(|a| irc_eq(&a.name, sender) && a.password == password);

    let mut gate = shared.gate.lock().await;
    if ok {
        // Capacity overflow is silently rejected; the attempt still gets
        // its confirmation, matching the bounded-set contract.
        shared.moderation.add_authed(sender);
        info!(sender, "admin authenticated");
        gate.send(Message::privmsg(sender, "Authenticated as admin."))
            .await?;
        gate.send(Message::privmsg(
            ADMIN_CHANNEL,
            format!("Authenticated admin: {sender}"),
        ))
        .await?;
    } else {
        warn!(sender, "failed admin auth attempt");
        gate.send(Message::privmsg(sender, "Authentication failed."))
            .await?;
        gate.send(Message::privmsg(
            ADMIN_CHANNEL,
            format!("Failed admin auth attempt by: {sender}"),
        ))
        .await?;
    }

    // Throttle repeated attempts by keeping the send path held.
    gate.hold(Duration::from_millis(shared.config.auth_throttle_ms))
        .await;

    Ok(ok)
}

/// Interpret a message seen in the admin channel.
///
/// Always reports handled: the admin channel never falls through to
/// narrative replies.
pub async fn handle(shared: &Shared, sender: &str, text: &str) -> BotResult<bool> {
    let moderation = &shared.moderation;

    // Ignored senders get nothing, with one escape hatch so an ignored
    // admin can un-ignore themselves.
    if moderation.is_ignored(sender) && !text.starts_with("!removeignore ") {
        debug!(sender, "dropping admin command from ignored sender");
        return Ok(true);
    }

    if !moderation.is_authed(sender) {
        shared
            .gate
            .send(Message::privmsg(
                ADMIN_CHANNEL,
                format!(
                    "You must authenticate with /msg {} !auth password before using admin commands.",
                    shared.config.nickname
                ),
            ))
            .await?;
        return Ok(true);
    }

    if let Some(channel) = text.strip_prefix("!stop ") {
        set_mute(shared, channel.trim(), true).await?;
    } else if let Some(channel) = text.strip_prefix("!start ") {
        set_mute(shared, channel.trim(), false).await?;
    } else if let Some(nick) = text.strip_prefix("!ignore ") {
        let nick = nick.trim();
        let mut gate = shared.gate.lock().await;
        moderation.add_ignored(nick);
        info!(nick, "now ignoring");
        gate.send(Message::privmsg(
            ADMIN_CHANNEL,
            format!("Now ignoring user: {nick}"),
        ))
        .await?;
    } else if let Some(nick) = text.strip_prefix("!removeignore ") {
        let nick = nick.trim();
        let mut gate = shared.gate.lock().await;
        moderation.remove_ignored(nick);
        info!(nick, "ignore removed");
        gate.send(Message::privmsg(
            ADMIN_CHANNEL,
            format!("Ignore removed for user: {nick}"),
        ))
        .await?;
    } else if text.starts_with("!clearignore") {
        let mut gate = shared.gate.lock().await;
        moderation.clear_ignored();
        info!("all ignores cleared");
        gate.send(Message::privmsg(ADMIN_CHANNEL, "All ignores cleared."))
            .await?;
    } else if let Some(topic) = text.strip_prefix("!settopic ") {
        let mut gate = shared.gate.lock().await;
        let stored = moderation.set_topic(topic);
        info!(topic = %stored, "topic changed");
        gate.send(Message::privmsg(
            ADMIN_CHANNEL,
            format!("Topic changed to: {stored}"),
        ))
        .await?;
    } else {
        shared
            .gate
            .send(Message::privmsg(
                ADMIN_CHANNEL,
                "Enter a valid admin command.",
            ))
            .await?;
    }

    Ok(true)
}

async fn set_mute(shared: &Shared, channel: &str, muted: bool) -> BotResult<()> {
    match shared.config.channel_index(channel) {
        Some(index) => {
            let mut gate = shared.gate.lock().await;
            shared.moderation.set_muted(index, muted);
            info!(channel, muted, "mute flag updated");
            let reply = if muted {
                format!("Bot will stop talking in {channel}.")
            } else {
                format!("Bot will resume talking in {channel}.")
            };
            gate.send(Message::privmsg(ADMIN_CHANNEL, reply)).await?;
        }
        None => {
            shared
                .gate
                .send(Message::privmsg(
                    ADMIN_CHANNEL,
                    format!("Error: Bot has not joined channel {channel}."),
                ))
                .await?;
        }
    }
    Ok(())
}
