//! talebot - a multi-channel moderating IRC responder.
//!
//! One connection, one dispatcher, one worker per channel. The dispatcher
//! owns the socket's read half and routes traffic to per-channel workers
//! over private FIFO queues; every outbound line funnels through a shared,
//! rate-limited send gate. Moderation state (mute flags, ignore list,
//! authed admins, topic) is shared across workers behind a single lock.

pub mod admin;
pub mod config;
pub mod error;
pub mod mention;
pub mod narrative;
pub mod network;
pub mod state;

use std::sync::Arc;
use tale_proto::{LineCodec, Message};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Duration;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use crate::config::BotConfig;
pub use crate::error::{BotError, BotResult};
use crate::narrative::NarrativeTable;
use crate::network::{ChannelWorker, Dispatcher, SendGate};
use crate::state::{Moderation, Shared};

/// Capacity of each worker's inbound line queue.
const INBOUND_QUEUE_DEPTH: usize = 64;

/// Load narratives and run the bot until shutdown or connection loss.
pub async fn run(config: BotConfig, cancel: CancellationToken) -> BotResult<()> {
    let narratives = NarrativeTable::load(&config.narratives)?;
    info!(count = narratives.len(), "Loaded narratives");
    run_with(config, narratives, cancel).await
}

/// Run the bot with an already-built narrative table.
///
/// Connects, registers, spawns one worker per channel plus the dispatcher,
/// then performs the orderly shutdown: a single QUIT, cancellation
/// delivered to every worker, and a join on all of them before returning.
pub async fn run_with(
    config: BotConfig,
    narratives: NarrativeTable,
    cancel: CancellationToken,
) -> BotResult<()> {
    let stream = network::connect(&config).await?;
    let (read_half, write_half) = stream.into_split();
    let reader = FramedRead::new(read_half, LineCodec::new());
    let gate = SendGate::new(write_half, Duration::from_millis(config.send_gap_ms));

    let channel_count = config.channels.len();
    let moderation = Moderation::new(channel_count, config.max_authed_admins, config.max_ignored);
    let shared = Arc::new(Shared {
        config,
        narratives,
        moderation,
        gate,
    });

    network::handshake(&shared).await?;

    let mut inbound = Vec::with_capacity(channel_count);
    let mut workers = JoinSet::new();
    for index in 0..channel_count {
        let (tx, rx) = mpsc::channel(INBOUND_QUEUE_DEPTH);
        inbound.push(tx);
        workers.spawn(ChannelWorker::new(shared.clone(), index, rx, cancel.clone()).run());
    }

    let dispatcher = Dispatcher::new(shared.clone(), inbound, cancel.clone())?;
    let result = dispatcher.run(reader).await;

    if let Err(e) = shared.gate.send(Message::quit("Bot logging off")).await {
        warn!(error = %e, "failed to send QUIT");
    }
    cancel.cancel();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "worker exited with error"),
            Err(e) => warn!(error = %e, "worker task panicked"),
        }
    }
    info!("all workers terminated");

    result
}
