//! The dispatcher: sole reader of the server connection.
//!
//! Parses every inbound line exactly once, answers PING itself, handles
//! private `!auth` requests, and routes PRIVMSG and NAMES-reply traffic to
//! the matching channel worker's inbound queue. Workers never touch the
//! read half.

use futures_util::StreamExt;
use regex::Regex;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tale_proto::{irc_eq, Command, LineCodec, Message, ProtocolError, RPL_NAMREPLY};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{lookup_host, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::admin;
use crate::config::{BotConfig, ConfigError};
use crate::error::{BotError, BotResult};
use crate::state::Shared;

/// Resolve the configured server and open the connection.
///
/// An IP literal skips name resolution. Failure here is fatal: the process
/// cannot proceed without a connection.
pub async fn connect(config: &BotConfig) -> BotResult<TcpStream> {
    let addr = match config.server.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, config.port),
        Err(_) => lookup_host((config.server.as_str(), config.port))
            .await
            .map_err(|_| BotError::Resolve(config.server.clone()))?
            .next()
            .ok_or_else(|| BotError::Resolve(config.server.clone()))?,
    };

    info!(%addr, "connecting");
    TcpStream::connect(addr).await.map_err(BotError::Connect)
}

/// Register the bot's identity on a fresh connection.
pub async fn handshake(shared: &Shared) -> BotResult<()> {
    let nickname = shared.config.nickname.as_str();
    shared.gate.send(Message::nick(nickname)).await?;
    shared.gate.send(Message::user(nickname, nickname)).await?;
    Ok(())
}

/// The server-facing read loop.
pub struct Dispatcher {
    shared: Arc<Shared>,
    workers: Vec<mpsc::Sender<String>>,
    cancel: CancellationToken,
    sibling: Regex,
}

impl Dispatcher {
    /// Build a dispatcher routing to one inbound queue per configured
    /// channel, in configuration order.
    pub fn new(
        shared: Arc<Shared>,
        workers: Vec<mpsc::Sender<String>>,
        cancel: CancellationToken,
    ) -> BotResult<Self> {
        let pattern = &shared.config.sibling_nick_pattern;
        let sibling = Regex::new(pattern).map_err(|source| ConfigError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        Ok(Self {
            shared,
            workers,
            cancel,
            sibling,
        })
    }

    /// Run the blocking read loop until shutdown or connection loss.
    ///
    /// Connection loss is fatal for the whole process; the caller performs
    /// the orderly QUIT-and-join shutdown either way.
    pub async fn run(mut self, mut reader: FramedRead<OwnedReadHalf, LineCodec>) -> BotResult<()> {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("dispatcher shutting down");
                    return Ok(());
                }
                item = reader.next() => match item {
                    Some(Ok(line)) => self.dispatch(&line).await?,
                    Some(Err(ProtocolError::Io(e))) => {
                        warn!(error = %e, "read failed");
                        return Err(BotError::ConnectionClosed);
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "dropping undecodable line");
                    }
                    None => {
                        warn!("server closed the connection");
                        return Err(BotError::ConnectionClosed);
                    }
                },
            }
        }
    }

    async fn dispatch(&mut self, line: &str) -> BotResult<()> {
        let msg: Message = match line.parse() {
            Ok(msg) => msg,
            Err(e) => {
                trace!(line, error = %e, "dropping unparsable line");
                return Ok(());
            }
        };

        match &msg.command {
            // PONG bypasses all other logic.
            Command::PING(token, _) => {
                self.shared.gate.send(Message::pong(token.as_str())).await?;
            }
            Command::PRIVMSG(target, text) => {
                self.dispatch_privmsg(&msg, target, text, line).await?;
            }
            Command::Response(RPL_NAMREPLY, args) => {
                // Workers need the raw NAMES line to resolve pending
                // mention requests.
                let index = args
                    .iter()
                    .filter(|a| a.starts_with('#'))
                    .find_map(|a| self.shared.config.channel_index(a));
                if let Some(index) = index {
                    self.forward(index, line).await;
                }
            }
            _ => trace!(line, "unrouted line"),
        }
        Ok(())
    }

    async fn dispatch_privmsg(
        &mut self,
        msg: &Message,
        target: &str,
        text: &str,
        line: &str,
    ) -> BotResult<()> {
        let Some(sender) = msg.source_nickname() else {
            return Ok(());
        };
        let config = &self.shared.config;

        // Reply-loop guard: our own echoes and sibling bot instances.
        if irc_eq(sender, &config.nickname) {
            trace!(sender, "dropping own message");
            return Ok(());
        }
        if self.sibling.is_match(sender) {
            debug!(sender, "dropping sibling bot traffic");
            return Ok(());
        }

        // Private authentication requests are handled here, never routed.
        if irc_eq(target, &config.nickname) {
            if let Some(rest) = text.strip_prefix("!auth ") {
                admin::try_auth(&self.shared, sender, rest).await?;
            }
            return Ok(());
        }

        match config.channel_index(target) {
            Some(index) => self.forward(index, line).await,
            None => trace!(target, "no worker for target"),
        }
        Ok(())
    }

    async fn forward(&mut self, index: usize, line: &str) {
        if self.workers[index].send(line.to_string()).await.is_err() {
            debug!(index, "worker inbound queue closed");
        }
    }
}
