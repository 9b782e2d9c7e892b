//! The shared outbound send path.
//!
//! The connection's write half is a single shared resource. Every sender —
//! dispatcher, workers, the admin path — goes through [`SendGate`], which
//! serializes writes behind one async mutex and enforces a minimum spacing
//! between lines to stay under server flood limits. A line is either
//! written whole under the lock or not written at all.

use futures_util::SinkExt;
use tale_proto::{LineCodec, Message};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{sleep, Duration, Instant};
use tokio_util::codec::FramedWrite;
use tracing::trace;

use crate::error::BotResult;

/// Lock-serialized, rate-limited writer over the connection's write half.
pub struct SendGate {
    inner: Mutex<GateInner>,
    gap: Duration,
}

struct GateInner {
    sink: FramedWrite<OwnedWriteHalf, LineCodec>,
    last_send: Option<Instant>,
}

impl SendGate {
    /// Wrap a write half with a minimum inter-line gap.
    pub fn new(write_half: OwnedWriteHalf, gap: Duration) -> Self {
        Self {
            inner: Mutex::new(GateInner {
                sink: FramedWrite::new(write_half, LineCodec::new()),
                last_send: None,
            }),
            gap,
        }
    }

    /// Send one message: lock, pace, write, release.
    pub async fn send(&self, msg: Message) -> BotResult<()> {
        self.lock().await.send(msg).await
    }

    /// Acquire the gate for several coordinated operations.
    ///
    /// While the permit is held no other task can send, so a state change
    /// performed between two `send` calls is observed atomically with its
    /// confirmation by every other sender.
    pub async fn lock(&self) -> SendPermit<'_> {
        SendPermit {
            inner: self.inner.lock().await,
            gap: self.gap,
        }
    }
}

/// Exclusive access to the send path.
pub struct SendPermit<'a> {
    inner: MutexGuard<'a, GateInner>,
    gap: Duration,
}

impl SendPermit<'_> {
    /// Write one line, sleeping out the remainder of the inter-line gap
    /// since the previous send first.
    pub async fn send(&mut self, msg: Message) -> BotResult<()> {
        if let Some(last) = self.inner.last_send {
            let since = last.elapsed();
            if since < self.gap {
                sleep(self.gap - since).await;
            }
        }

        let line = msg.to_string();
        trace!(line = %line.trim_end(), "send");
        self.inner.sink.send(line).await?;
        self.inner.last_send = Some(Instant::now());
        Ok(())
    }

    /// Keep the gate held for `duration`, throttling every other sender.
    pub async fn hold(&mut self, duration: Duration) {
        if !duration.is_zero() {
            sleep(duration).await;
        }
    }
}
