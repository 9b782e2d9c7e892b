//! Server-facing networking.
//!
//! The dispatcher owns the read half of the single server connection;
//! workers own their channels' reply logic; everything outbound funnels
//! through the shared send gate.

mod dispatcher;
mod outbound;
mod worker;

pub use dispatcher::{connect, handshake, Dispatcher};
pub use outbound::{SendGate, SendPermit};
pub use worker::ChannelWorker;
