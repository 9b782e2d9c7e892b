//! Integration test common infrastructure.
//!
//! The bot is the client, so tests play the server end of the wire: bind a
//! loopback listener, point the bot at it, and script raw IRC lines over
//! the accepted connection.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use tale_proto::LineCodec;
use talebot::config::BotConfig;
use talebot::narrative::NarrativeTable;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// The scripted server side of the connection.
pub struct ServerEnd {
    framed: Framed<TcpStream, LineCodec>,
}

/// Handle to the running bot under test.
pub struct TestBot {
    cancel: CancellationToken,
    handle: JoinHandle<talebot::BotResult<()>>,
}

impl TestBot {
    pub async fn shutdown(self) {
        self.cancel.cancel();
        timeout(RECV_TIMEOUT, self.handle)
            .await
            .expect("bot exits after cancellation")
            .expect("bot task completes")
            .expect("bot exits cleanly");
    }
}

/// Start the bot against a fresh listener and accept its connection.
/// Consumes the NICK/USER registration burst.
pub async fn start(channels: &[&str], narratives: &str) -> (ServerEnd, TestBot) {
    start_with(channels, narratives, |_| {}).await
}

/// Like [`start`], with a config tweak applied before launch.
pub async fn start_with(
    channels: &[&str],
    narratives: &str,
    tweak: impl FnOnce(&mut BotConfig),
) -> (ServerEnd, TestBot) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    let mut config = test_config(port, channels);
    tweak(&mut config);
    let table = NarrativeTable::parse(narratives);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(talebot::run_with(config, table, cancel.clone()));

    let (stream, _) = timeout(RECV_TIMEOUT, listener.accept())
        .await
        .expect("bot connects")
        .expect("accept");

    let mut server = ServerEnd {
        framed: Framed::new(stream, LineCodec::new()),
    };
    server.expect_registration().await;

    (server, TestBot { cancel, handle })
}

/// A validated config pointing the bot at the loopback listener.
/// Timing knobs are tightened so tests run fast.
pub fn test_config(port: u16, channels: &[&str]) -> BotConfig {
    let list = channels
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let raw = format!(
        r#"
nickname = "talebot"
server = "127.0.0.1"
port = {port}
channels = [{list}]
narratives = "unused"
send_gap_ms = 1
auth_throttle_ms = 0

[[admins]]
name = "oona"
password = "hunter2"

[[admins]]
name = "eve"
password = "evepass"
"#
    );
    BotConfig::parse(&raw).expect("test config parses")
}

impl ServerEnd {
    /// Next line from the bot, within the receive timeout.
    pub async fn recv_line(&mut self) -> String {
        timeout(RECV_TIMEOUT, self.framed.next())
            .await
            .expect("line within timeout")
            .expect("connection open")
            .expect("line decodes")
    }

    /// Receive until a line satisfies the predicate; returns that line.
    pub async fn recv_until(&mut self, pred: impl Fn(&str) -> bool) -> String {
        loop {
            let line = self.recv_line().await;
            if pred(&line) {
                return line;
            }
        }
    }

    /// Assert that no line at all arrives within `window`.
    pub async fn assert_silent(&mut self, window: Duration) {
        match timeout(window, self.framed.next()).await {
            Err(_elapsed) => {}
            Ok(Some(Ok(line))) => panic!("expected silence, got {line:?}"),
            Ok(other) => panic!("expected silence, connection ended: {other:?}"),
        }
    }

    /// Send one raw line to the bot.
    pub async fn send_line(&mut self, line: &str) {
        self.framed
            .send(format!("{line}\r\n"))
            .await
            .expect("server send");
    }

    /// Deliver a PRIVMSG as if `from` said `text` to `target`.
    pub async fn privmsg(&mut self, from: &str, target: &str, text: &str) {
        self.send_line(&format!(":{from}!user@host PRIVMSG {target} :{text}"))
            .await;
    }

    /// Deliver a NAMES (353) reply for `channel` listing `nicks`.
    pub async fn names_reply(&mut self, channel: &str, nicks: &str) {
        self.send_line(&format!(":test.server 353 talebot = {channel} :{nicks}"))
            .await;
    }

    async fn expect_registration(&mut self) {
        let nick = self.recv_line().await;
        assert!(nick.starts_with("NICK "), "expected NICK, got {nick:?}");
        let user = self.recv_line().await;
        assert!(user.starts_with("USER "), "expected USER, got {user:?}");
    }

    /// Consume the JOIN burst; worker startup order is unspecified.
    pub async fn expect_joins(&mut self, channels: &[&str]) {
        let mut seen = Vec::new();
        for _ in 0..channels.len() {
            let line = self.recv_until(|l| l.starts_with("JOIN ")).await;
            seen.push(line["JOIN ".len()..].to_string());
        }
        let mut want: Vec<String> = channels.iter().map(|c| c.to_string()).collect();
        seen.sort();
        want.sort();
        assert_eq!(seen, want);
    }
}
