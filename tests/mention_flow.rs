//! Integration tests for mention correlation: NAMES round-trips for
//! username mentions and cross-channel alerts.

mod common;

use tokio::time::{sleep, Duration};

const QUIET: Duration = Duration::from_millis(300);

#[tokio::test]
async fn offline_username_mention_alerts_privately() {
    let (mut server, bot) = common::start(&["#lobby"], "").await;
    server.expect_joins(&["#lobby"]).await;

    server.privmsg("bob", "#lobby", "ask abcd1234 about it").await;
    assert_eq!(server.recv_line().await, "NAMES #lobby");

    server.names_reply("#lobby", "@oona bob +carol").await;
    assert_eq!(
        server.recv_line().await,
        "PRIVMSG abcd1234 :[ALERT] bob mentioned you in #lobby."
    );

    bot.shutdown().await;
}

#[tokio::test]
async fn online_username_mention_stays_quiet() {
    let (mut server, bot) = common::start(&["#lobby"], "").await;
    server.expect_joins(&["#lobby"]).await;

    server.privmsg("bob", "#lobby", "ask abcd1234 about it").await;
    assert_eq!(server.recv_line().await, "NAMES #lobby");

    // Present, behind a voice sigil.
    server.names_reply("#lobby", "@oona bob +abcd1234").await;
    server.assert_silent(QUIET).await;

    bot.shutdown().await;
}

#[tokio::test]
async fn stale_names_reply_never_alerts() {
    let (mut server, bot) =
        common::start_with(&["#lobby"], "", |cfg| cfg.mention_window_secs = 1).await;
    server.expect_joins(&["#lobby"]).await;

    server.privmsg("bob", "#lobby", "ask abcd1234 about it").await;
    assert_eq!(server.recv_line().await, "NAMES #lobby");

    sleep(Duration::from_millis(1300)).await;
    server.names_reply("#lobby", "@oona bob").await;
    server.assert_silent(QUIET).await;

    bot.shutdown().await;
}

#[tokio::test]
async fn newer_mention_overwrites_pending_request() {
    let (mut server, bot) = common::start(&["#lobby"], "").await;
    server.expect_joins(&["#lobby"]).await;

    server.privmsg("bob", "#lobby", "where is abcd1234").await;
    assert_eq!(server.recv_line().await, "NAMES #lobby");
    server.privmsg("carol", "#lobby", "where is wxyz9999").await;
    assert_eq!(server.recv_line().await, "NAMES #lobby");

    // One reply, neither user present: only the newest request alerts.
    server.names_reply("#lobby", "@oona bob carol").await;
    assert_eq!(
        server.recv_line().await,
        "PRIVMSG wxyz9999 :[ALERT] carol mentioned you in #lobby."
    );
    server.assert_silent(QUIET).await;

    bot.shutdown().await;
}

#[tokio::test]
async fn channel_mention_alerts_target_once_per_message() {
    let (mut server, bot) = common::start(&["#lobby", "#dev"], "").await;
    server.expect_joins(&["#lobby", "#dev"]).await;

    server
        .privmsg("bob", "#lobby", "the #dev folks know #dev stuff")
        .await;
    assert_eq!(
        server.recv_line().await,
        "PRIVMSG #dev :[ALERT] bob mentioned this channel (#dev) in #lobby"
    );
    server.assert_silent(QUIET).await;

    bot.shutdown().await;
}

#[tokio::test]
async fn embedded_channel_token_does_not_alert() {
    let (mut server, bot) = common::start(&["#lobby", "#dev"], "").await;
    server.expect_joins(&["#lobby", "#dev"]).await;

    server.privmsg("bob", "#lobby", "try x#dev or #developers").await;
    server.assert_silent(QUIET).await;

    bot.shutdown().await;
}

#[tokio::test]
async fn muted_channel_does_no_mention_correlation() {
    let (mut server, bot) = common::start(&["#lobby", "#dev", "#admin"], "").await;
    server.expect_joins(&["#lobby", "#dev", "#admin"]).await;

    server.privmsg("oona", "talebot", "!auth hunter2").await;
    server
        .recv_until(|l| l.contains("Authenticated admin"))
        .await;
    server.privmsg("oona", "#admin", "!stop #lobby").await;
    server.recv_until(|l| l.contains("stop talking")).await;

    // Neither the NAMES query nor the channel alert may fire.
    server
        .privmsg("bob", "#lobby", "tell abcd1234 to check #dev")
        .await;
    server.assert_silent(QUIET).await;

    bot.shutdown().await;
}
