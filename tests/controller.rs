// App dispatch: commands produced by an update reach the control channel in
// order, and write or player failures end the session.

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream};

use vbs::app::{App, ControllerError, Phase, Session};
use vbs::config::Config;
use vbs::message::Message;
use vbs::player::ipc::CommandWriter;
use vbs::player::PlayerError;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn new_app() -> App {
    let session = Session::new(PathBuf::from("/media/show.mp4"), "ep", 0, 20);
    App::new(Config::default(), session)
}

/// Attach a duplex-backed writer and return the player's side of it.
async fn attach(app: &mut App) -> DuplexStream {
    let (client, server) = tokio::io::duplex(4096);
    let (_, write_half) = tokio::io::split(client);
    app.dispatch(Message::ChannelAttached(CommandWriter::new(Box::new(write_half))))
        .await
        .expect("attach");
    server
}

fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

async fn next_line<R>(lines: &mut tokio::io::Lines<R>) -> String
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timed out waiting for a command")
        .expect("read failed")
        .expect("channel closed")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_attach_writes_observe_commands() {
    let mut app = new_app();
    let server = attach(&mut app).await;
    let mut lines = BufReader::new(server).lines();

    assert_eq!(
        next_line(&mut lines).await,
        r#"{"command":["observe_property_string",1,"percent-pos"]}"#
    );
    assert_eq!(
        next_line(&mut lines).await,
        r#"{"command":["observe_property_string",2,"time-remaining"]}"#
    );
    assert_eq!(app.session().phase(), Phase::Active);
}

#[tokio::test]
async fn test_key_presses_reach_the_channel_in_order() {
    let mut app = new_app();
    let server = attach(&mut app).await;
    let mut lines = BufReader::new(server).lines();
    next_line(&mut lines).await;
    next_line(&mut lines).await;

    app.dispatch(key(KeyCode::Char(' '))).await.unwrap();
    app.dispatch(key(KeyCode::Up)).await.unwrap();
    app.dispatch(key(KeyCode::Char('q'))).await.unwrap();

    assert_eq!(
        next_line(&mut lines).await,
        r#"{"command":["set_property","pause",false]}"#
    );
    assert_eq!(next_line(&mut lines).await, r#"{"command":["seek",5]}"#);
    assert_eq!(next_line(&mut lines).await, r#"{"command":["quit"]}"#);
    assert_eq!(app.session().phase(), Phase::Quitting);

    app.dispatch(Message::PlayerExited(Ok(()))).await.unwrap();
    assert!(app.session().is_terminated());
}

#[tokio::test]
async fn test_write_failure_is_fatal() {
    let mut app = new_app();
    let server = attach(&mut app).await;
    drop(server);

    let result = app.dispatch(key(KeyCode::Char('f'))).await;
    assert!(matches!(result, Err(ControllerError::Write(_))));
    assert!(app.session().is_terminated());
}

#[tokio::test]
async fn test_abnormal_player_exit_is_reported() {
    let mut app = new_app();
    let err = PlayerError::Wait(std::io::Error::new(std::io::ErrorKind::Other, "gone"));

    let result = app.dispatch(Message::PlayerExited(Err(err))).await;
    assert!(matches!(
        result,
        Err(ControllerError::Player(PlayerError::Wait(_)))
    ));
    assert!(app.session().is_terminated());
}

#[tokio::test]
async fn test_commands_without_channel_are_dropped() {
    let mut app = new_app();
    // Quit from Connecting needs no channel.
    app.dispatch(key(KeyCode::Esc)).await.unwrap();
    assert!(app.session().is_terminated());
}

#[tokio::test]
async fn test_local_messages_need_no_channel() {
    let mut app = new_app();
    app.dispatch(Message::Tick).await.unwrap();
    app.dispatch(Message::Tick).await.unwrap();
    app.dispatch(Message::ConnectFailed("refused".to_string())).await.unwrap();

    assert_eq!(app.session().frame_count(), 2);
    assert_eq!(app.session().connect_error(), Some("refused"));
}

#[tokio::test]
async fn test_close_shuts_the_write_half() {
    let mut app = new_app();
    let server = attach(&mut app).await;
    let mut lines = BufReader::new(server).lines();
    next_line(&mut lines).await;
    next_line(&mut lines).await;

    app.close().await;
    app.close().await;
    let eof = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timed out waiting for shutdown")
        .unwrap();
    assert_eq!(eof, None);
}
