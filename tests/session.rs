// Controller state machine: key mapping, optimistic state, event
// reconciliation, and lifecycle transitions.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;

use vbs::app::{EventLog, KeyAction, Phase, Session};
use vbs::message::Message;
use vbs::player::command::PlayerCommand;
use vbs::player::event::PlayerEvent;
use vbs::player::ipc::CommandWriter;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn new_session() -> Session {
    Session::new(PathBuf::from("/media/show.mp4"), "/tmp/vbs-player-test", 0, 20)
}

fn attached() -> Message {
    Message::ChannelAttached(CommandWriter::new(Box::new(tokio::io::sink())))
}

fn active_session() -> Session {
    let mut session = new_session();
    session.update(&attached());
    assert_eq!(session.phase(), Phase::Active);
    session
}

fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn property(id: i64, name: &str, data: &str) -> Message {
    let line = format!(
        r#"{{"event":"property-change","id":{},"name":"{}","data":"{}"}}"#,
        id, name, data
    );
    Message::Event(PlayerEvent::decode(&line))
}

// ── Connecting ───────────────────────────────────────────────────────────────

#[test]
fn test_new_session_starts_connecting_and_paused() {
    let session = new_session();
    assert_eq!(session.phase(), Phase::Connecting);
    assert!(!session.is_playing());
    assert!(!session.is_full_screen());
    assert!(!session.is_quitting());
    assert_eq!(session.percent_position(), 0.0);
    assert_eq!(session.seconds_remaining(), None);
    assert_eq!(session.response_count(), 0);
}

#[test]
fn test_attach_subscribes_to_progress_properties() {
    let mut session = new_session();
    let commands = session.update(&attached());
    assert_eq!(
        commands,
        vec![
            PlayerCommand::observe_property_string(1, "percent-pos"),
            PlayerCommand::observe_property_string(2, "time-remaining"),
        ]
    );
    assert_eq!(session.phase(), Phase::Active);
}

#[test]
fn test_second_attach_is_ignored() {
    let mut session = active_session();
    assert!(session.update(&attached()).is_empty());
}

#[test]
fn test_wire_keys_rejected_while_connecting() {
    let mut session = new_session();
    for code in [KeyCode::Char(' '), KeyCode::Char('f'), KeyCode::Up, KeyCode::Right] {
        assert!(session.update(&key(code)).is_empty());
    }
    assert!(!session.is_playing());
    assert!(!session.is_full_screen());
    assert_eq!(session.phase(), Phase::Connecting);
}

#[test]
fn test_connect_failure_keeps_connecting() {
    let mut session = new_session();
    session.update(&Message::ConnectFailed("No such file or directory".to_string()));
    assert_eq!(session.phase(), Phase::Connecting);
    assert_eq!(session.connect_error(), Some("No such file or directory"));
    assert!(session
        .event_log()
        .iter()
        .any(|e| e.contains("Could not connect to mpv")));
}

#[test]
fn test_quit_while_connecting_terminates_without_traffic() {
    let mut session = new_session();
    assert!(session.update(&key(KeyCode::Char('q'))).is_empty());
    assert_eq!(session.phase(), Phase::Terminated);
    assert!(session.is_quitting());
}

// ── Key bindings ─────────────────────────────────────────────────────────────

#[test]
fn test_toggle_play_twice_alternates_pause_payload() {
    let mut session = active_session();

    let first = session.update(&key(KeyCode::Char(' ')));
    assert!(session.is_playing());
    let second = session.update(&key(KeyCode::Enter));
    assert!(!session.is_playing());

    let sent: Vec<PlayerCommand> = first.into_iter().chain(second).collect();
    assert_eq!(sent.len(), 2);
    for cmd in &sent {
        assert_eq!(cmd.name(), "set_property");
        assert_eq!(cmd.args()[0], Value::from("pause"));
    }
    // Starting paused, the first press unpauses.
    assert_eq!(sent[0].args()[1], Value::Bool(false));
    assert_eq!(sent[1].args()[1], Value::Bool(true));
}

#[test]
fn test_fullscreen_toggle_sends_new_state() {
    let mut session = active_session();
    assert_eq!(
        session.update(&key(KeyCode::Char('f'))),
        vec![PlayerCommand::set_fullscreen(true)]
    );
    assert!(session.is_full_screen());
    assert_eq!(
        session.update(&key(KeyCode::Char('F'))),
        vec![PlayerCommand::set_fullscreen(false)]
    );
    assert!(!session.is_full_screen());
}

#[test]
fn test_up_down_seek_five_seconds() {
    let mut session = active_session();
    assert_eq!(session.update(&key(KeyCode::Up)), vec![PlayerCommand::seek(5)]);
    assert_eq!(session.update(&key(KeyCode::Down)), vec![PlayerCommand::seek(-5)]);
    assert_eq!(session.update(&key(KeyCode::Char('k'))), vec![PlayerCommand::seek(5)]);
    assert_eq!(session.update(&key(KeyCode::Char('j'))), vec![PlayerCommand::seek(-5)]);
}

#[test]
fn test_frame_step_only_while_paused() {
    let mut session = active_session();
    assert_eq!(
        session.update(&key(KeyCode::Left)),
        vec![PlayerCommand::frame_back_step()]
    );
    assert_eq!(
        session.update(&key(KeyCode::Right)),
        vec![PlayerCommand::frame_step()]
    );

    session.update(&key(KeyCode::Char(' ')));
    assert!(session.is_playing());
    assert!(session.update(&key(KeyCode::Left)).is_empty());
    assert!(session.update(&key(KeyCode::Right)).is_empty());
}

#[test]
fn test_help_and_debug_are_local_only() {
    let mut session = new_session();
    assert!(session.update(&key(KeyCode::Char('?'))).is_empty());
    assert!(session.show_help());
    assert!(session.update(&key(KeyCode::Char('d'))).is_empty());
    assert!(session.show_diagnostics());

    let mut session = active_session();
    assert!(session.update(&key(KeyCode::Char('?'))).is_empty());
    assert!(session.update(&key(KeyCode::Char('?'))).is_empty());
    assert!(!session.show_help());
}

#[test]
fn test_unbound_key_is_ignored() {
    let mut session = active_session();
    assert!(session.update(&key(KeyCode::Char('x'))).is_empty());
    assert_eq!(KeyAction::from_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)), None);
}

// ── Quitting ─────────────────────────────────────────────────────────────────

#[test]
fn test_quit_sends_quit_once_and_waits_for_exit() {
    let mut session = active_session();
    assert_eq!(session.update(&key(KeyCode::Char('q'))), vec![PlayerCommand::quit()]);
    assert_eq!(session.phase(), Phase::Quitting);
    assert!(session.is_quitting());

    // Further keys produce no traffic while draining.
    assert!(session.update(&key(KeyCode::Esc)).is_empty());
    assert!(session.update(&key(KeyCode::Char(' '))).is_empty());
    assert!(session.update(&key(KeyCode::Up)).is_empty());
    assert_eq!(session.phase(), Phase::Quitting);

    session.update(&Message::PlayerExited(Ok(())));
    assert_eq!(session.phase(), Phase::Terminated);
}

#[test]
fn test_ctrl_c_quits() {
    let mut session = active_session();
    let ctrl_c = Message::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert_eq!(session.update(&ctrl_c), vec![PlayerCommand::quit()]);
}

#[test]
fn test_player_exit_while_active_terminates() {
    let mut session = active_session();
    session.update(&Message::PlayerExited(Ok(())));
    assert_eq!(session.phase(), Phase::Terminated);
    assert!(session.update(&key(KeyCode::Char(' '))).is_empty());
}

#[test]
fn test_write_failure_terminates() {
    let mut session = active_session();
    let err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
    session.fail_write(&err);
    assert_eq!(session.phase(), Phase::Terminated);
    assert!(session.event_log().iter().any(|e| e.contains("broken pipe")));
}

// ── Event reconciliation ─────────────────────────────────────────────────────

#[test]
fn test_percent_position_is_scaled() {
    let mut session = active_session();
    session.update(&property(1, "percent-pos", "42.5"));
    assert!((session.percent_position() - 0.425).abs() < 1e-9);
    assert_eq!(session.response_count(), 1);
}

#[test]
fn test_bad_percent_keeps_prior_value() {
    let mut session = active_session();
    session.update(&property(1, "percent-pos", "50"));
    session.update(&property(1, "percent-pos", "not-a-number"));
    assert!((session.percent_position() - 0.5).abs() < 1e-9);
    assert_eq!(session.response_count(), 2);
    assert!(session
        .event_log()
        .iter()
        .any(|e| e.contains("Could not parse")));
}

#[test]
fn test_percent_id_with_other_name_is_flagged() {
    let mut session = active_session();
    session.update(&property(1, "volume", "80"));
    assert_eq!(session.percent_position(), 0.0);
    assert!(session.event_log().iter().any(|e| e.starts_with("Bad data match")));
}

#[test]
fn test_time_remaining_updates_seconds() {
    let mut session = active_session();
    session.update(&property(2, "time-remaining", "93.250000"));
    assert_eq!(session.seconds_remaining(), Some(93.25));
    session.update(&property(2, "time-remaining", "garbage"));
    assert_eq!(session.seconds_remaining(), Some(93.25));
}

#[test]
fn test_null_data_leaves_state_alone() {
    let mut session = active_session();
    let line = r#"{"event":"property-change","id":2,"name":"time-remaining","data":null}"#;
    session.update(&Message::Event(PlayerEvent::decode(line)));
    assert_eq!(session.seconds_remaining(), None);
    assert_eq!(session.response_count(), 1);
}

#[test]
fn test_opaque_events_only_reach_the_log() {
    let mut session = active_session();
    let line = r#"{"request_id":0,"error":"success"}"#;
    session.update(&Message::Event(PlayerEvent::decode(line)));
    assert_eq!(session.percent_position(), 0.0);
    assert_eq!(session.seconds_remaining(), None);
    assert_eq!(session.response_count(), 1);
    assert_eq!(session.event_log().iter().last(), Some(line));
}

#[test]
fn test_outbound_commands_are_logged() {
    let mut session = active_session();
    session.update(&key(KeyCode::Up));
    assert_eq!(
        session.event_log().iter().last(),
        Some(r#"{"command":["seek",5]}"#)
    );
}

#[test]
fn test_ticks_and_resizes_do_not_touch_the_player() {
    let mut session = active_session();
    assert!(session.update(&Message::Tick).is_empty());
    assert!(session.update(&Message::Resize).is_empty());
    assert_eq!(session.frame_count(), 1);
}

// ── Event log ────────────────────────────────────────────────────────────────

#[test]
fn test_event_log_evicts_oldest_first() {
    let mut log = EventLog::new(3);
    for entry in ["a", "b", "c", "d", "e"] {
        log.push(entry);
        assert!(log.len() <= log.capacity());
    }
    assert_eq!(log.iter().collect::<Vec<_>>(), vec!["c", "d", "e"]);
}

#[test]
fn test_event_log_with_zero_capacity_stays_empty() {
    let mut log = EventLog::new(0);
    log.push("dropped");
    assert!(log.is_empty());
}

#[test]
fn test_session_log_never_exceeds_capacity() {
    let mut session = Session::new(PathBuf::from("/media/show.mp4"), "ep", 0, 5);
    session.update(&attached());
    for i in 0..50 {
        session.update(&property(1, "percent-pos", &i.to_string()));
    }
    assert_eq!(session.event_log().len(), 5);
    assert_eq!(session.response_count(), 50);
}
