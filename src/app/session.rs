// Session state and the update step. `update` is deterministic: it mutates
// state for one message and returns the commands to put on the wire, leaving
// all I/O to the caller.

use std::io;
use std::path::{Path, PathBuf};

use super::event_log::EventLog;
use super::input::KeyAction;
use crate::message::Message;
use crate::player::command::{PlayerCommand, PERCENT_POS_ID, SEEK_STEP_SECS, TIME_REMAINING_ID};
use crate::player::event::PlayerEvent;

const PERCENT_POS: &str = "percent-pos";
const TIME_REMAINING: &str = "time-remaining";

/// Controller lifecycle. Moves strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the control channel.
    Connecting,
    Active,
    /// `quit` was sent; waiting for the player to exit.
    Quitting,
    Terminated,
}

/// One play-out of one media file.
#[derive(Debug)]
pub struct Session {
    media_path: PathBuf,
    output_screen: u8,
    phase: Phase,
    quitting: bool,

    // Optimistic: flipped on key press, never confirmed by the player.
    playing: bool,
    full_screen: bool,

    percent_position: f64,
    seconds_remaining: Option<f64>,
    event_log: EventLog,
    response_count: u64,
    connect_error: Option<String>,

    show_help: bool,
    show_diagnostics: bool,
    frame_count: u64,
}

impl Session {
    pub fn new(
        media_path: PathBuf,
        endpoint_name: impl Into<String>,
        output_screen: u8,
        event_log_capacity: usize,
    ) -> Self {
        let mut event_log = EventLog::new(event_log_capacity);
        event_log.push(endpoint_name);
        Self {
            media_path,
            output_screen,
            phase: Phase::Connecting,
            quitting: false,
            playing: false,
            full_screen: false,
            percent_position: 0.0,
            seconds_remaining: None,
            event_log,
            response_count: 0,
            connect_error: None,
            show_help: false,
            show_diagnostics: false,
            frame_count: 0,
        }
    }

    /// Apply one message and return the commands it produces, in send order.
    pub fn update(&mut self, message: &Message) -> Vec<PlayerCommand> {
        if self.phase == Phase::Terminated {
            return Vec::new();
        }

        let commands = match message {
            Message::Key(key) => match KeyAction::from_key(*key) {
                Some(action) => self.handle_key_action(action),
                None => Vec::new(),
            },
            Message::Resize => Vec::new(),
            Message::Tick => {
                self.frame_count = self.frame_count.wrapping_add(1);
                Vec::new()
            }
            Message::ChannelAttached(_) => self.attach(),
            Message::ConnectFailed(reason) => {
                self.event_log
                    .push(format!("Could not connect to mpv: {}", reason));
                self.connect_error = Some(reason.clone());
                Vec::new()
            }
            Message::Event(event) => {
                self.reconcile(event);
                Vec::new()
            }
            Message::ReaderClosed(reason) => {
                self.event_log.push(format!("mpv IPC read ended: {}", reason));
                Vec::new()
            }
            Message::PlayerExited(result) => {
                match result {
                    Ok(()) => self.event_log.push("mpv exited"),
                    Err(err) => self.event_log.push(format!("mpv failed: {}", err)),
                }
                self.phase = Phase::Terminated;
                Vec::new()
            }
        };

        for command in &commands {
            if let Ok(line) = command.to_json() {
                self.event_log.push(line);
            }
        }
        commands
    }

    pub fn handle_key_action(&mut self, action: KeyAction) -> Vec<PlayerCommand> {
        match action {
            KeyAction::ToggleHelp => {
                self.show_help = !self.show_help;
                Vec::new()
            }
            KeyAction::ToggleDiagnostics => {
                self.show_diagnostics = !self.show_diagnostics;
                Vec::new()
            }
            KeyAction::Quit => self.begin_quit(),
            _ if self.phase != Phase::Active => {
                if self.phase == Phase::Connecting {
                    self.event_log
                        .push(format!("Not connected to mpv, ignoring {:?}", action));
                }
                Vec::new()
            }
            KeyAction::TogglePlay => {
                // mpv's pause flag is the opposite of the new playing state.
                let command = PlayerCommand::set_pause(self.playing);
                self.playing = !self.playing;
                vec![command]
            }
            KeyAction::ToggleFullscreen => {
                self.full_screen = !self.full_screen;
                vec![PlayerCommand::set_fullscreen(self.full_screen)]
            }
            KeyAction::SeekForward => vec![PlayerCommand::seek(SEEK_STEP_SECS)],
            KeyAction::SeekBackward => vec![PlayerCommand::seek(-SEEK_STEP_SECS)],
            // Frame stepping is discarded during playback.
            KeyAction::FrameBack if self.playing => Vec::new(),
            KeyAction::FrameForward if self.playing => Vec::new(),
            KeyAction::FrameBack => vec![PlayerCommand::frame_back_step()],
            KeyAction::FrameForward => vec![PlayerCommand::frame_step()],
        }
    }

    fn begin_quit(&mut self) -> Vec<PlayerCommand> {
        match self.phase {
            Phase::Connecting => {
                // Nothing to tell the player; teardown kills it.
                self.quitting = true;
                self.phase = Phase::Terminated;
                Vec::new()
            }
            Phase::Active => {
                self.quitting = true;
                self.phase = Phase::Quitting;
                vec![PlayerCommand::quit()]
            }
            Phase::Quitting | Phase::Terminated => Vec::new(),
        }
    }

    fn attach(&mut self) -> Vec<PlayerCommand> {
        if self.phase != Phase::Connecting {
            return Vec::new();
        }
        self.phase = Phase::Active;
        self.connect_error = None;
        self.event_log.push("Connected to mpv");
        vec![
            PlayerCommand::observe_property_string(PERCENT_POS_ID, PERCENT_POS),
            PlayerCommand::observe_property_string(TIME_REMAINING_ID, TIME_REMAINING),
        ]
    }

    fn reconcile(&mut self, event: &PlayerEvent) {
        self.response_count += 1;
        self.event_log.push(event.raw());

        let PlayerEvent::PropertyChange { id, name, data, .. } = event else {
            return;
        };

        match *id {
            PERCENT_POS_ID if name == PERCENT_POS => {
                if let Some(percent) = self.parse_property(name, data.as_deref()) {
                    self.percent_position = percent / 100.0;
                }
            }
            PERCENT_POS_ID => {
                self.event_log.push(format!("Bad data match {}", event.raw()));
            }
            TIME_REMAINING_ID => {
                if let Some(remaining) = self.parse_property(name, data.as_deref()) {
                    self.seconds_remaining = Some(remaining);
                }
            }
            _ => {}
        }
    }

    /// Parse a numeric property value, logging and discarding bad input.
    fn parse_property(&mut self, name: &str, data: Option<&str>) -> Option<f64> {
        // mpv reports unavailable properties as null.
        let data = data?;
        match data.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                tracing::warn!(property = name, value = data, "ignoring unparseable property value");
                self.event_log
                    .push(format!("Could not parse {} value {:?}", name, data));
                None
            }
        }
    }

    /// A write to the control channel failed; the player is presumed gone.
    pub fn fail_write(&mut self, err: &io::Error) {
        self.event_log
            .push(format!("Could not send command to mpv: {}", err));
        self.phase = Phase::Terminated;
    }

    pub fn media_path(&self) -> &Path {
        &self.media_path
    }

    pub fn output_screen(&self) -> u8 {
        self.output_screen
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Playback progress in `0.0..=1.0` as last reported.
    pub fn percent_position(&self) -> f64 {
        self.percent_position
    }

    pub fn seconds_remaining(&self) -> Option<f64> {
        self.seconds_remaining
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn response_count(&self) -> u64 {
        self.response_count
    }

    pub fn connect_error(&self) -> Option<&str> {
        self.connect_error.as_deref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn show_diagnostics(&self) -> bool {
        self.show_diagnostics
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
