// Outbound mpv IPC commands. Each command is a name, an optional numeric id,
// then trailing arguments, written to the socket as one line of JSON.

use serde::Serialize;
use serde_json::Value;

/// Subscription id used for `percent-pos` property-change events.
pub const PERCENT_POS_ID: i64 = 1;
/// Subscription id used for `time-remaining` property-change events.
pub const TIME_REMAINING_ID: i64 = 2;

/// Relative seek step for the up/down bindings, in seconds.
pub const SEEK_STEP_SECS: i64 = 5;

/// A single instruction for the player, built fresh per send.
///
/// The numeric id is an explicit `Option` so that a zero id can still be sent
/// when a caller asks for one; it is never used as an "absent" marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCommand {
    name: String,
    numeric: Option<i64>,
    args: Vec<Value>,
}

#[derive(Serialize)]
struct Envelope {
    command: Vec<Value>,
}

impl PlayerCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            numeric: None,
            args: Vec::new(),
        }
    }

    /// Place a numeric argument directly after the command name. Commands
    /// without one skip this call; `with_numeric(0)` sends a literal `0`.
    pub fn with_numeric(mut self, value: i64) -> Self {
        self.numeric = Some(value);
        self
    }

    /// Append a trailing argument. Order of calls is the order on the wire.
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn numeric(&self) -> Option<i64> {
        self.numeric
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn quit() -> Self {
        Self::new("quit")
    }

    /// `paused == false` resumes playback.
    pub fn set_pause(paused: bool) -> Self {
        Self::new("set_property").with_arg("pause").with_arg(paused)
    }

    pub fn set_fullscreen(full_screen: bool) -> Self {
        let value = if full_screen { "yes" } else { "no" };
        Self::new("set_property").with_arg("fullscreen").with_arg(value)
    }

    /// Relative seek by whole seconds; negative values seek backwards.
    pub fn seek(seconds: i64) -> Self {
        Self::new("seek").with_numeric(seconds)
    }

    pub fn frame_step() -> Self {
        Self::new("frame-step")
    }

    pub fn frame_back_step() -> Self {
        Self::new("frame-back-step")
    }

    /// Subscribe to string-formatted change notifications for `property`.
    /// Events for it come back tagged with `id`.
    pub fn observe_property_string(id: i64, property: &str) -> Self {
        Self::new("observe_property_string")
            .with_numeric(id)
            .with_arg(property)
    }

    /// Compact JSON envelope, without the trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut command = Vec::with_capacity(self.args.len() + 2);
        command.push(Value::String(self.name.clone()));
        if let Some(numeric) = self.numeric {
            command.push(Value::from(numeric));
        }
        command.extend(self.args.iter().cloned());
        serde_json::to_string(&Envelope { command })
    }

    /// Wire bytes: the JSON envelope followed by exactly one newline.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = self.to_json()?.into_bytes();
        bytes.push(b'\n');
        Ok(bytes)
    }
}
