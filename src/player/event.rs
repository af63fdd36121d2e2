// Inbound mpv IPC traffic: decoding of property-change records and the
// background reader that turns socket reads into controller messages.

use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

use crate::message::Message;

const READ_BUFFER_SIZE: usize = 4096;

/// One line received from the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A notification for a property subscribed with `observe_property_string`.
    PropertyChange {
        id: i64,
        name: String,
        /// `None` when mpv reports the property as unavailable.
        data: Option<String>,
        raw: String,
    },
    /// Anything else: command replies, other events, partial lines.
    Diagnostic(String),
}

#[derive(Deserialize)]
struct PropertyChangeRecord {
    event: String,
    id: i64,
    name: String,
    #[serde(default)]
    data: Option<String>,
}

impl PlayerEvent {
    /// Decode a line, keeping it verbatim as a diagnostic when it does not
    /// match the property-change shape.
    pub fn decode(line: &str) -> Self {
        match serde_json::from_str::<PropertyChangeRecord>(line) {
            Ok(record) if record.event == "property-change" => PlayerEvent::PropertyChange {
                id: record.id,
                name: record.name,
                data: record.data,
                raw: line.to_string(),
            },
            _ => PlayerEvent::Diagnostic(line.to_string()),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            PlayerEvent::PropertyChange { raw, .. } => raw,
            PlayerEvent::Diagnostic(raw) => raw,
        }
    }
}

/// Read from the control channel until it closes, sending one
/// [`Message::Event`] per successful read.
///
/// Only the first line of each read is forwarded. When mpv coalesces several
/// events into one write, the later ones are dropped.
pub async fn read_events<R>(mut reader: R, tx: mpsc::UnboundedSender<Message>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!("mpv IPC channel closed by peer");
                break;
            }
            Ok(count) => {
                let chunk = String::from_utf8_lossy(&buf[..count]);
                let line = chunk.split('\n').next().unwrap_or_default();
                if tx.send(Message::Event(PlayerEvent::decode(line))).is_err() {
                    // controller is gone
                    break;
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "mpv IPC read ended");
                tx.send(Message::ReaderClosed(err.to_string())).ok();
                break;
            }
        }
    }
}
