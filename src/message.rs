// Everything the controller reacts to arrives as a Message on one queue:
// terminal input, liveness ticks, connection progress, player events, and the
// player's exit.

use crossterm::event::KeyEvent;

use crate::player::event::PlayerEvent;
use crate::player::ipc::CommandWriter;
use crate::player::PlayerError;

/// Inbound messages for the [`App`](crate::app::App) event loop. Producers
/// only ever push; each message drives exactly one update-then-render cycle.
#[derive(Debug)]
pub enum Message {
    Key(KeyEvent),
    /// The terminal changed size; the next draw picks it up.
    Resize,
    Tick,

    /// The control channel is open; the reader half is already being read.
    ChannelAttached(CommandWriter),
    /// The connect-retry budget ran out.
    ConnectFailed(String),

    Event(PlayerEvent),
    /// The event reader hit a read error and stopped.
    ReaderClosed(String),

    /// The player process ended. After a quit request this is the
    /// acknowledgment the controller waits for.
    PlayerExited(Result<(), PlayerError>),
}
