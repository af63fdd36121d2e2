// Low-level mpv IPC: endpoint naming, the platform transport (unix socket or
// named pipe), the command writer, and the background connect-retry task.

use std::fmt;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::command::PlayerCommand;
use super::event::read_events;
use crate::message::Message;

const ENDPOINT_PREFIX: &str = "vbs-player";

pub type ChannelReader = Box<dyn AsyncRead + Send + Unpin>;
pub type ChannelWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// An open duplex stream to the player, already split into its two halves.
pub struct Channel {
    pub reader: ChannelReader,
    pub writer: ChannelWriter,
}

/// A process-unique IPC endpoint name. On unix the socket file is removed
/// when this is dropped.
#[derive(Debug)]
pub struct IpcEndpoint {
    name: String,
}

impl IpcEndpoint {
    /// Mint a fresh endpoint name that is not currently in use.
    pub fn mint() -> io::Result<Self> {
        let reserved = tempfile::Builder::new()
            .prefix(ENDPOINT_PREFIX)
            .tempfile()?;
        let path = reserved.path().to_path_buf();
        reserved.close()?;
        Ok(Self {
            name: platform::endpoint_name(&path),
        })
    }

    /// Use an explicit endpoint name.
    pub fn at(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for IpcEndpoint {
    fn drop(&mut self) {
        platform::remove(&self.name);
    }
}

#[cfg(unix)]
mod platform {
    use std::io;
    use std::path::Path;

    use tokio::net::UnixStream;

    use super::Channel;

    pub fn endpoint_name(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    pub async fn open(name: &str) -> io::Result<Channel> {
        let stream = UnixStream::connect(name).await?;
        let (reader, writer) = stream.into_split();
        Ok(Channel {
            reader: Box::new(reader),
            writer: Box::new(writer),
        })
    }

    pub fn remove(name: &str) {
        let _ = std::fs::remove_file(name);
    }
}

#[cfg(windows)]
mod platform {
    use std::io;
    use std::path::Path;

    use tokio::net::windows::named_pipe::ClientOptions;

    use super::{Channel, ENDPOINT_PREFIX};

    pub fn endpoint_name(path: &Path) -> String {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ENDPOINT_PREFIX.to_string());
        format!(r"\\.\pipe\{}", file_name)
    }

    pub async fn open(name: &str) -> io::Result<Channel> {
        let client = ClientOptions::new().open(name)?;
        let (reader, writer) = tokio::io::split(client);
        Ok(Channel {
            reader: Box::new(reader),
            writer: Box::new(writer),
        })
    }

    // Pipes vanish with the server.
    pub fn remove(_name: &str) {}
}

/// Single connection attempt. Fails while mpv has not created the endpoint yet.
pub async fn connect(name: &str) -> io::Result<Channel> {
    platform::open(name).await
}

/// Try to connect up to `attempts` times, sleeping `interval` between tries.
pub async fn connect_with_retry(
    name: &str,
    interval: Duration,
    attempts: u32,
) -> io::Result<Channel> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match connect(name).await {
            Ok(channel) => {
                tracing::debug!(attempt, endpoint = name, "connected to mpv IPC endpoint");
                return Ok(channel);
            }
            Err(err) if attempt >= attempts => {
                tracing::warn!(attempts, endpoint = name, error = %err, "giving up on mpv IPC endpoint");
                return Err(err);
            }
            Err(_) => {
                attempt += 1;
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Write half of the control channel. Owned by the controller; the only
/// writer on the channel.
pub struct CommandWriter {
    inner: Option<ChannelWriter>,
}

impl CommandWriter {
    pub fn new(writer: ChannelWriter) -> Self {
        Self {
            inner: Some(writer),
        }
    }

    /// Encode `command` and write it fully, flushing before returning.
    pub async fn send(&mut self, command: &PlayerCommand) -> io::Result<()> {
        let Some(writer) = self.inner.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "control channel already closed",
            ));
        };
        let bytes = command.encode()?;
        writer.write_all(&bytes).await?;
        writer.flush().await
    }

    /// Shut down the write half. Calling this more than once is a no-op.
    pub async fn close(&mut self) {
        if let Some(mut writer) = self.inner.take() {
            let _ = writer.shutdown().await;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl fmt::Debug for CommandWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandWriter")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Connect in the background. On success the writer is delivered as
/// [`Message::ChannelAttached`] and an event reader is started on the read
/// half; on exhaustion a [`Message::ConnectFailed`] is sent instead.
pub fn spawn_connector(
    name: String,
    interval: Duration,
    attempts: u32,
    tx: mpsc::UnboundedSender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match connect_with_retry(&name, interval, attempts).await {
            Ok(Channel { reader, writer }) => {
                if tx
                    .send(Message::ChannelAttached(CommandWriter::new(writer)))
                    .is_err()
                {
                    return;
                }
                tokio::spawn(read_events(reader, tx));
            }
            Err(err) => {
                tx.send(Message::ConnectFailed(err.to_string())).ok();
            }
        }
    })
}
