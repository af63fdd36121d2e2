// Central coordinator: owns the session state and the write half of the mpv
// control channel. Runs the event loop (message → update → write → draw).

mod event_log;
mod input;
mod session;

pub use event_log::{EventLog, DEFAULT_CAPACITY as DEFAULT_EVENT_LOG_CAPACITY};
pub use input::{KeyAction, FULL_HELP, SHORT_HELP};
pub use session::{Phase, Session};

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::chapters::Chapter;
use crate::config::Config;
use crate::message::Message;
use crate::player::command::PlayerCommand;
use crate::player::ipc::{self, CommandWriter, IpcEndpoint};
use crate::player::{self, Launch, PlayerError};
use crate::theme::Theme;
use crate::tui::Tui;
use crate::ui;

/// Why a session ended other than by a clean quit.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("could not send command to mpv")]
    Write(#[source] std::io::Error),
    #[error(transparent)]
    Player(#[from] PlayerError),
}

/// Single consumer of the message queue. Owns all UI state; nothing else
/// mutates it.
pub struct App {
    session: Session,
    writer: Option<CommandWriter>,
    message_tx: mpsc::UnboundedSender<Message>,
    message_rx: mpsc::UnboundedReceiver<Message>,
    config: Config,
    theme: Theme,
}

impl App {
    pub fn new(config: Config, session: Session) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let theme = Theme::from_name(&config.general.theme);
        Self {
            session,
            writer: None,
            message_tx,
            message_rx,
            config,
            theme,
        }
    }

    /// A producer handle for the inbound queue.
    pub fn sender(&self) -> mpsc::UnboundedSender<Message> {
        self.message_tx.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut tui = Tui::new(self.config.general.tick_rate)?;
        tui.enter(self.sender())?;

        let result = self.event_loop(&mut tui).await;

        tui.exit()?;
        result
    }

    async fn event_loop(&mut self, tui: &mut Tui) -> anyhow::Result<()> {
        tui.draw(|frame| ui::draw(frame, &self.session, &self.theme))?;

        while !self.session.is_terminated() {
            let Some(message) = self.message_rx.recv().await else {
                break;
            };
            let outcome = self.dispatch(message).await;
            tui.draw(|frame| ui::draw(frame, &self.session, &self.theme))?;
            outcome?;
        }
        Ok(())
    }

    /// Run one update step and write whatever it produced to the player.
    pub async fn dispatch(&mut self, message: Message) -> Result<(), ControllerError> {
        let commands = self.session.update(&message);

        let failure = match message {
            Message::ChannelAttached(writer) => {
                self.writer = Some(writer);
                None
            }
            Message::PlayerExited(Err(err)) => Some(err),
            _ => None,
        };

        for command in &commands {
            self.write(command).await?;
        }

        match failure {
            Some(err) => Err(ControllerError::Player(err)),
            None => Ok(()),
        }
    }

    async fn write(&mut self, command: &PlayerCommand) -> Result<(), ControllerError> {
        let Some(writer) = self.writer.as_mut() else {
            tracing::warn!(command = command.name(), "no control channel, dropping command");
            return Ok(());
        };

        if let Err(err) = writer.send(command).await {
            tracing::error!(error = %err, command = command.name(), "could not send command to mpv");
            self.session.fail_write(&err);
            return Err(ControllerError::Write(err));
        }
        Ok(())
    }

    /// Close the write half of the control channel.
    pub async fn close(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            writer.close().await;
        }
    }
}

/// Play one media file under interactive control until the user quits or the
/// session fails.
pub async fn play(config: Config, media_path: PathBuf, segment: Option<Chapter>) -> anyhow::Result<()> {
    let endpoint = IpcEndpoint::mint()?;
    tracing::info!(endpoint = endpoint.name(), "minted IPC endpoint");

    let session = Session::new(
        media_path.clone(),
        endpoint.name(),
        config.player.output_screen,
        config.diagnostics.event_log_capacity,
    );
    let launch = Launch {
        executable: config.player.executable.clone(),
        output_screen: config.player.output_screen,
        endpoint_name: endpoint.name().to_string(),
        media_path,
        segment,
    };
    let connect_interval = config.ipc.connect_interval();
    let connect_attempts = config.ipc.connect_attempts;

    let mut app = App::new(config, session);
    let supervisor = player::spawn_supervisor(launch, app.sender());
    let connector = ipc::spawn_connector(
        endpoint.name().to_string(),
        connect_interval,
        connect_attempts,
        app.sender(),
    );

    let result = app.run().await;

    connector.abort();
    app.close().await;
    if !supervisor.is_finished() {
        tracing::info!("stopping player");
        supervisor.abort();
    }
    let _ = supervisor.await;
    drop(endpoint);

    result
}
