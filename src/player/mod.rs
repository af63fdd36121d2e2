// src/player/mod.rs

pub mod command;
pub mod event;
pub mod ipc;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::chapters::Chapter;
use crate::message::Message;

/// Ways the player process can end a session.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("could not start {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },
    #[error("lost track of the player process: {0}")]
    Wait(#[source] std::io::Error),
    /// Carries everything the player printed, untruncated.
    #[error("player exited with {status}\n\nstdout: {stdout}\nstderr: {stderr}\n")]
    AbnormalExit {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
}

/// Everything needed to start one mpv process for a session.
#[derive(Debug, Clone)]
pub struct Launch {
    pub executable: String,
    /// Display index passed to `--fs-screen`.
    pub output_screen: u8,
    pub endpoint_name: String,
    pub media_path: PathBuf,
    /// Restrict playback to a single chapter.
    pub segment: Option<Chapter>,
}

impl Launch {
    /// Full argument list: the fixed presentation flags, the IPC server
    /// binding, an optional chapter window, then the media path.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--pause",
            "--keep-open=always",
            "--keepaspect-window=no",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(format!("--fs-screen={}", self.output_screen).into());
        args.extend(
            [
                "--autofit=30%",
                "--no-osc",
                "--no-osd-bar",
                "--osd-on-seek=no",
                "--profile=low-latency",
                "--no-terminal",
                "--no-input-terminal",
                "--no-input-builtin-bindings",
                "--input-media-keys=no",
                "--no-input-cursor",
                "--cursor-autohide=always",
                "--ontop",
                "--no-focus-on-open",
                "--no-border",
                "--image-display-duration=5",
                "--no-resume-playback",
                "--force-window=yes",
                "--idle=yes",
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(format!("--input-ipc-server={}", self.endpoint_name).into());
        if let Some(chapter) = &self.segment {
            args.push(format!("--start={}", chapter.start_time).into());
            args.push(format!("--end={}", chapter.end_time).into());
        }
        args.push(self.media_path.clone().into_os_string());
        args
    }

    /// Run mpv to completion, capturing stdout and stderr in full.
    ///
    /// The child is killed if this future is dropped before it exits.
    pub async fn run(self) -> Result<(), PlayerError> {
        tracing::info!(
            executable = %self.executable,
            media = %self.media_path.display(),
            endpoint = %self.endpoint_name,
            "starting player"
        );
        let child = Command::new(&self.executable)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PlayerError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;

        let output = child.wait_with_output().await.map_err(PlayerError::Wait)?;
        if output.status.success() {
            tracing::info!("player exited cleanly");
            return Ok(());
        }

        Err(PlayerError::AbnormalExit {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run the player in the background and report its exit as
/// [`Message::PlayerExited`]. Aborting the handle kills the player.
pub fn spawn_supervisor(launch: Launch, tx: mpsc::UnboundedSender<Message>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = launch.run().await;
        if let Err(ref err) = result {
            tracing::error!(error = %err, "player ended abnormally");
        }
        tx.send(Message::PlayerExited(result)).ok();
    })
}
