// Entry point: parses the command line, checks runtime deps (mpv, ffprobe, ffmpeg),
// loads config, and runs the requested command.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use vbs::chapters::{self, ChapterList};
use vbs::config::Config;
use vbs::{app, logging};

#[derive(Parser)]
#[command(name = "vbs", version, about = "video broadcasting stuff")]
struct Cli {
    /// Override config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print debug messages while working
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a video file fullscreen with mpv player.
    Play {
        file: PathBuf,
        /// Display to use for fullscreen output
        #[arg(long)]
        screen: Option<u8>,
        /// Only play the chapter with this id
        #[arg(long)]
        chapter: Option<i64>,
    },
    /// List chapters in a video container.
    Chapterlist { file: PathBuf },
    /// Split video file into separate files per chapter.
    Chaptersplit { file: PathBuf },
}

fn require(program: &str, hint: &str) -> anyhow::Result<PathBuf> {
    which::which(program).with_context(|| format!("could not find {}. {}", program, hint))
}

/// Absolute path to a media file that exists and can be read.
fn resolve_media(path: &Path) -> anyhow::Result<PathBuf> {
    let target = std::path::absolute(path)
        .with_context(|| format!("could not resolve {}", path.display()))?;
    std::fs::File::open(&target)
        .with_context(|| format!("could not access video {}", target.display()))?;
    Ok(target)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("could not read config {}", path.display()))?,
        None => Config::load().unwrap_or_default(),
    };
    let _log_guard = logging::init(cli.debug)?;

    match cli.command {
        Command::Play {
            file,
            screen,
            chapter,
        } => {
            require(&config.player.executable, "Please install mpv player.")?;
            let media = resolve_media(&file)?;
            if let Some(screen) = screen {
                config.player.output_screen = screen;
            }

            let segment = match chapter {
                Some(id) => {
                    require("ffprobe", "Please install ffmpeg and ffprobe.")?;
                    let chapters = ChapterList::probe(&media).await?;
                    let chapter = chapters
                        .find(id)
                        .cloned()
                        .with_context(|| format!("no chapter {} in {}", id, media.display()))?;
                    Some(chapter)
                }
                None => None,
            };

            app::play(config, media, segment).await?;
        }
        Command::Chapterlist { file } => {
            require("ffprobe", "Please install ffmpeg and ffprobe.")?;
            let media = resolve_media(&file)?;
            let chapters = ChapterList::probe(&media).await?;
            println!("{}", serde_json::to_string_pretty(&chapters)?);
        }
        Command::Chaptersplit { file } => {
            require("ffprobe", "Please install ffmpeg and ffprobe.")?;
            let ffmpeg = require("ffmpeg", "Please install ffmpeg.")?;
            let media = resolve_media(&file)?;
            let list = ChapterList::probe(&media).await?;
            if list.is_empty() {
                println!("{} has no chapters", media.display());
                return Ok(());
            }

            let target_dir = chapters::split_dir(Path::new("."), &media);
            tracing::info!(chapters = list.len(), dir = %target_dir.display(), "splitting chapters");
            for copy in list.split(&ffmpeg, &media, &target_dir).await? {
                match copy.result {
                    Ok(()) => println!("{}", copy.output.display()),
                    Err(err) => eprintln!("{}: {}", copy.output.display(), err),
                }
            }
        }
    }

    Ok(())
}
