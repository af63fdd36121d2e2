// Chapter metadata from ffprobe. Used to list a container's chapters, to
// restrict playback to a single one, and to copy each chapter into its own
// file with ffmpeg.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use anyhow::Context;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;

/// Chapters as reported by `ffprobe -show_chapters`, in container order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterList {
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    /// Seconds, as the decimal string ffprobe prints (e.g. `"6.006000"`).
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub tags: ChapterTags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterTags {
    #[serde(default)]
    pub title: String,
}

impl Chapter {
    /// Title with surrounding whitespace (including stray `\r`) removed.
    pub fn title(&self) -> &str {
        self.tags.title.trim()
    }

    /// `NNN_<title>.<ext>`, with the title made safe for the filesystem.
    pub fn file_name(&self, extension: Option<&str>) -> String {
        let title = sanitize_filename::sanitize(self.title());
        let mut name = format!("{:03}_{}", self.id, title);
        if let Some(ext) = extension.filter(|e| !e.is_empty()) {
            name.push('.');
            name.push_str(ext);
        }
        name
    }

    /// ffmpeg arguments for a stream copy of this chapter from `source` into
    /// `output`, keeping the source timestamps.
    pub fn copy_args(&self, source: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-loglevel", "error", "-ss"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(self.start_time.clone().into());
        args.push("-i".into());
        args.push(source.as_os_str().to_owned());
        args.push("-to".into());
        args.push(self.end_time.clone().into());
        args.extend(
            ["-c", "copy", "-copyts", "-y", "-avoid_negative_ts", "1"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }
}

/// Why one chapter could not be copied.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("could not run ffmpeg: {0}")]
    Spawn(#[source] io::Error),
    #[error("ffmpeg exited with {status}: {output}")]
    Failed { status: ExitStatus, output: String },
}

/// Result of copying a single chapter.
#[derive(Debug)]
pub struct ChapterCopy {
    pub chapter_id: i64,
    pub output: PathBuf,
    pub result: Result<(), CopyError>,
}

/// Output directory for a split: `split_<file stem>` under `parent`.
pub fn split_dir(parent: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parent.join(format!("split_{}", stem))
}

impl ChapterList {
    pub fn parse(json: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(json)
    }

    /// Run ffprobe against `path` and decode its chapter listing.
    pub async fn probe(path: &Path) -> anyhow::Result<Self> {
        let output = Command::new("ffprobe")
            .args(["-print_format", "json", "-loglevel", "error", "-show_chapters", "-i"])
            .arg(path)
            .output()
            .await
            .context("could not run ffprobe")?;

        if !output.status.success() {
            anyhow::bail!(
                "could not probe chapters: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Self::parse(&output.stdout).context("failed decoding ffprobe response")
    }

    /// Copy every chapter of `source` into `target_dir`, running one `ffmpeg`
    /// per chapter concurrently. A failed chapter is logged and reported in
    /// its [`ChapterCopy`]; the others still run.
    pub async fn split(
        &self,
        ffmpeg: &Path,
        source: &Path,
        target_dir: &Path,
    ) -> anyhow::Result<Vec<ChapterCopy>> {
        std::fs::create_dir_all(target_dir).with_context(|| {
            format!("could not create output directory {}", target_dir.display())
        })?;

        let extension = source.extension().map(|e| e.to_string_lossy().into_owned());
        let copies = self.chapters.iter().map(|chapter| {
            let output = target_dir.join(chapter.file_name(extension.as_deref()));
            async move {
                let result = copy_chapter(ffmpeg, chapter, source, &output).await;
                match &result {
                    Ok(()) => {
                        tracing::info!(chapter = chapter.id, output = %output.display(), "copied chapter")
                    }
                    Err(err) => tracing::error!(
                        chapter = chapter.id,
                        output = %output.display(),
                        error = %err,
                        "could not copy chapter"
                    ),
                }
                ChapterCopy {
                    chapter_id: chapter.id,
                    output,
                    result,
                }
            }
        });

        Ok(join_all(copies).await)
    }

    pub fn find(&self, id: i64) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

async fn copy_chapter(
    ffmpeg: &Path,
    chapter: &Chapter,
    source: &Path,
    output: &Path,
) -> Result<(), CopyError> {
    let result = Command::new(ffmpeg)
        .args(chapter.copy_args(source, output))
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(CopyError::Spawn)?;

    if result.status.success() {
        return Ok(());
    }
    let mut combined = String::from_utf8_lossy(&result.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&result.stderr));
    Err(CopyError::Failed {
        status: result.status,
        output: combined.trim().to_string(),
    })
}
