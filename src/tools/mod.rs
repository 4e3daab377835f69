/*!
 * External tool collaborators.
 *
 * The conversion core never touches the network or audio data. These traits
 * are the narrow seams through which the workflows reach third-party tools:
 * - `SubtitleSource`: video metadata, subtitle listing and download (yt-dlp)
 * - `AudioTranscoder`: audio extraction to MP3 (ffmpeg)
 * - `LyricsTagWriter`: embedding lyrics into an MP3 (ID3 `USLT` frame)
 */

use async_trait::async_trait;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::errors::ToolError;
use crate::lrc::TimeWindow;
use crate::subtitle_processor::SubtitleFormat;

pub mod ffmpeg;
pub mod id3_tag;
pub mod yt_dlp;

pub use ffmpeg::Ffmpeg;
pub use id3_tag::Id3LyricsWriter;
pub use yt_dlp::YtDlp;

/// Identity of a remote video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
}

/// Subtitle languages offered for a video, code -> display name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleListing {
    /// Uploaded subtitles
    pub manual: BTreeMap<String, String>,
    /// Automatically generated captions
    pub automatic: BTreeMap<String, String>,
}

/// A chosen subtitle track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub language: String,
    pub automatic: bool,
}

impl SubtitleListing {
    pub fn is_empty(&self) -> bool {
        self.manual.is_empty() && self.automatic.is_empty()
    }

    /// Pick a track for `language`, preferring uploaded subtitles over
    /// automatic captions.
    pub fn select(&self, language: &str) -> Result<SubtitleTrack, ToolError> {
        if self.manual.contains_key(language) {
            return Ok(SubtitleTrack {
                language: language.to_string(),
                automatic: false,
            });
        }
        if self.automatic.contains_key(language) {
            return Ok(SubtitleTrack {
                language: language.to_string(),
                automatic: true,
            });
        }

        let available: BTreeSet<&str> = self
            .manual
            .keys()
            .chain(self.automatic.keys())
            .map(String::as_str)
            .collect();

        Err(ToolError::LanguageUnavailable {
            language: language.to_string(),
            available: if available.is_empty() {
                "none".to_string()
            } else {
                available.into_iter().collect::<Vec<_>>().join(", ")
            },
        })
    }
}

/// What to download for a video
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub track: SubtitleTrack,
    /// Directory receiving the audio and subtitle files
    pub output_dir: PathBuf,
    /// File stem shared by the downloaded files
    pub base_name: String,
    /// Restrict the audio download to this section
    pub section: Option<TimeWindow>,
}

/// Files produced by a download
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedMedia {
    pub audio: PathBuf,
    pub subtitle: PathBuf,
    pub format: SubtitleFormat,
}

/// Source of remote videos and their subtitle tracks
#[async_trait]
pub trait SubtitleSource: Send + Sync + Debug {
    /// Fetch the id and title of a video
    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, ToolError>;

    /// List the subtitle languages offered for a video
    async fn list_subtitles(&self, url: &str) -> Result<SubtitleListing, ToolError>;

    /// Download the audio and the requested subtitle track
    async fn fetch_subtitle_track(
        &self,
        url: &str,
        request: &DownloadRequest,
    ) -> Result<DownloadedMedia, ToolError>;
}

/// Converts any audio or video file into an MP3
#[async_trait]
pub trait AudioTranscoder: Send + Sync + Debug {
    async fn transcode_audio(&self, source: &Path, dest: &Path) -> Result<(), ToolError>;
}

/// Embeds lyrics text into an audio file's metadata
#[async_trait]
pub trait LyricsTagWriter: Send + Sync + Debug {
    async fn write_lyrics_tag(&self, audio: &Path, lrc_text: &str) -> Result<(), ToolError>;
}

/// Captured output of a finished tool
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Both streams; some tools print listings to stderr
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Runs one external program with a timeout
#[derive(Debug, Clone)]
pub struct ToolRunner {
    program: String,
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the program to completion, failing on a non-zero exit status
    pub async fn run<S: AsRef<std::ffi::OsStr> + Debug>(&self, args: &[S]) -> Result<ToolOutput, ToolError> {
        let (status, out) = self.run_unchecked(args).await?;
        match status {
            Some(0) => Ok(out),
            status => Err(ToolError::CommandFailed {
                program: self.program.clone(),
                status: status.unwrap_or(-1),
                stderr: out.stderr.trim().to_string(),
            }),
        }
    }

    /// Run the program to completion and return its exit code and output
    pub async fn run_unchecked<S: AsRef<std::ffi::OsStr> + Debug>(
        &self,
        args: &[S],
    ) -> Result<(Option<i32>, ToolOutput), ToolError> {
        debug!("Executing: {} {:?}", self.program, args);

        let mut command = Command::new(&self.program);
        command.args(args).kill_on_drop(true);
        let future = command.output();

        let output = tokio::select! {
            result = future => {
                result.map_err(|e| spawn_error(&self.program, e))?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ToolError::Timeout {
                    program: self.program.clone(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        Ok((
            output.status.code(),
            ToolOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
        ))
    }
}

// @maps: Spawn failure, keeping a missing executable apart from other launch errors
fn spawn_error(program: &str, error: std::io::Error) -> ToolError {
    match error.kind() {
        std::io::ErrorKind::NotFound => ToolError::NotFound {
            program: program.to_string(),
            message: error.to_string(),
        },
        _ => ToolError::LaunchFailed {
            program: program.to_string(),
            message: error.to_string(),
        },
    }
}
