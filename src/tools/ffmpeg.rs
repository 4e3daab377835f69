/*!
 * ffmpeg backed audio transcoding.
 */

use async_trait::async_trait;
use log::{error, info};
use std::ffi::OsString;
use std::path::Path;

use super::{AudioTranscoder, ToolRunner};
use crate::app_config::ToolsConfig;
use crate::errors::ToolError;

/// Audio processing through the ffmpeg executable
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    runner: ToolRunner,
}

impl Ffmpeg {
    pub fn new(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            runner: ToolRunner::new(program, timeout_secs),
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.ffmpeg_path.clone(), config.timeout_secs)
    }

    /// Arguments for extracting audio into a 192k / 44.1kHz MP3
    pub fn transcode_args(source: &Path, dest: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), source.into()];
        args.extend(
            ["-vn", "-acodec", "mp3", "-ab", "192k", "-ar", "44100"]
                .iter()
                .map(OsString::from),
        );
        args.push(dest.into());
        args
    }

    // @maps: Failure with ffmpeg's banner noise stripped from stderr
    fn filtered(error: ToolError) -> ToolError {
        match error {
            ToolError::CommandFailed { program, status, stderr } => ToolError::CommandFailed {
                program,
                status,
                stderr: filter_ffmpeg_stderr(&stderr),
            },
            other => other,
        }
    }
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

#[async_trait]
impl AudioTranscoder for Ffmpeg {
    async fn transcode_audio(&self, source: &Path, dest: &Path) -> Result<(), ToolError> {
        info!("Converting {} to MP3...", source.display());

        let result = self
            .runner
            .run(Self::transcode_args(source, dest).as_slice())
            .await;

        if let Err(e) = result {
            error!("Conversion failed: {}", e);
            // Never leave a truncated MP3 behind
            if dest.exists() {
                let _ = std::fs::remove_file(dest);
            }
            return Err(Self::filtered(e));
        }

        if !dest.is_file() {
            return Err(ToolError::MissingOutput(dest.display().to_string()));
        }
        Ok(())
    }
}
