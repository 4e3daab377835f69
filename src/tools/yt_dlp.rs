/*!
 * yt-dlp backed `SubtitleSource`.
 */

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

use super::{
    DownloadRequest, DownloadedMedia, SubtitleListing, SubtitleSource, ToolRunner, VideoMetadata,
};
use crate::app_config::ToolsConfig;
use crate::errors::ToolError;
use crate::subtitle_processor::SubtitleFormat;

// @const: `--list-subs` table row, "code  name  formats"
static LISTING_ROW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9._-]+)\s+(.+?)\s+(?:vtt|srt|ttml)").unwrap()
});

const MANUAL_SECTION_MARKER: &str = "Available subtitles for";
const AUTOMATIC_SECTION_MARKER: &str = "Available automatic captions for";

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListingSection {
    None,
    Manual,
    Automatic,
}

/// Parse the table printed by `yt-dlp --list-subs`
pub fn parse_subtitle_listing(output: &str) -> SubtitleListing {
    let mut listing = SubtitleListing::default();
    let mut section = ListingSection::None;

    for line in output.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if line.contains(MANUAL_SECTION_MARKER) {
            section = ListingSection::Manual;
            continue;
        }
        if line.contains(AUTOMATIC_SECTION_MARKER) {
            section = ListingSection::Automatic;
            continue;
        }

        if line.starts_with("---") {
            continue;
        }

        let Some(caps) = LISTING_ROW_REGEX.captures(line) else {
            continue;
        };
        let code = caps[1].to_string();
        let name = caps[2].trim().to_string();

        match section {
            ListingSection::Manual => {
                listing.manual.insert(code, name);
            }
            ListingSection::Automatic => {
                listing.automatic.insert(code, name);
            }
            ListingSection::None => {}
        }
    }

    listing
}

/// Command line for downloading MP3 audio plus one subtitle track
pub fn build_download_args(url: &str, request: &DownloadRequest) -> Vec<String> {
    let mut args: Vec<String> = ["-x", "--audio-format", "mp3"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    args.push(if request.track.automatic { "--write-auto-sub" } else { "--write-sub" }.to_string());
    args.extend([
        "--sub-lang".to_string(),
        request.track.language.clone(),
        "--sub-format".to_string(),
        "srt/vtt/best".to_string(),
    ]);

    if let Some(section) = &request.section {
        args.push("--download-sections".to_string());
        args.push(format!("*{}-{}", section.start(), section.end()));
    }

    let template = request.output_dir.join(format!("{}.%(ext)s", request.base_name));
    args.push("-o".to_string());
    args.push(template.to_string_lossy().into_owned());
    args.push(url.to_string());

    args
}

/// Video downloader driven through the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    runner: ToolRunner,
}

impl YtDlp {
    pub fn new(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            runner: ToolRunner::new(program, timeout_secs),
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.yt_dlp_path.clone(), config.timeout_secs)
    }

    // @locates: Subtitle file yt-dlp wrote for the request
    fn locate_subtitle(request: &DownloadRequest) -> Option<(PathBuf, SubtitleFormat)> {
        [SubtitleFormat::Srt, SubtitleFormat::Vtt]
            .into_iter()
            .map(|format| {
                let name = format!(
                    "{}.{}.{}",
                    request.base_name,
                    request.track.language,
                    format.extension()
                );
                (request.output_dir.join(name), format)
            })
            .find(|(path, _)| path.is_file())
    }
}

#[async_trait]
impl SubtitleSource for YtDlp {
    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, ToolError> {
        info!("Getting video metadata...");
        let output = self
            .runner
            .run(&["--no-warnings", "--print", "id", "--print", "title", url])
            .await?;

        let mut lines = output.stdout.lines().map(str::trim);
        match (lines.next(), lines.next()) {
            (Some(id), Some(title)) if !id.is_empty() => Ok(VideoMetadata {
                id: id.to_string(),
                title: title.to_string(),
            }),
            _ => Err(ToolError::MissingOutput(format!(
                "video id and title for {}",
                url
            ))),
        }
    }

    async fn list_subtitles(&self, url: &str) -> Result<SubtitleListing, ToolError> {
        info!("Querying available subtitles...");
        // yt-dlp may exit non-zero after printing a usable table
        let (status, output) = self.runner.run_unchecked(&["--list-subs", url]).await?;
        let combined = output.combined();

        if status != Some(0) && combined.trim().is_empty() {
            return Err(ToolError::CommandFailed {
                program: self.runner.program().to_string(),
                status: status.unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            });
        }

        let listing = parse_subtitle_listing(&combined);
        debug!(
            "Found {} manual and {} automatic subtitle languages",
            listing.manual.len(),
            listing.automatic.len()
        );
        Ok(listing)
    }

    async fn fetch_subtitle_track(
        &self,
        url: &str,
        request: &DownloadRequest,
    ) -> Result<DownloadedMedia, ToolError> {
        if let Some(section) = &request.section {
            info!("Will trim segment: {}", section);
        }
        let args = build_download_args(url, request);
        self.runner.run(args.as_slice()).await?;

        let audio = request.output_dir.join(format!("{}.mp3", request.base_name));
        if !audio.is_file() {
            return Err(ToolError::MissingOutput(audio.display().to_string()));
        }

        let (subtitle, format) = Self::locate_subtitle(request).ok_or_else(|| {
            ToolError::MissingOutput(format!(
                "{} subtitles for {}",
                request.track.language, request.base_name
            ))
        })?;

        Ok(DownloadedMedia {
            audio,
            subtitle,
            format,
        })
    }
}
