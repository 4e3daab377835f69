/*!
 * Mock tool implementations for testing
 *
 * These stand in for yt-dlp and ffmpeg so workflow tests never start an
 * external process. Each mock records its calls and writes placeholder files
 * where the real tool would.
 */

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sublrc::errors::ToolError;
use sublrc::subtitle_processor::SubtitleFormat;
use sublrc::tools::{
    AudioTranscoder, DownloadRequest, DownloadedMedia, LyricsTagWriter, SubtitleListing,
    SubtitleSource, VideoMetadata,
};

/// Placeholder audio payload
pub const FAKE_MP3: &[u8] = b"ID3fake-mp3-data";

/// Mock video site serving one video
#[derive(Debug)]
pub struct MockSource {
    pub metadata: VideoMetadata,
    pub listing: SubtitleListing,
    pub subtitle_content: String,
    pub subtitle_format: SubtitleFormat,
    /// Requests received by `fetch_subtitle_track`
    pub requests: Mutex<Vec<DownloadRequest>>,
}

impl MockSource {
    /// Create a source offering manual English subtitles
    pub fn new(id: &str, title: &str, subtitle_content: &str) -> Self {
        let mut listing = SubtitleListing::default();
        listing.manual.insert("en".to_string(), "English".to_string());

        Self {
            metadata: VideoMetadata {
                id: id.to_string(),
                title: title.to_string(),
            },
            listing,
            subtitle_content: subtitle_content.to_string(),
            subtitle_format: SubtitleFormat::Srt,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_listing(mut self, listing: SubtitleListing) -> Self {
        self.listing = listing;
        self
    }

    pub fn with_format(mut self, format: SubtitleFormat) -> Self {
        self.subtitle_format = format;
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<DownloadRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SubtitleSource for MockSource {
    async fn fetch_metadata(&self, _url: &str) -> Result<VideoMetadata, ToolError> {
        Ok(self.metadata.clone())
    }

    async fn list_subtitles(&self, _url: &str) -> Result<SubtitleListing, ToolError> {
        Ok(self.listing.clone())
    }

    async fn fetch_subtitle_track(
        &self,
        _url: &str,
        request: &DownloadRequest,
    ) -> Result<DownloadedMedia, ToolError> {
        self.requests.lock().unwrap().push(request.clone());

        let audio = request.output_dir.join(format!("{}.mp3", request.base_name));
        let subtitle = request.output_dir.join(format!(
            "{}.{}.{}",
            request.base_name,
            request.track.language,
            self.subtitle_format.extension()
        ));

        fs::write(&audio, FAKE_MP3).map_err(|e| ToolError::MissingOutput(e.to_string()))?;
        fs::write(&subtitle, &self.subtitle_content)
            .map_err(|e| ToolError::MissingOutput(e.to_string()))?;

        Ok(DownloadedMedia {
            audio,
            subtitle,
            format: self.subtitle_format,
        })
    }
}

/// Mock transcoder writing a placeholder MP3
#[derive(Debug, Default)]
pub struct MockTranscoder {
    pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
    pub should_fail: bool,
}

impl MockTranscoder {
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioTranscoder for MockTranscoder {
    async fn transcode_audio(&self, source: &Path, dest: &Path) -> Result<(), ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push((source.to_path_buf(), dest.to_path_buf()));

        if self.should_fail {
            return Err(ToolError::CommandFailed {
                program: "ffmpeg".to_string(),
                status: 1,
                stderr: "Invalid data found when processing input".to_string(),
            });
        }

        fs::write(dest, FAKE_MP3).map_err(|e| ToolError::MissingOutput(e.to_string()))
    }
}

/// Mock tag writer remembering the lyrics it was given
#[derive(Debug, Default)]
pub struct MockTagger {
    pub tagged: Mutex<Vec<(PathBuf, String)>>,
}

impl MockTagger {
    pub fn last_lyrics(&self) -> Option<String> {
        self.tagged.lock().unwrap().last().map(|(_, lyrics)| lyrics.clone())
    }

    pub fn tagged_paths(&self) -> Vec<PathBuf> {
        self.tagged.lock().unwrap().iter().map(|(path, _)| path.clone()).collect()
    }
}

#[async_trait]
impl LyricsTagWriter for MockTagger {
    async fn write_lyrics_tag(&self, audio: &Path, lrc_text: &str) -> Result<(), ToolError> {
        if !audio.is_file() {
            return Err(ToolError::MissingOutput(audio.display().to_string()));
        }
        self.tagged
            .lock()
            .unwrap()
            .push((audio.to_path_buf(), lrc_text.to_string()));
        Ok(())
    }
}

/// Shared handles to a full set of mocks
pub struct MockTools {
    pub source: Arc<MockSource>,
    pub transcoder: Arc<MockTranscoder>,
    pub tagger: Arc<MockTagger>,
}

impl MockTools {
    pub fn new(source: MockSource) -> Self {
        Self {
            source: Arc::new(source),
            transcoder: Arc::new(MockTranscoder::default()),
            tagger: Arc::new(MockTagger::default()),
        }
    }

    pub fn with_transcoder(mut self, transcoder: MockTranscoder) -> Self {
        self.transcoder = Arc::new(transcoder);
        self
    }
}
