use anyhow::{Result, Context, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{warn, info, debug};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType};
use crate::language_utils;
use crate::lrc::{LrcDocument, TimeWindow};
use crate::subtitle_processor::{SubtitleCollection, SubtitleFormat};
use crate::tools::{
    AudioTranscoder, DownloadRequest, Ffmpeg, Id3LyricsWriter, LyricsTagWriter, SubtitleSource,
    YtDlp,
};

// @module: Application controller for lyrics conversion workflows

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Remote video and subtitle source
    source: Arc<dyn SubtitleSource>,

    // @field: Audio to MP3 converter
    transcoder: Arc<dyn AudioTranscoder>,

    // @field: Lyrics embedder
    tagger: Arc<dyn LyricsTagWriter>,
}

impl Controller {
    // @method: Create a controller backed by yt-dlp, ffmpeg and ID3 tagging
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let transcoder = Arc::new(Ffmpeg::from_config(&config.tools));
        let source = Arc::new(YtDlp::from_config(&config.tools));

        Ok(Self {
            config,
            source,
            transcoder,
            tagger: Arc::new(Id3LyricsWriter::new()),
        })
    }

    /// Create a controller with explicit collaborators
    pub fn with_tools(
        config: Config,
        source: Arc<dyn SubtitleSource>,
        transcoder: Arc<dyn AudioTranscoder>,
        tagger: Arc<dyn LyricsTagWriter>,
    ) -> Self {
        Self {
            config,
            source,
            transcoder,
            tagger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse a subtitle file and render it as LRC
    pub fn convert_subtitle_file(
        &self,
        subtitle_path: &Path,
        format: Option<SubtitleFormat>,
        window: Option<&TimeWindow>,
    ) -> Result<LrcDocument> {
        let collection = SubtitleCollection::from_file(subtitle_path, format)?;
        debug!("{}", collection);

        let document = collection.to_lrc(window, &self.config.lyrics_credit);
        match window {
            Some(window) => info!("Applied time range filter: {}", window),
            None => info!("Using complete subtitles, no time offset"),
        }
        if document.is_empty() {
            warn!("No subtitle lines in range for {}", subtitle_path.display());
        }

        Ok(document)
    }

    /// Convert one subtitle file to an `.lrc` file.
    ///
    /// Returns `None` when the output exists and `force_overwrite` is off.
    pub fn convert_to_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        format: Option<SubtitleFormat>,
        window: Option<&TimeWindow>,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        let output_path = match output {
            Some(path) => path.to_path_buf(),
            None => FileManager::generate_output_path(
                input,
                input.parent().unwrap_or(Path::new(".")),
                "lrc",
            ),
        };

        if output_path.exists() && !force_overwrite {
            warn!("Skipping {}, output already exists (use -f to force overwrite)", output_path.display());
            return Ok(None);
        }

        let document = self.convert_subtitle_file(input, format, window)?;
        FileManager::write_to_file(&output_path, &document.to_string())?;
        info!("Subtitles converted to {}", output_path.display());

        Ok(Some(output_path))
    }

    /// Convert every subtitle file below a directory
    pub fn convert_folder(
        &self,
        input_dir: &Path,
        format: Option<SubtitleFormat>,
        window: Option<&TimeWindow>,
        force_overwrite: bool,
    ) -> Result<usize> {
        info!("Converting subtitles in directory: {}", input_dir.display());

        let files = FileManager::find_subtitle_files(input_dir)?;
        if files.is_empty() {
            warn!("No subtitle files found in directory: {}", input_dir.display());
            return Ok(0);
        }

        let folder_pb = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));

        let mut converted = 0;
        let mut skipped = 0;
        let mut failed = 0;

        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_default();
            folder_pb.set_message(file_name);

            match self.convert_to_file(file, None, format, window, force_overwrite) {
                Ok(Some(_)) => converted += 1,
                Ok(None) => skipped += 1,
                Err(e) => {
                    failed += 1;
                    warn!("Error converting {}: {:#}", file.display(), e);
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_and_clear();

        info!(
            "Folder done: {} converted, {} skipped, {} failed",
            converted, skipped, failed
        );
        Ok(converted)
    }

    /// Combine a local audio file and subtitle file into a tagged MP3
    pub async fn merge(
        &self,
        audio_path: &Path,
        subtitle_path: &Path,
        window: Option<&TimeWindow>,
    ) -> Result<PathBuf> {
        info!("--- Starting Merge Mode ---");

        if !FileManager::file_exists(audio_path) {
            return Err(anyhow!("Audio file not found: {}", audio_path.display()));
        }
        if !FileManager::file_exists(subtitle_path) {
            return Err(anyhow!("Subtitle file not found: {}", subtitle_path.display()));
        }

        FileManager::ensure_dir(&self.config.source_dir)?;
        FileManager::ensure_dir(&self.config.output_dir)?;

        let source_mp3 = FileManager::generate_output_path(audio_path, &self.config.source_dir, "mp3");
        let source_lrc = FileManager::generate_output_path(audio_path, &self.config.source_dir, "lrc");
        let final_path = FileManager::generate_output_path(audio_path, &self.config.output_dir, "mp3");

        match FileManager::detect_file_type(audio_path) {
            FileType::Mp3 => {
                if !same_file(audio_path, &source_mp3) {
                    info!("Input is already MP3, copying to source directory...");
                    FileManager::copy_file(audio_path, &source_mp3)?;
                }
            }
            FileType::Subtitle(_) => {
                return Err(anyhow!("Expected an audio file, got subtitles: {}", audio_path.display()));
            }
            FileType::Media | FileType::Unknown => {
                self.transcoder.transcode_audio(audio_path, &source_mp3).await?;
            }
        }

        let document = self.convert_subtitle_file(subtitle_path, None, window)?;
        FileManager::write_to_file(&source_lrc, &document.to_string())?;

        self.embed_lyrics(&source_mp3, &final_path, &document).await?;

        self.cleanup(&[source_mp3, source_lrc], &[audio_path, subtitle_path, final_path.as_path()]);

        info!("--- Merge completed successfully! ---");
        Ok(final_path)
    }

    /// Download a video's audio and subtitles and produce a tagged MP3
    pub async fn download(&self, url: &str, window: Option<&TimeWindow>) -> Result<PathBuf> {
        let metadata = self
            .source
            .fetch_metadata(url)
            .await
            .context("Unable to get video metadata")?;
        info!("Retrieved: [ID: {}, Title: {}]", metadata.id, metadata.title);

        let base_name = FileManager::sanitize_file_name(&metadata.id);
        let final_name = format!("{} [{}]", FileManager::sanitize_file_name(&metadata.title), base_name);

        FileManager::ensure_dir(&self.config.source_dir)?;
        FileManager::ensure_dir(&self.config.output_dir)?;

        let final_path = self.config.output_dir.join(format!("{}.mp3", final_name));
        if final_path.exists() {
            info!("Final file already exists at: {}", final_path.display());
            return Ok(final_path);
        }

        let language = self.config.language.as_str();
        let listing = self.source.list_subtitles(url).await?;
        if listing.is_empty() {
            warn!("Unable to get any subtitle list; this might be a temporary network issue or a video restriction");
        }

        let track = listing.select(language)?;
        let language_name = language_utils::get_language_name(language)
            .unwrap_or_else(|_| language.to_string());
        if track.automatic {
            warn!("Manual subtitles '{}' ({}) not found, using auto-generated subtitles instead", language, language_name);
        } else {
            info!("Found requested manual subtitles: '{}' ({})", language, language_name);
        }

        let request = DownloadRequest {
            track,
            output_dir: self.config.source_dir.clone(),
            base_name: base_name.clone(),
            section: window.copied(),
        };
        let media = self.source.fetch_subtitle_track(url, &request).await?;

        let document = self.convert_subtitle_file(&media.subtitle, Some(media.format), window)?;
        let source_lrc = self.config.source_dir.join(format!("{}.lrc", base_name));
        FileManager::write_to_file(&source_lrc, &document.to_string())?;

        self.embed_lyrics(&media.audio, &final_path, &document).await?;

        self.cleanup(&[media.audio, media.subtitle, source_lrc], &[final_path.as_path()]);

        info!("All processes completed successfully!");
        Ok(final_path)
    }

    // @copies: Prepared MP3 to its final place and writes the lyrics tag
    async fn embed_lyrics(&self, prepared_mp3: &Path, final_path: &Path, document: &LrcDocument) -> Result<()> {
        info!("Embedding lyrics into MP3...");

        if !same_file(prepared_mp3, final_path) {
            FileManager::copy_file(prepared_mp3, final_path)?;
        }
        self.tagger
            .write_lyrics_tag(final_path, &document.to_string())
            .await
            .with_context(|| format!("Failed to embed lyrics into {}", final_path.display()))?;

        let size_kb = std::fs::metadata(final_path).map(|m| m.len() as f64 / 1024.0).unwrap_or(0.0);
        info!("Created MP3 with embedded lyrics: {} ({:.2} KB)", final_path.display(), size_kb);
        Ok(())
    }

    // @removes: Intermediates, never touching any protected path
    fn cleanup(&self, intermediates: &[PathBuf], protected: &[&Path]) {
        if self.config.keep_intermediate {
            info!("Source files preserved in: {}", self.config.source_dir.display());
            return;
        }

        let removable: Vec<&PathBuf> = intermediates
            .iter()
            .filter(|path| !protected.iter().any(|keep| same_file(path, keep)))
            .collect();
        let removed = FileManager::remove_files(removable.as_slice());
        debug!("Cleaned up {} intermediate files", removed);
    }
}

// @compares: Two paths, resolving them when both exist
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
