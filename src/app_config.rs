use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Subtitle language code requested from the video site
    #[serde(default = "default_language")]
    pub language: String,

    /// Directory for final MP3 files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory for downloaded audio, subtitles and generated LRC
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Keep intermediate files in the source directory
    #[serde(default)]
    pub keep_intermediate: bool,

    /// Credit written into the `[by:...]` LRC header
    #[serde(default = "default_lyrics_credit")]
    pub lyrics_credit: String,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// External tool configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolsConfig {
    // @field: yt-dlp executable
    #[serde(default = "default_yt_dlp_path")]
    pub yt_dlp_path: String,

    // @field: ffmpeg executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    // @field: Per-invocation timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: default_yt_dlp_path(),
            ffmpeg_path: default_ffmpeg_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./final_mp3s")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("./source_files")
}

fn default_lyrics_credit() -> String {
    "sublrc".to_string()
}

fn default_yt_dlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_timeout_secs() -> u64 {
    600 // downloads of long videos can take several minutes
}

impl Config {
    /// Load configuration from a JSON file, writing a default one if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            return serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.language)?;

        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("Output directory must not be empty"));
        }
        if self.source_dir.as_os_str().is_empty() {
            return Err(anyhow!("Source directory must not be empty"));
        }
        if self.tools.yt_dlp_path.trim().is_empty() || self.tools.ffmpeg_path.trim().is_empty() {
            return Err(anyhow!("Tool paths must not be empty"));
        }
        if self.tools.timeout_secs == 0 {
            return Err(anyhow!("Tool timeout must be greater than zero"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: default_language(),
            output_dir: default_output_dir(),
            source_dir: default_source_dir(),
            keep_intermediate: false,
            lyrics_credit: default_lyrics_credit(),
            tools: ToolsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
