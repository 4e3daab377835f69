use anyhow::{Result, Context};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::subtitle_processor::SubtitleFormat;

// @module: File and directory utilities

// @const: Characters not allowed in file names on common platforms
static UNSAFE_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\\/*?:"<>|]"#).unwrap()
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    // @generates: Sibling path in another directory with a new extension
    // @params: input_file, output_dir, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(extension.trim_start_matches('.'));

        output_dir.as_ref().join(output_filename)
    }

    /// Replace characters that are unsafe in file names with `_`
    pub fn sanitize_file_name(name: &str) -> String {
        UNSAFE_FILENAME_CHARS.replace_all(name.trim(), "_").to_string()
    }

    /// Find SRT and WebVTT files below a directory
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && SubtitleFormat::from_path(path).is_some() {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to)
            .with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        Ok(())
    }

    /// Delete intermediate files, logging rather than failing on errors
    pub fn remove_files<P: AsRef<Path>>(paths: &[P]) -> usize {
        let mut removed = 0;
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            match fs::remove_file(path) {
                Ok(()) => {
                    debug!("Deleted: {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Error cleaning up file {}: {}", path.display(), e),
            }
        }
        removed
    }

    /// Classify a file by its extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> FileType {
        let path = path.as_ref();

        if let Some(format) = SubtitleFormat::from_path(path) {
            return FileType::Subtitle(format);
        }

        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if ext == "mp3" {
            return FileType::Mp3;
        }

        // Containers ffmpeg can pull an audio stream from
        let media_extensions = [
            "mp4", "m4a", "mkv", "webm", "wav", "flac", "ogg", "opus", "aac",
            "avi", "mov", "wma",
        ];
        if media_extensions.contains(&ext.as_str()) {
            return FileType::Media;
        }

        FileType::Unknown
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileType {
    /// Subtitle file in a supported grammar
    Subtitle(SubtitleFormat),
    /// Already an MP3, can be copied as is
    Mp3,
    /// Audio or video that needs transcoding
    Media,
    /// Unknown file type
    Unknown,
}
