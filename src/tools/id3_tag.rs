/*!
 * Lyrics embedding as an ID3v2.3 unsynchronised-lyrics (`USLT`) frame.
 */

use async_trait::async_trait;
use id3::frame::Lyrics;
use id3::{ErrorKind, Tag, TagLike, Version};
use log::debug;
use std::path::{Path, PathBuf};

use super::LyricsTagWriter;
use crate::errors::ToolError;

/// ISO 639-2 language written into the lyrics frame
pub const LYRICS_LANGUAGE: &str = "eng";

/// Writes lyrics straight into the file's ID3 tag, replacing earlier lyrics
#[derive(Debug, Clone, Default)]
pub struct Id3LyricsWriter;

impl Id3LyricsWriter {
    pub fn new() -> Self {
        Self
    }

    // @writes: Lyrics frame, keeping every other frame of an existing tag
    fn write_blocking(path: &Path, lrc_text: &str) -> Result<(), ToolError> {
        let tag_error = |message: String| ToolError::TagWrite {
            path: path.display().to_string(),
            message,
        };

        let mut tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(e) if is_untagged(&e.kind) => Tag::new(),
            Err(e) => return Err(tag_error(e.to_string())),
        };

        tag.remove_all_lyrics();
        tag.add_frame(Lyrics {
            lang: LYRICS_LANGUAGE.to_string(),
            description: String::new(),
            text: lrc_text.to_string(),
        });

        tag.write_to_path(path, Version::Id3v23)
            .map_err(|e| tag_error(e.to_string()))?;
        debug!("Wrote {} bytes of lyrics to {}", lrc_text.len(), path.display());
        Ok(())
    }
}

// @checks: Read failure meaning the file simply carries no tag yet
fn is_untagged(kind: &ErrorKind) -> bool {
    match kind {
        ErrorKind::NoTag => true,
        // Files shorter than a tag header
        ErrorKind::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
        _ => false,
    }
}

#[async_trait]
impl LyricsTagWriter for Id3LyricsWriter {
    async fn write_lyrics_tag(&self, audio: &Path, lrc_text: &str) -> Result<(), ToolError> {
        if !audio.is_file() {
            return Err(ToolError::MissingOutput(audio.display().to_string()));
        }

        let path: PathBuf = audio.to_path_buf();
        let text = lrc_text.to_string();

        tokio::task::spawn_blocking(move || Self::write_blocking(&path, &text))
            .await
            .map_err(|e| ToolError::TagWrite {
                path: audio.display().to_string(),
                message: e.to_string(),
            })?
    }
}
