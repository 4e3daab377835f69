/*!
 * Error types for the sublrc application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while parsing subtitles or rendering lyrics
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// Timestamp text matches none of the accepted grammars
    #[error("Malformed timestamp: '{0}'")]
    MalformedTimestamp(String),

    /// Time window whose start is not strictly before its end
    #[error("Invalid time window: start {start}s must be before end {end}s")]
    InvalidWindow {
        /// Window start in seconds
        start: f64,
        /// Window end in seconds
        end: f64,
    },

    /// Subtitle grammar name that is not supported
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),
}

/// Errors that can occur when invoking an external tool
#[derive(Error, Debug)]
pub enum ToolError {
    /// The executable could not be started
    #[error("Failed to start {program}: {message}")]
    NotFound {
        /// Program that was invoked
        program: String,
        /// Underlying spawn error
        message: String,
    },

    /// The executable exists but could not be launched
    #[error("Failed to launch {program}: {message}")]
    LaunchFailed {
        /// Program that was invoked
        program: String,
        /// Underlying spawn error
        message: String,
    },

    /// The tool ran but exited unsuccessfully
    #[error("{program} exited with status {status}: {stderr}")]
    CommandFailed {
        /// Program that was invoked
        program: String,
        /// Exit status code, -1 when killed by a signal
        status: i32,
        /// Filtered standard error output
        stderr: String,
    },

    /// The tool did not finish in time
    #[error("{program} timed out after {secs} seconds")]
    Timeout {
        /// Program that was invoked
        program: String,
        /// Timeout that elapsed
        secs: u64,
    },

    /// The tool succeeded but the expected file is missing
    #[error("Expected output was not produced: {0}")]
    MissingOutput(String),

    /// Lyrics could not be written into the audio file's tag
    #[error("Failed to write lyrics tag to {path}: {message}")]
    TagWrite {
        /// Audio file being tagged
        path: String,
        /// Underlying tag error
        message: String,
    },

    /// The requested subtitle language is not offered
    #[error("Subtitle language '{language}' not available (available: {available})")]
    LanguageUnavailable {
        /// Requested language code
        language: String,
        /// Comma separated list of offered codes
        available: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from an external tool
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
