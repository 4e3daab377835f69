/*!
 * # sublrc - Subtitles to embedded LRC lyrics
 *
 * A Rust library for turning video subtitles into synchronized lyrics.
 *
 * ## Features
 *
 * - Parse SubRip (SRT) and WebVTT subtitle documents
 * - Strip inline markup and collapse near-duplicate cues
 * - Cut the lyrics to a time window and shift them to start at 00:00.00
 * - Render LRC (`[MM:SS.CC]text`) with a configurable `[by:...]` header
 * - Download audio and subtitles with yt-dlp, convert and tag with ffmpeg
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timestamp`: Timestamp parsing and LRC time tags
 * - `subtitle_processor`: Subtitle document parsing and normalization
 * - `lrc`: Time-window filtering and LRC rendering
 * - `tools`: External collaborators (yt-dlp, ffmpeg)
 * - `app_controller`: Convert, merge and download workflows
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `language_utils`: Subtitle language code utilities
 * - `errors`: Custom error types for the application
 *
 * The first three modules are pure and synchronous; they perform no I/O.
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod lrc;
pub mod subtitle_processor;
pub mod timestamp;
pub mod tools;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, SubtitleError, ToolError};
pub use lrc::{render, render_document, LrcDocument, LrcLine, TimeWindow};
pub use subtitle_processor::{parse_document, Cue, SubtitleCollection, SubtitleFormat};
pub use timestamp::parse_timestamp;
