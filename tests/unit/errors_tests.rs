/*!
 * Tests for error types
 */

use sublrc::errors::{AppError, SubtitleError, ToolError};

#[test]
fn test_subtitleError_display_shouldDescribeProblem() {
    assert_eq!(
        SubtitleError::MalformedTimestamp("1:x".to_string()).to_string(),
        "Malformed timestamp: '1:x'"
    );
    assert_eq!(
        SubtitleError::InvalidWindow { start: 30.0, end: 10.0 }.to_string(),
        "Invalid time window: start 30s must be before end 10s"
    );
}

#[test]
fn test_toolError_display_shouldNameProgram() {
    let error = ToolError::Timeout { program: "yt-dlp".to_string(), secs: 600 };
    assert_eq!(error.to_string(), "yt-dlp timed out after 600 seconds");

    let error = ToolError::LanguageUnavailable {
        language: "ja".to_string(),
        available: "de, en".to_string(),
    };
    assert!(error.to_string().contains("available: de, en"));
}

#[test]
fn test_toolError_display_withLaunchOrTagFailure_shouldKeepCause() {
    let error = ToolError::LaunchFailed {
        program: "ffmpeg".to_string(),
        message: "Argument list too long (os error 7)".to_string(),
    };
    assert_eq!(error.to_string(), "Failed to launch ffmpeg: Argument list too long (os error 7)");

    let error = ToolError::TagWrite {
        path: "final/song.mp3".to_string(),
        message: "Permission denied".to_string(),
    };
    assert_eq!(error.to_string(), "Failed to write lyrics tag to final/song.mp3: Permission denied");
}

/// Test conversions into the application error
#[test]
fn test_appError_from_shouldWrapSourceErrors() {
    let app: AppError = SubtitleError::UnsupportedFormat("ass".to_string()).into();
    assert!(matches!(app, AppError::Subtitle(_)));
    assert_eq!(app.to_string(), "Subtitle error: Unsupported subtitle format: ass");

    let app: AppError = ToolError::MissingOutput("x.mp3".to_string()).into();
    assert!(matches!(app, AppError::Tool(_)));

    let app: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app, AppError::File(_)));

    let app: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(app.to_string(), "Unknown error: boom");
}
