/*!
 * End-to-end subtitle conversion tests
 */

use anyhow::Result;
use std::fs;
use sublrc::app_controller::Controller;
use sublrc::lrc::TimeWindow;
use sublrc::subtitle_processor::SubtitleFormat;
use crate::common;

const HELLO_SRT: &str = "1\n00:00:20,000 --> 00:00:24,400\nHello world";

fn controller(root: &std::path::Path) -> Result<Controller> {
    Controller::with_config(common::test_config(root))
}

/// Basic conversion writes the lyrics next to the input
#[test]
fn test_convertToFile_withoutWindow_shouldWriteLrcNextToInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "hello.srt", HELLO_SRT)?;

    let output = controller(temp_dir.path())?.convert_to_file(&input, None, None, None, false)?;

    let expected = temp_dir.path().join("hello.lrc");
    assert_eq!(output.as_deref(), Some(expected.as_path()));
    assert_eq!(fs::read_to_string(&expected)?, "[by:tests]\n[00:20.00]Hello world");
    Ok(())
}

#[test]
fn test_convertSubtitleFile_withWindow_shouldOffsetByWindowStart() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "hello.srt", HELLO_SRT)?;
    let window = TimeWindow::parse("00:00:10", "00:00:30")?;

    let document = controller(temp_dir.path())?.convert_subtitle_file(&input, None, Some(&window))?;

    assert_eq!(document.lines().len(), 1);
    assert_eq!(document.lines()[0].to_string(), "[00:10.00]Hello world");
    Ok(())
}

#[test]
fn test_convertSubtitleFile_withDuplicatesAndMalformedBlock_shouldKeepValidLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "1\n00:00:20,000 --> 00:00:21,000\nAgain\n\n2\n00:00:20,050 --> 00:00:21,000\nAgain\n\n3\nthis block lost its timing\nGone\n\n4\n00:00:30,000 --> 00:00:31,000\nStill here\n";
    let input = common::create_test_file(temp_dir.path(), "mixed.srt", content)?;

    let document = controller(temp_dir.path())?.convert_subtitle_file(&input, None, None)?;

    assert_eq!(
        document.to_string(),
        "[by:tests]\n[00:20.00]Again\n[00:30.00]Still here"
    );
    Ok(())
}

#[test]
fn test_convertSubtitleFile_withVtt_shouldMatchEquivalentSrt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let vtt = common::create_test_file(
        temp_dir.path(),
        "a.vtt",
        "WEBVTT\n\n00:20.000 --> 00:24.400\n<b>Hello</b>\nworld\n",
    )?;
    let srt = common::create_test_file(temp_dir.path(), "b.srt", HELLO_SRT)?;
    let controller = controller(temp_dir.path())?;

    let from_vtt = controller.convert_subtitle_file(&vtt, None, None)?;
    let from_srt = controller.convert_subtitle_file(&srt, Some(SubtitleFormat::Srt), None)?;

    assert_eq!(from_vtt, from_srt);
    Ok(())
}

/// A window past the last cue still produces a document with a header
#[test]
fn test_convertToFile_withWindowPastEnd_shouldWriteHeaderOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "hello.srt", HELLO_SRT)?;
    let output = temp_dir.path().join("out").join("custom.lrc");
    let window = TimeWindow::parse("5:00", "6:00")?;

    controller(temp_dir.path())?.convert_to_file(&input, Some(&output), None, Some(&window), false)?;

    assert_eq!(fs::read_to_string(&output)?, "[by:tests]\n");
    Ok(())
}

#[test]
fn test_convertToFile_withExistingOutput_shouldRespectForceFlag() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "hello.srt", HELLO_SRT)?;
    let existing = common::create_test_file(temp_dir.path(), "hello.lrc", "old")?;
    let controller = controller(temp_dir.path())?;

    let skipped = controller.convert_to_file(&input, None, None, None, false)?;
    assert!(skipped.is_none());
    assert_eq!(fs::read_to_string(&existing)?, "old");

    let written = controller.convert_to_file(&input, None, None, None, true)?;
    assert!(written.is_some());
    assert!(fs::read_to_string(&existing)?.ends_with("Hello world"));
    Ok(())
}

/// Folder conversion keeps going past unreadable files
#[test]
fn test_convertFolder_withMixedFiles_shouldConvertEachSubtitle() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("nested");
    fs::create_dir_all(&nested)?;
    common::create_test_subtitle(temp_dir.path(), "one.srt")?;
    common::create_test_file(&nested, "two.vtt", common::SAMPLE_VTT)?;
    common::create_test_file(temp_dir.path(), "readme.txt", "not subtitles")?;
    // Invalid UTF-8 cannot be read as text
    fs::write(temp_dir.path().join("broken.srt"), [0xff, 0xfe, 0x00, 0xc3])?;

    let converted = controller(temp_dir.path())?.convert_folder(temp_dir.path(), None, None, false)?;

    assert_eq!(converted, 2);
    assert!(temp_dir.path().join("one.lrc").exists());
    assert!(nested.join("two.lrc").exists());
    assert!(!temp_dir.path().join("readme.lrc").exists());

    let again = controller(temp_dir.path())?.convert_folder(temp_dir.path(), None, None, false)?;
    assert_eq!(again, 0);
    Ok(())
}
