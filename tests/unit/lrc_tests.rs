/*!
 * Tests for time-window filtering and LRC rendering
 */

use sublrc::errors::SubtitleError;
use sublrc::lrc::{filter_window, render, render_document, LrcDocument, LrcLine, TimeWindow};
use sublrc::subtitle_processor::Cue;
use sublrc::timestamp::parse_timestamp;

fn rendered(cues: &[Cue], window: Option<&TimeWindow>) -> Vec<String> {
    render(cues, window).iter().map(|line| line.to_string()).collect()
}

#[test]
fn test_timeWindow_withInvertedOrEmptyRange_shouldReturnInvalidWindow() {
    assert_eq!(
        TimeWindow::new(30.0, 10.0),
        Err(SubtitleError::InvalidWindow { start: 30.0, end: 10.0 })
    );
    assert!(TimeWindow::new(10.0, 10.0).is_err());
    assert!(TimeWindow::new(-1.0, 10.0).is_err());
    assert!(TimeWindow::new(0.0, f64::INFINITY).is_err());
}

#[test]
fn test_timeWindow_parse_withMalformedBoundary_shouldPropagate() {
    assert_eq!(
        TimeWindow::parse("abc", "1:00"),
        Err(SubtitleError::MalformedTimestamp("abc".to_string()))
    );
}

#[test]
fn test_timeWindow_display_shouldShowSeconds() {
    let window = TimeWindow::parse("0:10", "0:30.5").unwrap();
    assert_eq!(window.to_string(), "10.000s-30.500s");
}

/// A cue straddling the window end is kept at its shifted start
#[test]
fn test_render_withStraddlingCue_shouldKeepIt() {
    let cues = vec![Cue::new(25.0, 35.0, "Crossing")];
    let window = TimeWindow::new(10.0, 30.0).unwrap();

    assert_eq!(rendered(&cues, Some(&window)), vec!["[00:15.00]Crossing"]);
}

#[test]
fn test_render_withCueTouchingWindowEnd_shouldExcludeIt() {
    let cues = vec![Cue::new(30.0, 31.0, "After"), Cue::new(9.0, 10.0, "Before")];
    let window = TimeWindow::new(10.0, 30.0).unwrap();

    assert!(filter_window(&cues, &window).is_empty());
    assert!(render(&cues, Some(&window)).is_empty());
}

#[test]
fn test_render_withWindow_shouldNeverProduceNegativeTimes() {
    let cues: Vec<Cue> = (0..50)
        .map(|i| Cue::new(i as f64 * 0.7, i as f64 * 0.7 + 1.3, format!("line {}", i)))
        .collect();
    let window = TimeWindow::new(7.35, 21.0).unwrap();

    let lines = render(&cues, Some(&window));

    assert!(!lines.is_empty());
    assert!(lines.iter().all(|line| line.time >= 0.0));
    assert!(lines.iter().all(|line| line.time + window.start() < window.end()));
}

#[test]
fn test_render_withoutWindow_shouldPreserveOrderAndCount() {
    let cues = vec![Cue::new(1.0, 2.0, "a"), Cue::new(1.0, 2.5, "b"), Cue::new(3.0, 4.0, "c")];
    let lines = render(&cues, None);

    let order: Vec<&str> = lines.iter().map(|line| line.text.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
}

/// Every timestamp printed on a line parses back within one hundredth
#[test]
fn test_renderedLines_thenParse_shouldRoundTripWithinCentisecond() {
    let cues = vec![Cue::new(0.29, 1.0, "a"), Cue::new(61.237, 62.0, "b"), Cue::new(3599.999, 3600.5, "c")];

    for line in render(&cues, None) {
        let text = line.to_string();
        let tag = &text[1..text.find(']').unwrap()];
        let parsed = parse_timestamp(tag).unwrap();
        assert!(parsed <= line.time + 1e-9 && line.time - parsed < 0.01, "{} vs {}", parsed, line.time);
    }
}

#[test]
fn test_lrcDocument_withNoLines_shouldRenderHeaderOnly() {
    let document = render_document(&[], None, "sublrc");

    assert!(document.is_empty());
    assert_eq!(document.to_string(), "[by:sublrc]\n");
}

#[test]
fn test_lrcDocument_display_shouldJoinLinesWithoutTrailingNewline() {
    let document = LrcDocument::new(
        "me",
        vec![
            LrcLine { time: 0.0, text: "first".to_string() },
            LrcLine { time: 75.5, text: "second".to_string() },
        ],
    );

    assert_eq!(document.header(), "[by:me]");
    assert_eq!(document.lines().len(), 2);
    assert_eq!(document.to_string(), "[by:me]\n[00:00.00]first\n[01:15.50]second");
}
