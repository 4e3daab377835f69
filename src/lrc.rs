/*!
 * Time-window filtering and LRC rendering.
 *
 * Cues overlapping an optional window are kept, shifted so the window start
 * becomes 00:00.00, and rendered one per line as `[MM:SS.CC]text`.
 */

use std::fmt;

use log::debug;

use crate::errors::SubtitleError;
use crate::subtitle_processor::Cue;
use crate::timestamp::{format_lrc_timestamp, parse_timestamp};

/// Time range used to select and re-offset a subset of cues
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    start: f64,
    end: f64,
}

impl TimeWindow {
    /// Create a window; `start` must be non-negative and strictly before `end`
    pub fn new(start: f64, end: f64) -> Result<Self, SubtitleError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || start >= end {
            return Err(SubtitleError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a window from two textual timestamps such as `0:00` and `2:21`
    pub fn parse(start: &str, end: &str) -> Result<Self, SubtitleError> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Half-open overlap test; touching a boundary does not count
    pub fn overlaps(&self, cue: &Cue) -> bool {
        cue.start < self.end && cue.end > self.start
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s-{:.3}s", self.start, self.end)
    }
}

/// One rendered lyrics line
#[derive(Debug, Clone, PartialEq)]
pub struct LrcLine {
    /// Seconds relative to the window start
    pub time: f64,
    pub text: String,
}

impl fmt::Display for LrcLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_lrc_timestamp(self.time), self.text)
    }
}

/// Cues overlapping the window, in their original order
pub fn filter_window<'a>(cues: &'a [Cue], window: &TimeWindow) -> Vec<&'a Cue> {
    cues.iter().filter(|cue| window.overlaps(cue)).collect()
}

/// Select, shift and convert cues to LRC lines.
///
/// Without a window every cue is rendered at its own time. With a window only
/// overlapping cues are kept and shifted by the window start; a cue that
/// overlaps but starts before the window would land at a negative time and is
/// dropped.
pub fn render(cues: &[Cue], window: Option<&TimeWindow>) -> Vec<LrcLine> {
    let (selected, offset): (Vec<&Cue>, f64) = match window {
        Some(window) => (filter_window(cues, window), window.start()),
        None => (cues.iter().collect(), 0.0),
    };

    let lines: Vec<LrcLine> = selected
        .into_iter()
        .filter_map(|cue| {
            let time = cue.start - offset;
            (time >= 0.0).then(|| LrcLine {
                time,
                text: cue.text.clone(),
            })
        })
        .collect();

    debug!(
        "Rendered {} of {} cues (offset {:.3}s)",
        lines.len(),
        cues.len(),
        offset
    );

    lines
}

/// Serialized lyrics: a provenance header followed by the rendered lines
#[derive(Debug, Clone, PartialEq)]
pub struct LrcDocument {
    credit: String,
    lines: Vec<LrcLine>,
}

impl LrcDocument {
    pub fn new(credit: impl Into<String>, lines: Vec<LrcLine>) -> Self {
        Self {
            credit: credit.into(),
            lines,
        }
    }

    pub fn lines(&self) -> &[LrcLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    // @returns: `[by:...]` header line
    pub fn header(&self) -> String {
        format!("[by:{}]", self.credit)
    }
}

impl fmt::Display for LrcDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        let body: Vec<String> = self.lines.iter().map(|line| line.to_string()).collect();
        write!(f, "{}", body.join("\n"))
    }
}

/// Render cues and wrap them with a `[by:<credit>]` header
pub fn render_document(cues: &[Cue], window: Option<&TimeWindow>, credit: &str) -> LrcDocument {
    LrcDocument::new(credit, render(cues, window))
}
