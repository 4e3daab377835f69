use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use log::{warn, debug};
use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::lrc::{self, LrcDocument, TimeWindow};
use crate::timestamp::parse_timestamp;

// @module: Subtitle document parsing and normalization

// @const: SRT arrow line, fixed comma-decimal on both sides
static SRT_ARROW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2},\d{3})").unwrap()
});

// @const: WebVTT arrow line, cue settings may follow the end timestamp
static VTT_ARROW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\S+?)\s*-->\s*(\S+)").unwrap()
});

// @const: Inline markup such as <i>, <font color=...>, <00:00:01.000>, <c.yellow>
static MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]+>").unwrap()
});

/// Token that separates start and end times on a cue timing line
pub const ARROW_TOKEN: &str = "-->";

/// Cues with identical text starting within this many seconds collapse into one
pub const DEDUP_EPSILON_SECS: f64 = 0.1;

/// WebVTT blocks that carry no cue
const VTT_METADATA_PREFIXES: [&str; 4] = ["WEBVTT", "NOTE", "STYLE", "REGION"];

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Supported subtitle grammars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// SubRip: sequence-numbered blocks, comma-decimal timestamps
    Srt,
    /// WebVTT: optional cue identifier, dot-decimal timestamps
    Vtt,
}

impl SubtitleFormat {
    // @returns: File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }

    /// Guess the grammar from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_string_lossy().to_lowercase();
        ext.parse().ok()
    }

    /// Guess the grammar from document content.
    ///
    /// A `WEBVTT` signature wins; otherwise SRT is assumed when the fixed SRT
    /// timing pattern appears, and WebVTT when only a looser arrow line does.
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim_start_matches(BYTE_ORDER_MARK).trim_start();
        if trimmed.starts_with("WEBVTT") {
            return Self::Vtt;
        }
        if SRT_ARROW_REGEX.is_match(content) || !content.contains(ARROW_TOKEN) {
            Self::Srt
        } else {
            Self::Vtt
        }
    }

    // @locates: Index of the timing line within a block
    fn locate_arrow_line(&self, lines: &[&str]) -> Option<usize> {
        match self {
            // Index line first, timing line second
            Self::Srt => (lines.len() > 1).then_some(1),
            // A cue identifier may or may not precede the timing line
            Self::Vtt => lines.iter().position(|line| line.contains(ARROW_TOKEN)),
        }
    }

    fn arrow_regex(&self) -> &'static Regex {
        match self {
            Self::Srt => &SRT_ARROW_REGEX,
            Self::Vtt => &VTT_ARROW_REGEX,
        }
    }

    fn is_metadata_block(&self, lines: &[&str]) -> bool {
        match self {
            Self::Srt => false,
            Self::Vtt => lines.first().is_some_and(|first| {
                VTT_METADATA_PREFIXES.iter().any(|prefix| first.starts_with(prefix))
            }) && !lines.iter().any(|line| line.contains(ARROW_TOKEN)),
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "srt" | "subrip" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            _ => Err(SubtitleError::UnsupportedFormat(s.to_string())),
        }
    }
}

// @struct: One timed subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,

    // @field: Markup-free text
    pub text: String,
}

impl Cue {
    /// Creates a cue without validation - used by tests and external consumers
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Cue {
            start,
            end,
            text: text.into(),
        }
    }

    // @creates: Validated cue
    // @validates: Time range and non-empty text
    pub fn new_validated(start: f64, end: f64, text: &str) -> Result<Self> {
        if start < 0.0 || end < start {
            return Err(anyhow!(
                "Invalid time range: end time {} < start time {}",
                end, start
            ));
        }

        let trimmed_text = text.trim();
        if trimmed_text.is_empty() {
            return Err(anyhow!("Empty cue text"));
        }

        Ok(Cue {
            start,
            end,
            text: trimmed_text.to_string(),
        })
    }
}

/// Outcome of parsing one blank-line separated block
enum ParsedBlock {
    Cue(Cue),
    /// No usable text, or a metadata block
    Discarded,
    /// Timing line missing or unparseable
    Skipped(String),
}

/// Remove all `<...>` inline tags and surrounding whitespace
pub fn strip_markup(text: &str) -> String {
    MARKUP_REGEX.replace_all(text, "").trim().to_string()
}

/// Parse a subtitle document into a time-ordered, deduplicated cue sequence.
///
/// Malformed blocks are skipped with a warning; a document without any
/// timing lines yields an empty sequence rather than an error.
pub fn parse_document(content: &str, format: SubtitleFormat) -> Vec<Cue> {
    let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content);
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");

    let blocks = split_blocks(&normalized);
    let mut cues = Vec::with_capacity(blocks.len());
    let mut timed_blocks = 0;

    for (block_idx, block) in blocks.iter().enumerate() {
        if block.iter().any(|line| line.contains(ARROW_TOKEN)) {
            timed_blocks += 1;
        }

        match parse_block(block, format) {
            ParsedBlock::Cue(cue) => cues.push(cue),
            ParsedBlock::Discarded => {}
            ParsedBlock::Skipped(reason) => {
                warn!(
                    "Skipping subtitle block {} ({}): {}",
                    block_idx + 1,
                    block.first().copied().unwrap_or_default(),
                    reason
                );
            }
        }
    }

    if timed_blocks == 0 && !blocks.is_empty() {
        warn!("No '{}' time ranges found; document does not look like {}", ARROW_TOKEN, format);
        return Vec::new();
    }

    // Stable: ties keep input order
    cues.sort_by(|a, b| a.start.total_cmp(&b.start));

    let parsed = cues.len();
    let cues = dedup_cues(cues);
    debug!(
        "Parsed {} blocks into {} cues ({} duplicates collapsed)",
        blocks.len(),
        cues.len(),
        parsed - cues.len()
    );

    cues
}

// @splits: Document into blocks of non-blank lines
fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_block(lines: &[&str], format: SubtitleFormat) -> ParsedBlock {
    if format.is_metadata_block(lines) {
        return ParsedBlock::Discarded;
    }

    let Some(arrow_idx) = format.locate_arrow_line(lines) else {
        return ParsedBlock::Skipped("missing timing line".to_string());
    };

    let Some(caps) = format.arrow_regex().captures(lines[arrow_idx]) else {
        return ParsedBlock::Skipped(format!("unrecognized timing line '{}'", lines[arrow_idx]));
    };

    let (start, end) = match (parse_timestamp(&caps[1]), parse_timestamp(&caps[2])) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(e), _) | (_, Err(e)) => return ParsedBlock::Skipped(e.to_string()),
    };

    let joined = lines[arrow_idx + 1..]
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join(" ");
    let text = strip_markup(&joined);
    if text.is_empty() {
        return ParsedBlock::Discarded;
    }

    match Cue::new_validated(start, end, &text) {
        Ok(cue) => ParsedBlock::Cue(cue),
        Err(e) => ParsedBlock::Skipped(e.to_string()),
    }
}

/// Collapse near-duplicate neighbours.
///
/// Single forward pass: a cue is dropped when it has the same text as the last
/// retained cue and starts within [`DEDUP_EPSILON_SECS`] of it. Cues separated
/// by a different retained cue are never compared.
pub fn dedup_cues(cues: Vec<Cue>) -> Vec<Cue> {
    let mut kept: Vec<Cue> = Vec::with_capacity(cues.len());

    for cue in cues {
        let is_duplicate = kept.last().is_some_and(|last| {
            last.text == cue.text && (cue.start - last.start).abs() <= DEDUP_EPSILON_SECS
        });
        if !is_duplicate {
            kept.push(cue);
        }
    }

    kept
}

/// Parsed subtitle document with its origin
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Grammar the document was parsed with
    pub format: SubtitleFormat,

    /// Ordered, deduplicated cues
    pub cues: Vec<Cue>,
}

impl SubtitleCollection {
    /// Parse in-memory content
    pub fn from_content(source_file: PathBuf, content: &str, format: SubtitleFormat) -> Self {
        SubtitleCollection {
            source_file,
            format,
            cues: parse_document(content, format),
        }
    }

    /// Read and parse a subtitle file.
    ///
    /// When `format` is `None` the grammar is taken from the extension, then
    /// from the content.
    pub fn from_file<P: AsRef<Path>>(path: P, format: Option<SubtitleFormat>) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)
            .with_context(|| format!("Failed to load subtitle file: {}", path.display()))?;

        let format = format
            .or_else(|| SubtitleFormat::from_path(path))
            .unwrap_or_else(|| SubtitleFormat::detect(&content));
        debug!("Parsing {} as {}", path.display(), format);

        Ok(Self::from_content(path.to_path_buf(), &content, format))
    }

    /// Render the cues as an LRC document
    pub fn to_lrc(&self, window: Option<&TimeWindow>, credit: &str) -> LrcDocument {
        lrc::render_document(&self.cues, window, credit)
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Cues: {}", self.cues.len())?;
        Ok(())
    }
}
