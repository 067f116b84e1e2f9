use std::fmt;
use std::str::FromStr;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @module: Subtitle cue model and text codec

// @const: SRT timing line regex (comma millisecond separator)
static SRT_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2}),(\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

// @const: WebVTT timing line regex (dot millisecond separator, trailing cue
// settings tolerated and discarded)
static VTT_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})\.(\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})\.(\d{3})").unwrap()
});

/// The two supported text subtitle syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// WebVTT: `WEBVTT` banner line, `HH:MM:SS.mmm` timestamps
    Vtt,
    /// SubRip: no banner, `HH:MM:SS,mmm` timestamps
    Srt,
}

impl SubtitleFormat {
    /// The counterpart format
    pub fn other(self) -> Self {
        match self {
            Self::Vtt => Self::Srt,
            Self::Srt => Self::Vtt,
        }
    }

    /// Millisecond separator used by this format's timestamps
    pub fn millis_separator(self) -> char {
        match self {
            Self::Vtt => '.',
            Self::Srt => ',',
        }
    }

    /// Conventional file extension
    pub fn extension(self) -> &'static str {
        match self {
            Self::Vtt => "vtt",
            Self::Srt => "srt",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vtt" | "webvtt" => Ok(Self::Vtt),
            "srt" | "subrip" => Ok(Self::Srt),
            other => Err(SubtitleError::UnknownFormat(other.to_string())),
        }
    }
}

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Display text, inner lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry without validation
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    // @creates: Validated subtitle entry
    // @validates: Time range and non-empty text
    pub fn new_validated(
        seq_num: usize,
        start_time_ms: u64,
        end_time_ms: u64,
        text: String,
    ) -> Result<Self, SubtitleError> {
        if end_time_ms < start_time_ms {
            return Err(SubtitleError::InvalidCue {
                seq_num,
                reason: format!(
                    "end time {} precedes start time {}",
                    end_time_ms, start_time_ms
                ),
            });
        }

        let trimmed_text = text.trim();
        if trimmed_text.is_empty() {
            return Err(SubtitleError::InvalidCue {
                seq_num,
                reason: "empty text".to_string(),
            });
        }

        Ok(SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: trimmed_text.to_string(),
        })
    }

    /// Parse a timestamp in either syntax to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
        }

        let mut fields = [0u64; 4];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| SubtitleError::InvalidTimestamp(timestamp.to_string()))?;
        }

        let [hours, minutes, seconds, millis] = fields;
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a millisecond timestamp in the given format's syntax
    pub fn format_timestamp(ms: u64, format: SubtitleFormat) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!(
            "{:02}:{:02}:{:02}{}{:03}",
            hours,
            minutes,
            seconds,
            format.millis_separator(),
            millis
        )
    }

    /// Render the cue's timing line in the given format's syntax
    pub fn timing_line(&self, format: SubtitleFormat) -> String {
        format!(
            "{} --> {}",
            Self::format_timestamp(self.start_time_ms, format),
            Self::format_timestamp(self.end_time_ms, format)
        )
    }
}

/// An ordered cue sequence plus the format it was decoded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleDocument {
    /// Format the source text was written in
    pub format: SubtitleFormat,

    /// Cues in display order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleDocument {
    /// Classify raw subtitle text by header and timestamp syntax
    ///
    /// A document whose first non-blank line is the WebVTT banner is VTT;
    /// otherwise the text is scanned for an SRT timing line. Anything
    /// ambiguous counts as VTT.
    pub fn detect_format(content: &str) -> SubtitleFormat {
        if let Some(first) = content.lines().map(str::trim).find(|l| !l.is_empty()) {
            if first.starts_with("WEBVTT") {
                return SubtitleFormat::Vtt;
            }
        }

        if content
            .lines()
            .any(|line| SRT_TIMING_REGEX.is_match(line.trim()))
        {
            return SubtitleFormat::Srt;
        }

        SubtitleFormat::Vtt
    }

    /// Decode raw subtitle text into an ordered cue sequence
    ///
    /// Tolerates a leading `WEBVTT` banner, blank separator lines, NOTE /
    /// STYLE / REGION annotation blocks (skipped wholesale), and optional
    /// numeric index lines before each timing line. A cue starts at a line
    /// matching either timestamp syntax; every following non-blank line is
    /// accumulated as that cue's text until the next blank line or timing
    /// line. Fails with `SubtitleError::NoCues` when nothing is recoverable.
    pub fn parse(
        content: &str,
        format_hint: Option<SubtitleFormat>,
    ) -> Result<Self, SubtitleError> {
        let mut entries: Vec<SubtitleEntry> = Vec::new();

        let mut pending_times: Option<(u64, u64)> = None;
        let mut current_text = String::new();
        let mut in_annotation = false;
        let mut saw_banner = false;
        let mut saw_content = false;

        for line in content.lines() {
            let trimmed = line.trim();

            // Annotation blocks run until the next blank line
            if in_annotation {
                if trimmed.is_empty() {
                    in_annotation = false;
                }
                continue;
            }

            if trimmed.is_empty() {
                Self::finish_cue(&mut entries, &mut pending_times, &mut current_text);
                continue;
            }

            if !saw_content && trimmed.starts_with("WEBVTT") {
                saw_banner = true;
                saw_content = true;
                continue;
            }
            saw_content = true;

            if pending_times.is_none()
                && (trimmed.starts_with("NOTE") || trimmed == "STYLE" || trimmed == "REGION")
            {
                in_annotation = true;
                continue;
            }

            if let Some(caps) = VTT_TIMING_REGEX
                .captures(trimmed)
                .or_else(|| SRT_TIMING_REGEX.captures(trimmed))
            {
                // A timing line with a cue still open means the blank
                // separator was missing; close the previous cue first.
                Self::finish_cue(&mut entries, &mut pending_times, &mut current_text);

                match (
                    Self::captured_timestamp(&caps, 1),
                    Self::captured_timestamp(&caps, 5),
                ) {
                    (Ok(start_ms), Ok(end_ms)) => {
                        pending_times = Some((start_ms, end_ms));
                    }
                    _ => {
                        warn!("Skipping cue with unparseable timing line: {}", trimmed);
                    }
                }
                continue;
            }

            // A digits-only line at a cue boundary is an index line; inside
            // a cue's text block it is legitimate display text.
            if pending_times.is_none() && trimmed.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }

            if pending_times.is_some() {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(trimmed);
            } else {
                warn!("Ignoring stray line outside any cue: {}", trimmed);
            }
        }

        Self::finish_cue(&mut entries, &mut pending_times, &mut current_text);

        if entries.is_empty() {
            return Err(SubtitleError::NoCues);
        }

        // Sort by start time and renumber sequentially
        entries.sort_by_key(|entry| entry.start_time_ms);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }

        let format = format_hint.unwrap_or_else(|| {
            if saw_banner {
                SubtitleFormat::Vtt
            } else if content
                .lines()
                .any(|line| SRT_TIMING_REGEX.is_match(line.trim()))
            {
                SubtitleFormat::Srt
            } else {
                SubtitleFormat::Vtt
            }
        });

        Ok(SubtitleDocument { format, entries })
    }

    /// Encode the document back to text in its own format
    pub fn render(&self) -> String {
        self.render_as(self.format)
    }

    /// Encode the document in the given format
    ///
    /// Emits the banner for VTT, then each cue as a 1-based index line, a
    /// timing line, the text block, and a blank separator. The output is
    /// re-parseable by `parse`.
    pub fn render_as(&self, format: SubtitleFormat) -> String {
        let mut out = String::new();

        if format == SubtitleFormat::Vtt {
            out.push_str("WEBVTT\n\n");
        }

        for (i, entry) in self.entries.iter().enumerate() {
            out.push_str(&format!("{}\n", i + 1));
            out.push_str(&entry.timing_line(format));
            out.push('\n');
            out.push_str(&entry.text);
            out.push_str("\n\n");
        }

        out
    }

    /// Number of cues in the document
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document holds no cues
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Close the currently open cue, if any, keeping only valid ones
    fn finish_cue(
        entries: &mut Vec<SubtitleEntry>,
        pending_times: &mut Option<(u64, u64)>,
        current_text: &mut String,
    ) {
        if let Some((start_ms, end_ms)) = pending_times.take() {
            let seq_num = entries.len() + 1;
            match SubtitleEntry::new_validated(seq_num, start_ms, end_ms, current_text.clone()) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping invalid subtitle cue: {}", e),
            }
        }
        current_text.clear();
    }

    /// Read one timestamp out of a timing-line capture
    fn captured_timestamp(caps: &regex::Captures, start_idx: usize) -> Result<u64, SubtitleError> {
        let field = |idx: usize| -> u64 {
            caps.get(start_idx + idx)
                .map_or(0, |m| m.as_str().parse().unwrap_or(0))
        };

        let (hours, minutes, seconds, millis) = (field(0), field(1), field(2), field(3));
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(SubtitleError::InvalidTimestamp(
                caps.get(0).map_or("", |m| m.as_str()).to_string(),
            ));
        }

        Ok((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Document")?;
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Cues: {}", self.entries.len())?;
        Ok(())
    }
}
