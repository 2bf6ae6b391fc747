//! EDL document state and timecode offsets.
//!
//! A document keeps the events exactly as parsed and a working copy that
//! offsets are applied to. [`EdlDocument::reset`] rebuilds the working copy
//! from the parsed events, discarding every offset applied so far.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use edlkit_core::{frames_to_tc, tc_to_frames, EdlError, FrameRate, Result};
use tracing::{debug, info, warn};

use crate::event::Event;
use crate::metadata::{self, MarkerInconsistency, Metadata};
use crate::options::DocumentOptions;
use crate::parser::{self, ParsedEdl};
use crate::writer;

/// Amount of an offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offset {
    /// Literal frame count
    Frames(u64),
    /// SMPTE timecode, converted at the document's frame rate
    Timecode(String),
}

impl Offset {
    pub fn frames(frames: u64) -> Self {
        Offset::Frames(frames)
    }

    pub fn timecode(tc: impl Into<String>) -> Self {
        Offset::Timecode(tc.into())
    }

    fn to_frames(&self, rate: FrameRate) -> Result<u64> {
        match self {
            Offset::Frames(frames) => Ok(*frames),
            Offset::Timecode(tc) => tc_to_frames(tc, rate),
        }
    }
}

/// Which timecode pair of an event to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimecodeKind {
    #[default]
    Record,
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    /// Clamped at frame zero.
    Backward,
}

/// A parsed EDL with its original and current event lists.
#[derive(Debug, Clone)]
pub struct EdlDocument {
    name: String,
    path: Option<PathBuf>,
    options: DocumentOptions,
    header: Vec<String>,
    original_events: Arc<[Event]>,
    current_events: Vec<Event>,
    is_offset: bool,
}

impl EdlDocument {
    /// Read and parse an EDL file.
    pub fn open(path: impl AsRef<Path>, options: DocumentOptions) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening EDL");

        let lines = read_lines(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut document = Self::from_lines(name, &lines, options)?;
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Parse already-read lines.
    pub fn from_lines<S: AsRef<str>>(
        name: impl Into<String>,
        lines: &[S],
        options: DocumentOptions,
    ) -> Result<Self> {
        let parsed = parser::parse_lines(lines, options.resolve_markers)?;
        Ok(Self::from_parsed(name.into(), parsed, options))
    }

    /// Parse EDL text.
    pub fn parse_str(
        name: impl Into<String>,
        text: &str,
        options: DocumentOptions,
    ) -> Result<Self> {
        let parsed = parser::parse_str(text, options.resolve_markers)?;
        Ok(Self::from_parsed(name.into(), parsed, options))
    }

    fn from_parsed(name: String, parsed: ParsedEdl, options: DocumentOptions) -> Self {
        let original_events: Arc<[Event]> = parsed.events.into();
        Self {
            name,
            path: None,
            options,
            header: parsed.header,
            current_events: original_events.to_vec(),
            original_events,
            is_offset: false,
        }
    }

    /// File name the document was read from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn drop_frame(&self) -> bool {
        self.options.drop_frame
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Events exactly as parsed.
    pub fn original_events(&self) -> &[Event] {
        &self.original_events
    }

    /// Events with all offsets applied since the last reset.
    pub fn current_events(&self) -> &[Event] {
        &self.current_events
    }

    /// True once an offset has been applied since construction or reset.
    pub fn is_offset(&self) -> bool {
        self.is_offset
    }

    /// The frame rate, or [`EdlError::FrameRateUnset`].
    pub fn frame_rate(&self) -> Result<FrameRate> {
        self.options.frame_rate.ok_or(EdlError::FrameRateUnset)
    }

    /// Set the frame rate. Offsets computed at another rate are discarded.
    pub fn set_frame_rate(&mut self, rate: FrameRate) {
        self.options.frame_rate = Some(rate);
        self.reset();
    }

    /// Rebuild the current events from the original events.
    pub fn reset(&mut self) {
        self.current_events = self.original_events.to_vec();
        self.is_offset = false;
    }

    /// Add `amount` to every record timecode, and to source timecodes when
    /// `apply_to_source` is set.
    pub fn offset_forward(&mut self, amount: &Offset, apply_to_source: bool) -> Result<()> {
        self.apply_offset(amount, Direction::Forward, apply_to_source)
    }

    /// Subtract `amount` from every record timecode, and from source
    /// timecodes when `apply_to_source` is set. Fields floor at frame zero.
    pub fn offset_backward(&mut self, amount: &Offset, apply_to_source: bool) -> Result<()> {
        self.apply_offset(amount, Direction::Backward, apply_to_source)
    }

    fn apply_offset(
        &mut self,
        amount: &Offset,
        direction: Direction,
        apply_to_source: bool,
    ) -> Result<()> {
        let rate = self.frame_rate()?;
        let offset = amount.to_frames(rate)?;
        let drop_frame = self.options.drop_frame;
        let shift = |tc: &str| shift_timecode(tc, offset, direction, rate, drop_frame);

        // Build the whole replacement first so a bad timecode leaves the
        // current events untouched.
        let shifted = self
            .current_events
            .iter()
            .map(|event| {
                let mut event = event.clone();
                if apply_to_source {
                    event.source_in = shift(&event.source_in)?;
                    event.source_out = shift(&event.source_out)?;
                }
                event.record_in = shift(&event.record_in)?;
                event.record_out = shift(&event.record_out)?;
                Ok(event)
            })
            .collect::<Result<Vec<_>>>()?;

        self.current_events = shifted;
        self.is_offset = true;
        debug!(
            ?direction,
            offset,
            apply_to_source,
            events = self.current_events.len(),
            "Applied offset"
        );
        Ok(())
    }

    /// `(in, out)` pairs of the current events.
    pub fn timecodes(&self, kind: TimecodeKind) -> Vec<(&str, &str)> {
        self.current_events
            .iter()
            .map(|event| match kind {
                TimecodeKind::Record => event.record_range(),
                TimecodeKind::Source => event.source_range(),
            })
            .collect()
    }

    /// Current timecodes flattened as `in<delim>out<delim>in...`.
    pub fn timecodes_joined(&self, delim: &str, kind: TimecodeKind) -> String {
        self.timecodes(kind)
            .into_iter()
            .flat_map(|(tc_in, tc_out)| [tc_in, tc_out])
            .collect::<Vec<_>>()
            .join(delim)
    }

    /// Derive program segment metadata from the current events.
    ///
    /// Segments whose color is missing or repeated are logged, not rejected.
    pub fn metadata(&self) -> Result<Metadata> {
        let rate = self.frame_rate()?;
        for inconsistency in self.marker_inconsistencies() {
            warn!(file = %self.name, "{}", inconsistency);
        }
        Metadata::derive(
            self.name.clone(),
            &self.current_events,
            rate,
            self.options.drop_frame,
        )
    }

    /// Segments whose marker color is not carried by exactly one event.
    pub fn marker_inconsistencies(&self) -> Vec<MarkerInconsistency> {
        metadata::marker_inconsistencies(&self.current_events)
    }

    /// Render the header and current events as EDL text.
    pub fn render(&self) -> String {
        writer::render(&self.header, &self.current_events)
    }

    /// Write the header and current events to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        writer::write_to_file(path.as_ref(), &self.header, &self.current_events)
    }
}

fn shift_timecode(
    tc: &str,
    offset: u64,
    direction: Direction,
    rate: FrameRate,
    drop_frame: bool,
) -> Result<String> {
    let frames = tc_to_frames(tc, rate)?;
    let shifted = match direction {
        Direction::Forward => frames.checked_add(offset).ok_or_else(|| {
            EdlError::InvalidParameter(format!("offset of {} frames overflows {}", offset, tc))
        })?,
        Direction::Backward => frames.saturating_sub(offset),
    };
    frames_to_tc(shifted, rate, drop_frame)
}

/// Read an EDL file as right-trimmed lines.
///
/// Blank lines are kept so that line numbers in parse errors match the file;
/// the parser skips them.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text.lines().map(str::trim_end).map(str::to_string).collect())
}
