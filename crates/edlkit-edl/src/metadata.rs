//! Program segment metadata derived from colored markers.
//!
//! Six marker colors identify the broadcast segments of an episode. Each
//! segment starts at the marked event's record-in and spans the marker's
//! inclusive duration.

use std::borrow::Cow;
use std::fmt;

use edlkit_core::{
    frames_to_tc, tc_to_frames, tc_to_frames_lenient, EdlError, FrameRate, Result, DF_SEPARATOR,
};
use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Byte offset of the frame separator in `HH:MM:SS:FF`.
const FRAME_SEPARATOR_INDEX: usize = 8;

/// A named program segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    PreviouslyOn,
    MainTitle,
    NextTimeOn,
    LivingCredits,
    EndCredits,
    Textless,
}

/// Marker color for each segment.
pub const SEGMENT_COLORS: [(&str, Segment); 6] = [
    ("ResolveColorBlue", Segment::PreviouslyOn),
    ("ResolveColorCyan", Segment::MainTitle),
    ("ResolveColorGreen", Segment::NextTimeOn),
    ("ResolveColorYellow", Segment::LivingCredits),
    ("ResolveColorRed", Segment::EndCredits),
    ("ResolveColorPink", Segment::Textless),
];

impl Segment {
    /// All segments in export order.
    pub const ALL: [Segment; 6] = [
        Segment::PreviouslyOn,
        Segment::MainTitle,
        Segment::NextTimeOn,
        Segment::LivingCredits,
        Segment::EndCredits,
        Segment::Textless,
    ];

    /// Segment for a marker color, if the color is mapped.
    pub fn from_color(color: &str) -> Option<Self> {
        SEGMENT_COLORS
            .iter()
            .find(|(c, _)| *c == color)
            .map(|(_, segment)| *segment)
    }

    /// Marker color that identifies this segment.
    pub fn color(self) -> &'static str {
        match self {
            Segment::PreviouslyOn => "ResolveColorBlue",
            Segment::MainTitle => "ResolveColorCyan",
            Segment::NextTimeOn => "ResolveColorGreen",
            Segment::LivingCredits => "ResolveColorYellow",
            Segment::EndCredits => "ResolveColorRed",
            Segment::Textless => "ResolveColorPink",
        }
    }

    /// Human-readable segment name.
    pub fn label(self) -> &'static str {
        match self {
            Segment::PreviouslyOn => "previously on",
            Segment::MainTitle => "main title",
            Segment::NextTimeOn => "next time on",
            Segment::LivingCredits => "living credits",
            Segment::EndCredits => "end credits",
            Segment::Textless => "textless",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `(start, end)` record timecodes of a segment; empty strings when unset.
pub type SegmentRange = (String, String);

/// Segment map for one EDL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Originating file name
    pub name: String,
    pub previously_on: SegmentRange,
    pub main_title: SegmentRange,
    pub next_time_on: SegmentRange,
    pub living_credits: SegmentRange,
    pub end_credits: SegmentRange,
    pub textless: SegmentRange,
}

/// A segment whose color is carried by a number of events other than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerInconsistency {
    pub segment: Segment,
    /// Number of events carrying the segment's color
    pub count: usize,
}

impl fmt::Display for MarkerInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' ({}) marked on {} events, expected 1",
            self.segment,
            self.segment.color(),
            self.count
        )
    }
}

impl Metadata {
    /// Empty metadata for a named file.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Range stored for a segment.
    pub fn segment(&self, segment: Segment) -> &SegmentRange {
        match segment {
            Segment::PreviouslyOn => &self.previously_on,
            Segment::MainTitle => &self.main_title,
            Segment::NextTimeOn => &self.next_time_on,
            Segment::LivingCredits => &self.living_credits,
            Segment::EndCredits => &self.end_credits,
            Segment::Textless => &self.textless,
        }
    }

    fn segment_mut(&mut self, segment: Segment) -> &mut SegmentRange {
        match segment {
            Segment::PreviouslyOn => &mut self.previously_on,
            Segment::MainTitle => &mut self.main_title,
            Segment::NextTimeOn => &mut self.next_time_on,
            Segment::LivingCredits => &mut self.living_credits,
            Segment::EndCredits => &mut self.end_credits,
            Segment::Textless => &mut self.textless,
        }
    }

    /// Build the segment map from events carrying colored markers.
    ///
    /// Events with unmapped colors are skipped. When a color repeats, the
    /// last event wins.
    ///
    /// A segment ends `duration - 1` frames after its record-in. A duration
    /// of `0` is treated like `1`, so the segment ends on its start frame
    /// rather than the frame before it.
    ///
    /// In drop-frame documents record-in is read as drop-frame whatever its
    /// separator; a label that drop-frame counting skips resolves to the
    /// next counted frame.
    pub fn derive(
        name: impl Into<String>,
        events: &[Event],
        rate: FrameRate,
        drop_frame: bool,
    ) -> Result<Self> {
        let mut metadata = Self::new(name);

        for event in events {
            let Some(segment) = Segment::from_color(&event.marker.color) else {
                continue;
            };

            let start = if drop_frame {
                tc_to_frames_lenient(&force_drop_frame_separator(&event.record_in), rate)?
            } else {
                tc_to_frames(&event.record_in, rate)?
            };

            let duration: u64 = event.marker.duration.parse().map_err(|_| {
                EdlError::MalformedMarker(format!(
                    "event {}: duration '{}' is not a frame count",
                    event.event_number, event.marker.duration
                ))
            })?;
            // Duration counts the start frame.
            let end_frame = start
                .checked_add(duration.saturating_sub(1))
                .ok_or_else(|| {
                    EdlError::MalformedMarker(format!(
                        "event {}: duration '{}' runs past the end of the timecode range",
                        event.event_number, event.marker.duration
                    ))
                })?;
            let end = frames_to_tc(end_frame, rate, drop_frame)?;

            *metadata.segment_mut(segment) = (event.record_in.clone(), end);
        }

        Ok(metadata)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EdlError::Serialization(format!("Failed to serialize metadata: {}", e)))
    }
}

/// One CSV line: `name,in-out,in-out,...` in segment order.
impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for segment in Segment::ALL {
            let (start, end) = self.segment(segment);
            write!(f, ",{}-{}", start, end)?;
        }
        Ok(())
    }
}

/// Segments whose color appears on zero or several events.
pub fn marker_inconsistencies(events: &[Event]) -> Vec<MarkerInconsistency> {
    Segment::ALL
        .into_iter()
        .filter_map(|segment| {
            let count = events
                .iter()
                .filter(|e| e.marker.color == segment.color())
                .count();
            (count != 1).then_some(MarkerInconsistency { segment, count })
        })
        .collect()
}

/// Source EDLs are inconsistent about the drop-frame separator of record-in;
/// force `;` before converting.
fn force_drop_frame_separator(tc: &str) -> Cow<'_, str> {
    if tc.len() <= FRAME_SEPARATOR_INDEX
        || !tc.is_char_boundary(FRAME_SEPARATOR_INDEX)
        || !tc.is_char_boundary(FRAME_SEPARATOR_INDEX + 1)
    {
        return Cow::Borrowed(tc);
    }
    let mut adjusted = tc.to_string();
    adjusted.replace_range(
        FRAME_SEPARATOR_INDEX..FRAME_SEPARATOR_INDEX + 1,
        DF_SEPARATOR.encode_utf8(&mut [0; 4]),
    );
    Cow::Owned(adjusted)
}
