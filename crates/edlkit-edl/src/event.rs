//! Event and marker records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Note prefix the authoring tool uses to record the source clip name.
pub const CLIP_NAME_PREFIX: &str = "* FROM CLIP NAME: ";

/// Number of leading characters of each marker field holding a field tag.
const MARKER_TAG_WIDTH: usize = 2;

/// A colored marker annotation attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Color tag, e.g. `ResolveColorBlue`
    pub color: String,
    /// Free-text label
    pub name: String,
    /// Inclusive frame count, kept as written
    pub duration: String,
}

impl Marker {
    /// Build a marker from raw pipe-delimited fields.
    ///
    /// Each field carries a two-character tag (`C:`, `M:`, `D:`) which is
    /// discarded along with surrounding whitespace.
    pub fn from_raw(color: &str, name: &str, duration: &str) -> Self {
        Self {
            color: strip_tag(color),
            name: strip_tag(name),
            duration: strip_tag(duration),
        }
    }

    /// True for the placeholder carried when marker extraction is disabled.
    pub fn is_empty(&self) -> bool {
        self.color.is_empty() && self.name.is_empty() && self.duration.is_empty()
    }
}

fn strip_tag(field: &str) -> String {
    let start = field
        .char_indices()
        .nth(MARKER_TAG_WIDTH)
        .map_or(field.len(), |(i, _)| i);
    field[start..].trim().to_string()
}

/// One edit decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event number as written (not renumbered)
    pub event_number: String,
    /// Source reel
    pub reel_name: String,
    /// Track/channel token (V, A, AA/V, ...)
    pub channel: String,
    /// Transition token (C, D, W...)
    pub transition: String,
    /// Source in timecode
    pub source_in: String,
    /// Source out timecode
    pub source_out: String,
    /// Record in timecode
    pub record_in: String,
    /// Record out timecode
    pub record_out: String,
    /// Marker extracted from the notes (placeholder if extraction is off)
    pub marker: Marker,
    /// Comment lines following the event line
    pub notes: Vec<String>,
}

impl Event {
    /// Number of whitespace-separated fields on an event line.
    pub const FIELD_COUNT: usize = 8;

    /// Build an event from exactly [`Event::FIELD_COUNT`] tokens.
    ///
    /// Returns `None` on any other token count.
    pub fn from_fields(fields: &[&str], marker: Marker, notes: Vec<String>) -> Option<Self> {
        let [event_number, reel_name, channel, transition, source_in, source_out, record_in, record_out] =
            fields
        else {
            return None;
        };

        Some(Self {
            event_number: event_number.to_string(),
            reel_name: reel_name.to_string(),
            channel: channel.to_string(),
            transition: transition.to_string(),
            source_in: source_in.to_string(),
            source_out: source_out.to_string(),
            record_in: record_in.to_string(),
            record_out: record_out.to_string(),
            marker,
            notes,
        })
    }

    /// Source clip name from a `* FROM CLIP NAME: ` note, if present.
    pub fn clip_name(&self) -> Option<&str> {
        self.notes
            .iter()
            .find_map(|note| note.strip_prefix(CLIP_NAME_PREFIX))
    }

    /// Source timecode pair.
    pub fn source_range(&self) -> (&str, &str) {
        (&self.source_in, &self.source_out)
    }

    /// Record timecode pair.
    pub fn record_range(&self) -> (&str, &str) {
        (&self.record_in, &self.record_out)
    }
}

/// Canonical event line with the fixed CMX3600 column spacing.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}     {}     {}        {} {} {} {}",
            self.event_number,
            self.reel_name,
            self.channel,
            self.transition,
            self.source_in,
            self.source_out,
            self.record_in,
            self.record_out
        )
    }
}
