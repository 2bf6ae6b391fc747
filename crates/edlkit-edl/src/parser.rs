//! Line-oriented CMX3600 parser.
//!
//! A single forward pass over the input lines with three regions:
//! header lines before the first event, event lines (digit-led), and the
//! annotation lines that follow each event up to the next one.

use edlkit_core::{EdlError, Result};
use smallvec::SmallVec;
use tracing::debug;

use crate::event::{Event, Marker};

/// Delimiter separating the marker fields on an annotation line.
pub const MARKER_DELIMITER: char = '|';

/// Header and events read from an EDL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEdl {
    /// Raw lines before the first event
    pub header: Vec<String>,
    /// Events in file order
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Header,
    Annotation,
}

/// An event line and the annotation lines gathered after it so far.
struct PendingEvent<'a> {
    line: usize,
    fields: SmallVec<[&'a str; Event::FIELD_COUNT]>,
    annotations: Vec<String>,
}

impl PendingEvent<'_> {
    fn finish(self, resolve_markers: bool) -> Result<Event> {
        let (marker, notes) = if resolve_markers {
            extract_marker(self.line, self.annotations)?
        } else {
            (Marker::default(), self.annotations)
        };

        Event::from_fields(&self.fields, marker, notes).ok_or(EdlError::MalformedEvent {
            line: self.line,
            found: self.fields.len(),
            expected: Event::FIELD_COUNT,
        })
    }
}

/// True when a line opens a new event.
pub fn is_event_line(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Parse EDL lines into a header and an ordered event list.
///
/// Blank lines are skipped. With `resolve_markers` set, every event must
/// carry exactly one marker line in its notes; the marker fields are removed
/// from that line and the text before the delimiter is kept as a note.
pub fn parse_lines<S: AsRef<str>>(lines: &[S], resolve_markers: bool) -> Result<ParsedEdl> {
    let mut parsed = ParsedEdl::default();
    let mut state = ParseState::Header;
    let mut pending: Option<PendingEvent<'_>> = None;

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        if is_event_line(line) {
            if let Some(event) = pending.take() {
                parsed.events.push(event.finish(resolve_markers)?);
            }

            let fields: SmallVec<[&str; Event::FIELD_COUNT]> =
                line.split(' ').filter(|t| !t.is_empty()).collect();
            if fields.len() != Event::FIELD_COUNT {
                return Err(EdlError::MalformedEvent {
                    line: index + 1,
                    found: fields.len(),
                    expected: Event::FIELD_COUNT,
                });
            }

            pending = Some(PendingEvent {
                line: index + 1,
                fields,
                annotations: Vec::new(),
            });
            state = ParseState::Annotation;
            continue;
        }

        match state {
            ParseState::Header => parsed.header.push(line.to_string()),
            ParseState::Annotation => {
                if let Some(event) = pending.as_mut() {
                    event.annotations.push(line.to_string());
                }
            }
        }
    }

    if let Some(event) = pending.take() {
        parsed.events.push(event.finish(resolve_markers)?);
    }

    debug!(
        header_lines = parsed.header.len(),
        events = parsed.events.len(),
        resolve_markers,
        "Parsed EDL"
    );
    Ok(parsed)
}

/// Parse EDL text, splitting it into lines first.
pub fn parse_str(text: &str, resolve_markers: bool) -> Result<ParsedEdl> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    parse_lines(&lines, resolve_markers)
}

/// Pull the marker out of an event's annotation lines.
fn extract_marker(line: usize, annotations: Vec<String>) -> Result<(Marker, Vec<String>)> {
    let mut candidates = annotations
        .iter()
        .filter(|note| note.contains(MARKER_DELIMITER));

    let raw = match (candidates.next(), candidates.next()) {
        (Some(raw), None) => raw,
        (None, _) => {
            return Err(EdlError::MalformedMarker(format!(
                "event on line {}: no '{}' delimited marker in notes",
                line, MARKER_DELIMITER
            )))
        }
        (Some(_), Some(_)) => {
            return Err(EdlError::MalformedMarker(format!(
                "event on line {}: more than one marker line in notes",
                line
            )))
        }
    };

    // Scoped so the borrow of `annotations` ends before they are consumed.
    let marker = {
        let fields: SmallVec<[&str; 3]> = raw.split(MARKER_DELIMITER).skip(1).collect();
        let [color, name, duration] = fields.as_slice() else {
            return Err(EdlError::MalformedMarker(format!(
                "event on line {}: expected 3 marker fields, found {}",
                line,
                fields.len()
            )));
        };
        Marker::from_raw(color, name, duration)
    };

    let notes = annotations
        .into_iter()
        .map(|note| match note.split_once(MARKER_DELIMITER) {
            Some((text, _)) => text.trim().to_string(),
            None => note,
        })
        .collect();

    Ok((marker, notes))
}
