//! edlkit EDL - CMX3600 edit decision lists
//!
//! Implements reading, transforming and writing EDLs:
//! - Events with their notes and colored markers
//! - A line-oriented parser for header, event and annotation regions
//! - Documents holding original and offset event lists, with reset
//! - Program segment metadata derived from marker colors
//! - Text output that the parser reads back to the same events

pub mod document;
pub mod event;
pub mod metadata;
pub mod options;
pub mod parser;
pub mod writer;

pub use document::{EdlDocument, Offset, TimecodeKind};
pub use event::{Event, Marker};
pub use metadata::{MarkerInconsistency, Metadata, Segment, SegmentRange};
pub use options::DocumentOptions;
pub use parser::{parse_lines, parse_str, ParsedEdl};
