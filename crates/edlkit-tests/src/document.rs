//! Integration tests for parsing, offsetting and writing EDL documents.
//!
//! Exercises edlkit-core timecode conversion through edlkit-edl documents,
//! including reading and writing real files.

use std::io::Write;

use edlkit_core::{tc_to_frames, EdlError, FrameRate};
use edlkit_edl::{parse_str, DocumentOptions, EdlDocument, Event, Offset, TimecodeKind};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────

const EPISODE: &str = "\
TITLE: SHOW_101_LOCKED
FCM: NON-DROP FRAME

001  AX       V     C        00:00:00:00 00:00:10:00 01:00:00:00 01:00:10:00
* FROM CLIP NAME: Recap.mov
RECAP |C:ResolveColorBlue |M:Previously On |D:240

002  AX       V     C        00:00:00:00 00:00:05:00 01:00:10:00 01:00:15:00
* FROM CLIP NAME: Titles.mov
 |C:ResolveColorCyan |M:Main Title |D:120

003  BX       V     C        00:10:00:00 00:10:20:00 01:00:15:00 01:00:35:00
* FROM CLIP NAME: Act1.mov
 |C:ResolveColorGreen |M:Next Time |D:480
";

fn write_edl(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".edl")
        .tempfile()
        .unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn options_24() -> DocumentOptions {
    DocumentOptions::new().with_frame_rate(FrameRate::FPS_24)
}

/// Events equal on every field but the marker. Blank notes are dropped on
/// read, so they are ignored here.
fn same_edit(a: &Event, b: &Event) -> bool {
    let notes = |e: &Event| -> Vec<String> {
        e.notes.iter().filter(|n| !n.is_empty()).cloned().collect()
    };
    a.event_number == b.event_number
        && a.reel_name == b.reel_name
        && a.channel == b.channel
        && a.transition == b.transition
        && a.source_range() == b.source_range()
        && a.record_range() == b.record_range()
        && notes(a) == notes(b)
}

// ── File round trips ───────────────────────────────────────────

#[test]
fn open_reads_header_events_and_name() {
    let file = write_edl(EPISODE);
    let doc = EdlDocument::open(file.path(), options_24()).unwrap();

    assert_eq!(doc.header().len(), 2);
    assert_eq!(doc.current_events().len(), 3);
    assert!(doc.name().ends_with(".edl"));
    assert_eq!(doc.path(), Some(file.path()));
    assert_eq!(doc.current_events()[2].clip_name(), Some("Act1.mov"));
}

#[test]
fn crlf_and_trailing_whitespace_are_normalised() {
    let text = EPISODE.replace('\n', "  \r\n");
    let file = write_edl(&text);
    let doc = EdlDocument::open(file.path(), options_24()).unwrap();
    let reference = EdlDocument::parse_str("ref.edl", EPISODE, options_24()).unwrap();
    assert_eq!(doc.current_events(), reference.current_events());
}

#[test]
fn write_then_reopen_without_markers() {
    let input = write_edl(EPISODE);
    let doc = EdlDocument::open(input.path(), options_24()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.edl");
    doc.write(&out).unwrap();

    let reopened = EdlDocument::open(&out, options_24()).unwrap();
    assert_eq!(reopened.header(), doc.header());
    assert_eq!(reopened.current_events(), doc.current_events());
}

#[test]
fn write_then_reopen_with_markers_keeps_stripped_notes() {
    let options = options_24().with_markers(true);
    let doc = EdlDocument::parse_str("ep.edl", EPISODE, options).unwrap();
    assert_eq!(doc.current_events()[0].notes[1], "RECAP");

    // The marker suffix is not written back, so re-read without extraction.
    let reparsed = parse_str(&doc.render(), false).unwrap();
    assert_eq!(reparsed.header, doc.header());
    assert_eq!(reparsed.events.len(), doc.current_events().len());
    for (a, b) in reparsed.events.iter().zip(doc.current_events()) {
        assert!(same_edit(a, b), "{a:?} != {b:?}");
    }
}

#[test]
fn offset_document_written_and_reread() {
    let mut doc = EdlDocument::parse_str("ep.edl", EPISODE, options_24()).unwrap();
    doc.offset_backward(&Offset::timecode("01:00:00:00"), false)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("offset.edl");
    doc.write(&out).unwrap();

    let reopened = EdlDocument::open(&out, options_24()).unwrap();
    assert_eq!(
        reopened.timecodes(TimecodeKind::Record)[0],
        ("00:00:00:00", "00:00:10:00")
    );
    assert_eq!(
        reopened.timecodes(TimecodeKind::Source)[2],
        ("00:10:00:00", "00:10:20:00")
    );
}

// ── Failure reporting ──────────────────────────────────────────

#[test]
fn malformed_event_line_fails_open() {
    let text = "TITLE: X\n001  AX  V  C  00:00:00:00 00:00:01:00 01:00:00:00\n";
    let file = write_edl(text);
    let err = EdlDocument::open(file.path(), options_24()).unwrap_err();
    assert!(matches!(err, EdlError::MalformedEvent { found: 7, .. }));
}

#[test]
fn malformed_event_reports_file_line_after_blank_lines() {
    let text = "TITLE: X\n\n\n001  AX  V  C  00:00:00:00 00:00:01:00 01:00:00:00\n";
    let file = write_edl(text);
    let err = EdlDocument::open(file.path(), options_24()).unwrap_err();
    assert!(matches!(err, EdlError::MalformedEvent { line: 4, found: 7, .. }));
}

#[test]
fn missing_marker_fails_open_when_extraction_enabled() {
    let text = "001  AX  V  C  00:00:00:00 00:00:01:00 01:00:00:00 01:00:01:00\n* plain\n";
    let file = write_edl(text);
    let err = EdlDocument::open(file.path(), options_24().with_markers(true)).unwrap_err();
    assert!(matches!(err, EdlError::MalformedMarker(_)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EdlDocument::open(dir.path().join("absent.edl"), options_24()).unwrap_err();
    assert!(matches!(err, EdlError::Io(_)));
}

#[test]
fn rate_set_after_construction_enables_offsets() {
    let mut doc = EdlDocument::parse_str("ep.edl", EPISODE, DocumentOptions::new()).unwrap();
    assert!(matches!(
        doc.offset_forward(&Offset::frames(1), false),
        Err(EdlError::FrameRateUnset)
    ));

    doc.set_frame_rate(FrameRate::FPS_24);
    doc.offset_forward(&Offset::frames(1), false).unwrap();
    assert_eq!(doc.current_events()[0].record_in, "01:00:00:01");
}

// ── Offset properties ──────────────────────────────────────────

fn episode(rate: FrameRate, drop_frame: bool) -> EdlDocument {
    let options = DocumentOptions::new()
        .with_frame_rate(rate)
        .with_drop_frame(drop_frame);
    EdlDocument::parse_str("ep.edl", EPISODE, options).unwrap()
}

proptest! {
    #[test]
    fn forward_then_backward_restores_timecodes(offset in 0u64..500_000, source in any::<bool>()) {
        let mut doc = episode(FrameRate::FPS_24, false);
        doc.offset_forward(&Offset::frames(offset), source).unwrap();
        doc.offset_backward(&Offset::frames(offset), source).unwrap();
        prop_assert_eq!(doc.current_events(), doc.original_events());
    }

    #[test]
    fn backward_then_forward_restores_without_clamping(offset in 0u64..=86_400) {
        // Smallest record timecode is 01:00:00:00 = 86400 frames at 24 fps.
        let mut doc = episode(FrameRate::FPS_24, false);
        doc.offset_backward(&Offset::frames(offset), false).unwrap();
        doc.offset_forward(&Offset::frames(offset), false).unwrap();
        prop_assert_eq!(doc.current_events(), doc.original_events());
    }

    #[test]
    fn backward_never_goes_below_zero(offset in 0u64..10_000_000) {
        let mut doc = episode(FrameRate::FPS_25, false);
        doc.offset_backward(&Offset::frames(offset), true).unwrap();
        for (original, current) in doc.original_events().iter().zip(doc.current_events()) {
            let before = tc_to_frames(&original.record_in, FrameRate::FPS_25).unwrap();
            let after = tc_to_frames(&current.record_in, FrameRate::FPS_25).unwrap();
            prop_assert_eq!(after, before.saturating_sub(offset));
        }
    }

    #[test]
    fn reset_discards_any_offsets(steps in proptest::collection::vec((any::<bool>(), 0u64..200_000), 0..8)) {
        let mut doc = episode(FrameRate::FPS_29_97, true);
        for (forward, amount) in steps {
            let amount = Offset::frames(amount);
            if forward {
                doc.offset_forward(&amount, true).unwrap();
            } else {
                doc.offset_backward(&amount, true).unwrap();
            }
        }
        doc.reset();
        prop_assert_eq!(doc.current_events(), doc.original_events());
        doc.reset();
        prop_assert_eq!(doc.current_events(), doc.original_events());
        prop_assert!(!doc.is_offset());
    }
}

#[test]
fn drop_frame_offsets_round_trip_after_first_pass() {
    // 01:00:00:00 counted non-drop is 108000 frames, which labels as
    // 01:00:03;18 in drop-frame. After that first pass pairs are exact.
    let mut doc = episode(FrameRate::FPS_29_97, true);
    doc.offset_forward(&Offset::frames(0), true).unwrap();
    let normalised = doc.current_events().to_vec();

    doc.offset_forward(&Offset::timecode("00:10:00;00"), true)
        .unwrap();
    assert_eq!(doc.current_events()[0].record_in, "01:10:03;18");
    doc.offset_backward(&Offset::timecode("00:10:00;00"), true)
        .unwrap();
    assert_eq!(doc.current_events(), normalised.as_slice());
}
