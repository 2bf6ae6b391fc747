//! EDL text output.

use std::path::Path;

use edlkit_core::Result;
use tracing::info;

use crate::event::Event;

/// Render a header and events as EDL text.
///
/// Header lines, a blank line, then each event line followed by its notes
/// and a blank line.
pub fn render<S: AsRef<str>>(header: &[S], events: &[Event]) -> String {
    let mut out = String::new();
    for line in header {
        out.push_str(line.as_ref());
        out.push('\n');
    }
    out.push('\n');

    for event in events {
        out.push_str(&event.to_string());
        out.push('\n');
        for note in &event.notes {
            out.push_str(note);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Render to a buffer and write it to `path` in one call.
pub fn write_to_file<S: AsRef<str>>(path: &Path, header: &[S], events: &[Event]) -> Result<()> {
    let text = render(header, events);
    std::fs::write(path, text)?;
    info!(path = %path.display(), events = events.len(), "Wrote EDL");
    Ok(())
}
