//! Document options, loadable from JSON.

use edlkit_core::{EdlError, FrameRate, Result};
use serde::{Deserialize, Serialize};

/// Parameters fixed when an EDL document is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Frame rate; may also be set after construction
    pub frame_rate: Option<FrameRate>,
    /// Extract `|`-delimited markers from event notes
    pub resolve_markers: bool,
    /// Write drop-frame timecode
    pub drop_frame: bool,
}

impl DocumentOptions {
    /// Options with every feature off and no frame rate.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame_rate(mut self, rate: FrameRate) -> Self {
        self.frame_rate = Some(rate);
        self
    }

    pub fn with_markers(mut self, resolve_markers: bool) -> Self {
        self.resolve_markers = resolve_markers;
        self
    }

    pub fn with_drop_frame(mut self, drop_frame: bool) -> Self {
        self.drop_frame = drop_frame;
        self
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| EdlError::Serialization(format!("Invalid document options: {}", e)))
    }

    /// Serialize to pretty JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| EdlError::Serialization(format!("Failed to serialize options: {}", e)))
    }

    /// Load options from a JSON file.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}
