//! edlkit core - Foundation types for EDL processing
//!
//! This crate provides the pieces shared by every edlkit crate:
//! - The error taxonomy (`EdlError`)
//! - Frame rates and SMPTE timecode <-> frame count conversion

pub mod error;
pub mod time;

pub use error::{EdlError, Result};
pub use time::{
    frames_to_tc, tc_to_frames, tc_to_frames_lenient, FrameRate, DF_SEPARATOR, NDF_SEPARATOR,
};
