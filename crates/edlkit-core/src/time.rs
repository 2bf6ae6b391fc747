//! Frame rates and SMPTE timecode conversion.
//!
//! Timecodes are `HH:MM:SS:FF` strings. A `;` (or `,`) before the frame field
//! marks drop-frame counting, which only has an effect at the NTSC rates
//! (29.97 and 59.94 fps). Conversions go through absolute frame counts.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EdlError, Result};

/// Frame separator used for non-drop-frame timecode.
pub const NDF_SEPARATOR: char = ':';

/// Frame separator used for drop-frame timecode.
pub const DF_SEPARATOR: char = ';';

/// Frame rate as a rational number (e.g., 24000/1001 for 23.976 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 24000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Integer timebase used for timecode labels (30 for 29.97, 24 for 23.976).
    ///
    /// Never zero; a degenerate rate counts as 1 fps.
    pub fn nominal_fps(self) -> u32 {
        if self.numerator == 0 || self.denominator == 0 {
            return 1;
        }
        let exact = Rational64::new(self.numerator as i64, self.denominator as i64);
        exact.round().to_integer().max(1) as u32
    }

    /// True for the NTSC rates where drop-frame labels are defined.
    pub fn supports_drop_frame(self) -> bool {
        let nominal = self.nominal_fps();
        self.denominator == 1001 && (nominal == 30 || nominal == 60)
    }

    /// Frame labels skipped at the start of each non-tenth minute.
    #[inline]
    fn dropped_per_minute(self) -> u64 {
        self.nominal_fps() as u64 / 15
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_50: Self = Self::new(50, 1);
    pub const FPS_59_94: Self = Self::new(60000, 1001);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_24
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

impl FromStr for FrameRate {
    type Err = EdlError;

    /// Parses `"24"`, `"29.97"`, `"23.976"` or an explicit `"30000/1001"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || EdlError::InvalidParameter(format!("unrecognised frame rate '{}'", s));

        if let Some((num, den)) = s.split_once('/') {
            let numerator: u32 = num.trim().parse().map_err(|_| invalid())?;
            let denominator: u32 = den.trim().parse().map_err(|_| invalid())?;
            if numerator == 0 || denominator == 0 {
                return Err(invalid());
            }
            return Ok(Self::new(numerator, denominator));
        }

        let fps: f64 = s.parse().map_err(|_| invalid())?;
        if !fps.is_finite() || fps <= 0.0 {
            return Err(invalid());
        }
        if (fps - fps.round()).abs() < 1e-9 {
            return Ok(Self::new(fps.round() as u32, 1));
        }

        // Fractional rates are the x/1001 NTSC family.
        let nominal = (fps * 1.001).round();
        if (nominal / 1.001 - fps).abs() < 0.005 {
            Ok(Self::new(nominal as u32 * 1000, 1001))
        } else {
            Err(invalid())
        }
    }
}

fn parse_field(tc: &str, field: &str) -> Result<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EdlError::InvalidTimecode(tc.to_string()));
    }
    field
        .parse()
        .map_err(|_| EdlError::InvalidTimecode(tc.to_string()))
}

/// Convert a SMPTE timecode string to an absolute frame count.
///
/// The separator before the frame field selects drop-frame counting when the
/// rate supports it. Drop-frame labels skipped by the counting are rejected.
pub fn tc_to_frames(tc: &str, rate: FrameRate) -> Result<u64> {
    convert_timecode(tc, rate, false)
}

/// Like [`tc_to_frames`], but a skipped drop-frame label (`MM:00;00` on a
/// non-tenth minute) resolves to the next counted frame.
///
/// For timecodes whose separator was rewritten to `;` after the fact.
pub fn tc_to_frames_lenient(tc: &str, rate: FrameRate) -> Result<u64> {
    convert_timecode(tc, rate, true)
}

fn convert_timecode(tc: &str, rate: FrameRate, lenient: bool) -> Result<u64> {
    let invalid = || EdlError::InvalidTimecode(tc.to_string());

    let sep_at = tc
        .rfind(|c: char| matches!(c, ':' | ';' | '.' | ','))
        .ok_or_else(invalid)?;
    let separator = tc[sep_at..].chars().next().ok_or_else(invalid)?;
    let (head, frames) = (&tc[..sep_at], &tc[sep_at + 1..]);

    let mut parts = head.split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let hours = parse_field(tc, h)?;
    let minutes = parse_field(tc, m)?;
    let seconds = parse_field(tc, s)?;
    let mut frames = parse_field(tc, frames)?;

    let nominal = rate.nominal_fps() as u64;
    if minutes >= 60 || seconds >= 60 || frames >= nominal {
        return Err(invalid());
    }

    let drop_frame = matches!(separator, ';' | ',') && rate.supports_drop_frame();
    let dropped = if drop_frame {
        rate.dropped_per_minute()
    } else {
        0
    };
    if drop_frame && minutes % 10 != 0 && seconds == 0 && frames < dropped {
        // This label does not exist in drop-frame counting.
        if !lenient {
            return Err(invalid());
        }
        frames = dropped;
    }

    let total_minutes = hours
        .checked_mul(60)
        .and_then(|m| m.checked_add(minutes))
        .ok_or_else(invalid)?;
    let total = total_minutes
        .checked_mul(60)
        .and_then(|s| s.checked_add(seconds))
        .and_then(|s| s.checked_mul(nominal))
        .and_then(|f| f.checked_add(frames))
        .ok_or_else(invalid)?;

    // Every non-tenth minute holds at least `dropped` labels, so this cannot
    // underflow.
    Ok(total - dropped * (total_minutes - total_minutes / 10))
}

/// Convert an absolute frame count to a SMPTE timecode string.
///
/// Uses `;` as the frame separator when `drop_frame` is set. Hours are not
/// wrapped at 24. Fails with [`EdlError::InvalidParameter`] when the
/// drop-frame label of `frames` does not fit in a `u64`.
pub fn frames_to_tc(frames: u64, rate: FrameRate, drop_frame: bool) -> Result<String> {
    let nominal = rate.nominal_fps() as u64;
    let mut label = frames;

    if drop_frame && rate.supports_drop_frame() {
        let dropped = rate.dropped_per_minute();
        let per_ten_minutes = nominal * 600 - dropped * 9;
        let per_minute = nominal * 60 - dropped;

        let tens = frames / per_ten_minutes;
        let rem = frames % per_ten_minutes;
        let mut skipped = dropped * 9 * tens;
        if rem > dropped {
            skipped += dropped * ((rem - dropped) / per_minute);
        }
        label = frames.checked_add(skipped).ok_or_else(|| {
            EdlError::InvalidParameter(format!("frame count {} out of timecode range", frames))
        })?;
    }

    let hours = label / (nominal * 3600);
    let minutes = (label / (nominal * 60)) % 60;
    let seconds = (label / nominal) % 60;
    let ff = label % nominal;
    let separator = if drop_frame { DF_SEPARATOR } else { NDF_SEPARATOR };

    Ok(format!(
        "{:02}:{:02}:{:02}{}{:02}",
        hours, minutes, seconds, separator, ff
    ))
}
