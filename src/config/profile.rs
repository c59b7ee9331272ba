use std::str::FromStr;

use crate::foundation::error::SignalError;

/// Named bundle of resolution, frame rate, and encoder quality.
///
/// Both profiles drive the same pipeline; only the numbers differ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityProfile {
    /// 360x240 @ 12 fps, heavy compression. Small files.
    #[default]
    Lofi,
    /// 720x480 @ 30 fps, moderate compression.
    Standard,
}

pub(crate) struct ProfileNumbers {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) fps: u32,
    pub(crate) crf: u8,
    pub(crate) preset: &'static str,
    pub(crate) audio_bitrate: &'static str,
    pub(crate) output_prefix: &'static str,
}

impl QualityProfile {
    pub(crate) fn numbers(self) -> ProfileNumbers {
        match self {
            QualityProfile::Lofi => ProfileNumbers {
                width: 360,
                height: 240,
                fps: 12,
                crf: 32,
                preset: "veryfast",
                audio_bitrate: "64k",
                output_prefix: "SEPHIROTH_V10_LOFI_",
            },
            QualityProfile::Standard => ProfileNumbers {
                width: 720,
                height: 480,
                fps: 30,
                crf: 23,
                preset: "medium",
                audio_bitrate: "128k",
                output_prefix: "SEPHIROTH_V10_",
            },
        }
    }

    /// Profile name as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            QualityProfile::Lofi => "lofi",
            QualityProfile::Standard => "standard",
        }
    }
}

impl FromStr for QualityProfile {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lofi" | "lo-fi" => Ok(QualityProfile::Lofi),
            "standard" | "std" => Ok(QualityProfile::Standard),
            other => Err(SignalError::validation(format!(
                "unknown quality profile '{other}' (expected 'lofi' or 'standard')"
            ))),
        }
    }
}
