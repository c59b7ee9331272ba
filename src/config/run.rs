use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use rand::Rng;

use crate::config::profile::QualityProfile;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{SignalError, SignalResult};
use crate::process::CommandPolicy;

/// Inclusive range the run duration is drawn from, in whole seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DurationRange {
    /// Shortest allowed duration.
    pub min_secs: u32,
    /// Longest allowed duration.
    pub max_secs: u32,
}

impl DurationRange {
    /// A range containing exactly `secs`.
    pub fn fixed(secs: u32) -> Self {
        Self {
            min_secs: secs,
            max_secs: secs,
        }
    }

    /// Draw the run duration.
    pub fn pick(self, rng: &mut impl Rng) -> u32 {
        rng.gen_range(self.min_secs..=self.max_secs)
    }
}

/// Texture pool generation parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextureSettings {
    /// Number of textures pre-rendered once per run.
    pub pool_size: usize,
    /// Fewest line strokes per texture.
    pub lines_min: u32,
    /// Most line strokes per texture.
    pub lines_max: u32,
    /// Base brightness is drawn from `[0, base_max]`.
    pub base_max: u8,
    /// Line brightness is drawn from `[line_min_brightness, 255]`.
    pub line_min_brightness: u8,
    /// Stroke width in pixels.
    pub line_width: f64,
}

/// Per-frame layering parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerSettings {
    /// Frame base brightness is drawn from `[0, base_max]`.
    pub base_max: u8,
    /// Fewest texture pastes per frame.
    pub paste_min: u32,
    /// Most texture pastes per frame.
    pub paste_max: u32,
    /// Resize pasted textures to a random size before placing them.
    pub resize_pastes: bool,
    /// Smallest side of a resized paste, in pixels.
    pub min_paste_px: u32,
    /// Fewest text overlays per frame.
    pub text_min: u32,
    /// Most text overlays per frame.
    pub text_max: u32,
    /// Font size for overlays and the jumpscare text.
    pub text_size_px: f32,
    /// Horizontal room reserved for a line of text when picking its position.
    pub text_box_w: u32,
    /// Vertical room reserved for a line of text when picking its position.
    pub text_box_h: u32,
    /// Text gray level is drawn from `[text_min_brightness, 255]`.
    pub text_min_brightness: u8,
}

/// Parameters of the analog corruption transform.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorruptionParams {
    /// Additive noise is drawn from `[0, noise_amplitude)` per channel. `0` disables noise.
    pub noise_amplitude: u8,
    /// Probability that a frame gets a tracking shift.
    pub shift_probability: f64,
    /// Shift offsets are drawn from `[-max_shift_px, max_shift_px]`.
    pub max_shift_px: u32,
}

/// Full-frame flash override.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JumpscareSettings {
    /// Per-frame trigger probability.
    pub probability: f64,
    /// Fill color of the flash.
    pub flash: Rgba8,
    /// Warning drawn on the flash.
    pub text: String,
    /// Color of the warning text.
    pub text_color: Rgba8,
}

/// Container and codec options handed to the muxer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncodeSettings {
    /// ffmpeg video codec.
    pub video_codec: String,
    /// x264 preset.
    pub preset: String,
    /// Constant rate factor, `0..=51`.
    pub crf: u8,
    /// Output pixel format.
    pub pix_fmt: String,
    /// ffmpeg audio codec.
    pub audio_codec: String,
    /// Audio bitrate, e.g. `64k`.
    pub audio_bitrate: String,
    /// Container extension without the dot.
    pub container: String,
    /// Prefix of the output file name.
    pub output_prefix: String,
}

/// Speech and noise bed parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioSettings {
    /// espeak voice identifier.
    pub voice: String,
    /// Speaking rate in words per minute.
    pub speed_wpm: u32,
    /// espeak pitch, `0..=99`.
    pub pitch: u32,
    /// ffmpeg `anoisesrc` color.
    pub noise_color: String,
    /// Spoken message; `{keyword}` is replaced with the run keyword.
    pub message_template: String,
}

impl AudioSettings {
    /// Spoken warning for `keyword`.
    pub fn message_for(&self, keyword: &str) -> String {
        self.message_template.replace("{keyword}", keyword)
    }
}

/// External command programs, deadline, and retry policy.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSettings {
    /// ffmpeg executable.
    pub ffmpeg: String,
    /// espeak executable.
    pub espeak: String,
    /// Per-attempt deadline in seconds.
    pub timeout_secs: u64,
    /// Extra attempts after a failure.
    pub retries: u32,
    /// Base backoff between attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl CommandSettings {
    /// Policy for [`SystemRunner`](crate::SystemRunner).
    pub fn policy(&self) -> CommandPolicy {
        CommandPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            retries: self.retries,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

/// Threading and chunking controls for the frame loop.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderThreading {
    /// Render frames on a worker pool when `true`.
    pub parallel: bool,
    /// Worker count; `None` uses one per core.
    pub threads: Option<usize>,
    /// Frames rendered per batch before being handed to the sink.
    pub chunk_size: usize,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            chunk_size: 64,
        }
    }
}

/// Network sources for the keyword list and corpus enrichment.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSettings {
    /// When `false`, no request is made and builtin fallbacks are used.
    pub enabled: bool,
    /// Plain-text word list, one word per line.
    pub word_list_url: String,
    /// Summary endpoint; the keyword is appended.
    pub summary_url_base: String,
    /// Word list request deadline.
    pub lexicon_timeout_secs: u64,
    /// Summary request deadline.
    pub summary_timeout_secs: u64,
    /// The word list is truncated to this many entries.
    pub word_limit: usize,
}

/// Complete run configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Profile the defaults came from.
    pub profile: QualityProfile,
    /// Output frame size.
    pub canvas: Canvas,
    /// Frames per second.
    pub fps: u32,
    /// Range the run duration is drawn from.
    pub duration: DurationRange,
    /// Texture pool parameters.
    pub textures: TextureSettings,
    /// Per-frame layering parameters.
    pub layers: LayerSettings,
    /// Corruption parameters.
    pub corruption: CorruptionParams,
    /// Flash override parameters.
    pub jumpscare: JumpscareSettings,
    /// Encoder options.
    pub encode: EncodeSettings,
    /// Audio bed options.
    pub audio: AudioSettings,
    /// External command options.
    pub commands: CommandSettings,
    /// Frame loop threading.
    pub render: RenderThreading,
    /// Network sources.
    pub network: NetworkSettings,
    /// Font file for overlays. `None` searches system fonts.
    pub font_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::for_profile(QualityProfile::default())
    }
}

impl RunConfig {
    /// Defaults for `profile`.
    pub fn for_profile(profile: QualityProfile) -> Self {
        let n = profile.numbers();
        // Text and shift sizes scale with the canvas height (240 px is the reference).
        let scale = n.height / 240;
        Self {
            profile,
            canvas: Canvas {
                width: n.width,
                height: n.height,
            },
            fps: n.fps,
            duration: DurationRange {
                min_secs: 35,
                max_secs: 55,
            },
            textures: TextureSettings {
                pool_size: 25,
                lines_min: 10,
                lines_max: 30,
                base_max: 40,
                line_min_brightness: 100,
                line_width: 1.0,
            },
            layers: LayerSettings {
                base_max: 30,
                paste_min: 1,
                paste_max: 4,
                resize_pastes: true,
                min_paste_px: 50 * scale,
                text_min: 1,
                text_max: 6,
                text_size_px: 11.0 * scale as f32,
                text_box_w: 100 * scale,
                text_box_h: 10 * scale,
                text_min_brightness: 150,
            },
            corruption: CorruptionParams {
                noise_amplitude: 40,
                shift_probability: 0.25,
                max_shift_px: 20 * scale,
            },
            jumpscare: JumpscareSettings {
                probability: 0.02,
                flash: Rgba8::WHITE,
                text: "LOOK AWAY".to_string(),
                text_color: Rgba8::BLACK,
            },
            encode: EncodeSettings {
                video_codec: "libx264".to_string(),
                preset: n.preset.to_string(),
                crf: n.crf,
                pix_fmt: "yuv420p".to_string(),
                audio_codec: "aac".to_string(),
                audio_bitrate: n.audio_bitrate.to_string(),
                container: "mov".to_string(),
                output_prefix: n.output_prefix.to_string(),
            },
            audio: AudioSettings {
                voice: "en".to_string(),
                speed_wpm: 110,
                pitch: 40,
                noise_color: "pink".to_string(),
                message_template: "WARNING. ENTITY {keyword}. SIGNAL CONTAMINATED.".to_string(),
            },
            commands: CommandSettings {
                ffmpeg: "ffmpeg".to_string(),
                espeak: "espeak".to_string(),
                timeout_secs: 120,
                retries: 2,
                backoff_ms: 500,
            },
            render: RenderThreading::default(),
            network: NetworkSettings {
                enabled: true,
                word_list_url:
                    "https://raw.githubusercontent.com/dwyl/english-words/master/words.txt"
                        .to_string(),
                summary_url_base: "https://en.wikipedia.org/api/rest_v1/page/summary/"
                    .to_string(),
                lexicon_timeout_secs: 10,
                summary_timeout_secs: 5,
                word_limit: 15_000,
            },
            font_path: None,
        }
    }

    /// Resolve profile defaults with a JSON overlay.
    ///
    /// The overlay may set any subset of fields; nested objects are merged key by key. The
    /// profile is `profile` if given, else the overlay's `"profile"` key, else the default.
    pub fn from_json_overlay(
        profile: Option<QualityProfile>,
        overlay_json: &str,
    ) -> SignalResult<Self> {
        let mut overlay: serde_json::Value = serde_json::from_str(overlay_json)
            .map_err(|e| SignalError::validation(format!("invalid config json: {e}")))?;
        let Some(obj) = overlay.as_object_mut() else {
            return Err(SignalError::validation("config json must be an object"));
        };

        let file_profile = match obj.remove("profile") {
            Some(v) => Some(
                serde_json::from_value::<QualityProfile>(v)
                    .map_err(|e| SignalError::validation(format!("invalid profile: {e}")))?,
            ),
            None => None,
        };
        let profile = profile.or(file_profile).unwrap_or_default();

        let mut base = serde_json::to_value(Self::for_profile(profile))
            .map_err(|e| SignalError::validation(format!("config serialization failed: {e}")))?;
        merge_json(&mut base, overlay);
        serde_json::from_value(base)
            .map_err(|e| SignalError::validation(format!("invalid config: {e}")))
    }

    /// Resolve profile defaults with an optional JSON config file.
    pub fn resolve(profile: Option<QualityProfile>, path: Option<&Path>) -> SignalResult<Self> {
        match path {
            None => Ok(Self::for_profile(profile.unwrap_or_default())),
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read config '{}'", p.display()))?;
                Self::from_json_overlay(profile, &text)
            }
        }
    }

    /// Check every invariant the pipeline relies on.
    pub fn validate(&self) -> SignalResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            return Err(SignalError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        if self.fps == 0 {
            return Err(SignalError::validation("fps must be > 0"));
        }
        if self.duration.min_secs == 0 || self.duration.min_secs > self.duration.max_secs {
            return Err(SignalError::validation(
                "duration range must satisfy 0 < min_secs <= max_secs",
            ));
        }

        let t = &self.textures;
        if t.pool_size == 0 {
            return Err(SignalError::validation("texture pool_size must be > 0"));
        }
        check_range("texture lines", t.lines_min, t.lines_max)?;
        if !t.line_width.is_finite() || t.line_width <= 0.0 {
            return Err(SignalError::validation("texture line_width must be > 0"));
        }

        let l = &self.layers;
        check_range("paste count", l.paste_min, l.paste_max)?;
        check_range("text count", l.text_min, l.text_max)?;
        if l.min_paste_px == 0 {
            return Err(SignalError::validation("min_paste_px must be > 0"));
        }
        if !l.text_size_px.is_finite() || l.text_size_px <= 0.0 {
            return Err(SignalError::validation("text_size_px must be finite and > 0"));
        }

        check_probability("shift_probability", self.corruption.shift_probability)?;
        check_probability("jumpscare probability", self.jumpscare.probability)?;

        if self.encode.crf > 51 {
            return Err(SignalError::validation("crf must be in 0..=51"));
        }
        if self.encode.container.is_empty()
            || !self.encode.container.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(SignalError::validation(
                "container must be a non-empty alphanumeric extension",
            ));
        }
        if self.render.chunk_size == 0 {
            return Err(SignalError::validation("render chunk_size must be > 0"));
        }
        if self.render.threads == Some(0) {
            return Err(SignalError::validation(
                "render threads must be >= 1 when set",
            ));
        }
        if self.commands.timeout_secs == 0 {
            return Err(SignalError::validation("command timeout_secs must be > 0"));
        }
        Ok(())
    }
}

fn check_range(what: &str, min: u32, max: u32) -> SignalResult<()> {
    if min > max {
        return Err(SignalError::validation(format!(
            "{what} range must satisfy min <= max (got {min}..={max})"
        )));
    }
    Ok(())
}

fn check_probability(what: &str, p: f64) -> SignalResult<()> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(SignalError::validation(format!(
            "{what} must be within [0, 1] (got {p})"
        )));
    }
    Ok(())
}

fn merge_json(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(b), serde_json::Value::Object(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge_json(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/run.rs"]
mod tests;
