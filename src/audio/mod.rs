//! Spoken warning over a colored-noise bed, produced by external tools.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AudioSettings;
use crate::foundation::error::{SignalError, SignalResult};
use crate::process::{CommandRunner, ExternalCommand};

/// Finished audio file handed to the muxer.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    /// Mixed waveform file.
    pub path: PathBuf,
    /// Nominal length in seconds (the noise bed length).
    pub duration_secs: f64,
}

/// Produces one mixed track of speech over noise.
pub trait AudioSynthesizer: Send + Sync {
    /// Render `message` over a noise bed of `duration_secs`, writing files into `dir`.
    fn synthesize(&self, message: &str, duration_secs: u32, dir: &Path) -> SignalResult<AudioTrack>;
}

/// Synthesizer using `espeak` for speech and `ffmpeg` for noise and mixing.
pub struct CommandAudioSynth {
    runner: Arc<dyn CommandRunner>,
    espeak: String,
    ffmpeg: String,
    settings: AudioSettings,
}

impl CommandAudioSynth {
    /// Synthesizer running `espeak` and `ffmpeg` through `runner`.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        espeak: impl Into<String>,
        ffmpeg: impl Into<String>,
        settings: AudioSettings,
    ) -> Self {
        Self {
            runner,
            espeak: espeak.into(),
            ffmpeg: ffmpeg.into(),
            settings,
        }
    }

    /// `espeak -v <voice> -s <wpm> -p <pitch> -w <out> <message>`
    pub fn speech_command(&self, message: &str, out: &Path) -> ExternalCommand {
        ExternalCommand::new(self.espeak.clone())
            .arg("-v")
            .arg(self.settings.voice.as_str())
            .arg("-s")
            .arg(self.settings.speed_wpm.to_string())
            .arg("-p")
            .arg(self.settings.pitch.to_string())
            .arg("-w")
            .arg(out.as_os_str())
            .arg(message)
    }

    /// `ffmpeg -y -f lavfi -i anoisesrc=color=<color>:duration=<secs> <out>`
    pub fn noise_command(&self, duration_secs: u32, out: &Path) -> ExternalCommand {
        ExternalCommand::new(self.ffmpeg.clone())
            .args(["-y", "-f", "lavfi", "-i"])
            .arg(format!(
                "anoisesrc=color={}:duration={duration_secs}",
                self.settings.noise_color
            ))
            .arg(out.as_os_str())
    }

    /// `ffmpeg -y -i <noise> -i <speech> -filter_complex amix=inputs=2 <out>`
    pub fn mix_command(&self, noise: &Path, speech: &Path, out: &Path) -> ExternalCommand {
        ExternalCommand::new(self.ffmpeg.clone())
            .args(["-y", "-i"])
            .arg(noise.as_os_str())
            .arg("-i")
            .arg(speech.as_os_str())
            .args(["-filter_complex", "amix=inputs=2"])
            .arg(out.as_os_str())
    }
}

impl AudioSynthesizer for CommandAudioSynth {
    #[tracing::instrument(skip(self, message, dir))]
    fn synthesize(&self, message: &str, duration_secs: u32, dir: &Path) -> SignalResult<AudioTrack> {
        if duration_secs == 0 {
            return Err(SignalError::validation("audio duration must be > 0"));
        }
        std::fs::create_dir_all(dir).map_err(|e| {
            SignalError::resource(format!(
                "failed to create audio directory '{}': {e}",
                dir.display()
            ))
        })?;

        let speech = dir.join("speech.wav");
        let noise = dir.join("noise.wav");
        let mixed = dir.join("audio.wav");

        let speech_cmd = self.speech_command(message, &speech);
        let noise_cmd = self.noise_command(duration_secs, &noise);
        let (speech_res, noise_res) = rayon::join(
            || self.runner.run(&speech_cmd),
            || self.runner.run(&noise_cmd),
        );
        speech_res?;
        noise_res?;

        self.runner.run(&self.mix_command(&noise, &speech, &mixed))?;
        tracing::debug!(path = %mixed.display(), "audio track mixed");
        Ok(AudioTrack {
            path: mixed,
            duration_secs: f64::from(duration_secs),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mod.rs"]
mod tests;
