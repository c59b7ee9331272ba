use super::*;
use crate::config::RunConfig;
use crate::process::{CommandError, CommandOutput};
use std::sync::Mutex;

#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<ExternalCommand>>,
    fail: bool,
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &ExternalCommand) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(cmd.clone());
        if self.fail {
            return Err(CommandError::Timeout {
                program: cmd.program.clone(),
                after: std::time::Duration::from_secs(1),
            });
        }
        Ok(CommandOutput::default())
    }
}

fn track(secs: f64) -> AudioTrack {
    AudioTrack {
        path: PathBuf::from("/s/audio/audio.wav"),
        duration_secs: secs,
    }
}

#[test]
fn mux_command_matches_profile_settings() {
    let muxer = FfmpegMuxer::new(
        Arc::new(RecordingRunner::default()),
        "ffmpeg",
        RunConfig::default().encode,
    );
    let audio = track(2.0);
    let req = MuxRequest {
        frames_dir: Path::new("/s/frames"),
        frame_count: 20,
        fps: 12,
        audio: &audio,
        out_path: Path::new("/out/SEPHIROTH_V10_LOFI_void.mov"),
    };
    assert_eq!(
        muxer.command(&req).display_line(),
        "ffmpeg -y -framerate 12 -i /s/frames/frame_%05d.png -i /s/audio/audio.wav \
         -c:v libx264 -preset veryfast -crf 32 -pix_fmt yuv420p -c:a aac -b:a 64k \
         -shortest /out/SEPHIROTH_V10_LOFI_void.mov"
    );
}

#[test]
fn mux_reports_shortest_duration() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(RecordingRunner::default());
    let muxer = FfmpegMuxer::new(runner.clone(), "ffmpeg", RunConfig::default().encode);
    let audio = track(1.5);
    let out = dir.path().join("nested/out.mov");
    let req = MuxRequest {
        frames_dir: dir.path(),
        frame_count: 20,
        fps: 10,
        audio: &audio,
        out_path: &out,
    };
    let res = muxer.mux(&req).unwrap();
    assert_eq!(res.path, out);
    assert_eq!(res.planned_duration_secs, 1.5);
    assert!(out.parent().unwrap().is_dir());
    assert_eq!(runner.calls.lock().unwrap().len(), 1);
    assert_eq!(req.video_secs(), 2.0);
}

#[test]
fn mux_failure_is_an_external_process_error() {
    let dir = tempfile::tempdir().unwrap();
    let muxer = FfmpegMuxer::new(
        Arc::new(RecordingRunner {
            fail: true,
            ..Default::default()
        }),
        "ffmpeg",
        RunConfig::default().encode,
    );
    let audio = track(1.0);
    let out = dir.path().join("o.mov");
    let req = MuxRequest {
        frames_dir: dir.path(),
        frame_count: 1,
        fps: 1,
        audio: &audio,
        out_path: &out,
    };
    let err = muxer.mux(&req).unwrap_err();
    assert!(matches!(err.command_error(), Some(CommandError::Timeout { .. })));

    let empty = MuxRequest {
        frame_count: 0,
        ..req
    };
    assert!(matches!(muxer.mux(&empty), Err(SignalError::Validation(_))));
}

#[test]
fn planned_duration_is_min_of_streams() {
    assert_eq!(planned_duration_secs(20, 10, 5.0), 2.0);
    assert_eq!(planned_duration_secs(20, 10, 1.25), 1.25);
    assert_eq!(planned_duration_secs(20, 0, 5.0), 0.0);
    assert_eq!(planned_duration_secs(20, 10, -1.0), 0.0);
}

#[test]
fn output_names_are_sanitized() {
    assert_eq!(
        output_file_name("SEPHIROTH_V10_LOFI_", "void", "mov"),
        "SEPHIROTH_V10_LOFI_void.mov"
    );
    assert_eq!(output_file_name("P_", "a/b c..d", "mov"), "P_a_b_c__d.mov");
    assert_eq!(output_file_name("P_", "well-known_1", "mp4"), "P_well-known_1.mp4");
    assert_eq!(output_file_name("P_", "", "mov"), "P_untitled.mov");
}
