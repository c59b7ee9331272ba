use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SignalError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SignalError::render("x").to_string().contains("render error:"));
    assert!(
        SignalError::resource("x")
            .to_string()
            .contains("resource error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SignalError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn stage_wrapping_reports_stage_and_command() {
    let err = SignalError::from(CommandError::NonZeroExit {
        program: "ffmpeg".to_string(),
        status: Some(1),
        stderr: "bad input".to_string(),
    })
    .at_stage(Stage::Muxed);

    assert_eq!(err.stage(), Some(Stage::Muxed));
    assert_eq!(err.command_error().map(|c| c.program()), Some("ffmpeg"));
    let msg = err.to_string();
    assert!(msg.contains("muxing"), "{msg}");
    assert!(msg.contains("ffmpeg"), "{msg}");
}

#[test]
fn stage_wrapping_keeps_first_stage() {
    let err = SignalError::render("x")
        .at_stage(Stage::FramesGenerating)
        .at_stage(Stage::Muxed);
    assert_eq!(err.stage(), Some(Stage::FramesGenerating));
}
