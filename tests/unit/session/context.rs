use super::*;

#[test]
fn layout_and_prefix() {
    let parent = tempfile::tempdir().unwrap();
    let ctx = RunContext::create_in(parent.path()).unwrap();
    assert!(ctx.frames_dir().is_dir());
    assert!(ctx.audio_dir().is_dir());
    assert!(ctx.frames_dir().starts_with(ctx.root()));
    let name = ctx.root().file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(SCRATCH_PREFIX));
}

#[test]
fn drop_removes_scratch() {
    let parent = tempfile::tempdir().unwrap();
    let root = {
        let ctx = RunContext::create_in(parent.path()).unwrap();
        std::fs::write(ctx.frames_dir().join("frame_00000.png"), b"x").unwrap();
        ctx.root().to_path_buf()
    };
    assert!(!root.exists());
}

#[test]
fn close_removes_scratch() {
    let parent = tempfile::tempdir().unwrap();
    let ctx = RunContext::create_in(parent.path()).unwrap();
    let root = ctx.root().to_path_buf();
    ctx.close().unwrap();
    assert!(!root.exists());
}

#[test]
fn missing_parent_is_a_resource_error() {
    let parent = tempfile::tempdir().unwrap();
    let err = RunContext::create_in(&parent.path().join("missing")).unwrap_err();
    assert!(matches!(err, SignalError::Resource(_)));
}
