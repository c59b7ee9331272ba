use super::*;
use rand::SeedableRng as _;

#[test]
fn profile_defaults_validate() {
    for p in [QualityProfile::Lofi, QualityProfile::Standard] {
        RunConfig::for_profile(p).validate().unwrap();
    }
}

#[test]
fn profiles_differ_only_in_numbers() {
    let lofi = RunConfig::for_profile(QualityProfile::Lofi);
    let std = RunConfig::for_profile(QualityProfile::Standard);
    assert_eq!((lofi.canvas.width, lofi.canvas.height, lofi.fps), (360, 240, 12));
    assert_eq!((std.canvas.width, std.canvas.height, std.fps), (720, 480, 30));
    assert_eq!(lofi.encode.crf, 32);
    assert_eq!(lofi.encode.preset, "veryfast");
    assert_eq!(lofi.encode.container, std.encode.container);
    assert_eq!(lofi.jumpscare, std.jumpscare);
}

#[test]
fn overlay_merges_nested_fields() {
    let cfg = RunConfig::from_json_overlay(
        None,
        r#"{ "fps": 10, "corruption": { "noise_amplitude": 0 }, "duration": { "min_secs": 2, "max_secs": 2 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.fps, 10);
    assert_eq!(cfg.corruption.noise_amplitude, 0);
    // Untouched siblings keep profile defaults.
    assert_eq!(cfg.corruption.max_shift_px, 20);
    assert_eq!(cfg.duration, DurationRange::fixed(2));
    cfg.validate().unwrap();
}

#[test]
fn overlay_profile_key_selects_defaults_unless_overridden() {
    let cfg = RunConfig::from_json_overlay(None, r#"{ "profile": "standard" }"#).unwrap();
    assert_eq!(cfg.profile, QualityProfile::Standard);
    assert_eq!(cfg.canvas.width, 720);

    let cfg = RunConfig::from_json_overlay(
        Some(QualityProfile::Lofi),
        r#"{ "profile": "standard" }"#,
    )
    .unwrap();
    assert_eq!(cfg.profile, QualityProfile::Lofi);
}

#[test]
fn overlay_rejects_unknown_fields() {
    assert!(RunConfig::from_json_overlay(None, r#"{ "fsp": 10 }"#).is_err());
    assert!(RunConfig::from_json_overlay(None, r#"{ "layers": { "nope": 1 } }"#).is_err());
    assert!(RunConfig::from_json_overlay(None, "[1, 2]").is_err());
}

#[test]
fn resolve_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(&path, r#"{ "textures": { "pool_size": 3 } }"#).unwrap();
    let cfg = RunConfig::resolve(None, Some(&path)).unwrap();
    assert_eq!(cfg.textures.pool_size, 3);

    assert!(RunConfig::resolve(None, Some(&dir.path().join("missing.json"))).is_err());
}

#[test]
fn validation_catches_bad_values() {
    let base = RunConfig::default();

    let mut c = base.clone();
    c.canvas.width = 361;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.fps = 0;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.duration = DurationRange {
        min_secs: 5,
        max_secs: 4,
    };
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.corruption.shift_probability = 1.5;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.jumpscare.probability = f64::NAN;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.textures.pool_size = 0;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.layers.paste_min = 5;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.encode.container = "m/ov".to_string();
    assert!(c.validate().is_err());

    let mut c = base;
    c.render.threads = Some(0);
    assert!(c.validate().is_err());
}

#[test]
fn duration_pick_stays_in_range() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    let r = DurationRange {
        min_secs: 35,
        max_secs: 55,
    };
    for _ in 0..200 {
        let d = r.pick(&mut rng);
        assert!((35..=55).contains(&d));
    }
    assert_eq!(DurationRange::fixed(2).pick(&mut rng), 2);
}

#[test]
fn message_template_inserts_keyword() {
    let cfg = RunConfig::default();
    assert_eq!(
        cfg.audio.message_for("void"),
        "WARNING. ENTITY void. SIGNAL CONTAMINATED."
    );
}

#[test]
fn profile_from_str() {
    assert_eq!(
        "LoFi".parse::<QualityProfile>().unwrap(),
        QualityProfile::Lofi
    );
    assert_eq!(
        "standard".parse::<QualityProfile>().unwrap(),
        QualityProfile::Standard
    );
    assert!("hd".parse::<QualityProfile>().is_err());
}
