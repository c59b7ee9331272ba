use super::*;
use crate::config::QualityProfile;
use crate::source::FetchOutcome;
use proptest::prelude::*;
use rand::SeedableRng as _;

fn test_config() -> RunConfig {
    let mut cfg = RunConfig::for_profile(QualityProfile::Lofi);
    cfg.canvas = Canvas::new(64, 48).unwrap();
    cfg.layers.min_paste_px = 8;
    cfg.layers.text_box_w = 20;
    cfg.layers.text_box_h = 8;
    cfg.textures.pool_size = 4;
    cfg
}

fn bank_for(cfg: &RunConfig) -> TextureBank {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    TextureBank::generate(&cfg.textures, cfg.canvas, &mut rng).unwrap()
}

fn corpus() -> Corpus {
    Corpus::build("void", FetchOutcome::Unavailable("offline".into()))
}

#[test]
fn composed_frames_match_canvas() {
    let cfg = test_config();
    let bank = bank_for(&cfg);
    let corpus = corpus();
    let font = FontFace::from_system();
    let comp = FrameCompositor::new(&cfg, &corpus, &bank, font.as_ref());
    let mut worker = comp.worker().unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    for i in 0..5 {
        let out = comp.compose(&mut worker, FrameIndex(i), &mut rng).unwrap();
        assert_eq!(out.frame.index, FrameIndex(i));
        assert_eq!((out.frame.width, out.frame.height), (64, 48));
        assert_eq!(out.frame.data.len(), 64 * 48 * 4);
        assert_eq!(out.skipped_pastes, 0);
        assert!(out.frame.data.chunks_exact(4).all(|px| px[3] == 255));
    }
}

#[test]
fn oversized_texture_is_skipped_and_frame_stays_valid() {
    let mut cfg = test_config();
    cfg.layers.resize_pastes = false;
    cfg.layers.paste_min = 3;
    cfg.layers.paste_max = 3;
    cfg.layers.base_max = 0;
    cfg.jumpscare.probability = 0.0;
    let wide = Texture::from_rgba(65, 10, &vec![255; 65 * 10 * 4]).unwrap();
    let tall = Texture::from_rgba(10, 49, &vec![255; 10 * 49 * 4]).unwrap();
    let bank = TextureBank::from_textures(vec![wide, tall]).unwrap();
    let corpus = corpus();
    let comp = FrameCompositor::new(&cfg, &corpus, &bank, None);
    let mut worker = comp.worker().unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);

    let out = comp.compose(&mut worker, FrameIndex(0), &mut rng).unwrap();
    assert_eq!(out.skipped_pastes, 3);
    assert_eq!(out.frame.data.len(), 64 * 48 * 4);
    // Nothing but the black base was drawn.
    assert!(out.frame.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn exactly_fitting_texture_covers_canvas() {
    let mut cfg = test_config();
    cfg.layers.resize_pastes = false;
    cfg.layers.paste_min = 1;
    cfg.layers.paste_max = 1;
    cfg.jumpscare.probability = 0.0;
    let full = Texture::from_rgba(64, 48, &vec![200; 64 * 48 * 4]).unwrap();
    let bank = TextureBank::from_textures(vec![full]).unwrap();
    let corpus = corpus();
    let comp = FrameCompositor::new(&cfg, &corpus, &bank, None);
    let mut worker = comp.worker().unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);

    let out = comp.compose(&mut worker, FrameIndex(0), &mut rng).unwrap();
    assert_eq!(out.skipped_pastes, 0);
    assert!(out.frame.data.chunks_exact(4).all(|px| px == [200, 200, 200, 255]));
}

#[test]
fn jumpscare_is_flash_outside_text_region() {
    let mut cfg = test_config();
    cfg.jumpscare.probability = 1.0;
    let bank = bank_for(&cfg);
    let corpus = corpus();
    let font = FontFace::from_system();
    let comp = FrameCompositor::new(&cfg, &corpus, &bank, font.as_ref());
    let mut worker = comp.worker().unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(8);

    let out = comp.compose(&mut worker, FrameIndex(0), &mut rng).unwrap();
    assert!(out.jumpscare);
    let region = jumpscare_text_region(cfg.canvas, cfg.layers.text_size_px);
    let flash = cfg.jumpscare.flash.to_array();
    for y in 0..cfg.canvas.height {
        for x in 0..cfg.canvas.width {
            let inside = f64::from(x) >= region.x0
                && f64::from(x) < region.x1
                && f64::from(y) >= region.y0
                && f64::from(y) < region.y1;
            if !inside {
                assert_eq!(out.frame.pixel(x, y), flash, "pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn jumpscare_region_stays_on_canvas() {
    let canvas = Canvas::new(360, 240).unwrap();
    let r = jumpscare_text_region(canvas, 11.0);
    assert_eq!((r.x0, r.y0), (119.0, 119.0));
    assert_eq!(r.x1, 360.0);
    assert_eq!(r.y1, 120.0 + 22.0 + 1.0);

    let tiny = jumpscare_text_region(Canvas::new(2, 2).unwrap(), 40.0);
    assert!(tiny.x0 >= 0.0 && tiny.y1 <= 2.0);
}

#[test]
fn render_depends_only_on_seed_and_index() {
    let cfg = test_config();
    let bank = bank_for(&cfg);
    let corpus = corpus();
    let font = FontFace::from_system();
    let comp = FrameCompositor::new(&cfg, &corpus, &bank, font.as_ref());
    let mut w1 = comp.worker().unwrap();
    let mut w2 = comp.worker().unwrap();

    // Render in different orders on different workers.
    let a: Vec<_> = (0..4)
        .map(|i| comp.render(&mut w1, 42, FrameIndex(i)).unwrap().frame)
        .collect();
    let b: Vec<_> = (0..4)
        .rev()
        .map(|i| comp.render(&mut w2, 42, FrameIndex(i)).unwrap().frame)
        .collect();
    for (x, y) in a.iter().zip(b.iter().rev()) {
        assert_eq!(x, y);
    }
    let other = comp.render(&mut w1, 43, FrameIndex(0)).unwrap().frame;
    assert_ne!(other, a[0]);
}

proptest! {
    #[test]
    fn paste_offset_keeps_box_inside(canvas in 1u32..2000, size in 0u32..2500, seed in any::<u64>()) {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        match paste_offset(canvas, size, &mut rng) {
            Some(off) => {
                prop_assert!(size <= canvas);
                prop_assert!(off + size <= canvas);
            }
            None => prop_assert!(size > canvas),
        }
    }
}
