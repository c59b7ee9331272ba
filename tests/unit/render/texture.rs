use super::*;
use rand::SeedableRng as _;

fn small_settings() -> TextureSettings {
    TextureSettings {
        pool_size: 3,
        lines_min: 2,
        lines_max: 5,
        base_max: 40,
        line_min_brightness: 100,
        line_width: 1.0,
    }
}

#[test]
fn bank_has_pool_size_canvas_sized_opaque_textures() {
    let canvas = Canvas::new(48, 32).unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let bank = TextureBank::generate(&small_settings(), canvas, &mut rng).unwrap();
    assert_eq!(bank.len(), 3);
    for t in bank.iter() {
        assert_eq!((t.width(), t.height()), (48, 32));
        assert!(t.data().chunks_exact(4).all(|px| px[3] == 255));
        // Thin strokes never cover the whole base fill.
        let darkest = t.data().chunks_exact(4).map(|px| px[0]).min().unwrap();
        assert!(darkest <= 40);
    }
}

#[test]
fn same_seed_same_bank() {
    let canvas = Canvas::new(32, 32).unwrap();
    let a = TextureBank::generate(
        &small_settings(),
        canvas,
        &mut rand::rngs::StdRng::seed_from_u64(9),
    )
    .unwrap();
    let b = TextureBank::generate(
        &small_settings(),
        canvas,
        &mut rand::rngs::StdRng::seed_from_u64(9),
    )
    .unwrap();
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.data(), y.data());
    }
}

#[test]
fn empty_pool_is_rejected() {
    let mut s = small_settings();
    s.pool_size = 0;
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    assert!(TextureBank::generate(&s, Canvas::new(8, 8).unwrap(), &mut rng).is_err());
    assert!(TextureBank::from_textures(Vec::new()).is_err());
}

#[test]
fn from_rgba_validates_and_forces_opaque() {
    assert!(Texture::from_rgba(2, 2, &[0; 12]).is_err());
    assert!(Texture::from_rgba(0, 2, &[]).is_err());
    let t = Texture::from_rgba(1, 1, &[10, 20, 30, 0]).unwrap();
    assert_eq!(t.data(), &[10, 20, 30, 255]);
}
