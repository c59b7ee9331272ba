use super::*;
use crate::foundation::core::{Canvas, FrameIndex};
use proptest::prelude::*;
use rand::SeedableRng as _;

fn gradient(width: u32, height: u32) -> Frame {
    let mut data = Vec::new();
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[x as u8, y as u8, (x ^ y) as u8, 255]);
        }
    }
    Frame::from_rgba(FrameIndex(0), width, height, data).unwrap()
}

#[test]
fn shift_rotates_rows_right() {
    let mut f = gradient(3, 2);
    shift_rows(&mut f, 1);
    assert_eq!(f.pixel(0, 0)[0], 2);
    assert_eq!(f.pixel(1, 0)[0], 0);
    assert_eq!(f.pixel(2, 1)[0], 1);

    let mut g = gradient(3, 2);
    shift_rows(&mut g, -1);
    assert_eq!(g.pixel(0, 0)[0], 1);
    assert_eq!(g.pixel(2, 0)[0], 0);
}

#[test]
fn shift_by_width_is_identity() {
    let mut f = gradient(5, 3);
    let orig = f.clone();
    shift_rows(&mut f, 5);
    assert_eq!(f, orig);
    shift_rows(&mut f, -10);
    assert_eq!(f, orig);
}

#[test]
fn zero_amplitude_noise_is_noop() {
    let mut f = gradient(4, 4);
    let orig = f.clone();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    apply_noise(&mut f, 0, &mut rng);
    assert_eq!(f, orig);
}

#[test]
fn saturated_frame_stays_saturated() {
    let canvas = Canvas::new(8, 8).unwrap();
    let mut f = Frame::filled(FrameIndex(0), canvas, [250, 255, 254, 255]);
    let mut rng = rand::rngs::StdRng::seed_from_u64(5);
    apply_noise(&mut f, 255, &mut rng);
    for px in f.data.chunks_exact(4) {
        assert!(px[0] >= 250);
        assert_eq!(px[1], 255);
        assert!(px[2] >= 254);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn corrupt_is_reproducible_for_a_seed() {
    let params = CorruptionParams {
        noise_amplitude: 40,
        shift_probability: 0.5,
        max_shift_px: 4,
    };
    let run = |seed| {
        let mut f = gradient(16, 8);
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let report = corrupt(&mut f, &params, &mut rng);
        (f, report)
    };
    assert_eq!(run(11), run(11));
}

#[test]
fn certain_shift_is_reported_within_range() {
    let params = CorruptionParams {
        noise_amplitude: 0,
        shift_probability: 1.0,
        max_shift_px: 3,
    };
    let mut rng = rand::rngs::StdRng::seed_from_u64(2);
    for _ in 0..50 {
        let mut f = gradient(8, 2);
        let report = corrupt(&mut f, &params, &mut rng);
        let k = report.shift.unwrap();
        assert!((-3..=3).contains(&k));
    }

    let never = CorruptionParams {
        shift_probability: 0.0,
        ..params
    };
    let mut f = gradient(8, 2);
    assert_eq!(corrupt(&mut f, &never, &mut rng).shift, None);
}

proptest! {
    #[test]
    fn shift_then_unshift_restores_frame(width in 1u32..40, height in 1u32..6, k in -200i64..200) {
        let orig = gradient(width, height);
        let mut f = orig.clone();
        shift_rows(&mut f, k);
        shift_rows(&mut f, -k);
        prop_assert_eq!(f, orig);
    }

    #[test]
    fn shift_is_a_permutation_of_each_row(width in 1u32..40, k in -100i64..100) {
        let orig = gradient(width, 1);
        let mut f = orig.clone();
        shift_rows(&mut f, k);
        let mut a: Vec<[u8; 4]> = orig.data.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]]).collect();
        let mut b: Vec<[u8; 4]> = f.data.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]]).collect();
        a.sort_unstable();
        b.sort_unstable();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn noise_only_adds_and_clips(seed in any::<u64>(), amplitude in 0u8..=255, fill in any::<u8>()) {
        let canvas = Canvas::new(6, 4).unwrap();
        let orig = Frame::filled(FrameIndex(0), canvas, [fill, fill, fill, 255]);
        let mut f = orig.clone();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        apply_noise(&mut f, amplitude, &mut rng);
        for (a, b) in orig.data.chunks_exact(4).zip(f.data.chunks_exact(4)) {
            for c in 0..3 {
                prop_assert!(b[c] >= a[c]);
                let added = u16::from(b[c]) - u16::from(a[c]);
                prop_assert!(b[c] == 255 || added < u16::from(amplitude.max(1)));
            }
            prop_assert_eq!(b[3], 255);
        }
    }
}
