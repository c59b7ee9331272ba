//! Analog signal degradation: additive noise plus a wrap-around tracking shift.

use rand::Rng;
use rand::distributions::{Distribution as _, Uniform};

use crate::config::CorruptionParams;
use crate::render::frame::Frame;

/// What [`corrupt`] did to a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CorruptionReport {
    /// Horizontal tracking shift in pixels, if one was applied.
    pub shift: Option<i64>,
}

/// Add a uniform value from `[0, amplitude)` to every color channel, saturating at 255.
///
/// Alpha is left untouched. `amplitude == 0` is a no-op.
pub fn apply_noise(frame: &mut Frame, amplitude: u8, rng: &mut impl Rng) {
    if amplitude == 0 {
        return;
    }
    let dist = Uniform::new(0u8, amplitude);
    for px in frame.data.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = c.saturating_add(dist.sample(rng));
        }
    }
}

/// Rotate every row right by `offset` pixels; negative offsets rotate left.
///
/// Pixels leaving one edge re-enter at the opposite edge, so `shift_rows(f, k)` followed by
/// `shift_rows(f, -k)` restores `f` exactly.
pub fn shift_rows(frame: &mut Frame, offset: i64) {
    let width = i64::from(frame.width);
    if width == 0 {
        return;
    }
    let k = offset.rem_euclid(width) as usize;
    if k == 0 {
        return;
    }
    for row in frame.rows_mut() {
        row.rotate_right(k * 4);
    }
}

/// Apply noise, then with `params.shift_probability` a tracking shift drawn from
/// `[-max_shift_px, max_shift_px]`.
pub fn corrupt(frame: &mut Frame, params: &CorruptionParams, rng: &mut impl Rng) -> CorruptionReport {
    apply_noise(frame, params.noise_amplitude, rng);

    let mut report = CorruptionReport::default();
    if rng.gen_bool(params.shift_probability) {
        let max = i64::from(params.max_shift_px);
        let offset = rng.gen_range(-max..=max);
        shift_rows(frame, offset);
        report.shift = Some(offset);
    }
    report
}

#[cfg(test)]
#[path = "../../tests/unit/render/corruption.rs"]
mod tests;
