#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Salts separating the random streams drawn from one run seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SeedStream {
    Keyword,
    Duration,
    Textures,
    Frame(u64),
}

impl SeedStream {
    fn tag(self) -> (u8, u64) {
        match self {
            Self::Keyword => (1, 0),
            Self::Duration => (2, 0),
            Self::Textures => (3, 0),
            Self::Frame(i) => (4, i),
        }
    }
}

/// Derive an independent sub-seed for `stream` from the run seed.
pub(crate) fn derive_seed(run_seed: u64, stream: SeedStream) -> u64 {
    let (tag, value) = stream.tag();
    let mut h = Fnv1a64::new_default();
    h.write_u64(run_seed);
    h.write_bytes(&[tag]);
    h.write_u64(value);
    h.finish()
}

/// Seeded RNG for one stream of a run.
pub(crate) fn stream_rng(run_seed: u64, stream: SeedStream) -> rand::rngs::StdRng {
    use rand::SeedableRng as _;
    rand::rngs::StdRng::seed_from_u64(derive_seed(run_seed, stream))
}

/// Per-frame RNG; depends only on the run seed and the frame index.
pub fn frame_rng(run_seed: u64, index: crate::FrameIndex) -> rand::rngs::StdRng {
    stream_rng(run_seed, SeedStream::Frame(index.0))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
