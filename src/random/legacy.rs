use super::twister::{TwisterState, STATE_WORDS};

use rand_core::{impls, Error, RngCore, SeedableRng};
use std::fmt;

const SEED_MULTIPLIER: u32 = 69069;
const SEED_INCREMENT: u32 = 69070;
const UNIT_SCALE: f32 = 4.656_612_873_077_393e-10;

/// The altered Mersenne Twister that dungeon layouts were historically generated with.
///
/// Seeding interleaves two linear congruential steps per state word. The output stream for a
/// given seed is part of the reproducibility contract: any change here changes every layout.
#[derive(Clone)]
pub struct LegacyRandom {
    seed: u32,
    state: TwisterState,
}

impl LegacyRandom {
    pub fn new(seed: u32) -> Self {
        let mut words = [0; STATE_WORDS];
        let mut x = seed;
        for word in words.iter_mut() {
            let mut w = x & 0xFFFF_0000;
            x = x.wrapping_mul(SEED_MULTIPLIER);
            w |= (x & 0xFFFF_0000) >> 16;
            x = x.wrapping_mul(SEED_MULTIPLIER).wrapping_add(SEED_INCREMENT);
            *word = w;
        }

        LegacyRandom {
            seed,
            state: TwisterState::from_words(words),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state.next_word()
    }

    /// Uniform in `[0, 1)`, built from the low 31 bits of one draw.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() & 0x7FFF_FFFF) as f32 * UNIT_SCALE
    }

    pub fn next_f32_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

impl fmt::Debug for LegacyRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyRandom")
            .field("seed", &self.seed)
            .field("draws_until_reload", &self.state.draws_until_reload())
            .finish()
    }
}

impl RngCore for LegacyRandom {
    fn next_u32(&mut self) -> u32 {
        LegacyRandom::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for LegacyRandom {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        LegacyRandom::new(u32::from_le_bytes(seed))
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn draws(seed: u32, count: usize) -> Vec<u32> {
        let mut rng = LegacyRandom::new(seed);
        (0..count).map(|_| rng.next_u32()).collect()
    }

    #[test]
    fn test_golden_prefix_seed_0() {
        assert_eq!(
            draws(0, 6),
            vec![477480905, 3667282373, 2229421029, 2807835183, 2861012660, 1073088619]
        );
    }

    #[test]
    fn test_golden_prefix_seed_1() {
        assert_eq!(
            draws(1, 6),
            vec![3556162021, 4012392791, 221657543, 586320575, 3355844478, 1469533884]
        );
    }

    #[test]
    fn test_golden_prefix_tir_cho_seed() {
        assert_eq!(
            draws(370545889, 6),
            vec![1828247453, 765775902, 3069037616, 774675118, 1855737654, 2665424683]
        );
    }

    #[test]
    fn test_reload_boundary_does_not_shift_the_stream() {
        let stream = draws(370545889, 1249);
        assert_eq!(
            &stream[622..626],
            &[2718472498, 3949763349, 1347206243, 4160882687]
        );
        assert_eq!(&stream[1247..1249], &[3075954036, 1573666986]);
    }

    #[test]
    fn test_differs_from_standard_twister() {
        let mut standard = crate::random::StandardRandom::new(5489);
        let legacy = draws(5489, 2);
        assert_eq!(legacy, vec![3526893021, 1211545710]);
        assert_ne!(legacy[0], standard.next_u32());
    }

    #[test]
    fn test_next_f32_golden_bits() {
        let mut rng = LegacyRandom::new(42);
        let bits: Vec<u32> = (0..3).map(|_| rng.next_f32().to_bits()).collect();
        assert_eq!(bits, vec![0x3f72_3d93, 0x3e92_af08, 0x3f70_8a97]);
    }

    #[test]
    fn test_next_f32_range_stays_in_bounds() {
        let mut rng = LegacyRandom::new(7);
        for _ in 0..2000 {
            let v = rng.next_f32_range(-3.0, 5.0);
            assert!((-3.0..5.0).contains(&v));
        }
    }

    #[test]
    fn test_seedable_rng_uses_little_endian_seed() {
        let mut from_bytes = LegacyRandom::from_seed(370545889u32.to_le_bytes());
        let mut direct = LegacyRandom::new(370545889);
        assert_eq!(from_bytes.seed(), 370545889);
        for _ in 0..10 {
            assert_eq!(RngCore::next_u32(&mut from_bytes), direct.next_u32());
        }
    }

    #[test]
    fn test_clone_continues_the_same_stream() {
        let mut rng = LegacyRandom::new(99);
        for _ in 0..700 {
            rng.next_u32();
        }
        let mut fork = rng.clone();
        for _ in 0..1000 {
            assert_eq!(rng.next_u32(), fork.next_u32());
        }
    }
}
