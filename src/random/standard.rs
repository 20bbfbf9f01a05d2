use super::twister::{TwisterState, STATE_WORDS};

use rand_core::{impls, Error, RngCore, SeedableRng};
use std::fmt;

/// Reference MT19937 with `init_genrand` seeding.
///
/// Not accepted by the dungeon generators, see [`LegacyRandom`](super::LegacyRandom).
#[derive(Clone)]
pub struct StandardRandom {
    seed: u32,
    state: TwisterState,
}

impl StandardRandom {
    pub fn new(seed: u32) -> Self {
        let mut words = [0; STATE_WORDS];
        words[0] = seed;
        for i in 1..STATE_WORDS {
            let prev = words[i - 1];
            words[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }

        StandardRandom {
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
}

impl fmt::Debug for StandardRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardRandom")
            .field("seed", &self.seed)
            .field("draws_until_reload", &self.state.draws_until_reload())
            .finish()
    }
}

impl RngCore for StandardRandom {
    fn next_u32(&mut self) -> u32 {
        StandardRandom::next_u32(self)
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

impl SeedableRng for StandardRandom {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        StandardRandom::new(u32::from_le_bytes(seed))
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
