pub const STATE_WORDS: usize = 624;
const SHIFT_WORDS: usize = 397;
const MATRIX_A: u32 = 2_567_483_615;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7FFF_FFFF;

/// Shared state of both twister variants. Seeding is left to the wrapper types.
#[derive(Clone)]
pub struct TwisterState {
    words: [u32; STATE_WORDS],
    cursor: usize,
    remaining: usize,
}

impl TwisterState {
    /// `remaining` starts at zero, so the first draw reloads the seeded words.
    pub fn from_words(words: [u32; STATE_WORDS]) -> Self {
        TwisterState {
            words,
            cursor: 0,
            remaining: 0,
        }
    }

    pub fn next_word(&mut self) -> u32 {
        if self.remaining == 0 {
            self.reload();
        }
        self.remaining -= 1;

        assert!(
            self.cursor < STATE_WORDS,
            "twister cursor {} escaped the state array",
            self.cursor
        );
        let y = self.words[self.cursor];
        self.cursor += 1;

        temper(y)
    }

    pub fn draws_until_reload(&self) -> usize {
        self.remaining
    }

    fn reload(&mut self) {
        let s = &mut self.words;
        for i in 0..STATE_WORDS {
            let y = (s[i] & UPPER_MASK).wrapping_add(s[(i + 1) % STATE_WORDS] & LOWER_MASK);
            s[i] = s[(i + SHIFT_WORDS) % STATE_WORDS] ^ (y >> 1);
            if y & 1 != 0 {
                s[i] ^= MATRIX_A;
            }
        }
        self.remaining = STATE_WORDS;
        self.cursor = 0;
    }
}

fn temper(mut y: u32) -> u32 {
    y ^= y >> 11;
    y ^= (y << 7) & 0x9D2C_5680;
    y ^= (y << 15) & 0xEFC6_0000;
    y ^= y >> 18;

    y
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

    #[test]
    fn test_reload_happens_every_624_draws() {
        let mut state = TwisterState::from_words([1; STATE_WORDS]);
        assert_eq!(state.draws_until_reload(), 0);

        state.next_word();
        assert_eq!(state.draws_until_reload(), STATE_WORDS - 1);

        for _ in 1..STATE_WORDS {
            state.next_word();
        }
        assert_eq!(state.draws_until_reload(), 0);

        state.next_word();
        assert_eq!(state.draws_until_reload(), STATE_WORDS - 1);
    }

    #[test]
    fn test_temper_of_zero_is_zero() {
        assert_eq!(temper(0), 0);
    }
}
