//! Draw helpers over [`LegacyRandom`]. Each helper consumes exactly one `next_u32` unless stated
//! otherwise, so the number of draws a generation step takes is fixed by its inputs.

use crate::random::LegacyRandom;

use serde::{Deserialize, Serialize};

/// Uniform-ish index in `[0, n)` by plain modulo, matching the historical layouts.
pub fn next_below(rng: &mut LegacyRandom, n: usize) -> usize {
    assert!(n > 0, "cannot sample below zero");

    (rng.next_u32() % n as u32) as usize
}

pub fn roll_percent(rng: &mut LegacyRandom, percent: u32) -> bool {
    (next_below(rng, 100) as u32) < percent
}

/// Inclusive range of a grid dimension.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SizeRange {
    pub min: u32,
    pub max: u32,
}

impl SizeRange {
    pub fn fixed(size: u32) -> Self {
        SizeRange {
            min: size,
            max: size,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Draws nothing when the range holds a single value. Panics when `min > max`; dungeon
    /// generation rejects such tables before sampling.
    pub fn sample(&self, rng: &mut LegacyRandom) -> u32 {
        assert!(
            self.is_valid(),
            "size range {}..={} is empty",
            self.min,
            self.max
        );
        if self.min == self.max {
            return self.min;
        }
        let span = self.max - self.min;
        if span == u32::MAX {
            return rng.next_u32();
        }

        self.min + rng.next_u32() % (span + 1)
    }
}

impl From<u32> for SizeRange {
    fn from(size: u32) -> Self {
        SizeRange::fixed(size)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FloorSize {
    pub width: SizeRange,
    pub height: SizeRange,
}

impl FloorSize {
    pub fn fixed(width: u32, height: u32) -> Self {
        FloorSize {
            width: width.into(),
            height: height.into(),
        }
    }

    /// Width is drawn before height.
    pub fn sample(&self, rng: &mut LegacyRandom) -> (u32, u32) {
        let width = self.width.sample(rng);
        let height = self.height.sample(rng);

        (width, height)
    }
}

/// Per-floor sizes in floor order. Floors past the end of the table reuse the last entry.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SizeTable {
    sizes: Vec<FloorSize>,
}

impl SizeTable {
    pub fn new(sizes: Vec<FloorSize>) -> Self {
        SizeTable { sizes }
    }

    pub fn uniform(size: FloorSize) -> Self {
        SizeTable { sizes: vec![size] }
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn for_floor(&self, floor_index: usize) -> Option<&FloorSize> {
        self.sizes.get(floor_index).or_else(|| self.sizes.last())
    }

    /// Returns the first range with `min > max`, if any.
    pub fn first_invalid_range(&self) -> Option<SizeRange> {
        self.sizes
            .iter()
            .flat_map(|s| [s.width, s.height])
            .find(|r| !r.is_valid())
    }
}

impl From<Vec<FloorSize>> for SizeTable {
    fn from(sizes: Vec<FloorSize>) -> Self {
        SizeTable::new(sizes)
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
