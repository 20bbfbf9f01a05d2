//! Mersenne Twister generators.
//!
//! Two variants share the same reload and tempering core but differ in how the state is seeded.
//! They are distinct types on purpose: only [`LegacyRandom`] reproduces historical dungeon
//! layouts, and every generation API takes it by concrete type.

mod legacy;
mod standard;
mod twister;

pub use legacy::LegacyRandom;
pub use standard::StandardRandom;
