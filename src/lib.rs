//! Seeded, reproducible dungeon layouts.
//!
//! A [`DungeonDefinition`] describes a dungeon type. Generating it from a seed gives a
//! [`Dungeon`]: one [`Floor`] per depth, each a connected passage tree from a start cell to a boss
//! cell with a [`BlockType`] on every carved cell. The same definition and seed always give the
//! same dungeon.

pub mod error;
pub mod extent;
pub mod floor;
pub mod graph;
pub mod grid;
pub mod map_types;
pub mod maze;
pub mod random;
pub mod sampling;

pub use error::{DungeonError, GenerationError, LayoutDataError};
pub use extent::{Corner, FloorExtent};
pub use floor::{BlockPalette, BlockType, Cell, Floor, FloorBuilder, FloorRole, Gate};
pub use grid::{Direction, GridPoint, Links};
pub use map_types::dungeon::{
    derive_floor_seed, Dungeon, DungeonDefinition, DungeonGenerator, DungeonInstance,
    FloorSeedMode,
};
pub use maze::{BossPolicy, FloorLayout, MazeGenerator, MazeParams, StartPolicy};
pub use random::{LegacyRandom, StandardRandom};
pub use sampling::{FloorSize, SizeRange, SizeTable};

/// Implement this to let the world layer receive the generated blocks.
pub trait BlockEncoder {
    /// Called once per visited cell of floor `floor_index`.
    fn encode_block(&mut self, floor_index: usize, point: GridPoint, cell: &Cell);
}
