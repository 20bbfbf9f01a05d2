use crate::grid::GridPoint;
use crate::sampling::SizeRange;

use thiserror::Error;

/// Recoverable failures while laying out a single floor.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GenerationError {
    #[error("a {width}x{height} grid cannot hold a distinct start and boss cell")]
    LayoutTooSmall { width: u32, height: u32 },

    #[error("fixed start cell {start} lies outside the {width}x{height} grid")]
    StartOutOfBounds {
        start: GridPoint,
        width: u32,
        height: u32,
    },
}

/// A serialized floor or dungeon that the generator could not have produced.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LayoutDataError {
    #[error("{found} cell values do not fill a {width}x{height} grid")]
    CellCount {
        width: u32,
        height: u32,
        found: usize,
    },

    #[error("cell grid is {cells_width}x{cells_height} but the floor is {width}x{height}")]
    ExtentMismatch {
        cells_width: u32,
        cells_height: u32,
        width: u32,
        height: u32,
    },

    #[error("{0} lies outside the grid")]
    OutOfBounds(GridPoint),

    #[error("{0} is referenced but was never carved")]
    NotCarved(GridPoint),

    #[error("block or passages of cell {0} disagree with its carved flag")]
    CellMismatch(GridPoint),

    #[error("start and boss share cell {0}")]
    StartIsBoss(GridPoint),

    #[error("passage at {0} has no matching passage on the other side")]
    BrokenPassage(GridPoint),

    #[error("carved cells form {0} separate regions")]
    Disconnected(usize),

    #[error("critical path does not follow passages from start to boss")]
    CriticalPath,

    #[error("gate at {0} does not match its block")]
    InvalidGate(GridPoint),

    #[error("a dungeon needs at least one floor")]
    NoFloors,

    #[error("floor at position {position} claims index {index}")]
    FloorOrder { position: usize, index: usize },
}

/// Failures of a whole dungeon generation. No partial dungeon is ever returned.
#[derive(Debug, Error)]
pub enum DungeonError {
    #[error("floor {floor_index} of dungeon '{name}' could not be generated")]
    Floor {
        name: String,
        floor_index: usize,
        #[source]
        source: GenerationError,
    },

    #[error("a dungeon needs at least one floor")]
    NoFloors,

    #[error("the size table has no entries")]
    EmptySizeTable,

    #[error("size range {}..={} is empty", .0.min, .0.max)]
    InvalidSizeRange(SizeRange),

    #[error("malformed dungeon definition")]
    Definition(#[from] ron::error::SpannedError),
}

impl DungeonError {
    /// The floor that failed, if the failure belongs to one floor.
    pub fn floor_index(&self) -> Option<usize> {
        match self {
            DungeonError::Floor { floor_index, .. } => Some(*floor_index),
            _ => None,
        }
    }

    pub fn is_layout_too_small(&self) -> bool {
        matches!(
            self,
            DungeonError::Floor {
                source: GenerationError::LayoutTooSmall { .. },
                ..
            }
        )
    }
}
