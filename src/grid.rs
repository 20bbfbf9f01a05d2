//! Grid points, directions and dense per-cell storage.

use crate::error::LayoutDataError;
use crate::extent::FloorExtent;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct GridPoint {
    pub x: u32,
    pub y: u32,
}

impl GridPoint {
    pub const fn new(x: u32, y: u32) -> Self {
        GridPoint { x, y }
    }

    pub fn manhattan(&self, other: &GridPoint) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(u32, u32)> for GridPoint {
    fn from((x, y): (u32, u32)) -> Self {
        GridPoint { x, y }
    }
}

/// `Up` grows `y`. The discriminants double as bit positions in [`Links`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

/// The order neighbors are considered in during carving.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, 1),
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Carved passages leaving a cell.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Links(u8);

impl Links {
    pub fn empty() -> Self {
        Links(0)
    }

    pub fn contains(&self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= dir.bit();
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        ALL_DIRECTIONS.iter().copied().filter(move |d| self.contains(*d))
    }
}

/// Row-major storage of one value per cell of an extent. Indexing outside the extent panics.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "CellGridRecord<T>")]
pub struct CellGrid<T> {
    extent: FloorExtent,
    values: Vec<T>,
}

#[derive(Deserialize)]
struct CellGridRecord<T> {
    extent: FloorExtent,
    values: Vec<T>,
}

impl<T> TryFrom<CellGridRecord<T>> for CellGrid<T> {
    type Error = LayoutDataError;

    fn try_from(record: CellGridRecord<T>) -> Result<Self, Self::Error> {
        if record.values.len() != record.extent.num_cells() {
            return Err(LayoutDataError::CellCount {
                width: record.extent.width,
                height: record.extent.height,
                found: record.values.len(),
            });
        }

        Ok(CellGrid {
            extent: record.extent,
            values: record.values,
        })
    }
}

impl<T: Clone> CellGrid<T> {
    pub fn filled(extent: FloorExtent, value: T) -> Self {
        CellGrid {
            extent,
            values: vec![value; extent.num_cells()],
        }
    }
}

impl<T> CellGrid<T> {
    pub fn extent(&self) -> &FloorExtent {
        &self.extent
    }

    pub fn get(&self, p: GridPoint) -> Option<&T> {
        if self.extent.contains(p) {
            Some(&self.values[self.extent.index(p)])
        } else {
            None
        }
    }

    /// Points and values in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPoint, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.extent.point(i), v))
    }

    pub fn map<U>(&self, f: impl Fn(GridPoint, &T) -> U) -> CellGrid<U> {
        CellGrid {
            extent: self.extent,
            values: self.iter().map(|(p, v)| f(p, v)).collect(),
        }
    }
}

impl<T> Index<GridPoint> for CellGrid<T> {
    type Output = T;

    fn index(&self, p: GridPoint) -> &T {
        &self.values[self.extent.index(p)]
    }
}

impl<T> IndexMut<GridPoint> for CellGrid<T> {
    fn index_mut(&mut self, p: GridPoint) -> &mut T {
        let i = self.extent.index(p);
        &mut self.values[i]
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

    #[test]
    fn test_links_track_directions() {
        let mut links = Links::empty();
        links.insert(Direction::Left);
        links.insert(Direction::Up);
        links.insert(Direction::Up);

        assert_eq!(links.count(), 2);
        assert!(links.contains(Direction::Up));
        assert!(!links.contains(Direction::Down));
        assert_eq!(
            links.iter().collect::<Vec<_>>(),
            vec![Direction::Up, Direction::Left]
        );
    }

    #[test]
    fn test_opposites_cancel_offsets() {
        for d in ALL_DIRECTIONS.iter() {
            let (dx, dy) = d.offset();
            let (ox, oy) = d.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn test_cell_grid_is_row_major() {
        let mut grid = CellGrid::filled(FloorExtent::new(3, 2), 0);
        grid[GridPoint::new(2, 1)] = 7;
        grid[GridPoint::new(0, 1)] = 3;

        let values: Vec<_> = grid.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![0, 0, 0, 3, 0, 7]);
        assert_eq!(grid.get(GridPoint::new(3, 0)), None);
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_index_panics() {
        let grid = CellGrid::filled(FloorExtent::new(2, 2), false);
        let _ = grid[GridPoint::new(0, 2)];
    }

    #[test]
    fn test_deserialized_grid_must_fill_its_extent() {
        let grid = CellGrid::filled(FloorExtent::new(3, 2), 1u8);
        let text = ron::to_string(&grid).unwrap();
        assert_eq!(ron::from_str::<CellGrid<u8>>(&text).unwrap(), grid);

        let widened = text.replace("width:3", "width:4");
        let err = ron::from_str::<CellGrid<u8>>(&widened).unwrap_err();
        assert!(err.to_string().contains("6 cell values do not fill a 4x2 grid"));
    }
}
