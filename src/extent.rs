use crate::grid::{Direction, GridPoint};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Corner {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

/// The bounds of one floor's cell grid, `[0, width) x [0, height)`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct FloorExtent {
    pub width: u32,
    pub height: u32,
}

impl FloorExtent {
    pub fn new(width: u32, height: u32) -> Self {
        FloorExtent { width, height }
    }

    pub fn num_cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, p: GridPoint) -> bool {
        p.x < self.width && p.y < self.height
    }

    /// Row-major index. Panics for points outside the extent, since that can only come from a
    /// broken generator.
    pub fn index(&self, p: GridPoint) -> usize {
        assert!(
            self.contains(p),
            "{} is outside the {}x{} grid",
            p,
            self.width,
            self.height
        );

        p.y as usize * self.width as usize + p.x as usize
    }

    pub fn point(&self, index: usize) -> GridPoint {
        assert!(index < self.num_cells(), "cell index {} out of range", index);
        let w = self.width as usize;

        GridPoint::new((index % w) as u32, (index / w) as u32)
    }

    pub fn points(&self) -> impl Iterator<Item = GridPoint> {
        let FloorExtent { width, height } = *self;
        (0..height).flat_map(move |y| (0..width).map(move |x| GridPoint::new(x, y)))
    }

    /// Never yields a point outside the extent.
    pub fn neighbor(&self, p: GridPoint, dir: Direction) -> Option<GridPoint> {
        let (dx, dy) = dir.offset();
        let x = p.x as i64 + dx;
        let y = p.y as i64 + dy;
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }

        Some(GridPoint::new(x as u32, y as u32))
    }

    pub fn is_edge(&self, p: GridPoint) -> bool {
        self.contains(p)
            && (p.x == 0 || p.y == 0 || p.x + 1 == self.width || p.y + 1 == self.height)
    }

    /// Boundary cells in row-major order.
    pub fn edge_points(&self) -> Vec<GridPoint> {
        self.points().filter(|p| self.is_edge(*p)).collect()
    }

    pub fn corner(&self, corner: Corner) -> GridPoint {
        let right = self.width.saturating_sub(1);
        let top = self.height.saturating_sub(1);
        match corner {
            Corner::BottomLeft => GridPoint::new(0, 0),
            Corner::BottomRight => GridPoint::new(right, 0),
            Corner::TopLeft => GridPoint::new(0, top),
            Corner::TopRight => GridPoint::new(right, top),
        }
    }

    /// Manhattan distance to the grid centre, doubled so it stays integral.
    pub fn doubled_center_distance(&self, p: GridPoint) -> u32 {
        let cx = self.width as i64 - 1;
        let cy = self.height as i64 - 1;

        ((2 * p.x as i64 - cx).abs() + (2 * p.y as i64 - cy).abs()) as u32
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
