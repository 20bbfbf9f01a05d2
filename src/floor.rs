//! Turning a carved [`FloorLayout`] into a [`Floor`] of typed blocks.
//!
//! Draws continue on the floor's stream after the maze is carved: walking the critical path from
//! the start, every gate candidate takes one `next_f32`, and a locked or chained gate takes one
//! more draw for its key cell right after.

use crate::error::LayoutDataError;
use crate::extent::FloorExtent;
use crate::graph::{component_count, PassageNetwork};
use crate::grid::{CellGrid, GridPoint, Links};
use crate::maze::FloorLayout;
use crate::random::LegacyRandom;
use crate::sampling::next_below;
use crate::BlockEncoder;

use fnv::{FnvHashMap, FnvHashSet};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BlockType {
    Alley,
    Room,
    BossRoom,
    Door,
    DoorWithLock,
    DoorWithChains,
    StairsUp,
    StairsDown,
    PortalUp,
    PortalDown,
}

impl BlockType {
    pub fn is_door(&self) -> bool {
        matches!(
            self,
            BlockType::Door | BlockType::DoorWithLock | BlockType::DoorWithChains
        )
    }

    /// Doors that need a key from elsewhere on the floor.
    pub fn is_gate(&self) -> bool {
        matches!(self, BlockType::DoorWithLock | BlockType::DoorWithChains)
    }

    pub fn glyph(&self) -> char {
        match self {
            BlockType::Alley => '+',
            BlockType::Room => 'o',
            BlockType::BossRoom => 'B',
            BlockType::Door => 'd',
            BlockType::DoorWithLock => 'L',
            BlockType::DoorWithChains => 'C',
            BlockType::StairsUp => '<',
            BlockType::StairsDown => '>',
            BlockType::PortalUp => '^',
            BlockType::PortalDown => 'v',
        }
    }

    fn code(&self) -> u8 {
        *self as u8 + 1
    }
}

/// Door and entrance table for one dungeon type.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct BlockPalette {
    /// Entrance of the first floor. Deeper floors are entered by [`BlockType::StairsUp`].
    pub entrance: BlockType,
    pub locked_door_chance: f32,
    pub chained_door_chance: f32,
    pub door_chance: f32,
    /// Upper bound on locked plus chained doors per floor.
    pub max_gates: u32,
}

impl Default for BlockPalette {
    fn default() -> Self {
        BlockPalette {
            entrance: BlockType::PortalUp,
            locked_door_chance: 0.2,
            chained_door_chance: 0.1,
            door_chance: 0.2,
            max_gates: 2,
        }
    }
}

/// Where a floor sits in its dungeon.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FloorRole {
    pub index: usize,
    pub is_last: bool,
}

impl FloorRole {
    pub fn single() -> Self {
        FloorRole {
            index: 0,
            is_last: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Cell {
    pub visited: bool,
    pub block: Option<BlockType>,
    pub links: Links,
}

/// A locked or chained door on the critical path and the cell holding what opens it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Gate {
    pub door: GridPoint,
    pub kind: BlockType,
    pub key: GridPoint,
}

/// Read back from storage only after [`Floor::check`] accepts it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "FloorRecord")]
pub struct Floor {
    index: usize,
    extent: FloorExtent,
    start: GridPoint,
    end: GridPoint,
    cells: CellGrid<Cell>,
    critical_path: Vec<GridPoint>,
    gates: Vec<Gate>,
    exit: BlockType,
}

#[derive(Deserialize)]
struct FloorRecord {
    index: usize,
    extent: FloorExtent,
    start: GridPoint,
    end: GridPoint,
    cells: CellGrid<Cell>,
    critical_path: Vec<GridPoint>,
    gates: Vec<Gate>,
    exit: BlockType,
}

impl TryFrom<FloorRecord> for Floor {
    type Error = LayoutDataError;

    fn try_from(record: FloorRecord) -> Result<Self, Self::Error> {
        let floor = Floor {
            index: record.index,
            extent: record.extent,
            start: record.start,
            end: record.end,
            cells: record.cells,
            critical_path: record.critical_path,
            gates: record.gates,
            exit: record.exit,
        };
        floor.check()?;

        Ok(floor)
    }
}

impl Floor {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn width(&self) -> u32 {
        self.extent.width
    }

    pub fn height(&self) -> u32 {
        self.extent.height
    }

    pub fn extent(&self) -> &FloorExtent {
        &self.extent
    }

    pub fn start(&self) -> GridPoint {
        self.start
    }

    pub fn end(&self) -> GridPoint {
        self.end
    }

    /// `None` outside the grid.
    pub fn cell(&self, p: GridPoint) -> Option<&Cell> {
        self.cells.get(p)
    }

    pub fn block(&self, p: GridPoint) -> Option<BlockType> {
        self.cell(p).and_then(|c| c.block)
    }

    /// Every cell of the grid in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (GridPoint, &Cell)> + '_ {
        self.cells.iter()
    }

    pub fn visited_cells(&self) -> impl Iterator<Item = (GridPoint, &Cell)> + '_ {
        self.cells().filter(|(_, c)| c.visited)
    }

    pub fn critical_path(&self) -> &[GridPoint] {
        &self.critical_path
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// How the floor is left once its boss is beaten. Sits in the boss room.
    pub fn exit(&self) -> BlockType {
        self.exit
    }

    /// Hands every visited cell to the encoder in row-major order.
    pub fn encode(&self, encoder: &mut impl BlockEncoder) {
        for (p, cell) in self.visited_cells() {
            encoder.encode_block(self.index, p, cell);
        }
    }

    /// One line per row, top row (highest `y`) first. Unvisited cells are `.`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for y in (0..self.height()).rev() {
            for x in 0..self.width() {
                let glyph = self
                    .block(GridPoint::new(x, y))
                    .map_or('.', |b| b.glyph());
                out.push(glyph);
            }
            out.push('\n');
        }

        out
    }

    /// Stable byte encoding of everything the world layer consumes.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.index as u32).to_le_bytes());
        bytes.extend(self.width().to_le_bytes());
        bytes.extend(self.height().to_le_bytes());
        for p in [self.start, self.end] {
            bytes.extend(p.x.to_le_bytes());
            bytes.extend(p.y.to_le_bytes());
        }
        for (_, cell) in self.cells() {
            bytes.push(u8::from(cell.visited));
            bytes.push(cell.block.map_or(0, |b| b.code()));
            bytes.push(cell.links.bits());
        }
        bytes.extend((self.gates.len() as u32).to_le_bytes());
        for gate in self.gates.iter() {
            bytes.push(gate.kind.code());
            for p in [gate.door, gate.key] {
                bytes.extend(p.x.to_le_bytes());
                bytes.extend(p.y.to_le_bytes());
            }
        }
        bytes.push(self.exit.code());

        bytes
    }

    /// Verifies what generation guarantees: a consistent grid, carved start and boss cells, two-way
    /// passages joining every carved cell, a critical path along passages and gates on doors.
    pub fn check(&self) -> Result<(), LayoutDataError> {
        if self.cells.extent() != &self.extent {
            return Err(LayoutDataError::ExtentMismatch {
                cells_width: self.cells.extent().width,
                cells_height: self.cells.extent().height,
                width: self.width(),
                height: self.height(),
            });
        }

        for (p, cell) in self.cells() {
            if cell.visited != cell.block.is_some() || (!cell.visited && !cell.links.is_empty()) {
                return Err(LayoutDataError::CellMismatch(p));
            }
            for dir in cell.links.iter() {
                let other = self.extent.neighbor(p, dir).and_then(|n| self.cell(n));
                if !other.map_or(false, |c| c.links.contains(dir.opposite())) {
                    return Err(LayoutDataError::BrokenPassage(p));
                }
            }
        }

        self.require_carved(self.start)?;
        self.require_carved(self.end)?;
        if self.start == self.end {
            return Err(LayoutDataError::StartIsBoss(self.start));
        }

        let carved: Vec<GridPoint> = self.visited_cells().map(|(p, _)| p).collect();
        let links = self.cells.map(|_, c| c.links);
        let network = PassageNetwork::new(&self.extent, &carved, &links);
        let components = component_count(&network.graph);
        if components != 1 {
            return Err(LayoutDataError::Disconnected(components));
        }

        if self.critical_path.first() != Some(&self.start)
            || self.critical_path.last() != Some(&self.end)
        {
            return Err(LayoutDataError::CriticalPath);
        }
        for step in self.critical_path.windows(2) {
            let linked = self.cell(step[0]).map_or(false, |c| {
                c.links
                    .iter()
                    .any(|d| self.extent.neighbor(step[0], d) == Some(step[1]))
            });
            if !linked {
                return Err(LayoutDataError::CriticalPath);
            }
        }

        for gate in self.gates.iter() {
            self.require_carved(gate.door)?;
            self.require_carved(gate.key)?;
            if !gate.kind.is_gate() || self.block(gate.door) != Some(gate.kind) {
                return Err(LayoutDataError::InvalidGate(gate.door));
            }
        }

        Ok(())
    }

    fn require_carved(&self, p: GridPoint) -> Result<(), LayoutDataError> {
        match self.cell(p) {
            None => Err(LayoutDataError::OutOfBounds(p)),
            Some(cell) if !cell.visited => Err(LayoutDataError::NotCarved(p)),
            Some(_) => Ok(()),
        }
    }

    /// Human-readable summary for logs.
    pub fn describe(&self) -> String {
        format!(
            "floor {} {}x{} start {} boss {} path {} gates {}",
            self.index,
            self.width(),
            self.height(),
            self.start,
            self.end,
            self.critical_path.len(),
            self.gates.len()
        )
    }
}

pub struct FloorBuilder<'a> {
    palette: &'a BlockPalette,
}

impl<'a> FloorBuilder<'a> {
    pub fn new(palette: &'a BlockPalette) -> Self {
        FloorBuilder { palette }
    }

    pub fn build(&self, layout: &FloorLayout, role: FloorRole, rng: &mut LegacyRandom) -> Floor {
        let start = layout.start();
        let end = layout.end();
        let links = layout.link_grid();

        let mut blocks: CellGrid<Option<BlockType>> =
            layout.visited_grid().map(|p, visited| {
                if !*visited {
                    None
                } else if links[p].count() == 2 {
                    Some(BlockType::Alley)
                } else {
                    Some(BlockType::Room)
                }
            });
        blocks[start] = Some(if role.index == 0 {
            self.palette.entrance
        } else {
            BlockType::StairsUp
        });
        blocks[end] = Some(BlockType::BossRoom);

        let critical_path = layout.critical_path();
        let gates = self.place_doors(layout, &critical_path, &mut blocks, rng);

        let cells = layout.visited_grid().map(|p, visited| Cell {
            visited: *visited,
            block: blocks[p],
            links: links[p],
        });
        let exit = if role.is_last {
            BlockType::PortalDown
        } else {
            BlockType::StairsDown
        };

        let floor = Floor {
            index: role.index,
            extent: *layout.extent(),
            start,
            end,
            cells,
            critical_path,
            gates,
            exit,
        };
        log::debug!("Built {}", floor.describe());

        floor
    }

    fn place_doors(
        &self,
        layout: &FloorLayout,
        critical_path: &[GridPoint],
        blocks: &mut CellGrid<Option<BlockType>>,
        rng: &mut LegacyRandom,
    ) -> Vec<Gate> {
        if critical_path.len() < 3 {
            return Vec::new();
        }

        let path_index: FnvHashMap<GridPoint, usize> = critical_path
            .iter()
            .enumerate()
            .map(|(i, p)| (*p, i))
            .collect();
        let junctions = junction_indices(layout, &path_index);

        let p = self.palette;
        let chained_cutoff = p.locked_door_chance + p.chained_door_chance;
        let door_cutoff = chained_cutoff + p.door_chance;

        let mut gates = Vec::new();
        let mut used_keys = FnvHashSet::default();
        for (i, door) in critical_path
            .iter()
            .enumerate()
            .take(critical_path.len() - 1)
            .skip(1)
        {
            if layout.links(*door).count() != 2 {
                continue;
            }

            let roll = rng.next_f32();
            let gates_left = (gates.len() as u32) < p.max_gates;
            let mut kind = if gates_left && roll < p.locked_door_chance {
                BlockType::DoorWithLock
            } else if gates_left && roll < chained_cutoff {
                BlockType::DoorWithChains
            } else if roll < door_cutoff {
                BlockType::Door
            } else {
                continue;
            };

            if kind.is_gate() {
                let keys: Vec<GridPoint> = layout
                    .carve_order()
                    .iter()
                    .copied()
                    .filter(|c| {
                        layout.links(*c).count() == 1
                            && *c != layout.start()
                            && *c != layout.end()
                            && !path_index.contains_key(c)
                            && junctions[*c].map_or(false, |j| j < i)
                            && !used_keys.contains(c)
                    })
                    .collect();
                if keys.is_empty() {
                    log::debug!("No key room before {}, leaving a plain door", door);
                    kind = BlockType::Door;
                } else {
                    let key = keys[next_below(rng, keys.len())];
                    used_keys.insert(key);
                    gates.push(Gate {
                        door: *door,
                        kind,
                        key,
                    });
                }
            }

            blocks[*door] = Some(kind);
        }

        gates
    }
}

/// For every carved cell, the critical path index where its branch joins the path. Cells on the
/// path map to their own index.
fn junction_indices(
    layout: &FloorLayout,
    path_index: &FnvHashMap<GridPoint, usize>,
) -> CellGrid<Option<usize>> {
    let mut junctions = CellGrid::filled(*layout.extent(), None);
    // Parents are always carved before their children.
    for p in layout.carve_order().iter() {
        let junction = match path_index.get(p) {
            Some(i) => Some(*i),
            None => layout.parent(*p).and_then(|parent| junctions[parent]),
        };
        junctions[*p] = junction;
    }

    junctions
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
