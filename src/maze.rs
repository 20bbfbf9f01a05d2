//! Carving one floor's passage tree out of a bounded grid.
//!
//! Every decision is a draw from the floor's [`LegacyRandom`], in this order:
//!
//! 1. the start cell, when the [`StartPolicy`] is random;
//! 2. per carving step, while more than one cell is on the stack, a branch roll and (on success)
//!    the index of the stack entry to branch from;
//! 3. per carving step with open neighbors, a straight roll when the current heading can be
//!    continued, and a neighbor index when it isn't taken.
//!
//! Boss selection consumes no draws.

use crate::error::GenerationError;
use crate::extent::{Corner, FloorExtent};
use crate::graph::{component_count, longest_path_to_point_in_tree, PassageNetwork};
use crate::grid::{CellGrid, Direction, GridPoint, Links, ALL_DIRECTIONS};
use crate::random::LegacyRandom;
use crate::sampling::{next_below, roll_percent};

use petgraph::dot::{Config, Dot};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StartPolicy {
    Corner(Corner),
    Fixed { x: u32, y: u32 },
    /// One draw over the boundary cells in row-major order.
    RandomEdge,
    /// One draw over every cell.
    Random,
}

impl Default for StartPolicy {
    fn default() -> Self {
        StartPolicy::RandomEdge
    }
}

/// Where the boss cell goes. Ties always resolve to the earliest carved cell.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BossPolicy {
    LastCarved,
    /// Longest passage distance from the start.
    Farthest,
    /// Longest straight-line (Manhattan) distance from the start.
    CornerSeeking,
    /// Closest to the middle of the grid.
    CenterSeeking,
}

impl Default for BossPolicy {
    fn default() -> Self {
        BossPolicy::Farthest
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MazeParams {
    pub start: StartPolicy,
    pub boss: BossPolicy,
    /// Share of the grid's cells to carve before stopping.
    pub coverage_percent: u32,
    /// Chance per step of resuming from a random earlier cell instead of the newest one.
    pub branch_percent: u32,
    /// Chance per step of keeping the corridor's heading when that cell is open.
    pub straight_percent: u32,
}

impl Default for MazeParams {
    fn default() -> Self {
        MazeParams {
            start: StartPolicy::default(),
            boss: BossPolicy::default(),
            coverage_percent: 60,
            branch_percent: 25,
            straight_percent: 50,
        }
    }
}

impl MazeParams {
    /// At least the start and boss cells, at most the whole grid.
    pub fn cell_budget(&self, num_cells: usize) -> usize {
        let wanted = num_cells * self.coverage_percent.min(100) as usize / 100;

        wanted.max(2).min(num_cells)
    }
}

/// The carved passage tree of one floor, before any block types are assigned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FloorLayout {
    extent: FloorExtent,
    start: GridPoint,
    end: GridPoint,
    visited: CellGrid<bool>,
    links: CellGrid<Links>,
    parents: CellGrid<Option<GridPoint>>,
    carve_order: Vec<GridPoint>,
}

impl FloorLayout {
    pub fn extent(&self) -> &FloorExtent {
        &self.extent
    }

    pub fn width(&self) -> u32 {
        self.extent.width
    }

    pub fn height(&self) -> u32 {
        self.extent.height
    }

    pub fn start(&self) -> GridPoint {
        self.start
    }

    pub fn end(&self) -> GridPoint {
        self.end
    }

    /// `false` for points outside the grid.
    pub fn is_visited(&self, p: GridPoint) -> bool {
        self.visited.get(p).copied().unwrap_or(false)
    }

    pub fn links(&self, p: GridPoint) -> Links {
        self.links.get(p).copied().unwrap_or_default()
    }

    /// The cell this one was carved from. `None` for the start and for unvisited cells.
    pub fn parent(&self, p: GridPoint) -> Option<GridPoint> {
        self.parents.get(p).copied().flatten()
    }

    pub fn carve_order(&self) -> &[GridPoint] {
        &self.carve_order
    }

    pub fn visited_count(&self) -> usize {
        self.carve_order.len()
    }

    pub(crate) fn visited_grid(&self) -> &CellGrid<bool> {
        &self.visited
    }

    pub(crate) fn link_grid(&self) -> &CellGrid<Links> {
        &self.links
    }

    /// The passage route from the start to the boss cell, both included.
    pub fn critical_path(&self) -> Vec<GridPoint> {
        let mut path = vec![self.end];
        let mut p = self.end;
        while let Some(parent) = self.parent(p) {
            path.push(parent);
            p = parent;
        }
        debug_assert_eq!(p, self.start);
        path.reverse();

        path
    }

    pub fn passage_network(&self) -> PassageNetwork {
        PassageNetwork::new(&self.extent, &self.carve_order, &self.links)
    }

    fn assert_invariants(&self, network: &PassageNetwork) {
        assert!(self.is_visited(self.start), "start cell was not carved");
        assert!(self.is_visited(self.end), "boss cell was not carved");
        assert_ne!(self.start, self.end, "boss cell coincides with the start");
        assert_eq!(
            network.graph.node_count(),
            self.visited.iter().filter(|(_, v)| **v).count(),
            "passage graph disagrees with the visited set"
        );
        assert_eq!(
            component_count(&network.graph),
            1,
            "carved cells are not a single connected region"
        );
    }
}

pub struct MazeGenerator {
    params: MazeParams,
}

impl MazeGenerator {
    pub fn new(params: MazeParams) -> Self {
        MazeGenerator { params }
    }

    pub fn params(&self) -> &MazeParams {
        &self.params
    }

    pub fn generate(
        &self,
        rng: &mut LegacyRandom,
        width: u32,
        height: u32,
    ) -> Result<FloorLayout, GenerationError> {
        let extent = FloorExtent::new(width, height);
        if extent.num_cells() < 2 {
            return Err(GenerationError::LayoutTooSmall { width, height });
        }

        let start = self.choose_start(&extent, rng)?;
        let budget = self.params.cell_budget(extent.num_cells());
        log::debug!(
            "Carving {}x{} floor from {} with a budget of {} cells",
            width,
            height,
            start,
            budget
        );

        let mut carver = Carver::new(extent, start);
        carver.carve(rng, &self.params, budget);
        log::debug!("Carved {} cells", carver.carve_order.len());

        let mut layout = FloorLayout {
            extent,
            start,
            end: start,
            visited: carver.visited,
            links: carver.links,
            parents: carver.parents,
            carve_order: carver.carve_order,
        };

        let network = layout.passage_network();
        log::trace!(
            "Passages = {:?}",
            Dot::with_config(&network.graph, &[Config::EdgeNoLabel])
        );
        layout.end = self.choose_end(&layout, &network);
        log::debug!("Boss cell = {}", layout.end);

        layout.assert_invariants(&network);

        Ok(layout)
    }

    fn choose_start(
        &self,
        extent: &FloorExtent,
        rng: &mut LegacyRandom,
    ) -> Result<GridPoint, GenerationError> {
        let start = match self.params.start {
            StartPolicy::Corner(corner) => extent.corner(corner),
            StartPolicy::Fixed { x, y } => {
                let p = GridPoint::new(x, y);
                if !extent.contains(p) {
                    return Err(GenerationError::StartOutOfBounds {
                        start: p,
                        width: extent.width,
                        height: extent.height,
                    });
                }
                p
            }
            StartPolicy::RandomEdge => {
                let edges = extent.edge_points();
                edges[next_below(rng, edges.len())]
            }
            StartPolicy::Random => extent.point(next_below(rng, extent.num_cells())),
        };

        Ok(start)
    }

    fn choose_end(&self, layout: &FloorLayout, network: &PassageNetwork) -> GridPoint {
        let start = layout.start;
        let candidates = &layout.carve_order[1..];
        let end = match self.params.boss {
            BossPolicy::LastCarved => candidates.last().copied(),
            BossPolicy::Farthest => {
                let root = network.node(start).expect("Start must be in the passage graph");
                let path = longest_path_to_point_in_tree(&network.graph, root);
                path.first().map(|n| network.point(*n))
            }
            BossPolicy::CornerSeeking => candidates
                .iter()
                .copied()
                .min_by_key(|p| Reverse(p.manhattan(&start))),
            BossPolicy::CenterSeeking => candidates
                .iter()
                .copied()
                .min_by_key(|p| layout.extent.doubled_center_distance(*p)),
        };

        end.expect("At least two cells are always carved")
    }
}

/// Growing-tree carver state.
struct Carver {
    extent: FloorExtent,
    visited: CellGrid<bool>,
    links: CellGrid<Links>,
    parents: CellGrid<Option<GridPoint>>,
    headings: CellGrid<Option<Direction>>,
    carve_order: Vec<GridPoint>,
}

impl Carver {
    fn new(extent: FloorExtent, start: GridPoint) -> Self {
        let mut visited = CellGrid::filled(extent, false);
        visited[start] = true;

        Carver {
            extent,
            visited,
            links: CellGrid::filled(extent, Links::empty()),
            parents: CellGrid::filled(extent, None),
            headings: CellGrid::filled(extent, None),
            carve_order: vec![start],
        }
    }

    fn carve(&mut self, rng: &mut LegacyRandom, params: &MazeParams, budget: usize) {
        let mut stack = vec![self.carve_order[0]];
        while self.carve_order.len() < budget {
            if stack.len() > 1 && roll_percent(rng, params.branch_percent) {
                let branch = stack.remove(next_below(rng, stack.len()));
                stack.push(branch);
            }

            let current = match stack.last() {
                Some(p) => *p,
                None => break,
            };

            let candidates = self.open_neighbors(current);
            if candidates.is_empty() {
                stack.pop();
                continue;
            }

            let straight = self.headings[current]
                .and_then(|h| candidates.iter().copied().find(|(d, _)| *d == h));
            let (dir, next) = match straight {
                Some(c) if roll_percent(rng, params.straight_percent) => c,
                _ => candidates[next_below(rng, candidates.len())],
            };

            self.visited[next] = true;
            self.links[current].insert(dir);
            self.links[next].insert(dir.opposite());
            self.parents[next] = Some(current);
            self.headings[next] = Some(dir);
            self.carve_order.push(next);
            stack.push(next);
        }
    }

    fn open_neighbors(&self, p: GridPoint) -> Vec<(Direction, GridPoint)> {
        ALL_DIRECTIONS
            .iter()
            .filter_map(|d| self.extent.neighbor(p, *d).map(|n| (*d, n)))
            .filter(|(_, n)| !self.visited[*n])
            .collect()
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

    use std::collections::{BTreeSet, VecDeque};

    fn generate(seed: u32, width: u32, height: u32, params: MazeParams) -> FloorLayout {
        let mut rng = LegacyRandom::new(seed);
        MazeGenerator::new(params)
            .generate(&mut rng, width, height)
            .expect("Layout should fit")
    }

    fn reachable_from_start(layout: &FloorLayout) -> BTreeSet<GridPoint> {
        let mut seen = BTreeSet::from([layout.start()]);
        let mut open = VecDeque::from([layout.start()]);
        while let Some(p) = open.pop_front() {
            for dir in layout.links(p).iter() {
                let n = layout.extent().neighbor(p, dir).unwrap();
                assert!(layout.is_visited(n));
                if seen.insert(n) {
                    open.push_back(n);
                }
            }
        }

        seen
    }

    #[test]
    fn test_one_by_one_is_too_small() {
        let mut rng = LegacyRandom::new(1);
        let result = MazeGenerator::new(MazeParams::default()).generate(&mut rng, 1, 1);
        assert_eq!(
            result,
            Err(GenerationError::LayoutTooSmall {
                width: 1,
                height: 1
            })
        );
    }

    #[test]
    fn test_zero_width_is_too_small() {
        let mut rng = LegacyRandom::new(1);
        let result = MazeGenerator::new(MazeParams::default()).generate(&mut rng, 0, 40);
        assert!(matches!(
            result,
            Err(GenerationError::LayoutTooSmall { .. })
        ));
    }

    #[test]
    fn test_two_cells_always_fit() {
        for seed in 0..50 {
            let layout = generate(seed, 2, 1, MazeParams::default());
            assert_eq!(layout.visited_count(), 2);
            assert_ne!(layout.start(), layout.end());
        }
    }

    #[test]
    fn test_fixed_start_outside_grid_is_rejected() {
        let params = MazeParams {
            start: StartPolicy::Fixed { x: 4, y: 0 },
            ..MazeParams::default()
        };
        let mut rng = LegacyRandom::new(1);
        let result = MazeGenerator::new(params).generate(&mut rng, 4, 4);
        assert!(matches!(
            result,
            Err(GenerationError::StartOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_visited_cells_form_one_tree_from_start() {
        for seed in 0..40 {
            let layout = generate(seed, 9, 6, MazeParams::default());
            let reached = reachable_from_start(&layout);
            let visited: BTreeSet<_> = layout.carve_order().iter().copied().collect();
            assert_eq!(reached, visited);
            assert!(reached.contains(&layout.end()));

            let passages: u32 = layout.carve_order().iter().map(|p| layout.links(*p).count()).sum();
            assert_eq!(passages as usize, 2 * (layout.visited_count() - 1));
        }
    }

    #[test]
    fn test_budget_is_respected() {
        let params = MazeParams {
            coverage_percent: 30,
            ..MazeParams::default()
        };
        let layout = generate(17, 10, 10, params);
        assert_eq!(layout.visited_count(), 30);

        let full = MazeParams {
            coverage_percent: 100,
            ..MazeParams::default()
        };
        assert_eq!(generate(17, 10, 10, full).visited_count(), 100);
    }

    #[test]
    fn test_critical_path_walks_passages() {
        let layout = generate(370545889, 9, 6, MazeParams::default());
        let path = layout.critical_path();
        assert_eq!(path.first(), Some(&layout.start()));
        assert_eq!(path.last(), Some(&layout.end()));
        for w in path.windows(2) {
            assert_eq!(w[0].manhattan(&w[1]), 1);
            assert_eq!(layout.parent(w[1]), Some(w[0]));
        }
    }

    #[test]
    fn test_farthest_boss_maximizes_passage_distance() {
        for seed in 0..20 {
            let layout = generate(seed, 8, 8, MazeParams::default());
            let boss_depth = layout.critical_path().len();
            for p in layout.carve_order() {
                let mut depth = 1;
                let mut q = *p;
                while let Some(parent) = layout.parent(q) {
                    depth += 1;
                    q = parent;
                }
                assert!(depth <= boss_depth);
            }
        }
    }

    #[test]
    fn test_corner_start_and_last_carved_boss() {
        let params = MazeParams {
            start: StartPolicy::Corner(Corner::TopRight),
            boss: BossPolicy::LastCarved,
            ..MazeParams::default()
        };
        let layout = generate(5, 7, 5, params);
        assert_eq!(layout.start(), GridPoint::new(6, 4));
        assert_eq!(Some(&layout.end()), layout.carve_order().last());
    }

    #[test]
    fn test_corner_seeking_boss_is_far_from_start() {
        let params = MazeParams {
            boss: BossPolicy::CornerSeeking,
            ..MazeParams::default()
        };
        let layout = generate(23, 9, 9, params);
        let best = layout
            .carve_order()
            .iter()
            .map(|p| p.manhattan(&layout.start()))
            .max()
            .unwrap();
        assert_eq!(layout.end().manhattan(&layout.start()), best);
    }

    #[test]
    fn test_center_seeking_boss_is_central() {
        let params = MazeParams {
            boss: BossPolicy::CenterSeeking,
            coverage_percent: 100,
            ..MazeParams::default()
        };
        let layout = generate(23, 9, 9, params);
        assert_eq!(layout.end(), GridPoint::new(4, 4));
    }

    #[test]
    fn test_random_edge_start_is_on_the_boundary() {
        for seed in 0..30 {
            let layout = generate(seed, 9, 6, MazeParams::default());
            assert!(layout.extent().is_edge(layout.start()));
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = generate(1234, 12, 7, MazeParams::default());
        let b = generate(1234, 12, 7, MazeParams::default());
        assert_eq!(a, b);
    }
}
