use crate::extent::FloorExtent;
use crate::grid::{CellGrid, GridPoint, Links};

use fnv::FnvHashMap;
use petgraph::{
    algo::tarjan_scc,
    graph::NodeIndex,
    stable_graph::StableGraph,
    visit::{depth_first_search, Control, DfsEvent},
    EdgeType, Undirected,
};

/// Carved passages between cells. Nodes are added in carve order, so node index order is
/// carve order.
pub type PassageGraph = StableGraph<GridPoint, (), Undirected>;

pub struct PassageNetwork {
    pub graph: PassageGraph,
    nodes: FnvHashMap<GridPoint, NodeIndex>,
}

impl PassageNetwork {
    pub fn new(extent: &FloorExtent, carve_order: &[GridPoint], links: &CellGrid<Links>) -> Self {
        let mut graph = StableGraph::default();
        let mut nodes = FnvHashMap::default();
        for p in carve_order.iter() {
            nodes.insert(*p, graph.add_node(*p));
        }
        for p in carve_order.iter() {
            for dir in links[*p].iter() {
                let neighbor = extent
                    .neighbor(*p, dir)
                    .expect("Passage must lead to a cell inside the grid");
                let (a, b) = (nodes[p], nodes[&neighbor]);
                // Every passage is stored on both cells; only add it once.
                if a < b {
                    graph.add_edge(a, b, ());
                }
            }
        }

        PassageNetwork { graph, nodes }
    }

    pub fn node(&self, p: GridPoint) -> Option<NodeIndex> {
        self.nodes.get(&p).copied()
    }

    pub fn point(&self, n: NodeIndex) -> GridPoint {
        self.graph[n]
    }
}

pub fn component_count<N, E, Ty: EdgeType>(graph: &StableGraph<N, E, Ty>) -> usize {
    tarjan_scc(graph).len()
}

/// Assumes `graph` is a tree. Returns the path from the farthest leaf back to `target`; ties go
/// to the leaf with the lowest node index.
pub fn longest_path_to_point_in_tree<N, E>(
    graph: &StableGraph<N, E, Undirected>,
    target: NodeIndex,
) -> Vec<NodeIndex> {
    if graph.node_count() == 1 {
        return vec![target];
    }

    let mut predecessors = vec![NodeIndex::end(); graph.node_count()];
    let mut successors = vec![NodeIndex::end(); graph.node_count()];
    depth_first_search(graph, Some(target), |event| {
        if let DfsEvent::TreeEdge(u, v) = event {
            predecessors[v.index()] = u;
            successors[u.index()] = v;
        }

        Control::<()>::Continue
    });

    let no_successors: Vec<_> = graph
        .node_indices()
        .filter(|i| successors[i.index()] == NodeIndex::end())
        .collect();

    let mut max_path = Vec::new();
    for i in no_successors.iter() {
        let mut next = *i;
        let mut path = vec![*i];
        loop {
            let pred = predecessors[next.index()];
            if pred == NodeIndex::end() {
                // Not reachable from `target`.
                break;
            }
            path.push(pred);
            if pred == target {
                if path.len() > max_path.len() {
                    max_path = path;
                }
                break;
            }
            next = pred;
        }
    }

    max_path
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
