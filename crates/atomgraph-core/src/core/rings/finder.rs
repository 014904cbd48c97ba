use super::query::RingMode;
use super::ring::Ring;
use crate::core::models::ids::{AtomId, BondId};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const UNVISITED: usize = usize::MAX;

/// Snapshot of the part of the bond graph a ring query looks at.
///
/// Vertices are indexed densely in the order atoms were supplied; edges keep the
/// handle of the bond they came from.
#[derive(Debug, Clone, Default)]
pub(crate) struct RingGraph {
    atoms: Vec<AtomId>,
    edges: Vec<(usize, usize, BondId)>,
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl RingGraph {
    /// Builds the graph; edges naming an atom not in `atoms` are dropped.
    pub(crate) fn new<I>(atoms: Vec<AtomId>, bonds: I) -> Self
    where
        I: IntoIterator<Item = (AtomId, AtomId, BondId)>,
    {
        let index: HashMap<AtomId, usize> =
            atoms.iter().enumerate().map(|(i, &a)| (a, i)).collect();
        let mut adjacency = vec![Vec::new(); atoms.len()];
        let mut edges = Vec::new();
        for (a1, a2, bond_id) in bonds {
            let (Some(&i), Some(&j)) = (index.get(&a1), index.get(&a2)) else {
                continue;
            };
            let e = edges.len();
            edges.push((i, j, bond_id));
            adjacency[i].push((j, e));
            adjacency[j].push((i, e));
        }
        Self {
            atoms,
            edges,
            adjacency,
        }
    }

    pub(crate) fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub(crate) fn bond_count(&self) -> usize {
        self.edges.len()
    }

    /// Marks every bridge: an edge whose removal disconnects its endpoints.
    /// Bridges lie on no cycle.
    fn bridges(&self) -> Vec<bool> {
        let n = self.atoms.len();
        let mut disc = vec![UNVISITED; n];
        let mut low = vec![0; n];
        let mut is_bridge = vec![false; self.edges.len()];
        let mut timer = 0;

        for root in 0..n {
            if disc[root] != UNVISITED {
                continue;
            }
            disc[root] = timer;
            low[root] = timer;
            timer += 1;
            let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];

            while let Some(top) = stack.len().checked_sub(1) {
                let (v, parent_edge, next) = stack[top];
                if next < self.adjacency[v].len() {
                    stack[top].2 += 1;
                    let (w, e) = self.adjacency[v][next];
                    if Some(e) == parent_edge {
                        continue;
                    }
                    if disc[w] == UNVISITED {
                        disc[w] = timer;
                        low[w] = timer;
                        timer += 1;
                        stack.push((w, Some(e), 0));
                    } else {
                        low[v] = low[v].min(disc[w]);
                    }
                } else {
                    stack.pop();
                    if let (Some(e), Some(&(parent, _, _))) = (parent_edge, stack.last()) {
                        low[parent] = low[parent].min(low[v]);
                        if low[v] > disc[parent] {
                            is_bridge[e] = true;
                        }
                    }
                }
            }
        }
        is_bridge
    }

    /// Connected components of the graph with bridges removed, skipping isolated
    /// vertices. Each is 2-edge-connected and holds every cycle through its edges.
    fn cyclic_components(&self) -> Vec<Component> {
        let is_bridge = self.bridges();
        let n = self.atoms.len();
        let mut seen = vec![false; n];
        let mut components = Vec::new();

        for root in 0..n {
            if seen[root] {
                continue;
            }
            seen[root] = true;
            let mut vertices = vec![root];
            let mut edges = Vec::new();
            let mut queue = VecDeque::from([root]);
            while let Some(v) = queue.pop_front() {
                for &(w, e) in &self.adjacency[v] {
                    if is_bridge[e] {
                        continue;
                    }
                    if v < w {
                        edges.push(e);
                    }
                    if !seen[w] {
                        seen[w] = true;
                        vertices.push(w);
                        queue.push_back(w);
                    }
                }
            }
            if !edges.is_empty() {
                vertices.sort_unstable();
                edges.sort_unstable();
                components.push(self.localize(&vertices, &edges));
            }
        }
        components
    }

    fn localize(&self, vertices: &[usize], edges: &[usize]) -> Component {
        let local: HashMap<usize, usize> =
            vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        let mut adjacency = vec![Vec::new(); vertices.len()];
        let mut local_edges = Vec::with_capacity(edges.len());
        for (le, &e) in edges.iter().enumerate() {
            let (a, b, _) = self.edges[e];
            let (la, lb) = (local[&a], local[&b]);
            local_edges.push((la, lb));
            adjacency[la].push((lb, le));
            adjacency[lb].push((la, le));
        }
        Component {
            vertices: vertices.to_vec(),
            global_edges: edges.to_vec(),
            edges: local_edges,
            adjacency,
        }
    }

    fn to_ring(&self, component: &Component, local_edges: &[usize]) -> Ring {
        let mut incident: HashMap<usize, Vec<usize>> = HashMap::new();
        for &le in local_edges {
            let (a, b) = component.edges[le];
            incident.entry(a).or_default().push(le);
            incident.entry(b).or_default().push(le);
        }
        let start = incident.keys().copied().min().unwrap_or_default();
        let other = |le: usize, v: usize| {
            let (a, b) = component.edges[le];
            if a == v { b } else { a }
        };

        // Leave the start vertex toward its lower-indexed neighbor so the walk
        // direction is stable.
        let mut first = incident.get(&start).cloned().unwrap_or_default();
        first.sort_by_key(|&le| other(le, start));

        let mut atoms = Vec::with_capacity(local_edges.len());
        let mut bonds = Vec::with_capacity(local_edges.len());
        let mut current = start;
        let mut via = first.first().copied();
        while let Some(le) = via {
            atoms.push(self.atoms[component.vertices[current]]);
            bonds.push(self.edges[component.global_edges[le]].2);
            current = other(le, current);
            if current == start || atoms.len() == local_edges.len() {
                break;
            }
            via = incident
                .get(&current)
                .and_then(|es| es.iter().copied().find(|&e| e != le));
        }
        Ring::new(atoms, bonds)
    }
}

/// A 2-edge-connected component with its own dense vertex and edge numbering.
#[derive(Debug)]
struct Component {
    vertices: Vec<usize>,
    global_edges: Vec<usize>,
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl Component {
    /// Dimension of the cycle space.
    fn cyclomatic_number(&self) -> usize {
        self.edges.len() + 1 - self.vertices.len()
    }
}

/// A set of edges as a bit vector over GF(2).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct EdgeSet(Vec<u64>);

impl EdgeSet {
    fn empty(edge_count: usize) -> Self {
        Self(vec![0; edge_count.div_ceil(64)])
    }

    fn insert(&mut self, e: usize) {
        self.0[e / 64] |= 1 << (e % 64);
    }

    fn contains(&self, e: usize) -> bool {
        self.0[e / 64] & (1 << (e % 64)) != 0
    }

    fn symmetric_difference_with(&mut self, other: &EdgeSet) {
        for (word, o) in self.0.iter_mut().zip(&other.0) {
            *word ^= o;
        }
    }

    fn first(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
    }

    fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().flat_map(|(i, &word)| {
            (0..64)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| i * 64 + bit)
        })
    }
}

struct ShortestPathTree {
    parent: Vec<Option<(usize, usize)>>,
    depth: Vec<usize>,
}

fn shortest_path_tree(component: &Component, root: usize) -> ShortestPathTree {
    let n = component.vertices.len();
    let mut parent = vec![None; n];
    let mut depth = vec![UNVISITED; n];
    depth[root] = 0;
    let mut queue = VecDeque::from([root]);
    while let Some(v) = queue.pop_front() {
        for &(w, e) in &component.adjacency[v] {
            if depth[w] == UNVISITED {
                depth[w] = depth[v] + 1;
                parent[w] = Some((v, e));
                queue.push_back(w);
            }
        }
    }
    ShortestPathTree { parent, depth }
}

/// Horton candidates: for every root and every non-tree edge (x, y), the cycle
/// root→x, x–y, y→root when the two tree paths share only the root.
fn horton_candidates(component: &Component, limit: usize) -> Vec<EdgeSet> {
    let n = component.vertices.len();
    let edge_count = component.edges.len();
    let mut unique: HashSet<EdgeSet> = HashSet::new();
    let mut stamp = vec![UNVISITED; n];

    for root in 0..n {
        let tree = shortest_path_tree(component, root);
        for (e, &(x, y)) in component.edges.iter().enumerate() {
            let is_tree_edge = |v: usize| tree.parent[v].is_some_and(|(_, pe)| pe == e);
            if is_tree_edge(x) || is_tree_edge(y) {
                continue;
            }
            if tree.depth[x] + tree.depth[y] + 1 > limit {
                continue;
            }

            let mut cycle = EdgeSet::empty(edge_count);
            cycle.insert(e);
            let stamp_id = root * edge_count + e;
            let mut v = x;
            while let Some((p, pe)) = tree.parent[v] {
                stamp[v] = stamp_id;
                cycle.insert(pe);
                v = p;
            }
            let mut simple = true;
            let mut v = y;
            while let Some((p, pe)) = tree.parent[v] {
                if stamp[v] == stamp_id {
                    simple = false;
                    break;
                }
                cycle.insert(pe);
                v = p;
            }
            if simple {
                unique.insert(cycle);
            }
        }
    }

    let mut candidates: Vec<(usize, EdgeSet)> =
        unique.into_iter().map(|c| (c.len(), c)).collect();
    candidates.sort_unstable();
    candidates.into_iter().map(|(_, c)| c).collect()
}

/// Greedy selection of linearly independent candidates, smallest first.
fn minimum_cycle_basis(component: &Component, limit: usize) -> Vec<EdgeSet> {
    let rank = component.cyclomatic_number();
    let mut reduced: Vec<(usize, EdgeSet)> = Vec::with_capacity(rank);
    let mut basis = Vec::with_capacity(rank);

    for candidate in horton_candidates(component, limit) {
        if basis.len() == rank {
            break;
        }
        let mut residue = candidate.clone();
        for (pivot, row) in &reduced {
            if residue.contains(*pivot) {
                residue.symmetric_difference_with(row);
            }
        }
        if let Some(pivot) = residue.first() {
            reduced.push((pivot, residue));
            basis.push(candidate);
        }
    }
    trace!(
        rank,
        selected = basis.len(),
        "Selected cycle basis for component."
    );
    basis
}

/// Every simple cycle of at most `limit` edges, each reported once.
fn simple_cycles(component: &Component, limit: usize) -> Vec<EdgeSet> {
    struct Walk<'a> {
        component: &'a Component,
        limit: usize,
        start: usize,
        path: Vec<usize>,
        path_edges: Vec<usize>,
        on_path: Vec<bool>,
        found: Vec<EdgeSet>,
    }

    impl Walk<'_> {
        fn extend(&mut self) {
            let Some(&v) = self.path.last() else {
                return;
            };
            let component = self.component;
            for &(w, e) in &component.adjacency[v] {
                if w == self.start {
                    // Report each cycle in one direction only.
                    if self.path.len() >= 3 && self.path[1] < v {
                        let mut cycle = EdgeSet::empty(component.edges.len());
                        for &pe in &self.path_edges {
                            cycle.insert(pe);
                        }
                        cycle.insert(e);
                        self.found.push(cycle);
                    }
                } else if w > self.start && !self.on_path[w] && self.path.len() < self.limit {
                    self.on_path[w] = true;
                    self.path.push(w);
                    self.path_edges.push(e);
                    self.extend();
                    self.path_edges.pop();
                    self.path.pop();
                    self.on_path[w] = false;
                }
            }
        }
    }

    let n = component.vertices.len();
    let mut walk = Walk {
        component,
        limit,
        start: 0,
        path: Vec::new(),
        path_edges: Vec::new(),
        on_path: vec![false; n],
        found: Vec::new(),
    };
    for start in 0..n {
        walk.start = start;
        walk.path = vec![start];
        walk.on_path[start] = true;
        walk.extend();
        walk.on_path[start] = false;
    }

    let mut cycles: Vec<(usize, EdgeSet)> = walk.found.into_iter().map(|c| (c.len(), c)).collect();
    cycles.sort_unstable();
    cycles.into_iter().map(|(_, c)| c).collect()
}

fn rings_in_component(
    graph: &RingGraph,
    component: &Component,
    mode: RingMode,
    limit: usize,
) -> Vec<Ring> {
    let cycles = match mode {
        RingMode::Basis => minimum_cycle_basis(component, limit),
        RingMode::All => simple_cycles(component, limit),
    };
    cycles
        .iter()
        .map(|cycle| graph.to_ring(component, &cycle.iter().collect::<Vec<_>>()))
        .collect()
}

/// Perceives rings in `graph`, component by component.
///
/// Rings with more than `limit` bonds are never reported. Output order is by
/// component (lowest atom first), then by ring size.
#[instrument(skip_all, name = "ring_perception", fields(atoms = graph.atom_count(), bonds = graph.bond_count(), mode = ?mode, limit = limit))]
pub(crate) fn find_rings(graph: &RingGraph, mode: RingMode, limit: usize) -> Vec<Ring> {
    if limit < 3 {
        return Vec::new();
    }
    let components = graph.cyclic_components();
    debug!(
        components = components.len(),
        "Found cyclic components after bridge removal."
    );

    #[cfg(not(feature = "parallel"))]
    let iterator = components.iter();

    #[cfg(feature = "parallel")]
    let iterator = components.par_iter();

    let per_component: Vec<Vec<Ring>> = iterator
        .map(|component| rings_in_component(graph, component, mode, limit))
        .collect();

    let rings: Vec<Ring> = per_component.into_iter().flatten().collect();
    debug!(rings = rings.len(), "Ring perception complete.");
    rings
}
