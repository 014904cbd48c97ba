use super::{Ring, RingGraph, RingMode, RingQuery, RingSet, find_rings};
use crate::core::models::error::StructureError;
use crate::core::models::ids::BondId;
use crate::core::models::structure::Structure;
use std::sync::Arc;
use tracing::debug;

impl Structure {
    /// The minimum cycle basis of the bond graph under `query`.
    ///
    /// The result is cached until the next topology edit; repeated calls with an
    /// equal query return the same shared set.
    pub fn rings(&self, query: &RingQuery) -> Arc<RingSet> {
        self.ring_set(RingMode::Basis, query)
    }

    /// Every simple cycle no longer than the query's size threshold.
    pub fn all_rings(&self, query: &RingQuery) -> Arc<RingSet> {
        self.ring_set(RingMode::All, query)
    }

    /// Intra-residue minimum rings of any size.
    pub fn minimum_rings(&self) -> Arc<RingSet> {
        self.rings(&RingQuery::minimum())
    }

    /// Rings of the minimum basis under `query` that pass through `bond_id`.
    pub fn bond_rings(&self, bond_id: BondId, query: &RingQuery) -> Result<Vec<Ring>, StructureError> {
        self.bond_ref(bond_id)?;
        Ok(self
            .rings(query)
            .rings_for_bond(bond_id)
            .cloned()
            .collect())
    }

    /// The cache lock is not held during perception. Readers racing on the same
    /// query may each perceive it; the first set stored is returned to all of them.
    fn ring_set(&self, mode: RingMode, query: &RingQuery) -> Arc<RingSet> {
        if let Some(cached) = self.lock_ring_cache().get(mode, query) {
            return cached;
        }

        let graph = self.ring_graph(query);
        let limit = query.effective_threshold(self.atom_count());
        let rings = find_rings(&graph, mode, limit);
        debug!(
            ?mode,
            rings = rings.len(),
            cross_residues = query.is_cross_residues(),
            "Perceived rings."
        );
        self.lock_ring_cache()
            .insert(mode, query.clone(), RingSet::new(rings))
    }

    /// The subgraph a query searches: atoms outside ignored residues, and bonds
    /// between them that stay inside one residue unless crossing is allowed.
    fn ring_graph(&self, query: &RingQuery) -> RingGraph {
        let ignored = query.ignored();
        let atoms = self
            .atoms()
            .filter(|(_, atom)| !ignored.contains(&atom.residue()))
            .map(|(id, _)| id)
            .collect();
        let bonds = self.bonds().filter_map(|(id, bond)| {
            let [a1, a2] = bond.atoms();
            let r1 = self.atom(a1)?.residue();
            let r2 = self.atom(a2)?.residue();
            (query.is_cross_residues() || r1 == r2).then_some((a1, a2, id))
        });
        RingGraph::new(atoms, bonds)
    }
}
