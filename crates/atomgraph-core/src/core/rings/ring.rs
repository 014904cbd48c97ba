use crate::core::models::ids::{AtomId, BondId};
use std::collections::HashMap;

/// A simple cycle in the bond graph.
///
/// Atoms and bonds are listed in walk order: `bonds[i]` joins `atoms[i]` and
/// `atoms[(i + 1) % size]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ring {
    atoms: Vec<AtomId>,
    bonds: Vec<BondId>,
}

impl Ring {
    pub(crate) fn new(atoms: Vec<AtomId>, bonds: Vec<BondId>) -> Self {
        debug_assert_eq!(atoms.len(), bonds.len());
        Self { atoms, bonds }
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[BondId] {
        &self.bonds
    }

    /// Number of bonds (equivalently atoms) in the ring.
    pub fn size(&self) -> usize {
        self.bonds.len()
    }

    pub fn contains_atom(&self, atom_id: AtomId) -> bool {
        self.atoms.contains(&atom_id)
    }

    pub fn contains_bond(&self, bond_id: BondId) -> bool {
        self.bonds.contains(&bond_id)
    }
}

/// An immutable set of rings with per-bond and per-atom membership indexes.
#[derive(Debug, Clone, Default)]
pub struct RingSet {
    rings: Vec<Ring>,
    by_bond: HashMap<BondId, Vec<usize>>,
    by_atom: HashMap<AtomId, Vec<usize>>,
}

impl RingSet {
    pub(crate) fn new(rings: Vec<Ring>) -> Self {
        let mut by_bond: HashMap<BondId, Vec<usize>> = HashMap::new();
        let mut by_atom: HashMap<AtomId, Vec<usize>> = HashMap::new();
        for (idx, ring) in rings.iter().enumerate() {
            for &bond_id in ring.bonds() {
                by_bond.entry(bond_id).or_default().push(idx);
            }
            for &atom_id in ring.atoms() {
                by_atom.entry(atom_id).or_default().push(idx);
            }
        }
        Self {
            rings,
            by_bond,
            by_atom,
        }
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ring> {
        self.rings.iter()
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Rings passing through the given bond.
    pub fn rings_for_bond(&self, bond_id: BondId) -> impl Iterator<Item = &Ring> + '_ {
        self.by_bond
            .get(&bond_id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.rings[idx])
    }

    /// Rings passing through the given atom.
    pub fn rings_for_atom(&self, atom_id: AtomId) -> impl Iterator<Item = &Ring> + '_ {
        self.by_atom
            .get(&atom_id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.rings[idx])
    }

    pub fn is_ring_bond(&self, bond_id: BondId) -> bool {
        self.by_bond.contains_key(&bond_id)
    }

    pub fn is_ring_atom(&self, atom_id: AtomId) -> bool {
        self.by_atom.contains_key(&atom_id)
    }
}

impl<'a> IntoIterator for &'a RingSet {
    type Item = &'a Ring;
    type IntoIter = std::slice::Iter<'a, Ring>;

    fn into_iter(self) -> Self::IntoIter {
        self.rings.iter()
    }
}
