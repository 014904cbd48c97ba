use super::atom::{Atom, DrawMode, Element};
use super::chain::Chain;
use super::coordset::CoordSet;
use super::error::StructureError;
use super::ids::{AtomId, BondId, ChainId, CoordSetId, PbGroupId, PseudobondId, ResidueId};
use super::pseudobond::{PbGroup, Pseudobond};
use super::residue::{Residue, ResidueKey};
use super::topology::{AtomPair, Bond, BondOrder};
use crate::core::changes::{ChangeTracker, Changes, Reason, Tracked};
use crate::core::graphics::{GraphicsChange, GraphicsChanges, GraphicsFlags};
use crate::core::polymer::secondary::{PhiPsiAssigner, SecondaryStructureAssigner};
use crate::core::rings::RingCache;
use crate::core::topology::config::{PolymerConfig, TopologyConfig};
use itertools::Itertools;
use nalgebra::Point3;
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Change ledger plus redraw sink: everything a mutation has to notify.
#[derive(Debug)]
pub(crate) struct Notifier {
    pub(crate) tracker: ChangeTracker,
    pub(crate) graphics: Box<dyn GraphicsChanges + Send + Sync>,
}

impl Notifier {
    /// Stores `value` in `slot` if it differs, recording the modification.
    /// Returns whether anything changed.
    pub(crate) fn update<K: Tracked, T: PartialEq>(
        &mut self,
        slot: &mut T,
        value: T,
        id: K,
        reason: Reason,
        gc: GraphicsChange,
    ) -> bool {
        if *slot == value {
            return false;
        }
        *slot = value;
        self.tracker.add_modified(id, reason);
        if !gc.is_empty() {
            self.graphics.set_changes(gc);
        }
        true
    }

    pub(crate) fn created<K: Tracked>(&mut self, id: K) {
        self.tracker.add_created(id);
        self.graphics.set_gc_adddel();
    }

    pub(crate) fn deleted<K: Tracked>(&mut self, id: K) {
        self.tracker.add_deleted(id);
        self.graphics.set_gc_adddel();
    }

    pub(crate) fn modified<K: Tracked>(&mut self, id: K, reason: Reason) {
        self.tracker.add_modified(id, reason);
    }
}

/// Staleness of one piece of derived state.
///
/// Every relevant edit bumps `current`; the state is fresh only while `computed`
/// matches it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Epoch {
    current: u64,
    computed: Option<u64>,
}

impl Epoch {
    pub(crate) fn invalidate(&mut self) {
        self.current += 1;
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.computed != Some(self.current)
    }

    pub(crate) fn mark_computed(&mut self) {
        self.computed = Some(self.current);
    }
}

/// A molecular structure: the sole owner of its atoms, bonds, residues, chains,
/// coordinate sets and pseudobond groups.
///
/// Entities are created and destroyed only through the structure, which keeps every
/// cross-reference consistent:
///
/// - each atom's incident-bond list matches the bond graph exactly;
/// - at most one bond joins any pair of atoms, and no bond joins an atom to itself;
/// - residues list exactly the atoms that name them as their residue.
///
/// Every mutation is recorded in the structure's [`ChangeTracker`] and raises redraw
/// bits on its [`GraphicsChanges`] sink. Derived state (rings, polymer classification,
/// secondary structure) is computed lazily and dropped when an edit invalidates it.
///
/// Mutation is single-threaded; shared `&Structure` reads may run concurrently.
#[derive(Debug)]
pub struct Structure {
    pub(crate) name: String,
    pub(crate) atoms: SlotMap<AtomId, Atom>,
    pub(crate) bonds: SlotMap<BondId, Bond>,
    pub(crate) residues: SlotMap<ResidueId, Residue>,
    pub(crate) chains: SlotMap<ChainId, Chain>,
    pub(crate) coord_sets: SlotMap<CoordSetId, CoordSet>,
    pub(crate) pb_groups: SlotMap<PbGroupId, PbGroup>,
    pub(crate) pseudobonds: SlotMap<PseudobondId, Pseudobond>,
    // Creation order, which is also session index order.
    pub(crate) atom_order: Vec<AtomId>,
    pub(crate) bond_order: Vec<BondId>,
    pub(crate) residue_order: Vec<ResidueId>,
    pub(crate) chain_order: Vec<ChainId>,
    pub(crate) coord_set_order: Vec<CoordSetId>,
    pub(crate) pb_group_order: Vec<PbGroupId>,
    bond_lookup: HashMap<AtomPair, BondId>,
    residue_lookup: HashMap<ResidueKey, ResidueId>,
    chain_lookup: HashMap<String, ChainId>,
    pub(crate) active_coord_set: Option<CoordSetId>,
    pub(crate) notify: Notifier,
    ring_cache: Mutex<RingCache>,
    pub(crate) polymers_epoch: Epoch,
    pub(crate) polymer_sequences: Vec<Vec<ResidueId>>,
    pub(crate) polymer_config: PolymerConfig,
    pub(crate) ss_epoch: Epoch,
    pub(crate) ss_assigned: bool,
    pub(crate) ss_assigner: Arc<dyn SecondaryStructureAssigner + Send + Sync>,
    pub(crate) ss_passes: usize,
    pub(crate) ribbon_display_count: usize,
}

impl Default for Structure {
    fn default() -> Self {
        Self::new("")
    }
}

impl Structure {
    /// Creates an empty structure with the built-in topology conventions.
    pub fn new(name: &str) -> Self {
        Self::with_config(name, &TopologyConfig::default())
    }

    /// Creates an empty structure using the polymer linkage names from `config`.
    pub fn with_config(name: &str, config: &TopologyConfig) -> Self {
        Self {
            name: name.to_string(),
            atoms: SlotMap::with_key(),
            bonds: SlotMap::with_key(),
            residues: SlotMap::with_key(),
            chains: SlotMap::with_key(),
            coord_sets: SlotMap::with_key(),
            pb_groups: SlotMap::with_key(),
            pseudobonds: SlotMap::with_key(),
            atom_order: Vec::new(),
            bond_order: Vec::new(),
            residue_order: Vec::new(),
            chain_order: Vec::new(),
            coord_set_order: Vec::new(),
            pb_group_order: Vec::new(),
            bond_lookup: HashMap::new(),
            residue_lookup: HashMap::new(),
            chain_lookup: HashMap::new(),
            active_coord_set: None,
            notify: Notifier {
                tracker: ChangeTracker::new(),
                graphics: Box::new(GraphicsFlags::new()),
            },
            ring_cache: Mutex::new(RingCache::new()),
            polymers_epoch: Epoch::default(),
            polymer_sequences: Vec::new(),
            polymer_config: config.polymer.clone(),
            ss_epoch: Epoch::default(),
            ss_assigned: false,
            ss_assigner: Arc::new(PhiPsiAssigner::default()),
            ss_passes: 0,
            ribbon_display_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    // ---- collaborators ------------------------------------------------------------

    pub fn change_tracker(&self) -> &ChangeTracker {
        &self.notify.tracker
    }

    pub fn change_tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.notify.tracker
    }

    /// Checkpoint: returns everything recorded since the previous checkpoint.
    pub fn take_changes(&mut self) -> Changes {
        self.notify.tracker.clear()
    }

    pub fn graphics(&self) -> &(dyn GraphicsChanges + Send + Sync) {
        self.notify.graphics.as_ref()
    }

    pub fn graphics_mut(&mut self) -> &mut (dyn GraphicsChanges + Send + Sync) {
        self.notify.graphics.as_mut()
    }

    /// Replaces the redraw sink. Bits pending on the old sink are dropped.
    pub fn set_graphics(&mut self, graphics: Box<dyn GraphicsChanges + Send + Sync>) {
        self.notify.graphics = graphics;
    }

    pub(crate) fn set_tracking(&mut self, enabled: bool) {
        self.notify.tracker.set_enabled(enabled);
    }

    pub(crate) fn polymer_config(&self) -> &PolymerConfig {
        &self.polymer_config
    }

    // ---- invalidation -------------------------------------------------------------

    /// Any change to the bond graph, atom membership or atom naming.
    pub(crate) fn topology_changed(&mut self) {
        let cache = self
            .ring_cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if !cache.is_empty() {
            trace!(entries = cache.len(), "Dropping cached ring sets after topology edit.");
            cache.clear();
            self.notify.graphics.set_gc_ring();
        }
        self.polymers_epoch.invalidate();
        self.ss_epoch.invalidate();
    }

    /// The ring cache. A poisoned lock still holds a consistent map, so it is reused.
    pub(crate) fn lock_ring_cache(&self) -> MutexGuard<'_, RingCache> {
        self.ring_cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn geometry_changed(&mut self) {
        self.ss_epoch.invalidate();
    }

    // ---- lookups ------------------------------------------------------------------

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn bond(&self, id: BondId) -> Option<&Bond> {
        self.bonds.get(id)
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn coord_set(&self, id: CoordSetId) -> Option<&CoordSet> {
        self.coord_sets.get(id)
    }

    pub fn pb_group(&self, id: PbGroupId) -> Option<&PbGroup> {
        self.pb_groups.get(id)
    }

    pub fn pseudobond(&self, id: PseudobondId) -> Option<&Pseudobond> {
        self.pseudobonds.get(id)
    }

    pub(crate) fn atom_ref(&self, id: AtomId) -> Result<&Atom, StructureError> {
        self.atoms.get(id).ok_or(StructureError::AtomNotFound(id))
    }

    pub(crate) fn bond_ref(&self, id: BondId) -> Result<&Bond, StructureError> {
        self.bonds.get(id).ok_or(StructureError::BondNotFound(id))
    }

    pub(crate) fn residue_ref(&self, id: ResidueId) -> Result<&Residue, StructureError> {
        self.residues.get(id).ok_or(StructureError::ResidueNotFound(id))
    }

    /// Atoms in creation order.
    pub fn atoms(&self) -> impl Iterator<Item = (AtomId, &Atom)> + '_ {
        self.atom_order
            .iter()
            .filter_map(|&id| self.atoms.get(id).map(|atom| (id, atom)))
    }

    /// Bonds in creation order.
    pub fn bonds(&self) -> impl Iterator<Item = (BondId, &Bond)> + '_ {
        self.bond_order
            .iter()
            .filter_map(|&id| self.bonds.get(id).map(|bond| (id, bond)))
    }

    /// Residues in creation order.
    pub fn residues(&self) -> impl Iterator<Item = (ResidueId, &Residue)> + '_ {
        self.residue_order
            .iter()
            .filter_map(|&id| self.residues.get(id).map(|residue| (id, residue)))
    }

    /// Chains in creation order.
    pub fn chains(&self) -> impl Iterator<Item = (ChainId, &Chain)> + '_ {
        self.chain_order
            .iter()
            .filter_map(|&id| self.chains.get(id).map(|chain| (id, chain)))
    }

    pub fn coord_sets(&self) -> impl Iterator<Item = (CoordSetId, &CoordSet)> + '_ {
        self.coord_set_order
            .iter()
            .filter_map(|&id| self.coord_sets.get(id).map(|cs| (id, cs)))
    }

    pub fn pb_groups(&self) -> impl Iterator<Item = (PbGroupId, &PbGroup)> + '_ {
        self.pb_group_order
            .iter()
            .filter_map(|&id| self.pb_groups.get(id).map(|group| (id, group)))
    }

    /// Every pseudobond, group by group.
    pub fn pseudobonds(&self) -> impl Iterator<Item = (PseudobondId, &Pseudobond)> + '_ {
        self.pb_groups().flat_map(move |(_, group)| {
            group
                .pseudobonds
                .iter()
                .filter_map(move |&id| self.pseudobonds.get(id).map(|pb| (id, pb)))
        })
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn pseudobond_count(&self) -> usize {
        self.pseudobonds.len()
    }

    pub fn find_residue(&self, key: &ResidueKey) -> Option<ResidueId> {
        self.residue_lookup.get(key).copied()
    }

    pub fn find_chain(&self, chain_id: &str) -> Option<ChainId> {
        self.chain_lookup.get(chain_id).copied()
    }

    /// The pseudobond group with this name and coordinate-set binding.
    pub fn find_pb_group(&self, name: &str, coord_set: Option<CoordSetId>) -> Option<PbGroupId> {
        self.pb_groups()
            .find(|(_, group)| group.name == name && group.coord_set == coord_set)
            .map(|(id, _)| id)
    }

    pub fn find_coord_set(&self, id: i32) -> Option<CoordSetId> {
        self.coord_sets()
            .find(|(_, cs)| cs.id == id)
            .map(|(cs_id, _)| cs_id)
    }

    /// The bond joining two atoms, in either order.
    pub fn bond_between(&self, atom1_id: AtomId, atom2_id: AtomId) -> Option<BondId> {
        self.bond_lookup
            .get(&AtomPair::new(atom1_id, atom2_id))
            .copied()
    }

    /// Number of residues with ribbon display on.
    pub fn ribbon_display_count(&self) -> usize {
        self.ribbon_display_count
    }

    // ---- residues and atoms -------------------------------------------------------

    /// Adds a new residue, creating its chain on first use.
    ///
    /// # Arguments
    ///
    /// * `name` - Residue name, e.g. `"ALA"`.
    /// * `chain_id` - Chain identifier; residues sharing it are indexed by one [`Chain`].
    /// * `number` - Sequence number.
    /// * `insertion_code` - Insertion code, `' '` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::DuplicateResidue`] if a residue with the same
    /// chain id, number and insertion code already exists.
    pub fn add_residue(
        &mut self,
        name: &str,
        chain_id: &str,
        number: i32,
        insertion_code: char,
    ) -> Result<ResidueId, StructureError> {
        let key = ResidueKey::new(chain_id, number, insertion_code);
        if self.residue_lookup.contains_key(&key) {
            return Err(StructureError::DuplicateResidue(key));
        }

        let chain = match self.chain_lookup.get(chain_id) {
            Some(&chain) => {
                self.notify.modified(chain, Reason::Residues);
                chain
            }
            None => {
                let chain = self.chains.insert(Chain::new(chain_id));
                self.chain_lookup.insert(chain_id.to_string(), chain);
                self.chain_order.push(chain);
                self.notify.created(chain);
                chain
            }
        };

        let mut residue = Residue::new(name, key.clone());
        residue.chain = Some(chain);
        let residue_id = self.residues.insert(residue);
        if let Some(chain) = self.chains.get_mut(chain) {
            chain.residues.push(residue_id);
        }
        self.residue_lookup.insert(key, residue_id);
        self.residue_order.push(residue_id);
        self.notify.created(residue_id);
        self.topology_changed();
        Ok(residue_id)
    }

    /// Adds a new atom to an existing residue.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::ResidueNotFound`] if the residue does not exist.
    pub fn add_atom(
        &mut self,
        residue_id: ResidueId,
        name: &str,
        element: Element,
    ) -> Result<AtomId, StructureError> {
        let residue = self
            .residues
            .get_mut(residue_id)
            .ok_or(StructureError::ResidueNotFound(residue_id))?;

        let atom_id = self.atoms.insert(Atom::new(name, element, residue_id));
        residue.add_atom(name, atom_id);
        self.atom_order.push(atom_id);
        self.notify.created(atom_id);
        self.notify.modified(residue_id, Reason::Atoms);
        self.topology_changed();
        Ok(atom_id)
    }

    /// Removes an atom with everything that depends on it: incident bonds,
    /// pseudobonds and coordinates. The residue is kept even if left empty.
    pub fn remove_atom(&mut self, atom_id: AtomId) -> Result<(), StructureError> {
        self.atom_ref(atom_id)?;
        self.purge_atoms(&HashSet::from([atom_id]));
        self.topology_changed();
        Ok(())
    }

    /// Removes a residue and all its atoms. A chain left without residues is
    /// removed as well.
    pub fn remove_residue(&mut self, residue_id: ResidueId) -> Result<(), StructureError> {
        let doomed: HashSet<AtomId> = self.residue_ref(residue_id)?.atoms.iter().copied().collect();
        self.purge_atoms(&doomed);

        let Some(residue) = self.residues.remove(residue_id) else {
            return Err(StructureError::ResidueNotFound(residue_id));
        };
        if residue.ribbon_display {
            self.ribbon_display_count = self.ribbon_display_count.saturating_sub(1);
        }
        self.residue_lookup.remove(&residue.key);
        self.residue_order.retain(|&id| id != residue_id);
        self.notify.deleted(residue_id);

        if let Some(chain_id) = residue.chain {
            let emptied = match self.chains.get_mut(chain_id) {
                Some(chain) => {
                    chain.residues.retain(|&id| id != residue_id);
                    chain.residues.is_empty()
                }
                None => false,
            };
            if emptied {
                if let Some(chain) = self.chains.remove(chain_id) {
                    self.chain_lookup.remove(&chain.chain_id);
                }
                self.chain_order.retain(|&id| id != chain_id);
                self.notify.deleted(chain_id);
            } else {
                self.notify.modified(chain_id, Reason::Residues);
            }
        }

        self.topology_changed();
        debug!(residue = %residue.key, atoms = doomed.len(), "Removed residue.");
        Ok(())
    }

    fn purge_atoms(&mut self, doomed: &HashSet<AtomId>) {
        if doomed.is_empty() {
            return;
        }

        let doomed_bonds: Vec<BondId> = doomed
            .iter()
            .filter_map(|&id| self.atoms.get(id))
            .flat_map(|atom| atom.bonds.iter().copied())
            .unique()
            .collect();
        for &bond_id in &doomed_bonds {
            self.detach_bond(bond_id);
        }
        if !doomed_bonds.is_empty() {
            self.bond_order.retain(|&id| self.bonds.contains_key(id));
        }

        let doomed_pseudobonds: Vec<PseudobondId> = self
            .pseudobonds
            .iter()
            .filter(|(_, pb)| doomed.contains(&pb.atoms[0]) || doomed.contains(&pb.atoms[1]))
            .map(|(id, _)| id)
            .collect();
        for pb_id in doomed_pseudobonds {
            self.detach_pseudobond(pb_id);
        }

        for coord_set in self.coord_sets.values_mut() {
            for &atom_id in doomed {
                coord_set.coords.remove(atom_id);
            }
        }

        for &atom_id in doomed {
            let Some(atom) = self.atoms.remove(atom_id) else {
                continue;
            };
            if let Some(residue) = self.residues.get_mut(atom.residue) {
                residue.remove_atom(&atom.name, atom_id);
                self.notify.modified(atom.residue, Reason::Atoms);
            }
            self.notify.deleted(atom_id);
        }
        self.atom_order.retain(|id| !doomed.contains(id));
    }

    // ---- bonds --------------------------------------------------------------------

    /// Adds a single bond between two atoms.
    ///
    /// # Errors
    ///
    /// - [`StructureError::AtomNotFound`] if either atom does not exist.
    /// - [`StructureError::SelfBond`] if both atoms are the same.
    /// - [`StructureError::DuplicateBond`] if the atoms are already bonded, in either order.
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId) -> Result<BondId, StructureError> {
        self.add_bond_with_order(atom1_id, atom2_id, BondOrder::Single)
    }

    /// Adds a bond of the given order; see [`add_bond`](Self::add_bond).
    pub fn add_bond_with_order(
        &mut self,
        atom1_id: AtomId,
        atom2_id: AtomId,
        order: BondOrder,
    ) -> Result<BondId, StructureError> {
        self.atom_ref(atom1_id)?;
        self.atom_ref(atom2_id)?;
        if atom1_id == atom2_id {
            return Err(StructureError::SelfBond(atom1_id));
        }
        let pair = AtomPair::new(atom1_id, atom2_id);
        if self.bond_lookup.contains_key(&pair) {
            return Err(StructureError::DuplicateBond {
                atom1: atom1_id,
                atom2: atom2_id,
            });
        }

        let bond_id = self.bonds.insert(Bond::new(atom1_id, atom2_id, order));
        for atom_id in [atom1_id, atom2_id] {
            if let Some(atom) = self.atoms.get_mut(atom_id) {
                atom.bonds.push(bond_id);
            }
        }
        self.bond_lookup.insert(pair, bond_id);
        self.bond_order.push(bond_id);
        self.notify.created(bond_id);
        self.topology_changed();
        Ok(bond_id)
    }

    pub fn remove_bond(&mut self, bond_id: BondId) -> Result<(), StructureError> {
        self.bond_ref(bond_id)?;
        self.detach_bond(bond_id);
        self.bond_order.retain(|&id| id != bond_id);
        self.topology_changed();
        Ok(())
    }

    /// Removes a bond from the arena, the lookup and its endpoints, leaving the
    /// order list to the caller.
    fn detach_bond(&mut self, bond_id: BondId) {
        let Some(bond) = self.bonds.remove(bond_id) else {
            return;
        };
        for atom_id in bond.atoms {
            if let Some(atom) = self.atoms.get_mut(atom_id) {
                atom.bonds.retain(|&id| id != bond_id);
            }
        }
        self.bond_lookup.remove(&bond.pair());
        self.notify.deleted(bond_id);
    }

    /// The endpoint of `bond_id` opposite `atom_id`.
    ///
    /// # Errors
    ///
    /// [`StructureError::NotAnEndpoint`] if `atom_id` is not one of the bond's atoms.
    pub fn other_atom(&self, bond_id: BondId, atom_id: AtomId) -> Result<AtomId, StructureError> {
        self.bond_ref(bond_id)?
            .other_atom(atom_id)
            .ok_or(StructureError::NotAnEndpoint { atom: atom_id })
    }

    /// Atoms bonded to `atom_id`, in bond creation order.
    pub fn neighbors(&self, atom_id: AtomId) -> Result<Vec<AtomId>, StructureError> {
        let atom = self.atom_ref(atom_id)?;
        Ok(atom
            .bonds
            .iter()
            .filter_map(|&b| self.bonds.get(b).and_then(|bond| bond.other_atom(atom_id)))
            .collect())
    }

    /// Bonds with one endpoint in each residue.
    ///
    /// Walks the incident bonds of the smaller residue only. With `just_first`, stops
    /// at the first hit.
    pub fn bonds_between(
        &self,
        residue1_id: ResidueId,
        residue2_id: ResidueId,
        just_first: bool,
    ) -> Result<Vec<BondId>, StructureError> {
        let r1 = self.residue_ref(residue1_id)?;
        let r2 = self.residue_ref(residue2_id)?;
        let (scan, target_id) = if r1.atoms.len() <= r2.atoms.len() {
            (r1, residue2_id)
        } else {
            (r2, residue1_id)
        };

        let mut found = Vec::new();
        for &atom_id in &scan.atoms {
            let Some(atom) = self.atoms.get(atom_id) else {
                continue;
            };
            for &bond_id in &atom.bonds {
                let other = self
                    .bonds
                    .get(bond_id)
                    .and_then(|bond| bond.other_atom(atom_id))
                    .and_then(|other| self.atoms.get(other));
                if other.is_some_and(|other| other.residue == target_id) {
                    found.push(bond_id);
                    if just_first {
                        return Ok(found);
                    }
                }
            }
        }
        Ok(found)
    }

    /// Whether a bond should be drawn: displayed and unhidden, both endpoints
    /// visible, and not both endpoints drawn as spheres.
    pub fn bond_shown(&self, bond_id: BondId) -> Result<bool, StructureError> {
        let bond = self.bond_ref(bond_id)?;
        let a1 = self.atom_ref(bond.atoms[0])?;
        let a2 = self.atom_ref(bond.atoms[1])?;
        Ok(bond.display
            && bond.hide.is_empty()
            && a1.visible()
            && a2.visible()
            && (a1.draw_mode != DrawMode::Sphere || a2.draw_mode != DrawMode::Sphere))
    }

    /// Distance between the bond's endpoints in the given coordinate set.
    pub fn bond_length(&self, bond_id: BondId, coord_set_id: CoordSetId) -> Result<f64, StructureError> {
        let bond = self.bond_ref(bond_id)?;
        let p1 = self.coord_in(bond.atoms[0], coord_set_id)?;
        let p2 = self.coord_in(bond.atoms[1], coord_set_id)?;
        Ok(nalgebra::distance(p1, p2))
    }

    // ---- coordinate sets ----------------------------------------------------------

    /// Adds an empty coordinate set. The first one added becomes active.
    pub fn add_coord_set(&mut self, id: i32) -> Result<CoordSetId, StructureError> {
        if self.find_coord_set(id).is_some() {
            return Err(StructureError::DuplicateCoordSet(id));
        }
        let cs_id = self.coord_sets.insert(CoordSet::new(id));
        self.coord_set_order.push(cs_id);
        self.notify.created(cs_id);
        if self.active_coord_set.is_none() {
            self.active_coord_set = Some(cs_id);
            self.notify.tracker.add_structure_modified(Reason::ActiveCoordSet);
            self.geometry_changed();
        }
        Ok(cs_id)
    }

    /// Removes a coordinate set together with the pseudobond groups bound to it.
    pub fn remove_coord_set(&mut self, cs_id: CoordSetId) -> Result<(), StructureError> {
        if !self.coord_sets.contains_key(cs_id) {
            return Err(StructureError::CoordSetNotFound(cs_id));
        }
        let bound: Vec<PbGroupId> = self
            .pb_groups
            .iter()
            .filter(|(_, group)| group.coord_set == Some(cs_id))
            .map(|(id, _)| id)
            .collect();
        for group_id in bound {
            self.remove_pb_group(group_id)?;
        }

        self.coord_sets.remove(cs_id);
        self.coord_set_order.retain(|&id| id != cs_id);
        self.notify.deleted(cs_id);
        if self.active_coord_set == Some(cs_id) {
            self.active_coord_set = self.coord_set_order.first().copied();
            self.notify.tracker.add_structure_modified(Reason::ActiveCoordSet);
            self.geometry_changed();
        }
        Ok(())
    }

    pub fn active_coord_set(&self) -> Option<CoordSetId> {
        self.active_coord_set
    }

    pub fn set_active_coord_set(&mut self, cs_id: CoordSetId) -> Result<(), StructureError> {
        if !self.coord_sets.contains_key(cs_id) {
            return Err(StructureError::CoordSetNotFound(cs_id));
        }
        if self.active_coord_set == Some(cs_id) {
            return Ok(());
        }
        self.active_coord_set = Some(cs_id);
        self.notify.tracker.add_structure_modified(Reason::ActiveCoordSet);
        self.notify.graphics.set_gc_shape();
        self.geometry_changed();
        Ok(())
    }

    /// Sets an atom's position in one coordinate set.
    pub fn set_coord(
        &mut self,
        atom_id: AtomId,
        cs_id: CoordSetId,
        coord: Point3<f64>,
    ) -> Result<(), StructureError> {
        self.atom_ref(atom_id)?;
        let coord_set = self
            .coord_sets
            .get_mut(cs_id)
            .ok_or(StructureError::CoordSetNotFound(cs_id))?;
        if coord_set.coords.get(atom_id) == Some(&coord) {
            return Ok(());
        }
        coord_set.coords.insert(atom_id, coord);
        self.notify.modified(atom_id, Reason::Coord);
        self.notify.graphics.set_gc_shape();
        if self.active_coord_set == Some(cs_id) {
            self.geometry_changed();
        }
        Ok(())
    }

    /// The atom's position in the active coordinate set.
    pub fn coord(&self, atom_id: AtomId) -> Option<&Point3<f64>> {
        self.active_coord_set
            .and_then(|cs| self.coord_sets.get(cs))
            .and_then(|cs| cs.coord(atom_id))
    }

    pub fn coord_in(&self, atom_id: AtomId, cs_id: CoordSetId) -> Result<&Point3<f64>, StructureError> {
        let coord_set = self
            .coord_sets
            .get(cs_id)
            .ok_or(StructureError::CoordSetNotFound(cs_id))?;
        coord_set
            .coord(atom_id)
            .ok_or(StructureError::MissingCoordinates {
                atom: atom_id,
                coord_set: cs_id,
            })
    }

    // ---- pseudobonds --------------------------------------------------------------

    /// Adds a named pseudobond group, optionally bound to one coordinate set.
    pub fn add_pb_group(
        &mut self,
        name: &str,
        coord_set: Option<CoordSetId>,
    ) -> Result<PbGroupId, StructureError> {
        if let Some(cs_id) = coord_set {
            if !self.coord_sets.contains_key(cs_id) {
                return Err(StructureError::CoordSetNotFound(cs_id));
            }
        }
        if self.find_pb_group(name, coord_set).is_some() {
            return Err(StructureError::DuplicatePbGroup(name.to_string()));
        }
        let group_id = self.pb_groups.insert(PbGroup::new(name, coord_set));
        self.pb_group_order.push(group_id);
        self.notify.created(group_id);
        Ok(group_id)
    }

    pub fn remove_pb_group(&mut self, group_id: PbGroupId) -> Result<(), StructureError> {
        let group = self
            .pb_groups
            .remove(group_id)
            .ok_or(StructureError::PbGroupNotFound(group_id))?;
        for pb_id in group.pseudobonds {
            if self.pseudobonds.remove(pb_id).is_some() {
                self.notify.deleted(pb_id);
            }
        }
        self.pb_group_order.retain(|&id| id != group_id);
        self.notify.deleted(group_id);
        Ok(())
    }

    /// Adds a pseudobond to a group. The same atom pair may be joined more than once.
    ///
    /// # Errors
    ///
    /// [`StructureError::SelfPseudobond`] if both atoms are the same.
    pub fn add_pseudobond(
        &mut self,
        group_id: PbGroupId,
        atom1_id: AtomId,
        atom2_id: AtomId,
    ) -> Result<PseudobondId, StructureError> {
        self.atom_ref(atom1_id)?;
        self.atom_ref(atom2_id)?;
        if atom1_id == atom2_id {
            return Err(StructureError::SelfPseudobond(atom1_id));
        }
        let group = self
            .pb_groups
            .get_mut(group_id)
            .ok_or(StructureError::PbGroupNotFound(group_id))?;

        let pb_id = self
            .pseudobonds
            .insert(Pseudobond::new(atom1_id, atom2_id, group_id, group));
        group.pseudobonds.push(pb_id);
        self.notify.created(pb_id);
        self.notify.modified(group_id, Reason::Pseudobonds);
        Ok(pb_id)
    }

    pub fn remove_pseudobond(&mut self, pb_id: PseudobondId) -> Result<(), StructureError> {
        if !self.pseudobonds.contains_key(pb_id) {
            return Err(StructureError::PseudobondNotFound(pb_id));
        }
        self.detach_pseudobond(pb_id);
        Ok(())
    }

    fn detach_pseudobond(&mut self, pb_id: PseudobondId) {
        let Some(pb) = self.pseudobonds.remove(pb_id) else {
            return;
        };
        if let Some(group) = self.pb_groups.get_mut(pb.group) {
            group.pseudobonds.retain(|&id| id != pb_id);
            self.notify.modified(pb.group, Reason::Pseudobonds);
        }
        self.notify.deleted(pb_id);
    }

    /// Whether a pseudobond should be drawn, given its group and endpoint atoms.
    pub fn pseudobond_shown(&self, pb_id: PseudobondId) -> Result<bool, StructureError> {
        let pb = self
            .pseudobonds
            .get(pb_id)
            .ok_or(StructureError::PseudobondNotFound(pb_id))?;
        let group_shown = self.pb_groups.get(pb.group).is_some_and(|g| g.display);
        let a1 = self.atom_ref(pb.atoms[0])?;
        let a2 = self.atom_ref(pb.atoms[1])?;
        Ok(group_shown && pb.shown_between(a1, a2))
    }
}
