//! Per-structure ledger of what changed since the last checkpoint.
//!
//! Mutating operations on a [`Structure`](crate::core::models::structure::Structure)
//! record created, modified and deleted entities here. Downstream consumers (renderers,
//! scripting hooks) call [`ChangeTracker::clear`] once per sync point and receive every
//! change made since their previous call.
//!
//! Entities are recorded by handle. Handles are versioned, so a deleted entity's handle
//! is never confused with a later one and the ledger never keeps anything alive.

use crate::core::models::ids::{
    AtomId, BondId, ChainId, CoordSetId, PbGroupId, PseudobondId, ResidueId,
};
use slotmap::Key;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use tracing::trace;

/// Why an entity was reported as modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reason {
    Name,
    Element,
    SerialNumber,
    Display,
    Hide,
    DrawMode,
    Color,
    Coord,
    BFactor,
    BondOrder,
    Halfbond,
    Radius,
    ShownWhenAtomsHidden,
    IsHet,
    RibbonAdjust,
    RibbonColor,
    RibbonDisplay,
    RibbonHideBackbone,
    RibbonSelected,
    SsId,
    SsType,
    Residues,
    Atoms,
    Pseudobonds,
    ActiveCoordSet,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name changed",
            Self::Element => "element changed",
            Self::SerialNumber => "serial_number changed",
            Self::Display => "display changed",
            Self::Hide => "hide changed",
            Self::DrawMode => "draw_mode changed",
            Self::Color => "color changed",
            Self::Coord => "coord changed",
            Self::BFactor => "bfactor changed",
            Self::BondOrder => "order changed",
            Self::Halfbond => "halfbond changed",
            Self::Radius => "radius changed",
            Self::ShownWhenAtomsHidden => "shown_when_atoms_hidden changed",
            Self::IsHet => "is_het changed",
            Self::RibbonAdjust => "ribbon_adjust changed",
            Self::RibbonColor => "ribbon_color changed",
            Self::RibbonDisplay => "ribbon_display changed",
            Self::RibbonHideBackbone => "ribbon_hide_backbone changed",
            Self::RibbonSelected => "ribbon_selected changed",
            Self::SsId => "ss_id changed",
            Self::SsType => "ss_type changed",
            Self::Residues => "residues changed",
            Self::Atoms => "atoms changed",
            Self::Pseudobonds => "pseudobonds changed",
            Self::ActiveCoordSet => "active_coordset changed",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The changes recorded for one entity kind within one epoch.
///
/// Created, modified and deleted are mutually exclusive for a given entity.
#[derive(Debug, Clone)]
pub struct KindChanges<K: Key> {
    created: HashSet<K>,
    modified: HashMap<K, BTreeSet<Reason>>,
    deleted: HashSet<K>,
}

impl<K: Key> Default for KindChanges<K> {
    fn default() -> Self {
        Self {
            created: HashSet::new(),
            modified: HashMap::new(),
            deleted: HashSet::new(),
        }
    }
}

impl<K: Key> KindChanges<K> {
    pub fn created(&self) -> &HashSet<K> {
        &self.created
    }

    pub fn modified(&self) -> &HashMap<K, BTreeSet<Reason>> {
        &self.modified
    }

    pub fn deleted(&self) -> &HashSet<K> {
        &self.deleted
    }

    /// Reasons recorded for one entity; empty if it was not modified.
    pub fn reasons(&self, id: K) -> impl Iterator<Item = Reason> + '_ {
        self.modified.get(&id).into_iter().flatten().copied()
    }

    /// Union of the reasons recorded for every modified entity of this kind.
    pub fn all_reasons(&self) -> BTreeSet<Reason> {
        self.modified.values().flatten().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Total number of ledger entries: one per created or deleted entity and one
    /// per distinct (entity, reason) modification.
    pub fn entry_count(&self) -> usize {
        self.created.len()
            + self.deleted.len()
            + self.modified.values().map(BTreeSet::len).sum::<usize>()
    }

    fn add_created(&mut self, id: K) {
        self.modified.remove(&id);
        self.created.insert(id);
    }

    fn add_modified(&mut self, id: K, reason: Reason) -> bool {
        if self.created.contains(&id) || self.deleted.contains(&id) {
            return false;
        }
        self.modified.entry(id).or_default().insert(reason)
    }

    fn add_deleted(&mut self, id: K) {
        self.modified.remove(&id);
        // An entity created and deleted within one epoch never existed for consumers.
        if !self.created.remove(&id) {
            self.deleted.insert(id);
        }
    }
}

/// Everything recorded during one change epoch.
#[derive(Debug, Clone, Default)]
pub struct Changes {
    pub atoms: KindChanges<AtomId>,
    pub bonds: KindChanges<BondId>,
    pub residues: KindChanges<ResidueId>,
    pub chains: KindChanges<ChainId>,
    pub coord_sets: KindChanges<CoordSetId>,
    pub pb_groups: KindChanges<PbGroupId>,
    pub pseudobonds: KindChanges<PseudobondId>,
    pub structure: BTreeSet<Reason>,
}

impl Changes {
    /// Ledger for one entity kind, selected by handle type.
    pub fn of<K: Tracked>(&self) -> &KindChanges<K> {
        K::ledger(self)
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
            && self.bonds.is_empty()
            && self.residues.is_empty()
            && self.chains.is_empty()
            && self.coord_sets.is_empty()
            && self.pb_groups.is_empty()
            && self.pseudobonds.is_empty()
            && self.structure.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.atoms.entry_count()
            + self.bonds.entry_count()
            + self.residues.entry_count()
            + self.chains.entry_count()
            + self.coord_sets.entry_count()
            + self.pb_groups.entry_count()
            + self.pseudobonds.entry_count()
            + self.structure.len()
    }
}

/// Handle types that have their own ledger in [`Changes`].
pub trait Tracked: Key {
    fn ledger(changes: &Changes) -> &KindChanges<Self>;
    fn ledger_mut(changes: &mut Changes) -> &mut KindChanges<Self>;
}

macro_rules! impl_tracked {
    ($($id:ty => $field:ident),* $(,)?) => {
        $(
            impl Tracked for $id {
                fn ledger(changes: &Changes) -> &KindChanges<Self> {
                    &changes.$field
                }
                fn ledger_mut(changes: &mut Changes) -> &mut KindChanges<Self> {
                    &mut changes.$field
                }
            }
        )*
    };
}

impl_tracked! {
    AtomId => atoms,
    BondId => bonds,
    ResidueId => residues,
    ChainId => chains,
    CoordSetId => coord_sets,
    PbGroupId => pb_groups,
    PseudobondId => pseudobonds,
}

/// The change ledger owned by one structure.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    changes: Changes,
    enabled: bool,
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self {
            changes: Changes::default(),
            enabled: true,
        }
    }
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_created<K: Tracked>(&mut self, id: K) {
        if self.enabled {
            K::ledger_mut(&mut self.changes).add_created(id);
        }
    }

    pub fn add_modified<K: Tracked>(&mut self, id: K, reason: Reason) {
        if self.enabled && K::ledger_mut(&mut self.changes).add_modified(id, reason) {
            trace!(?id, %reason, "Recorded modification.");
        }
    }

    pub fn add_deleted<K: Tracked>(&mut self, id: K) {
        if self.enabled {
            K::ledger_mut(&mut self.changes).add_deleted(id);
        }
    }

    /// Records a structure-level change (one not attached to a single entity).
    pub fn add_structure_modified(&mut self, reason: Reason) {
        if self.enabled {
            self.changes.structure.insert(reason);
        }
    }

    /// Whether anything was recorded since the last checkpoint.
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }

    /// The pending ledger, without checkpointing.
    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    /// Checkpoint: hands back the current ledger and starts a new, empty epoch.
    pub fn clear(&mut self) -> Changes {
        std::mem::take(&mut self.changes)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stops (or resumes) recording. While disabled every call is a no-op.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}
