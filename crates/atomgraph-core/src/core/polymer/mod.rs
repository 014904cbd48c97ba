//! # Polymer Module
//!
//! Classifies residues as amino-acid or nucleotide polymer members from the bond
//! graph, and derives per-residue secondary structure on top of that classification.
//!
//! Both derivations are lazy. Reading a derived value through the structure runs the
//! pass only if an edit has invalidated it since the last run.
//!
//! ## Key Components
//!
//! - [`Polymer`] - A maximal run of residues joined by backbone linkage bonds
//! - [`BackboneExtent`] - Which set of backbone atom names to report
//! - [`secondary`] - The pluggable secondary-structure pass

pub mod secondary;

use crate::core::models::error::StructureError;
use crate::core::models::ids::{AtomId, BondId, ChainId, ResidueId};
use crate::core::models::residue::PolymerType;
use crate::core::models::structure::Structure;
use crate::core::utils::identifiers::{
    AA_MAX_BACKBONE_NAMES, AA_MIN_BACKBONE_NAMES, AA_RIBBON_BACKBONE_NAMES, AMINO_PRINCIPAL_ATOM,
    NA_MAX_BACKBONE_NAMES, NA_MIN_BACKBONE_NAMES, NA_RIBBON_BACKBONE_NAMES,
    NUCLEIC_PRINCIPAL_ATOM, RIBOSE_NAMES,
};
use phf::Set;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// How much of a residue's backbone [`Structure::backbone_atom_names`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackboneExtent {
    /// Atoms that trace the chain.
    Min,
    /// Every backbone atom including hydrogens and terminal atoms.
    Max,
    /// Atoms a ribbon replaces.
    Ribbon,
}

/// A maximal run of residues joined by linkage bonds, upstream first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polymer {
    residues: Vec<ResidueId>,
    polymer_type: PolymerType,
}

impl Polymer {
    pub fn residues(&self) -> &[ResidueId] {
        &self.residues
    }

    pub fn polymer_type(&self) -> PolymerType {
        self.polymer_type
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

/// Result of scanning the bond graph for linkages.
#[derive(Debug, Default)]
struct Linkage {
    types: HashMap<ResidueId, PolymerType>,
    next: HashMap<ResidueId, ResidueId>,
    prev: HashMap<ResidueId, ResidueId>,
}

impl Structure {
    /// Polymer sequences, recomputing the classification if it is stale.
    pub fn polymers(&mut self) -> Vec<Polymer> {
        self.ensure_polymers();
        self.polymer_sequences
            .iter()
            .map(|residues| Polymer {
                polymer_type: residues
                    .first()
                    .and_then(|&id| self.residues.get(id))
                    .map(|r| r.polymer_type)
                    .unwrap_or_default(),
                residues: residues.clone(),
            })
            .collect()
    }

    pub fn residue_polymer_type(&mut self, id: ResidueId) -> Result<PolymerType, StructureError> {
        self.residue_ref(id)?;
        self.ensure_polymers();
        Ok(self.residue_ref(id)?.polymer_type)
    }

    /// The type of the chain's first polymeric residue.
    pub fn chain_polymer_type(&mut self, id: ChainId) -> Result<PolymerType, StructureError> {
        if !self.chains.contains_key(id) {
            return Err(StructureError::ChainNotFound(id));
        }
        self.ensure_polymers();
        self.chains
            .get(id)
            .map(|chain| chain.polymer_type)
            .ok_or(StructureError::ChainNotFound(id))
    }

    pub(crate) fn polymer_sequences(&self) -> &[Vec<ResidueId>] {
        &self.polymer_sequences
    }

    pub(crate) fn ensure_polymers(&mut self) {
        if self.polymers_epoch.is_stale() {
            self.compute_polymers();
        }
    }

    #[instrument(skip_all, name = "polymer_pass", fields(residues = self.residue_count(), bonds = self.bond_count()))]
    fn compute_polymers(&mut self) {
        let linkage = self.scan_linkage();
        let sequences = self.trace_sequences(&linkage);

        for (id, residue) in self.residues.iter_mut() {
            residue.polymer_type = linkage.types.get(&id).copied().unwrap_or_default();
        }
        for chain in self.chains.values_mut() {
            chain.polymer_type = chain
                .residues
                .iter()
                .filter_map(|&id| linkage.types.get(&id).copied())
                .next()
                .unwrap_or_default();
        }

        debug!(
            polymers = sequences.len(),
            linked_residues = linkage.types.len(),
            "Classified polymers."
        );
        self.polymer_sequences = sequences;
        self.polymers_epoch.mark_computed();
    }

    /// The linkage type if `upstream`-`downstream` names match a configured pair in
    /// that direction.
    fn linkage_type(&self, upstream: &str, downstream: &str) -> Option<PolymerType> {
        let config = self.polymer_config();
        if config.amino_linkage[0] == upstream && config.amino_linkage[1] == downstream {
            Some(PolymerType::Amino)
        } else if config.nucleic_linkage[0] == upstream && config.nucleic_linkage[1] == downstream {
            Some(PolymerType::Nucleic)
        } else {
            None
        }
    }

    /// Orients a bond between two residues as (upstream atom, linkage type), if it
    /// is a linkage bond.
    fn orient_linkage(&self, atom1_id: AtomId, atom2_id: AtomId) -> Option<(AtomId, PolymerType)> {
        let a1 = self.atoms.get(atom1_id)?;
        let a2 = self.atoms.get(atom2_id)?;
        if a1.residue == a2.residue {
            return None;
        }
        if let Some(kind) = self.linkage_type(&a1.name, &a2.name) {
            return Some((atom1_id, kind));
        }
        self.linkage_type(&a2.name, &a1.name)
            .map(|kind| (atom2_id, kind))
    }

    fn scan_linkage(&self) -> Linkage {
        let mut linkage = Linkage::default();
        for (_, bond) in self.bonds() {
            let [a1, a2] = bond.atoms();
            let Some((upstream, kind)) = self.orient_linkage(a1, a2) else {
                continue;
            };
            let downstream = if upstream == a1 { a2 } else { a1 };
            let (Some(up), Some(down)) = (self.atoms.get(upstream), self.atoms.get(downstream)) else {
                continue;
            };
            let (up, down) = (up.residue, down.residue);

            if linkage.next.contains_key(&up) || linkage.prev.contains_key(&down) {
                continue;
            }
            linkage.next.insert(up, down);
            linkage.prev.insert(down, up);
            linkage.types.entry(up).or_insert(kind);
            linkage.types.entry(down).or_insert(kind);
        }
        linkage
    }

    /// Follows `next` links into sequences: chain heads first, then any cycles, each
    /// in residue creation order.
    fn trace_sequences(&self, linkage: &Linkage) -> Vec<Vec<ResidueId>> {
        let mut visited: HashSet<ResidueId> = HashSet::new();
        let mut sequences = Vec::new();

        let heads = self
            .residue_order
            .iter()
            .filter(|id| linkage.next.contains_key(id) && !linkage.prev.contains_key(id));
        let cycle_members = self
            .residue_order
            .iter()
            .filter(|id| linkage.next.contains_key(id));

        for &start in heads.chain(cycle_members) {
            if visited.contains(&start) {
                continue;
            }
            let mut sequence = Vec::new();
            let mut current = Some(start);
            while let Some(id) = current {
                if !visited.insert(id) {
                    break;
                }
                sequence.push(id);
                current = linkage.next.get(&id).copied();
            }
            if sequence.len() >= 2 {
                sequences.push(sequence);
            }
        }
        sequences
    }

    /// Whether a bond between these atoms would link two residues into a polymer.
    pub fn polymer_bond_atoms(&self, atom1_id: AtomId, atom2_id: AtomId) -> Result<bool, StructureError> {
        self.atom_ref(atom1_id)?;
        self.atom_ref(atom2_id)?;
        Ok(self.orient_linkage(atom1_id, atom2_id).is_some())
    }

    /// The upstream atom of a linkage bond, or `None` for any other bond.
    pub fn polymeric_start_atom(&self, bond_id: BondId) -> Result<Option<AtomId>, StructureError> {
        let [a1, a2] = self.bond_ref(bond_id)?.atoms();
        Ok(self.orient_linkage(a1, a2).map(|(upstream, _)| upstream))
    }

    /// The atom that stands for a residue: `CA` for amino acids, `C4'` for
    /// nucleotides, the only atom of a single-atom residue, otherwise none.
    pub fn principal_atom(&mut self, id: ResidueId) -> Result<Option<AtomId>, StructureError> {
        let polymer_type = self.residue_polymer_type(id)?;
        let residue = self.residue_ref(id)?;
        let named = match polymer_type {
            PolymerType::Amino => residue.find_atom(AMINO_PRINCIPAL_ATOM),
            PolymerType::Nucleic => residue.find_atom(NUCLEIC_PRINCIPAL_ATOM),
            PolymerType::None => None,
        };
        Ok(named.or_else(|| match residue.atoms() {
            [only] => Some(*only),
            _ => None,
        }))
    }

    /// Backbone atom names for the residue's polymer type, or `None` for
    /// non-polymer residues.
    pub fn backbone_atom_names(
        &mut self,
        id: ResidueId,
        extent: BackboneExtent,
    ) -> Result<Option<&'static Set<&'static str>>, StructureError> {
        Ok(match (self.residue_polymer_type(id)?, extent) {
            (PolymerType::Amino, BackboneExtent::Min) => Some(&AA_MIN_BACKBONE_NAMES),
            (PolymerType::Amino, BackboneExtent::Max) => Some(&AA_MAX_BACKBONE_NAMES),
            (PolymerType::Amino, BackboneExtent::Ribbon) => Some(&AA_RIBBON_BACKBONE_NAMES),
            (PolymerType::Nucleic, BackboneExtent::Min) => Some(&NA_MIN_BACKBONE_NAMES),
            (PolymerType::Nucleic, BackboneExtent::Max) => Some(&NA_MAX_BACKBONE_NAMES),
            (PolymerType::Nucleic, BackboneExtent::Ribbon) => Some(&NA_RIBBON_BACKBONE_NAMES),
            (PolymerType::None, _) => None,
        })
    }

    /// Ribose atom names for nucleotides, `None` otherwise.
    pub fn ribose_atom_names(
        &mut self,
        id: ResidueId,
    ) -> Result<Option<&'static Set<&'static str>>, StructureError> {
        Ok(match self.residue_polymer_type(id)? {
            PolymerType::Nucleic => Some(&RIBOSE_NAMES),
            _ => None,
        })
    }
}
