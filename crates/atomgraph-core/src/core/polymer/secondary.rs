//! Secondary-structure derivation.
//!
//! The structure stores one `ss_type`/`ss_id` pair per residue. Reading either through
//! [`Structure::ss_type`] or [`Structure::ss_id`] runs the configured
//! [`SecondaryStructureAssigner`] once if an edit has invalidated the previous result.
//! Explicit assignments through [`Structure::set_ss_type`] stand until the next such edit.

use crate::core::changes::Reason;
use crate::core::graphics::GraphicsChange;
use crate::core::models::error::StructureError;
use crate::core::models::ids::ResidueId;
use crate::core::models::residue::{PolymerType, SsType};
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::{angle_difference, dihedral_angle};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The classification of one residue produced by an assigner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsAssignment {
    pub residue: ResidueId,
    pub ss_type: SsType,
    pub ss_id: i32,
}

/// A secondary-structure classification pass.
///
/// Implementations read the structure and return classifications for any residues they
/// recognize; every residue left out becomes coil with `ss_id` -1.
pub trait SecondaryStructureAssigner: fmt::Debug {
    fn assign(&self, structure: &Structure) -> Vec<SsAssignment>;
}

/// A target (phi, psi) pair and the radius around it, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhiPsiWindow {
    pub phi: f64,
    pub psi: f64,
    pub include: f64,
}

impl PhiPsiWindow {
    pub fn contains(&self, phi: f64, psi: f64) -> bool {
        angle_difference(phi, self.phi) < self.include && angle_difference(psi, self.psi) < self.include
    }
}

/// Classifies amino-acid polymer residues by backbone torsions in the active
/// coordinate set.
///
/// Consecutive residues inside the helix window become a helix when the run is at
/// least `min_helix_len` long; runs inside the strand window become a strand from
/// `min_strand_len`. Each run gets a fresh `ss_id`, counting from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PhiPsiAssigner {
    pub helix: PhiPsiWindow,
    pub strand: PhiPsiWindow,
    pub min_helix_len: usize,
    pub min_strand_len: usize,
}

impl Default for PhiPsiAssigner {
    fn default() -> Self {
        Self {
            helix: PhiPsiWindow {
                phi: -57.0,
                psi: -48.0,
                include: 55.0,
            },
            strand: PhiPsiWindow {
                phi: -129.0,
                psi: 124.0,
                include: 40.0,
            },
            min_helix_len: 4,
            min_strand_len: 3,
        }
    }
}

impl PhiPsiAssigner {
    /// Backbone torsions of every residue in a sequence; ends and residues with
    /// missing coordinates have none.
    fn torsions(structure: &Structure, sequence: &[ResidueId]) -> Vec<Option<(f64, f64)>> {
        let backbone: Vec<Option<[nalgebra::Point3<f64>; 3]>> = sequence
            .iter()
            .map(|&id| {
                let residue = structure.residue(id)?;
                let pos = |name: &str| residue.find_atom(name).and_then(|a| structure.coord(a)).copied();
                Some([pos("N")?, pos("CA")?, pos("C")?])
            })
            .collect();

        (0..sequence.len())
            .map(|i| {
                let prev = backbone.get(i.checked_sub(1)?)?.as_ref()?;
                let [n, ca, c] = backbone[i].as_ref()?;
                let next = backbone.get(i + 1)?.as_ref()?;
                let phi = dihedral_angle(&prev[2], n, ca, c)?;
                let psi = dihedral_angle(n, ca, c, &next[0])?;
                Some((phi, psi))
            })
            .collect()
    }

    fn classify(&self, phi: f64, psi: f64) -> SsType {
        if self.helix.contains(phi, psi) {
            SsType::Helix
        } else if self.strand.contains(phi, psi) {
            SsType::Strand
        } else {
            SsType::Coil
        }
    }

    fn min_run(&self, ss_type: SsType) -> usize {
        match ss_type {
            SsType::Helix => self.min_helix_len,
            SsType::Strand => self.min_strand_len,
            SsType::Coil => usize::MAX,
        }
    }
}

impl SecondaryStructureAssigner for PhiPsiAssigner {
    fn assign(&self, structure: &Structure) -> Vec<SsAssignment> {
        let mut assignments = Vec::new();
        let mut next_id = 1;

        for sequence in structure.polymer_sequences() {
            let amino = sequence
                .first()
                .and_then(|&id| structure.residue(id))
                .is_some_and(|r| r.polymer_type == PolymerType::Amino);
            if !amino {
                continue;
            }

            let classes: Vec<SsType> = Self::torsions(structure, sequence)
                .into_iter()
                .map(|t| t.map_or(SsType::Coil, |(phi, psi)| self.classify(phi, psi)))
                .collect();

            let mut start = 0;
            while start < classes.len() {
                let kind = classes[start];
                let end = classes[start..]
                    .iter()
                    .position(|&c| c != kind)
                    .map_or(classes.len(), |offset| start + offset);
                if end - start >= self.min_run(kind) {
                    assignments.extend(sequence[start..end].iter().map(|&residue| SsAssignment {
                        residue,
                        ss_type: kind,
                        ss_id: next_id,
                    }));
                    next_id += 1;
                }
                start = end;
            }
        }
        assignments
    }
}

impl Structure {
    /// Replaces the secondary-structure pass. The current assignment becomes stale.
    pub fn set_secondary_structure_assigner(
        &mut self,
        assigner: Arc<dyn SecondaryStructureAssigner + Send + Sync>,
    ) {
        self.ss_assigner = assigner;
        self.ss_epoch.invalidate();
    }

    pub fn ss_type(&mut self, id: ResidueId) -> Result<SsType, StructureError> {
        self.residue_ref(id)?;
        self.ensure_secondary_structure();
        Ok(self.residue_ref(id)?.ss_type)
    }

    pub fn ss_id(&mut self, id: ResidueId) -> Result<i32, StructureError> {
        self.residue_ref(id)?;
        self.ensure_secondary_structure();
        Ok(self.residue_ref(id)?.ss_id)
    }

    /// Whether secondary structure has been assigned, by a pass or explicitly.
    pub fn ss_assigned(&self) -> bool {
        self.ss_assigned
    }

    /// Number of classification passes run so far.
    pub fn secondary_structure_passes(&self) -> usize {
        self.ss_passes
    }

    pub fn ensure_secondary_structure(&mut self) {
        if self.ss_epoch.is_stale() {
            self.compute_secondary_structure();
        }
    }

    /// Runs the classification pass unconditionally, refreshing polymers first.
    #[instrument(skip_all, name = "secondary_structure_pass", fields(residues = self.residue_count()))]
    pub fn compute_secondary_structure(&mut self) {
        self.ensure_polymers();
        let assigner = Arc::clone(&self.ss_assigner);
        let assigned: HashMap<ResidueId, (SsType, i32)> = assigner
            .assign(self)
            .into_iter()
            .map(|a| (a.residue, (a.ss_type, a.ss_id)))
            .collect();

        for id in self.residue_order.clone() {
            let (ss_type, ss_id) = assigned.get(&id).copied().unwrap_or((SsType::Coil, -1));
            let Some(residue) = self.residues.get_mut(id) else {
                continue;
            };
            self.notify
                .update(&mut residue.ss_type, ss_type, id, Reason::SsType, GraphicsChange::RIBBON);
            self.notify
                .update(&mut residue.ss_id, ss_id, id, Reason::SsId, GraphicsChange::RIBBON);
        }

        self.ss_assigned = true;
        self.ss_passes += 1;
        self.ss_epoch.mark_computed();
        debug!(
            helix = assigned.values().filter(|(t, _)| *t == SsType::Helix).count(),
            strand = assigned.values().filter(|(t, _)| *t == SsType::Strand).count(),
            "Assigned secondary structure."
        );
    }
}
