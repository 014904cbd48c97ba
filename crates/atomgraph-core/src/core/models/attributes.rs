//! Tracked attribute setters.
//!
//! Every setter is idempotent: assigning the current value records nothing and
//! raises no graphics change.

use super::atom::{DrawMode, Element, HideFlags};
use super::color::Rgba;
use super::error::StructureError;
use super::ids::{AtomId, BondId, PbGroupId, PseudobondId, ResidueId};
use super::residue::SsType;
use super::structure::Structure;
use super::topology::BondOrder;
use crate::core::changes::Reason;
use crate::core::graphics::GraphicsChange;

/// Generates a setter for one entity attribute.
macro_rules! tracked_setter {
    ($(#[$meta:meta])* $fn_name:ident, $arena:ident, $id_ty:ty, $not_found:ident, $field:ident: $ty:ty, $reason:ident, $gc:expr) => {
        $(#[$meta])*
        pub fn $fn_name(&mut self, id: $id_ty, value: $ty) -> Result<(), StructureError> {
            let entity = self
                .$arena
                .get_mut(id)
                .ok_or(StructureError::$not_found(id))?;
            self.notify
                .update(&mut entity.$field, value, id, Reason::$reason, $gc);
            Ok(())
        }
    };
}

impl Structure {
    // ---- atoms --------------------------------------------------------------------

    /// Renames an atom, keeping its residue's name index in step.
    ///
    /// Names decide polymer linkage, so a rename invalidates polymer and
    /// secondary-structure state.
    pub fn set_atom_name(&mut self, id: AtomId, name: &str) -> Result<(), StructureError> {
        let atom = self.atoms.get_mut(id).ok_or(StructureError::AtomNotFound(id))?;
        if atom.name == name {
            return Ok(());
        }
        let old = std::mem::replace(&mut atom.name, name.to_string());
        if let Some(residue) = self.residues.get_mut(atom.residue) {
            residue.rename_atom(&old, name, id);
        }
        self.notify.modified(id, Reason::Name);
        self.polymers_epoch.invalidate();
        self.ss_epoch.invalidate();
        Ok(())
    }

    tracked_setter!(set_element, atoms, AtomId, AtomNotFound, element: Element, Element, GraphicsChange::SHAPE);
    tracked_setter!(set_serial_number, atoms, AtomId, AtomNotFound, serial_number: i32, SerialNumber, GraphicsChange::empty());
    tracked_setter!(set_atom_display, atoms, AtomId, AtomNotFound, display: bool, Display, GraphicsChange::DISPLAY);
    tracked_setter!(
        /// Replaces the atom's hide bits wholesale.
        set_atom_hide, atoms, AtomId, AtomNotFound, hide: HideFlags, Hide, GraphicsChange::DISPLAY
    );
    tracked_setter!(set_draw_mode, atoms, AtomId, AtomNotFound, draw_mode: DrawMode, DrawMode, GraphicsChange::SHAPE);
    tracked_setter!(set_atom_color, atoms, AtomId, AtomNotFound, color: Rgba, Color, GraphicsChange::COLOR);
    tracked_setter!(set_bfactor, atoms, AtomId, AtomNotFound, bfactor: f64, BFactor, GraphicsChange::empty());

    // ---- bonds --------------------------------------------------------------------

    tracked_setter!(set_bond_order, bonds, BondId, BondNotFound, order: BondOrder, BondOrder, GraphicsChange::SHAPE);
    tracked_setter!(set_bond_display, bonds, BondId, BondNotFound, display: bool, Display, GraphicsChange::DISPLAY);
    tracked_setter!(set_bond_hide, bonds, BondId, BondNotFound, hide: HideFlags, Hide, GraphicsChange::DISPLAY);
    tracked_setter!(set_bond_halfbond, bonds, BondId, BondNotFound, halfbond: bool, Halfbond, GraphicsChange::COLOR);
    tracked_setter!(set_bond_radius, bonds, BondId, BondNotFound, radius: f64, Radius, GraphicsChange::SHAPE);
    tracked_setter!(set_bond_color, bonds, BondId, BondNotFound, color: Rgba, Color, GraphicsChange::COLOR);

    // ---- pseudobonds --------------------------------------------------------------

    tracked_setter!(set_pseudobond_display, pseudobonds, PseudobondId, PseudobondNotFound, display: bool, Display, GraphicsChange::DISPLAY);
    tracked_setter!(set_pseudobond_hide, pseudobonds, PseudobondId, PseudobondNotFound, hide: HideFlags, Hide, GraphicsChange::DISPLAY);
    tracked_setter!(set_pseudobond_halfbond, pseudobonds, PseudobondId, PseudobondNotFound, halfbond: bool, Halfbond, GraphicsChange::COLOR);
    tracked_setter!(set_pseudobond_radius, pseudobonds, PseudobondId, PseudobondNotFound, radius: f64, Radius, GraphicsChange::SHAPE);
    tracked_setter!(set_pseudobond_color, pseudobonds, PseudobondId, PseudobondNotFound, color: Rgba, Color, GraphicsChange::COLOR);
    tracked_setter!(
        /// Whether the pseudobond stays visible when one endpoint is hidden but displayed.
        set_shown_when_atoms_hidden, pseudobonds, PseudobondId, PseudobondNotFound,
        shown_when_atoms_hidden: bool, ShownWhenAtomsHidden, GraphicsChange::DISPLAY
    );

    tracked_setter!(set_pb_group_display, pb_groups, PbGroupId, PbGroupNotFound, display: bool, Display, GraphicsChange::DISPLAY);

    /// Sets the group color and recolors every member pseudobond.
    pub fn set_pb_group_color(&mut self, id: PbGroupId, color: Rgba) -> Result<(), StructureError> {
        let group = self.pb_groups.get_mut(id).ok_or(StructureError::PbGroupNotFound(id))?;
        self.notify
            .update(&mut group.color, color, id, Reason::Color, GraphicsChange::COLOR);
        for &pb_id in &group.pseudobonds {
            if let Some(pb) = self.pseudobonds.get_mut(pb_id) {
                self.notify
                    .update(&mut pb.color, color, pb_id, Reason::Color, GraphicsChange::COLOR);
            }
        }
        Ok(())
    }

    /// Sets the group radius and applies it to every member pseudobond.
    pub fn set_pb_group_radius(&mut self, id: PbGroupId, radius: f64) -> Result<(), StructureError> {
        let group = self.pb_groups.get_mut(id).ok_or(StructureError::PbGroupNotFound(id))?;
        self.notify
            .update(&mut group.radius, radius, id, Reason::Radius, GraphicsChange::SHAPE);
        for &pb_id in &group.pseudobonds {
            if let Some(pb) = self.pseudobonds.get_mut(pb_id) {
                self.notify
                    .update(&mut pb.radius, radius, pb_id, Reason::Radius, GraphicsChange::SHAPE);
            }
        }
        Ok(())
    }

    /// Sets the group halfbond mode and applies it to every member pseudobond.
    pub fn set_pb_group_halfbond(&mut self, id: PbGroupId, halfbond: bool) -> Result<(), StructureError> {
        let group = self.pb_groups.get_mut(id).ok_or(StructureError::PbGroupNotFound(id))?;
        self.notify
            .update(&mut group.halfbond, halfbond, id, Reason::Halfbond, GraphicsChange::COLOR);
        for &pb_id in &group.pseudobonds {
            if let Some(pb) = self.pseudobonds.get_mut(pb_id) {
                self.notify.update(
                    &mut pb.halfbond,
                    halfbond,
                    pb_id,
                    Reason::Halfbond,
                    GraphicsChange::COLOR,
                );
            }
        }
        Ok(())
    }

    // ---- residues -----------------------------------------------------------------

    pub fn set_residue_name(&mut self, id: ResidueId, name: &str) -> Result<(), StructureError> {
        let residue = self
            .residues
            .get_mut(id)
            .ok_or(StructureError::ResidueNotFound(id))?;
        if residue.name == name {
            return Ok(());
        }
        residue.name = name.to_string();
        self.notify.modified(id, Reason::Name);
        Ok(())
    }

    tracked_setter!(set_is_het, residues, ResidueId, ResidueNotFound, is_het: bool, IsHet, GraphicsChange::empty());
    tracked_setter!(set_ribbon_color, residues, ResidueId, ResidueNotFound, ribbon_color: Rgba, RibbonColor, GraphicsChange::RIBBON);
    tracked_setter!(set_ribbon_hide_backbone, residues, ResidueId, ResidueNotFound, ribbon_hide_backbone: bool, RibbonHideBackbone, GraphicsChange::RIBBON);
    tracked_setter!(
        /// Sets ribbon selection; marks both ribbon geometry and selection dirty.
        set_ribbon_selected, residues, ResidueId, ResidueNotFound, ribbon_selected: bool, RibbonSelected, GraphicsChange::RIBBON | GraphicsChange::SELECT
    );
    tracked_setter!(
        /// Sets the ribbon adjustment; a negative value restores the automatic default.
        set_ribbon_adjust, residues, ResidueId, ResidueNotFound, ribbon_adjust: f64, RibbonAdjust, GraphicsChange::RIBBON
    );

    /// Turns ribbon display on or off for a residue.
    ///
    /// Turning it off clears the ribbon hide bit from the residue's atoms and the
    /// bonds touching them.
    pub fn set_ribbon_display(&mut self, id: ResidueId, display: bool) -> Result<(), StructureError> {
        let residue = self
            .residues
            .get_mut(id)
            .ok_or(StructureError::ResidueNotFound(id))?;
        if !self.notify.update(
            &mut residue.ribbon_display,
            display,
            id,
            Reason::RibbonDisplay,
            GraphicsChange::RIBBON,
        ) {
            return Ok(());
        }

        if display {
            self.ribbon_display_count += 1;
        } else {
            self.ribbon_display_count = self.ribbon_display_count.saturating_sub(1);
            self.ribbon_clear_hide(id)?;
        }
        Ok(())
    }

    /// Removes the ribbon hide bit from a residue's atoms and their bonds.
    pub fn ribbon_clear_hide(&mut self, id: ResidueId) -> Result<(), StructureError> {
        let atom_ids = self.residue_ref(id)?.atoms.clone();
        for atom_id in atom_ids {
            let Some(atom) = self.atoms.get_mut(atom_id) else {
                continue;
            };
            let hide = atom.hide - HideFlags::RIBBON;
            self.notify
                .update(&mut atom.hide, hide, atom_id, Reason::Hide, GraphicsChange::DISPLAY);
            for &bond_id in &atom.bonds {
                if let Some(bond) = self.bonds.get_mut(bond_id) {
                    let hide = bond.hide - HideFlags::RIBBON;
                    self.notify
                        .update(&mut bond.hide, hide, bond_id, Reason::Hide, GraphicsChange::DISPLAY);
                }
            }
        }
        Ok(())
    }

    /// Explicitly classifies a residue.
    ///
    /// Marks the structure's secondary structure as assigned: explicit values stand
    /// until the next edit that invalidates secondary structure.
    pub fn set_ss_type(&mut self, id: ResidueId, ss_type: SsType) -> Result<(), StructureError> {
        self.apply_ss_type(id, ss_type)?;
        self.mark_ss_assigned();
        Ok(())
    }

    /// Explicitly sets a residue's secondary-structure id; see [`set_ss_type`](Self::set_ss_type).
    pub fn set_ss_id(&mut self, id: ResidueId, ss_id: i32) -> Result<(), StructureError> {
        self.apply_ss_id(id, ss_id)?;
        self.mark_ss_assigned();
        Ok(())
    }

    /// `true` makes the residue a helix; `false` makes a helix coil and leaves
    /// anything else alone.
    pub fn set_is_helix(&mut self, id: ResidueId, is_helix: bool) -> Result<(), StructureError> {
        self.set_ss_flag(id, SsType::Helix, is_helix)
    }

    /// `true` makes the residue a strand; `false` makes a strand coil and leaves
    /// anything else alone.
    pub fn set_is_strand(&mut self, id: ResidueId, is_strand: bool) -> Result<(), StructureError> {
        self.set_ss_flag(id, SsType::Strand, is_strand)
    }

    fn set_ss_flag(&mut self, id: ResidueId, kind: SsType, on: bool) -> Result<(), StructureError> {
        let current = self.residue_ref(id)?.ss_type;
        if on {
            self.set_ss_type(id, kind)
        } else if current == kind {
            self.set_ss_type(id, SsType::Coil)
        } else {
            Ok(())
        }
    }

    /// Tracked write of `ss_type` that leaves the assignment state alone.
    pub(crate) fn apply_ss_type(&mut self, id: ResidueId, ss_type: SsType) -> Result<(), StructureError> {
        let residue = self
            .residues
            .get_mut(id)
            .ok_or(StructureError::ResidueNotFound(id))?;
        self.notify
            .update(&mut residue.ss_type, ss_type, id, Reason::SsType, GraphicsChange::RIBBON);
        Ok(())
    }

    pub(crate) fn apply_ss_id(&mut self, id: ResidueId, ss_id: i32) -> Result<(), StructureError> {
        let residue = self
            .residues
            .get_mut(id)
            .ok_or(StructureError::ResidueNotFound(id))?;
        self.notify
            .update(&mut residue.ss_id, ss_id, id, Reason::SsId, GraphicsChange::RIBBON);
        Ok(())
    }

    fn mark_ss_assigned(&mut self) {
        self.ss_assigned = true;
        self.ss_epoch.mark_computed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fixtures::{benzene, peptide};

    mod idempotence {
        use super::*;

        #[test]
        fn setting_equal_value_records_nothing() {
            let (mut structure, atoms) = benzene();
            structure.take_changes();
            structure.graphics_mut().take_changes();

            structure.set_atom_display(atoms[0], true).unwrap();
            structure.set_draw_mode(atoms[0], DrawMode::EndCap).unwrap();
            structure.set_atom_name(atoms[0], "C1").unwrap();

            assert!(!structure.change_tracker().changed());
            assert!(structure.graphics().changes().is_empty());
        }

        #[test]
        fn modifications_collapse_per_reason() {
            let (mut structure, atoms) = benzene();
            structure.take_changes();
            structure.set_atom_color(atoms[1], Rgba::new(255, 0, 0, 255)).unwrap();
            structure.set_atom_color(atoms[1], Rgba::new(0, 0, 255, 255)).unwrap();
            structure.set_atom_display(atoms[1], false).unwrap();

            let changes = structure.take_changes();
            let reasons: Vec<Reason> = changes.atoms.reasons(atoms[1]).collect();
            assert_eq!(reasons, vec![Reason::Display, Reason::Color]);
        }

        #[test]
        fn missing_entity_fails_without_recording() {
            let (mut structure, atoms) = benzene();
            structure.remove_atom(atoms[0]).unwrap();
            structure.take_changes();
            assert_eq!(
                structure.set_atom_display(atoms[0], false),
                Err(StructureError::AtomNotFound(atoms[0]))
            );
            assert!(!structure.change_tracker().changed());
        }
    }

    mod graphics_bits {
        use super::*;

        #[test]
        fn each_attribute_raises_its_change_kind() {
            let (mut structure, atoms) = benzene();
            let bond = structure.bond_between(atoms[0], atoms[1]).unwrap();
            structure.graphics_mut().take_changes();

            structure.set_atom_color(atoms[0], Rgba::new(1, 2, 3, 255)).unwrap();
            assert_eq!(structure.graphics_mut().take_changes(), GraphicsChange::COLOR);

            structure.set_bond_order(bond, BondOrder::Aromatic).unwrap();
            assert_eq!(structure.graphics_mut().take_changes(), GraphicsChange::SHAPE);

            structure.set_bond_hide(bond, HideFlags::USER).unwrap();
            assert_eq!(structure.graphics_mut().take_changes(), GraphicsChange::DISPLAY);

            structure.set_bfactor(atoms[0], 12.5).unwrap();
            assert!(structure.graphics_mut().take_changes().is_empty());
        }

        #[test]
        fn ribbon_setters_mark_ribbon_geometry_dirty() {
            let (mut structure, residues) = peptide(1);
            structure.graphics_mut().take_changes();

            structure.set_ribbon_color(residues[0], Rgba::new(0, 255, 0, 255)).unwrap();
            assert_eq!(structure.graphics_mut().take_changes(), GraphicsChange::RIBBON);

            structure.set_ribbon_selected(residues[0], true).unwrap();
            assert_eq!(
                structure.graphics_mut().take_changes(),
                GraphicsChange::RIBBON | GraphicsChange::SELECT
            );
        }
    }

    mod atom_names {
        use super::*;

        #[test]
        fn rename_updates_residue_lookup() {
            let (mut structure, atoms) = benzene();
            let residue = structure.atom(atoms[2]).unwrap().residue();
            structure.set_atom_name(atoms[2], "CX").unwrap();

            let residue = structure.residue(residue).unwrap();
            assert!(residue.find_atom("C3").is_none());
            assert_eq!(residue.find_atom("CX"), Some(atoms[2]));
        }
    }

    mod ribbons {
        use super::*;

        #[test]
        fn ribbon_display_count_follows_toggles() {
            let (mut structure, residues) = peptide(3);
            structure.set_ribbon_display(residues[0], true).unwrap();
            structure.set_ribbon_display(residues[1], true).unwrap();
            structure.set_ribbon_display(residues[1], true).unwrap();
            assert_eq!(structure.ribbon_display_count(), 2);

            structure.set_ribbon_display(residues[0], false).unwrap();
            assert_eq!(structure.ribbon_display_count(), 1);

            structure.remove_residue(residues[1]).unwrap();
            assert_eq!(structure.ribbon_display_count(), 0);
        }

        #[test]
        fn turning_ribbon_off_clears_ribbon_hide_bits() {
            let (mut structure, residues) = peptide(1);
            let ca = structure.residue(residues[0]).unwrap().find_atom("CA").unwrap();
            let n = structure.residue(residues[0]).unwrap().find_atom("N").unwrap();
            let bond = structure.bond_between(n, ca).unwrap();

            structure.set_ribbon_display(residues[0], true).unwrap();
            structure.set_atom_hide(ca, HideFlags::RIBBON | HideFlags::USER).unwrap();
            structure.set_bond_hide(bond, HideFlags::RIBBON).unwrap();

            structure.set_ribbon_display(residues[0], false).unwrap();
            assert_eq!(structure.atom(ca).unwrap().hide(), HideFlags::USER);
            assert!(structure.bond(bond).unwrap().hide().is_empty());
        }

        #[test]
        fn ribbon_color_change_is_recorded_with_reason() {
            let (mut structure, residues) = peptide(1);
            structure.take_changes();
            structure.set_ribbon_color(residues[0], Rgba::new(10, 20, 30, 255)).unwrap();

            let changes = structure.take_changes();
            let reasons: Vec<String> = changes
                .residues
                .reasons(residues[0])
                .map(|r| r.to_string())
                .collect();
            assert_eq!(reasons, vec!["ribbon_color changed"]);
        }
    }

    mod secondary_flags {
        use super::*;

        #[test]
        fn helix_and_strand_flags_map_to_ss_type() {
            let (mut structure, residues) = peptide(2);
            structure.set_is_helix(residues[0], true).unwrap();
            assert_eq!(structure.ss_type(residues[0]).unwrap(), SsType::Helix);

            structure.set_is_strand(residues[0], false).unwrap();
            assert_eq!(structure.ss_type(residues[0]).unwrap(), SsType::Helix);

            structure.set_is_helix(residues[0], false).unwrap();
            assert_eq!(structure.ss_type(residues[0]).unwrap(), SsType::Coil);
        }
    }

    mod pb_groups {
        use super::*;

        #[test]
        fn group_color_propagates_to_members() {
            let (mut structure, atoms) = benzene();
            let group = structure.add_pb_group("contacts", None).unwrap();
            let pb = structure.add_pseudobond(group, atoms[0], atoms[3]).unwrap();
            let red = Rgba::new(255, 0, 0, 255);

            structure.set_pb_group_color(group, red).unwrap();
            assert_eq!(structure.pb_group(group).unwrap().color(), red);
            assert_eq!(structure.pseudobond(pb).unwrap().color(), red);
        }
    }
}
