use super::SessionVersion;
use super::error::SessionError;
use super::record::SessionRecord;
use super::schema::{ConnectionRecord, SessionContents};
use crate::core::models::atom::Element;
use crate::core::models::ids::{AtomId, ChainId, CoordSetId, ResidueId};
use crate::core::models::structure::Structure;
use crate::core::topology::config::TopologyConfig;
use std::collections::HashSet;
use tracing::{debug, instrument};

fn lookup<T: Copy>(items: &[T], index: usize, kind: &'static str) -> Result<T, SessionError> {
    items.get(index).copied().ok_or(SessionError::BadIndex {
        kind,
        index,
        count: items.len(),
    })
}

fn lookup_opt<T: Copy>(
    items: &[T],
    index: Option<usize>,
    kind: &'static str,
) -> Result<Option<T>, SessionError> {
    index.map(|i| lookup(items, i, kind)).transpose()
}

/// Rebuilds a structure from a session record.
///
/// The structure is built privately and only returned once every stream value has
/// been consumed and every cross reference resolved. Restoring records no changes.
#[instrument(skip_all, name = "session_restore", fields(version = record.version, ints = record.ints.len()))]
pub(crate) fn decode(
    record: &SessionRecord,
    config: &TopologyConfig,
) -> Result<(Structure, SessionVersion), SessionError> {
    let version = SessionVersion::try_from(record.version)?;
    let contents = SessionContents::read(version, &record.ints, &record.floats)?;

    let mut structure = Structure::with_config(&contents.name, config);
    structure.set_tracking(false);
    build(&mut structure, &contents)?;
    structure.take_changes();
    structure.set_tracking(true);
    structure.graphics_mut().take_changes();

    debug!(
        atoms = structure.atom_count(),
        bonds = structure.bond_count(),
        residues = structure.residue_count(),
        "Restored structure from session."
    );
    Ok((structure, version))
}

fn build(structure: &mut Structure, contents: &SessionContents) -> Result<(), SessionError> {
    let atoms = build_residues(structure, contents)?;
    build_bonds(structure, contents, &atoms)?;
    build_chains(structure, contents)?;
    let coord_sets = build_coord_sets(structure, contents, &atoms)?;
    build_pb_groups(structure, contents, &atoms, &coord_sets)?;

    if contents.ss_assigned {
        structure.ss_assigned = true;
        structure.ss_epoch.mark_computed();
    }
    Ok(())
}

/// Creates residues and their listed atoms. Every atom must belong to exactly one
/// residue; the atom creation order is reset to stream order afterwards.
fn build_residues(
    structure: &mut Structure,
    contents: &SessionContents,
) -> Result<Vec<AtomId>, SessionError> {
    let mut atoms: Vec<Option<AtomId>> = vec![None; contents.atoms.len()];

    for record in &contents.residues {
        let residue_id = structure.add_residue(
            &record.name,
            &record.chain_id,
            record.number,
            record.insertion_code,
        )?;
        for &index in &record.atoms {
            let atom_record = contents.atoms.get(index).ok_or(SessionError::BadIndex {
                kind: "atom",
                index,
                count: contents.atoms.len(),
            })?;
            if atoms[index].is_some() {
                return Err(SessionError::Inconsistent(format!(
                    "atom {index} is listed by more than one residue"
                )));
            }
            let element = u8::try_from(atom_record.element)
                .ok()
                .and_then(Element::from_number)
                .ok_or(SessionError::InvalidValue {
                    field: "atom element",
                    value: atom_record.element.into(),
                })?;
            let atom_id = structure.add_atom(residue_id, &atom_record.name, element)?;
            if let Some(atom) = structure.atoms.get_mut(atom_id) {
                atom.serial_number = atom_record.serial_number;
                atom.display = atom_record.display;
                atom.hide = atom_record.hide;
                atom.draw_mode = atom_record.draw_mode;
                atom.color = atom_record.color;
                atom.bfactor = atom_record.bfactor;
            }
            atoms[index] = Some(atom_id);
        }

        if let Some(residue) = structure.residues.get_mut(residue_id) {
            residue.is_het = record.is_het;
            residue.polymer_type = record.polymer_type;
            residue.ss_id = record.ss_id;
            residue.ss_type = record.ss_type;
            residue.ribbon_display = record.ribbon_display;
            residue.ribbon_hide_backbone = record.ribbon_hide_backbone;
            residue.ribbon_selected = record.ribbon_selected;
            residue.ribbon_color = record.ribbon_color;
            residue.ribbon_adjust = record.ribbon_adjust;
        }
    }

    let atoms = atoms
        .into_iter()
        .enumerate()
        .map(|(index, atom)| {
            atom.ok_or_else(|| {
                SessionError::Inconsistent(format!("atom {index} belongs to no residue"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    structure.atom_order = atoms.clone();
    structure.ribbon_display_count = contents.residues.iter().filter(|r| r.ribbon_display).count();
    Ok(atoms)
}

fn connection_atoms(
    connection: &ConnectionRecord,
    atoms: &[AtomId],
) -> Result<(AtomId, AtomId), SessionError> {
    Ok((
        lookup(atoms, connection.atoms[0], "atom")?,
        lookup(atoms, connection.atoms[1], "atom")?,
    ))
}

fn build_bonds(
    structure: &mut Structure,
    contents: &SessionContents,
    atoms: &[AtomId],
) -> Result<(), SessionError> {
    for record in &contents.bonds {
        let (a1, a2) = connection_atoms(&record.connection, atoms)?;
        let bond_id = structure.add_bond_with_order(a1, a2, record.order)?;
        if let Some(bond) = structure.bonds.get_mut(bond_id) {
            bond.display = record.connection.display;
            bond.hide = record.connection.hide;
            bond.halfbond = record.connection.halfbond;
            bond.radius = record.connection.radius;
        }
    }
    Ok(())
}

/// Chains were created by their residues; the records fix their order and the
/// order of residues within each.
fn build_chains(structure: &mut Structure, contents: &SessionContents) -> Result<(), SessionError> {
    if contents.chains.len() != structure.chain_order.len() {
        return Err(SessionError::Inconsistent(format!(
            "session lists {} chains but its residues name {}",
            contents.chains.len(),
            structure.chain_order.len()
        )));
    }
    let residues: Vec<ResidueId> = structure.residue_order.clone();

    let mut order: Vec<ChainId> = Vec::with_capacity(contents.chains.len());
    let mut seen: HashSet<ChainId> = HashSet::with_capacity(contents.chains.len());
    for record in &contents.chains {
        let chain_id = structure.find_chain(&record.chain_id).ok_or_else(|| {
            SessionError::Inconsistent(format!("chain '{}' has no residues", record.chain_id))
        })?;
        if !seen.insert(chain_id) {
            return Err(SessionError::Inconsistent(format!(
                "chain '{}' listed twice",
                record.chain_id
            )));
        }
        let members = record
            .residues
            .iter()
            .map(|&i| lookup(&residues, i, "residue"))
            .collect::<Result<Vec<_>, _>>()?;
        let Some(chain) = structure.chains.get_mut(chain_id) else {
            continue;
        };
        let expected: HashSet<ResidueId> = chain.residues.iter().copied().collect();
        let listed: HashSet<ResidueId> = members.iter().copied().collect();
        if expected != listed || listed.len() != members.len() {
            return Err(SessionError::Inconsistent(format!(
                "chain '{}' does not list exactly its residues",
                record.chain_id
            )));
        }
        chain.residues = members;
        order.push(chain_id);
    }
    structure.chain_order = order;
    Ok(())
}

fn build_coord_sets(
    structure: &mut Structure,
    contents: &SessionContents,
    atoms: &[AtomId],
) -> Result<Vec<CoordSetId>, SessionError> {
    let mut coord_sets = Vec::with_capacity(contents.coord_sets.len());
    for record in &contents.coord_sets {
        let cs_id = structure.add_coord_set(record.id)?;
        for &(index, point) in &record.coords {
            let atom_id = lookup(atoms, index, "atom")?;
            if let Some(cs) = structure.coord_sets.get_mut(cs_id) {
                cs.coords.insert(atom_id, point);
            }
        }
        coord_sets.push(cs_id);
    }
    structure.active_coord_set =
        lookup_opt(&coord_sets, contents.active_coord_set, "coordinate set")?;
    Ok(coord_sets)
}

fn build_pb_groups(
    structure: &mut Structure,
    contents: &SessionContents,
    atoms: &[AtomId],
    coord_sets: &[CoordSetId],
) -> Result<(), SessionError> {
    for record in &contents.pb_groups {
        let cs_id = lookup_opt(coord_sets, record.coord_set, "coordinate set")?;
        let group_id = structure.add_pb_group(&record.name, cs_id)?;
        if let Some(group) = structure.pb_groups.get_mut(group_id) {
            group.display = record.display;
            group.halfbond = record.halfbond;
            group.color = record.color;
            group.radius = record.radius;
        }

        for pb_record in &record.pseudobonds {
            let (a1, a2) = connection_atoms(&pb_record.connection, atoms)?;
            let pb_cs = lookup_opt(coord_sets, pb_record.coord_set, "coordinate set")?;
            let pb_id = structure.add_pseudobond(group_id, a1, a2)?;
            if let Some(pb) = structure.pseudobonds.get_mut(pb_id) {
                pb.display = pb_record.connection.display;
                pb.hide = pb_record.connection.hide;
                pb.halfbond = pb_record.connection.halfbond;
                pb.radius = pb_record.connection.radius;
                pb.coord_set = pb_cs;
                pb.shown_when_atoms_hidden = pb_record.shown_when_atoms_hidden;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::encode::encode;
    use super::*;

    fn two_chains() -> SessionRecord {
        let mut s = Structure::new("pair");
        let a = s.add_residue("ALA", "A", 1, ' ').unwrap();
        s.add_atom(a, "CA", Element::C).unwrap();
        let b = s.add_residue("GLY", "B", 2, ' ').unwrap();
        s.add_atom(b, "CA", Element::C).unwrap();
        encode(&s, SessionVersion::V3).unwrap()
    }

    fn with_contents(edit: impl FnOnce(&mut SessionContents)) -> SessionRecord {
        let record = two_chains();
        let mut contents =
            SessionContents::read(SessionVersion::V3, &record.ints, &record.floats).unwrap();
        edit(&mut contents);
        let streams = contents.write(SessionVersion::V3).unwrap();
        SessionRecord {
            version: record.version,
            ints: streams.ints,
            floats: streams.floats,
        }
    }

    #[test]
    fn chain_records_fix_the_chain_order() {
        let record = with_contents(|contents| contents.chains.reverse());
        let (structure, _) = decode(&record, &TopologyConfig::default()).unwrap();
        let ids: Vec<&str> = structure.chains().map(|(_, c)| c.chain_id()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn chain_listed_twice_is_inconsistent() {
        let record = with_contents(|contents| contents.chains[1] = contents.chains[0].clone());
        let err = decode(&record, &TopologyConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Inconsistent(message) if message == "chain 'A' listed twice"
        ));
    }
}
