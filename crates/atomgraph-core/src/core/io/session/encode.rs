use super::SessionVersion;
use super::error::SessionError;
use super::record::SessionRecord;
use super::schema::{
    AtomRecord, BondRecord, ChainRecord, ConnectionRecord, CoordSetRecord, PbGroupRecord,
    PseudobondRecord, ResidueRecord, SessionContents,
};
use crate::core::models::ids::{AtomId, CoordSetId, ResidueId};
use crate::core::models::structure::Structure;
use slotmap::{Key, SecondaryMap};
use tracing::{debug, instrument};

/// Maps entity handles to their position in creation order.
fn index_map<K: Key>(order: &[K]) -> SecondaryMap<K, usize> {
    order.iter().enumerate().map(|(i, &id)| (id, i)).collect()
}

/// Flattens a structure into a session record at `version`.
///
/// Bond and pseudobond colors are not part of any layout; restored pseudobonds take
/// their group's color.
#[instrument(skip_all, name = "session_save", fields(version = %version, atoms = structure.atom_count()))]
pub(crate) fn encode(
    structure: &Structure,
    version: SessionVersion,
) -> Result<SessionRecord, SessionError> {
    let contents = collect(structure);
    let streams = contents.write(version)?;
    debug!(
        ints = streams.ints.len(),
        floats = streams.floats.len(),
        "Encoded session streams."
    );
    Ok(SessionRecord {
        version: version.as_i32(),
        ints: streams.ints,
        floats: streams.floats,
    })
}

fn collect(structure: &Structure) -> SessionContents {
    let atom_index = index_map::<AtomId>(&structure.atom_order);
    let residue_index = index_map::<ResidueId>(&structure.residue_order);
    let cs_index = index_map::<CoordSetId>(&structure.coord_set_order);
    let atom_at = |id: AtomId| atom_index.get(id).copied().unwrap_or_default();
    let cs_at = |id: Option<CoordSetId>| id.and_then(|id| cs_index.get(id).copied());

    let atoms = structure
        .atoms()
        .map(|(_, atom)| AtomRecord {
            element: atom.element.number().into(),
            serial_number: atom.serial_number,
            display: atom.display,
            hide: atom.hide,
            draw_mode: atom.draw_mode,
            color: atom.color,
            name: atom.name.clone(),
            bfactor: atom.bfactor,
        })
        .collect();

    let bonds = structure
        .bonds()
        .map(|(_, bond)| BondRecord {
            connection: ConnectionRecord {
                atoms: bond.atoms.map(atom_at),
                display: bond.display,
                hide: bond.hide,
                halfbond: bond.halfbond,
                radius: bond.radius,
            },
            order: bond.order,
        })
        .collect();

    let residues = structure
        .residues()
        .map(|(_, residue)| ResidueRecord {
            name: residue.name.clone(),
            chain_id: residue.key.chain_id.clone(),
            number: residue.key.number,
            insertion_code: residue.key.insertion_code,
            is_het: residue.is_het,
            polymer_type: residue.polymer_type,
            ss_id: residue.ss_id,
            ss_type: residue.ss_type,
            ribbon_display: residue.ribbon_display,
            ribbon_hide_backbone: residue.ribbon_hide_backbone,
            ribbon_selected: residue.ribbon_selected,
            ribbon_color: residue.ribbon_color,
            atoms: residue.atoms.iter().map(|&id| atom_at(id)).collect(),
            ribbon_adjust: residue.ribbon_adjust,
        })
        .collect();

    let chains = structure
        .chains()
        .map(|(_, chain)| ChainRecord {
            chain_id: chain.chain_id.clone(),
            residues: chain
                .residues
                .iter()
                .filter_map(|&id| residue_index.get(id).copied())
                .collect(),
        })
        .collect();

    let coord_sets = structure
        .coord_sets()
        .map(|(_, cs)| CoordSetRecord {
            id: cs.id,
            coords: structure
                .atom_order
                .iter()
                .enumerate()
                .filter_map(|(i, &atom)| cs.coord(atom).map(|p| (i, *p)))
                .collect(),
        })
        .collect();

    let pb_groups = structure
        .pb_groups()
        .map(|(_, group)| PbGroupRecord {
            name: group.name.clone(),
            coord_set: cs_at(group.coord_set),
            display: group.display,
            halfbond: group.halfbond,
            color: group.color,
            radius: group.radius,
            pseudobonds: group
                .pseudobonds
                .iter()
                .filter_map(|&id| structure.pseudobond(id))
                .map(|pb| PseudobondRecord {
                    connection: ConnectionRecord {
                        atoms: pb.atoms.map(atom_at),
                        display: pb.display,
                        hide: pb.hide,
                        halfbond: pb.halfbond,
                        radius: pb.radius,
                    },
                    coord_set: cs_at(pb.coord_set),
                    shown_when_atoms_hidden: pb.shown_when_atoms_hidden,
                })
                .collect(),
        })
        .collect();

    SessionContents {
        name: structure.name.clone(),
        active_coord_set: cs_at(structure.active_coord_set),
        ss_assigned: structure.ss_assigned,
        atoms,
        bonds,
        residues,
        chains,
        coord_sets,
        pb_groups,
    }
}
