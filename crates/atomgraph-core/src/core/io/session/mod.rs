//! The native binary session format.
//!
//! A session stores one structure as a version number plus two flat streams, one of
//! `i32` and one of `f64`. Each schema version has a fixed layout (see [`schema`]);
//! older layouts stay readable and any of them can be written. Versions newer than
//! [`SessionVersion::CURRENT`] are refused rather than guessed at.

mod decode;
mod encode;
pub mod error;
pub mod record;
pub mod schema;

use super::traits::StructureFile;
use crate::core::models::structure::Structure;
use crate::core::topology::config::TopologyConfig;
use error::SessionError;
use record::SessionRecord;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::info;

/// Known session schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SessionVersion {
    /// Separate helix and strand flags on residues; no halfbond on connections.
    V1 = 1,
    /// Residue `ss_type`; connection halfbond flag.
    V2 = 2,
    /// Bond order; pseudobond `shown_when_atoms_hidden`.
    #[default]
    V3 = 3,
}

impl SessionVersion {
    pub const CURRENT: SessionVersion = SessionVersion::V3;
    pub const ALL: [SessionVersion; 3] = [Self::V1, Self::V2, Self::V3];

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for SessionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

impl TryFrom<i32> for SessionVersion {
    type Error = SessionError;

    fn try_from(version: i32) -> Result<Self, Self::Error> {
        match version {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            v if v > Self::CURRENT.as_i32() => Err(SessionError::UnsupportedVersion {
                version: v,
                newest: Self::CURRENT.as_i32(),
            }),
            v => Err(SessionError::InvalidVersion(v)),
        }
    }
}

/// Data stored alongside a structure in a session file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionMetadata {
    pub version: SessionVersion,
}

/// Reader and writer for session files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionFile;

impl SessionFile {
    /// Flattens a structure into an in-memory record. Fails with
    /// [`SessionError::TooLarge`] if an entity count does not fit a session int.
    pub fn to_record(
        structure: &Structure,
        version: SessionVersion,
    ) -> Result<SessionRecord, SessionError> {
        encode::encode(structure, version)
    }

    /// Rebuilds a structure from an in-memory record.
    pub fn from_record(
        record: &SessionRecord,
        config: &TopologyConfig,
    ) -> Result<(Structure, SessionMetadata), SessionError> {
        let (structure, version) = decode::decode(record, config)?;
        Ok((structure, SessionMetadata { version }))
    }

    /// Reads a session, deriving polymers with the linkage names from `config`.
    pub fn read_from_with_config(
        reader: &mut impl BufRead,
        config: &TopologyConfig,
    ) -> Result<(Structure, SessionMetadata), SessionError> {
        let record = SessionRecord::read_from(reader)?;
        Self::from_record(&record, config)
    }

    pub fn read_from_path_with_config<P: AsRef<Path>>(
        path: P,
        config: &TopologyConfig,
    ) -> Result<(Structure, SessionMetadata), SessionError> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let (structure, metadata) = Self::read_from_with_config(&mut reader, config)?;
        info!(
            path = %path.display(),
            version = %metadata.version,
            atoms = structure.atom_count(),
            "Loaded session."
        );
        Ok((structure, metadata))
    }
}

impl StructureFile for SessionFile {
    type Metadata = SessionMetadata;
    type Error = SessionError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Structure, Self::Metadata), Self::Error> {
        Self::read_from_with_config(reader, &TopologyConfig::default())
    }

    fn write_to(
        structure: &Structure,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        Self::to_record(structure, metadata.version)?.write_to(writer)?;
        Ok(())
    }

    fn write_structure_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        Self::write_to(structure, &SessionMetadata::default(), writer)
    }
}

#[cfg(test)]
mod tests {
    use super::schema::{AtomRecord, ResidueRecord, SessionContents};
    use super::*;
    use crate::core::models::atom::{DrawMode, Element, HideFlags};
    use crate::core::models::color::Rgba;
    use crate::core::models::fixtures::{benzene, peptide, peptide_with_torsions};
    use crate::core::models::ids::AtomId;
    use crate::core::models::residue::{PolymerType, SsType};
    use crate::core::models::topology::BondOrder;
    use nalgebra::Point3;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn round_trip(structure: &Structure, version: SessionVersion) -> Structure {
        let mut bytes = Vec::new();
        SessionFile::write_to(structure, &SessionMetadata { version }, &mut bytes).unwrap();
        let (restored, metadata) = SessionFile::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(metadata.version, version);
        restored
    }

    fn atom_index(structure: &Structure, id: AtomId) -> usize {
        structure.atoms().position(|(a, _)| a == id).unwrap()
    }

    fn connectivity(structure: &Structure) -> Vec<(usize, usize)> {
        structure
            .bonds()
            .map(|(_, bond)| {
                let [a1, a2] = bond.atoms();
                (atom_index(structure, a1), atom_index(structure, a2))
            })
            .collect()
    }

    fn residue_summary(structure: &Structure) -> Vec<(String, String, i32, bool, SsType, i32, Rgba, usize)> {
        structure
            .residues()
            .map(|(_, r)| {
                (
                    r.name().to_string(),
                    r.chain_id().to_string(),
                    r.number(),
                    r.is_het(),
                    r.ss_type,
                    r.ss_id,
                    r.ribbon_color(),
                    r.atoms().len(),
                )
            })
            .collect()
    }

    /// Benzene in chain A plus a zinc in chain B, joined by a pseudobond, with
    /// coordinates and some non-default attributes.
    fn decorated() -> Structure {
        let (mut s, ring) = benzene();
        let zn_res = s.add_residue("ZN", "B", 101, 'A').unwrap();
        let zn = s.add_atom(zn_res, "ZN", Element::from_number(30).unwrap()).unwrap();
        s.set_is_het(zn_res, true).unwrap();
        s.set_ribbon_color(zn_res, Rgba::new(10, 20, 30, 40)).unwrap();
        s.set_ribbon_display(zn_res, true).unwrap();
        s.set_serial_number(zn, 77).unwrap();
        s.set_bfactor(zn, 12.5).unwrap();
        s.set_draw_mode(zn, DrawMode::Sphere).unwrap();
        s.set_atom_hide(ring[0], HideFlags::USER).unwrap();

        let bond = s.bond_between(ring[0], ring[1]).unwrap();
        s.set_bond_order(bond, BondOrder::Aromatic).unwrap();
        s.set_bond_radius(bond, 0.3).unwrap();

        let cs = s.add_coord_set(1).unwrap();
        for (i, &atom) in ring.iter().enumerate() {
            let angle = i as f64 * std::f64::consts::PI / 3.0;
            s.set_coord(atom, cs, Point3::new(1.4 * angle.cos(), 1.4 * angle.sin(), 0.0))
                .unwrap();
        }
        s.set_coord(zn, cs, Point3::new(0.0, 0.0, 2.1)).unwrap();

        let group = s.add_pb_group("metal coordination", Some(cs)).unwrap();
        s.set_pb_group_color(group, Rgba::new(0, 128, 255, 255)).unwrap();
        let pb = s.add_pseudobond(group, ring[2], zn).unwrap();
        s.set_shown_when_atoms_hidden(pb, false).unwrap();
        s.take_changes();
        s
    }

    mod versions {
        use super::*;

        #[test]
        fn known_versions_convert_from_i32() {
            for version in SessionVersion::ALL {
                assert_eq!(SessionVersion::try_from(version.as_i32()).unwrap(), version);
            }
            assert_eq!(SessionVersion::default(), SessionVersion::CURRENT);
        }

        #[test]
        fn future_and_non_positive_versions_are_rejected() {
            assert!(matches!(
                SessionVersion::try_from(4),
                Err(SessionError::UnsupportedVersion { version: 4, newest: 3 })
            ));
            assert!(matches!(
                SessionVersion::try_from(-2),
                Err(SessionError::InvalidVersion(-2))
            ));
        }

        #[test]
        fn version_one_drops_bond_order_and_visibility_rule() {
            let s = decorated();
            let restored = round_trip(&s, SessionVersion::V1);
            assert!(restored.bonds().all(|(_, b)| b.order() == BondOrder::Single));
            assert!(restored.pseudobonds().all(|(_, pb)| pb.shown_when_atoms_hidden()));
        }

        #[test]
        fn version_three_keeps_bond_order_and_visibility_rule() {
            let s = decorated();
            let restored = round_trip(&s, SessionVersion::V3);
            let orders: Vec<BondOrder> = restored.bonds().map(|(_, b)| b.order()).collect();
            assert_eq!(orders[0], BondOrder::Aromatic);
            assert!(restored.pseudobonds().all(|(_, pb)| !pb.shown_when_atoms_hidden()));
        }
    }

    mod round_trips {
        use super::*;

        #[test]
        fn empty_structure_round_trips_at_every_version() {
            for version in SessionVersion::ALL {
                let restored = round_trip(&Structure::new("empty"), version);
                assert_eq!(restored.name(), "empty");
                assert_eq!(restored.atom_count(), 0);
                assert_eq!(restored.residue_count(), 0);
                assert!(restored.active_coord_set().is_none());
            }
        }

        #[test]
        fn single_atom_structure_round_trips() {
            let mut s = Structure::new("one");
            let res = s.add_residue("HOH", "W", 1, ' ').unwrap();
            s.add_atom(res, "O", Element::O).unwrap();
            for version in SessionVersion::ALL {
                let restored = round_trip(&s, version);
                assert_eq!(restored.atom_count(), 1);
                let (_, atom) = restored.atoms().next().unwrap();
                assert_eq!(atom.name(), "O");
                assert_eq!(atom.element(), Element::O);
            }
        }

        #[test]
        fn ring_and_cross_chain_pseudobond_round_trip_at_every_version() {
            let s = decorated();
            for version in SessionVersion::ALL {
                let restored = round_trip(&s, version);
                assert_eq!(restored.atom_count(), s.atom_count(), "{version}");
                assert_eq!(connectivity(&restored), connectivity(&s), "{version}");
                assert_eq!(residue_summary(&restored), residue_summary(&s), "{version}");
                assert_eq!(restored.minimum_rings().len(), 1);
                assert_eq!(restored.chain_count(), 2);
                assert_eq!(restored.pseudobond_count(), 1);
                assert_eq!(restored.ribbon_display_count(), 1);

                let (_, pb) = restored.pseudobonds().next().unwrap();
                let [a1, a2] = pb.atoms();
                let chains: Vec<&str> = [a1, a2]
                    .iter()
                    .map(|&a| {
                        let res = restored.atom(a).unwrap().residue();
                        restored.residue(res).unwrap().chain_id()
                    })
                    .collect();
                assert_eq!(chains, ["A", "B"]);
                assert_eq!(pb.color(), Rgba::new(0, 128, 255, 255));
            }
        }

        #[test]
        fn atom_attributes_and_coordinates_survive_exactly() {
            let s = decorated();
            let restored = round_trip(&s, SessionVersion::CURRENT);
            for ((_, a), (_, b)) in s.atoms().zip(restored.atoms()) {
                assert_eq!(a.name(), b.name());
                assert_eq!(a.serial_number(), b.serial_number());
                assert_eq!(a.hide(), b.hide());
                assert_eq!(a.draw_mode(), b.draw_mode());
                assert_eq!(a.bfactor(), b.bfactor());
            }
            let coords = |s: &Structure| -> Vec<Point3<f64>> {
                s.atoms().map(|(id, _)| *s.coord(id).unwrap()).collect()
            };
            assert_eq!(coords(&s), coords(&restored));
            let group = restored.pb_groups().next().unwrap().1;
            assert_eq!(group.coord_set(), restored.active_coord_set());
        }

        #[test]
        fn atom_order_follows_creation_not_residue_order() {
            let mut s = Structure::new("interleaved");
            let r1 = s.add_residue("AAA", "A", 1, ' ').unwrap();
            let r2 = s.add_residue("BBB", "A", 2, ' ').unwrap();
            s.add_atom(r2, "X", Element::C).unwrap();
            s.add_atom(r1, "Y", Element::N).unwrap();
            let restored = round_trip(&s, SessionVersion::CURRENT);
            let names: Vec<&str> = restored.atoms().map(|(_, a)| a.name()).collect();
            assert_eq!(names, ["X", "Y"]);
        }

        #[test]
        fn restored_structure_has_empty_change_ledger() {
            let restored = round_trip(&decorated(), SessionVersion::CURRENT);
            assert!(!restored.change_tracker().changed());
            assert!(restored.graphics().changes().is_empty());
        }

        #[test]
        fn restored_structure_tracks_new_edits() {
            let mut restored = round_trip(&decorated(), SessionVersion::CURRENT);
            let (id, _) = restored.residues().next().unwrap();
            restored.set_residue_name(id, "BEN").unwrap();
            assert!(restored.change_tracker().changed());
        }

        #[test]
        fn assigned_secondary_structure_is_kept_without_a_pass() {
            let (mut s, residues) = peptide(3);
            s.set_ss_type(residues[1], SsType::Helix).unwrap();
            s.set_ss_id(residues[1], 5).unwrap();
            let mut restored = round_trip(&s, SessionVersion::V1);
            let (id, _) = restored.residues().nth(1).unwrap();
            assert!(restored.ss_assigned());
            assert_eq!(restored.ss_type(id).unwrap(), SsType::Helix);
            assert_eq!(restored.ss_id(id).unwrap(), 5);
            assert_eq!(restored.secondary_structure_passes(), 0);
        }

        #[test]
        fn unassigned_secondary_structure_is_derived_after_restore() {
            let (s, _) = peptide_with_torsions(6, -57.0, -47.0);
            let mut restored = round_trip(&s, SessionVersion::CURRENT);
            let (id, _) = restored.residues().nth(2).unwrap();
            assert_eq!(restored.ss_type(id).unwrap(), SsType::Helix);
            assert_eq!(restored.secondary_structure_passes(), 1);
        }

        #[test]
        fn polymers_are_rederived_after_restore() {
            let (s, _) = peptide(4);
            let mut restored = round_trip(&s, SessionVersion::V2);
            let polymers = restored.polymers();
            assert_eq!(polymers.len(), 1);
            assert_eq!(polymers[0].len(), 4);
            assert_eq!(polymers[0].polymer_type(), PolymerType::Amino);
        }

        #[test]
        fn session_file_round_trips_through_disk() {
            let s = decorated();
            let file = NamedTempFile::new().unwrap();
            SessionFile::write_structure_to_path(&s, file.path()).unwrap();
            let (restored, metadata) = SessionFile::read_from_path(file.path()).unwrap();
            assert_eq!(metadata.version, SessionVersion::CURRENT);
            assert_eq!(connectivity(&restored), connectivity(&s));
        }
    }

    mod failures {
        use super::*;

        fn encoded(contents: &SessionContents) -> SessionRecord {
            let streams = contents.write(SessionVersion::CURRENT).unwrap();
            SessionRecord {
                version: SessionVersion::CURRENT.as_i32(),
                ints: streams.ints,
                floats: streams.floats,
            }
        }

        fn atom(name: &str) -> AtomRecord {
            AtomRecord {
                element: 6,
                serial_number: 0,
                display: true,
                hide: HideFlags::empty(),
                draw_mode: DrawMode::EndCap,
                color: Rgba::default(),
                name: name.to_string(),
                bfactor: 0.0,
            }
        }

        fn residue(number: i32, atoms: Vec<usize>) -> ResidueRecord {
            ResidueRecord {
                name: "UNK".to_string(),
                chain_id: "A".to_string(),
                number,
                insertion_code: ' ',
                is_het: false,
                polymer_type: PolymerType::None,
                ss_id: -1,
                ss_type: SsType::Coil,
                ribbon_display: false,
                ribbon_hide_backbone: true,
                ribbon_selected: false,
                ribbon_color: Rgba::default(),
                atoms,
                ribbon_adjust: -1.0,
            }
        }

        #[test]
        fn future_version_file_is_refused() {
            let record = SessionRecord {
                version: 9,
                ..SessionRecord::default()
            };
            let mut bytes = Vec::new();
            record.write_to(&mut bytes).unwrap();
            let err = SessionFile::read_from(&mut Cursor::new(bytes)).unwrap_err();
            assert!(matches!(err, SessionError::UnsupportedVersion { version: 9, .. }));
        }

        #[test]
        fn truncated_streams_fail_the_whole_restore() {
            let mut record = SessionFile::to_record(&decorated(), SessionVersion::CURRENT).unwrap();
            record.ints.truncate(record.ints.len() / 2);
            let err = SessionFile::from_record(&record, &TopologyConfig::default()).unwrap_err();
            assert!(matches!(
                err,
                SessionError::Truncated { .. } | SessionError::RecordTruncated { .. }
            ));
        }

        #[test]
        fn atom_listed_by_two_residues_is_inconsistent() {
            let contents = SessionContents {
                atoms: vec![atom("C1")],
                residues: vec![residue(1, vec![0]), residue(2, vec![0])],
                ..SessionContents::default()
            };
            let err = SessionFile::from_record(&encoded(&contents), &TopologyConfig::default())
                .unwrap_err();
            assert!(matches!(err, SessionError::Inconsistent(_)));
        }

        #[test]
        fn orphan_atom_is_inconsistent() {
            let contents = SessionContents {
                atoms: vec![atom("C1"), atom("C2")],
                residues: vec![residue(1, vec![1])],
                ..SessionContents::default()
            };
            let err = SessionFile::from_record(&encoded(&contents), &TopologyConfig::default())
                .unwrap_err();
            assert!(matches!(err, SessionError::Inconsistent(_)));
        }

        #[test]
        fn out_of_range_atom_index_is_reported() {
            let contents = SessionContents {
                atoms: vec![atom("C1")],
                residues: vec![residue(1, vec![3])],
                ..SessionContents::default()
            };
            let err = SessionFile::from_record(&encoded(&contents), &TopologyConfig::default())
                .unwrap_err();
            assert!(matches!(
                err,
                SessionError::BadIndex { kind: "atom", index: 3, count: 1 }
            ));
        }

        #[test]
        fn duplicate_residue_keys_surface_as_structure_errors() {
            let contents = SessionContents {
                atoms: vec![atom("C1"), atom("C2")],
                residues: vec![residue(1, vec![0]), residue(1, vec![1])],
                ..SessionContents::default()
            };
            let err = SessionFile::from_record(&encoded(&contents), &TopologyConfig::default())
                .unwrap_err();
            assert!(matches!(err, SessionError::Structure(_)));
        }
    }
}
