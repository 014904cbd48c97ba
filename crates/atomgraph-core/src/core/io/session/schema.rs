//! Per-version layout of the session int and float streams.
//!
//! Decoding is split in two: the streams are first parsed into the plain records
//! below, which are then built into a structure. Cross references are indices into
//! the record lists, which follow creation order.
//!
//! Every record kind has a [`Layout`] per version: the ints and floats it takes
//! before any length-prefixed contents. Readers check the layout before parsing a
//! record, and the field predicates below decide what each version writes.

use super::SessionVersion;
use super::error::SessionError;
use super::record::{StreamReader, StreamWriter};
use crate::core::models::atom::{DrawMode, HideFlags};
use crate::core::models::color::Rgba;
use crate::core::models::residue::{PolymerType, SsType};
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;

/// Ints and floats one record takes before its length-prefixed contents.
/// A string counts as its length prefix; a list counts as its count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub ints: usize,
    pub floats: usize,
}

impl Layout {
    pub const fn new(ints: usize, floats: usize) -> Self {
        Self { ints, floats }
    }
}

/// Fixed ints of an atom record, before its color and name.
pub const ATOM_FIXED_INTS: usize = 5;

/// Floats of every connection: its radius.
pub const CONNECTION_FLOATS: usize = 1;

/// Name, six entity counts, active coordinate set and `ss_assigned`.
pub const HEADER_LAYOUT: Layout = Layout::new(1 + 6 + 1 + 1, 0);

/// Chain id and residue count.
pub const CHAIN_LAYOUT: Layout = Layout::new(2, 0);

/// Set id and coordinate count.
pub const COORD_SET_LAYOUT: Layout = Layout::new(2, 0);

/// One coordinate: atom index, then x, y and z.
pub const COORD_LAYOUT: Layout = Layout::new(1, 3);

/// Name, coordinate set, display, halfbond, color and pseudobond count; radius.
pub const PB_GROUP_LAYOUT: Layout = Layout::new(4 + Rgba::SESSION_NUM_INTS + 1, 1);

/// Connection layout generation used by a session version.
pub fn connection_base(version: SessionVersion) -> u8 {
    match version {
        SessionVersion::V1 => 1,
        SessionVersion::V2 | SessionVersion::V3 => 2,
    }
}

pub fn connection_has_halfbond(base: u8) -> bool {
    base >= 2
}

/// Ints of the shared bond/pseudobond prefix: endpoints, display and hide, plus
/// halfbond from base 2.
pub fn connection_ints(base: u8) -> usize {
    4 + usize::from(connection_has_halfbond(base))
}

pub fn bond_has_order(version: SessionVersion) -> bool {
    version >= SessionVersion::V3
}

pub fn bond_ints(version: SessionVersion) -> usize {
    connection_ints(connection_base(version)) + usize::from(bond_has_order(version))
}

pub fn pseudobond_has_visibility_rule(version: SessionVersion) -> bool {
    version >= SessionVersion::V3
}

/// Connection ints, the coordinate set, then `shown_when_atoms_hidden` from V3.
pub fn pseudobond_ints(version: SessionVersion) -> usize {
    connection_ints(connection_base(version))
        + 1
        + usize::from(pseudobond_has_visibility_rule(version))
}

/// Version 2 merged the helix and strand flags into one `ss_type`.
pub fn residue_has_ss_type(version: SessionVersion) -> bool {
    version >= SessionVersion::V2
}

/// Fixed ints of a residue record between its strings and its color.
pub fn residue_fixed_ints(version: SessionVersion) -> usize {
    if residue_has_ss_type(version) { 9 } else { 10 }
}

/// Fixed ints, color and name length; b-factor.
pub fn atom_layout(_version: SessionVersion) -> Layout {
    Layout::new(ATOM_FIXED_INTS + Rgba::SESSION_NUM_INTS + 1, 1)
}

pub fn bond_layout(version: SessionVersion) -> Layout {
    Layout::new(bond_ints(version), CONNECTION_FLOATS)
}

pub fn pseudobond_layout(version: SessionVersion) -> Layout {
    Layout::new(pseudobond_ints(version), CONNECTION_FLOATS)
}

/// Name and chain id lengths, fixed ints, color and atom count; `ribbon_adjust`.
pub fn residue_layout(version: SessionVersion) -> Layout {
    Layout::new(2 + residue_fixed_ints(version) + Rgba::SESSION_NUM_INTS + 1, 1)
}

fn invalid(field: &'static str, value: i32) -> SessionError {
    SessionError::InvalidValue {
        field,
        value: value.into(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConnectionRecord {
    pub(crate) atoms: [usize; 2],
    pub(crate) display: bool,
    pub(crate) hide: HideFlags,
    pub(crate) halfbond: bool,
    pub(crate) radius: f64,
}

impl ConnectionRecord {
    fn write(&self, base: u8, out: &mut StreamWriter) -> Result<(), SessionError> {
        out.count(self.atoms[0])?;
        out.count(self.atoms[1])?;
        out.bool(self.display);
        out.int(self.hide.bits() as i32);
        if connection_has_halfbond(base) {
            out.bool(self.halfbond);
        }
        out.float(self.radius);
        Ok(())
    }

    fn read(base: u8, input: &mut StreamReader<'_>) -> Result<Self, SessionError> {
        let atoms = [input.count("connection atom")?, input.count("connection atom")?];
        let display = input.bool("connection display")?;
        let hide = HideFlags::from_bits_truncate(input.int("connection hide")? as u32);
        let halfbond = if connection_has_halfbond(base) {
            input.bool("connection halfbond")?
        } else {
            true
        };
        Ok(Self {
            atoms,
            display,
            hide,
            halfbond,
            radius: input.float("connection radius")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AtomRecord {
    pub(crate) element: i32,
    pub(crate) serial_number: i32,
    pub(crate) display: bool,
    pub(crate) hide: HideFlags,
    pub(crate) draw_mode: DrawMode,
    pub(crate) color: Rgba,
    pub(crate) name: String,
    pub(crate) bfactor: f64,
}

impl AtomRecord {
    fn write(&self, out: &mut StreamWriter) -> Result<(), SessionError> {
        out.int(self.element);
        out.int(self.serial_number);
        out.bool(self.display);
        out.int(self.hide.bits() as i32);
        out.int(self.draw_mode as i32);
        out.color(self.color);
        out.string(&self.name)?;
        out.float(self.bfactor);
        Ok(())
    }

    fn read(version: SessionVersion, input: &mut StreamReader<'_>) -> Result<Self, SessionError> {
        input.require("atom", atom_layout(version))?;
        let element = input.int("atom element")?;
        let serial_number = input.int("atom serial number")?;
        let display = input.bool("atom display")?;
        let hide = HideFlags::from_bits_truncate(input.int("atom hide")? as u32);
        let raw_mode = input.int("atom draw mode")?;
        let draw_mode = DrawMode::from_raw(raw_mode).ok_or(invalid("atom draw mode", raw_mode))?;
        Ok(Self {
            element,
            serial_number,
            display,
            hide,
            draw_mode,
            color: input.color("atom color")?,
            name: input.string("atom name")?,
            bfactor: input.float("atom bfactor")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BondRecord {
    pub(crate) connection: ConnectionRecord,
    pub(crate) order: BondOrder,
}

impl BondRecord {
    fn write(&self, version: SessionVersion, out: &mut StreamWriter) -> Result<(), SessionError> {
        self.connection.write(connection_base(version), out)?;
        if bond_has_order(version) {
            out.int(self.order as i32);
        }
        Ok(())
    }

    fn read(version: SessionVersion, input: &mut StreamReader<'_>) -> Result<Self, SessionError> {
        input.require("bond", bond_layout(version))?;
        let connection = ConnectionRecord::read(connection_base(version), input)?;
        let order = if bond_has_order(version) {
            let raw = input.int("bond order")?;
            BondOrder::from_raw(raw).ok_or(invalid("bond order", raw))?
        } else {
            BondOrder::Single
        };
        Ok(Self { connection, order })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResidueRecord {
    pub(crate) name: String,
    pub(crate) chain_id: String,
    pub(crate) number: i32,
    pub(crate) insertion_code: char,
    pub(crate) is_het: bool,
    pub(crate) polymer_type: PolymerType,
    pub(crate) ss_id: i32,
    pub(crate) ss_type: SsType,
    pub(crate) ribbon_display: bool,
    pub(crate) ribbon_hide_backbone: bool,
    pub(crate) ribbon_selected: bool,
    pub(crate) ribbon_color: Rgba,
    pub(crate) atoms: Vec<usize>,
    pub(crate) ribbon_adjust: f64,
}

impl ResidueRecord {
    fn write(&self, version: SessionVersion, out: &mut StreamWriter) -> Result<(), SessionError> {
        out.string(&self.name)?;
        out.string(&self.chain_id)?;
        out.int(self.number);
        out.int(self.insertion_code as i32);
        out.bool(self.is_het);
        out.int(self.polymer_type as i32);
        out.int(self.ss_id);
        if residue_has_ss_type(version) {
            out.int(self.ss_type as i32);
        } else {
            out.bool(self.ss_type == SsType::Helix);
            out.bool(self.ss_type == SsType::Strand);
        }
        out.bool(self.ribbon_display);
        out.bool(self.ribbon_hide_backbone);
        out.bool(self.ribbon_selected);
        out.color(self.ribbon_color);
        out.count(self.atoms.len())?;
        for &atom in &self.atoms {
            out.count(atom)?;
        }
        out.float(self.ribbon_adjust);
        Ok(())
    }

    fn read(version: SessionVersion, input: &mut StreamReader<'_>) -> Result<Self, SessionError> {
        input.require("residue", residue_layout(version))?;
        let name = input.string("residue name")?;
        let chain_id = input.string("residue chain id")?;
        let number = input.int("residue number")?;
        let raw_code = input.int("residue insertion code")?;
        let insertion_code = u32::try_from(raw_code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(invalid("residue insertion code", raw_code))?;
        let is_het = input.bool("residue is_het")?;
        let raw_polymer = input.int("residue polymer type")?;
        let polymer_type =
            PolymerType::from_raw(raw_polymer).ok_or(invalid("residue polymer type", raw_polymer))?;
        let ss_id = input.int("residue ss_id")?;
        let ss_type = if residue_has_ss_type(version) {
            let raw = input.int("residue ss_type")?;
            SsType::from_raw(raw).ok_or(invalid("residue ss_type", raw))?
        } else {
            let is_helix = input.bool("residue is_helix")?;
            let is_strand = input.bool("residue is_strand")?;
            match (is_helix, is_strand) {
                (true, _) => SsType::Helix,
                (false, true) => SsType::Strand,
                (false, false) => SsType::Coil,
            }
        };
        let ribbon_display = input.bool("residue ribbon_display")?;
        let ribbon_hide_backbone = input.bool("residue ribbon_hide_backbone")?;
        let ribbon_selected = input.bool("residue ribbon_selected")?;
        let ribbon_color = input.color("residue ribbon_color")?;
        let atom_count = input.count("residue atom count")?;
        let atoms = (0..atom_count)
            .map(|_| input.count("residue atom"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            chain_id,
            number,
            insertion_code,
            is_het,
            polymer_type,
            ss_id,
            ss_type,
            ribbon_display,
            ribbon_hide_backbone,
            ribbon_selected,
            ribbon_color,
            atoms,
            ribbon_adjust: input.float("residue ribbon_adjust")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChainRecord {
    pub(crate) chain_id: String,
    pub(crate) residues: Vec<usize>,
}

impl ChainRecord {
    fn write(&self, out: &mut StreamWriter) -> Result<(), SessionError> {
        out.string(&self.chain_id)?;
        out.count(self.residues.len())?;
        for &residue in &self.residues {
            out.count(residue)?;
        }
        Ok(())
    }

    fn read(input: &mut StreamReader<'_>) -> Result<Self, SessionError> {
        input.require("chain", CHAIN_LAYOUT)?;
        let chain_id = input.string("chain id")?;
        let count = input.count("chain residue count")?;
        let residues = (0..count)
            .map(|_| input.count("chain residue"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { chain_id, residues })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CoordSetRecord {
    pub(crate) id: i32,
    pub(crate) coords: Vec<(usize, Point3<f64>)>,
}

impl CoordSetRecord {
    fn write(&self, out: &mut StreamWriter) -> Result<(), SessionError> {
        out.int(self.id);
        out.count(self.coords.len())?;
        for (atom, point) in &self.coords {
            out.count(*atom)?;
            out.float(point.x);
            out.float(point.y);
            out.float(point.z);
        }
        Ok(())
    }

    fn read(input: &mut StreamReader<'_>) -> Result<Self, SessionError> {
        input.require("coordinate set", COORD_SET_LAYOUT)?;
        let id = input.int("coordinate set id")?;
        let count = input.count("coordinate count")?;
        let coords = (0..count)
            .map(|_| {
                input.require("coordinate", COORD_LAYOUT)?;
                let atom = input.count("coordinate atom")?;
                let x = input.float("coordinate")?;
                let y = input.float("coordinate")?;
                let z = input.float("coordinate")?;
                Ok((atom, Point3::new(x, y, z)))
            })
            .collect::<Result<Vec<_>, SessionError>>()?;
        Ok(Self { id, coords })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PseudobondRecord {
    pub(crate) connection: ConnectionRecord,
    pub(crate) coord_set: Option<usize>,
    pub(crate) shown_when_atoms_hidden: bool,
}

impl PseudobondRecord {
    fn write(&self, version: SessionVersion, out: &mut StreamWriter) -> Result<(), SessionError> {
        self.connection.write(connection_base(version), out)?;
        out.index(self.coord_set)?;
        if pseudobond_has_visibility_rule(version) {
            out.bool(self.shown_when_atoms_hidden);
        }
        Ok(())
    }

    fn read(version: SessionVersion, input: &mut StreamReader<'_>) -> Result<Self, SessionError> {
        input.require("pseudobond", pseudobond_layout(version))?;
        let connection = ConnectionRecord::read(connection_base(version), input)?;
        let coord_set = input.index("pseudobond coordinate set")?;
        let shown_when_atoms_hidden = if pseudobond_has_visibility_rule(version) {
            input.bool("pseudobond shown_when_atoms_hidden")?
        } else {
            true
        };
        Ok(Self {
            connection,
            coord_set,
            shown_when_atoms_hidden,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PbGroupRecord {
    pub(crate) name: String,
    pub(crate) coord_set: Option<usize>,
    pub(crate) display: bool,
    pub(crate) halfbond: bool,
    pub(crate) color: Rgba,
    pub(crate) radius: f64,
    pub(crate) pseudobonds: Vec<PseudobondRecord>,
}

impl PbGroupRecord {
    fn write(&self, version: SessionVersion, out: &mut StreamWriter) -> Result<(), SessionError> {
        out.string(&self.name)?;
        out.index(self.coord_set)?;
        out.bool(self.display);
        out.bool(self.halfbond);
        out.color(self.color);
        out.float(self.radius);
        out.count(self.pseudobonds.len())?;
        for pb in &self.pseudobonds {
            pb.write(version, out)?;
        }
        Ok(())
    }

    fn read(version: SessionVersion, input: &mut StreamReader<'_>) -> Result<Self, SessionError> {
        input.require("pseudobond group", PB_GROUP_LAYOUT)?;
        let name = input.string("pseudobond group name")?;
        let coord_set = input.index("pseudobond group coordinate set")?;
        let display = input.bool("pseudobond group display")?;
        let halfbond = input.bool("pseudobond group halfbond")?;
        let color = input.color("pseudobond group color")?;
        let radius = input.float("pseudobond group radius")?;
        let count = input.count("pseudobond count")?;
        let pseudobonds = (0..count)
            .map(|_| PseudobondRecord::read(version, input))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            coord_set,
            display,
            halfbond,
            color,
            radius,
            pseudobonds,
        })
    }
}

/// Everything a session holds, as plain records.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SessionContents {
    pub(crate) name: String,
    pub(crate) active_coord_set: Option<usize>,
    pub(crate) ss_assigned: bool,
    pub(crate) atoms: Vec<AtomRecord>,
    pub(crate) bonds: Vec<BondRecord>,
    pub(crate) residues: Vec<ResidueRecord>,
    pub(crate) chains: Vec<ChainRecord>,
    pub(crate) coord_sets: Vec<CoordSetRecord>,
    pub(crate) pb_groups: Vec<PbGroupRecord>,
}

impl SessionContents {
    /// Fails with [`SessionError::TooLarge`] if a count or index does not fit an
    /// `i32`; nothing partial is returned.
    pub(crate) fn write(&self, version: SessionVersion) -> Result<StreamWriter, SessionError> {
        let mut out = StreamWriter::default();
        out.string(&self.name)?;
        for count in [
            self.atoms.len(),
            self.bonds.len(),
            self.residues.len(),
            self.chains.len(),
            self.coord_sets.len(),
            self.pb_groups.len(),
        ] {
            out.count(count)?;
        }
        out.index(self.active_coord_set)?;
        out.bool(self.ss_assigned);

        for atom in &self.atoms {
            atom.write(&mut out)?;
        }
        for bond in &self.bonds {
            bond.write(version, &mut out)?;
        }
        for residue in &self.residues {
            residue.write(version, &mut out)?;
        }
        for chain in &self.chains {
            chain.write(&mut out)?;
        }
        for cs in &self.coord_sets {
            cs.write(&mut out)?;
        }
        for group in &self.pb_groups {
            group.write(version, &mut out)?;
        }
        Ok(out)
    }

    /// Parses both streams completely; leftover values are an error.
    pub(crate) fn read(version: SessionVersion, ints: &[i32], floats: &[f64]) -> Result<Self, SessionError> {
        let mut input = StreamReader::new(ints, floats);
        input.require("session header", HEADER_LAYOUT)?;
        let name = input.string("structure name")?;
        let atom_count = input.count("atom count")?;
        let bond_count = input.count("bond count")?;
        let residue_count = input.count("residue count")?;
        let chain_count = input.count("chain count")?;
        let coord_set_count = input.count("coordinate set count")?;
        let pb_group_count = input.count("pseudobond group count")?;
        let active_coord_set = input.index("active coordinate set")?;
        let ss_assigned = input.bool("ss_assigned")?;

        let contents = Self {
            name,
            active_coord_set,
            ss_assigned,
            atoms: (0..atom_count)
                .map(|_| AtomRecord::read(version, &mut input))
                .collect::<Result<_, _>>()?,
            bonds: (0..bond_count)
                .map(|_| BondRecord::read(version, &mut input))
                .collect::<Result<_, _>>()?,
            residues: (0..residue_count)
                .map(|_| ResidueRecord::read(version, &mut input))
                .collect::<Result<_, _>>()?,
            chains: (0..chain_count)
                .map(|_| ChainRecord::read(&mut input))
                .collect::<Result<_, _>>()?,
            coord_sets: (0..coord_set_count)
                .map(|_| CoordSetRecord::read(&mut input))
                .collect::<Result<_, _>>()?,
            pb_groups: (0..pb_group_count)
                .map(|_| PbGroupRecord::read(version, &mut input))
                .collect::<Result<_, _>>()?,
        };
        input.finish()?;
        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> ConnectionRecord {
        ConnectionRecord {
            atoms: [0, 1],
            display: true,
            hide: HideFlags::empty(),
            halfbond: false,
            radius: 0.2,
        }
    }

    fn residue(atoms: Vec<usize>) -> ResidueRecord {
        ResidueRecord {
            name: "ALA".to_string(),
            chain_id: "A".to_string(),
            number: 4,
            insertion_code: 'B',
            is_het: false,
            polymer_type: PolymerType::Amino,
            ss_id: 2,
            ss_type: SsType::Strand,
            ribbon_display: true,
            ribbon_hide_backbone: true,
            ribbon_selected: false,
            ribbon_color: Rgba::new(9, 8, 7, 255),
            atoms,
            ribbon_adjust: -1.0,
        }
    }

    const ALL_VERSIONS: [SessionVersion; 3] =
        [SessionVersion::V1, SessionVersion::V2, SessionVersion::V3];

    mod layout {
        use super::*;

        #[test]
        fn layout_table_matches_each_version() {
            assert_eq!(bond_ints(SessionVersion::V1), 4);
            assert_eq!(bond_ints(SessionVersion::V2), 5);
            assert_eq!(bond_ints(SessionVersion::V3), 6);
            assert_eq!(pseudobond_ints(SessionVersion::V1), 5);
            assert_eq!(pseudobond_ints(SessionVersion::V2), 6);
            assert_eq!(pseudobond_ints(SessionVersion::V3), 7);
            assert_eq!(residue_fixed_ints(SessionVersion::V1), 10);
            assert_eq!(residue_fixed_ints(SessionVersion::V2), 9);
        }

        #[test]
        fn float_table_matches_each_version() {
            for version in ALL_VERSIONS {
                assert_eq!(atom_layout(version).floats, 1);
                assert_eq!(bond_layout(version).floats, CONNECTION_FLOATS);
                assert_eq!(pseudobond_layout(version).floats, CONNECTION_FLOATS);
                assert_eq!(residue_layout(version).floats, 1);
            }
            assert_eq!(PB_GROUP_LAYOUT.floats, 1);
            assert_eq!(COORD_LAYOUT.floats, 3);
            assert_eq!(CHAIN_LAYOUT.floats, 0);
            assert_eq!(COORD_SET_LAYOUT.floats, 0);
        }

        #[test]
        fn empty_records_write_exactly_their_layout() {
            for version in ALL_VERSIONS {
                let mut out = StreamWriter::default();
                residue(vec![]).write(version, &mut out).unwrap();
                let layout = residue_layout(version);
                // Name "ALA" and chain id "A" add their characters past the layout.
                assert_eq!(out.ints.len(), layout.ints + 3 + 1, "{version}");
                assert_eq!(out.floats.len(), layout.floats, "{version}");
            }

            let mut out = StreamWriter::default();
            PbGroupRecord {
                name: String::new(),
                coord_set: None,
                display: true,
                halfbond: false,
                color: Rgba::default(),
                radius: 0.1,
                pseudobonds: vec![],
            }
            .write(SessionVersion::V3, &mut out)
            .unwrap();
            assert_eq!(out.ints.len(), PB_GROUP_LAYOUT.ints);
            assert_eq!(out.floats.len(), PB_GROUP_LAYOUT.floats);

            let out = SessionContents::default().write(SessionVersion::V3).unwrap();
            assert_eq!(out.ints.len(), HEADER_LAYOUT.ints);
            assert_eq!(out.floats.len(), HEADER_LAYOUT.floats);
        }

        #[test]
        fn bond_record_writes_exactly_its_layout() {
            for version in ALL_VERSIONS {
                let mut out = StreamWriter::default();
                BondRecord {
                    connection: connection(),
                    order: BondOrder::Double,
                }
                .write(version, &mut out)
                .unwrap();
                assert_eq!(out.ints.len(), bond_ints(version), "{version}");
                assert_eq!(out.floats.len(), 1);
            }
        }

        #[test]
        fn pseudobond_record_writes_exactly_its_layout() {
            for version in ALL_VERSIONS {
                let mut out = StreamWriter::default();
                PseudobondRecord {
                    connection: connection(),
                    coord_set: None,
                    shown_when_atoms_hidden: false,
                }
                .write(version, &mut out)
                .unwrap();
                assert_eq!(out.ints.len(), pseudobond_ints(version), "{version}");
                assert_eq!(out.floats.len(), CONNECTION_FLOATS);
            }
        }

        #[test]
        fn residue_record_writes_fixed_ints_plus_variable_parts() {
            for version in ALL_VERSIONS {
                let mut out = StreamWriter::default();
                residue(vec![0, 1, 2]).write(version, &mut out).unwrap();
                let strings = (1 + 3) + (1 + 1);
                let variable = Rgba::SESSION_NUM_INTS + 1 + 3;
                assert_eq!(
                    out.ints.len(),
                    strings + residue_fixed_ints(version) + variable,
                    "{version}"
                );
                assert_eq!(out.floats, vec![-1.0]);
            }
        }

        #[test]
        fn atom_record_writes_fixed_ints_color_and_name() {
            let mut out = StreamWriter::default();
            AtomRecord {
                element: 6,
                serial_number: 12,
                display: true,
                hide: HideFlags::RIBBON,
                draw_mode: DrawMode::Ball,
                color: Rgba::default(),
                name: "CA".to_string(),
                bfactor: 17.5,
            }
            .write(&mut out)
            .unwrap();
            assert_eq!(out.ints.len(), ATOM_FIXED_INTS + Rgba::SESSION_NUM_INTS + 1 + 2);
            assert_eq!(out.floats, vec![17.5]);
        }
    }

    mod versions {
        use super::*;

        #[test]
        fn version_one_residue_flags_map_to_ss_type() {
            let mut out = StreamWriter::default();
            residue(vec![]).write(SessionVersion::V1, &mut out).unwrap();
            let mut input = StreamReader::new(&out.ints, &out.floats);
            let read = ResidueRecord::read(SessionVersion::V1, &mut input).unwrap();
            assert_eq!(read.ss_type, SsType::Strand);
            input.finish().unwrap();
        }

        #[test]
        fn older_bonds_read_as_single_and_halfbond() {
            let mut out = StreamWriter::default();
            BondRecord {
                connection: connection(),
                order: BondOrder::Triple,
            }
            .write(SessionVersion::V1, &mut out)
            .unwrap();
            let mut input = StreamReader::new(&out.ints, &out.floats);
            let read = BondRecord::read(SessionVersion::V1, &mut input).unwrap();
            assert_eq!(read.order, BondOrder::Single);
            assert!(read.connection.halfbond);
        }

        #[test]
        fn invalid_enum_values_are_rejected() {
            let mut out = StreamWriter::default();
            BondRecord {
                connection: connection(),
                order: BondOrder::Single,
            }
            .write(SessionVersion::V3, &mut out)
            .unwrap();
            *out.ints.last_mut().unwrap() = 9;
            let mut input = StreamReader::new(&out.ints, &out.floats);
            assert!(matches!(
                BondRecord::read(SessionVersion::V3, &mut input),
                Err(SessionError::InvalidValue {
                    field: "bond order",
                    value: 9
                })
            ));
        }

        #[test]
        fn contents_reject_leftover_ints() {
            let contents = SessionContents {
                name: "x".to_string(),
                ..SessionContents::default()
            };
            let mut out = contents.write(SessionVersion::V3).unwrap();
            out.ints.push(0);
            assert!(matches!(
                SessionContents::read(SessionVersion::V3, &out.ints, &out.floats),
                Err(SessionError::TrailingData { ints: 1, floats: 0 })
            ));
        }
    }

    mod truncation {
        use super::*;

        #[test]
        fn short_bond_fails_before_any_field_is_read() {
            let mut out = StreamWriter::default();
            BondRecord {
                connection: connection(),
                order: BondOrder::Single,
            }
            .write(SessionVersion::V2, &mut out)
            .unwrap();
            out.ints.pop();
            let mut input = StreamReader::new(&out.ints, &out.floats);
            assert!(matches!(
                BondRecord::read(SessionVersion::V2, &mut input),
                Err(SessionError::RecordTruncated {
                    record: "bond",
                    ints: 5,
                    floats: 1
                })
            ));
        }

        #[test]
        fn residue_without_its_float_is_truncated() {
            let mut out = StreamWriter::default();
            residue(vec![0]).write(SessionVersion::V3, &mut out).unwrap();
            out.floats.clear();
            let mut input = StreamReader::new(&out.ints, &out.floats);
            let expected = residue_layout(SessionVersion::V3);
            assert!(matches!(
                ResidueRecord::read(SessionVersion::V3, &mut input),
                Err(SessionError::RecordTruncated { record: "residue", ints, floats })
                    if ints == expected.ints && floats == expected.floats
            ));
        }

        #[test]
        fn declared_atom_missing_from_the_streams_is_truncated() {
            let contents = SessionContents {
                name: "x".to_string(),
                ..SessionContents::default()
            };
            let mut out = contents.write(SessionVersion::V3).unwrap();
            // Atom count sits right after the one-character name.
            out.ints[2] = 1;
            assert!(matches!(
                SessionContents::read(SessionVersion::V3, &out.ints, &out.floats),
                Err(SessionError::RecordTruncated { record: "atom", .. })
            ));
        }
    }
}
