use super::color::Rgba;
use super::ids::{AtomId, ChainId};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Polymer classification of a residue, derived from backbone linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PolymerType {
    #[default]
    None = 0,
    Amino = 1,
    Nucleic = 2,
}

impl PolymerType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Amino),
            2 => Some(Self::Nucleic),
            _ => None,
        }
    }
}

impl fmt::Display for PolymerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Amino => "amino",
            Self::Nucleic => "nucleic",
        })
    }
}

/// Secondary-structure classification of a residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SsType {
    #[default]
    Coil = 0,
    Helix = 1,
    Strand = 2,
}

impl SsType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Coil),
            1 => Some(Self::Helix),
            2 => Some(Self::Strand),
            _ => None,
        }
    }
}

/// The identity of a residue within its structure: chain id, sequence number
/// and insertion code.
///
/// Keys order by chain, then number, then insertion code, and display as
/// `number[insertion].chain` with blank parts omitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueKey {
    pub chain_id: String,
    pub number: i32,
    pub insertion_code: char,
}

impl ResidueKey {
    pub fn new(chain_id: &str, number: i32, insertion_code: char) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            number,
            insertion_code,
        }
    }
}

impl Ord for ResidueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chain_id
            .cmp(&other.chain_id)
            .then(self.number.cmp(&other.number))
            .then(self.insertion_code.cmp(&other.insertion_code))
    }
}

impl PartialOrd for ResidueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)?;
        if self.insertion_code != ' ' {
            write!(f, "{}", self.insertion_code)?;
        }
        if !self.chain_id.trim().is_empty() {
            write!(f, ".{}", self.chain_id)?;
        }
        Ok(())
    }
}

/// A residue: an ordered group of atoms plus its classification and ribbon state.
///
/// `polymer_type`, `ss_type` and `ss_id` hold whatever the last derivation pass left
/// behind; the owning [`Structure`](super::structure::Structure) exposes accessors that
/// refresh them first when they are stale.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub(crate) name: String,
    pub(crate) key: ResidueKey,
    pub(crate) chain: Option<ChainId>,
    pub(crate) atoms: Vec<AtomId>,
    atom_name_map: HashMap<String, Vec<AtomId>>,
    pub(crate) is_het: bool,
    pub(crate) polymer_type: PolymerType,
    pub(crate) ss_type: SsType,
    pub(crate) ss_id: i32,
    pub(crate) ribbon_display: bool,
    pub(crate) ribbon_hide_backbone: bool,
    pub(crate) ribbon_color: Rgba,
    pub(crate) ribbon_adjust: f64,
    pub(crate) ribbon_selected: bool,
}

impl Residue {
    pub(crate) fn new(name: &str, key: ResidueKey) -> Self {
        Self {
            name: name.to_string(),
            key,
            chain: None,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
            is_het: false,
            polymer_type: PolymerType::None,
            ss_type: SsType::Coil,
            ss_id: -1,
            ribbon_display: false,
            ribbon_hide_backbone: true,
            ribbon_color: Rgba::default(),
            ribbon_adjust: -1.0,
            ribbon_selected: false,
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map
            .entry(atom_name.to_string())
            .or_default()
            .push(atom_id);
    }

    pub(crate) fn remove_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.retain(|&id| id != atom_id);
        if let Some(ids) = self.atom_name_map.get_mut(atom_name) {
            ids.retain(|&id| id != atom_id);
            if ids.is_empty() {
                self.atom_name_map.remove(atom_name);
            }
        }
    }

    pub(crate) fn rename_atom(&mut self, old_name: &str, new_name: &str, atom_id: AtomId) {
        if let Some(ids) = self.atom_name_map.get_mut(old_name) {
            ids.retain(|&id| id != atom_id);
            if ids.is_empty() {
                self.atom_name_map.remove(old_name);
            }
        }
        self.atom_name_map
            .entry(new_name.to_string())
            .or_default()
            .push(atom_id);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &ResidueKey {
        &self.key
    }

    pub fn chain_id(&self) -> &str {
        &self.key.chain_id
    }

    pub fn number(&self) -> i32 {
        self.key.number
    }

    pub fn insertion_code(&self) -> char {
        self.key.insertion_code
    }

    /// The chain this residue is indexed under, if any.
    pub fn chain(&self) -> Option<ChainId> {
        self.chain
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    /// First atom with the given name, in insertion order.
    pub fn find_atom(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map
            .get(name)
            .and_then(|ids| ids.first().copied())
    }

    /// All atoms with the given name (alternate locations may share a name).
    pub fn find_atoms(&self, name: &str) -> &[AtomId] {
        self.atom_name_map
            .get(name)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn count_atom(&self, name: &str) -> usize {
        self.find_atoms(name).len()
    }

    pub fn is_het(&self) -> bool {
        self.is_het
    }

    pub fn ribbon_display(&self) -> bool {
        self.ribbon_display
    }

    pub fn ribbon_hide_backbone(&self) -> bool {
        self.ribbon_hide_backbone
    }

    pub fn ribbon_color(&self) -> Rgba {
        self.ribbon_color
    }

    pub fn ribbon_selected(&self) -> bool {
        self.ribbon_selected
    }

    /// The ribbon adjustment as stored; negative means "derive from secondary structure".
    pub fn raw_ribbon_adjust(&self) -> f64 {
        self.ribbon_adjust
    }

    /// Effective ribbon adjustment: the stored value when set, otherwise 1.0 for
    /// strands and 0.0 for everything else.
    pub fn ribbon_adjust(&self) -> f64 {
        if self.ribbon_adjust >= 0.0 {
            self.ribbon_adjust
        } else if self.ss_type == SsType::Strand {
            1.0
        } else {
            0.0
        }
    }
}
