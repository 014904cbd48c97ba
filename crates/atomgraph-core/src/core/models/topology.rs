use super::atom::HideFlags;
use super::color::Rgba;
use super::ids::AtomId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single = 1,
    Double = 2,
    Triple = 3,
    Aromatic = 4,
}

impl BondOrder {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            4 => Some(Self::Aromatic),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// Canonical, order-independent key for the atom pair of a connection.
///
/// Two connections between the same atoms map to the same key regardless of the
/// order in which their endpoints were given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct AtomPair(AtomId, AtomId);

impl AtomPair {
    pub(crate) fn new(a1: AtomId, a2: AtomId) -> Self {
        if a1 <= a2 { Self(a1, a2) } else { Self(a2, a1) }
    }
}

/// A covalent bond: an undirected, unique connection between two distinct atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub(crate) atoms: [AtomId; 2],
    pub(crate) order: BondOrder,
    pub(crate) display: bool,
    pub(crate) hide: HideFlags,
    pub(crate) halfbond: bool,
    pub(crate) radius: f64,
    pub(crate) color: Rgba,
}

impl Bond {
    pub const DEFAULT_RADIUS: f64 = 0.2;

    pub(crate) fn new(atom1: AtomId, atom2: AtomId, order: BondOrder) -> Self {
        Self {
            atoms: [atom1, atom2],
            order,
            display: true,
            hide: HideFlags::empty(),
            halfbond: true,
            radius: Self::DEFAULT_RADIUS,
            color: Rgba::default(),
        }
    }

    /// Both endpoints, in the order the bond was created with.
    pub fn atoms(&self) -> [AtomId; 2] {
        self.atoms
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atoms[0] == atom_id || self.atoms[1] == atom_id
    }

    /// The endpoint opposite `atom_id`, or `None` if `atom_id` is not an endpoint.
    pub fn other_atom(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atoms[0] == atom_id {
            Some(self.atoms[1])
        } else if self.atoms[1] == atom_id {
            Some(self.atoms[0])
        } else {
            None
        }
    }

    pub fn order(&self) -> BondOrder {
        self.order
    }

    pub fn display(&self) -> bool {
        self.display
    }

    pub fn hide(&self) -> HideFlags {
        self.hide
    }

    pub fn halfbond(&self) -> bool {
        self.halfbond
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub(crate) fn pair(&self) -> AtomPair {
        AtomPair::new(self.atoms[0], self.atoms[1])
    }
}
