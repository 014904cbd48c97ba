use super::color::Rgba;
use super::ids::{BondId, ResidueId};
use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

bitflags! {
    /// Hide bits shared by atoms, bonds and pseudobonds.
    ///
    /// An entity with any hide bit set is not drawn even when its display flag is on.
    /// Each bit is owned by the subsystem that sets it, so clearing one reason for
    /// hiding never reveals an entity another subsystem still wants hidden.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HideFlags: u32 {
        /// Hidden because a ribbon is drawn through the backbone.
        const RIBBON = 0x1;
        /// Hidden by a structure-level level-of-detail decision.
        const LOD = 0x2;
        /// Hidden by an explicit user request.
        const USER = 0x4;
    }
}

/// How an atom is drawn by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DrawMode {
    /// Full van der Waals sphere.
    Sphere = 0,
    /// Stick end cap, the default for bonded atoms.
    #[default]
    EndCap = 1,
    /// Scaled-down ball for ball-and-stick.
    Ball = 2,
}

impl DrawMode {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Sphere),
            1 => Some(Self::EndCap),
            2 => Some(Self::Ball),
            _ => None,
        }
    }
}

const ELEMENT_SYMBOLS: [&str; 119] = [
    "LP", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// A chemical element identified by its atomic number.
///
/// Atomic number 0 is reserved for lone pairs and unknown elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Element(u8);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown element symbol '{0}'")]
pub struct ParseElementError(pub String);

impl Element {
    pub const UNKNOWN: Element = Element(0);
    pub const H: Element = Element(1);
    pub const C: Element = Element(6);
    pub const N: Element = Element(7);
    pub const O: Element = Element(8);
    pub const P: Element = Element(15);
    pub const S: Element = Element(16);

    /// Creates an element from an atomic number, rejecting numbers past the periodic table.
    pub fn from_number(number: u8) -> Option<Self> {
        ((number as usize) < ELEMENT_SYMBOLS.len()).then_some(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn symbol(self) -> &'static str {
        ELEMENT_SYMBOLS[self.0 as usize]
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    /// Parses an element symbol case-insensitively ("CL", "cl" and "Cl" are chlorine).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ELEMENT_SYMBOLS
            .iter()
            .position(|symbol| symbol.eq_ignore_ascii_case(trimmed))
            .map(|idx| Element(idx as u8))
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An atom of a [`Structure`](super::structure::Structure).
///
/// Atoms are created only through the owning structure, which keeps the residue
/// membership and the incident-bond list consistent with the bond graph. Coordinates
/// live in [`CoordSet`](super::coordset::CoordSet)s, not on the atom.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub(crate) name: String,
    pub(crate) element: Element,
    pub(crate) serial_number: i32,
    pub(crate) residue: ResidueId,
    pub(crate) bonds: Vec<BondId>,
    pub(crate) display: bool,
    pub(crate) hide: HideFlags,
    pub(crate) draw_mode: DrawMode,
    pub(crate) color: Rgba,
    pub(crate) bfactor: f64,
}

impl Atom {
    pub(crate) fn new(name: &str, element: Element, residue: ResidueId) -> Self {
        Self {
            name: name.to_string(),
            element,
            serial_number: 0,
            residue,
            bonds: Vec::new(),
            display: true,
            hide: HideFlags::empty(),
            draw_mode: DrawMode::default(),
            color: Rgba::default(),
            bfactor: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element(&self) -> Element {
        self.element
    }

    pub fn serial_number(&self) -> i32 {
        self.serial_number
    }

    /// The residue this atom belongs to.
    pub fn residue(&self) -> ResidueId {
        self.residue
    }

    /// Bonds incident on this atom, in the order they were formed.
    pub fn bonds(&self) -> &[BondId] {
        &self.bonds
    }

    pub fn display(&self) -> bool {
        self.display
    }

    pub fn hide(&self) -> HideFlags {
        self.hide
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn bfactor(&self) -> f64 {
        self.bfactor
    }

    /// Displayed and not hidden for any reason.
    pub fn visible(&self) -> bool {
        self.display && self.hide.is_empty()
    }
}
