use super::atom::{Atom, HideFlags};
use super::color::Rgba;
use super::ids::{AtomId, CoordSetId, PbGroupId, PseudobondId};

/// A named collection of pseudobonds, kept apart from the covalent bond graph.
///
/// A group bound to a coordinate set holds trajectory-varying pseudobonds; every
/// pseudobond created in it inherits that binding.
#[derive(Debug, Clone, PartialEq)]
pub struct PbGroup {
    pub(crate) name: String,
    pub(crate) coord_set: Option<CoordSetId>,
    pub(crate) pseudobonds: Vec<PseudobondId>,
    pub(crate) display: bool,
    pub(crate) halfbond: bool,
    pub(crate) radius: f64,
    pub(crate) color: Rgba,
}

impl PbGroup {
    pub const DEFAULT_RADIUS: f64 = 0.075;

    pub(crate) fn new(name: &str, coord_set: Option<CoordSetId>) -> Self {
        Self {
            name: name.to_string(),
            coord_set,
            pseudobonds: Vec::new(),
            display: true,
            halfbond: false,
            radius: Self::DEFAULT_RADIUS,
            color: Rgba::new(255, 255, 0, 255),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coord_set(&self) -> Option<CoordSetId> {
        self.coord_set
    }

    pub fn pseudobonds(&self) -> &[PseudobondId] {
        &self.pseudobonds
    }

    pub fn display(&self) -> bool {
        self.display
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
}

/// A non-covalent connection between two atoms, owned by a [`PbGroup`].
///
/// Pseudobonds are not unique: the same atom pair may be joined more than once,
/// and they never take part in ring perception.
#[derive(Debug, Clone, PartialEq)]
pub struct Pseudobond {
    pub(crate) atoms: [AtomId; 2],
    pub(crate) group: PbGroupId,
    pub(crate) coord_set: Option<CoordSetId>,
    pub(crate) display: bool,
    pub(crate) hide: HideFlags,
    pub(crate) halfbond: bool,
    pub(crate) radius: f64,
    pub(crate) color: Rgba,
    pub(crate) shown_when_atoms_hidden: bool,
}

impl Pseudobond {
    pub(crate) fn new(atom1: AtomId, atom2: AtomId, group: PbGroupId, template: &PbGroup) -> Self {
        Self {
            atoms: [atom1, atom2],
            group,
            coord_set: template.coord_set,
            display: true,
            hide: HideFlags::empty(),
            halfbond: template.halfbond,
            radius: template.radius,
            color: template.color,
            shown_when_atoms_hidden: true,
        }
    }

    pub fn atoms(&self) -> [AtomId; 2] {
        self.atoms
    }

    pub fn group(&self) -> PbGroupId {
        self.group
    }

    pub fn coord_set(&self) -> Option<CoordSetId> {
        self.coord_set
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atoms[0] == atom_id || self.atoms[1] == atom_id
    }

    pub fn other_atom(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atoms[0] == atom_id {
            Some(self.atoms[1])
        } else if self.atoms[1] == atom_id {
            Some(self.atoms[0])
        } else {
            None
        }
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

    pub fn shown_when_atoms_hidden(&self) -> bool {
        self.shown_when_atoms_hidden
    }

    /// Whether the pseudobond should be drawn given its two endpoint atoms.
    ///
    /// When `shown_when_atoms_hidden` is set an endpoint only needs to be displayed
    /// (or merely hidden by some subsystem); otherwise both endpoints must be visible.
    pub(crate) fn shown_between(&self, a1: &Atom, a2: &Atom) -> bool {
        if !(self.display && self.hide.is_empty()) {
            return false;
        }
        if self.shown_when_atoms_hidden {
            let ok = |a: &Atom| a.display || !a.hide.is_empty();
            ok(a1) && ok(a2)
        } else {
            a1.visible() && a2.visible()
        }
    }
}
