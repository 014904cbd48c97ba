use super::ids::{AtomId, BondId, ChainId, CoordSetId, PbGroupId, PseudobondId, ResidueId};
use super::residue::ResidueKey;
use thiserror::Error;

/// Failures of structure mutations and lookups.
///
/// Every operation that returns one of these leaves the structure exactly as it
/// was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("Bond already exists between atoms {atom1:?} and {atom2:?}")]
    DuplicateBond { atom1: AtomId, atom2: AtomId },

    #[error("Can't bond an atom to itself ({0:?})")]
    SelfBond(AtomId),

    #[error("Can't form pseudobond from an atom to itself ({0:?})")]
    SelfPseudobond(AtomId),

    #[error("Residue {0} already exists")]
    DuplicateResidue(ResidueKey),

    #[error("Atom not found: {0:?}")]
    AtomNotFound(AtomId),

    #[error("Bond not found: {0:?}")]
    BondNotFound(BondId),

    #[error("Residue not found: {0:?}")]
    ResidueNotFound(ResidueId),

    #[error("Chain not found: {0:?}")]
    ChainNotFound(ChainId),

    #[error("Coordinate set not found: {0:?}")]
    CoordSetNotFound(CoordSetId),

    #[error("Pseudobond group not found: {0:?}")]
    PbGroupNotFound(PbGroupId),

    #[error("Pseudobond not found: {0:?}")]
    PseudobondNotFound(PseudobondId),

    #[error("Pseudobond group '{0}' already exists")]
    DuplicatePbGroup(String),

    #[error("Coordinate set with id {0} already exists")]
    DuplicateCoordSet(i32),

    #[error("Atom {atom:?} is not an endpoint of this connection")]
    NotAnEndpoint { atom: AtomId },

    #[error("Atom {atom:?} has no coordinates in coordinate set {coord_set:?}")]
    MissingCoordinates { atom: AtomId, coord_set: CoordSetId },
}
