use super::ids::ResidueId;
use super::residue::PolymerType;

/// An index over the residues sharing one chain id, in creation order.
///
/// A chain owns no atoms; it only orders residues that the structure already owns.
/// Its polymer type is derived state, read through
/// [`Structure::chain_polymer_type`](super::structure::Structure::chain_polymer_type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub(crate) chain_id: String,
    pub(crate) residues: Vec<ResidueId>,
    pub(crate) polymer_type: PolymerType,
}

impl Chain {
    pub(crate) fn new(chain_id: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            residues: Vec::new(),
            polymer_type: PolymerType::None,
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn residues(&self) -> &[ResidueId] {
        &self.residues
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}
