use crate::core::models::ids::ResidueId;
use std::collections::BTreeSet;

/// Which cycles a ring query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingMode {
    /// The minimum cycle basis, filtered by the size threshold.
    Basis,
    /// Every simple cycle up to the size threshold.
    All,
}

/// Parameters of a ring perception request.
///
/// Built fluently from [`RingQuery::minimum`]:
///
/// ```
/// use atomgraph::core::rings::RingQuery;
///
/// let query = RingQuery::minimum().cross_residues(true).size_threshold(8);
/// assert_eq!(query.threshold(), 8);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RingQuery {
    cross_residues: bool,
    size_threshold: usize,
    ignore: BTreeSet<ResidueId>,
}

impl RingQuery {
    /// Intra-residue rings of any size, nothing ignored.
    pub fn minimum() -> Self {
        Self::default()
    }

    /// Allow cycles whose bonds cross residue boundaries.
    pub fn cross_residues(mut self, cross: bool) -> Self {
        self.cross_residues = cross;
        self
    }

    /// Exclude rings with more bonds than `threshold`; 0 means unbounded.
    pub fn size_threshold(mut self, threshold: usize) -> Self {
        self.size_threshold = threshold;
        self
    }

    /// Leave the atoms of these residues out of ring perception.
    pub fn ignore<I>(mut self, residues: I) -> Self
    where
        I: IntoIterator<Item = ResidueId>,
    {
        self.ignore.extend(residues);
        self
    }

    pub fn is_cross_residues(&self) -> bool {
        self.cross_residues
    }

    pub fn threshold(&self) -> usize {
        self.size_threshold
    }

    pub fn ignored(&self) -> &BTreeSet<ResidueId> {
        &self.ignore
    }

    /// The threshold with 0 resolved against the number of atoms in the structure.
    pub(crate) fn effective_threshold(&self, atom_count: usize) -> usize {
        if self.size_threshold == 0 {
            atom_count
        } else {
            self.size_threshold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    #[test]
    fn minimum_query_has_conventional_defaults() {
        let query = RingQuery::minimum();
        assert!(!query.is_cross_residues());
        assert_eq!(query.threshold(), 0);
        assert!(query.ignored().is_empty());
    }

    #[test]
    fn zero_threshold_resolves_to_atom_count() {
        assert_eq!(RingQuery::minimum().effective_threshold(42), 42);
        assert_eq!(RingQuery::minimum().size_threshold(6).effective_threshold(42), 6);
    }

    #[test]
    fn queries_with_same_parameters_are_equal_regardless_of_ignore_order() {
        let r1 = ResidueId::from(KeyData::from_ffi(1));
        let r2 = ResidueId::from(KeyData::from_ffi(2));
        let a = RingQuery::minimum().ignore([r1, r2]);
        let b = RingQuery::minimum().ignore([r2, r1]);
        assert_eq!(a, b);
    }
}
