use super::ids::AtomId;
use nalgebra::Point3;
use slotmap::SecondaryMap;

/// One frame of atomic coordinates.
///
/// Coordinates are keyed by atom handle, so a frame may cover any subset of the
/// structure's atoms.
#[derive(Debug, Clone, Default)]
pub struct CoordSet {
    pub(crate) id: i32,
    pub(crate) coords: SecondaryMap<AtomId, Point3<f64>>,
}

impl CoordSet {
    pub(crate) fn new(id: i32) -> Self {
        Self {
            id,
            coords: SecondaryMap::new(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn coord(&self, atom_id: AtomId) -> Option<&Point3<f64>> {
        self.coords.get(atom_id)
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}
