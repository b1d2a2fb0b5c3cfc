//! Start cells of the per-layer traversal, keyed by height.

use crate::cross3d::CellId;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// Ordered mapping from the height at which the first cell of a slice
/// changes to that cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStartIndex {
    starts: BTreeMap<OrderedFloat<f32>, CellId>,
}

impl LayerStartIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, z: f32, cell: CellId) {
        self.starts.insert(OrderedFloat(z), cell);
    }

    /// The cell indexed at the greatest height not above `z`.
    ///
    /// Heights below the first entry use the first entry. Returns `None`
    /// only for an empty index.
    pub fn start_cell(&self, z: f32) -> Option<CellId> {
        self.starts
            .range(..=OrderedFloat(z))
            .next_back()
            .or_else(|| self.starts.iter().next())
            .map(|(_, &cell)| cell)
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Entries in ascending height order
    pub fn iter(&self) -> impl Iterator<Item = (f32, CellId)> + '_ {
        self.starts.iter().map(|(z, &cell)| (z.0, cell))
    }
}

impl FromIterator<(f32, CellId)> for LayerStartIndex {
    fn from_iter<I: IntoIterator<Item = (f32, CellId)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (z, cell) in iter {
            index.insert(z, cell);
        }
        index
    }
}
