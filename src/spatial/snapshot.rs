//! Frozen per-tick view of a reactor grid
//!
//! Every pipeline stage reads from the snapshot and writes to the live grid,
//! so nothing a stage writes can influence what a later cell in the same pass
//! reads.

use crate::components::{ComponentKindTag, CoolantState, CrossSections, NeutronProfile};
use crate::core::types::{ComponentId, GridCoord, GridDimensions, Kelvin};

/// Neutron source data of a fuel rod, with its fuel already resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceView {
    pub cross_sections: CrossSections,
    pub spent: bool,
    pub neutron_source_intensity: f64,
    pub last_fission_rate: f64,
}

/// Read-only copy of one occupied cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellView {
    pub id: ComponentId,
    pub kind: ComponentKindTag,
    pub temperature: Kelvin,
    pub max_temperature: Kelvin,
    pub thermal_conductivity: f64,
    pub neutron_profile: NeutronProfile,
    pub source: Option<SourceView>,
    pub coolant: Option<CoolantState>,
}

#[derive(Debug, Clone)]
pub struct GridSnapshot {
    dimensions: GridDimensions,
    cells: Vec<Option<CellView>>,
}

impl GridSnapshot {
    pub(crate) fn new(dimensions: GridDimensions, cells: Vec<Option<CellView>>) -> Self {
        debug_assert_eq!(cells.len(), dimensions.cell_count());
        Self { dimensions, cells }
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn cell(&self, index: usize) -> Option<&CellView> {
        self.cells.get(index).and_then(|c| c.as_ref())
    }

    pub fn cell_at(&self, coord: GridCoord) -> Option<&CellView> {
        self.dimensions.index_of(coord).and_then(|i| self.cell(i))
    }

    /// Occupied cells in ascending coordinate order
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &CellView)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i, c)))
    }

    /// In-bounds orthogonal neighbor indices in the fixed direction order,
    /// occupied or not
    pub fn adjacent_indices(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let coord = self.dimensions.coord_of(index);
        coord
            .orthogonal()
            .filter_map(move |n| self.dimensions.index_of(n))
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Occupied orthogonal neighbors of a cell
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (usize, &CellView)> + '_ {
        self.adjacent_indices(index)
            .filter_map(move |n| self.cell(n).map(|c| (n, c)))
    }

    pub fn neighbor_count(&self, index: usize) -> usize {
        self.neighbors(index).count()
    }
}
