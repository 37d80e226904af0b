//! Fixed-size 3D grid of reactor components
//!
//! The grid is the root of a reactor's state: it owns every placed component
//! and the fuel arena the rods point into. Its size is fixed at construction.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::snapshot::{CellView, GridSnapshot, SourceView};
use crate::components::{ComponentKind, FuelArena, FuelId, NuclearFuel, ReactorComponent};
use crate::core::error::{ReactorError, Result};
use crate::core::types::{ComponentId, GridCoord, GridDimensions};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GridRecord", into = "GridRecord")]
pub struct ReactorGrid {
    dimensions: GridDimensions,
    cells: Vec<Option<ReactorComponent>>,
    fuels: FuelArena,
    next_id: u32,
    /// Component id -> storage index
    index: AHashMap<ComponentId, usize>,
}

impl ReactorGrid {
    /// Empty grid; `dimensions` must pass [`GridDimensions::validate`]
    pub fn new(dimensions: GridDimensions) -> Self {
        debug_assert!(dimensions.validate().is_ok(), "bad dimensions {}", dimensions);
        Self {
            dimensions,
            cells: vec![None; dimensions.cell_count()],
            fuels: FuelArena::new(),
            next_id: 0,
            index: AHashMap::new(),
        }
    }

    /// Empty grid, rejecting zero or oversized dimensions
    pub fn try_new(dimensions: GridDimensions) -> Result<Self> {
        dimensions.validate().map_err(ReactorError::InvalidDimensions)?;
        Ok(Self::new(dimensions))
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // === FUEL ===

    pub fn fuels(&self) -> &FuelArena {
        &self.fuels
    }

    pub(crate) fn fuels_mut(&mut self) -> &mut FuelArena {
        &mut self.fuels
    }

    /// Register a fuel definition; the caller holds one reference
    ///
    /// Rods placed with the returned id take their own references, so the
    /// caller should [`release_fuel`](Self::release_fuel) the template once
    /// it has no more rods to place.
    pub fn add_fuel(&mut self, fuel: NuclearFuel) -> Result<FuelId> {
        if !fuel.cross_sections.is_valid() {
            return Err(ReactorError::InvalidFuel {
                name: fuel.name,
                reason: "cross-sections outside [0, 1]".into(),
            });
        }
        Ok(self.fuels.insert(fuel))
    }

    pub fn release_fuel(&mut self, id: FuelId) {
        self.fuels.release(id);
    }

    /// Fuel of a fuel rod component
    pub fn fuel_of(&self, component: &ReactorComponent) -> Option<&NuclearFuel> {
        component.fuel_id().and_then(|id| self.fuels.get(id))
    }

    /// Swap the fuel of a rod, e.g. after a manual refuel by the player
    pub fn replace_fuel(&mut self, rod: ComponentId, fuel: NuclearFuel) -> Result<()> {
        let idx = *self
            .index
            .get(&rod)
            .ok_or(ReactorError::ComponentNotFound(rod))?;
        let coord = self.dimensions.coord_of(idx);
        if !fuel.cross_sections.is_valid() {
            return Err(ReactorError::InvalidFuel {
                name: fuel.name,
                reason: "cross-sections outside [0, 1]".into(),
            });
        }

        let old = match self.cells[idx].as_ref().map(|c| &c.kind) {
            Some(ComponentKind::FuelRod(state)) => state.fuel,
            _ => return Err(ReactorError::NotAFuelRod(rod)),
        };

        let new_id = self.fuels.insert(fuel);
        if let Some(state) = self.cells[idx]
            .as_mut()
            .and_then(|c| c.fuel_rod_state_mut())
        {
            state.fuel = new_id;
            state.last_fission_rate = 0.0;
        }
        self.fuels.release(old);
        tracing::debug!("Refueled rod {:?} at {}", rod, coord);
        Ok(())
    }

    // === PLACEMENT ===

    /// Insert or replace the component at `coord`
    ///
    /// A replaced component is dropped and its fuel reference released.
    pub fn place(&mut self, coord: GridCoord, component: ReactorComponent) -> Result<ComponentId> {
        let idx = self.checked_index(coord)?;

        let mut component = component;
        if !component.neutron_profile.is_valid() {
            return Err(ReactorError::InvalidPlacement {
                coord,
                reason: "neutron profile factors must lie in [0, 1]".into(),
            });
        }
        if let Some(fuel) = component.fuel_id() {
            if !self.fuels.retain(fuel) {
                return Err(ReactorError::InvalidPlacement {
                    coord,
                    reason: format!("fuel rod refers to unknown fuel {:?}", fuel),
                });
            }
        }

        if let Some(displaced) = self.take_at(idx) {
            tracing::trace!("Replaced component {:?} at {}", displaced.id, coord);
        }

        let id = ComponentId(self.next_id);
        self.next_id += 1;
        component.id = id;
        self.cells[idx] = Some(component);
        self.index.insert(id, idx);
        Ok(id)
    }

    /// Insert a component, failing if the cell is taken
    pub fn place_strict(
        &mut self,
        coord: GridCoord,
        component: ReactorComponent,
    ) -> Result<ComponentId> {
        let idx = self.checked_index(coord)?;
        if self.cells[idx].is_some() {
            return Err(ReactorError::OccupiedCell(coord));
        }
        self.place(coord, component)
    }

    /// Remove the component at `coord` (structural removal by the host)
    pub fn remove(&mut self, coord: GridCoord) -> Option<ReactorComponent> {
        let idx = self.dimensions.index_of(coord)?;
        self.take_at(idx)
    }

    fn take_at(&mut self, idx: usize) -> Option<ReactorComponent> {
        let removed = self.cells[idx].take()?;
        self.index.remove(&removed.id);
        if let Some(fuel) = removed.fuel_id() {
            self.fuels.release(fuel);
        }
        Some(removed)
    }

    fn checked_index(&self, coord: GridCoord) -> Result<usize> {
        self.dimensions
            .index_of(coord)
            .ok_or_else(|| ReactorError::InvalidPlacement {
                coord,
                reason: format!(
                    "outside {}x{}x{} grid",
                    self.dimensions.width, self.dimensions.height, self.dimensions.depth
                ),
            })
    }

    // === QUERIES ===

    pub fn get(&self, coord: GridCoord) -> Option<&ReactorComponent> {
        self.dimensions
            .index_of(coord)
            .and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, coord: GridCoord) -> Option<&mut ReactorComponent> {
        let idx = self.dimensions.index_of(coord)?;
        self.cells[idx].as_mut()
    }

    pub fn locate(&self, id: ComponentId) -> Option<GridCoord> {
        self.index.get(&id).map(|&i| self.dimensions.coord_of(i))
    }

    pub fn component(&self, id: ComponentId) -> Option<&ReactorComponent> {
        self.index.get(&id).and_then(|&i| self.cells[i].as_ref())
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut ReactorComponent> {
        let idx = *self.index.get(&id)?;
        self.cells[idx].as_mut()
    }

    pub(crate) fn component_at_index_mut(&mut self, index: usize) -> Option<&mut ReactorComponent> {
        self.cells.get_mut(index).and_then(|c| c.as_mut())
    }

    /// Occupied cells in ascending coordinate order
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &ReactorComponent)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.as_ref().map(|c| (self.dimensions.coord_of(i), c)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (GridCoord, &mut ReactorComponent)> + '_ {
        let dimensions = self.dimensions;
        self.cells
            .iter_mut()
            .enumerate()
            .filter_map(move |(i, c)| c.as_mut().map(|c| (dimensions.coord_of(i), c)))
    }

    /// Up to six orthogonally adjacent occupied cells
    pub fn neighbors(&self, coord: GridCoord) -> Vec<(GridCoord, &ReactorComponent)> {
        coord
            .orthogonal()
            .filter_map(|n| self.get(n).map(|c| (n, c)))
            .collect()
    }

    /// Frozen view for one tick of the pipeline
    pub fn snapshot(&self) -> GridSnapshot {
        let cells = self
            .cells
            .iter()
            .map(|cell| cell.as_ref().map(|c| self.view_of(c)))
            .collect();
        GridSnapshot::new(self.dimensions, cells)
    }

    fn view_of(&self, c: &ReactorComponent) -> CellView {
        let source = c.fuel_rod_state().map(|rod| {
            let fuel = self.fuels.get(rod.fuel);
            SourceView {
                cross_sections: fuel.map(|f| f.cross_sections).unwrap_or_default(),
                spent: fuel.map(|f| f.spent).unwrap_or(true),
                neutron_source_intensity: rod.neutron_source_intensity,
                last_fission_rate: rod.last_fission_rate,
            }
        });
        let coolant = match &c.kind {
            ComponentKind::CoolantChannel(coolant) => Some(*coolant),
            _ => None,
        };
        CellView {
            id: c.id,
            kind: c.kind.tag(),
            temperature: c.temperature,
            max_temperature: c.max_temperature,
            thermal_conductivity: c.thermal_conductivity,
            neutron_profile: c.neutron_profile,
            source,
            coolant,
        }
    }
}

/// Serialized form: the occupied cells as a sparse list
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GridRecord {
    dimensions: GridDimensions,
    components: Vec<(GridCoord, ReactorComponent)>,
    fuels: FuelArena,
    next_id: u32,
}

impl From<ReactorGrid> for GridRecord {
    fn from(grid: ReactorGrid) -> Self {
        let dimensions = grid.dimensions;
        let components = grid
            .cells
            .into_iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|c| (dimensions.coord_of(i), c)))
            .collect();
        Self {
            dimensions,
            components,
            fuels: grid.fuels,
            next_id: grid.next_id,
        }
    }
}

impl TryFrom<GridRecord> for ReactorGrid {
    type Error = String;

    fn try_from(record: GridRecord) -> std::result::Result<Self, Self::Error> {
        record.dimensions.validate()?;
        let mut grid = ReactorGrid::new(record.dimensions);
        grid.fuels = record.fuels;
        grid.next_id = record.next_id;
        for (coord, component) in record.components {
            let idx = record
                .dimensions
                .index_of(coord)
                .ok_or_else(|| format!("component {:?} outside grid at {}", component.id, coord))?;
            if component.id.0 >= grid.next_id {
                return Err(format!("component id {:?} not below next_id", component.id));
            }
            if grid.index.insert(component.id, idx).is_some() {
                return Err(format!("duplicate component id {:?}", component.id));
            }
            if grid.cells[idx].replace(component).is_some() {
                return Err(format!("two components at {}", coord));
            }
        }
        let rod_fuels: Vec<FuelId> = grid
            .cells
            .iter()
            .flatten()
            .filter_map(|c| c.fuel_id())
            .collect();
        grid.fuels.reconcile(&rod_fuels)?;
        Ok(grid)
    }
}
