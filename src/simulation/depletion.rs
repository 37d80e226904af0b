//! Fuel burnup and component wear

use crate::components::NuclearFuel;
use crate::core::config::SimulationConfig;
use crate::core::types::{ComponentId, GridCoord};
use crate::simulation::flux::FluxField;
use crate::spatial::snapshot::GridSnapshot;
use crate::spatial::ReactorGrid;

/// A rod whose fuel burned out this tick
#[derive(Debug, Clone, PartialEq)]
pub struct FuelExhaustion {
    pub component: ComponentId,
    pub coord: GridCoord,
    pub fuel: String,
}

#[derive(Debug, Clone, Default)]
pub struct DepletionOutcome {
    pub exhausted: Vec<FuelExhaustion>,
    /// Components whose durability reached zero this tick
    pub worn_out: Vec<(ComponentId, GridCoord)>,
}

/// Multiplier applied to cross-sections after `exposure` flux for one tick
#[inline]
pub fn burnup_factor(exposure: f64, config: &SimulationConfig) -> f64 {
    (1.0 - config.burnup_rate * exposure).clamp(0.0, 1.0)
}

pub fn apply_depletion(
    grid: &mut ReactorGrid,
    snapshot: &GridSnapshot,
    flux: &FluxField,
    config: &SimulationConfig,
) -> DepletionOutcome {
    let mut outcome = DepletionOutcome::default();
    let dimensions = snapshot.dimensions();

    for (index, cell) in snapshot.occupied() {
        let exposure = flux.total_at(index);
        let coord = dimensions.coord_of(index);

        if let Some(source) = cell.source {
            if !source.spent && exposure > 0.0 {
                if let Some(exhaustion) = burn_rod(grid, index, exposure, config) {
                    tracing::debug!(
                        "Fuel '{}' exhausted in rod {:?} at {}",
                        exhaustion.fuel,
                        cell.id,
                        coord
                    );
                    outcome.exhausted.push(FuelExhaustion { coord, ..exhaustion });
                }
            }
        }

        if exposure > 0.0 {
            if let Some(component) = grid.component_at_index_mut(index) {
                if component.durability > 0 {
                    component.durability -= 1;
                    if component.durability == 0 {
                        outcome.worn_out.push((component.id, coord));
                    }
                }
            }
        }
    }

    outcome
}

/// Write the burned fuel to a new arena entry and repoint the rod
fn burn_rod(
    grid: &mut ReactorGrid,
    index: usize,
    exposure: f64,
    config: &SimulationConfig,
) -> Option<FuelExhaustion> {
    let (component_id, old_id) = {
        let component = grid.component_at_index_mut(index)?;
        (component.id, component.fuel_id()?)
    };
    let current = grid.fuels().get(old_id)?.clone();

    let burned = current.depleted(burnup_factor(exposure, config));
    let exhausted = burned.below_viability(config.spent_fuel_threshold);
    let next = if exhausted {
        NuclearFuel::spent(current.name.clone())
    } else {
        burned
    };

    let arena = grid.fuels_mut();
    let new_id = arena.insert(next);
    arena.release(old_id);
    if let Some(rod) = grid
        .component_at_index_mut(index)
        .and_then(|c| c.fuel_rod_state_mut())
    {
        rod.fuel = new_id;
    }

    exhausted.then(|| FuelExhaustion {
        component: component_id,
        coord: GridCoord::default(),
        fuel: current.name,
    })
}
