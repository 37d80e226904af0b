//! Heat generation, diffusion and coolant removal
//!
//! All three steps read the tick-start snapshot and accumulate into a delta
//! buffer, so the result does not depend on the order cells are visited:
//!
//! 1. Fuel rods turn fission and capture rates into heat.
//! 2. Each orthogonal pair exchanges a fraction of its temperature difference.
//!    The fraction is bottlenecked by the weaker conductor and divided by the
//!    larger neighbor count of the pair. Exchange is pairwise, so diffusion
//!    neither creates nor destroys heat.
//! 3. Coolant channels carry away part of their excess over inlet temperature.

use crate::core::config::SimulationConfig;
use crate::simulation::flux::FluxField;
use crate::spatial::snapshot::{GridSnapshot, SourceView};
use crate::spatial::ReactorGrid;

/// Result of the thermal stage
#[derive(Debug, Clone, Default)]
pub struct ThermalOutcome {
    /// Heat added by fission and capture this tick (K summed over cells)
    pub heat_generated: f64,
    /// Heat carried away by coolant this tick
    pub heat_removed: f64,
    /// Sum of every rod's largest possible output under the flux ceiling
    pub max_heat_output: f64,
}

/// Largest heat a rod can produce in one tick
///
/// Flux is clamped to `max_cell_flux` per group, so this bounds any tick's
/// output for the rod's current cross-sections.
pub fn max_heat_output(source: &SourceView, config: &SimulationConfig) -> f64 {
    let cs = source.cross_sections;
    config.max_cell_flux
        * ((cs.he_fission + cs.le_fission) * config.fission_heat
            + (cs.he_capture + cs.le_capture) * config.capture_heat)
}

/// Heat generated at a rod and its fission rate
pub fn rod_heat(source: &SourceView, he: f64, le: f64, config: &SimulationConfig) -> (f64, f64) {
    if source.spent {
        return (0.0, 0.0);
    }
    let cs = source.cross_sections;
    let fission = cs.fission_rate(he, le);
    let capture = cs.capture_rate(he, le);
    (
        config.fission_heat * fission + config.capture_heat * capture,
        fission,
    )
}

/// Fraction of a pair's temperature difference moved in one tick
pub fn transfer_fraction(
    conductivity_a: f64,
    conductivity_b: f64,
    neighbors_a: usize,
    neighbors_b: usize,
    config: &SimulationConfig,
) -> f64 {
    let bottleneck = conductivity_a.min(conductivity_b);
    let fraction = (config.diffusion_rate * bottleneck).clamp(0.0, config.max_transfer_fraction);
    fraction / neighbors_a.max(neighbors_b).max(1) as f64
}

pub fn apply_thermal(
    grid: &mut ReactorGrid,
    snapshot: &GridSnapshot,
    flux: &FluxField,
    config: &SimulationConfig,
) -> ThermalOutcome {
    let cells = snapshot.cell_count();
    let mut delta = vec![0.0; cells];
    let mut fission_rates: Vec<(usize, f64)> = Vec::new();
    let mut outcome = ThermalOutcome::default();

    // Generation
    for (index, cell) in snapshot.occupied() {
        let Some(source) = cell.source else {
            continue;
        };
        let (he, le) = flux.at(index);
        let (heat, fission) = rod_heat(&source, he, le, config);
        delta[index] += heat;
        outcome.heat_generated += heat;
        outcome.max_heat_output += max_heat_output(&source, config);
        fission_rates.push((index, fission));
    }

    // Diffusion, each unordered pair once
    let neighbor_counts: Vec<usize> = (0..cells).map(|i| snapshot.neighbor_count(i)).collect();
    for (a, cell_a) in snapshot.occupied() {
        for (b, cell_b) in snapshot.neighbors(a) {
            if b <= a {
                continue;
            }
            let fraction = transfer_fraction(
                cell_a.thermal_conductivity,
                cell_b.thermal_conductivity,
                neighbor_counts[a],
                neighbor_counts[b],
                config,
            );
            let flow = fraction * (cell_a.temperature - cell_b.temperature);
            delta[a] -= flow;
            delta[b] += flow;
        }
    }

    // Apply, then cool
    for (index, cell) in snapshot.occupied() {
        let mut temperature = cell.temperature + delta[index];
        if let Some(coolant) = cell.coolant {
            let excess = temperature - coolant.inlet_temperature;
            if excess > 0.0 {
                let removed = excess * coolant.heat_removal_rate.clamp(0.0, 1.0);
                temperature -= removed;
                outcome.heat_removed += removed;
            }
        }
        if let Some(component) = grid.component_at_index_mut(index) {
            component.temperature = temperature;
        }
    }

    for (index, fission) in fission_rates {
        if let Some(rod) = grid
            .component_at_index_mut(index)
            .and_then(|c| c.fuel_rod_state_mut())
        {
            rod.last_fission_rate = fission;
        }
    }

    tracing::trace!(
        "Thermal: generated {:.3}, removed {:.3}",
        outcome.heat_generated,
        outcome.heat_removed
    );
    outcome
}
