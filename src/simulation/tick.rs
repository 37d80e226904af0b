//! Tick system - runs the reactor pipeline once
//!
//! This is the strict pipeline that ties the stages together:
//! snapshot -> flux -> thermal -> depletion -> failure -> report
//!
//! Each stage reads the previous stage's output and the frozen snapshot, so
//! there is no feedback inside a tick. Feedback between ticks flows through the
//! state the stages write: temperatures, fuel and each rod's fission rate.

use crate::core::config::SimulationConfig;
use crate::core::types::Tick;
use crate::simulation::depletion::apply_depletion;
use crate::simulation::failure::{detect_runaway, evaluate_failures, FailureState};
use crate::simulation::flux::propagate_flux;
use crate::simulation::report::{SimulationEvent, TemperatureDelta, TickReport};
use crate::simulation::thermal::apply_thermal;
use crate::spatial::ReactorGrid;

/// Run a single simulation tick
///
/// 1. Freeze the grid into a snapshot
/// 2. Propagate neutron flux from every live fuel rod
/// 3. Generate heat, diffuse it and let coolant carry some away
/// 4. Burn fuel and wear components in proportion to their flux
/// 5. Advance every component's failure state machine
///
/// Returns the temperature changes and events of this tick for the host.
/// A report with `faulted` set means the grid holds non-finite temperatures
/// and should not be ticked again.
pub fn run_tick(grid: &mut ReactorGrid, config: &SimulationConfig, tick: Tick) -> TickReport {
    let snapshot = grid.snapshot();

    let flux = propagate_flux(&snapshot, config);
    let thermal = apply_thermal(grid, &snapshot, &flux.field, config);
    let depletion = apply_depletion(grid, &snapshot, &flux.field, config);
    let transitions = evaluate_failures(grid, config);

    let mut events = Vec::new();

    for exhaustion in depletion.exhausted {
        events.push(SimulationEvent::FuelExhausted {
            component: exhaustion.component,
            coord: exhaustion.coord,
            fuel: exhaustion.fuel,
        });
    }

    for (component, coord) in depletion.worn_out {
        events.push(SimulationEvent::ComponentWornOut { component, coord });
    }

    for t in transitions {
        if t.to == FailureState::Meltdown {
            tracing::info!(
                "Meltdown: component {:?} at {} reached {:.1} K",
                t.component,
                t.coord,
                t.temperature
            );
            events.push(SimulationEvent::Meltdown {
                component: t.component,
                coord: t.coord,
                temperature: t.temperature,
            });
        } else {
            events.push(SimulationEvent::FailureTransition {
                component: t.component,
                coord: t.coord,
                from: t.from,
                to: t.to,
                temperature: t.temperature,
            });
        }
    }

    let dimensions = snapshot.dimensions();
    let temperature_deltas: Vec<TemperatureDelta> = snapshot
        .occupied()
        .filter_map(|(index, cell)| {
            let coord = dimensions.coord_of(index);
            grid.get(coord).map(|c| TemperatureDelta {
                component: cell.id,
                coord,
                before: cell.temperature,
                after: c.temperature,
            })
        })
        .collect();

    let faulted = temperature_deltas.iter().any(|d| !d.after.is_finite());
    if faulted {
        tracing::warn!("Reactor state became non-finite at tick {}", tick);
        events.push(SimulationEvent::ReactorFaulted {
            reason: format!("non-finite temperature at tick {}", tick),
        });
    }

    let runaway = detect_runaway(&flux);

    tracing::debug!(
        "Tick {}: {} sources, emission {:.3}, heat +{:.3}/-{:.3}, {} events",
        tick,
        flux.source_count,
        flux.total_emission,
        thermal.heat_generated,
        thermal.heat_removed,
        events.len()
    );

    TickReport {
        tick,
        temperature_deltas,
        events,
        flux: flux.field,
        heat_generated: thermal.heat_generated,
        heat_removed: thermal.heat_removed,
        max_heat_output: thermal.max_heat_output,
        total_emission: flux.total_emission,
        source_count: flux.source_count,
        runaway,
        faulted,
    }
}
