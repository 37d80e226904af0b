//! Tick output handed back to the host

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::types::{ComponentId, GridCoord, Kelvin, Tick};
use crate::simulation::failure::FailureState;
use crate::simulation::flux::FluxField;

/// Events generated during a simulation tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationEvent {
    /// A rod's fuel burned out and was replaced by the spent marker
    FuelExhausted {
        component: ComponentId,
        coord: GridCoord,
        fuel: String,
    },
    /// A component moved between NOMINAL, OVERHEATING and CRITICAL
    FailureTransition {
        component: ComponentId,
        coord: GridCoord,
        from: FailureState,
        to: FailureState,
        temperature: Kelvin,
    },
    /// A component stayed above its limit long enough to melt down.
    /// Reported once; the host decides what gets destroyed.
    Meltdown {
        component: ComponentId,
        coord: GridCoord,
        temperature: Kelvin,
    },
    /// A component's durability reached zero
    ComponentWornOut {
        component: ComponentId,
        coord: GridCoord,
    },
    /// Every neutron source is pinned at the emission ceiling
    RunawayDetected {
        total_emission: f64,
        sources: usize,
    },
    /// The reactor produced non-finite state and stopped simulating
    ReactorFaulted { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureDelta {
    pub component: ComponentId,
    pub coord: GridCoord,
    pub before: Kelvin,
    pub after: Kelvin,
}

impl TemperatureDelta {
    pub fn delta(&self) -> Kelvin {
        self.after - self.before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: Tick,
    /// One entry per component, ascending coordinate order
    pub temperature_deltas: Vec<TemperatureDelta>,
    pub events: Vec<SimulationEvent>,
    pub flux: FluxField,
    pub heat_generated: f64,
    pub heat_removed: f64,
    /// Upper bound on `heat_generated` for this tick's fuel state
    pub max_heat_output: f64,
    pub total_emission: f64,
    /// Rods that emitted this tick, counted before depletion
    pub source_count: usize,
    pub runaway: bool,
    pub faulted: bool,
}

impl TickReport {
    /// Report of a tick that did not run
    pub fn skipped(tick: Tick, faulted: bool) -> Self {
        Self {
            tick,
            temperature_deltas: Vec::new(),
            events: Vec::new(),
            flux: FluxField::zeros(0),
            heat_generated: 0.0,
            heat_removed: 0.0,
            max_heat_output: 0.0,
            total_emission: 0.0,
            source_count: 0,
            runaway: false,
            faulted,
        }
    }

    pub fn has_meltdown(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, SimulationEvent::Meltdown { .. }))
    }

    pub fn meltdowns(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.events.iter().filter_map(|e| match e {
            SimulationEvent::Meltdown { component, .. } => Some(*component),
            _ => None,
        })
    }

    pub fn exhausted_rods(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.events.iter().filter_map(|e| match e {
            SimulationEvent::FuelExhausted { component, .. } => Some(*component),
            _ => None,
        })
    }

    pub fn delta_for(&self, component: ComponentId) -> Option<&TemperatureDelta> {
        self.temperature_deltas
            .iter()
            .find(|d| d.component == component)
    }

    /// Net temperature change summed over all components
    pub fn total_temperature_delta(&self) -> f64 {
        self.temperature_deltas.iter().map(|d| d.delta()).sum()
    }

    /// The `n` hottest components after this tick, hottest first
    pub fn hottest(&self, n: usize) -> Vec<&TemperatureDelta> {
        let mut ranked: Vec<&TemperatureDelta> = self.temperature_deltas.iter().collect();
        ranked.sort_by_key(|d| (std::cmp::Reverse(OrderedFloat(d.after)), d.coord));
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(id: u32, x: i32, after: Kelvin) -> TemperatureDelta {
        TemperatureDelta {
            component: ComponentId(id),
            coord: GridCoord::new(x, 0, 0),
            before: 298.0,
            after,
        }
    }

    #[test]
    fn test_hottest_ranks_by_final_temperature() {
        let mut report = TickReport::skipped(0, false);
        report.temperature_deltas = vec![delta(0, 0, 400.0), delta(1, 1, 900.0), delta(2, 2, 650.0)];
        let top: Vec<ComponentId> = report.hottest(2).iter().map(|d| d.component).collect();
        assert_eq!(top, vec![ComponentId(1), ComponentId(2)]);
    }

    #[test]
    fn test_meltdown_helpers() {
        let mut report = TickReport::skipped(3, false);
        assert!(!report.has_meltdown());
        report.events.push(SimulationEvent::Meltdown {
            component: ComponentId(4),
            coord: GridCoord::new(1, 1, 1),
            temperature: 1500.0,
        });
        assert!(report.has_meltdown());
        assert_eq!(report.meltdowns().collect::<Vec<_>>(), vec![ComponentId(4)]);
    }
}
