//! Failure evaluation
//!
//! Each component runs a small state machine driven by its temperature:
//!
//! ```text
//! NOMINAL -> OVERHEATING -> CRITICAL -> MELTDOWN
//! ```
//!
//! The first three states follow the current temperature and may fall back as
//! a component cools. MELTDOWN needs `meltdown_ticks` consecutive ticks above
//! the maximum temperature and is terminal.

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{ComponentId, GridCoord, Kelvin};
use crate::simulation::flux::FluxOutcome;
use crate::spatial::ReactorGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FailureState {
    #[default]
    Nominal,
    Overheating,
    Critical,
    Meltdown,
}

impl FailureState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Meltdown)
    }
}

/// Mutable failure bookkeeping carried by every component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FailureStatus {
    pub state: FailureState,
    /// Consecutive ticks spent above max temperature
    pub over_limit_ticks: u32,
}

/// A state change of one component during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailureTransition {
    pub component: ComponentId,
    pub coord: GridCoord,
    pub from: FailureState,
    pub to: FailureState,
    pub temperature: Kelvin,
}

/// Temperature band of a component, ignoring hysteresis
pub fn classify(temperature: Kelvin, max_temperature: Kelvin, config: &SimulationConfig) -> FailureState {
    if temperature > max_temperature {
        FailureState::Critical
    } else if temperature > config.overheating_ratio * max_temperature {
        FailureState::Overheating
    } else {
        FailureState::Nominal
    }
}

impl FailureStatus {
    /// Advance one tick; returns `(from, to)` when the state changed
    pub fn evaluate(
        &mut self,
        temperature: Kelvin,
        max_temperature: Kelvin,
        config: &SimulationConfig,
    ) -> Option<(FailureState, FailureState)> {
        if self.state.is_terminal() {
            return None;
        }

        if temperature > max_temperature {
            self.over_limit_ticks += 1;
        } else {
            self.over_limit_ticks = 0;
        }

        let next = if self.over_limit_ticks >= config.meltdown_ticks {
            FailureState::Meltdown
        } else {
            classify(temperature, max_temperature, config)
        };

        if next == self.state {
            return None;
        }
        let from = self.state;
        self.state = next;
        Some((from, next))
    }
}

/// Run the state machine of every component against its final temperature
pub fn evaluate_failures(grid: &mut ReactorGrid, config: &SimulationConfig) -> Vec<FailureTransition> {
    let mut transitions = Vec::new();

    for (coord, component) in grid.iter_mut() {
        let temperature = component.temperature;
        if let Some((from, to)) =
            component
                .failure
                .evaluate(temperature, component.max_temperature, config)
        {
            transitions.push(FailureTransition {
                component: component.id,
                coord,
                from,
                to,
                temperature,
            });
        }
    }

    transitions
}

/// Whether the chain reaction has saturated the emission ceiling
///
/// Runaway means every live source is pinned at the clamp; a single hot rod in
/// a large core is a local failure, not a reactor-wide runaway.
pub fn detect_runaway(flux: &FluxOutcome) -> bool {
    flux.source_count > 0 && flux.saturated_sources == flux.source_count
}
