//! Reactor - one independent reactor instance as the host sees it
//!
//! Wraps a grid with its configuration and tick counter. Reactors share no
//! state, so a host with many of them can tick them in parallel with
//! [`tick_reactors`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::NuclearFuel;
use crate::core::config::SimulationConfig;
use crate::core::error::{ReactorError, Result};
use crate::core::types::{ComponentId, ReactorId, Tick};
use crate::layout::{build_grid, ReactorLayout};
use crate::simulation::report::{SimulationEvent, TickReport};
use crate::simulation::tick::run_tick;
use crate::spatial::ReactorGrid;

/// Report slots reserved up front by [`Reactor::run`]
const RUN_PREALLOCATION: u64 = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reactor {
    id: ReactorId,
    grid: ReactorGrid,
    config: SimulationConfig,
    current_tick: Tick,
    /// Set once the state went non-finite; a faulted reactor no longer ticks
    #[serde(default)]
    faulted: bool,
    /// Whether the last tick was a runaway, for edge-triggered events
    #[serde(default)]
    runaway: bool,
}

impl Reactor {
    pub fn new(grid: ReactorGrid, config: SimulationConfig) -> Result<Self> {
        config.validate().map_err(ReactorError::InvalidConfig)?;
        Ok(Self {
            id: ReactorId::new(),
            grid,
            config,
            current_tick: 0,
            faulted: false,
            runaway: false,
        })
    }

    pub fn from_layout(layout: &ReactorLayout, config: SimulationConfig) -> Result<Self> {
        config.validate().map_err(ReactorError::InvalidConfig)?;
        let grid = build_grid(layout, &config)?;
        Self::new(grid, config)
    }

    pub fn id(&self) -> ReactorId {
        self.id
    }

    pub fn grid(&self) -> &ReactorGrid {
        &self.grid
    }

    /// Mutable access for host edits between ticks (placing, removing)
    pub fn grid_mut(&mut self) -> &mut ReactorGrid {
        &mut self.grid
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn is_runaway(&self) -> bool {
        self.runaway
    }

    /// Advance the reactor by one tick
    pub fn tick(&mut self) -> TickReport {
        let tick = self.current_tick;
        if self.faulted {
            tracing::trace!("Reactor {:?} is faulted, skipping tick {}", self.id, tick);
            return TickReport::skipped(tick, true);
        }

        let mut report = run_tick(&mut self.grid, &self.config, tick);

        if report.runaway && !self.runaway {
            tracing::warn!(
                "Reactor {:?} entered runaway at tick {} (emission {:.2})",
                self.id,
                tick,
                report.total_emission
            );
            report.events.push(SimulationEvent::RunawayDetected {
                total_emission: report.total_emission,
                sources: report.source_count,
            });
        }
        self.runaway = report.runaway;
        self.faulted = report.faulted;
        self.current_tick += 1;
        report
    }

    /// Run `ticks` ticks, stopping early if the reactor faults
    pub fn run(&mut self, ticks: u64) -> Vec<TickReport> {
        let mut reports = Vec::with_capacity(ticks.min(RUN_PREALLOCATION) as usize);
        for _ in 0..ticks {
            let report = self.tick();
            let faulted = report.faulted;
            reports.push(report);
            if faulted {
                break;
            }
        }
        reports
    }

    /// Refuel a rod in place
    pub fn replace_fuel(&mut self, rod: ComponentId, fuel: NuclearFuel) -> Result<()> {
        self.grid.replace_fuel(rod, fuel)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a saved reactor
    ///
    /// Malformed grids (bad dimensions, a fuel arena that disagrees with its
    /// rods) fail here as [`ReactorError::SerdeError`].
    pub fn from_json(content: &str) -> Result<Self> {
        let reactor: Self = serde_json::from_str(content)?;
        reactor
            .config
            .validate()
            .map_err(ReactorError::InvalidConfig)?;
        Ok(reactor)
    }
}

/// Tick every reactor once, in parallel
///
/// Reports come back in the same order as `reactors`.
pub fn tick_reactors(reactors: &mut [Reactor]) -> Vec<TickReport> {
    reactors.par_iter_mut().map(Reactor::tick).collect()
}
