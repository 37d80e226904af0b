//! Simulation configuration with documented constants
//!
//! All tunable numbers of the reactor model are collected here with notes on
//! how they interact. They are gameplay balance values, not physical data.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ReactorError, Result};
use crate::core::types::Kelvin;

/// Configuration for one reactor's simulation pipeline
///
/// Every field has a default, so a TOML file only needs to list the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === THERMAL BASELINE ===
    /// Temperature of freshly placed components and default coolant inlet
    pub ambient_temperature: Kelvin,

    // === NEUTRON FLUX ===
    /// Maximum number of hops a neutron packet travels from its source
    ///
    /// Bounds the breadth-first pass to O(sources * radius^3) cells. Values
    /// larger than the grid span are clamped to it.
    pub max_flux_radius: u32,

    /// Multiplier applied to a packet on every hop before the cell's own
    /// interaction profile
    ///
    /// Stands in for geometric spreading; at 0.5 a packet two cells out has
    /// lost three quarters of its strength even through empty space.
    pub geometric_falloff: f64,

    /// Packets weaker than this (he + le) stop spreading
    pub flux_cutoff: f64,

    /// Per-group ceiling on the accumulated flux at any cell
    ///
    /// Together with `max_source_emission` this bounds heat output, so a
    /// pathological layout cannot amplify without limit.
    pub max_cell_flux: f64,

    /// Ceiling on a single rod's emission after chain-reaction feedback
    pub max_source_emission: f64,

    /// Weight of last tick's fission rate in a rod's emission
    ///
    /// An isolated rod with HE fission factor f settles at an emission of
    /// intensity / (1 - gain * f). Keep gain * f below 1 for stable rods.
    pub chain_reaction_gain: f64,

    // === HEAT ===
    /// Temperature rise per unit fission rate (K per tick)
    pub fission_heat: f64,

    /// Temperature rise per unit capture rate (K per tick)
    pub capture_heat: f64,

    /// Fraction of a temperature difference moved per unit conductivity
    pub diffusion_rate: f64,

    /// Upper bound on the transfer fraction of any pair of cells
    ///
    /// At 0.5 two equal cells meet in the middle in one tick and never swap
    /// places, which keeps diffusion free of oscillation.
    pub max_transfer_fraction: f64,

    // === FUEL ===
    /// Cross-section decay per unit flux exposure per tick
    ///
    /// At 1e-4 a rod sitting in a flux of 3.3 loses about 3% of its
    /// cross-sections every 100 ticks.
    pub burnup_rate: f64,

    /// Fuel is spent once both fission factors drop below this
    pub spent_fuel_threshold: f64,

    // === FAILURE ===
    /// Fraction of max temperature above which a component is overheating
    pub overheating_ratio: f64,

    /// Consecutive ticks above max temperature before meltdown
    pub meltdown_ticks: u32,

    /// Fraction of the total emission ceiling at which the reactor is
    /// considered to be in runaway
    pub runaway_emission_ratio: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ambient_temperature: 298.0,

            // Flux
            max_flux_radius: 4,
            geometric_falloff: 0.5,
            flux_cutoff: 1e-6,
            max_cell_flux: 64.0,
            max_source_emission: 32.0,
            chain_reaction_gain: 0.5,

            // Heat
            fission_heat: 10.0,
            capture_heat: 2.0,
            diffusion_rate: 0.1,
            max_transfer_fraction: 0.5,

            // Fuel
            burnup_rate: 1e-4,
            spent_fuel_threshold: 0.01,

            // Failure
            overheating_ratio: 0.8,
            meltdown_ticks: 20,
            runaway_emission_ratio: 0.95,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate().map_err(ReactorError::InvalidConfig)?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.ambient_temperature.is_finite() && self.ambient_temperature > 0.0) {
            return Err(format!(
                "ambient_temperature ({}) must be a positive temperature",
                self.ambient_temperature
            ));
        }

        if !(0.0..=1.0).contains(&self.geometric_falloff) {
            return Err(format!(
                "geometric_falloff ({}) must lie in [0, 1]",
                self.geometric_falloff
            ));
        }

        if self.max_cell_flux <= 0.0 || self.max_source_emission <= 0.0 {
            return Err("Flux ceilings must be positive".into());
        }

        if self.chain_reaction_gain < 0.0 {
            return Err("chain_reaction_gain must not be negative".into());
        }

        if self.fission_heat < 0.0 || self.capture_heat < 0.0 {
            return Err("Heat factors must not be negative".into());
        }

        // Anything above 0.5 lets a pair overshoot equilibrium
        if !(0.0..=0.5).contains(&self.max_transfer_fraction) {
            return Err(format!(
                "max_transfer_fraction ({}) must lie in [0, 0.5]",
                self.max_transfer_fraction
            ));
        }

        if self.diffusion_rate < 0.0 || self.burnup_rate < 0.0 {
            return Err("Rates must not be negative".into());
        }

        if !(0.0..1.0).contains(&self.overheating_ratio) {
            return Err(format!(
                "overheating_ratio ({}) must lie in [0, 1)",
                self.overheating_ratio
            ));
        }

        if self.meltdown_ticks == 0 {
            return Err("meltdown_ticks must be at least 1".into());
        }

        Ok(())
    }
}
