//! Neutron flux propagation
//!
//! Every fuel rod with live fuel is a source. Its packet spreads
//! breadth-first through the grid, losing strength on every hop and being
//! reshaped by the profile of each cell it enters. Contributions from all
//! sources are summed per cell in ascending source order, then clamped.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::components::NeutronProfile;
use crate::core::config::SimulationConfig;
use crate::core::error::{ReactorError, Result};
use crate::core::types::GridDimensions;
use crate::spatial::snapshot::{CellView, GridSnapshot};

/// Two-group flux per cell, indexed like the grid storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxField {
    pub he: Vec<f64>,
    pub le: Vec<f64>,
}

impl FluxField {
    pub fn zeros(cells: usize) -> Self {
        Self {
            he: vec![0.0; cells],
            le: vec![0.0; cells],
        }
    }

    #[inline]
    pub fn at(&self, index: usize) -> (f64, f64) {
        (self.he[index], self.le[index])
    }

    #[inline]
    pub fn total_at(&self, index: usize) -> f64 {
        self.he[index] + self.le[index]
    }

    /// Sum over every cell and both groups
    pub fn total(&self) -> f64 {
        self.he.iter().sum::<f64>() + self.le.iter().sum::<f64>()
    }

    pub fn is_zero(&self) -> bool {
        self.he.iter().chain(self.le.iter()).all(|&v| v == 0.0)
    }

    fn add(&mut self, index: usize, he: f64, le: f64) {
        self.he[index] += he;
        self.le[index] += le;
    }

    fn clamp(&mut self, ceiling: f64) {
        for v in self.he.iter_mut().chain(self.le.iter_mut()) {
            *v = v.clamp(0.0, ceiling);
        }
    }
}

/// Result of the flux stage
#[derive(Debug, Clone)]
pub struct FluxOutcome {
    pub field: FluxField,
    /// Emission of every live source after feedback and clamping
    pub total_emission: f64,
    pub source_count: usize,
    /// Sources whose emission sits at the runaway threshold
    pub saturated_sources: usize,
}

/// Propagation radius that fits the grid
///
/// Errors when the requested radius exceeds the longest path in the grid;
/// callers clamp to the reported limit.
pub fn check_radius(requested: u32, dimensions: GridDimensions) -> Result<u32> {
    let limit = dimensions.max_span();
    if requested > limit {
        return Err(ReactorError::GridBoundsExceeded { requested, limit });
    }
    Ok(requested)
}

/// Emission of a fuel rod this tick, including chain-reaction feedback
pub fn source_emission(cell: &CellView, config: &SimulationConfig) -> Result<f64> {
    let source = match cell.source {
        Some(source) if !source.spent => source,
        _ => return Err(ReactorError::DepletedFuelOperation(cell.id)),
    };
    let raw = source.neutron_source_intensity + config.chain_reaction_gain * source.last_fission_rate;
    Ok(raw.clamp(0.0, config.max_source_emission))
}

pub fn propagate_flux(snapshot: &GridSnapshot, config: &SimulationConfig) -> FluxOutcome {
    let dimensions = snapshot.dimensions();
    let radius = match check_radius(config.max_flux_radius, dimensions) {
        Ok(radius) => radius,
        Err(ReactorError::GridBoundsExceeded { limit, .. }) => {
            tracing::debug!(
                "Flux radius {} clamped to grid span {}",
                config.max_flux_radius,
                limit
            );
            limit
        }
        Err(_) => dimensions.max_span(),
    };

    let mut field = FluxField::zeros(snapshot.cell_count());
    let mut spreader = Spreader::new(snapshot.cell_count());
    let saturation = config.runaway_emission_ratio * config.max_source_emission;

    let mut total_emission = 0.0;
    let mut source_count = 0;
    let mut saturated_sources = 0;

    // occupied() walks ascending coordinates, which fixes summation order
    for (index, cell) in snapshot.occupied() {
        if cell.source.is_none() {
            continue;
        }
        let emission = match source_emission(cell, config) {
            Ok(emission) => emission,
            Err(e) => {
                tracing::trace!("{}; contributing no flux", e);
                continue;
            }
        };

        source_count += 1;
        total_emission += emission;
        if emission >= saturation {
            saturated_sources += 1;
        }
        if emission > 0.0 {
            spreader.spread(snapshot, index, emission, radius, config, &mut field);
        }
    }

    field.clamp(config.max_cell_flux);

    FluxOutcome {
        field,
        total_emission,
        source_count,
        saturated_sources,
    }
}

/// Reusable breadth-first state; `stamp` avoids clearing `visited` per source
struct Spreader {
    visited: Vec<u32>,
    stamp: u32,
    queue: VecDeque<Packet>,
}

#[derive(Debug, Clone, Copy)]
struct Packet {
    index: usize,
    hops: u32,
    he: f64,
    le: f64,
}

impl Spreader {
    fn new(cells: usize) -> Self {
        Self {
            visited: vec![0; cells],
            stamp: 0,
            queue: VecDeque::new(),
        }
    }

    fn spread(
        &mut self,
        snapshot: &GridSnapshot,
        source: usize,
        emission: f64,
        radius: u32,
        config: &SimulationConfig,
        field: &mut FluxField,
    ) {
        self.stamp += 1;
        self.queue.clear();

        // Fission neutrons are born fast
        field.add(source, emission, 0.0);
        self.visited[source] = self.stamp;
        self.queue.push_back(Packet {
            index: source,
            hops: 0,
            he: emission,
            le: 0.0,
        });

        while let Some(packet) = self.queue.pop_front() {
            if packet.hops >= radius {
                continue;
            }
            for next in snapshot.adjacent_indices(packet.index) {
                if self.visited[next] == self.stamp {
                    continue;
                }
                self.visited[next] = self.stamp;

                let in_he = packet.he * config.geometric_falloff;
                let in_le = packet.le * config.geometric_falloff;
                let profile = snapshot
                    .cell(next)
                    .map(|c| c.neutron_profile)
                    .unwrap_or(NeutronProfile::EMPTY);

                if profile.reflection > 0.0 {
                    field.add(
                        packet.index,
                        in_he * profile.reflection,
                        in_le * profile.reflection,
                    );
                }
                let kept = 1.0 - profile.reflection;
                let (he, le) = profile.transmit(in_he * kept, in_le * kept);
                field.add(next, he, le);

                if he + le > config.flux_cutoff {
                    self.queue.push_back(Packet {
                        index: next,
                        hops: packet.hops + 1,
                        he,
                        le,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CrossSections, NuclearFuel, ReactorComponent};
    use crate::core::types::GridCoord;
    use crate::spatial::ReactorGrid;

    fn grid_with_rod(side: u32, at: GridCoord) -> ReactorGrid {
        let mut grid = ReactorGrid::new(GridDimensions::cube(side));
        let fuel = grid
            .add_fuel(NuclearFuel::new(
                "uranium",
                CrossSections::new(0.8, 0.6, 0.1, 0.1),
            ))
            .unwrap();
        grid.place(at, ReactorComponent::fuel_rod(1200.0, 5.0, fuel, 2.0))
            .unwrap();
        grid.release_fuel(fuel);
        grid
    }

    #[test]
    fn test_no_sources_no_flux() {
        let mut grid = ReactorGrid::new(GridDimensions::cube(3));
        grid.place(GridCoord::new(1, 1, 1), ReactorComponent::moderator(2000.0, 8.0))
            .unwrap();
        let outcome = propagate_flux(&grid.snapshot(), &SimulationConfig::default());
        assert!(outcome.field.is_zero());
        assert_eq!(outcome.source_count, 0);
    }

    #[test]
    fn test_isolated_source_cell_gets_its_emission() {
        let at = GridCoord::new(1, 1, 1);
        let grid = grid_with_rod(3, at);
        let snapshot = grid.snapshot();
        let outcome = propagate_flux(&snapshot, &SimulationConfig::default());
        let idx = snapshot.dimensions().index_of(at).unwrap();
        assert_eq!(outcome.field.at(idx), (2.0, 0.0));
        assert_eq!(outcome.total_emission, 2.0);
    }

    #[test]
    fn test_flux_decreases_with_distance() {
        let grid = grid_with_rod(5, GridCoord::new(0, 2, 2));
        let snapshot = grid.snapshot();
        let outcome = propagate_flux(&snapshot, &SimulationConfig::default());
        let dims = snapshot.dimensions();
        let mut last = f64::INFINITY;
        for x in 0..5 {
            let flux = outcome
                .field
                .total_at(dims.index_of(GridCoord::new(x, 2, 2)).unwrap());
            assert!(flux < last, "flux should fall off along the axis");
            last = flux;
        }
    }

    #[test]
    fn test_radius_bounds_propagation() {
        let config = SimulationConfig {
            max_flux_radius: 1,
            ..Default::default()
        };
        let grid = grid_with_rod(5, GridCoord::new(0, 0, 0));
        let snapshot = grid.snapshot();
        let outcome = propagate_flux(&snapshot, &config);
        let dims = snapshot.dimensions();
        assert!(outcome.field.total_at(dims.index_of(GridCoord::new(1, 0, 0)).unwrap()) > 0.0);
        assert_eq!(
            outcome.field.total_at(dims.index_of(GridCoord::new(2, 0, 0)).unwrap()),
            0.0
        );
    }

    #[test]
    fn test_moderator_produces_low_energy_flux() {
        let mut grid = grid_with_rod(3, GridCoord::new(0, 1, 1));
        let moderator_at = GridCoord::new(1, 1, 1);
        grid.place(moderator_at, ReactorComponent::moderator(2000.0, 8.0))
            .unwrap();
        let snapshot = grid.snapshot();
        let outcome = propagate_flux(&snapshot, &SimulationConfig::default());
        let (_, le) = outcome
            .field
            .at(snapshot.dimensions().index_of(moderator_at).unwrap());
        assert!(le > 0.0);
    }

    #[test]
    fn test_reflector_returns_flux_to_source() {
        let source_at = GridCoord::new(0, 1, 1);
        let bare = grid_with_rod(3, source_at);
        let mut reflected = grid_with_rod(3, source_at);
        reflected
            .place(GridCoord::new(1, 1, 1), ReactorComponent::reflector(1800.0, 4.0))
            .unwrap();

        let config = SimulationConfig::default();
        let bare_snapshot = bare.snapshot();
        let idx = bare_snapshot.dimensions().index_of(source_at).unwrap();
        let bare_flux = propagate_flux(&bare_snapshot, &config).field.total_at(idx);
        let reflected_flux = propagate_flux(&reflected.snapshot(), &config).field.total_at(idx);
        assert!(reflected_flux > bare_flux);
    }

    #[test]
    fn test_oversized_radius_is_reported_and_clamped() {
        let err = check_radius(10, GridDimensions::cube(2)).unwrap_err();
        assert!(matches!(
            err,
            ReactorError::GridBoundsExceeded { requested: 10, limit: 3 }
        ));

        let config = SimulationConfig {
            max_flux_radius: 50,
            ..Default::default()
        };
        let grid = grid_with_rod(2, GridCoord::new(0, 0, 0));
        let outcome = propagate_flux(&grid.snapshot(), &config);
        assert!(outcome.field.total() > 0.0);
    }

    #[test]
    fn test_spent_rod_is_not_a_source() {
        let at = GridCoord::new(1, 1, 1);
        let mut grid = grid_with_rod(3, at);
        let id = grid.get(at).unwrap().id;
        grid.replace_fuel(id, NuclearFuel::spent("uranium")).unwrap();
        let snapshot = grid.snapshot();
        let cell = snapshot.cell_at(at).unwrap();
        assert!(matches!(
            source_emission(cell, &SimulationConfig::default()),
            Err(ReactorError::DepletedFuelOperation(_))
        ));
        assert!(propagate_flux(&snapshot, &SimulationConfig::default())
            .field
            .is_zero());
    }

    #[test]
    fn test_emission_is_clamped() {
        let at = GridCoord::new(1, 1, 1);
        let mut grid = grid_with_rod(3, at);
        grid.get_mut(at)
            .unwrap()
            .fuel_rod_state_mut()
            .unwrap()
            .last_fission_rate = 1.0e6;
        let config = SimulationConfig::default();
        let outcome = propagate_flux(&grid.snapshot(), &config);
        assert_eq!(outcome.total_emission, config.max_source_emission);
        assert_eq!(outcome.saturated_sources, 1);
    }
}
