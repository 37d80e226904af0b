//! Turn a [`ReactorLayout`] into a live [`ReactorGrid`]

use ahash::AHashMap;

use super::spec::{ComponentSpec, ReactorLayout};
use crate::components::{
    resolve_initial_temperature, ComponentKindTag, CoolantState, FuelId, NuclearFuel,
    ReactorComponent,
};
use crate::core::config::SimulationConfig;
use crate::core::error::{ReactorError, Result};
use crate::spatial::ReactorGrid;

/// Build a grid from a host layout
///
/// Placement is strict: two components on one coordinate is a malformed
/// layout. Rods naming the same fuel share one arena entry until their burnup
/// diverges.
pub fn build_grid(layout: &ReactorLayout, config: &SimulationConfig) -> Result<ReactorGrid> {
    let mut grid = ReactorGrid::try_new(layout.dimensions)?;

    let mut fuel_ids: AHashMap<&str, FuelId> = AHashMap::new();
    for (name, spec) in &layout.fuels {
        let id = grid.add_fuel(NuclearFuel::new(name.clone(), spec.cross_sections()))?;
        fuel_ids.insert(name.as_str(), id);
    }

    for spec in &layout.components {
        let component = component_from_spec(spec, &fuel_ids, config)?;
        grid.place_strict(spec.coord(), component)?;
    }

    // Drop the template references; rods now hold their own
    for (_, id) in fuel_ids {
        grid.release_fuel(id);
    }

    tracing::debug!("Built {} grid with {} components", layout.dimensions, grid.len());
    Ok(grid)
}

fn component_from_spec(
    spec: &ComponentSpec,
    fuel_ids: &AHashMap<&str, FuelId>,
    config: &SimulationConfig,
) -> Result<ReactorComponent> {
    let coord = spec.coord();
    let invalid = |reason: String| ReactorError::InvalidPlacement { coord, reason };

    let max_temperature = spec
        .max_temperature
        .unwrap_or_else(|| spec.kind.default_max_temperature());
    let conductivity = spec
        .thermal_conductivity
        .unwrap_or_else(|| spec.kind.default_conductivity());

    if !(max_temperature.is_finite() && max_temperature > 0.0) {
        return Err(invalid(format!("max temperature {} must be positive", max_temperature)));
    }
    if !(conductivity.is_finite() && conductivity >= 0.0) {
        return Err(invalid(format!("conductivity {} must not be negative", conductivity)));
    }

    let component = match spec.kind {
        ComponentKindTag::FuelRod => {
            let name = spec
                .fuel
                .as_deref()
                .ok_or_else(|| invalid("fuel rod without fuel".into()))?;
            let fuel = *fuel_ids
                .get(name)
                .ok_or_else(|| invalid(format!("unknown fuel '{}'", name)))?;
            let intensity = spec.neutron_source_intensity.unwrap_or(1.0);
            if !(intensity.is_finite() && intensity >= 0.0) {
                return Err(invalid(format!("source intensity {} must not be negative", intensity)));
            }
            ReactorComponent::fuel_rod(max_temperature, conductivity, fuel, intensity)
        }
        ComponentKindTag::Moderator => ReactorComponent::moderator(max_temperature, conductivity),
        ComponentKindTag::Reflector => ReactorComponent::reflector(max_temperature, conductivity),
        ComponentKindTag::CoolantChannel => {
            let defaults = CoolantState {
                inlet_temperature: config.ambient_temperature,
                ..CoolantState::default()
            };
            let coolant = CoolantState {
                inlet_temperature: spec.inlet_temperature.unwrap_or(defaults.inlet_temperature),
                heat_removal_rate: spec.heat_removal_rate.unwrap_or(defaults.heat_removal_rate),
            };
            if !(0.0..=1.0).contains(&coolant.heat_removal_rate) {
                return Err(invalid(format!(
                    "heat removal rate {} must lie in [0, 1]",
                    coolant.heat_removal_rate
                )));
            }
            ReactorComponent::coolant_channel(max_temperature, conductivity, coolant)
        }
        ComponentKindTag::Structural => ReactorComponent::structural(max_temperature, conductivity),
    };

    let mut component = component.with_initial_temperature(resolve_initial_temperature(
        spec.initial_temperature,
        config.ambient_temperature,
    ));
    if let Some(durability) = spec.durability {
        component = component.with_durability(durability);
    }
    if let Some(profile) = spec.neutron_profile {
        component = component.with_neutron_profile(profile);
    }
    Ok(component)
}
