//! Reactor components: the tagged component variant, fuel and neutron profiles

pub mod component;
pub mod fuel;
pub mod profile;

pub use component::{
    resolve_initial_temperature, ComponentKind, ComponentKindTag, CoolantState, FuelRodState,
    ReactorComponent, DEFAULT_AMBIENT,
};
pub use fuel::{CrossSections, FuelArena, FuelId, NuclearFuel};
pub use profile::NeutronProfile;
