//! Reactor component data model
//!
//! A component is one occupied grid cell. All kinds share the thermal and
//! failure fields; the kind-specific payload lives in [`ComponentKind`].

use serde::{Deserialize, Serialize};

use super::fuel::FuelId;
use super::profile::NeutronProfile;
use crate::core::types::{ComponentId, Kelvin};
use crate::simulation::failure::FailureStatus;

/// Baseline temperature of a component that was not given one
pub const DEFAULT_AMBIENT: Kelvin = 298.0;

/// Fuel rod payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelRodState {
    pub fuel: FuelId,
    /// Baseline neutron emission, present even without chain reaction
    pub neutron_source_intensity: f64,
    /// Fission rate of the previous tick, fed back into emission
    #[serde(default)]
    pub last_fission_rate: f64,
}

/// Coolant channel payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoolantState {
    /// Temperature of the coolant entering the channel
    pub inlet_temperature: Kelvin,
    /// Fraction of the excess over inlet temperature carried away per tick
    pub heat_removal_rate: f64,
}

impl Default for CoolantState {
    fn default() -> Self {
        Self {
            inlet_temperature: DEFAULT_AMBIENT,
            heat_removal_rate: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentKind {
    FuelRod(FuelRodState),
    Moderator,
    Reflector,
    CoolantChannel(CoolantState),
    Structural,
}

/// Payload-free discriminant of [`ComponentKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKindTag {
    FuelRod,
    Moderator,
    Reflector,
    CoolantChannel,
    Structural,
}

impl ComponentKindTag {
    pub const ALL: [ComponentKindTag; 5] = [
        Self::FuelRod,
        Self::Moderator,
        Self::Reflector,
        Self::CoolantChannel,
        Self::Structural,
    ];

    /// Kelvin ceiling used when a layout omits one
    pub fn default_max_temperature(&self) -> Kelvin {
        match self {
            Self::FuelRod => 1200.0,
            Self::Moderator => 2000.0,
            Self::Reflector => 1800.0,
            Self::CoolantChannel => 600.0,
            Self::Structural => 1500.0,
        }
    }

    pub fn default_conductivity(&self) -> f64 {
        match self {
            Self::FuelRod => 5.0,
            Self::Moderator => 8.0,
            Self::Reflector => 4.0,
            Self::CoolantChannel => 10.0,
            Self::Structural => 2.0,
        }
    }
}

impl ComponentKind {
    pub fn tag(&self) -> ComponentKindTag {
        match self {
            Self::FuelRod(_) => ComponentKindTag::FuelRod,
            Self::Moderator => ComponentKindTag::Moderator,
            Self::Reflector => ComponentKindTag::Reflector,
            Self::CoolantChannel(_) => ComponentKindTag::CoolantChannel,
            Self::Structural => ComponentKindTag::Structural,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorComponent {
    /// Assigned by the grid on placement
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub max_temperature: Kelvin,
    pub temperature: Kelvin,
    /// Temperature the component starts at and returns to when copied
    pub baseline_temperature: Kelvin,
    pub thermal_conductivity: f64,
    /// Remaining wear in flux-exposed ticks; 0 means wear is not tracked
    #[serde(default)]
    pub durability: u32,
    pub neutron_profile: NeutronProfile,
    #[serde(default)]
    pub failure: FailureStatus,
}

impl ReactorComponent {
    pub const UNPLACED: ComponentId = ComponentId(u32::MAX);

    fn with_kind(kind: ComponentKind, max_temperature: Kelvin, thermal_conductivity: f64) -> Self {
        let neutron_profile = NeutronProfile::for_kind(kind.tag());
        Self {
            id: Self::UNPLACED,
            kind,
            max_temperature,
            temperature: DEFAULT_AMBIENT,
            baseline_temperature: DEFAULT_AMBIENT,
            thermal_conductivity,
            durability: 0,
            neutron_profile,
            failure: FailureStatus::default(),
        }
    }

    pub fn fuel_rod(
        max_temperature: Kelvin,
        thermal_conductivity: f64,
        fuel: FuelId,
        neutron_source_intensity: f64,
    ) -> Self {
        Self::with_kind(
            ComponentKind::FuelRod(FuelRodState {
                fuel,
                neutron_source_intensity,
                last_fission_rate: 0.0,
            }),
            max_temperature,
            thermal_conductivity,
        )
    }

    pub fn moderator(max_temperature: Kelvin, thermal_conductivity: f64) -> Self {
        Self::with_kind(ComponentKind::Moderator, max_temperature, thermal_conductivity)
    }

    pub fn reflector(max_temperature: Kelvin, thermal_conductivity: f64) -> Self {
        Self::with_kind(ComponentKind::Reflector, max_temperature, thermal_conductivity)
    }

    pub fn coolant_channel(
        max_temperature: Kelvin,
        thermal_conductivity: f64,
        coolant: CoolantState,
    ) -> Self {
        Self::with_kind(
            ComponentKind::CoolantChannel(coolant),
            max_temperature,
            thermal_conductivity,
        )
    }

    pub fn structural(max_temperature: Kelvin, thermal_conductivity: f64) -> Self {
        Self::with_kind(ComponentKind::Structural, max_temperature, thermal_conductivity)
    }

    /// Set both the current and the baseline temperature
    pub fn with_initial_temperature(mut self, temperature: Kelvin) -> Self {
        self.temperature = temperature;
        self.baseline_temperature = temperature;
        self
    }

    pub fn with_durability(mut self, durability: u32) -> Self {
        self.durability = durability;
        self
    }

    pub fn with_neutron_profile(mut self, profile: NeutronProfile) -> Self {
        self.neutron_profile = profile;
        self
    }

    /// Whether the component is a neutron source
    pub fn is_active(&self) -> bool {
        matches!(self.kind, ComponentKind::FuelRod(_))
    }

    pub fn fuel_rod_state(&self) -> Option<&FuelRodState> {
        match &self.kind {
            ComponentKind::FuelRod(rod) => Some(rod),
            _ => None,
        }
    }

    pub fn fuel_rod_state_mut(&mut self) -> Option<&mut FuelRodState> {
        match &mut self.kind {
            ComponentKind::FuelRod(rod) => Some(rod),
            _ => None,
        }
    }

    pub fn fuel_id(&self) -> Option<FuelId> {
        self.fuel_rod_state().map(|rod| rod.fuel)
    }

    /// Duplicate the static parameters with fresh mutable state
    ///
    /// The fuel reference is shared with the original; the grid takes its own
    /// reference when the copy is placed.
    pub fn copy(&self) -> Self {
        let mut copy = self.clone();
        copy.id = Self::UNPLACED;
        copy.temperature = copy.baseline_temperature;
        copy.failure = FailureStatus::default();
        if let ComponentKind::FuelRod(rod) = &mut copy.kind {
            rod.last_fission_rate = 0.0;
        }
        copy
    }
}

/// Resolve an optional configured start temperature to a concrete one
pub fn resolve_initial_temperature(explicit: Option<Kelvin>, ambient: Kelvin) -> Kelvin {
    explicit.unwrap_or(ambient)
}
