//! Host-supplied reactor layouts
//!
//! A layout is the coordinate -> component mapping the host reads from its
//! block arrangement, plus a table of named fuels. It is plain data and loads
//! from TOML or JSON:
//!
//! ```toml
//! dimensions = { width = 3, height = 3, depth = 3 }
//!
//! [fuels.uranium]
//! cross_sections = [0.8, 0.6, 0.1, 0.1]
//!
//! [[components]]
//! position = [1, 1, 1]
//! kind = "fuel_rod"
//! fuel = "uranium"
//! neutron_source_intensity = 2.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::{ComponentKindTag, CrossSections, NeutronProfile};
use crate::core::error::Result;
use crate::core::types::{GridCoord, GridDimensions, Kelvin};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelSpec {
    /// `[HE_fission, LE_fission, HE_capture, LE_capture]`
    pub cross_sections: [f64; 4],
}

impl FuelSpec {
    pub fn cross_sections(&self) -> CrossSections {
        CrossSections::from_vector(self.cross_sections)
    }
}

/// One placed component. Fields that do not apply to `kind` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub position: [i32; 3],
    pub kind: ComponentKindTag,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temperature: Option<Kelvin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal_conductivity: Option<f64>,
    /// Start temperature; the config's ambient temperature when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_temperature: Option<Kelvin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<u32>,
    /// Override of the kind's default neutron profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutron_profile: Option<NeutronProfile>,

    // Fuel rods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutron_source_intensity: Option<f64>,

    // Coolant channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inlet_temperature: Option<Kelvin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_removal_rate: Option<f64>,
}

impl ComponentSpec {
    fn new(position: GridCoord, kind: ComponentKindTag) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            kind,
            max_temperature: None,
            thermal_conductivity: None,
            initial_temperature: None,
            durability: None,
            neutron_profile: None,
            fuel: None,
            neutron_source_intensity: None,
            inlet_temperature: None,
            heat_removal_rate: None,
        }
    }

    pub fn fuel_rod(position: GridCoord, fuel: impl Into<String>, intensity: f64) -> Self {
        Self {
            fuel: Some(fuel.into()),
            neutron_source_intensity: Some(intensity),
            ..Self::new(position, ComponentKindTag::FuelRod)
        }
    }

    pub fn moderator(position: GridCoord) -> Self {
        Self::new(position, ComponentKindTag::Moderator)
    }

    pub fn reflector(position: GridCoord) -> Self {
        Self::new(position, ComponentKindTag::Reflector)
    }

    pub fn coolant_channel(position: GridCoord) -> Self {
        Self::new(position, ComponentKindTag::CoolantChannel)
    }

    pub fn structural(position: GridCoord) -> Self {
        Self::new(position, ComponentKindTag::Structural)
    }

    pub fn with_max_temperature(mut self, max_temperature: Kelvin) -> Self {
        self.max_temperature = Some(max_temperature);
        self
    }

    pub fn with_conductivity(mut self, conductivity: f64) -> Self {
        self.thermal_conductivity = Some(conductivity);
        self
    }

    pub fn with_initial_temperature(mut self, temperature: Kelvin) -> Self {
        self.initial_temperature = Some(temperature);
        self
    }

    pub fn with_durability(mut self, durability: u32) -> Self {
        self.durability = Some(durability);
        self
    }

    pub fn with_heat_removal_rate(mut self, rate: f64) -> Self {
        self.heat_removal_rate = Some(rate);
        self
    }

    pub fn coord(&self) -> GridCoord {
        GridCoord::from(self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorLayout {
    pub dimensions: GridDimensions,
    #[serde(default)]
    pub fuels: BTreeMap<String, FuelSpec>,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

impl ReactorLayout {
    pub fn new(dimensions: GridDimensions) -> Self {
        Self {
            dimensions,
            fuels: BTreeMap::new(),
            components: Vec::new(),
        }
    }

    pub fn with_fuel(mut self, name: impl Into<String>, cross_sections: [f64; 4]) -> Self {
        self.fuels.insert(name.into(), FuelSpec { cross_sections });
        self
    }

    pub fn with_component(mut self, component: ComponentSpec) -> Self {
        self.components.push(component);
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a layout file; `.json` is read as JSON, anything else as TOML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }
}
