//! Neutron interaction profiles
//!
//! A profile describes what happens to a neutron packet entering a cell.
//! Moderation happens first (fast neutrons slowed into the low-energy group),
//! then each group is attenuated by its transmission factor. Reflection sends a
//! fraction of the incoming packet back to the cell it came from.

use serde::{Deserialize, Serialize};

use super::component::ComponentKindTag;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeutronProfile {
    /// Fraction of high-energy flux surviving the cell
    pub he_transmission: f64,
    /// Fraction of low-energy flux surviving the cell
    pub le_transmission: f64,
    /// Fraction of incoming high-energy flux thermalized into the low group
    pub moderation: f64,
    /// Fraction of the incoming packet re-emitted toward the previous cell
    pub reflection: f64,
}

impl NeutronProfile {
    /// Empty cells barely interact
    pub const EMPTY: NeutronProfile = NeutronProfile {
        he_transmission: 0.9,
        le_transmission: 0.9,
        moderation: 0.0,
        reflection: 0.0,
    };

    pub fn for_kind(kind: ComponentKindTag) -> Self {
        match kind {
            ComponentKindTag::FuelRod => Self {
                he_transmission: 0.9,
                le_transmission: 0.6,
                moderation: 0.0,
                reflection: 0.0,
            },
            // Graphite-like: strong thermalization, low absorption
            ComponentKindTag::Moderator => Self {
                he_transmission: 0.6,
                le_transmission: 0.95,
                moderation: 0.5,
                reflection: 0.0,
            },
            ComponentKindTag::Reflector => Self {
                he_transmission: 0.5,
                le_transmission: 0.5,
                moderation: 0.0,
                reflection: 0.4,
            },
            // Water: moderates some, absorbs some thermal neutrons
            ComponentKindTag::CoolantChannel => Self {
                he_transmission: 0.8,
                le_transmission: 0.75,
                moderation: 0.3,
                reflection: 0.0,
            },
            ComponentKindTag::Structural => Self {
                he_transmission: 0.85,
                le_transmission: 0.85,
                moderation: 0.0,
                reflection: 0.0,
            },
        }
    }

    /// Packet after entering the cell: (he, le)
    #[inline]
    pub fn transmit(&self, he: f64, le: f64) -> (f64, f64) {
        let thermalized = he * self.moderation;
        (
            (he - thermalized) * self.he_transmission,
            (le + thermalized) * self.le_transmission,
        )
    }

    pub fn is_valid(&self) -> bool {
        [
            self.he_transmission,
            self.le_transmission,
            self.moderation,
            self.reflection,
        ]
        .iter()
        .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }
}
