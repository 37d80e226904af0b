//! Nuclear fuel definitions and the arena that owns them
//!
//! Fuel is an immutable value. Rods refer to it through a [`FuelId`] into a
//! [`FuelArena`]; rods built from the same template share one entry until
//! their burnup diverges. Depletion never writes through a shared entry: it
//! inserts the decayed fuel as a new entry and releases the old one.

use serde::{Deserialize, Serialize};

/// Interaction factors of a fuel, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CrossSections {
    pub he_fission: f64,
    pub le_fission: f64,
    pub he_capture: f64,
    pub le_capture: f64,
}

impl CrossSections {
    pub const ZERO: CrossSections = CrossSections {
        he_fission: 0.0,
        le_fission: 0.0,
        he_capture: 0.0,
        le_capture: 0.0,
    };

    pub fn new(he_fission: f64, le_fission: f64, he_capture: f64, le_capture: f64) -> Self {
        Self {
            he_fission,
            le_fission,
            he_capture,
            le_capture,
        }
    }

    /// `[HE_fission, LE_fission, HE_capture, LE_capture]`
    pub fn from_vector(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    pub fn to_vector(&self) -> [f64; 4] {
        [self.he_fission, self.le_fission, self.he_capture, self.le_capture]
    }

    pub fn is_valid(&self) -> bool {
        self.to_vector()
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }

    /// Every factor multiplied by `factor`, clamped to [0, 1]
    pub fn scaled(&self, factor: f64) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self::new(
            self.he_fission * f,
            self.le_fission * f,
            self.he_capture * f,
            self.le_capture * f,
        )
    }

    /// Fission rate for the given group fluxes
    #[inline]
    pub fn fission_rate(&self, he_flux: f64, le_flux: f64) -> f64 {
        self.he_fission * he_flux + self.le_fission * le_flux
    }

    /// Capture rate for the given group fluxes
    #[inline]
    pub fn capture_rate(&self, he_flux: f64, le_flux: f64) -> f64 {
        self.he_capture * he_flux + self.le_capture * le_flux
    }
}

/// Immutable fuel state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuclearFuel {
    pub name: String,
    pub cross_sections: CrossSections,
    /// Terminal marker set once the fuel has burned out
    #[serde(default)]
    pub spent: bool,
}

impl NuclearFuel {
    pub fn new(name: impl Into<String>, cross_sections: CrossSections) -> Self {
        Self {
            name: name.into(),
            cross_sections,
            spent: false,
        }
    }

    /// The terminal spent-fuel state: all cross-sections zero
    pub fn spent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cross_sections: CrossSections::ZERO,
            spent: true,
        }
    }

    /// Same fuel with burned-down cross-sections
    pub fn depleted(&self, factor: f64) -> Self {
        Self {
            name: self.name.clone(),
            cross_sections: self.cross_sections.scaled(factor),
            spent: self.spent,
        }
    }

    /// True when both fission factors are below `threshold`
    pub fn below_viability(&self, threshold: f64) -> bool {
        self.cross_sections.he_fission < threshold && self.cross_sections.le_fission < threshold
    }
}

/// Index of a fuel entry in a [`FuelArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuelId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FuelSlot {
    fuel: Option<NuclearFuel>,
    refs: u32,
}

/// Reference-counted storage for fuel states
///
/// Released slots go on a free list and are reused by later inserts, so
/// per-tick depletion does not grow the arena.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuelArena {
    slots: Vec<FuelSlot>,
    free: Vec<u32>,
}

impl FuelArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `fuel` with one reference held by the caller
    pub fn insert(&mut self, fuel: NuclearFuel) -> FuelId {
        let slot = FuelSlot {
            fuel: Some(fuel),
            refs: 1,
        };
        while let Some(idx) = self.free.pop() {
            match self.slots.get_mut(idx as usize) {
                Some(free) if free.fuel.is_none() => {
                    *free = slot;
                    return FuelId(idx);
                }
                // Stale entry, never hand out a live slot
                _ => continue,
            }
        }
        self.slots.push(slot);
        FuelId(self.slots.len() as u32 - 1)
    }

    /// Check a loaded arena against the rods that point into it
    ///
    /// Every free entry must name an empty slot and every rod a live one.
    /// Reference counts are raised to cover the rods, unreferenced entries
    /// are freed and the free list is rebuilt from the empty slots.
    pub(crate) fn reconcile(&mut self, rod_fuels: &[FuelId]) -> std::result::Result<(), String> {
        let mut seen = vec![false; self.slots.len()];
        for &idx in &self.free {
            match self.slots.get(idx as usize) {
                None => return Err(format!("free fuel slot {} out of range", idx)),
                Some(slot) if slot.fuel.is_some() => {
                    return Err(format!("free fuel slot {} is still live", idx))
                }
                Some(_) if seen[idx as usize] => {
                    return Err(format!("fuel slot {} freed twice", idx))
                }
                Some(_) => seen[idx as usize] = true,
            }
        }

        let mut rods = vec![0u32; self.slots.len()];
        for &id in rod_fuels {
            if self.get(id).is_none() {
                return Err(format!("fuel rod refers to missing fuel {:?}", id));
            }
            rods[id.0 as usize] += 1;
        }

        self.free.clear();
        for (idx, (slot, held)) in self.slots.iter_mut().zip(rods).enumerate() {
            if slot.fuel.is_some() && slot.refs.max(held) == 0 {
                slot.fuel = None;
            }
            match slot.fuel {
                Some(_) => slot.refs = slot.refs.max(held),
                None => {
                    slot.refs = 0;
                    self.free.push(idx as u32);
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: FuelId) -> Option<&NuclearFuel> {
        self.slots.get(id.0 as usize).and_then(|s| s.fuel.as_ref())
    }

    /// Add a reference to a live entry; returns false for dead ids
    pub fn retain(&mut self, id: FuelId) -> bool {
        match self.slots.get_mut(id.0 as usize) {
            Some(slot) if slot.fuel.is_some() => {
                slot.refs += 1;
                true
            }
            _ => false,
        }
    }

    /// Drop a reference; the entry is freed when the last one goes
    pub fn release(&mut self, id: FuelId) {
        let Some(slot) = self.slots.get_mut(id.0 as usize) else {
            return;
        };
        if slot.fuel.is_none() {
            return;
        }
        slot.refs = slot.refs.saturating_sub(1);
        if slot.refs == 0 {
            slot.fuel = None;
            self.free.push(id.0);
        }
    }

    pub fn ref_count(&self, id: FuelId) -> u32 {
        self.slots
            .get(id.0 as usize)
            .filter(|s| s.fuel.is_some())
            .map(|s| s.refs)
            .unwrap_or(0)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.fuel.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
