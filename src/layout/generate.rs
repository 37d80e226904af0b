//! Seeded random layouts for stress runs and benches

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::spec::{ComponentSpec, ReactorLayout};
use crate::core::types::GridDimensions;

/// Fuel every generated rod burns
pub const GENERATED_FUEL: &str = "generated";

/// Fill roughly `density` of the cells with a mix of component kinds
///
/// The same seed and dimensions always produce the same layout. Rods make up
/// about a quarter of the placed cells and coolant a fifth, so a dense layout
/// stays hot without running away on the first tick.
pub fn random_layout(seed: u64, dimensions: GridDimensions, density: f64) -> ReactorLayout {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let density = if density.is_nan() { 0.0 } else { density.clamp(0.0, 1.0) };

    let mut layout = ReactorLayout::new(dimensions).with_fuel(
        GENERATED_FUEL,
        [
            rng.gen_range(0.3..0.9),
            rng.gen_range(0.3..0.9),
            rng.gen_range(0.0..0.2),
            rng.gen_range(0.0..0.2),
        ],
    );

    for index in 0..dimensions.cell_count() {
        if !rng.gen_bool(density) {
            continue;
        }
        let coord = dimensions.coord_of(index);
        let roll: f64 = rng.gen();
        let spec = if roll < 0.25 {
            ComponentSpec::fuel_rod(coord, GENERATED_FUEL, rng.gen_range(0.5..2.5))
        } else if roll < 0.45 {
            ComponentSpec::coolant_channel(coord).with_heat_removal_rate(rng.gen_range(0.3..0.8))
        } else if roll < 0.70 {
            ComponentSpec::moderator(coord)
        } else if roll < 0.85 {
            ComponentSpec::reflector(coord)
        } else {
            ComponentSpec::structural(coord)
        };
        layout = layout.with_component(spec);
    }

    layout
}
