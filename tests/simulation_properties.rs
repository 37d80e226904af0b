//! Property-based tests for the tick pipeline using proptest.
//!
//! Covers: quiet cores without fuel, placement-order independence, the heat
//! output ceiling, monotone burnup and the meltdown counter.

use proptest::prelude::*;

use reactor_core::core::types::{GridCoord, GridDimensions, Kelvin};
use reactor_core::layout::{build_grid, random_layout, ComponentSpec, ReactorLayout};
use reactor_core::simulation::{run_tick, FailureState, FailureStatus};
use reactor_core::spatial::ReactorGrid;
use reactor_core::SimulationConfig;

fn grid_from(layout: &ReactorLayout) -> ReactorGrid {
    build_grid(layout, &SimulationConfig::default()).unwrap()
}

fn temperatures(grid: &ReactorGrid) -> Vec<(GridCoord, Kelvin)> {
    grid.iter().map(|(coord, c)| (coord, c.temperature)).collect()
}

// ── No spontaneous heat ──────────────────────────────────────────────

proptest! {
    /// Without fuel rods nothing heats up, whatever else is in the core.
    #[test]
    fn no_rods_no_flux_no_heat(seed in any::<u64>(), density in 0.0f64..1.0) {
        let mut layout = random_layout(seed, GridDimensions::cube(4), density);
        layout.components.retain(|c| c.fuel.is_none());
        let mut grid = grid_from(&layout);
        let config = SimulationConfig::default();

        for tick in 0..5 {
            let report = run_tick(&mut grid, &config, tick);
            prop_assert!(report.flux.is_zero());
            prop_assert_eq!(report.heat_generated, 0.0);
            for delta in &report.temperature_deltas {
                prop_assert_eq!(delta.delta(), 0.0);
            }
        }
    }
}

// ── Determinism ──────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Placement order does not change the outcome of a tick.
    #[test]
    fn placement_order_does_not_matter(seed in any::<u64>(), density in 0.2f64..0.9) {
        let layout = random_layout(seed, GridDimensions::cube(4), density);
        let mut reversed = layout.clone();
        reversed.components.reverse();

        let mut a = grid_from(&layout);
        let mut b = grid_from(&reversed);
        let config = SimulationConfig::default();

        for tick in 0..10 {
            let ra = run_tick(&mut a, &config, tick);
            let rb = run_tick(&mut b, &config, tick);
            prop_assert_eq!(&ra.flux, &rb.flux);
            prop_assert_eq!(ra.heat_generated, rb.heat_generated);
        }
        prop_assert_eq!(temperatures(&a), temperatures(&b));
    }

    /// Sources at symmetric positions get identical flux regardless of order.
    #[test]
    fn symmetric_sources_symmetric_flux(intensity in 0.1f64..5.0) {
        let layout = ReactorLayout::new(GridDimensions::new(5, 1, 1))
            .with_fuel("u", [0.8, 0.6, 0.1, 0.1])
            .with_component(ComponentSpec::fuel_rod(GridCoord::new(0, 0, 0), "u", intensity))
            .with_component(ComponentSpec::moderator(GridCoord::new(2, 0, 0)))
            .with_component(ComponentSpec::fuel_rod(GridCoord::new(4, 0, 0), "u", intensity));
        let mut grid = grid_from(&layout);
        let report = run_tick(&mut grid, &SimulationConfig::default(), 0);
        let dims = grid.dimensions();
        let at = |x| report.flux.at(dims.index_of(GridCoord::new(x, 0, 0)).unwrap());

        let (l_he, l_le) = at(1);
        let (r_he, r_le) = at(3);
        prop_assert!((l_he - r_he).abs() < 1e-12);
        prop_assert!((l_le - r_le).abs() < 1e-12);
    }
}

// ── Heat output ceiling ──────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Net heat added in a tick never exceeds the rods' maximum output.
    #[test]
    fn heat_never_exceeds_max_output(
        seed in any::<u64>(),
        density in 0.3f64..1.0,
        gain in 0.0f64..4.0,
    ) {
        let config = SimulationConfig {
            chain_reaction_gain: gain,
            ..Default::default()
        };
        let layout = random_layout(seed, GridDimensions::cube(5), density);
        let mut grid = build_grid(&layout, &config).unwrap();

        for tick in 0..20 {
            let report = run_tick(&mut grid, &config, tick);
            prop_assert!(report.heat_generated <= report.max_heat_output + 1e-9);
            let added = report.total_temperature_delta();
            let tolerance = 1e-6 * (1.0 + report.max_heat_output);
            prop_assert!(
                added <= report.max_heat_output + tolerance,
                "tick {}: added {} over ceiling {}", tick, added, report.max_heat_output
            );
        }
    }
}

// ── Burnup ───────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Cross-sections of every rod only ever go down.
    #[test]
    fn cross_sections_never_increase(seed in any::<u64>(), burnup in 1e-4f64..0.05) {
        let config = SimulationConfig {
            burnup_rate: burnup,
            ..Default::default()
        };
        let layout = random_layout(seed, GridDimensions::cube(4), 0.8);
        let mut grid = build_grid(&layout, &config).unwrap();

        let vectors = |grid: &ReactorGrid| -> Vec<(GridCoord, [f64; 4])> {
            grid.iter()
                .filter_map(|(coord, c)| {
                    grid.fuel_of(c).map(|f| (coord, f.cross_sections.to_vector()))
                })
                .collect()
        };

        let mut last = vectors(&grid);
        for tick in 0..30 {
            run_tick(&mut grid, &config, tick);
            let now = vectors(&grid);
            prop_assert_eq!(now.len(), last.len());
            for ((coord, before), (_, after)) in last.iter().zip(now.iter()) {
                for k in 0..4 {
                    prop_assert!(after[k] <= before[k], "{} cross-section {} rose", coord, k);
                }
            }
            last = now;
        }
    }
}

// ── Meltdown counter ─────────────────────────────────────────────────

proptest! {
    /// Meltdown happens exactly when a run of over-limit ticks reaches the
    /// threshold.
    #[test]
    fn meltdown_needs_consecutive_ticks(
        hot in proptest::collection::vec(any::<bool>(), 1..60),
        meltdown_ticks in 1u32..8,
    ) {
        let config = SimulationConfig {
            meltdown_ticks,
            ..Default::default()
        };
        let mut status = FailureStatus::default();
        let mut run = 0u32;
        let mut expected = false;

        for &over in &hot {
            let temperature = if over { 1300.0 } else { 1000.0 };
            status.evaluate(temperature, 1200.0, &config);
            run = if over { run + 1 } else { 0 };
            expected |= run >= meltdown_ticks;
            prop_assert_eq!(status.state == FailureState::Meltdown, expected);
        }
    }
}
