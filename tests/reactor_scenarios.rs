//! Integration tests for whole-reactor scenarios
//!
//! These tests drive a [`Reactor`] through many ticks and check the
//! behaviour a player would see:
//! - An uncooled rod heats up monotonically until it melts down
//! - A cooled rod settles at a steady temperature
//! - A core without fuel stays cold
//! - A brief excursion over the limit does not melt a component

use reactor_core::components::ReactorComponent;
use reactor_core::core::types::{GridCoord, GridDimensions, Kelvin};
use reactor_core::layout::{ComponentSpec, ReactorLayout};
use reactor_core::simulation::{FailureState, SimulationEvent, TickReport};
use reactor_core::spatial::ReactorGrid;
use reactor_core::{Reactor, SimulationConfig};

const CENTER: GridCoord = GridCoord { x: 1, y: 1, z: 1 };

fn isolated_rod_layout() -> ReactorLayout {
    ReactorLayout::new(GridDimensions::cube(3))
        .with_fuel("uranium", [0.8, 0.6, 0.1, 0.1])
        .with_component(
            ComponentSpec::fuel_rod(CENTER, "uranium", 2.0)
                .with_max_temperature(1200.0)
                .with_conductivity(5.0),
        )
}

fn rod_temperature(report: &TickReport) -> Kelvin {
    report
        .temperature_deltas
        .iter()
        .find(|d| d.coord == CENTER)
        .map(|d| d.after)
        .unwrap()
}

/// First tick whose report moves a component into `state`
fn first_transition_to(reports: &[TickReport], state: FailureState) -> Option<u64> {
    reports.iter().find_map(|r| {
        r.events
            .iter()
            .any(|e| match e {
                SimulationEvent::FailureTransition { to, .. } => *to == state,
                SimulationEvent::Meltdown { .. } => state == FailureState::Meltdown,
                _ => false,
            })
            .then_some(r.tick)
    })
}

// ============================================================================
// Uncooled rod
// ============================================================================

/// A lone rod has nowhere to shed heat, so every tick adds heat
#[test]
fn test_isolated_rod_heats_monotonically() {
    let mut reactor = Reactor::from_layout(&isolated_rod_layout(), SimulationConfig::default()).unwrap();
    let reports = reactor.run(100);
    assert_eq!(reports.len(), 100);

    let mut last = 298.0;
    for report in &reports {
        let temperature = rod_temperature(report);
        assert!(
            temperature > last,
            "tick {}: {} K did not rise above {} K",
            report.tick,
            temperature,
            last
        );
        last = temperature;
    }
    assert!(last > 1200.0);
}

#[test]
fn test_isolated_rod_reaches_critical_deterministically() {
    let run = || {
        let mut reactor =
            Reactor::from_layout(&isolated_rod_layout(), SimulationConfig::default()).unwrap();
        reactor.run(100)
    };
    let first = run();
    let second = run();

    let critical = first_transition_to(&first, FailureState::Critical).unwrap();
    assert_eq!(first_transition_to(&second, FailureState::Critical), Some(critical));

    // Heat per tick settles near 27 K, so 900 K of headroom lasts about 34 ticks
    assert!((25..45).contains(&critical), "critical at tick {}", critical);

    // Hysteresis: meltdown only after meltdown_ticks consecutive ticks over the limit
    let meltdown = first_transition_to(&first, FailureState::Meltdown).unwrap();
    assert_eq!(
        meltdown,
        critical + SimulationConfig::default().meltdown_ticks as u64 - 1
    );
    assert_eq!(first.iter().filter(|r| r.has_meltdown()).count(), 1);

    let rod_temps: Vec<Kelvin> = first.iter().map(rod_temperature).collect();
    let rod_temps_again: Vec<Kelvin> = second.iter().map(rod_temperature).collect();
    assert_eq!(rod_temps, rod_temps_again);
}

#[test]
fn test_isolated_rod_passes_through_overheating() {
    let mut reactor = Reactor::from_layout(&isolated_rod_layout(), SimulationConfig::default()).unwrap();
    let reports = reactor.run(100);
    let overheating = first_transition_to(&reports, FailureState::Overheating).unwrap();
    let critical = first_transition_to(&reports, FailureState::Critical).unwrap();
    assert!(overheating < critical);
}

// ============================================================================
// Cooled rod
// ============================================================================

#[test]
fn test_cooled_rod_reaches_steady_state() {
    let layout = isolated_rod_layout().with_component(
        ComponentSpec::coolant_channel(GridCoord::new(1, 1, 2)).with_conductivity(10.0),
    );
    let mut reactor = Reactor::from_layout(&layout, SimulationConfig::default()).unwrap();
    let reports = reactor.run(200);

    assert!(reports.iter().all(|r| !r.has_meltdown()));
    assert!(reports.iter().all(|r| r.heat_removed >= 0.0));

    let temps: Vec<Kelvin> = reports.iter().map(rod_temperature).collect();
    let peak = temps.iter().cloned().fold(f64::MIN, f64::max);
    assert!(peak < 1200.0, "rod peaked at {} K", peak);

    // Settled: the last ticks barely move
    for pair in temps[190..].windows(2) {
        assert!((pair[1] - pair[0]).abs() < 0.5);
    }

    let rod = reactor.grid().get(CENTER).unwrap();
    assert_eq!(rod.failure.state, FailureState::Nominal);
}

#[test]
fn test_coolant_carries_heat_out_of_the_core() {
    let layout = isolated_rod_layout()
        .with_component(ComponentSpec::coolant_channel(GridCoord::new(1, 1, 2)));
    let mut reactor = Reactor::from_layout(&layout, SimulationConfig::default()).unwrap();
    let reports = reactor.run(50);
    let generated: f64 = reports.iter().map(|r| r.heat_generated).sum();
    let removed: f64 = reports.iter().map(|r| r.heat_removed).sum();
    assert!(removed > 0.0);
    assert!(removed < generated);
}

// ============================================================================
// No fuel
// ============================================================================

#[test]
fn test_core_without_fuel_stays_cold() {
    let layout = ReactorLayout::new(GridDimensions::cube(3))
        .with_component(ComponentSpec::moderator(GridCoord::new(0, 0, 0)))
        .with_component(ComponentSpec::reflector(GridCoord::new(1, 0, 0)))
        .with_component(ComponentSpec::coolant_channel(GridCoord::new(1, 1, 0)))
        .with_component(ComponentSpec::structural(GridCoord::new(2, 2, 2)));
    let mut reactor = Reactor::from_layout(&layout, SimulationConfig::default()).unwrap();

    for report in reactor.run(25) {
        assert!(report.flux.is_zero());
        assert_eq!(report.heat_generated, 0.0);
        assert!(report.events.is_empty());
        for delta in &report.temperature_deltas {
            assert_eq!(delta.delta(), 0.0);
        }
    }
}

// ============================================================================
// Failure hysteresis
// ============================================================================

fn hot_block_reactor(meltdown_ticks: u32) -> Reactor {
    let mut grid = ReactorGrid::new(GridDimensions::cube(3));
    grid.place(
        CENTER,
        ReactorComponent::structural(1200.0, 2.0).with_initial_temperature(1250.0),
    )
    .unwrap();
    let config = SimulationConfig {
        meltdown_ticks,
        ..Default::default()
    };
    Reactor::new(grid, config).unwrap()
}

fn set_temperature(reactor: &mut Reactor, temperature: Kelvin) {
    reactor.grid_mut().get_mut(CENTER).unwrap().temperature = temperature;
}

#[test]
fn test_brief_excursion_does_not_melt() {
    let mut reactor = hot_block_reactor(3);

    assert!(!reactor.tick().has_meltdown());
    assert!(!reactor.tick().has_meltdown());

    set_temperature(&mut reactor, 1100.0);
    let cooled = reactor.tick();
    assert!(!cooled.has_meltdown());
    assert_eq!(
        reactor.grid().get(CENTER).unwrap().failure.state,
        FailureState::Overheating
    );

    // The counter restarted, so two more hot ticks are still safe
    set_temperature(&mut reactor, 1250.0);
    assert!(!reactor.tick().has_meltdown());
    assert!(!reactor.tick().has_meltdown());
    assert!(reactor.tick().has_meltdown());
}

#[test]
fn test_meltdown_is_reported_once() {
    let mut reactor = hot_block_reactor(2);
    let reports = reactor.run(10);
    assert_eq!(reports.iter().filter(|r| r.has_meltdown()).count(), 1);
    assert!(reports[1].has_meltdown());
    assert_eq!(
        reactor.grid().get(CENTER).unwrap().failure.state,
        FailureState::Meltdown
    );
}
