//! The shipped data files load and build

use std::path::PathBuf;

use reactor_core::layout::ReactorLayout;
use reactor_core::{Reactor, SimulationConfig};

fn data_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(relative)
}

#[test]
fn test_default_config_file_matches_builtin_defaults() {
    let config = SimulationConfig::load(&data_path("config/default.toml")).unwrap();
    assert_eq!(config, SimulationConfig::default());
}

#[test]
fn test_shipped_layouts_build() {
    for name in ["single_rod.toml", "cooled_core.toml"] {
        let layout = ReactorLayout::load(&data_path(&format!("layouts/{}", name))).unwrap();
        let reactor = Reactor::from_layout(&layout, SimulationConfig::default()).unwrap();
        assert_eq!(reactor.grid().len(), layout.components.len(), "{}", name);
    }
}

#[test]
fn test_cooled_core_survives_a_long_run() {
    let layout = ReactorLayout::load(&data_path("layouts/cooled_core.toml")).unwrap();
    let mut reactor = Reactor::from_layout(&layout, SimulationConfig::default()).unwrap();
    let reports = reactor.run(300);
    assert!(!reactor.is_faulted());
    assert!(reports.iter().all(|r| !r.has_meltdown()));
}
