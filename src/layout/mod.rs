//! Reactor layouts: host-supplied placement data and how it becomes a grid

pub mod builder;
pub mod generate;
pub mod spec;

pub use builder::build_grid;
pub use generate::random_layout;
pub use spec::{ComponentSpec, FuelSpec, ReactorLayout};
