//! Reactor Core - voxel fission reactor simulation
//!
//! A reactor is a fixed 3D grid of components. Each tick propagates neutron
//! flux from the fuel rods, turns it into heat, diffuses that heat, burns fuel
//! and advances every component's failure state. The host owns placement and
//! rendering; this crate owns the physics.

pub mod components;
pub mod core;
pub mod layout;
pub mod reactor;
pub mod simulation;
pub mod spatial;

pub use crate::core::{ReactorError, Result, SimulationConfig};
pub use crate::reactor::{tick_reactors, Reactor};
