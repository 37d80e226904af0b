pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{ReactorError, Result};
pub use types::{ComponentId, GridCoord, GridDimensions, Kelvin, ReactorId, Tick};
