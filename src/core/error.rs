use thiserror::Error;

use crate::core::types::{ComponentId, GridCoord};

#[derive(Error, Debug)]
pub enum ReactorError {
    #[error("Invalid placement at {coord}: {reason}")]
    InvalidPlacement { coord: GridCoord, reason: String },

    #[error("Cell already occupied: {0}")]
    OccupiedCell(GridCoord),

    #[error("Invalid grid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Invalid fuel '{name}': {reason}")]
    InvalidFuel { name: String, reason: String },

    #[error("Propagation radius {requested} exceeds grid span {limit}")]
    GridBoundsExceeded { requested: u32, limit: u32 },

    #[error("Component {0:?} holds exhausted fuel")]
    DepletedFuelOperation(ComponentId),

    #[error("Component not found: {0:?}")]
    ComponentNotFound(ComponentId),

    #[error("Component {0:?} is not a fuel rod")]
    NotAFuelRod(ComponentId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReactorError>;
