//! Spatial storage of reactor components

pub mod grid;
pub mod snapshot;

pub use grid::ReactorGrid;
pub use snapshot::{CellView, GridSnapshot, SourceView};
