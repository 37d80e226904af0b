//! Per-tick reactor pipeline

pub mod depletion;
pub mod failure;
pub mod flux;
pub mod report;
pub mod thermal;
pub mod tick;

pub use failure::{FailureState, FailureStatus, FailureTransition};
pub use flux::{propagate_flux, FluxField, FluxOutcome};
pub use report::{SimulationEvent, TemperatureDelta, TickReport};
pub use tick::run_tick;
