mod config;
mod errors;
mod events;
mod service;
mod service_builder;

pub use config::{ConfigError, GaConfig};
pub use errors::Error;
pub use events::{Observer, Step, StepDetail, StepEvent};
pub use service::{GaStatistics, GeneticAlgorithm, RunOutcome, RunState, StepOutcome};
pub use service_builder::GeneticAlgorithmBuilder;
