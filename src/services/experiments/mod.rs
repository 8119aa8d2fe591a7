mod errors;
mod models;
mod service;

pub use errors::Error;
pub use models::{
    ConvergencePoint, ExperimentKind, ExperimentReport, ExperimentResult, KindSummary,
    OverallBest, Parameter, Sweep, find_convergence_generation,
};
pub use service::{ExperimentRunner, Progress};
