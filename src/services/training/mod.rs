mod errors;
mod events;
mod options;
mod service;

pub use errors::TrainingError;
pub use events::{EpochEvent, EpochObserver};
pub use options::TrainingOptions;
pub use service::{
    EpochRecord, ITERATION_LOG_LIMIT, IterationLogEntry, Trainer, TrainingOutcome,
    TrainingSummary,
};
