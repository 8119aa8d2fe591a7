use crate::models::ProbabilityOutOfRange;
use crate::services::evolution;

/// Errors raised while preparing a single experiment unit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("EvolutionError: {0}")]
    EvolutionError(#[from] evolution::Error),
    #[error("ParameterError: {0}")]
    ParameterError(#[from] ProbabilityOutOfRange),
}
