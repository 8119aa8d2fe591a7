use super::ConfigError;

/// Errors that can occur while setting up a genetic algorithm.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ConfigError: {0}")]
    ConfigError(#[from] ConfigError),
}
