/// Errors that can occur before or while training a perceptron.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq))]
pub enum TrainingError {
    #[error("EmptyDataset: at least one sample is required")]
    EmptyDataset,
    #[error("InputLengthMismatch: sample {index} has {actual} pixels, expected {expected}")]
    InputLengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("InvalidOption: {name} must be finite and non-negative, got {value}")]
    InvalidOption { name: &'static str, value: f64 },
}
