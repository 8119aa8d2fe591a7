use super::events::{EpochEvent, EpochObserver};
use super::{TrainingError, TrainingOptions};
use crate::models::{Neuron, Perceptron, Sample, step};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

/// Entries kept in the per-update iteration log of a run.
pub const ITERATION_LOG_LIMIT: usize = 100;

/// Weights shown per iteration log entry.
const LOGGED_WEIGHTS: usize = 5;

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochRecord {
    pub epoch: u32,
    pub mse: f64,
}

/// One sample × neuron evaluation, with net and weights rounded to three
/// decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationLogEntry {
    pub epoch: u32,
    pub sample: String,
    pub neuron: String,
    pub error: i8,
    pub net: f64,
    pub weights: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingOutcome {
    pub perceptron: Perceptron,
    pub history: Vec<EpochRecord>,
    pub iteration_log: Vec<IterationLogEntry>,
    /// Error of the last epoch, `None` when no epoch ran.
    pub mse: Option<f64>,
    pub epochs: u32,
    /// Share of training samples classified correctly by argmax.
    pub accuracy: f64,
}

/// Compact record of a finished training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub dataset_size: usize,
    pub classes: usize,
    pub epochs: u32,
    pub mse: Option<f64>,
    pub accuracy: f64,
}

impl TrainingOutcome {
    pub fn summary(&self, dataset_size: usize) -> TrainingSummary {
        TrainingSummary {
            id: Uuid::now_v7(),
            trained_at: Utc::now(),
            dataset_size,
            classes: self.perceptron.neurons().len(),
            epochs: self.epochs,
            mse: self.mse,
            accuracy: self.accuracy,
        }
    }
}

/// Trains one-vs-all perceptrons with the online delta rule.
///
/// ```rust
/// use evolab::models::Sample;
/// use evolab::services::training::{Trainer, TrainingOptions};
///
/// let samples = vec![
///     Sample::from_rows("left", &["10", "10"])?,
///     Sample::from_rows("right", &["01", "01"])?,
/// ];
/// let mut trainer = Trainer::new(TrainingOptions {
///     max_epochs: 1000,
///     seed: Some(1),
///     ..Default::default()
/// })?;
///
/// let outcome = trainer.train(&samples)?;
/// assert_eq!(outcome.accuracy, 1.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Trainer {
    options: TrainingOptions,
    rng: StdRng,
    observer: Option<Box<dyn EpochObserver>>,
}

impl Trainer {
    pub fn new(options: TrainingOptions) -> Result<Self, TrainingError> {
        options.validate()?;

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            options,
            rng,
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: impl EpochObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// Trains a fresh perceptron with one neuron per distinct label, ordered
    /// by first appearance.
    ///
    /// Every epoch visits each sample against each neuron and applies the delta
    /// rule on misclassification. Training ends once the epoch MSE reaches
    /// `target_error` or after `max_epochs` epochs.
    #[instrument(level = "info", skip(self, samples), fields(samples = samples.len(), max_epochs = self.options.max_epochs, learning_rate = self.options.learning_rate))]
    pub fn train(&mut self, samples: &[Sample]) -> Result<TrainingOutcome, TrainingError> {
        let input_size = validate_dataset(samples)?;
        let labels = distinct_labels(samples);

        tracing::info!(
            message = "Training started",
            classes = labels.len(),
            input_size = input_size
        );

        let neurons = labels
            .iter()
            .map(|label| Neuron::random(*label, input_size, self.options.weight_range, &mut self.rng))
            .collect();
        let mut perceptron =
            Perceptron::new(neurons, input_size, self.options.activation_threshold);

        let mut history = Vec::new();
        let mut iteration_log = Vec::with_capacity(ITERATION_LOG_LIMIT);
        let mut mse: Option<f64> = None;
        let mut epoch = 0;

        while epoch < self.options.max_epochs
            && mse.is_none_or(|mse| mse > self.options.target_error)
        {
            epoch += 1;
            let mut squared_errors = 0.0;

            for sample in samples {
                for neuron in perceptron.neurons_mut() {
                    let net = neuron.net(sample.pixels(), self.options.activation_threshold);
                    let target = u8::from(neuron.label == sample.label());
                    let error = target as i8 - step(net) as i8;

                    if error != 0 {
                        neuron.apply_delta(
                            sample.pixels(),
                            self.options.learning_rate,
                            f64::from(error),
                        );
                    }
                    squared_errors += f64::from(error * error);

                    if iteration_log.len() < ITERATION_LOG_LIMIT {
                        iteration_log.push(IterationLogEntry {
                            epoch,
                            sample: sample.label().to_string(),
                            neuron: neuron.label.clone(),
                            error,
                            net: round3(net),
                            weights: neuron
                                .weights
                                .iter()
                                .take(LOGGED_WEIGHTS)
                                .copied()
                                .map(round3)
                                .collect(),
                        });
                    }
                }
            }

            let epoch_mse = squared_errors / (samples.len() * labels.len()) as f64;
            history.push(EpochRecord {
                epoch,
                mse: epoch_mse,
            });
            mse = Some(epoch_mse);

            tracing::debug!(message = "Epoch completed", epoch = epoch, mse = epoch_mse);
            if let Some(observer) = self.observer.as_mut() {
                observer.on_epoch(&EpochEvent {
                    epoch,
                    mse: epoch_mse,
                    perceptron: &perceptron,
                });
            }
        }

        let accuracy = perceptron.accuracy(samples);

        tracing::info!(
            message = "Training finished",
            epochs = epoch,
            mse = ?mse,
            accuracy = accuracy
        );

        Ok(TrainingOutcome {
            perceptron,
            history,
            iteration_log,
            mse,
            epochs: epoch,
            accuracy,
        })
    }
}

/// Checks that the dataset is non-empty and of uniform length, returning it.
fn validate_dataset(samples: &[Sample]) -> Result<usize, TrainingError> {
    let first = samples.first().ok_or(TrainingError::EmptyDataset)?;
    let expected = first.len();

    for (index, sample) in samples.iter().enumerate() {
        if sample.len() != expected {
            return Err(TrainingError::InputLengthMismatch {
                index,
                expected,
                actual: sample.len(),
            });
        }
    }

    Ok(expected)
}

fn distinct_labels(samples: &[Sample]) -> Vec<&str> {
    let mut labels: Vec<&str> = Vec::new();
    for sample in samples {
        if !labels.contains(&sample.label()) {
            labels.push(sample.label());
        }
    }
    labels
}
