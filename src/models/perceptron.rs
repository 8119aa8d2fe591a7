//! Single-layer perceptron with one binary neuron per class (one-vs-all).
//!
//! Inference computes every neuron's net activation and picks the label with
//! the largest one; on ties the neuron created first wins.

use crate::models::Sample;
use rand::Rng;
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum PredictionError {
    #[error("InputLength: expected {expected} inputs, got {actual}")]
    InputLength { expected: usize, actual: usize },
    #[error("Untrained: the perceptron has no neurons")]
    Untrained,
}

/// Linear threshold unit for a single label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neuron {
    pub label: String,
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl Neuron {
    /// Weights and bias drawn uniformly from `[-weight_range, weight_range]`.
    pub(crate) fn random<R: Rng>(
        label: impl Into<String>,
        input_size: usize,
        weight_range: f64,
        rng: &mut R,
    ) -> Self {
        let mut draw = || {
            if weight_range > 0.0 {
                rng.random_range(-weight_range..=weight_range)
            } else {
                0.0
            }
        };

        let weights = (0..input_size).map(|_| draw()).collect();
        let bias = draw();

        Self {
            label: label.into(),
            weights,
            bias,
        }
    }

    /// `dot(weights, input) + bias - activation_threshold`.
    pub fn net(&self, input: &[u8], activation_threshold: f64) -> f64 {
        let dot: f64 = self
            .weights
            .iter()
            .zip(input)
            .map(|(weight, &pixel)| weight * f64::from(pixel))
            .sum();

        dot + self.bias - activation_threshold
    }

    /// Delta rule step: `w += learning_rate * error * x`, `b += learning_rate * error`.
    pub(crate) fn apply_delta(&mut self, input: &[u8], learning_rate: f64, error: f64) {
        for (weight, &pixel) in self.weights.iter_mut().zip(input) {
            *weight += learning_rate * error * f64::from(pixel);
        }
        self.bias += learning_rate * error;
    }
}

/// Binary output of a net activation.
pub(crate) fn step(net: f64) -> u8 {
    u8::from(net >= 0.0)
}

/// One neuron's response to an input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeuronOutput {
    pub label: String,
    pub net: f64,
    pub output: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub detail: Vec<NeuronOutput>,
}

/// A trained set of neurons sharing one input size and activation threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Perceptron {
    neurons: Vec<Neuron>,
    input_size: usize,
    activation_threshold: f64,
}

impl Perceptron {
    pub fn new(neurons: Vec<Neuron>, input_size: usize, activation_threshold: f64) -> Self {
        Self {
            neurons,
            input_size,
            activation_threshold,
        }
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    pub fn neuron(&self, label: &str) -> Option<&Neuron> {
        self.neurons.iter().find(|neuron| neuron.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.neurons.iter().map(|neuron| neuron.label.as_str())
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn activation_threshold(&self) -> f64 {
        self.activation_threshold
    }

    /// Index of the neuron with the largest net, first one on ties.
    fn argmax(&self, input: &[u8]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, neuron) in self.neurons.iter().enumerate() {
            let net = neuron.net(input, self.activation_threshold);
            match best {
                Some((_, best_net)) if net <= best_net => {}
                _ => best = Some((index, net)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Classifies `input`, reporting every neuron's net and binary output.
    #[instrument(level = "debug", skip(self, input), fields(input_length = input.len(), neurons = self.neurons.len()))]
    pub fn predict(&self, input: &[u8]) -> Result<Prediction, PredictionError> {
        if input.len() != self.input_size {
            return Err(PredictionError::InputLength {
                expected: self.input_size,
                actual: input.len(),
            });
        }

        let winner = self.argmax(input).ok_or(PredictionError::Untrained)?;
        let detail = self
            .neurons
            .iter()
            .map(|neuron| {
                let net = neuron.net(input, self.activation_threshold);
                NeuronOutput {
                    label: neuron.label.clone(),
                    net,
                    output: step(net),
                }
            })
            .collect();

        Ok(Prediction {
            label: self.neurons[winner].label.clone(),
            detail,
        })
    }

    /// Share of samples whose argmax label matches their own, zero for an
    /// empty set. Samples of the wrong size count as misclassified.
    #[instrument(level = "debug", skip(self, samples), fields(samples = samples.len()))]
    pub fn accuracy(&self, samples: &[Sample]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }

        let correct = samples
            .iter()
            .filter(|sample| sample.len() == self.input_size)
            .filter(|sample| {
                self.argmax(sample.pixels())
                    .is_some_and(|index| self.neurons[index].label == sample.label())
            })
            .count();

        correct as f64 / samples.len() as f64
    }
}
