use super::TrainingError;
use serde::{Deserialize, Serialize};

/// Hyper-parameters of a delta rule training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingOptions {
    pub learning_rate: f64,
    pub max_epochs: u32,
    /// Training stops once an epoch's mean squared error is at or below this.
    pub target_error: f64,
    /// Initial weights and biases are drawn from `[-weight_range, weight_range]`.
    pub weight_range: f64,
    /// Subtracted from every neuron's net sum.
    pub activation_threshold: f64,
    pub seed: Option<u64>,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_epochs: 100,
            target_error: 0.01,
            weight_range: 0.5,
            activation_threshold: 0.0,
            seed: None,
        }
    }
}

impl TrainingOptions {
    pub fn validate(&self) -> Result<(), TrainingError> {
        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("target_error", self.target_error),
            ("weight_range", self.weight_range),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TrainingError::InvalidOption { name, value });
            }
        }
        if !self.activation_threshold.is_finite() {
            return Err(TrainingError::InvalidOption {
                name: "activation_threshold",
                value: self.activation_threshold,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TrainingOptions::default();

        assert_eq!(options.learning_rate, 0.1);
        assert_eq!(options.max_epochs, 100);
        assert_eq!(options.target_error, 0.01);
        assert_eq!(options.weight_range, 0.5);
        assert_eq!(options.activation_threshold, 0.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_negative_and_non_finite_values() {
        let options = TrainingOptions {
            learning_rate: -0.1,
            ..Default::default()
        };
        assert_eq!(
            options.validate(),
            Err(TrainingError::InvalidOption {
                name: "learning_rate",
                value: -0.1
            })
        );

        let options = TrainingOptions {
            weight_range: f64::INFINITY,
            ..Default::default()
        };
        assert!(options.validate().is_err());

        // Negative thresholds are allowed
        let options = TrainingOptions {
            activation_threshold: -1.0,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: TrainingOptions =
            serde_json::from_str(r#"{ "max_epochs": 500, "seed": 7 }"#).expect("is valid");

        assert_eq!(options.max_epochs, 500);
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.learning_rate, 0.1);
    }
}
