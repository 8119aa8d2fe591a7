use serde::{Deserialize, Serialize};

/// A probability in the closed interval `[0.0, 1.0]`.
///
/// Used for mutation rate, crossover rate and edge connection probability.
/// Construction is the only place the range is checked, so a `Probability`
/// can always be passed to [`rand::Rng::random_bool`] safely.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq))]
#[error("{name} must be between 0.0 and 1.0, got: {value}")]
pub struct ProbabilityOutOfRange {
    pub name: &'static str,
    pub value: f64,
}

impl Probability {
    pub const ALWAYS: Probability = Probability(1.0);
    pub const NEVER: Probability = Probability(0.0);

    /// For literals already known to be in range.
    pub(crate) const fn new_unchecked(value: f64) -> Self {
        Self(value)
    }

    pub fn new(value: f64) -> Result<Self, ProbabilityOutOfRange> {
        Self::named("probability", value)
    }

    /// Validates `value`, naming the offending parameter in the error.
    pub fn named(name: &'static str, value: f64) -> Result<Self, ProbabilityOutOfRange> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ProbabilityOutOfRange { name, value });
        }

        Ok(Self(value))
    }

    pub fn get(&self) -> f64 {
        self.0
    }

    /// Rolls the dice once.
    pub fn sample<R: rand::Rng>(&self, rng: &mut R) -> bool {
        rng.random_bool(self.0)
    }
}

impl TryFrom<f64> for Probability {
    type Error = ProbabilityOutOfRange;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(probability: Probability) -> Self {
        probability.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_probability_validation_errors() {
        assert!(Probability::new(-0.1).is_err());
        assert!(Probability::new(1.5).is_err());
        assert!(Probability::new(f64::NAN).is_err());

        assert!(Probability::new(0.0).is_ok());
        assert!(Probability::new(1.0).is_ok());
    }

    #[test]
    fn test_named_error_reports_parameter() {
        let err = Probability::named("mutation_rate", 2.0).unwrap_err();
        assert_eq!(
            err,
            ProbabilityOutOfRange {
                name: "mutation_rate",
                value: 2.0
            }
        );
        assert_eq!(
            err.to_string(),
            "mutation_rate must be between 0.0 and 1.0, got: 2"
        );
    }

    #[test]
    fn test_extreme_probabilities_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            assert!(Probability::ALWAYS.sample(&mut rng));
            assert!(!Probability::NEVER.sample(&mut rng));
        }
    }

    #[test]
    fn test_deserialization_rejects_out_of_range() {
        let ok: Probability = serde_json::from_str("0.25").expect("is in range");
        assert_eq!(ok.get(), 0.25);

        let err = serde_json::from_str::<Probability>("1.25");
        assert!(err.is_err());
    }
}
