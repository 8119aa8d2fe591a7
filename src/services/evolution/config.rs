use crate::models::{CrossoverMethod, Probability, SelectionMethod, Selector};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum ConfigError {
    #[error("EmptyPopulation: population_size must be at least 1")]
    EmptyPopulation,
    #[error("EmptyTournament: tournament_size must be at least 1")]
    EmptyTournament,
    #[error("EliteTooLarge: elite_size {elite_size} exceeds population_size {population_size}")]
    EliteTooLarge {
        elite_size: usize,
        population_size: usize,
    },
    #[error("ChromosomeTooShort: chromosome_length must be at least 2, got {length}")]
    ChromosomeTooShort { length: usize },
}

/// Parameters of a genetic algorithm run.
///
/// Missing fields fall back to their defaults when deserialized:
///
/// ```rust
/// use evolab::services::evolution::GaConfig;
///
/// let config: GaConfig = serde_json::from_str(r#"{ "selection_method": "rank" }"#)?;
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.mutation_rate.get(), 0.1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    pub population_size: usize,
    pub mutation_rate: Probability,
    pub crossover_rate: Probability,
    /// Best chromosomes copied unchanged into the next generation.
    pub elite_size: usize,
    pub tournament_size: usize,
    pub selection_method: SelectionMethod,
    pub crossover_method: CrossoverMethod,
    /// Random walk step bound; `max(graph.size - 2, 4)` when unset.
    pub chromosome_length: Option<usize>,
    /// Seeds the run's random number generator; drawn from the OS when unset.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            mutation_rate: Probability::new_unchecked(0.1),
            crossover_rate: Probability::new_unchecked(0.8),
            elite_size: 5,
            tournament_size: 3,
            selection_method: SelectionMethod::Tournament,
            crossover_method: CrossoverMethod::Uniform,
            chromosome_length: None,
            seed: None,
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        if self.elite_size > self.population_size {
            return Err(ConfigError::EliteTooLarge {
                elite_size: self.elite_size,
                population_size: self.population_size,
            });
        }
        if let Some(length) = self.chromosome_length.filter(|length| *length < 2) {
            return Err(ConfigError::ChromosomeTooShort { length });
        }

        Ok(())
    }

    /// The parent selector described by this config, once validated.
    pub(crate) fn selector(&self) -> Result<Selector, ConfigError> {
        Selector::new(self.selection_method, self.tournament_size)
            .map_err(|_| ConfigError::EmptyTournament)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GaConfig::default();

        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.crossover_rate.get(), 0.8);
        assert_eq!(config.elite_size, 5);
        assert_eq!(config.tournament_size, 3);
        assert_eq!(config.selection_method, SelectionMethod::Tournament);
        assert_eq!(config.crossover_method, CrossoverMethod::Uniform);
    }

    #[test]
    fn test_validation_errors() {
        let config = GaConfig {
            population_size: 0,
            elite_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyPopulation));

        let config = GaConfig {
            tournament_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyTournament));
        assert_eq!(config.selector(), Err(ConfigError::EmptyTournament));

        let config = GaConfig {
            population_size: 4,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EliteTooLarge {
                elite_size: 5,
                population_size: 4
            })
        );

        let config = GaConfig {
            chromosome_length: Some(1),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ChromosomeTooShort { length: 1 })
        );
    }

    #[test]
    fn test_deserialization_uses_snake_case_and_rejects_bad_rates() {
        let config: GaConfig = serde_json::from_str(
            r#"{ "crossover_method": "two_point", "selection_method": "roulette", "mutation_rate": 0.3 }"#,
        )
        .expect("is valid");

        assert_eq!(config.crossover_method, CrossoverMethod::TwoPoint);
        assert_eq!(config.selection_method, SelectionMethod::Roulette);
        assert_eq!(config.mutation_rate.get(), 0.3);
        assert_eq!(config.population_size, 50);

        assert!(serde_json::from_str::<GaConfig>(r#"{ "crossover_rate": 1.5 }"#).is_err());
    }
}
