pub mod config;
pub mod models;
pub mod services;

pub use services::evolution::GeneticAlgorithm;
pub use services::experiments::ExperimentRunner;
pub use services::training::Trainer;
