pub mod evolution;
pub mod experiments;
pub mod training;
