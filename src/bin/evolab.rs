use evolab::config::LabConfig;
use evolab::models::demo_samples;
use evolab::services::evolution::{GeneticAlgorithm, Observer, Step, StepEvent};
use evolab::services::experiments::{ExperimentReport, ExperimentRunner};
use evolab::services::training::Trainer;
use tracing_subscriber::EnvFilter;

/// Logs generation boundaries at info level and every other step at debug.
struct LogObserver;

impl Observer for LogObserver {
    fn notify(&mut self, event: &StepEvent<'_>) {
        match event.step {
            Step::GenerationEnd => tracing::info!(
                message = "Generation finished",
                generation = event.generation,
                best = %event.statistics.min,
                average = %event.statistics.avg
            ),
            step => tracing::debug!(
                message = "Step",
                step = %step,
                generation = event.generation,
                population = event.population.len()
            ),
        }
    }
}

// Usage: evolab [config.json]
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => LabConfig::from_path(&path)?,
        None => LabConfig::default(),
    };

    let graph = config.network.build()?;
    println!("{graph}");

    let (optimal_path, optimal_cost) = graph.shortest_path();
    println!("Dijkstra: {optimal_path:?}, Cost: {optimal_cost:.2}");

    let mut algorithm = GeneticAlgorithm::builder(graph.clone())
        .with_config(config.ga.clone())
        .with_observer(LogObserver)
        .build()?;
    let outcome = algorithm.run(config.max_generations);
    match &outcome.best {
        Some(best) => println!("Genetic algorithm: {best} ({})", outcome.reason),
        None => println!("Genetic algorithm: no path found ({})", outcome.reason),
    }
    println!("{}", serde_json::to_string_pretty(&algorithm.statistics())?);

    let mut runner = ExperimentRunner::new(graph, config.ga.clone());
    let results = runner.run_all();
    let report = ExperimentReport::from_results(&results);
    println!("{}", serde_json::to_string_pretty(&report)?);

    let samples = demo_samples()?;
    let mut trainer = Trainer::new(config.training.clone())?;
    let training = trainer.train(&samples)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&training.summary(samples.len()))?
    );

    for sample in &samples {
        let prediction = training.perceptron.predict(sample.pixels())?;
        println!("{} -> {}", sample.label(), prediction.label);
    }

    Ok(())
}
