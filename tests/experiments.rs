use evolab::models::{Cost, Graph, SelectionMethod};
use evolab::services::evolution::GaConfig;
use evolab::services::experiments::{
    ExperimentKind, ExperimentReport, ExperimentRunner, Parameter, Sweep,
};

fn grid() -> anyhow::Result<Graph> {
    // 0 - 1 - 2
    // |   |   |
    // 3 - 4 - 5, with a cheap diagonal 1 - 5
    let mut graph = Graph::new(6, 0, 5)?;
    for (a, b, weight) in [
        (0, 1, 1.0),
        (1, 2, 1.0),
        (0, 3, 1.0),
        (3, 4, 1.0),
        (4, 5, 1.0),
        (2, 5, 1.0),
        (1, 4, 1.0),
        (1, 5, 0.5),
    ] {
        graph.connect(a, b, weight);
    }
    Ok(graph)
}

fn runner(seed: u64) -> anyhow::Result<ExperimentRunner> {
    Ok(ExperimentRunner::new(
        grid()?,
        GaConfig {
            population_size: 20,
            seed: Some(seed),
            ..Default::default()
        },
    ))
}

#[test]
fn test_sweeps_feed_the_report() -> anyhow::Result<()> {
    let mut runner = runner(8)?;
    let sweeps = vec![
        Sweep::population_size(&[0, 10, 30], 20),
        Sweep::selection_method(&SelectionMethod::ALL, 20),
    ];

    let results = runner.run_sweeps(&sweeps);

    // The empty population fails validation and is skipped
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|result| result.optimal_cost == Cost::Finite(1.5)));

    let report = ExperimentReport::from_results(&results);
    assert_eq!(report.experiments.len(), 2);

    let population = &report.experiments[&ExperimentKind::PopulationSize];
    assert_eq!(population.results.len(), 2);
    assert!(matches!(
        population.best_parameter,
        Parameter::PopulationSize(10 | 30)
    ));
    assert!(population.deviation.is_some_and(|deviation| deviation >= 0.0));

    let summary = report.summary.as_ref().expect("every run finds a path");
    let lowest = results
        .iter()
        .map(|result| result.best_fitness)
        .min()
        .expect("non-empty");
    assert_eq!(summary.best_fitness, lowest);

    let json = serde_json::to_value(&report)?;
    assert!(json["experiments"]["selection_method"]["results"].is_array());

    Ok(())
}

#[test]
fn test_convergence_generation_is_within_history() -> anyhow::Result<()> {
    let mut runner = runner(9)?;

    let results = runner.run_sweep(&Sweep::mutation_rate(&[0.05, 0.2], 40));

    for result in &results {
        assert!(result.convergence_generation <= result.generations as usize);
    }

    Ok(())
}

#[test]
fn test_convergence_study_covers_every_run() -> anyhow::Result<()> {
    let mut runner = runner(10)?;

    let points = runner.convergence_study(5, 25)?;

    for run in 1..=5 {
        let generations: Vec<u32> = points
            .iter()
            .filter(|point| point.run == run)
            .map(|point| point.generation)
            .collect();
        assert!(!generations.is_empty());
        assert_eq!(generations, (1..=generations.len() as u32).collect::<Vec<_>>());
    }

    Ok(())
}
