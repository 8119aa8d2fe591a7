use evolab::models::{Sample, demo_samples};
use evolab::services::training::{Trainer, TrainingError, TrainingOptions};

fn options(seed: u64, max_epochs: u32) -> TrainingOptions {
    TrainingOptions {
        max_epochs,
        seed: Some(seed),
        ..Default::default()
    }
}

/// Two classes that differ in which half of a 4×4 bitmap is lit.
fn left_right() -> anyhow::Result<Vec<Sample>> {
    Ok(vec![
        Sample::from_rows("left", &["1100", "1100", "1100", "1100"])?,
        Sample::from_rows("left", &["1000", "1100", "1000", "1100"])?,
        Sample::from_rows("left", &["0100", "1100", "1000", "0100"])?,
        Sample::from_rows("right", &["0011", "0011", "0011", "0011"])?,
        Sample::from_rows("right", &["0001", "0011", "0001", "0011"])?,
        Sample::from_rows("right", &["0010", "0011", "0001", "0010"])?,
    ])
}

#[test]
fn test_separable_classes_reach_the_target_error() -> anyhow::Result<()> {
    let samples = left_right()?;
    let mut trainer = Trainer::new(options(17, 1000))?;

    let outcome = trainer.train(&samples)?;

    assert!(outcome.mse.is_some_and(|mse| mse <= 0.01));
    assert_eq!(outcome.accuracy, 1.0);

    let prediction = outcome.perceptron.predict(samples[0].pixels())?;
    assert_eq!(prediction.label, "left");
    assert_eq!(prediction.detail.len(), 2);

    Ok(())
}

#[test]
fn test_training_is_deterministic_for_a_seed() -> anyhow::Result<()> {
    let samples = left_right()?;

    let first = Trainer::new(options(23, 50))?.train(&samples)?;
    let second = Trainer::new(options(23, 50))?.train(&samples)?;

    assert_eq!(first.perceptron, second.perceptron);
    assert_eq!(first.history, second.history);
    assert_eq!(first.iteration_log, second.iteration_log);

    Ok(())
}

#[test]
fn test_demo_patterns_train_to_zero_error() -> anyhow::Result<()> {
    let samples = demo_samples()?;
    let mut trainer = Trainer::new(TrainingOptions {
        target_error: 0.0,
        ..options(31, 1000)
    })?;

    let outcome = trainer.train(&samples)?;

    assert_eq!(outcome.perceptron.neurons().len(), samples.len());
    assert_eq!(outcome.perceptron.input_size(), 64);
    // An error-free epoch leaves every neuron firing only for its own label
    assert_eq!(outcome.mse, Some(0.0));
    assert_eq!(outcome.accuracy, 1.0);

    let summary = outcome.summary(samples.len());
    assert_eq!(summary.classes, 12);
    assert_eq!(summary.dataset_size, 12);

    Ok(())
}

#[test]
fn test_mixed_sample_sizes_are_rejected() -> anyhow::Result<()> {
    let samples = vec![
        Sample::from_rows("a", &["10", "01"])?,
        Sample::from_rows("b", &["100", "001", "010"])?,
    ];

    let error = Trainer::new(options(1, 10))?.train(&samples).unwrap_err();

    assert!(matches!(
        error,
        TrainingError::InputLengthMismatch {
            index: 1,
            expected: 4,
            actual: 9
        }
    ));

    Ok(())
}
